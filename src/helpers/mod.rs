pub mod confirm;
pub mod fetch_sequence;
pub mod table;

/// Prices are shown in rupees with two decimals.
pub fn format_money(amount: f64) -> String {
    format!("₹{:.2}", amount)
}
