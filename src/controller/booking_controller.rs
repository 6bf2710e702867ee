use std::fmt::Write;
use tracing::info;
use crate::controller::ViewError;
use crate::helpers::fetch_sequence::{ListState, LoadState};
use crate::helpers::format_money;
use crate::helpers::table::Table;
use crate::models::booking::{Booking, BookingId, BookingStatus};
use crate::models::date::format_date;
use crate::models::user::{User, UserId};
use crate::repositories::RentalApi;

/// The logged-in customer's booking history.
#[derive(Default)]
pub struct CustomerBookingsView {
    bookings: ListState<Booking>,
    synced: Option<(UserId, u64)>,
}

impl CustomerBookingsView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bookings(&self) -> &[Booking] {
        self.bookings.items()
    }

    pub fn load_state(&self) -> &LoadState {
        self.bookings.state()
    }

    pub fn can_cancel(booking: &Booking) -> bool {
        booking.status == BookingStatus::Booked
    }

    /// Reloads when the user or the refresh signal moved since the last
    /// sync. Returns whether a fetch happened.
    pub async fn sync<A: RentalApi>(
        &mut self,
        api: &A,
        user: &User,
        refresh_key: u64,
    ) -> Result<bool, ViewError> {
        let key = (user.id, refresh_key);
        if self.synced == Some(key) {
            return Ok(false);
        }
        self.synced = Some(key);
        self.load(api, user).await?;
        Ok(true)
    }

    pub async fn load<A: RentalApi>(&mut self, api: &A, user: &User) -> Result<(), ViewError> {
        let ticket = self.bookings.begin();
        let result = api.get_bookings_by_user(user.id).await;
        self.bookings.finish(ticket, result)?;
        Ok(())
    }

    pub async fn cancel<A: RentalApi>(
        &mut self,
        api: &A,
        user: &User,
        booking_id: BookingId,
    ) -> Result<(), ViewError> {
        let booking = self
            .bookings()
            .iter()
            .find(|b| b.id == booking_id)
            .ok_or_else(|| ViewError::Validation(format!("Booking #{} is not in your history", booking_id)))?;
        if !Self::can_cancel(booking) {
            return Err(ViewError::Validation(format!(
                "Booking #{} is {} and cannot be cancelled",
                booking_id, booking.status
            )));
        }

        api.update_booking_status(booking_id, BookingStatus::Cancelled, user.id)
            .await?;
        info!("Cancelled booking {} for user {}", booking_id, user.id);
        self.load(api, user).await
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "== Your Booking History ==");
        if let LoadState::Failed(message) = self.load_state() {
            let _ = writeln!(out, "(last refresh failed: {})", message);
        }

        let mut table = Table::new(
            &["Booking ID", "Car ID", "From", "To", "Total Price", "Status", "Action"],
            "No bookings yet.",
        );
        for booking in self.bookings() {
            let action = if Self::can_cancel(booking) { "cancel" } else { "-" };
            table.push_row(vec![
                booking.id.to_string(),
                booking.car_id.to_string(),
                format_date(booking.start_date),
                format_date(booking.end_date),
                format_money(booking.total_price),
                booking.status.to_string(),
                action.to_string(),
            ]);
        }
        let _ = write!(out, "{}", table);
        out
    }
}
