pub mod booking;
pub mod car;
pub mod date;
pub mod filter;
pub mod user;
