use std::collections::HashMap;
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

/// Every booking on the platform, with an uncommitted status per row.
#[derive(Default)]
pub struct AdminBookingsView {
    bookings: ListState<Booking>,
    drafts: HashMap<BookingId, BookingStatus>,
    synced: Option<UserId>,
}

impl AdminBookingsView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bookings(&self) -> &[Booking] {
        self.bookings.items()
    }

    pub fn load_state(&self) -> &LoadState {
        self.bookings.state()
    }

    pub async fn sync<A: RentalApi>(&mut self, api: &A, user: &User) -> Result<bool, ViewError> {
        if self.synced == Some(user.id) {
            return Ok(false);
        }
        self.synced = Some(user.id);
        self.load(api, user).await?;
        Ok(true)
    }

    /// Fetches the full list and resets every draft to its row's status.
    pub async fn load<A: RentalApi>(&mut self, api: &A, user: &User) -> Result<(), ViewError> {
        if !user.is_admin() {
            return Err(ViewError::NotPermitted);
        }
        let ticket = self.bookings.begin();
        let result = api.get_all_bookings(user.id).await;
        if self.bookings.finish(ticket, result)? {
            let drafts = self
                .bookings()
                .iter()
                .map(|b| (b.id, b.status))
                .collect();
            self.drafts = drafts;
        }
        Ok(())
    }

    /// Every listed row has a draft once a load has been applied.
    pub fn draft(&self, booking_id: BookingId) -> Option<BookingStatus> {
        self.drafts.get(&booking_id).copied()
    }

    pub fn set_draft(&mut self, booking_id: BookingId, status: BookingStatus) -> Result<(), ViewError> {
        if !self.bookings().iter().any(|b| b.id == booking_id) {
            return Err(ViewError::Validation(format!("Booking #{} is not in the list", booking_id)));
        }
        self.drafts.insert(booking_id, status);
        Ok(())
    }

    /// Commits the drafted status for one row, then reloads everything.
    pub async fn save<A: RentalApi>(
        &mut self,
        api: &A,
        user: &User,
        booking_id: BookingId,
    ) -> Result<Booking, ViewError> {
        if !user.is_admin() {
            return Err(ViewError::NotPermitted);
        }
        let status = self
            .draft(booking_id)
            .ok_or_else(|| ViewError::Validation(format!("Booking #{} is not in the list", booking_id)))?;

        let updated = api.update_booking_status(booking_id, status, user.id).await?;
        info!("Booking {} set to {} by admin {}", booking_id, status, user.id);

        self.load(api, user).await?;
        Ok(updated)
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "== All Bookings (Admin) ==");
        if let LoadState::Failed(message) = self.load_state() {
            let _ = writeln!(out, "(last refresh failed: {})", message);
        }

        let mut table = Table::new(
            &["ID", "User", "Car", "Start", "End", "Total", "Status", "Draft"],
            "No bookings found.",
        );
        for booking in self.bookings() {
            let draft = self.draft(booking.id).unwrap_or(booking.status);
            let draft_cell = if draft == booking.status {
                draft.to_string()
            } else {
                format!("{} (unsaved)", draft)
            };
            table.push_row(vec![
                booking.id.to_string(),
                booking.user_id.to_string(),
                booking.car_id.to_string(),
                format_date(booking.start_date),
                format_date(booking.end_date),
                format_money(booking.total_price),
                booking.status.to_string(),
                draft_cell,
            ]);
        }
        let _ = write!(out, "{}", table);
        out
    }
}
