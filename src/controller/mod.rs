use std::fmt::Write;
use thiserror::Error;
use time::Date;
use crate::controller::admin_booking_controller::AdminBookingsView;
use crate::controller::auth_controller::{AuthMode, AuthView};
use crate::controller::booking_controller::CustomerBookingsView;
use crate::controller::car_catalog_controller::{Booked, CarCatalogView, FormField};
use crate::helpers::confirm::Confirm;
use crate::models::booking::{Booking, BookingId, BookingStatus};
use crate::models::car::{Car, CarId};
use crate::models::user::{Role, User};
use crate::repositories::api_error::ApiError;
use crate::repositories::session_store::SessionStore;
use crate::repositories::RentalApi;
use crate::session::Session;

pub mod admin_booking_controller;
pub mod auth_controller;
pub mod booking_controller;
pub mod car_catalog_controller;

#[cfg(test)]
pub(crate) mod test_support;

/// What a view action can fail with.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    #[error("{0}")]
    Api(#[from] ApiError),

    #[error("{0}")]
    Validation(String),

    #[error("That action is not available for your role")]
    NotPermitted,

    #[error("Cancelled")]
    Declined,

    #[error("Log in first")]
    LoggedOut,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Auth,
    CustomerDashboard,
    AdminDashboard,
}

/// Root of the client: owns the session and the refresh signal, and picks
/// which views are live for the current identity.
pub struct App<A, S> {
    api: A,
    session: Session<S>,
    refresh_key: u64,
    auth: AuthView,
    catalog: CarCatalogView,
    customer_bookings: CustomerBookingsView,
    admin_bookings: AdminBookingsView,
}

impl<A: RentalApi, S: SessionStore> App<A, S> {
    pub fn new(api: A, session: Session<S>) -> Self {
        Self {
            api,
            session,
            refresh_key: 0,
            auth: AuthView::new(),
            catalog: CarCatalogView::new(),
            customer_bookings: CustomerBookingsView::new(),
            admin_bookings: AdminBookingsView::new(),
        }
    }

    pub fn screen(&self) -> Screen {
        match self.session.identity().map(|u| u.role) {
            None => Screen::Auth,
            Some(Role::Customer) => Screen::CustomerDashboard,
            Some(Role::Admin) => Screen::AdminDashboard,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn session(&self) -> &Session<S> {
        &self.session
    }

    pub fn refresh_key(&self) -> u64 {
        self.refresh_key
    }

    pub fn auth(&self) -> &AuthView {
        &self.auth
    }

    pub fn catalog(&self) -> &CarCatalogView {
        &self.catalog
    }

    pub fn customer_bookings(&self) -> &CustomerBookingsView {
        &self.customer_bookings
    }

    pub fn admin_bookings(&self) -> &AdminBookingsView {
        &self.admin_bookings
    }

    fn user(&self) -> Result<&User, ViewError> {
        self.session.identity().ok_or(ViewError::LoggedOut)
    }

    /// First paint of whichever dashboard the restored identity gets.
    pub async fn start(&mut self) -> Result<(), ViewError> {
        if self.session.identity().is_none() {
            return Ok(());
        }
        self.enter_dashboard().await
    }

    async fn enter_dashboard(&mut self) -> Result<(), ViewError> {
        self.catalog = CarCatalogView::new();
        self.customer_bookings = CustomerBookingsView::new();
        self.admin_bookings = AdminBookingsView::new();

        let catalog = self.catalog.load(&self.api).await;
        let bookings = self.sync_bookings().await;
        catalog.and(bookings)
    }

    /// Lets the booking list for the current role catch up with the
    /// identity and the refresh signal.
    async fn sync_bookings(&mut self) -> Result<(), ViewError> {
        let Some(user) = self.session.identity() else {
            return Ok(());
        };
        match user.role {
            Role::Customer => {
                self.customer_bookings
                    .sync(&self.api, user, self.refresh_key)
                    .await?;
            }
            Role::Admin => {
                self.admin_bookings.sync(&self.api, user).await?;
            }
        }
        Ok(())
    }

    pub fn toggle_auth_mode(&mut self) {
        self.auth.toggle_mode();
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<(), ViewError> {
        self.auth.set_mode(AuthMode::Login);
        let form = self.auth.form_mut();
        form.email = email.to_string();
        form.password = password.to_string();
        self.submit_auth().await
    }

    pub async fn register(&mut self, name: &str, email: &str, password: &str) -> Result<(), ViewError> {
        self.auth.set_mode(AuthMode::Register);
        let form = self.auth.form_mut();
        form.name = name.to_string();
        form.email = email.to_string();
        form.password = password.to_string();
        self.submit_auth().await
    }

    async fn submit_auth(&mut self) -> Result<(), ViewError> {
        let user = self.auth.submit(&self.api).await?;
        self.session.set_identity(user);
        self.enter_dashboard().await
    }

    /// Forgets the identity everywhere. Requests already sent are left alone.
    pub fn logout(&mut self) {
        self.session.clear_identity();
        self.auth = AuthView::new();
        self.catalog = CarCatalogView::new();
        self.customer_bookings = CustomerBookingsView::new();
        self.admin_bookings = AdminBookingsView::new();
    }

    pub async fn reload_cars(&mut self) -> Result<(), ViewError> {
        self.user()?;
        self.catalog.load(&self.api).await
    }

    pub async fn apply_filter(
        &mut self,
        start_date: Option<Date>,
        end_date: Option<Date>,
    ) -> Result<(), ViewError> {
        self.user()?;
        self.catalog.apply_filter(&self.api, start_date, end_date).await
    }

    pub async fn reset_filter(&mut self) -> Result<(), ViewError> {
        self.user()?;
        self.catalog.reset_filter(&self.api).await
    }

    /// Books for the current filter. Once the backend accepts, the history
    /// resyncs even if the catalog reload failed.
    pub async fn book(&mut self, car_id: CarId) -> Result<Booked, ViewError> {
        let user = self.session.identity().ok_or(ViewError::LoggedOut)?;
        let refresh_key = &mut self.refresh_key;
        let mut booked = self
            .catalog
            .book(&self.api, user, car_id, || *refresh_key += 1)
            .await?;
        let history = self.sync_bookings().await;
        booked.reload = booked.reload.and(history);
        Ok(booked)
    }

    pub fn set_car_field(&mut self, field: FormField, value: &str) -> Result<(), ViewError> {
        if !self.user()?.is_admin() {
            return Err(ViewError::NotPermitted);
        }
        self.catalog.form_mut().set(field, value);
        Ok(())
    }

    pub fn start_edit(&mut self, car_id: CarId) -> Result<(), ViewError> {
        if !self.user()?.is_admin() {
            return Err(ViewError::NotPermitted);
        }
        self.catalog.start_edit(car_id)
    }

    pub fn cancel_edit(&mut self) {
        self.catalog.cancel_edit();
    }

    pub async fn submit_car(&mut self) -> Result<Car, ViewError> {
        let user = self.session.identity().ok_or(ViewError::LoggedOut)?;
        self.catalog.submit_car(&self.api, user).await
    }

    pub async fn delete_car<C: Confirm>(&mut self, car_id: CarId, confirm: &mut C) -> Result<(), ViewError> {
        let user = self.session.identity().ok_or(ViewError::LoggedOut)?;
        self.catalog.delete_car(&self.api, user, car_id, confirm).await
    }

    pub async fn reload_bookings(&mut self) -> Result<(), ViewError> {
        let user = self.session.identity().ok_or(ViewError::LoggedOut)?;
        match user.role {
            Role::Customer => self.customer_bookings.load(&self.api, user).await,
            Role::Admin => self.admin_bookings.load(&self.api, user).await,
        }
    }

    pub async fn cancel_booking(&mut self, booking_id: BookingId) -> Result<(), ViewError> {
        let user = self.session.identity().ok_or(ViewError::LoggedOut)?;
        if !user.is_customer() {
            return Err(ViewError::NotPermitted);
        }
        self.customer_bookings.cancel(&self.api, user, booking_id).await
    }

    pub fn set_draft_status(&mut self, booking_id: BookingId, status: BookingStatus) -> Result<(), ViewError> {
        if !self.user()?.is_admin() {
            return Err(ViewError::NotPermitted);
        }
        self.admin_bookings.set_draft(booking_id, status)
    }

    pub async fn save_status(&mut self, booking_id: BookingId) -> Result<Booking, ViewError> {
        let user = self.session.identity().ok_or(ViewError::LoggedOut)?;
        self.admin_bookings.save(&self.api, user, booking_id).await
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "HCL Car Rentals | Car Rental Booking Platform");
        let Some(user) = self.session.identity() else {
            let _ = writeln!(out);
            let _ = write!(out, "{}", self.auth.render());
            let _ = writeln!(out);
            let _ = writeln!(out, "Customer features: register, view available cars by date, place bookings, and track booking history.");
            let _ = writeln!(out, "Admin features: add/update/delete cars and review all platform bookings from one dashboard.");
            return out;
        };

        let _ = writeln!(out, "{} ({})  [logout]", user.name, user.role);
        let _ = writeln!(out);
        let _ = write!(out, "{}", self.catalog.render(user));
        let _ = writeln!(out);
        match user.role {
            Role::Customer => {
                let _ = write!(out, "{}", self.customer_bookings.render());
            }
            Role::Admin => {
                let _ = write!(out, "{}", self.admin_bookings.render());
            }
        }
        out
    }
}
