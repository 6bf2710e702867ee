use crate::models::booking::{Booking, BookingId, BookingRequest, BookingStatus};
use crate::models::car::{Car, CarId, CarPayload};
use crate::models::filter::DateFilter;
use crate::models::user::{LoginRequest, RegisterRequest, User, UserId};
use crate::repositories::api_error::ApiError;

pub mod api_error;
pub mod rental_api_repo;
pub mod session_store;

/// Header privileged routes read the acting user's id from.
pub const IDENTITY_HEADER: &str = "X-USER-ID";

/// Every call the views make against the rental backend. One request each,
/// no retries.
#[allow(async_fn_in_trait)]
pub trait RentalApi {
    async fn register(&self, request: &RegisterRequest) -> Result<User, ApiError>;

    async fn login(&self, request: &LoginRequest) -> Result<User, ApiError>;

    async fn get_cars(&self, filter: &DateFilter) -> Result<Vec<Car>, ApiError>;

    async fn add_car(&self, car: &CarPayload, admin_id: UserId) -> Result<Car, ApiError>;

    async fn update_car(
        &self,
        id: CarId,
        car: &CarPayload,
        admin_id: UserId,
    ) -> Result<Car, ApiError>;

    async fn delete_car(&self, id: CarId, admin_id: UserId) -> Result<(), ApiError>;

    async fn create_booking(&self, request: &BookingRequest) -> Result<Booking, ApiError>;

    async fn get_bookings_by_user(&self, user_id: UserId) -> Result<Vec<Booking>, ApiError>;

    async fn get_all_bookings(&self, admin_id: UserId) -> Result<Vec<Booking>, ApiError>;

    async fn update_booking_status(
        &self,
        id: BookingId,
        status: BookingStatus,
        actor_id: UserId,
    ) -> Result<Booking, ApiError>;
}
