use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use crate::models::booking::{Booking, BookingId, BookingRequest, BookingStatus, BookingStatusUpdate};
use crate::models::car::{Car, CarId, CarPayload};
use crate::models::filter::DateFilter;
use crate::models::user::{LoginRequest, RegisterRequest, User, UserId};
use crate::repositories::api_error::ApiError;
use crate::repositories::{RentalApi, IDENTITY_HEADER};

/// reqwest-backed client for the rental REST backend.
pub struct RentalApiRepo {
    client: Client,
    base_url: String,
}

impl RentalApiRepo {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        debug!("{} {}", method, path);
        self.client.request(method, format!("{}{}", self.base_url, path))
    }

    fn privileged(&self, method: Method, path: &str, user_id: UserId) -> RequestBuilder {
        self.request(method, path)
            .header(IDENTITY_HEADER, user_id.to_string())
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let err = ApiError::from_transport(e);
                warn!("Request to rental backend failed due to: {}", err);
                return Err(err);
            }
        };

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = ApiError::from_response(status.as_u16(), &body);
        warn!("Rental backend answered {} due to: {}", status, err);
        Err(err)
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = self.execute(request).await?;
        response.json::<T>().await.map_err(|e| {
            let err = ApiError::from_transport(e);
            warn!("Failed to decode rental backend response due to: {}", err);
            err
        })
    }
}

impl RentalApi for RentalApiRepo {
    async fn register(&self, request: &RegisterRequest) -> Result<User, ApiError> {
        self.fetch(self.request(Method::POST, "/api/auth/register").json(request))
            .await
    }

    async fn login(&self, request: &LoginRequest) -> Result<User, ApiError> {
        self.fetch(self.request(Method::POST, "/api/auth/login").json(request))
            .await
    }

    async fn get_cars(&self, filter: &DateFilter) -> Result<Vec<Car>, ApiError> {
        let mut request = self.request(Method::GET, "/api/cars");
        let params = filter.query_params();
        if !params.is_empty() {
            request = request.query(&params);
        }
        self.fetch(request).await
    }

    async fn add_car(&self, car: &CarPayload, admin_id: UserId) -> Result<Car, ApiError> {
        self.fetch(self.privileged(Method::POST, "/api/cars", admin_id).json(car))
            .await
    }

    async fn update_car(
        &self,
        id: CarId,
        car: &CarPayload,
        admin_id: UserId,
    ) -> Result<Car, ApiError> {
        let path = format!("/api/cars/{}", id);
        self.fetch(self.privileged(Method::PUT, &path, admin_id).json(car))
            .await
    }

    async fn delete_car(&self, id: CarId, admin_id: UserId) -> Result<(), ApiError> {
        let path = format!("/api/cars/{}", id);
        self.execute(self.privileged(Method::DELETE, &path, admin_id))
            .await
            .map(|_| ())
    }

    async fn create_booking(&self, request: &BookingRequest) -> Result<Booking, ApiError> {
        self.fetch(self.request(Method::POST, "/api/bookings").json(request))
            .await
    }

    async fn get_bookings_by_user(&self, user_id: UserId) -> Result<Vec<Booking>, ApiError> {
        let path = format!("/api/bookings/user/{}", user_id);
        self.fetch(self.request(Method::GET, &path)).await
    }

    async fn get_all_bookings(&self, admin_id: UserId) -> Result<Vec<Booking>, ApiError> {
        self.fetch(self.privileged(Method::GET, "/api/bookings", admin_id))
            .await
    }

    async fn update_booking_status(
        &self,
        id: BookingId,
        status: BookingStatus,
        actor_id: UserId,
    ) -> Result<Booking, ApiError> {
        let path = format!("/api/bookings/{}", id);
        let body = BookingStatusUpdate {
            status,
            actor_user_id: actor_id,
        };
        self.fetch(self.request(Method::PUT, &path).json(&body))
            .await
    }
}
