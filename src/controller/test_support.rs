use std::cell::RefCell;
use time::macros::date;
use time::Date;
use crate::models::booking::{Booking, BookingId, BookingRequest, BookingStatus};
use crate::models::car::{Car, CarId, CarPayload};
use crate::models::filter::DateFilter;
use crate::models::user::{LoginRequest, RegisterRequest, Role, User, UserId};
use crate::repositories::api_error::ApiError;
use crate::repositories::RentalApi;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Register(String),
    Login(String),
    GetCars(Option<(Date, Date)>),
    AddCar(CarPayload, UserId),
    UpdateCar(CarId, CarPayload, UserId),
    DeleteCar(CarId, UserId),
    CreateBooking(BookingRequest),
    GetBookingsByUser(UserId),
    GetAllBookings(UserId),
    UpdateBookingStatus(BookingId, BookingStatus, UserId),
}

pub fn customer() -> User {
    User {
        id: 1,
        name: "A".to_string(),
        email: "a@b.com".to_string(),
        role: Role::Customer,
    }
}

pub fn admin() -> User {
    User {
        id: 9,
        name: "HCL Admin".to_string(),
        email: "admin@demo.com".to_string(),
        role: Role::Admin,
    }
}

pub fn sample_car(id: CarId) -> Car {
    Car {
        id,
        make: format!("Make{}", id),
        model: format!("Model{}", id),
        year: 2022,
        color: Some("White".to_string()),
        rental_price_per_day: 1000.0 * id as f64,
    }
}

pub fn sample_booking(id: BookingId, user_id: UserId, status: BookingStatus) -> Booking {
    Booking {
        id,
        user_id,
        car_id: 1,
        start_date: date!(2024 - 01 - 01),
        end_date: date!(2024 - 01 - 03),
        total_price: 3000.0,
        status,
    }
}

/// In-memory backend that records every call it receives.
#[derive(Default)]
pub struct FakeApi {
    calls: RefCell<Vec<Call>>,
    cars: RefCell<Vec<Car>>,
    bookings: RefCell<Vec<Booking>>,
    failure: RefCell<Option<(usize, String)>>,
}

impl FakeApi {
    pub fn with_cars(cars: Vec<Car>) -> Self {
        let api = Self::default();
        *api.cars.borrow_mut() = cars;
        api
    }

    pub fn with_bookings(bookings: Vec<Booking>) -> Self {
        let api = Self::default();
        *api.bookings.borrow_mut() = bookings;
        api
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// The next call is still recorded but fails with `message`.
    pub fn fail_next(&self, message: &str) {
        self.fail_after(0, message);
    }

    /// Lets `skip` calls through, then fails the one after with `message`.
    pub fn fail_after(&self, skip: usize, message: &str) {
        *self.failure.borrow_mut() = Some((skip, message.to_string()));
    }

    fn record(&self, call: Call) -> Result<(), ApiError> {
        self.calls.borrow_mut().push(call);
        let mut failure = self.failure.borrow_mut();
        match failure.take() {
            Some((0, message)) => Err(ApiError::new(message)),
            Some((skip, message)) => {
                *failure = Some((skip - 1, message));
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn next_car_id(&self) -> CarId {
        self.cars.borrow().iter().map(|c| c.id).max().unwrap_or(0) + 1
    }
}

fn car_from(id: CarId, payload: &CarPayload) -> Car {
    Car {
        id,
        make: payload.make.clone(),
        model: payload.model.clone(),
        year: payload.year,
        color: payload.color.clone(),
        rental_price_per_day: payload.rental_price_per_day,
    }
}

impl RentalApi for FakeApi {
    async fn register(&self, request: &RegisterRequest) -> Result<User, ApiError> {
        self.record(Call::Register(request.email.clone()))?;
        Ok(User {
            id: 100,
            name: request.name.clone(),
            email: request.email.clone(),
            role: Role::Customer,
        })
    }

    async fn login(&self, request: &LoginRequest) -> Result<User, ApiError> {
        self.record(Call::Login(request.email.clone()))?;
        match (request.email.as_str(), request.password.as_str()) {
            ("a@b.com", "x") => Ok(customer()),
            ("admin@demo.com", "admin123") => Ok(admin()),
            _ => Err(ApiError::new("Invalid credentials")),
        }
    }

    async fn get_cars(&self, filter: &DateFilter) -> Result<Vec<Car>, ApiError> {
        self.record(Call::GetCars(filter.range()))?;
        Ok(self.cars.borrow().clone())
    }

    async fn add_car(&self, car: &CarPayload, admin_id: UserId) -> Result<Car, ApiError> {
        self.record(Call::AddCar(car.clone(), admin_id))?;
        let created = car_from(self.next_car_id(), car);
        self.cars.borrow_mut().push(created.clone());
        Ok(created)
    }

    async fn update_car(
        &self,
        id: CarId,
        car: &CarPayload,
        admin_id: UserId,
    ) -> Result<Car, ApiError> {
        self.record(Call::UpdateCar(id, car.clone(), admin_id))?;
        let updated = car_from(id, car);
        let mut cars = self.cars.borrow_mut();
        match cars.iter_mut().find(|c| c.id == id) {
            Some(existing) => *existing = updated.clone(),
            None => return Err(ApiError::new("Car not found")),
        }
        Ok(updated)
    }

    async fn delete_car(&self, id: CarId, admin_id: UserId) -> Result<(), ApiError> {
        self.record(Call::DeleteCar(id, admin_id))?;
        self.cars.borrow_mut().retain(|c| c.id != id);
        Ok(())
    }

    async fn create_booking(&self, request: &BookingRequest) -> Result<Booking, ApiError> {
        self.record(Call::CreateBooking(request.clone()))?;
        let mut bookings = self.bookings.borrow_mut();
        let booking = Booking {
            id: bookings.iter().map(|b| b.id).max().unwrap_or(0) + 1,
            user_id: request.user_id,
            car_id: request.car_id,
            start_date: request.start_date,
            end_date: request.end_date,
            total_price: 0.0,
            status: BookingStatus::Booked,
        };
        bookings.push(booking.clone());
        Ok(booking)
    }

    async fn get_bookings_by_user(&self, user_id: UserId) -> Result<Vec<Booking>, ApiError> {
        self.record(Call::GetBookingsByUser(user_id))?;
        Ok(self
            .bookings
            .borrow()
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_all_bookings(&self, admin_id: UserId) -> Result<Vec<Booking>, ApiError> {
        self.record(Call::GetAllBookings(admin_id))?;
        Ok(self.bookings.borrow().clone())
    }

    async fn update_booking_status(
        &self,
        id: BookingId,
        status: BookingStatus,
        actor_id: UserId,
    ) -> Result<Booking, ApiError> {
        self.record(Call::UpdateBookingStatus(id, status, actor_id))?;
        let mut bookings = self.bookings.borrow_mut();
        let booking = bookings
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| ApiError::new("Booking not found"))?;
        booking.status = status;
        Ok(booking.clone())
    }
}
