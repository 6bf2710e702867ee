use std::fmt::Write;
use std::str::FromStr;
use time::Date;
use tracing::info;
use crate::controller::ViewError;
use crate::helpers::confirm::Confirm;
use crate::helpers::fetch_sequence::{ListState, LoadState};
use crate::helpers::format_money;
use crate::helpers::table::Table;
use crate::models::booking::{Booking, BookingRequest};
use crate::models::car::{Car, CarId, CarPayload};
use crate::models::date::{current_year, format_date};
use crate::models::filter::DateFilter;
use crate::models::user::User;
use crate::repositories::RentalApi;

pub const MISSING_DATES: &str = "Select start and end dates before booking";
pub const BOOKING_CREATED: &str = "Booking created successfully";
pub const DELETE_PROMPT: &str = "Delete this car?";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormField {
    Make,
    Model,
    Year,
    Color,
    Price,
}

impl FromStr for FormField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "make" => Ok(FormField::Make),
            "model" => Ok(FormField::Model),
            "year" => Ok(FormField::Year),
            "color" | "colour" => Ok(FormField::Color),
            "price" => Ok(FormField::Price),
            other => Err(format!("Unknown car field '{}'. Use make, model, year, color or price", other)),
        }
    }
}

/// A booking the backend accepted, and how the catalog reload after it went.
#[derive(Clone, Debug, PartialEq)]
pub struct Booked {
    pub booking: Booking,
    pub reload: Result<(), ViewError>,
}

/// Draft car exactly as typed. Numbers stay text until submit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CarForm {
    pub make: String,
    pub model: String,
    pub year: String,
    pub color: String,
    pub rental_price_per_day: String,
}

impl Default for CarForm {
    fn default() -> Self {
        Self {
            make: String::new(),
            model: String::new(),
            year: current_year().to_string(),
            color: String::new(),
            rental_price_per_day: String::new(),
        }
    }
}

impl CarForm {
    pub fn from_car(car: &Car) -> Self {
        Self {
            make: car.make.clone(),
            model: car.model.clone(),
            year: car.year.to_string(),
            color: car.color.clone().unwrap_or_default(),
            rental_price_per_day: car.rental_price_per_day.to_string(),
        }
    }

    pub fn set(&mut self, field: FormField, value: &str) {
        let value = value.to_string();
        match field {
            FormField::Make => self.make = value,
            FormField::Model => self.model = value,
            FormField::Year => self.year = value,
            FormField::Color => self.color = value,
            FormField::Price => self.rental_price_per_day = value,
        }
    }

    /// Coerces the numeric fields and checks the required ones are filled.
    pub fn to_payload(&self) -> Result<CarPayload, ViewError> {
        if self.make.trim().is_empty() {
            return Err(ViewError::Validation("Make is required".to_string()));
        }
        if self.model.trim().is_empty() {
            return Err(ViewError::Validation("Model is required".to_string()));
        }
        let year = self.year.trim().parse::<i32>().map_err(|_| {
            ViewError::Validation(format!("Year must be a whole number, got '{}'", self.year))
        })?;
        let rental_price_per_day = self
            .rental_price_per_day
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|price| price.is_finite())
            .ok_or_else(|| {
                ViewError::Validation(format!(
                    "Price per day must be a number, got '{}'",
                    self.rental_price_per_day
                ))
            })?;
        let color = Some(self.color.clone()).filter(|c| !c.trim().is_empty());

        Ok(CarPayload {
            make: self.make.clone(),
            model: self.model.clone(),
            year,
            color,
            rental_price_per_day,
        })
    }
}

/// Car list with its date filter, plus the admin add/edit form.
pub struct CarCatalogView {
    filter: DateFilter,
    cars: ListState<Car>,
    form: CarForm,
    edit_target: Option<CarId>,
}

impl Default for CarCatalogView {
    fn default() -> Self {
        Self::new()
    }
}

impl CarCatalogView {
    pub fn new() -> Self {
        Self::with_filter(DateFilter::upcoming())
    }

    pub fn with_filter(filter: DateFilter) -> Self {
        Self {
            filter,
            cars: ListState::default(),
            form: CarForm::default(),
            edit_target: None,
        }
    }

    pub fn cars(&self) -> &[Car] {
        self.cars.items()
    }

    pub fn load_state(&self) -> &LoadState {
        self.cars.state()
    }

    pub fn filter(&self) -> &DateFilter {
        &self.filter
    }

    pub fn form(&self) -> &CarForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut CarForm {
        &mut self.form
    }

    pub fn edit_target(&self) -> Option<CarId> {
        self.edit_target
    }

    /// Reloads with whatever filter is currently set.
    pub async fn load<A: RentalApi>(&mut self, api: &A) -> Result<(), ViewError> {
        let ticket = self.cars.begin();
        let result = api.get_cars(&self.filter).await;
        self.cars.finish(ticket, result)?;
        Ok(())
    }

    pub async fn apply_filter<A: RentalApi>(
        &mut self,
        api: &A,
        start_date: Option<Date>,
        end_date: Option<Date>,
    ) -> Result<(), ViewError> {
        self.filter = DateFilter::new(start_date, end_date);
        self.load(api).await
    }

    pub async fn reset_filter<A: RentalApi>(&mut self, api: &A) -> Result<(), ViewError> {
        self.filter = DateFilter::default();
        self.load(api).await
    }

    /// Books `car_id` for the filter's range. `on_created` fires once the
    /// backend accepted the booking, before the catalog reloads. A failed
    /// reload does not undo the booking; it comes back in `Booked::reload`.
    pub async fn book<A: RentalApi, F: FnOnce()>(
        &mut self,
        api: &A,
        user: &User,
        car_id: CarId,
        on_created: F,
    ) -> Result<Booked, ViewError> {
        if !user.is_customer() {
            return Err(ViewError::NotPermitted);
        }
        let (start_date, end_date) = self
            .filter
            .range()
            .ok_or_else(|| ViewError::Validation(MISSING_DATES.to_string()))?;

        let request = BookingRequest {
            user_id: user.id,
            car_id,
            start_date,
            end_date,
        };
        let booking = api.create_booking(&request).await?;
        info!("Booked car {} for user {} as booking {}", car_id, user.id, booking.id);
        on_created();

        let reload = self.load(api).await;
        Ok(Booked { booking, reload })
    }

    pub fn start_edit(&mut self, car_id: CarId) -> Result<(), ViewError> {
        let car = self
            .cars()
            .iter()
            .find(|car| car.id == car_id)
            .ok_or_else(|| ViewError::Validation(format!("Car #{} is not in the list", car_id)))?;
        let form = CarForm::from_car(car);
        self.form = form;
        self.edit_target = Some(car_id);
        Ok(())
    }

    pub fn cancel_edit(&mut self) {
        self.edit_target = None;
        self.form = CarForm::default();
    }

    /// Creates a car, or updates the edit target when one is set.
    pub async fn submit_car<A: RentalApi>(&mut self, api: &A, user: &User) -> Result<Car, ViewError> {
        if !user.is_admin() {
            return Err(ViewError::NotPermitted);
        }
        let payload = self.form.to_payload()?;

        let car = match self.edit_target {
            Some(id) => api.update_car(id, &payload, user.id).await?,
            None => api.add_car(&payload, user.id).await?,
        };
        info!("Saved car {} ({} {})", car.id, car.make, car.model);
        self.cancel_edit();

        self.load(api).await?;
        Ok(car)
    }

    pub async fn delete_car<A: RentalApi, C: Confirm>(
        &mut self,
        api: &A,
        user: &User,
        car_id: CarId,
        confirm: &mut C,
    ) -> Result<(), ViewError> {
        if !user.is_admin() {
            return Err(ViewError::NotPermitted);
        }
        if !confirm.confirm(DELETE_PROMPT) {
            return Err(ViewError::Declined);
        }

        api.delete_car(car_id, user.id).await?;
        info!("Deleted car {}", car_id);
        if self.edit_target == Some(car_id) {
            self.cancel_edit();
        }

        self.load(api).await
    }

    pub fn render(&self, user: &User) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "== Available Cars ==");
        let dates = match (self.filter.start_date, self.filter.end_date) {
            (None, None) => "any".to_string(),
            (start, end) => format!(
                "{} to {}",
                start.map(format_date).unwrap_or_else(|| "?".to_string()),
                end.map(format_date).unwrap_or_else(|| "?".to_string())
            ),
        };
        let _ = writeln!(out, "Dates: {}", dates);
        match self.load_state() {
            LoadState::Loading => {
                let _ = writeln!(out, "(loading)");
            }
            LoadState::Failed(message) => {
                let _ = writeln!(out, "(last refresh failed: {})", message);
            }
            LoadState::Idle | LoadState::Loaded => {}
        }

        let mut table = Table::new(&["ID", "Car", "Year", "Color", "Per day", "Actions"], "No cars available.");
        let actions = if user.is_admin() { "edit | delete" } else { "book" };
        for car in self.cars() {
            table.push_row(vec![
                format!("#{}", car.id),
                format!("{} {}", car.make, car.model),
                car.year.to_string(),
                car.color.clone().unwrap_or_else(|| "N/A color".to_string()),
                format_money(car.rental_price_per_day),
                actions.to_string(),
            ]);
        }
        let _ = write!(out, "{}", table);

        if user.is_admin() {
            let title = match self.edit_target {
                Some(id) => format!("Update Car #{}", id),
                None => "Add New Car".to_string(),
            };
            let _ = writeln!(out, "-- {} --", title);
            let _ = writeln!(out, "make:  {}", self.form.make);
            let _ = writeln!(out, "model: {}", self.form.model);
            let _ = writeln!(out, "year:  {}", self.form.year);
            let _ = writeln!(out, "color: {}", self.form.color);
            let _ = writeln!(out, "price: {}", self.form.rental_price_per_day);
        }
        out
    }
}
