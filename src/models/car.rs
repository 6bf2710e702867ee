use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

pub type CarId = i64;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    pub id: CarId,
    pub make: String,
    pub model: String,
    pub year: i32,
    #[serde(default)]
    pub color: Option<String>,
    pub rental_price_per_day: f64,
}

/// Body of the add/update car calls; the backend assigns the id.
#[skip_serializing_none]
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CarPayload {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub color: Option<String>,
    pub rental_price_per_day: f64,
}
