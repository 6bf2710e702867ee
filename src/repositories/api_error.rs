use serde_json::Value;
use thiserror::Error;

pub const GENERIC_FAILURE: &str = "Request failed";

/// The one failure shape every backend call produces: a message fit to show
/// the user as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    /// Builds the error for a response that came back with a failure status.
    pub fn from_response(status: u16, body: &str) -> Self {
        let transport = format!("Request failed with status code {}", status);
        Self::new(extract_message(body, Some(&transport)))
    }

    /// Builds the error for a request that never produced a usable response.
    pub fn from_transport(err: reqwest::Error) -> Self {
        let transport = err.without_url().to_string();
        Self::new(extract_message("", Some(&transport)))
    }
}

/// Picks the most specific message available: the backend's `message` field,
/// then the raw body, then the transport error, then a fixed fallback.
pub fn extract_message(body: &str, transport: Option<&str>) -> String {
    if let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(body) {
        if let Some(Value::String(message)) = fields.get("message") {
            if !message.trim().is_empty() {
                return message.clone();
            }
        }
    }

    let raw = body.trim();
    if !raw.is_empty() {
        return raw.to_string();
    }

    match transport.map(str::trim) {
        Some(transport) if !transport.is_empty() => transport.to_string(),
        _ => GENERIC_FAILURE.to_string(),
    }
}
