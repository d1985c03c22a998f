use crate::feedback::MissingField;
use serde::{Deserialize, Serialize};

/// Shown when an error reply has nothing readable in it.
const GENERIC_STATUS_MESSAGE: &str = "parking service returned status";

#[derive(Debug, Serialize)]
pub struct FindParkingRequest<'a> {
    pub address: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct MissingInfoResponse {
    #[serde(default)]
    pub missing_fields: Vec<String>,
}

impl MissingInfoResponse {
    pub fn into_fields(self) -> Vec<MissingField> {
        self.missing_fields
            .iter()
            .map(|name| MissingField::parse(name))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterParkingRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub covered: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing_info: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterParkingResponse {
    pub id: String,
    pub status: String,
}

/// Error shapes the backend produces: `{"detail": ...}` from raised HTTP
/// errors and `{"error": "..."}` from handled lookups.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
}

impl ErrorBody {
    fn message(self) -> Option<String> {
        if let Some(error) = self.error.filter(|e| !e.trim().is_empty()) {
            return Some(error);
        }
        match self.detail? {
            serde_json::Value::String(detail) if !detail.trim().is_empty() => Some(detail),
            serde_json::Value::Array(items) => items
                .iter()
                .find_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .map(str::to_string),
            _ => None,
        }
    }
}

/// Human-readable message for a failed reply.
pub fn backend_message(status: u16, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(ErrorBody::message)
        .unwrap_or_else(|| format!("{GENERIC_STATUS_MESSAGE} {status}"))
}

/// The `error` string of a reply that reports failure with a success status.
pub fn embedded_error(body: &serde_json::Value) -> Option<&str> {
    body.get("error").and_then(|e| e.as_str())
}
