use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CheckInStatus {
    CheckedIn,
    CheckedOut,
}

/// An id as clients send it: a JSON number, or the string value of a form select.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum IdField {
    Number(u64),
    Text(String),
}

impl IdField {
    /// `None` for blank or non-numeric text.
    pub fn value(&self) -> Option<u64> {
        match self {
            IdField::Number(id) => Some(*id),
            IdField::Text(raw) => raw.trim().parse().ok(),
        }
    }
}

impl From<u64> for IdField {
    fn from(id: u64) -> Self {
        IdField::Number(id)
    }
}

/// Body of `POST /checkin`. Fields are optional here so that missing ones
/// surface as a 400 with a readable message.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CheckInRequest {
    #[schema(value_type = Option<u64>, example = 1)]
    pub client_id: Option<IdField>,
    #[schema(example = 28.4595)]
    pub latitude: Option<f64>,
    #[schema(example = 77.0266)]
    pub longitude: Option<f64>,
    #[schema(example = "Quarterly review", nullable = true)]
    pub notes: Option<String>,
    /// Required when a manager checks in a team member.
    #[schema(value_type = Option<u64>, example = 2, nullable = true)]
    pub employee_id: Option<IdField>,
}

/// A check-in ready to be committed. Distance is computed before the insert.
#[derive(Debug, Clone)]
pub struct NewCheckIn {
    pub employee_id: u64,
    pub client_id: u64,
    pub latitude: f64,
    pub longitude: f64,
    pub distance_from_client: Option<f64>,
    pub notes: Option<String>,
    pub checkin_time: DateTime<Utc>,
}

/// Stored check-in joined with the client it was made at.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[schema(example = json!({
    "id": 12,
    "employee_id": 2,
    "client_id": 1,
    "client_name": "Acme Logistics",
    "client_address": "Sector 44, Gurugram",
    "latitude": 28.5,
    "longitude": 77.03,
    "distance_from_client": 4.45,
    "notes": "Quarterly review",
    "status": "checked_in",
    "checkin_time": "2026-01-05T09:12:00Z",
    "checkout_time": null
}))]
pub struct CheckInRecord {
    pub id: u64,
    pub employee_id: u64,
    pub client_id: u64,
    pub client_name: String,
    pub client_address: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub distance_from_client: Option<f64>,
    pub notes: Option<String>,
    pub status: CheckInStatus,
    #[schema(value_type = String, format = "date-time")]
    pub checkin_time: DateTime<Utc>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub checkout_time: Option<DateTime<Utc>>,
}
