use serde::Serialize;
use utoipa::ToSchema;

use crate::service::geo::Coordinate;

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "name": "Acme Logistics",
    "address": "Sector 44, Gurugram",
    "latitude": 28.4595,
    "longitude": 77.0266
}))]
pub struct Client {
    pub id: u64,
    pub name: String,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Client {
    /// Registered site location, if both components are set.
    pub fn location(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinate::new(latitude, longitude)),
            _ => None,
        }
    }
}
