use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceArea {
    pub tag: String,
    pub center: GeoPoint,
    pub radius_km: f64,
    pub active: bool,
}
