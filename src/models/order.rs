use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::area::GeoPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    EnRoute,
    Fulfilled,
    Canceled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub address: Option<GeoPoint>,
    pub service_area_tag: Option<String>,
    pub delivery_slot_start: DateTime<Utc>,
    pub delivery_slot_minutes: u32,
    pub status: OrderStatus,
    pub assigned_to: Option<Uuid>,
    pub assigned_to_label: Option<String>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn is_dispatchable(&self) -> bool {
        self.status == OrderStatus::Confirmed && self.assigned_to.is_none()
    }
}
