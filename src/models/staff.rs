use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::area::GeoPoint;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffShift {
    pub id: Uuid,
    pub user_id: Uuid,
    pub work_date: NaiveDate,
    pub start_minutes: u32,
    pub end_minutes: u32,
    pub timezone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffProfile {
    pub user_id: Uuid,
    pub display_name: String,
    pub area_tags: Vec<String>,
    pub home: Option<GeoPoint>,
}
