use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnassignedReason {
    #[serde(rename = "no free staff")]
    NoFreeStaff,
    #[serde(rename = "guard or capacity")]
    GuardOrCapacity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentPlanRow {
    pub order_id: Uuid,
    pub slot_minutes: u32,
    pub area_tag: String,
    pub assigned_to: Option<Uuid>,
    pub assigned_to_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<UnassignedReason>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketDetail {
    pub slot_minutes: u32,
    pub area_tag: String,
    pub orders: u32,
    pub pool_size: u32,
    pub assigned: u32,
    pub unassigned: u32,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AreaTally {
    pub assigned: u32,
    pub unassigned: u32,
}

/// Planner output. Buckets are folded in ascending (slot_minutes, area_tag)
/// order, which fixes every tie-break in `rows` and `details`; identical
/// inputs always produce an identical plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Plan {
    pub assigned: u32,
    pub unassigned: u32,
    pub per_area: BTreeMap<String, AreaTally>,
    pub per_driver: BTreeMap<Uuid, u32>,
    pub details: Vec<BucketDetail>,
    pub rows: Vec<AssignmentPlanRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowOutcome {
    Applied,
    Stale,
    Skipped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyRowResult {
    pub order_id: Uuid,
    pub outcome: RowOutcome,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplyReport {
    pub applied: u32,
    pub rows: Vec<ApplyRowResult>,
}
