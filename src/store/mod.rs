pub mod memory;

pub use memory::{CancelOutcome, MemoryStore, StoreCounts};

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::area::ServiceArea;
use crate::models::order::Order;
use crate::models::staff::{StaffProfile, StaffShift};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Copy)]
pub struct BusyAssignment {
    pub user_id: Uuid,
    pub slot_minutes: u32,
}

pub trait DispatchStore: Send + Sync {
    fn shifts_for_date(&self, date: NaiveDate) -> Result<Vec<StaffShift>, StoreError>;

    fn profiles_for_users(&self, user_ids: &[Uuid]) -> Result<Vec<StaffProfile>, StoreError>;

    fn active_areas(&self) -> Result<Vec<ServiceArea>, StoreError>;

    fn unassigned_confirmed_orders(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        slot_minutes: Option<u32>,
    ) -> Result<Vec<Order>, StoreError>;

    fn busy_assignments(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<BusyAssignment>, StoreError>;

    fn conditional_assign(
        &self,
        order_id: Uuid,
        user_id: Uuid,
        label: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    fn conditional_unassign(&self, order_id: Uuid) -> Result<bool, StoreError>;

    fn annotate_area_tag(&self, order_id: Uuid, tag: &str) -> Result<bool, StoreError>;
}
