use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use crate::models::area::ServiceArea;
use crate::models::order::{Order, OrderStatus};
use crate::models::staff::{StaffProfile, StaffShift};
use crate::store::{BusyAssignment, DispatchStore, StoreError};

type AreaTable = BTreeMap<String, ServiceArea>;

#[derive(Debug, Default)]
pub struct MemoryStore {
    orders: DashMap<Uuid, Order>,
    shifts: DashMap<Uuid, StaffShift>,
    profiles: DashMap<Uuid, StaffProfile>,
    areas: RwLock<AreaTable>,
}

#[derive(Debug)]
pub enum CancelOutcome {
    Canceled(Order),
    NotCancelable(OrderStatus),
    NotFound,
}

#[derive(Debug, Clone, Copy)]
pub struct StoreCounts {
    pub orders: usize,
    pub shifts: usize,
    pub profiles: usize,
    pub areas: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn areas_read(&self) -> Result<RwLockReadGuard<'_, AreaTable>, StoreError> {
        self.areas
            .read()
            .map_err(|_| StoreError::Unavailable("service area table lock poisoned".into()))
    }

    fn areas_write(&self) -> Result<RwLockWriteGuard<'_, AreaTable>, StoreError> {
        self.areas
            .write()
            .map_err(|_| StoreError::Unavailable("service area table lock poisoned".into()))
    }

    pub fn insert_order(&self, order: Order) {
        self.orders.insert(order.id, order);
    }

    pub fn get_order(&self, id: Uuid) -> Option<Order> {
        self.orders.get(&id).map(|entry| entry.value().clone())
    }

    pub fn cancel_order(&self, id: Uuid) -> CancelOutcome {
        let Some(mut order) = self.orders.get_mut(&id) else {
            return CancelOutcome::NotFound;
        };

        match order.status {
            OrderStatus::Pending | OrderStatus::Confirmed => {
                order.status = OrderStatus::Canceled;
                CancelOutcome::Canceled(order.clone())
            }
            status => CancelOutcome::NotCancelable(status),
        }
    }

    pub fn upsert_profile(&self, profile: StaffProfile) {
        self.profiles.insert(profile.user_id, profile);
    }

    pub fn list_profiles(&self) -> Vec<StaffProfile> {
        let mut profiles: Vec<StaffProfile> = self
            .profiles
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        profiles.sort_by(|a, b| a.display_name.cmp(&b.display_name).then(a.user_id.cmp(&b.user_id)));
        profiles
    }

    pub fn insert_shift(&self, shift: StaffShift) {
        self.shifts.insert(shift.id, shift);
    }

    pub fn insert_area(&self, area: ServiceArea) -> Result<bool, StoreError> {
        let mut areas = self.areas_write()?;
        if areas.contains_key(&area.tag) {
            return Ok(false);
        }
        areas.insert(area.tag.clone(), area);
        Ok(true)
    }

    pub fn set_area_active(&self, tag: &str, active: bool) -> Result<Option<ServiceArea>, StoreError> {
        let mut areas = self.areas_write()?;
        let Some(area) = areas.get_mut(tag) else {
            return Ok(None);
        };
        area.active = active;
        Ok(Some(area.clone()))
    }

    pub fn list_areas(&self) -> Result<Vec<ServiceArea>, StoreError> {
        Ok(self.areas_read()?.values().cloned().collect())
    }

    pub fn counts(&self) -> Result<StoreCounts, StoreError> {
        Ok(StoreCounts {
            orders: self.orders.len(),
            shifts: self.shifts.len(),
            profiles: self.profiles.len(),
            areas: self.areas_read()?.len(),
        })
    }

    fn order_in_window(order: &Order, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
        from <= order.delivery_slot_start && order.delivery_slot_start < to
    }
}

impl DispatchStore for MemoryStore {
    fn shifts_for_date(&self, date: NaiveDate) -> Result<Vec<StaffShift>, StoreError> {
        let mut shifts: Vec<StaffShift> = self
            .shifts
            .iter()
            .filter(|entry| entry.value().work_date == date)
            .map(|entry| entry.value().clone())
            .collect();
        shifts.sort_by(|a, b| {
            a.start_minutes
                .cmp(&b.start_minutes)
                .then(a.user_id.cmp(&b.user_id))
                .then(a.id.cmp(&b.id))
        });
        Ok(shifts)
    }

    fn profiles_for_users(&self, user_ids: &[Uuid]) -> Result<Vec<StaffProfile>, StoreError> {
        Ok(user_ids
            .iter()
            .filter_map(|user_id| {
                self.profiles
                    .get(user_id)
                    .map(|entry| entry.value().clone())
            })
            .collect())
    }

    fn active_areas(&self) -> Result<Vec<ServiceArea>, StoreError> {
        let areas = self.areas_read()?;
        Ok(areas.values().filter(|area| area.active).cloned().collect())
    }

    fn unassigned_confirmed_orders(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        slot_minutes: Option<u32>,
    ) -> Result<Vec<Order>, StoreError> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .filter(|entry| {
                let order = entry.value();
                order.is_dispatchable()
                    && Self::order_in_window(order, from, to)
                    && slot_minutes.is_none_or(|slot| order.delivery_slot_minutes == slot)
            })
            .map(|entry| entry.value().clone())
            .collect();
        orders.sort_by(|a, b| {
            a.delivery_slot_minutes
                .cmp(&b.delivery_slot_minutes)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        });
        Ok(orders)
    }

    fn busy_assignments(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<BusyAssignment>, StoreError> {
        Ok(self
            .orders
            .iter()
            .filter_map(|entry| {
                let order = entry.value();
                let user_id = order.assigned_to?;
                if order.status != OrderStatus::Canceled && Self::order_in_window(order, from, to) {
                    Some(BusyAssignment {
                        user_id,
                        slot_minutes: order.delivery_slot_minutes,
                    })
                } else {
                    None
                }
            })
            .collect())
    }

    fn conditional_assign(
        &self,
        order_id: Uuid,
        user_id: Uuid,
        label: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let Some(mut order) = self.orders.get_mut(&order_id) else {
            return Ok(false);
        };

        if order.assigned_to.is_some() || order.status != OrderStatus::Confirmed {
            return Ok(false);
        }

        order.assigned_to = Some(user_id);
        order.assigned_to_label = Some(label.to_string());
        order.assigned_at = Some(at);
        Ok(true)
    }

    fn conditional_unassign(&self, order_id: Uuid) -> Result<bool, StoreError> {
        let Some(mut order) = self.orders.get_mut(&order_id) else {
            return Ok(false);
        };

        if order.assigned_to.is_none() || order.status != OrderStatus::Confirmed {
            return Ok(false);
        }

        order.assigned_to = None;
        order.assigned_to_label = None;
        order.assigned_at = None;
        Ok(true)
    }

    fn annotate_area_tag(&self, order_id: Uuid, tag: &str) -> Result<bool, StoreError> {
        let Some(mut order) = self.orders.get_mut(&order_id) else {
            return Ok(false);
        };

        let missing = order
            .service_area_tag
            .as_deref()
            .is_none_or(|existing| existing.is_empty());
        if !missing {
            return Ok(false);
        }

        order.service_area_tag = Some(tag.to_string());
        Ok(true)
    }
}
