use std::collections::{BTreeMap, HashMap};

use uuid::Uuid;

use crate::engine::availability::{self, BusySet};
use crate::geo;
use crate::models::area::ServiceArea;
use crate::models::order::Order;
use crate::models::plan::{AssignmentPlanRow, BucketDetail, Plan, UnassignedReason};
use crate::models::staff::{StaffProfile, StaffShift};

#[derive(Debug, Clone, Copy)]
pub struct PlanOptions {
    pub prefer_area: bool,
    pub one_per_slot: bool,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            prefer_area: true,
            one_per_slot: true,
        }
    }
}

pub fn plan(
    orders: &[Order],
    shifts: &[StaffShift],
    profiles: &[StaffProfile],
    areas: &[ServiceArea],
    mut busy: BusySet,
    options: PlanOptions,
) -> Plan {
    let profile_index: HashMap<Uuid, &StaffProfile> = profiles
        .iter()
        .map(|profile| (profile.user_id, profile))
        .collect();

    let mut buckets: BTreeMap<(u32, String), Vec<&Order>> = BTreeMap::new();
    for order in orders.iter().filter(|order| order.is_dispatchable()) {
        let tag = geo::resolve_area(order, areas);
        buckets
            .entry((order.delivery_slot_minutes, tag))
            .or_default()
            .push(order);
    }

    let mut result = Plan::default();

    for ((slot_minutes, area_tag), bucket) in buckets {
        let on_duty = availability::on_duty_at(shifts, slot_minutes);
        let free = availability::free_staff(&on_duty, &busy, slot_minutes);
        let pool = candidate_pool(free, &area_tag, &profile_index, options.prefer_area);

        let mut detail = BucketDetail {
            slot_minutes,
            area_tag: area_tag.clone(),
            orders: bucket.len() as u32,
            pool_size: pool.len() as u32,
            assigned: 0,
            unassigned: 0,
        };

        if pool.is_empty() {
            for order in &bucket {
                result.rows.push(AssignmentPlanRow {
                    order_id: order.id,
                    slot_minutes,
                    area_tag: area_tag.clone(),
                    assigned_to: None,
                    assigned_to_label: None,
                    reason: Some(UnassignedReason::NoFreeStaff),
                });
            }
            detail.unassigned = detail.orders;
        } else {
            let max_assignable = if options.one_per_slot {
                bucket.len().min(pool.len())
            } else {
                bucket.len()
            };

            for (i, order) in bucket.iter().enumerate() {
                if i < max_assignable {
                    let user_id = pool[i % pool.len()];
                    let label = profile_index
                        .get(&user_id)
                        .map(|profile| profile.display_name.clone())
                        .unwrap_or_else(|| user_id.to_string());

                    result.rows.push(AssignmentPlanRow {
                        order_id: order.id,
                        slot_minutes,
                        area_tag: area_tag.clone(),
                        assigned_to: Some(user_id),
                        assigned_to_label: Some(label),
                        reason: None,
                    });
                    busy.mark(slot_minutes, user_id);
                    *result.per_driver.entry(user_id).or_insert(0) += 1;
                    detail.assigned += 1;
                } else {
                    result.rows.push(AssignmentPlanRow {
                        order_id: order.id,
                        slot_minutes,
                        area_tag: area_tag.clone(),
                        assigned_to: None,
                        assigned_to_label: None,
                        reason: Some(UnassignedReason::GuardOrCapacity),
                    });
                    detail.unassigned += 1;
                }
            }
        }

        let tally = result.per_area.entry(area_tag).or_default();
        tally.assigned += detail.assigned;
        tally.unassigned += detail.unassigned;
        result.assigned += detail.assigned;
        result.unassigned += detail.unassigned;
        result.details.push(detail);
    }

    result
}

fn candidate_pool(
    free: Vec<Uuid>,
    area_tag: &str,
    profile_index: &HashMap<Uuid, &StaffProfile>,
    prefer_area: bool,
) -> Vec<Uuid> {
    if !prefer_area {
        return free;
    }

    let narrowed: Vec<Uuid> = free
        .iter()
        .copied()
        .filter(|user_id| {
            profile_index
                .get(user_id)
                .is_some_and(|profile| profile.area_tags.iter().any(|tag| tag == area_tag))
        })
        .collect();

    if narrowed.is_empty() { free } else { narrowed }
}
