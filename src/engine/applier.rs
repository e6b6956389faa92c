use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::models::plan::{ApplyReport, ApplyRowResult, AssignmentPlanRow, RowOutcome};
use crate::store::{DispatchStore, StoreError};

pub fn apply<S: DispatchStore>(
    store: &S,
    rows: &[AssignmentPlanRow],
    now: DateTime<Utc>,
) -> Result<ApplyReport, StoreError> {
    let mut report = ApplyReport::default();

    for row in rows {
        let outcome = match row.assigned_to {
            None => RowOutcome::Skipped,
            Some(user_id) => {
                let label = row
                    .assigned_to_label
                    .clone()
                    .unwrap_or_else(|| user_id.to_string());

                if store.conditional_assign(row.order_id, user_id, &label, now)? {
                    report.applied += 1;
                    RowOutcome::Applied
                } else {
                    debug!(order_id = %row.order_id, "plan row went stale; skipping");
                    RowOutcome::Stale
                }
            }
        };

        report.rows.push(ApplyRowResult {
            order_id: row.order_id,
            outcome,
        });
    }

    info!(
        applied = report.applied,
        rows = rows.len(),
        "plan apply pass finished"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    use chrono::NaiveDate;

    use super::apply;
    use crate::models::area::ServiceArea;
    use crate::models::order::{Order, OrderStatus};
    use crate::models::plan::{AssignmentPlanRow, RowOutcome, UnassignedReason};
    use crate::models::staff::{StaffProfile, StaffShift};
    use crate::store::{BusyAssignment, DispatchStore, MemoryStore, StoreError};

    fn confirmed_order(slot_minutes: u32) -> Order {
        Order {
            id: Uuid::new_v4(),
            address: None,
            service_area_tag: None,
            delivery_slot_start: Utc.with_ymd_and_hms(2024, 6, 10, 14, 0, 0).unwrap(),
            delivery_slot_minutes: slot_minutes,
            status: OrderStatus::Confirmed,
            assigned_to: None,
            assigned_to_label: None,
            assigned_at: None,
            created_at: Utc::now(),
        }
    }

    fn row_for(order: &Order, user_id: Uuid) -> AssignmentPlanRow {
        AssignmentPlanRow {
            order_id: order.id,
            slot_minutes: order.delivery_slot_minutes,
            area_tag: "alpha".to_string(),
            assigned_to: Some(user_id),
            assigned_to_label: Some("Avery".to_string()),
            reason: None,
        }
    }

    #[test]
    fn rows_with_a_held_guard_are_applied() {
        let store = MemoryStore::new();
        let order = confirmed_order(600);
        let staff = Uuid::from_u128(1);
        let rows = vec![row_for(&order, staff)];
        store.insert_order(order);

        let report = apply(&store, &rows, Utc::now()).unwrap();

        assert_eq!(report.applied, 1);
        assert_eq!(report.rows[0].outcome, RowOutcome::Applied);

        let stored = store.get_order(rows[0].order_id).unwrap();
        assert_eq!(stored.assigned_to, Some(staff));
        assert_eq!(stored.assigned_to_label.as_deref(), Some("Avery"));
    }

    #[test]
    fn stale_rows_are_counted_out_silently() {
        let store = MemoryStore::new();
        let mut order = confirmed_order(600);
        order.assigned_to = Some(Uuid::from_u128(9));
        let rows = vec![row_for(&order, Uuid::from_u128(1))];
        store.insert_order(order);

        let report = apply(&store, &rows, Utc::now()).unwrap();

        assert_eq!(report.applied, 0);
        assert_eq!(report.rows[0].outcome, RowOutcome::Stale);
    }

    #[test]
    fn rows_without_an_assignee_are_skipped() {
        let store = MemoryStore::new();
        let order = confirmed_order(600);
        let row = AssignmentPlanRow {
            order_id: order.id,
            slot_minutes: 600,
            area_tag: "alpha".to_string(),
            assigned_to: None,
            assigned_to_label: None,
            reason: Some(UnassignedReason::NoFreeStaff),
        };
        store.insert_order(order);

        let report = apply(&store, &[row], Utc::now()).unwrap();

        assert_eq!(report.applied, 0);
        assert_eq!(report.rows[0].outcome, RowOutcome::Skipped);
    }

    #[test]
    fn reapplying_the_same_plan_applies_nothing_new() {
        let store = MemoryStore::new();
        let order = confirmed_order(600);
        let rows = vec![row_for(&order, Uuid::from_u128(1))];
        store.insert_order(order);

        let first = apply(&store, &rows, Utc::now()).unwrap();
        let second = apply(&store, &rows, Utc::now()).unwrap();

        assert_eq!(first.applied, 1);
        assert_eq!(second.applied, 0);
        assert_eq!(second.rows[0].outcome, RowOutcome::Stale);
    }

    #[test]
    fn canceled_between_simulate_and_apply_goes_stale() {
        let store = MemoryStore::new();
        let mut order = confirmed_order(600);
        order.status = OrderStatus::Canceled;
        let rows = vec![row_for(&order, Uuid::from_u128(1))];
        store.insert_order(order);

        let report = apply(&store, &rows, Utc::now()).unwrap();

        assert_eq!(report.applied, 0);
        assert_eq!(report.rows[0].outcome, RowOutcome::Stale);
    }

    struct FailingStore;

    impl DispatchStore for FailingStore {
        fn shifts_for_date(&self, _: NaiveDate) -> Result<Vec<StaffShift>, StoreError> {
            unreachable!()
        }

        fn profiles_for_users(&self, _: &[Uuid]) -> Result<Vec<StaffProfile>, StoreError> {
            unreachable!()
        }

        fn active_areas(&self) -> Result<Vec<ServiceArea>, StoreError> {
            unreachable!()
        }

        fn unassigned_confirmed_orders(
            &self,
            _: chrono::DateTime<Utc>,
            _: chrono::DateTime<Utc>,
            _: Option<u32>,
        ) -> Result<Vec<Order>, StoreError> {
            unreachable!()
        }

        fn busy_assignments(
            &self,
            _: chrono::DateTime<Utc>,
            _: chrono::DateTime<Utc>,
        ) -> Result<Vec<BusyAssignment>, StoreError> {
            unreachable!()
        }

        fn conditional_assign(
            &self,
            _: Uuid,
            _: Uuid,
            _: &str,
            _: chrono::DateTime<Utc>,
        ) -> Result<bool, StoreError> {
            Err(StoreError::Unavailable("backend offline".to_string()))
        }

        fn conditional_unassign(&self, _: Uuid) -> Result<bool, StoreError> {
            unreachable!()
        }

        fn annotate_area_tag(&self, _: Uuid, _: &str) -> Result<bool, StoreError> {
            unreachable!()
        }
    }

    #[test]
    fn store_failure_aborts_the_pass() {
        let order = confirmed_order(600);
        let rows = vec![row_for(&order, Uuid::from_u128(1))];

        let err = apply(&FailingStore, &rows, Utc::now()).unwrap_err();

        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}
