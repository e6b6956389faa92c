use std::collections::HashSet;

use uuid::Uuid;

use crate::models::staff::StaffShift;
use crate::store::BusyAssignment;

pub fn on_duty_at(shifts: &[StaffShift], slot_minutes: u32) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    let mut on_duty = Vec::new();

    for shift in shifts {
        if shift.start_minutes <= slot_minutes
            && slot_minutes < shift.end_minutes
            && seen.insert(shift.user_id)
        {
            on_duty.push(shift.user_id);
        }
    }

    on_duty
}

#[derive(Debug, Default, Clone)]
pub struct BusySet {
    committed: HashSet<(u32, Uuid)>,
}

impl BusySet {
    pub fn from_assignments(assignments: &[BusyAssignment]) -> Self {
        let committed = assignments
            .iter()
            .map(|busy| (busy.slot_minutes, busy.user_id))
            .collect();
        Self { committed }
    }

    pub fn mark(&mut self, slot_minutes: u32, user_id: Uuid) {
        self.committed.insert((slot_minutes, user_id));
    }

    pub fn contains(&self, slot_minutes: u32, user_id: Uuid) -> bool {
        self.committed.contains(&(slot_minutes, user_id))
    }
}

pub fn free_staff(on_duty: &[Uuid], busy: &BusySet, slot_minutes: u32) -> Vec<Uuid> {
    on_duty
        .iter()
        .copied()
        .filter(|user_id| !busy.contains(slot_minutes, *user_id))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use uuid::Uuid;

    use super::{BusySet, free_staff, on_duty_at};
    use crate::models::staff::StaffShift;
    use crate::store::BusyAssignment;

    fn shift(user_id: Uuid, start: u32, end: u32) -> StaffShift {
        StaffShift {
            id: Uuid::new_v4(),
            user_id,
            work_date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            start_minutes: start,
            end_minutes: end,
            timezone: "America/New_York".to_string(),
        }
    }

    #[test]
    fn shift_window_is_half_open() {
        let user = Uuid::from_u128(1);
        let shifts = vec![shift(user, 540, 1020)];

        assert!(on_duty_at(&shifts, 540).contains(&user));
        assert!(on_duty_at(&shifts, 1000).contains(&user));
        assert!(on_duty_at(&shifts, 1020).is_empty());
        assert!(on_duty_at(&shifts, 520).is_empty());
    }

    #[test]
    fn overlapping_shifts_for_one_user_count_once() {
        let user = Uuid::from_u128(1);
        let shifts = vec![shift(user, 540, 800), shift(user, 600, 1020)];

        assert_eq!(on_duty_at(&shifts, 700), vec![user]);
    }

    #[test]
    fn on_duty_order_follows_shift_order() {
        let first = Uuid::from_u128(7);
        let second = Uuid::from_u128(2);
        let shifts = vec![shift(first, 540, 1020), shift(second, 540, 1020)];

        assert_eq!(on_duty_at(&shifts, 600), vec![first, second]);
    }

    #[test]
    fn busy_staff_are_excluded_only_in_their_slot() {
        let user = Uuid::from_u128(1);
        let other = Uuid::from_u128(2);
        let mut busy = BusySet::default();
        busy.mark(600, user);

        let on_duty = vec![user, other];
        assert_eq!(free_staff(&on_duty, &busy, 600), vec![other]);
        assert_eq!(free_staff(&on_duty, &busy, 620), vec![user, other]);
    }

    #[test]
    fn seeding_from_store_assignments() {
        let user = Uuid::from_u128(1);
        let busy = BusySet::from_assignments(&[BusyAssignment {
            user_id: user,
            slot_minutes: 600,
        }]);

        assert!(busy.contains(600, user));
        assert!(!busy.contains(620, user));
        assert!(!busy.contains(600, Uuid::from_u128(2)));
    }
}
