use chrono::{
    DateTime, Duration, LocalResult, NaiveDate, NaiveTime, Offset, TimeZone, Timelike, Utc,
};
use chrono_tz::Tz;

use crate::models::slot::DeliverySlot;

pub const SLOT_INTERVAL_MINUTES: u32 = 20;
pub const SLOTS_PER_DAY: u32 = 72;

pub fn generate_slots() -> Vec<DeliverySlot> {
    (0..SLOTS_PER_DAY)
        .map(|i| {
            let minutes = i * SLOT_INTERVAL_MINUTES;
            DeliverySlot {
                minutes,
                label: slot_label(minutes),
            }
        })
        .collect()
}

pub fn slot_label(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

pub fn is_on_grid(minutes: u32) -> bool {
    minutes % SLOT_INTERVAL_MINUTES == 0 && minutes < SLOTS_PER_DAY * SLOT_INTERVAL_MINUTES
}

pub fn to_instant(date: NaiveDate, minutes_from_midnight: u32, tz: Tz) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN) + Duration::minutes(i64::from(minutes_from_midnight));

    match tz.from_local_datetime(&naive) {
        LocalResult::Single(local) => local.with_timezone(&Utc),
        LocalResult::Ambiguous(first, _) => first.with_timezone(&Utc),
        LocalResult::None => {
            let offset = tz.offset_from_utc_datetime(&naive).fix();
            let corrected = naive - Duration::seconds(i64::from(offset.local_minus_utc()));
            Utc.from_utc_datetime(&corrected)
        }
    }
}

pub fn filter_past(
    slots: Vec<DeliverySlot>,
    date: NaiveDate,
    lead_minutes: u32,
    now: DateTime<Utc>,
    tz: Tz,
) -> Vec<DeliverySlot> {
    let local = now.with_timezone(&tz);
    if local.date_naive() != date {
        return slots;
    }

    let cutoff = local.hour() * 60 + local.minute() + lead_minutes;
    slots
        .into_iter()
        .filter(|slot| slot.minutes >= cutoff)
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};
    use chrono_tz::America::New_York;

    use super::{SLOTS_PER_DAY, filter_past, generate_slots, is_on_grid, slot_label, to_instant};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn grid_has_72_slots_stepping_by_20() {
        let slots = generate_slots();

        assert_eq!(slots.len(), SLOTS_PER_DAY as usize);
        assert_eq!(slots[0].minutes, 0);
        assert_eq!(slots[0].label, "00:00");
        assert_eq!(slots.last().unwrap().minutes, 1420);
        assert_eq!(slots.last().unwrap().label, "23:40");

        for pair in slots.windows(2) {
            assert_eq!(pair[1].minutes - pair[0].minutes, 20);
        }
    }

    #[test]
    fn labels_are_zero_padded() {
        assert_eq!(slot_label(0), "00:00");
        assert_eq!(slot_label(600), "10:00");
        assert_eq!(slot_label(1420), "23:40");
    }

    #[test]
    fn grid_membership() {
        assert!(is_on_grid(0));
        assert!(is_on_grid(600));
        assert!(is_on_grid(1420));
        assert!(!is_on_grid(610));
        assert!(!is_on_grid(1440));
    }

    #[test]
    fn summer_wall_clock_resolves_with_edt_offset() {
        let instant = to_instant(date(2024, 6, 10), 600, New_York);
        assert_eq!(instant, Utc.with_ymd_and_hms(2024, 6, 10, 14, 0, 0).unwrap());
    }

    #[test]
    fn winter_wall_clock_resolves_with_est_offset() {
        let instant = to_instant(date(2024, 1, 15), 600, New_York);
        assert_eq!(instant, Utc.with_ymd_and_hms(2024, 1, 15, 15, 0, 0).unwrap());
    }

    #[test]
    fn spring_forward_day_is_23_hours_at_2am() {
        let on_transition = to_instant(date(2024, 3, 10), 120, New_York);
        let day_after = to_instant(date(2024, 3, 11), 120, New_York);

        assert_eq!(
            on_transition,
            Utc.with_ymd_and_hms(2024, 3, 10, 7, 0, 0).unwrap()
        );
        assert_eq!(day_after - on_transition, chrono::Duration::hours(23));
    }

    #[test]
    fn fall_back_day_is_25_hours_at_2am() {
        let before_transition = to_instant(date(2024, 11, 2), 120, New_York);
        let on_transition = to_instant(date(2024, 11, 3), 120, New_York);

        assert_eq!(on_transition - before_transition, chrono::Duration::hours(25));
    }

    #[test]
    fn ambiguous_hour_takes_first_occurrence() {
        let instant = to_instant(date(2024, 11, 3), 60, New_York);
        assert_eq!(instant, Utc.with_ymd_and_hms(2024, 11, 3, 5, 0, 0).unwrap());
    }

    #[test]
    fn to_instant_is_idempotent() {
        let a = to_instant(date(2024, 3, 10), 120, New_York);
        let b = to_instant(date(2024, 3, 10), 120, New_York);
        assert_eq!(a, b);
    }

    #[test]
    fn future_date_is_never_filtered() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 14, 5, 0).unwrap();
        let slots = filter_past(generate_slots(), date(2024, 6, 11), 30, now, New_York);
        assert_eq!(slots.len(), 72);
    }

    #[test]
    fn todays_elapsed_slots_are_dropped_with_lead_buffer() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 14, 5, 0).unwrap();
        let slots = filter_past(generate_slots(), date(2024, 6, 10), 30, now, New_York);

        assert_eq!(slots.first().unwrap().minutes, 640);
        assert_eq!(slots.len(), 40);
    }

    #[test]
    fn past_date_passes_through_unchanged() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 14, 5, 0).unwrap();
        let slots = filter_past(generate_slots(), date(2024, 6, 9), 30, now, New_York);
        assert_eq!(slots.len(), 72);
    }
}
