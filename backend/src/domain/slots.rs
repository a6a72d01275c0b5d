//! Slot generation: expand weekly schedule entries into bookable times.
//!
//! The generator is a pure function over already-fetched data so it can be
//! exercised without storage. [`SlotService`](super::SlotService) supplies
//! the entries, the booked times and the clinic-local "now".

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

use super::{DayOfWeek, ScheduleEntry};

/// Fixed spacing between consecutive slots.
pub const SLOT_INTERVAL_MINUTES: i64 = 30;

/// One candidate appointment start time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    /// Start time of the slot.
    pub time: NaiveTime,
    /// False when booked, or already past on the current day.
    pub available: bool,
}

/// Produce the slots for `date`.
///
/// Only entries for the date's weekday with `is_available` set contribute.
/// Each entry is walked from its start in [`SLOT_INTERVAL_MINUTES`] steps
/// while the candidate is strictly before the entry's end. A slot is
/// unavailable when its time is in `booked`, or when `date` is the day of
/// `now` and the slot starts before `now`. The result is sorted by time;
/// overlapping entries yield duplicate times, which are kept.
///
/// # Examples
/// ```
/// use std::collections::BTreeSet;
/// use chrono::{NaiveDate, NaiveTime};
/// use clinic_backend::domain::{
///     generate_slots, DayOfWeek, DoctorId, ScheduleEntry, ScheduleEntryId, TimeWindow,
/// };
///
/// let t = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
/// let monday = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
/// let entry = ScheduleEntry::new(
///     ScheduleEntryId::random(),
///     DoctorId::random(),
///     DayOfWeek::new(1).unwrap(),
///     TimeWindow::new(t(9, 0), t(10, 0)).unwrap(),
///     true,
/// );
/// let booked = BTreeSet::from([t(9, 30)]);
/// let now = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap().and_time(t(12, 0));
/// let slots = generate_slots(&[entry], &booked, monday, now);
/// assert_eq!(slots.len(), 2);
/// assert!(slots[0].available);
/// assert!(!slots[1].available);
/// ```
pub fn generate_slots(
    entries: &[ScheduleEntry],
    booked: &BTreeSet<NaiveTime>,
    date: NaiveDate,
    now: NaiveDateTime,
) -> Vec<Slot> {
    let day = DayOfWeek::from_date(date);
    let is_today = date == now.date();
    let step = TimeDelta::minutes(SLOT_INTERVAL_MINUTES);

    let mut slots: Vec<Slot> = entries
        .iter()
        .filter(|entry| entry.is_available() && entry.day_of_week() == day)
        .flat_map(|entry| walk(entry.start_time(), entry.end_time(), step))
        .map(|time| Slot {
            time,
            available: !booked.contains(&time) && !(is_today && time < now.time()),
        })
        .collect();
    slots.sort_by_key(|slot| slot.time);
    slots
}

fn walk(start: NaiveTime, end: NaiveTime, step: TimeDelta) -> Vec<NaiveTime> {
    let mut times = Vec::new();
    let mut cursor = start;
    while cursor < end {
        times.push(cursor);
        let (next, wrapped) = cursor.overflowing_add_signed(step);
        if wrapped != 0 {
            break;
        }
        cursor = next;
    }
    times
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DoctorId, ScheduleEntryId, TimeWindow};
    use rstest::{fixture, rstest};

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).expect("valid time")
    }

    fn entry(day: i64, start: NaiveTime, end: NaiveTime, available: bool) -> ScheduleEntry {
        ScheduleEntry::new(
            ScheduleEntryId::random(),
            DoctorId::from_uuid(uuid::Uuid::nil()),
            DayOfWeek::new(day).expect("day"),
            TimeWindow::new(start, end).expect("window"),
            available,
        )
    }

    #[fixture]
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).expect("monday")
    }

    #[fixture]
    fn last_week() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 27)
            .expect("date")
            .and_time(t(8, 0))
    }

    #[rstest]
    fn booked_slot_is_unavailable_and_end_is_exclusive(
        monday: NaiveDate,
        last_week: NaiveDateTime,
    ) {
        let entries = [entry(1, t(9, 0), t(10, 0), true)];
        let booked = BTreeSet::from([t(9, 30)]);
        let slots = generate_slots(&entries, &booked, monday, last_week);
        assert_eq!(
            slots,
            vec![
                Slot { time: t(9, 0), available: true },
                Slot { time: t(9, 30), available: false },
            ]
        );
    }

    #[rstest]
    fn no_entries_for_weekday_yields_nothing(monday: NaiveDate, last_week: NaiveDateTime) {
        let entries = [entry(2, t(9, 0), t(12, 0), true)];
        assert!(generate_slots(&entries, &BTreeSet::new(), monday, last_week).is_empty());
    }

    #[rstest]
    fn unavailable_entries_are_ignored(monday: NaiveDate, last_week: NaiveDateTime) {
        let entries = [entry(1, t(9, 0), t(12, 0), false)];
        assert!(generate_slots(&entries, &BTreeSet::new(), monday, last_week).is_empty());
    }

    #[rstest]
    fn past_times_today_are_unavailable(monday: NaiveDate) {
        let entries = [entry(1, t(9, 0), t(11, 0), true)];
        let now = monday.and_time(t(9, 45));
        let availability: Vec<bool> = generate_slots(&entries, &BTreeSet::new(), monday, now)
            .into_iter()
            .map(|slot| slot.available)
            .collect();
        assert_eq!(availability, vec![false, false, true, true]);
    }

    #[rstest]
    fn slot_starting_exactly_now_is_available(monday: NaiveDate) {
        let entries = [entry(1, t(9, 0), t(10, 0), true)];
        let now = monday.and_time(t(9, 30));
        let slots = generate_slots(&entries, &BTreeSet::new(), monday, now);
        assert_eq!(slots.last(), Some(&Slot { time: t(9, 30), available: true }));
    }

    #[rstest]
    fn overlapping_entries_are_sorted_not_deduplicated(
        monday: NaiveDate,
        last_week: NaiveDateTime,
    ) {
        let entries = [
            entry(1, t(10, 0), t(11, 0), true),
            entry(1, t(9, 30), t(10, 30), true),
        ];
        let times: Vec<NaiveTime> = generate_slots(&entries, &BTreeSet::new(), monday, last_week)
            .into_iter()
            .map(|slot| slot.time)
            .collect();
        assert_eq!(times, vec![t(9, 30), t(10, 0), t(10, 0), t(10, 30)]);
    }

    #[rstest]
    fn ragged_window_stops_before_end(monday: NaiveDate, last_week: NaiveDateTime) {
        let entries = [entry(1, t(9, 0), t(9, 45), true)];
        let times: Vec<NaiveTime> = generate_slots(&entries, &BTreeSet::new(), monday, last_week)
            .into_iter()
            .map(|slot| slot.time)
            .collect();
        assert_eq!(times, vec![t(9, 0), t(9, 30)]);
    }

    #[rstest]
    fn late_window_does_not_wrap_past_midnight(monday: NaiveDate, last_week: NaiveDateTime) {
        let end = NaiveTime::from_hms_opt(23, 59, 59).expect("time");
        let entries = [entry(1, t(23, 0), end, true)];
        let times: Vec<NaiveTime> = generate_slots(&entries, &BTreeSet::new(), monday, last_week)
            .into_iter()
            .map(|slot| slot.time)
            .collect();
        assert_eq!(times, vec![t(23, 0), t(23, 30)]);
    }
}
