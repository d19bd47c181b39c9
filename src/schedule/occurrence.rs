//! Occurrence arithmetic
//!
//! Converts a descriptor's date or weekday into an absolute local instant.
//! Weekly reminders always resolve to the *next* matching slot strictly after
//! `now`; a slot that already passed today rolls a full week. This is
//! recomputed on every scheduling call, no fired-this-week state is kept.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use chrono::{
    DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Weekday,
};

/// Combine a calendar date and wall-clock time into one local instant
///
/// No past-date validation happens here; the scheduler registers whatever
/// instant falls out and the backend decides what a past timestamp means.
pub fn date_occurrence(date: NaiveDate, time: NaiveTime) -> DateTime<Local> {
    resolve_local(date.and_time(time))
}

/// Next instant strictly after `now` that falls on `target` at `time`
///
/// `diff = (target - now.weekday) mod 7`; a diff of zero keeps today only if
/// today's slot is still strictly ahead, otherwise it rolls to next week.
pub fn next_weekday_occurrence(
    target: Weekday,
    time: NaiveTime,
    now: DateTime<Local>,
) -> DateTime<Local> {
    let today = now.date_naive();
    let mut diff =
        (7 + target.num_days_from_sunday() - now.weekday().num_days_from_sunday()) % 7;

    if diff == 0 && resolve_local(today.and_time(time)) <= now {
        diff = 7;
    }

    resolve_local((today + Duration::days(i64::from(diff))).and_time(time))
}

/// Map a naive local datetime onto the local timezone
///
/// Ambiguous times (DST fold) take the earlier offset; nonexistent times
/// (DST gap) step forward until the clock exists again.
fn resolve_local(naive: NaiveDateTime) -> DateTime<Local> {
    let mut candidate = naive;
    loop {
        if let Some(resolved) = Local.from_local_datetime(&candidate).earliest() {
            return resolved;
        }
        candidate += Duration::minutes(30);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Local> {
        Local
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .single()
            .expect("unambiguous test instant")
    }

    #[test]
    fn test_date_occurrence_combines_date_and_time() {
        let ts = date_occurrence(
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            NaiveTime::from_hms_opt(7, 45, 0).unwrap(),
        );
        assert_eq!(ts.date_naive(), NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!((ts.hour(), ts.minute(), ts.second()), (7, 45, 0));
    }

    #[test]
    fn test_same_day_slot_already_passed_rolls_a_week() {
        // Wednesday 2024-01-10 09:00, asking for Wednesday 08:00
        let now = local(2024, 1, 10, 9, 0);
        let ts = next_weekday_occurrence(
            Weekday::Wed,
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            now,
        );
        assert_eq!(ts.date_naive(), NaiveDate::from_ymd_opt(2024, 1, 17).unwrap());
        assert_eq!((ts.hour(), ts.minute()), (8, 0));
    }

    #[test]
    fn test_same_day_slot_still_ahead_stays_today() {
        let now = local(2024, 1, 10, 9, 0);
        let ts = next_weekday_occurrence(
            Weekday::Wed,
            NaiveTime::from_hms_opt(21, 30, 0).unwrap(),
            now,
        );
        assert_eq!(ts.date_naive(), NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        assert!(ts > now);
    }

    #[test]
    fn test_later_weekday_this_week() {
        // Wednesday 2024-01-10 09:00, asking for Friday 08:00
        let now = local(2024, 1, 10, 9, 0);
        let ts = next_weekday_occurrence(
            Weekday::Fri,
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            now,
        );
        assert_eq!(ts.date_naive(), NaiveDate::from_ymd_opt(2024, 1, 12).unwrap());
    }

    #[test]
    fn test_earlier_weekday_wraps_to_next_week() {
        // Wednesday asking for Monday wraps 5 days forward
        let now = local(2024, 1, 10, 9, 0);
        let ts = next_weekday_occurrence(
            Weekday::Mon,
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            now,
        );
        assert_eq!(ts.date_naive(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn test_result_is_strictly_future_and_earliest() {
        let now = local(2024, 1, 10, 9, 0);
        let time = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        for day in [
            Weekday::Sun,
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
        ] {
            let ts = next_weekday_occurrence(day, time, now);
            assert!(ts > now, "{day} occurrence not in the future");
            assert_eq!(ts.weekday(), day);
            // earliest: no matching instant exists a week earlier and after now
            assert!(ts - Duration::days(7) <= now);
        }
    }

    #[test]
    fn test_exactly_now_rolls_to_next_week() {
        // Candidate equal to now must not re-fire today
        let now = local(2024, 1, 10, 9, 0);
        let ts = next_weekday_occurrence(
            Weekday::Wed,
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            now,
        );
        assert_eq!(ts.date_naive(), NaiveDate::from_ymd_opt(2024, 1, 17).unwrap());
    }
}
