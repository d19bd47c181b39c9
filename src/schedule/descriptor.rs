//! Reminder descriptors
//!
//! Typed form of what pages send over the wire. Parsing is fail-fast: a
//! malformed time, date or day index is rejected here with an error the
//! dispatcher reports back, instead of leaking bad strings further down.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, NaiveTime, Weekday};

/// One-time or weekly-recurring reminder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderKind {
    /// Fires once at a calendar date
    Date { date: NaiveDate },
    /// Fires every week on each listed day
    Weekday { days: Vec<Weekday> },
}

/// A reminder as requested by a page
///
/// `id` is an opaque caller-supplied string, unique per reminder. Weekly
/// reminders derive one sub-tag per day via [`ReminderDescriptor::sub_tag`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderDescriptor {
    pub id: String,
    pub kind: ReminderKind,
    pub time: NaiveTime,
    pub text: Option<String>,
}

impl ReminderDescriptor {
    /// Build a one-time reminder from wire strings (`"YYYY-MM-DD"`, `"HH:MM"`)
    pub fn date(id: &str, text: Option<String>, date: &str, time: &str) -> Result<Self> {
        Ok(ReminderDescriptor {
            id: id.to_string(),
            kind: ReminderKind::Date {
                date: parse_date(date)?,
            },
            time: parse_time(time)?,
            text,
        })
    }

    /// Build a weekly reminder from wire day indices (0=Sunday..6=Saturday)
    ///
    /// Duplicate day indices collapse to one occurrence; order is preserved.
    pub fn weekly(id: &str, text: Option<String>, days: &[u8], time: &str) -> Result<Self> {
        let mut parsed = Vec::with_capacity(days.len());
        for &day in days {
            let weekday = parse_day(day)?;
            if !parsed.contains(&weekday) {
                parsed.push(weekday);
            }
        }
        Ok(ReminderDescriptor {
            id: id.to_string(),
            kind: ReminderKind::Weekday { days: parsed },
            time: parse_time(time)?,
            text,
        })
    }

    /// Registry tag for one weekday expansion of this reminder
    pub fn sub_tag(&self, day: Weekday) -> String {
        format!("{}_{}", self.id, day_index(day))
    }
}

/// Parse an `"HH:MM"` wall-clock time
pub fn parse_time(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M").with_context(|| format!("invalid time '{s}'"))
}

/// Parse a `"YYYY-MM-DD"` calendar date
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date '{s}'"))
}

/// Map a wire day index (0=Sunday..6=Saturday) to a weekday
pub fn parse_day(day: u8) -> Result<Weekday> {
    let weekday = match day {
        0 => Weekday::Sun,
        1 => Weekday::Mon,
        2 => Weekday::Tue,
        3 => Weekday::Wed,
        4 => Weekday::Thu,
        5 => Weekday::Fri,
        6 => Weekday::Sat,
        _ => bail!("invalid weekday index {day}"),
    };
    Ok(weekday)
}

/// Wire day index (0=Sunday..6=Saturday) for a weekday
pub fn day_index(day: Weekday) -> u8 {
    day.num_days_from_sunday() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time() {
        assert_eq!(
            parse_time("08:30").unwrap(),
            NaiveTime::from_hms_opt(8, 30, 0).unwrap()
        );
        assert_eq!(
            parse_time("23:59").unwrap(),
            NaiveTime::from_hms_opt(23, 59, 0).unwrap()
        );
        assert!(parse_time("25:00").is_err());
        assert!(parse_time("eight").is_err());
        assert!(parse_time("").is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-01-10").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
        );
        assert!(parse_date("2024-13-01").is_err());
        assert!(parse_date("tomorrow").is_err());
    }

    #[test]
    fn test_day_index_roundtrip() {
        for index in 0..7u8 {
            assert_eq!(day_index(parse_day(index).unwrap()), index);
        }
        assert!(parse_day(7).is_err());
    }

    #[test]
    fn test_weekly_dedupes_days() {
        let desc = ReminderDescriptor::weekly("r1", None, &[1, 3, 1], "09:00").unwrap();
        match &desc.kind {
            ReminderKind::Weekday { days } => {
                assert_eq!(days, &vec![Weekday::Mon, Weekday::Wed]);
            }
            _ => panic!("expected weekday kind"),
        }
    }

    #[test]
    fn test_sub_tag() {
        let desc = ReminderDescriptor::weekly("r1", None, &[5], "09:00").unwrap();
        assert_eq!(desc.sub_tag(Weekday::Fri), "r1_5");
        assert_eq!(desc.sub_tag(Weekday::Sun), "r1_0");
    }

    #[test]
    fn test_malformed_descriptor_rejected() {
        assert!(ReminderDescriptor::date("r1", None, "2024-01-10", "9am").is_err());
        assert!(ReminderDescriptor::date("r1", None, "01/10/2024", "09:00").is_err());
        assert!(ReminderDescriptor::weekly("r1", None, &[9], "09:00").is_err());
    }
}
