//! # Control Protocol
//!
//! Message types for page <-> daemon communication over a Unix socket.
//!
//! Uses length-prefixed JSON framing:
//! - 4 bytes: message length (big-endian u32)
//! - N bytes: JSON payload
//!
//! The wire schema is the one pages already speak: inbound messages carry a
//! `type` tag of `schedule-date`, `schedule-weekday`, `restore` or `cancel`;
//! unknown types are silently ignored. Dates and times stay strings here and
//! are parsed into descriptors at dispatch.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// Upper bound on a single frame
pub const MAX_FRAME_LEN: usize = 64 * 1024;

// ============================================================================
// Page -> Daemon Messages
// ============================================================================

/// One-time schedule payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateSchedule {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// `"YYYY-MM-DD"`
    pub date: String,
    /// `"HH:MM"`
    pub time: String,
}

/// Weekly schedule payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekdaySchedule {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Weekday indices, 0=Sunday..6=Saturday
    pub days: Vec<u8>,
    /// `"HH:MM"`
    pub time: String,
}

/// A previously persisted schedule replayed on restore
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoredSchedule {
    Date(DateSchedule),
    Weekday(WeekdaySchedule),
}

/// Messages pages send to the daemon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PageMessage {
    /// Schedule one occurrence at a calendar date
    ScheduleDate { schedule: DateSchedule },
    /// Schedule one occurrence per listed weekday
    ScheduleWeekday { schedule: WeekdaySchedule },
    /// Replay persisted schedules (page owns persistence, not the daemon)
    Restore {
        #[serde(default)]
        schedules: Vec<StoredSchedule>,
    },
    /// Close notifications whose tag equals `id`; weekday sub-tags are the
    /// caller's to enumerate
    Cancel { id: String },
    /// A page acknowledged a click on a fired notification
    Clicked { tag: String },
    /// Anything with an unrecognized `type` tag; dropped without an error
    #[serde(other)]
    Unknown,
}

// ============================================================================
// Daemon -> Page Events
// ============================================================================

/// Events broadcast to every connected page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PageEvent {
    /// Deferred delivery unavailable or registration failed for this
    /// reminder; a page-side fallback should take over
    NoTrigger { id: String },
    /// A reminder's request could not be parsed; nothing was scheduled
    Invalid { id: String, reason: String },
    /// A deferred notification reached its timestamp
    Fired { tag: String, title: String, body: String },
    /// A notification was closed by cancellation
    Closed { tag: String },
    /// Click routing: the page should come to the foreground
    Focus,
}

// ============================================================================
// Framing - Length-prefixed JSON messages
// ============================================================================

/// Encode a message with length prefix
pub fn encode_message<T: Serialize>(msg: &T) -> Result<Vec<u8>> {
    let json = serde_json::to_vec(msg)?;
    if json.len() > MAX_FRAME_LEN {
        return Err(anyhow!("Message too large: {} bytes", json.len()));
    }
    let mut buf = Vec::with_capacity(4 + json.len());
    buf.extend_from_slice(&(json.len() as u32).to_be_bytes());
    buf.extend_from_slice(&json);
    Ok(buf)
}

/// Read a length-prefixed message from a reader
pub fn decode_message<T: for<'de> Deserialize<'de>, R: Read>(reader: &mut R) -> Result<T> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf)?;
    let len = u32::from_be_bytes(len_buf) as usize;

    if len > MAX_FRAME_LEN {
        return Err(anyhow!("Message too large: {} bytes", len));
    }

    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf)?;

    Ok(serde_json::from_slice(&buf)?)
}

/// Write a framed message to a writer
pub fn write_message<T: Serialize, W: Write>(writer: &mut W, msg: &T) -> Result<()> {
    let encoded = encode_message(msg)?;
    writer.write_all(&encoded)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_schedule_date_wire_format() {
        let json = r#"{
            "type": "schedule-date",
            "schedule": {"id": "r1", "text": "dentist", "date": "2024-06-01", "time": "10:30"}
        }"#;
        let msg: PageMessage = serde_json::from_str(json).unwrap();
        assert_eq!(
            msg,
            PageMessage::ScheduleDate {
                schedule: DateSchedule {
                    id: "r1".to_string(),
                    text: Some("dentist".to_string()),
                    date: "2024-06-01".to_string(),
                    time: "10:30".to_string(),
                }
            }
        );
    }

    #[test]
    fn test_schedule_weekday_wire_format() {
        let json = r#"{
            "type": "schedule-weekday",
            "schedule": {"id": "r1", "days": [1, 3], "time": "08:00"}
        }"#;
        let msg: PageMessage = serde_json::from_str(json).unwrap();
        match msg {
            PageMessage::ScheduleWeekday { schedule } => {
                assert_eq!(schedule.days, vec![1, 3]);
                assert_eq!(schedule.text, None);
            }
            other => panic!("unexpected message {other:?}"),
        }
    }

    #[test]
    fn test_restore_wire_format() {
        let json = r#"{
            "type": "restore",
            "schedules": [
                {"type": "date", "id": "a", "date": "2024-06-01", "time": "10:30"},
                {"type": "weekday", "id": "b", "days": [5], "time": "08:00"}
            ]
        }"#;
        let msg: PageMessage = serde_json::from_str(json).unwrap();
        match msg {
            PageMessage::Restore { schedules } => {
                assert_eq!(schedules.len(), 2);
                assert!(matches!(schedules[0], StoredSchedule::Date(_)));
                assert!(matches!(schedules[1], StoredSchedule::Weekday(_)));
            }
            other => panic!("unexpected message {other:?}"),
        }
    }

    #[test]
    fn test_restore_without_list_defaults_empty() {
        let msg: PageMessage = serde_json::from_str(r#"{"type": "restore"}"#).unwrap();
        assert_eq!(msg, PageMessage::Restore { schedules: vec![] });
    }

    #[test]
    fn test_unknown_type_is_ignored_not_an_error() {
        let msg: PageMessage =
            serde_json::from_str(r#"{"type": "frobnicate", "id": "x"}"#).unwrap();
        assert_eq!(msg, PageMessage::Unknown);
    }

    #[test]
    fn test_no_trigger_event_wire_format() {
        let event = PageEvent::NoTrigger { id: "r1".to_string() };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json, serde_json::json!({"type": "no-trigger", "id": "r1"}));
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let event = PageEvent::Fired {
            tag: "r1_3".to_string(),
            title: "Reminder".to_string(),
            body: "water plants".to_string(),
        };
        let encoded = encode_message(&event).unwrap();
        let mut cursor = Cursor::new(encoded);
        let decoded: PageEvent = decode_message(&mut cursor).unwrap();
        assert_eq!(decoded, event);
    }

    #[test]
    fn test_oversized_frame_rejected() {
        let mut frame = Vec::new();
        frame.extend_from_slice(&(MAX_FRAME_LEN as u32 + 1).to_be_bytes());
        let mut cursor = Cursor::new(frame);
        let result: Result<PageEvent> = decode_message(&mut cursor);
        assert!(result.is_err());
    }
}
