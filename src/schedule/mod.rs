//! # Schedule Module
//!
//! Reminder descriptors, occurrence-date arithmetic and the scheduler that
//! turns descriptors into registered notifications.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.2.0: Weekday occurrences handled independently per day
//! - 1.1.0: Capability moved behind the DeliveryBackend trait
//! - 1.0.0: Initial descriptor and occurrence logic

pub mod descriptor;
pub mod occurrence;
pub mod scheduler;

pub use descriptor::{ReminderDescriptor, ReminderKind};
pub use occurrence::{date_occurrence, next_weekday_occurrence};
pub use scheduler::{OccurrenceOutcome, Outcome, Scheduler};
