//! Reminder scheduler
//!
//! Orchestrates probe -> compute -> register for every occurrence a
//! descriptor expands to. Occurrences are handled independently: one
//! weekday's failure never blocks the others. Registration errors are
//! captured and collapsed into the `Unsupported` outcome together with a
//! capability-gap broadcast, they never reach the caller.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.2.0: Collaborators injected instead of read from ambient globals
//! - 1.1.0: Capability-gap broadcast carries the reminder id, not sub-tags
//! - 1.0.0: Initial date and weekday scheduling

use chrono::{DateTime, Local};
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::core::config::DEFAULT_LABEL;
use crate::ipc::protocol::PageEvent;
use crate::notify::backend::{DeliveryBackend, Notification};
use crate::schedule::descriptor::{ReminderDescriptor, ReminderKind};
use crate::schedule::occurrence::{date_occurrence, next_weekday_occurrence};

/// Result of one occurrence registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Registered for deferred delivery
    Scheduled,
    /// Deferred delivery unavailable or registration failed; a
    /// capability-gap event was broadcast so a fallback can take over
    Unsupported,
}

/// One occurrence's tag, due instant and outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccurrenceOutcome {
    pub tag: String,
    pub at: DateTime<Local>,
    pub outcome: Outcome,
}

/// Schedules reminder occurrences against an injected delivery backend
pub struct Scheduler {
    backend: Arc<dyn DeliveryBackend>,
    events: broadcast::Sender<PageEvent>,
    default_label: String,
}

impl Scheduler {
    pub fn new(backend: Arc<dyn DeliveryBackend>, events: broadcast::Sender<PageEvent>) -> Self {
        Scheduler {
            backend,
            events,
            default_label: DEFAULT_LABEL.to_string(),
        }
    }

    /// Override the fallback notification title
    pub fn with_default_label(mut self, label: impl Into<String>) -> Self {
        self.default_label = label.into();
        self
    }

    /// Schedule every occurrence the descriptor expands to
    ///
    /// A `Date` descriptor yields one outcome; a `Weekday` descriptor yields
    /// one per listed day, tagged `id_<weekday>`. Weekday occurrences are
    /// always the next matching slot strictly after now.
    pub async fn schedule(&self, desc: &ReminderDescriptor) -> Vec<OccurrenceOutcome> {
        self.schedule_at(desc, Local::now()).await
    }

    /// Like [`Scheduler::schedule`] with an explicit "now" for recurrence math
    pub async fn schedule_at(
        &self,
        desc: &ReminderDescriptor,
        now: DateTime<Local>,
    ) -> Vec<OccurrenceOutcome> {
        match &desc.kind {
            ReminderKind::Date { date } => {
                let at = date_occurrence(*date, desc.time);
                vec![self.register(desc, desc.id.clone(), at).await]
            }
            ReminderKind::Weekday { days } => {
                let mut outcomes = Vec::with_capacity(days.len());
                for &day in days {
                    let at = next_weekday_occurrence(day, desc.time, now);
                    outcomes.push(self.register(desc, desc.sub_tag(day), at).await);
                }
                outcomes
            }
        }
    }

    /// Close notifications whose tag equals `id`
    ///
    /// Weekday sub-tags are not expanded: a weekly reminder is cancelled once
    /// per `id_<day>` tag by the caller.
    pub async fn cancel(&self, id: &str) -> usize {
        match self.backend.cancel_by_tag(id).await {
            Ok(closed) => {
                debug!("cancel {id}: closed {closed}");
                closed
            }
            Err(e) => {
                warn!("cancel {id} failed: {e:#}");
                0
            }
        }
    }

    async fn register(
        &self,
        desc: &ReminderDescriptor,
        tag: String,
        at: DateTime<Local>,
    ) -> OccurrenceOutcome {
        if !self.backend.supports_deferred() {
            debug!("no deferred delivery for {tag}");
            self.report_gap(&desc.id);
            return OccurrenceOutcome {
                tag,
                at,
                outcome: Outcome::Unsupported,
            };
        }

        let title = desc.text.clone().unwrap_or_else(|| self.default_label.clone());
        let body = desc.text.clone().unwrap_or_default();
        let note = Notification::new(tag.clone(), title, body);

        match self.backend.show_deferred(note, at).await {
            Ok(()) => {
                info!("scheduled {} for {}", tag, at.format("%Y-%m-%d %H:%M"));
                OccurrenceOutcome {
                    tag,
                    at,
                    outcome: Outcome::Scheduled,
                }
            }
            Err(e) => {
                warn!("deferred registration failed for {tag}: {e:#}");
                self.report_gap(&desc.id);
                OccurrenceOutcome {
                    tag,
                    at,
                    outcome: Outcome::Unsupported,
                }
            }
        }
    }

    /// Broadcast a capability-gap report so a fallback scheduler can take over
    ///
    /// Carries the reminder id, never the per-day sub-tag; send errors mean
    /// no page is listening, which is fine.
    fn report_gap(&self, id: &str) {
        let _ = self.events.send(PageEvent::NoTrigger { id: id.to_string() });
    }
}
