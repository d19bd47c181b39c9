//! Show-now-only backend
//!
//! Stands in for platforms without timestamp-triggered delivery. Deferred
//! registrations succeed as no-ops per the backend contract; the scheduler is
//! expected to have probed first and reported the capability gap instead of
//! calling in here.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Local};
use dashmap::DashSet;
use log::debug;
use tokio::sync::broadcast;

use crate::ipc::protocol::PageEvent;
use crate::notify::backend::{DeliveryBackend, Notification};

/// Backend without deferred capability
pub struct ImmediateBackend {
    shown: DashSet<String>,
    events: broadcast::Sender<PageEvent>,
}

impl ImmediateBackend {
    pub fn new(events: broadcast::Sender<PageEvent>) -> Self {
        ImmediateBackend {
            shown: DashSet::new(),
            events,
        }
    }

    /// Whether a tag is currently shown
    pub fn is_shown(&self, tag: &str) -> bool {
        self.shown.contains(tag)
    }
}

#[async_trait]
impl DeliveryBackend for ImmediateBackend {
    fn supports_deferred(&self) -> bool {
        false
    }

    async fn show_now(&self, note: Notification) -> Result<()> {
        self.shown.insert(note.tag.clone());
        let _ = self.events.send(PageEvent::Fired {
            tag: note.tag,
            title: note.title,
            body: note.body,
        });
        Ok(())
    }

    async fn show_deferred(&self, note: Notification, at: DateTime<Local>) -> Result<()> {
        debug!(
            "no deferred delivery, dropping registration of {} for {}",
            note.tag,
            at.format("%Y-%m-%d %H:%M")
        );
        Ok(())
    }

    async fn cancel_by_tag(&self, tag: &str) -> Result<usize> {
        if self.shown.remove(tag).is_some() {
            let _ = self.events.send(PageEvent::Closed {
                tag: tag.to_string(),
            });
            Ok(1)
        } else {
            Ok(0)
        }
    }
}
