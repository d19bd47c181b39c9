//! Timer-backed deferred delivery
//!
//! Each pending notification is one tokio timer task keyed by tag. Firing
//! removes the entry and broadcasts a [`PageEvent::Fired`] to every connected
//! page; replacing or cancelling a tag aborts the timer.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.2.0
//!
//! ## Changelog
//! - 1.1.0: Timer tasks arm only after their map entry is registered
//! - 1.0.0: Initial dashmap + timer implementation

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Local};
use dashmap::{DashMap, DashSet};
use log::{debug, info};
use std::sync::Arc;
use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;

use crate::ipc::protocol::PageEvent;
use crate::notify::backend::{DeliveryBackend, Notification};

/// One registered-but-not-yet-fired notification
struct PendingNote {
    at: DateTime<Local>,
    timer: JoinHandle<()>,
}

/// Backend with in-process timestamp-triggered delivery
pub struct DeferredBackend {
    pending: Arc<DashMap<String, PendingNote>>,
    /// Tags that fired but have not been closed or clicked away yet;
    /// cancellation must reach these too, not just pending timers
    shown: Arc<DashSet<String>>,
    events: broadcast::Sender<PageEvent>,
}

impl DeferredBackend {
    pub fn new(events: broadcast::Sender<PageEvent>) -> Self {
        DeferredBackend {
            pending: Arc::new(DashMap::new()),
            shown: Arc::new(DashSet::new()),
            events,
        }
    }

    /// Number of registered, unfired notifications
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Whether a tag has a registered, unfired notification
    pub fn is_pending(&self, tag: &str) -> bool {
        self.pending.contains_key(tag)
    }

    /// When a pending tag is due, if registered
    pub fn due_at(&self, tag: &str) -> Option<DateTime<Local>> {
        self.pending.get(tag).map(|entry| entry.at)
    }

    /// Whether a tag fired and is still on screen
    pub fn is_shown(&self, tag: &str) -> bool {
        self.shown.contains(tag)
    }
}

#[async_trait]
impl DeliveryBackend for DeferredBackend {
    fn supports_deferred(&self) -> bool {
        true
    }

    async fn show_now(&self, note: Notification) -> Result<()> {
        debug!("showing {} immediately", note.tag);
        self.shown.insert(note.tag.clone());
        let _ = self.events.send(PageEvent::Fired {
            tag: note.tag,
            title: note.title,
            body: note.body,
        });
        Ok(())
    }

    async fn show_deferred(&self, note: Notification, at: DateTime<Local>) -> Result<()> {
        // A timestamp already in the past fires on the next tick
        let delay = (at - Local::now()).to_std().unwrap_or_default();

        // Same tag replaces, never stacks; a still-shown earlier delivery
        // is superseded by the new registration
        if let Some((_, old)) = self.pending.remove(&note.tag) {
            debug!("replacing pending notification {}", note.tag);
            old.timer.abort();
        }
        self.shown.remove(&note.tag);

        let (armed_tx, armed_rx) = oneshot::channel::<()>();
        let pending = Arc::clone(&self.pending);
        let shown = Arc::clone(&self.shown);
        let events = self.events.clone();
        let fired = note.clone();
        let timer = tokio::spawn(async move {
            // Wait until our map entry exists so a zero-delay fire cannot
            // race the registration below
            if armed_rx.await.is_err() {
                return;
            }
            tokio::time::sleep(delay).await;
            if pending.remove(&fired.tag).is_some() {
                debug!("notification fired: {}", fired.tag);
                shown.insert(fired.tag.clone());
                let _ = events.send(PageEvent::Fired {
                    tag: fired.tag,
                    title: fired.title,
                    body: fired.body,
                });
            }
        });

        info!("registered {} for {}", note.tag, at.format("%Y-%m-%d %H:%M"));
        self.pending.insert(note.tag, PendingNote { at, timer });
        let _ = armed_tx.send(());
        Ok(())
    }

    async fn cancel_by_tag(&self, tag: &str) -> Result<usize> {
        let mut closed = 0;

        if let Some((_, note)) = self.pending.remove(tag) {
            note.timer.abort();
            info!("cancelled pending notification {tag}");
            closed += 1;
        }
        if self.shown.remove(tag).is_some() {
            info!("closed shown notification {tag}");
            closed += 1;
        }

        if closed > 0 {
            let _ = self.events.send(PageEvent::Closed {
                tag: tag.to_string(),
            });
        }
        Ok(closed)
    }
}
