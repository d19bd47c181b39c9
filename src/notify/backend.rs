//! Delivery backend trait
//!
//! The scheduler never feature-sniffs the platform; capability is a property
//! of the backend it was handed. A backend that cannot defer reports so via
//! `supports_deferred` and callers are expected to have probed before calling
//! `show_deferred`.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Local};

/// Display payload for one notification
///
/// `tag` groups notifications: re-registering a tag replaces the previous
/// entry instead of stacking a second one (the renotify contract), and
/// cancellation closes everything carrying the tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub tag: String,
    pub title: String,
    pub body: String,
}

impl Notification {
    pub fn new(tag: impl Into<String>, title: impl Into<String>, body: impl Into<String>) -> Self {
        Notification {
            tag: tag.into(),
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Platform notification store
#[async_trait]
pub trait DeliveryBackend: Send + Sync {
    /// Whether timestamp-triggered delivery is available
    ///
    /// Pure query, must not panic; a backend that cannot tell treats itself
    /// as unsupported.
    fn supports_deferred(&self) -> bool;

    /// Show a notification immediately
    async fn show_now(&self, note: Notification) -> Result<()>;

    /// Register a notification for delivery at a future instant
    ///
    /// Re-registering an existing tag replaces the pending entry. Backends
    /// without deferred capability succeed as a no-op; callers must have
    /// probed `supports_deferred` first.
    async fn show_deferred(&self, note: Notification, at: DateTime<Local>) -> Result<()>;

    /// Close every pending or shown notification with this exact tag
    ///
    /// Idempotent; returns how many entries were closed. Weekly sub-tags are
    /// NOT expanded: cancelling `id` leaves `id_3` alone.
    async fn cancel_by_tag(&self, tag: &str) -> Result<usize>;
}
