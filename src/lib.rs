// Core layer - configuration and shared constants
pub mod core;

// Scheduling layer - descriptors, occurrence arithmetic, orchestration
pub mod schedule;

// Notification layer - delivery backends
pub mod notify;

// IPC layer - control protocol between pages and the daemon
pub mod ipc;

// Re-export core config
pub use crate::core::Config;

// Re-export scheduling items
pub use schedule::{
    OccurrenceOutcome, Outcome, ReminderDescriptor, ReminderKind, Scheduler,
};

// Re-export notification backends
pub use notify::{DeferredBackend, DeliveryBackend, ImmediateBackend, Notification};

// Re-export IPC items
pub use ipc::{PageEvent, PageGateway, PageMessage};
