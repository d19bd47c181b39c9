//! # Notify Module
//!
//! Delivery backends for showing, deferring and cancelling notifications.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.2.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Split into deferred and immediate backends behind one trait
//! - 1.0.0: Initial notification store

pub mod backend;
pub mod deferred;
pub mod immediate;

pub use backend::{DeliveryBackend, Notification};
pub use deferred::DeferredBackend;
pub use immediate::ImmediateBackend;
