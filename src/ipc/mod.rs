//! # IPC Module
//!
//! Control protocol between controlling pages and the daemon.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.3.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Invalid-descriptor and focus events
//! - 1.0.0: Initial Unix socket protocol

pub mod protocol;
pub mod server;

pub use protocol::{
    decode_message, encode_message, write_message, DateSchedule, PageEvent, PageMessage,
    StoredSchedule, WeekdaySchedule,
};
pub use server::{PageGateway, EVENT_CHANNEL_CAPACITY};
