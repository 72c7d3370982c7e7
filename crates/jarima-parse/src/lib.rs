//! # jarima-parse
//!
//! The two-stage text pipeline: frame messages out of the bulk modem
//! listing, then classify each body as a fine notice or a payment reminder.

pub mod classify;
pub mod patterns;
pub mod primitives;

pub use classify::{classify, link_reminder};
pub use patterns::{frame_messages, FramedSms};
