//! # jarima-core
//!
//! Core types, configuration, and error handling for the jarima SMS collector.

pub mod config;
pub mod error;
pub mod message;

pub use config::{shellexpand, Config};
pub use error::JarimaError;
pub use message::{Classification, MessageDraft, StoredMessage};
