//! whisperlog-core - Core library for WhisperLog
//!
//! This crate contains the entry models, the angel number parser, the
//! local-first synced entry store, and the typed wrappers around the external
//! insight service used by all WhisperLog interfaces.

pub mod affirmation;
pub mod ai;
pub mod analytics;
pub mod angel_number;
pub mod cache;
pub mod config;
pub mod error;
pub mod export;
pub mod mirror;
pub mod models;
pub mod preferences;
pub mod store;
pub mod util;

pub use angel_number::{parse_angel_number, ValidationError};
pub use error::{Error, Result};
pub use models::{AngelNumber, EntryCollection, EntryId, LogEntry};
pub use store::SyncedEntryStore;
