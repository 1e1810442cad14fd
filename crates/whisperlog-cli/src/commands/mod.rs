pub mod affirmation;
pub mod analytics;
pub mod common;
pub mod completions;
pub mod config;
pub mod delete;
pub mod edit;
pub mod export;
pub mod language;
pub mod list;
pub mod log;
pub mod polish;
pub mod show;
pub mod speak;
pub mod sync;
pub mod watch;
