//! Data models for WhisperLog

mod affirmation;
mod entry;
mod interpretation;
mod vocabulary;

pub use crate::angel_number::AngelNumber;
pub use affirmation::DailyAffirmation;
pub use entry::{newest_first, EntryCollection, EntryId, LogEntry, NOTES_MAX_CHARS};
pub use interpretation::Interpretation;
pub use vocabulary::{Activity, Emotion, Language, Mood, VoiceStyle};
