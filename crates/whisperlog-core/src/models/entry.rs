//! Log entry model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Activity, AngelNumber, Emotion, Interpretation, Language, Mood};
use crate::angel_number::ValidationError;

/// Maximum length of free-text notes, in characters.
pub const NOTES_MAX_CHARS: usize = 1000;

/// Identifier of a log entry.
///
/// New entries get UUID v7 text so ids sort by creation time, but any
/// string is accepted so collections written by other devices load as is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    /// Create a new unique entry ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EntryId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EntryId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One recorded angel number sighting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Unique identifier
    pub id: EntryId,
    /// When the sighting was logged
    pub timestamp: DateTime<Utc>,
    /// Canonical digits
    pub angel_number: AngelNumber,
    pub emotion: Emotion,
    pub activity: Activity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<Mood>,
    /// Language the interpretation was generated in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpretation_language: Option<Language>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpretation: Option<Interpretation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spoken_insight_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spoken_insight_language: Option<Language>,
}

impl LogEntry {
    /// Create a new entry stamped with the current time
    #[must_use]
    pub fn new(angel_number: AngelNumber, emotion: Emotion, activity: Activity) -> Self {
        Self {
            id: EntryId::new(),
            timestamp: Utc::now(),
            angel_number,
            emotion,
            activity,
            notes: None,
            mood: None,
            interpretation_language: None,
            interpretation: None,
            spoken_insight_text: None,
            spoken_insight_language: None,
        }
    }

    /// Check field limits that the type system does not enforce.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(notes) = &self.notes {
            let actual = notes.chars().count();
            if actual > NOTES_MAX_CHARS {
                return Err(ValidationError::NotesTooLong {
                    max: NOTES_MAX_CHARS,
                    actual,
                });
            }
        }
        Ok(())
    }

    /// Drop the generated narration, e.g. after the interpretation changed.
    pub fn clear_spoken_insight(&mut self) {
        self.spoken_insight_text = None;
        self.spoken_insight_language = None;
    }
}

/// The full set of entries, in insertion order.
pub type EntryCollection = Vec<LogEntry>;

/// Sort a copy of `entries` by timestamp, newest first.
#[must_use]
pub fn newest_first(entries: &[LogEntry]) -> Vec<LogEntry> {
    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn entry(id: &str, number: &str) -> LogEntry {
        LogEntry {
            id: EntryId::from(id),
            ..LogEntry::new(
                AngelNumber::from_canonical(number).unwrap(),
                Emotion::Joyful,
                Activity::Meditating,
            )
        }
    }

    #[test]
    fn entry_ids_are_unique() {
        assert_ne!(EntryId::new(), EntryId::new());
    }

    #[test]
    fn serializes_with_camel_case_and_skips_empty_fields() {
        let mut log = entry("a", "111");
        log.timestamp = Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap();
        log.spoken_insight_text = Some("hello".to_string());

        let value = serde_json::to_value(&log).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": "a",
                "timestamp": "2024-03-01T08:30:00Z",
                "angelNumber": "111",
                "emotion": "Joyful",
                "activity": "Meditating",
                "spokenInsightText": "hello",
            })
        );
    }

    #[test]
    fn deserialization_rejects_non_canonical_numbers() {
        let raw = r#"{"id":"a","timestamp":"2024-03-01T08:30:00Z","angelNumber":"one",
            "emotion":"Joyful","activity":"Meditating"}"#;
        assert!(serde_json::from_str::<LogEntry>(raw).is_err());
    }

    #[test]
    fn validate_limits_notes_length() {
        let mut log = entry("a", "111");
        log.notes = Some("n".repeat(NOTES_MAX_CHARS));
        assert!(log.validate().is_ok());

        log.notes = Some("n".repeat(NOTES_MAX_CHARS + 1));
        assert_eq!(
            log.validate(),
            Err(ValidationError::NotesTooLong {
                max: NOTES_MAX_CHARS,
                actual: NOTES_MAX_CHARS + 1
            })
        );
    }

    #[test]
    fn newest_first_orders_by_timestamp() {
        let mut older = entry("old", "111");
        older.timestamp = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut newer = entry("new", "222");
        newer.timestamp = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

        let ordered = newest_first(&[older, newer]);
        let ids: Vec<_> = ordered.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old"]);
    }
}
