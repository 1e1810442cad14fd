//! Daily affirmation built from recent entries, cached per calendar day.

use std::fmt::Write as _;

use chrono::NaiveDate;

use crate::ai::{AffirmationRequest, CompletionBackend, Insights};
use crate::cache::{read_json, write_json, LocalCache, AFFIRMATION_KEY};
use crate::error::Result;
use crate::models::{newest_first, DailyAffirmation, LogEntry};

/// How many entries feed the affirmation prompt.
pub const RECENT_ENTRY_LIMIT: usize = 5;

const NO_RECENT_LOGS: &str = "No recent logs.";

/// One line per entry, newest first, at most `limit` lines.
#[must_use]
pub fn summarize_recent_entries(entries: &[LogEntry], limit: usize) -> String {
    let recent = newest_first(entries);
    if recent.is_empty() || limit == 0 {
        return NO_RECENT_LOGS.to_string();
    }

    let mut summary = String::new();
    for entry in recent.iter().take(limit) {
        if !summary.is_empty() {
            summary.push('\n');
        }
        let _ = write!(
            summary,
            "Date: {}, Number: {}, Emotion: {}, Activity: {}",
            entry.timestamp.format("%b %-d, %Y"),
            entry.angel_number,
            entry.emotion,
            entry.activity
        );
        if let Some(notes) = &entry.notes {
            let _ = write!(summary, ", Notes: {notes}");
        }
    }
    summary
}

/// Cached affirmation if it was generated for `today`.
pub fn cached_affirmation<C: LocalCache + ?Sized>(
    cache: &C,
    today: NaiveDate,
) -> Result<Option<DailyAffirmation>> {
    let cached: Option<DailyAffirmation> = read_json(cache, AFFIRMATION_KEY)?;
    Ok(cached.filter(|affirmation| affirmation.is_for(today)))
}

/// Today's affirmation, generating and caching a fresh one when needed.
///
/// A failed generation leaves any previously cached affirmation in place.
pub async fn daily_affirmation<C, B>(
    cache: &C,
    insights: &Insights<B>,
    entries: &[LogEntry],
    today: NaiveDate,
    force_refresh: bool,
) -> Result<DailyAffirmation>
where
    C: LocalCache + ?Sized,
    B: CompletionBackend,
{
    if !force_refresh {
        if let Some(cached) = cached_affirmation(cache, today)? {
            tracing::debug!("Using cached affirmation for {today}");
            return Ok(cached);
        }
    }

    let request = AffirmationRequest {
        logged_data: summarize_recent_entries(entries, RECENT_ENTRY_LIMIT),
        current_date: today,
        astrological_events: None,
    };
    let text = insights.daily_affirmation(&request).await?;
    let affirmation = DailyAffirmation { date: today, text };
    write_json(cache, AFFIRMATION_KEY, &affirmation)?;
    tracing::info!("Generated affirmation for {today}");
    Ok(affirmation)
}
