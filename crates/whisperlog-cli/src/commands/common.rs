use std::env;
use std::path::PathBuf;

use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use whisperlog_core::ai::{Insights, OpenAiBackend};
use whisperlog_core::cache::SqliteCache;
use whisperlog_core::config::{CompletionConfig, MirrorConfig};
use whisperlog_core::mirror::{HttpMirror, LocalOnlyMirror, RemoteMirror};
use whisperlog_core::store::PushOutcome;
use whisperlog_core::{LogEntry, SyncedEntryStore};

use crate::config_profiles::{layered_lookup, CliProfilesConfig};
use crate::error::CliError;

pub type CliStore = SyncedEntryStore<SqliteCache, Box<dyn RemoteMirror>>;

const SHORT_ID_LEN: usize = 13;
const ENV_DB_PATH: &str = "WHISPERLOG_DB_PATH";

/// Global options shared by every command.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub db_path: PathBuf,
    pub profile: Option<String>,
}

impl CommandContext {
    /// Environment variables layered over the selected profile.
    pub fn settings(&self) -> Result<impl Fn(&str) -> Option<String>, CliError> {
        let config = CliProfilesConfig::load().map_err(CliError::Config)?;
        let profile_name = config.resolve_profile_name(self.profile.as_deref());
        let profile = config.profile(&profile_name).cloned();
        if profile.is_some() {
            tracing::debug!("Using CLI profile '{profile_name}'");
        }
        Ok(layered_lookup(profile, |key| env::var(key).ok()))
    }

    pub fn open_cache(&self) -> Result<SqliteCache, CliError> {
        Ok(SqliteCache::open(&self.db_path)?)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum OpenStoreMode {
    /// Read the mirror once if one is configured; fall back to the cache.
    Standard,
    /// A mirror must be configured; the caller drives all remote traffic.
    RequireSync,
}

impl OpenStoreMode {
    const fn requires_sync(self) -> bool {
        matches!(self, Self::RequireSync)
    }
}

pub async fn open_store(ctx: &CommandContext, mode: OpenStoreMode) -> Result<CliStore, CliError> {
    let settings = ctx.settings()?;
    let mirror: Box<dyn RemoteMirror> = match MirrorConfig::from_lookup(&settings)? {
        Some(config) => {
            tracing::info!(
                "Remote mirror enabled: {} ({}/{})",
                config.url,
                config.collection,
                config.document
            );
            Box::new(HttpMirror::new(&config)?)
        }
        None if mode.requires_sync() => return Err(CliError::SyncNotConfigured),
        None => Box::new(LocalOnlyMirror),
    };

    let store = SyncedEntryStore::open(ctx.open_cache()?, mirror)?;
    if mode == OpenStoreMode::Standard && store.mirror().is_remote() {
        if let Err(error) = store.refresh_from_remote().await {
            tracing::warn!("Remote mirror unavailable, using local cache: {error}");
        }
    }
    Ok(store)
}

pub fn open_insights(ctx: &CommandContext) -> Result<Insights<OpenAiBackend>, CliError> {
    let config = CompletionConfig::from_lookup(ctx.settings()?)?;
    if !config.is_configured() {
        return Err(CliError::AiNotConfigured);
    }
    Ok(Insights::new(OpenAiBackend::new(config)?))
}

/// Find one entry by full id or unique id prefix.
pub fn resolve_entry<C, M>(
    store: &SyncedEntryStore<C, M>,
    query: &str,
) -> Result<LogEntry, CliError> {
    let query = normalize_entry_identifier(query)?;
    let mut matches = store.resolve_prefix(&query);

    match matches.len() {
        0 => Err(CliError::EntryNotFound(query)),
        1 => Ok(matches.remove(0)),
        _ => {
            let options = matches
                .iter()
                .take(3)
                .map(|entry| entry.id.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            Err(CliError::AmbiguousEntryId(format!(
                "ID prefix '{query}' is ambiguous; matches: {options}"
            )))
        }
    }
}

pub fn normalize_entry_identifier(id: &str) -> Result<String, CliError> {
    normalize_content(id).ok_or(CliError::EmptyEntryId)
}

pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub const fn push_warning(outcome: PushOutcome) -> Option<&'static str> {
    match outcome {
        PushOutcome::Failed => Some("Saved locally, but the remote mirror was not updated"),
        PushOutcome::Pushed | PushOutcome::Superseded | PushOutcome::Skipped => None,
    }
}

/// Log a push that left the mirror stale. The command itself still succeeds.
pub fn report_push(outcome: PushOutcome) {
    if let Some(warning) = push_warning(outcome) {
        tracing::warn!("{warning}");
    }
}

#[derive(Debug, Serialize)]
pub struct EntryListItem {
    pub id: String,
    pub angel_number: String,
    pub emotion: String,
    pub activity: String,
    pub mood: Option<String>,
    pub notes: Option<String>,
    pub timestamp: String,
    pub relative_time: String,
    pub interpreted: bool,
}

pub fn entry_to_list_item(entry: &LogEntry, now: DateTime<Utc>) -> EntryListItem {
    EntryListItem {
        id: entry.id.to_string(),
        angel_number: entry.angel_number.to_string(),
        emotion: entry.emotion.to_string(),
        activity: entry.activity.to_string(),
        mood: entry.mood.map(|mood| mood.to_string()),
        notes: entry.notes.clone(),
        timestamp: entry.timestamp.to_rfc3339(),
        relative_time: format_relative_time(entry.timestamp, now),
        interpreted: entry.interpretation.is_some(),
    }
}

pub fn format_entry_lines(entries: &[LogEntry], now: DateTime<Utc>) -> Vec<String> {
    entries
        .iter()
        .map(|entry| {
            let id = short_id(entry.id.as_str());
            let feeling = format!("{} / {}", entry.emotion, entry.activity);
            let relative_time = format_relative_time(entry.timestamp, now);
            let line = format!(
                "{id:<13}  {:>4}  {feeling:<30}  {relative_time:<8}",
                entry.angel_number.as_str()
            );
            match entry.notes.as_deref() {
                Some(notes) => format!("{line}  {}", preview(notes, 40)),
                None => line.trim_end().to_string(),
            }
        })
        .collect()
}

/// Full human readable view of one entry.
pub fn render_entry_detail(entry: &LogEntry) -> String {
    let mut lines = vec![
        format!("ID:        {}", entry.id),
        format!(
            "Logged:    {}",
            entry
                .timestamp
                .with_timezone(&Local)
                .format("%b %-d, %Y %H:%M")
        ),
        format!("Number:    {}", entry.angel_number),
        format!("Emotion:   {}", entry.emotion),
        format!("Activity:  {}", entry.activity),
    ];
    if let Some(mood) = entry.mood {
        lines.push(format!("Mood:      {mood}"));
    }
    if let Some(notes) = &entry.notes {
        lines.push(format!("Notes:     {notes}"));
    }

    match &entry.interpretation {
        Some(interpretation) => {
            let language = entry.interpretation_language.unwrap_or_default();
            lines.push(String::new());
            lines.push(format!("Interpretation ({language})"));
            for (title, text) in interpretation.sections() {
                lines.push(String::new());
                lines.push(format!("{title}:"));
                lines.push(format!("  {text}"));
            }
        }
        None => {
            lines.push(String::new());
            lines.push("No interpretation yet.".to_string());
        }
    }

    if let Some(spoken) = &entry.spoken_insight_text {
        let language = entry.spoken_insight_language.unwrap_or_default();
        lines.push(String::new());
        lines.push(format!("Spoken insight ({language}, {}):", language.speech_code()));
        lines.push(format!("  {spoken}"));
    }

    lines.join("\n")
}

pub fn short_id(id: &str) -> String {
    id.chars().take(SHORT_ID_LEN).collect()
}

pub fn preview(text: &str, max_chars: usize) -> String {
    let first_line = text.lines().next().unwrap_or("").trim();
    let collapsed = first_line.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn format_relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = (now - timestamp).num_seconds().max(0);
    let minute = 60;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}

pub fn resolve_db_path(cli_db_path: Option<PathBuf>) -> Result<PathBuf, CliError> {
    if let Some(path) = cli_db_path.or_else(|| env::var_os(ENV_DB_PATH).map(PathBuf::from)) {
        return Ok(path);
    }
    default_db_path()
}

pub fn default_db_path() -> Result<PathBuf, CliError> {
    dirs::data_dir()
        .map(|dir| dir.join("whisperlog").join("whisperlog.db"))
        .ok_or_else(|| CliError::Config("Failed to resolve CLI data directory".to_string()))
}
