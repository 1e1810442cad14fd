//! Runtime configuration for the remote mirror and the completion backend.
//!
//! Values are read through a lookup closure so callers can layer sources
//! (process environment over a saved profile) and tests never touch the
//! real environment.

use std::env;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::util::{normalize_base_url, normalize_text_option};

pub const ENV_MIRROR_URL: &str = "WHISPERLOG_MIRROR_URL";
pub const ENV_MIRROR_TOKEN: &str = "WHISPERLOG_MIRROR_TOKEN";
pub const ENV_MIRROR_COLLECTION: &str = "WHISPERLOG_MIRROR_COLLECTION";
pub const ENV_MIRROR_DOCUMENT: &str = "WHISPERLOG_MIRROR_DOCUMENT";
pub const ENV_MIRROR_POLL_SECS: &str = "WHISPERLOG_MIRROR_POLL_SECS";

pub const ENV_AI_BASE_URL: &str = "WHISPERLOG_AI_BASE_URL";
pub const ENV_AI_API_KEY: &str = "WHISPERLOG_AI_API_KEY";
pub const ENV_AI_MODEL: &str = "WHISPERLOG_AI_MODEL";
pub const ENV_AI_TIMEOUT_SECS: &str = "WHISPERLOG_AI_TIMEOUT_SECS";
pub const ENV_OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";

pub const DEFAULT_MIRROR_COLLECTION: &str = "logEntries";
pub const DEFAULT_MIRROR_DOCUMENT: &str = "entries";
pub const DEFAULT_POLL_SECS: u64 = 15;

pub const DEFAULT_AI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_AI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_AI_TIMEOUT_SECS: u64 = 60;

/// Where the remote copy of the entries lives.
#[derive(Clone, PartialEq, Eq)]
pub struct MirrorConfig {
    pub url: String,
    pub token: Option<String>,
    pub collection: String,
    pub document: String,
    pub poll_interval: Duration,
}

impl std::fmt::Debug for MirrorConfig {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("MirrorConfig")
            .field("url", &self.url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("collection", &self.collection)
            .field("document", &self.document)
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}

impl MirrorConfig {
    /// Read mirror settings from the process environment.
    ///
    /// Returns `Ok(None)` when no mirror is configured (local-only mode).
    pub fn from_env() -> Result<Option<Self>> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read mirror settings through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Option<Self>> {
        let value = |key: &str| normalize_text_option(lookup(key));

        let url = value(ENV_MIRROR_URL);
        let token = value(ENV_MIRROR_TOKEN);
        let collection = value(ENV_MIRROR_COLLECTION);
        let document = value(ENV_MIRROR_DOCUMENT);
        let poll_secs = value(ENV_MIRROR_POLL_SECS);

        let Some(url) = url else {
            let stray: Vec<&str> = [
                (ENV_MIRROR_TOKEN, token.is_some()),
                (ENV_MIRROR_COLLECTION, collection.is_some()),
                (ENV_MIRROR_DOCUMENT, document.is_some()),
                (ENV_MIRROR_POLL_SECS, poll_secs.is_some()),
            ]
            .into_iter()
            .filter_map(|(key, present)| present.then_some(key))
            .collect();
            if stray.is_empty() {
                return Ok(None);
            }
            return Err(Error::InvalidInput(format!(
                "Incomplete mirror configuration: {} set without {ENV_MIRROR_URL}",
                stray.join(", ")
            )));
        };

        let url = normalize_base_url(&url).ok_or_else(|| {
            Error::InvalidInput(format!(
                "{ENV_MIRROR_URL} must start with http:// or https://"
            ))
        })?;
        let poll_interval = match poll_secs {
            Some(raw) => parse_seconds(ENV_MIRROR_POLL_SECS, &raw)?,
            None => Duration::from_secs(DEFAULT_POLL_SECS),
        };

        Ok(Some(Self {
            url,
            token,
            collection: collection.unwrap_or_else(|| DEFAULT_MIRROR_COLLECTION.to_string()),
            document: document.unwrap_or_else(|| DEFAULT_MIRROR_DOCUMENT.to_string()),
            poll_interval,
        }))
    }
}

/// Settings for an OpenAI-compatible chat completion endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct CompletionConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout: Duration,
    /// Whether the base URL came from configuration rather than the default.
    pub explicit_base_url: bool,
}

impl std::fmt::Debug for CompletionConfig {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("CompletionConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_AI_BASE_URL.to_string(),
            api_key: None,
            model: DEFAULT_AI_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_AI_TIMEOUT_SECS),
            explicit_base_url: false,
        }
    }
}

impl CompletionConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let value = |key: &str| normalize_text_option(lookup(key));
        let mut config = Self::default();

        if let Some(raw) = value(ENV_AI_BASE_URL).or_else(|| value(ENV_OPENAI_BASE_URL)) {
            config.base_url = normalize_base_url(&raw).ok_or_else(|| {
                Error::InvalidInput(format!(
                    "{ENV_AI_BASE_URL} must start with http:// or https://"
                ))
            })?;
            config.explicit_base_url = true;
        }
        config.api_key = value(ENV_AI_API_KEY).or_else(|| value(ENV_OPENAI_API_KEY));
        if let Some(model) = value(ENV_AI_MODEL) {
            config.model = model;
        }
        if let Some(raw) = value(ENV_AI_TIMEOUT_SECS) {
            config.timeout = parse_seconds(ENV_AI_TIMEOUT_SECS, &raw)?;
        }
        Ok(config)
    }

    /// An API key is present, or a custom (e.g. local, keyless) endpoint was
    /// chosen.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.api_key.is_some() || self.explicit_base_url
    }
}

fn parse_seconds(key: &str, raw: &str) -> Result<Duration> {
    match raw.parse::<u64>() {
        Ok(seconds) if seconds > 0 => Ok(Duration::from_secs(seconds)),
        _ => Err(Error::InvalidInput(format!(
            "{key} must be a positive number of seconds, got {raw:?}"
        ))),
    }
}
