//! Insight flows backed by an external completion service
//!
//! Each flow renders a prompt, asks the backend for a JSON object with known
//! keys, and turns the answer into a typed value. A backend error or an
//! answer without usable text is reported as the flow's [`FlowError`].

mod openai;
mod prompts;
pub mod scripted;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use thiserror::Error;

use crate::models::{Activity, Emotion, Interpretation, Language, LogEntry, VoiceStyle};

pub use openai::OpenAiBackend;

/// A single structured-output request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// Role and output format instructions.
    pub system: String,
    /// The rendered task.
    pub prompt: String,
    /// Keys the JSON answer must contain.
    pub expected_keys: Vec<&'static str>,
}

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("Invalid completion configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Completion request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Completion API error: {0}")]
    Api(String),
}

/// A service that answers prompts with JSON objects.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Model identifier, for logs.
    fn model(&self) -> &str;

    /// Run the request. `Ok(None)` means the service answered without a
    /// usable JSON object.
    async fn complete_json(
        &self,
        request: &CompletionRequest,
    ) -> Result<Option<Value>, CompletionError>;
}

#[async_trait]
impl<B: CompletionBackend + ?Sized> CompletionBackend for Box<B> {
    fn model(&self) -> &str {
        (**self).model()
    }

    async fn complete_json(
        &self,
        request: &CompletionRequest,
    ) -> Result<Option<Value>, CompletionError> {
        (**self).complete_json(request).await
    }
}

/// A flow that produced nothing usable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("Failed to get interpretation: {0}")]
    Interpretation(String),
    #[error("Failed to generate spoken insight: {0}")]
    SpokenInsight(String),
    #[error("Failed to polish note: {0}")]
    Polish(String),
    #[error("Failed to generate daily affirmation: {0}")]
    Affirmation(String),
}

/// Input of the interpretation flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpretationRequest {
    pub number: u32,
    pub emotion: Emotion,
    pub activity: Activity,
    pub notes: Option<String>,
    pub target_language: Language,
}

impl InterpretationRequest {
    #[must_use]
    pub fn for_entry(entry: &LogEntry, target_language: Language) -> Self {
        Self {
            number: entry.angel_number.as_u32(),
            emotion: entry.emotion,
            activity: entry.activity,
            notes: entry.notes.clone(),
            target_language,
        }
    }
}

/// Input of the spoken insight flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpokenInsightRequest {
    pub interpretation: Interpretation,
    pub source_language: Language,
    pub target_language: Language,
    pub voice_style: VoiceStyle,
}

/// Input of the daily affirmation flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffirmationRequest {
    pub logged_data: String,
    pub current_date: NaiveDate,
    pub astrological_events: Option<String>,
}

/// Typed insight flows over a completion backend.
pub struct Insights<B> {
    backend: B,
}

impl<B: CompletionBackend> Insights<B> {
    pub const fn new(backend: B) -> Self {
        Self { backend }
    }

    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Seven-part reading of a sighting.
    pub async fn interpret(
        &self,
        request: &InterpretationRequest,
    ) -> Result<Interpretation, FlowError> {
        let value = self
            .run(prompts::interpretation(request))
            .await
            .map_err(FlowError::Interpretation)?;

        let interpretation: Interpretation = serde_json::from_value(value)
            .map_err(|error| FlowError::Interpretation(format!("malformed output: {error}")))?;
        if interpretation.is_incomplete() {
            return Err(FlowError::Interpretation(
                "output is missing sections".to_string(),
            ));
        }
        Ok(interpretation)
    }

    /// Narration text for an interpretation, in the target language.
    pub async fn spoken_insight(
        &self,
        request: &SpokenInsightRequest,
    ) -> Result<String, FlowError> {
        let value = self
            .run(prompts::spoken_insight(request))
            .await
            .map_err(FlowError::SpokenInsight)?;
        text_field(&value, prompts::SPOKEN_INSIGHT_KEY).ok_or_else(|| {
            FlowError::SpokenInsight("output has no spoken text".to_string())
        })
    }

    /// Clean up grammar and clarity of a raw note.
    pub async fn polish_note(&self, raw: &str) -> Result<String, FlowError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(FlowError::Polish("note is empty".to_string()));
        }
        let value = self
            .run(prompts::polish_note(raw))
            .await
            .map_err(FlowError::Polish)?;
        text_field(&value, prompts::POLISHED_NOTE_KEY)
            .ok_or_else(|| FlowError::Polish("output has no polished note".to_string()))
    }

    /// One to three sentences of encouragement for the day.
    pub async fn daily_affirmation(
        &self,
        request: &AffirmationRequest,
    ) -> Result<String, FlowError> {
        let value = self
            .run(prompts::daily_affirmation(request))
            .await
            .map_err(FlowError::Affirmation)?;
        text_field(&value, prompts::AFFIRMATION_KEY)
            .ok_or_else(|| FlowError::Affirmation("output has no affirmation".to_string()))
    }

    async fn run(&self, request: CompletionRequest) -> Result<Value, String> {
        tracing::debug!(
            "Requesting completion with keys {:?} from {}",
            request.expected_keys,
            self.backend.model()
        );
        match self.backend.complete_json(&request).await {
            Ok(Some(value)) => Ok(value),
            Ok(None) => Err("no output from model".to_string()),
            Err(error) => {
                tracing::warn!("Completion failed: {error}");
                Err(error.to_string())
            }
        }
    }
}

fn text_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}
