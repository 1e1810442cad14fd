use std::io;

use thiserror::Error;
use whisperlog_core::ai::{CompletionError, FlowError};
use whisperlog_core::mirror::MirrorError;
use whisperlog_core::ValidationError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] whisperlog_core::Error),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Flow(#[from] FlowError),
    #[error(transparent)]
    Completion(#[from] CompletionError),
    #[error(transparent)]
    Mirror(#[from] MirrorError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Entry ID cannot be empty")]
    EmptyEntryId,
    #[error("Entry not found for id/prefix: {0}")]
    EntryNotFound(String),
    #[error("{0}")]
    AmbiguousEntryId(String),
    #[error("Entry {0} has no interpretation yet. Run `whisperlog edit {0}` to request one.")]
    MissingInterpretation(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error(
        "AI is not configured. Set WHISPERLOG_AI_API_KEY (or OPENAI_API_KEY), or point WHISPERLOG_AI_BASE_URL at a compatible server."
    )]
    AiNotConfigured,
    #[error(
        "Sync is not configured. Run `whisperlog config init --mirror-url <URL>` or set WHISPERLOG_MIRROR_URL."
    )]
    SyncNotConfigured,
    #[error("Sync failed: {0}")]
    Sync(String),
}
