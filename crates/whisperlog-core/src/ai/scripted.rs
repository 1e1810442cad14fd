//! Completion backend that replays canned answers.
//!
//! Useful for exercising the insight flows without a network.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::Value;

use super::{CompletionBackend, CompletionError, CompletionRequest};

/// Answers requests from a queue and records what it was asked.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    answers: Mutex<VecDeque<Option<Value>>>,
    failure: Option<String>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedBackend {
    /// Reply with `answers` in order, then with no output.
    pub fn new(answers: impl IntoIterator<Item = Option<Value>>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Fail every request with an API error carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    fn model(&self) -> &str {
        "scripted"
    }

    async fn complete_json(
        &self,
        request: &CompletionRequest,
    ) -> Result<Option<Value>, CompletionError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        if let Some(message) = &self.failure {
            return Err(CompletionError::Api(message.clone()));
        }
        Ok(self
            .answers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .flatten())
    }
}
