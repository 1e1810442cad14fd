//! OpenAI-compatible chat completion backend

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{CompletionBackend, CompletionError, CompletionRequest};
use crate::config::CompletionConfig;
use crate::util::{compact_text, normalize_base_url};

const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    response_format: ResponseFormat,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Chat completion client for OpenAI and compatible servers.
pub struct OpenAiBackend {
    client: Client,
    config: CompletionConfig,
}

impl OpenAiBackend {
    pub fn new(config: CompletionConfig) -> Result<Self, CompletionError> {
        let base_url = normalize_base_url(&config.base_url).ok_or_else(|| {
            CompletionError::InvalidConfiguration(
                "base URL must include http:// or https://".to_string(),
            )
        })?;
        let client = Client::builder().timeout(config.timeout).build()?;
        tracing::debug!(
            "Initializing completion backend: url={}, model={}",
            base_url,
            config.model
        );
        Ok(Self {
            client,
            config: CompletionConfig { base_url, ..config },
        })
    }

    pub const fn config(&self) -> &CompletionConfig {
        &self.config
    }

    fn build_request(&self, endpoint: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{endpoint}", self.config.base_url);
        let request = self.client.post(url);
        match &self.config.api_key {
            Some(api_key) => request.bearer_auth(api_key),
            None => request,
        }
    }
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    fn model(&self) -> &str {
        &self.config.model
    }

    async fn complete_json(
        &self,
        request: &CompletionRequest,
    ) -> Result<Option<Value>, CompletionError> {
        let body = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            temperature: TEMPERATURE,
            response_format: ResponseFormat {
                kind: "json_object",
            },
            stream: false,
        };

        let response = self
            .build_request("/chat/completions")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .map_or_else(|_| compact_text(&text), |payload| payload.error.message);
            return Err(CompletionError::Api(format!(
                "{} ({})",
                message,
                status.as_u16()
            )));
        }

        let payload: ChatCompletionResponse = response.json().await?;
        let content = payload
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();
        Ok(parse_json_content(&content))
    }
}

/// Parse the message content as a JSON object, tolerating a markdown fence.
fn parse_json_content(content: &str) -> Option<Value> {
    let trimmed = content.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();
    if unfenced.is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(unfenced) {
        Ok(value) if value.is_object() => Some(value),
        Ok(_) => {
            tracing::warn!("Completion content was JSON but not an object");
            None
        }
        Err(error) => {
            tracing::warn!("Completion content was not valid JSON: {error}");
            None
        }
    }
}
