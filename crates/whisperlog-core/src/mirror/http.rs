//! Document mirror over plain HTTP

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use super::{MirrorDocument, MirrorError, MirrorResult, MirrorSubscription, RemoteMirror};
use crate::config::MirrorConfig;
use crate::util::{compact_text, normalize_base_url};

/// Mirror stored at `{base}/documents/{collection}/{document}`.
///
/// `GET` reads the document (404 means it does not exist) and `PUT`
/// replaces it. Change notifications are produced by polling.
#[derive(Clone)]
pub struct HttpMirror {
    client: reqwest::Client,
    document_url: String,
    token: Option<String>,
    poll_interval: Duration,
}

impl std::fmt::Debug for HttpMirror {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpMirror")
            .field("document_url", &self.document_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

impl HttpMirror {
    pub fn new(config: &MirrorConfig) -> MirrorResult<Self> {
        let base = normalize_base_url(&config.url).ok_or_else(|| {
            MirrorError::InvalidConfiguration(
                "mirror URL must include http:// or https://".to_string(),
            )
        })?;
        if config.collection.trim().is_empty() || config.document.trim().is_empty() {
            return Err(MirrorError::InvalidConfiguration(
                "collection and document must not be empty".to_string(),
            ));
        }
        if config.poll_interval.is_zero() {
            return Err(MirrorError::InvalidConfiguration(
                "poll interval must be greater than zero".to_string(),
            ));
        }

        let document_url = format!(
            "{base}/documents/{}/{}",
            urlencoding::encode(config.collection.trim()),
            urlencoding::encode(config.document.trim())
        );

        Ok(Self {
            client: reqwest::Client::builder().build()?,
            document_url,
            token: config.token.clone(),
            poll_interval: config.poll_interval,
        })
    }

    fn request(&self, method: reqwest::Method) -> reqwest::RequestBuilder {
        let builder = self
            .client
            .request(method, &self.document_url)
            .header("Accept", "application/json");
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

#[async_trait]
impl RemoteMirror for HttpMirror {
    fn describe(&self) -> String {
        self.document_url.clone()
    }

    async fn fetch(&self) -> MirrorResult<Option<MirrorDocument>> {
        let response = self.request(reqwest::Method::GET).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body = response.text().await?;
        if !status.is_success() {
            return Err(MirrorError::Api(parse_api_error(status, &body)));
        }

        let document = serde_json::from_str::<MirrorDocument>(&body)
            .map_err(|error| MirrorError::InvalidPayload(error.to_string()))?;
        tracing::debug!("Fetched mirror document from {}", self.document_url);
        Ok(Some(document))
    }

    async fn push(&self, document: &MirrorDocument) -> MirrorResult<()> {
        let response = self
            .request(reqwest::Method::PUT)
            .json(document)
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MirrorError::Api(parse_api_error(status, &body)));
        }
        tracing::debug!("Pushed mirror document to {}", self.document_url);
        Ok(())
    }

    async fn subscribe(&self) -> MirrorResult<MirrorSubscription> {
        let mirror = self.clone();
        let (sender, receiver) = mpsc::channel(8);
        let feeder = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(mirror.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut last_seen: Option<MirrorDocument> = None;

            loop {
                ticker.tick().await;
                match mirror.fetch().await {
                    Ok(Some(document)) => {
                        if last_seen.as_ref() == Some(&document) {
                            continue;
                        }
                        last_seen = Some(document.clone());
                        if sender.send(document).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(error) => {
                        tracing::warn!("Mirror poll failed: {error}");
                    }
                }
            }
        });
        Ok(MirrorSubscription::new(receiver, feeder))
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return format!("{} ({})", compact_text(&message), status.as_u16());
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}
