//! Remote document mirror
//!
//! The mirror holds one document, `{ "entries": [...] }`, addressed by a
//! fixed collection/document pair. It supports a point read, a whole
//! document replace and change notifications carrying the full document.

mod http;
mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::models::EntryCollection;

pub use http::HttpMirror;
pub use memory::InMemoryMirror;

/// Shape of the remote document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entries: Option<EntryCollection>,
}

impl MirrorDocument {
    #[must_use]
    pub const fn with_entries(entries: EntryCollection) -> Self {
        Self {
            entries: Some(entries),
        }
    }
}

#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Invalid mirror configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Mirror HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Mirror API error: {0}")]
    Api(String),
    #[error("Invalid mirror document: {0}")]
    InvalidPayload(String),
    #[error("Mirror unavailable: {0}")]
    Unavailable(String),
}

pub type MirrorResult<T> = Result<T, MirrorError>;

/// A remote copy of the entry collection.
#[async_trait]
pub trait RemoteMirror: Send + Sync {
    /// Human readable location, for logs and status output.
    fn describe(&self) -> String;

    /// Whether this mirror talks to anything outside the process.
    fn is_remote(&self) -> bool {
        true
    }

    /// Read the document once. `None` when it does not exist.
    async fn fetch(&self) -> MirrorResult<Option<MirrorDocument>>;

    /// Replace the whole document.
    async fn push(&self, document: &MirrorDocument) -> MirrorResult<()>;

    /// Start receiving change notifications.
    async fn subscribe(&self) -> MirrorResult<MirrorSubscription>;
}

#[async_trait]
impl<M: RemoteMirror + ?Sized> RemoteMirror for Box<M> {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn is_remote(&self) -> bool {
        (**self).is_remote()
    }

    async fn fetch(&self) -> MirrorResult<Option<MirrorDocument>> {
        (**self).fetch().await
    }

    async fn push(&self, document: &MirrorDocument) -> MirrorResult<()> {
        (**self).push(document).await
    }

    async fn subscribe(&self) -> MirrorResult<MirrorSubscription> {
        (**self).subscribe().await
    }
}

#[async_trait]
impl<M: RemoteMirror + ?Sized> RemoteMirror for Arc<M> {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn is_remote(&self) -> bool {
        (**self).is_remote()
    }

    async fn fetch(&self) -> MirrorResult<Option<MirrorDocument>> {
        (**self).fetch().await
    }

    async fn push(&self, document: &MirrorDocument) -> MirrorResult<()> {
        (**self).push(document).await
    }

    async fn subscribe(&self) -> MirrorResult<MirrorSubscription> {
        (**self).subscribe().await
    }
}

/// Stream of remote documents.
///
/// Dropping the subscription stops the task feeding it.
pub struct MirrorSubscription {
    receiver: mpsc::Receiver<MirrorDocument>,
    feeder: Option<JoinHandle<()>>,
}

impl MirrorSubscription {
    pub fn new(receiver: mpsc::Receiver<MirrorDocument>, feeder: JoinHandle<()>) -> Self {
        Self {
            receiver,
            feeder: Some(feeder),
        }
    }

    /// A subscription that has already ended.
    #[must_use]
    pub fn closed() -> Self {
        let (_, receiver) = mpsc::channel(1);
        Self {
            receiver,
            feeder: None,
        }
    }

    /// Wait for the next document. `None` once the feed has ended.
    pub async fn next(&mut self) -> Option<MirrorDocument> {
        self.receiver.recv().await
    }
}

impl Drop for MirrorSubscription {
    fn drop(&mut self) {
        if let Some(feeder) = self.feeder.take() {
            feeder.abort();
        }
    }
}

/// Mirror used when no remote is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalOnlyMirror;

#[async_trait]
impl RemoteMirror for LocalOnlyMirror {
    fn describe(&self) -> String {
        "local only".to_string()
    }

    fn is_remote(&self) -> bool {
        false
    }

    async fn fetch(&self) -> MirrorResult<Option<MirrorDocument>> {
        Ok(None)
    }

    async fn push(&self, _document: &MirrorDocument) -> MirrorResult<()> {
        Ok(())
    }

    async fn subscribe(&self) -> MirrorResult<MirrorSubscription> {
        Ok(MirrorSubscription::closed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_without_entries_serializes_empty() {
        let json = serde_json::to_string(&MirrorDocument::default()).unwrap();
        assert_eq!(json, "{}");

        let parsed: MirrorDocument = serde_json::from_str(r#"{"other": 1}"#).unwrap();
        assert_eq!(parsed.entries, None);
    }

    #[test]
    fn document_with_empty_entries_keeps_field() {
        let json = serde_json::to_string(&MirrorDocument::with_entries(Vec::new())).unwrap();
        assert_eq!(json, r#"{"entries":[]}"#);
    }

    #[tokio::test]
    async fn local_only_mirror_is_inert() {
        let mirror = LocalOnlyMirror;
        assert!(!mirror.is_remote());
        assert_eq!(mirror.fetch().await.unwrap(), None);
        mirror
            .push(&MirrorDocument::with_entries(Vec::new()))
            .await
            .unwrap();
        let mut subscription = mirror.subscribe().await.unwrap();
        assert_eq!(subscription.next().await, None);
    }

    #[tokio::test]
    async fn dropping_subscription_stops_feeder() {
        let (sender, receiver) = mpsc::channel(1);
        let feeder = tokio::spawn(async move {
            let _sender = sender;
            std::future::pending::<()>().await;
        });
        let abort = feeder.abort_handle();
        drop(MirrorSubscription::new(receiver, feeder));

        tokio::task::yield_now().await;
        for _ in 0..10 {
            if abort.is_finished() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        assert!(abort.is_finished());
    }
}
