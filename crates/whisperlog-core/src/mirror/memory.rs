//! In-process mirror shared between store instances

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc};

use super::{MirrorDocument, MirrorError, MirrorResult, MirrorSubscription, RemoteMirror};

const CHANNEL_CAPACITY: usize = 32;

/// A mirror kept in memory.
///
/// Clones share the same document, so two stores holding clones behave like
/// two devices writing to one remote. Every write is broadcast to all
/// subscribers, including the writer's own.
#[derive(Clone)]
pub struct InMemoryMirror {
    shared: Arc<Shared>,
}

struct Shared {
    document: Mutex<Option<MirrorDocument>>,
    changes: broadcast::Sender<MirrorDocument>,
    fail_pushes: AtomicBool,
    fail_fetches: AtomicBool,
    pushes: AtomicUsize,
}

impl InMemoryMirror {
    #[must_use]
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            shared: Arc::new(Shared {
                document: Mutex::new(None),
                changes,
                fail_pushes: AtomicBool::new(false),
                fail_fetches: AtomicBool::new(false),
                pushes: AtomicUsize::new(0),
            }),
        }
    }

    /// A mirror that already holds `document`.
    #[must_use]
    pub fn with_document(document: MirrorDocument) -> Self {
        let mirror = Self::new();
        *mirror.lock() = Some(document);
        mirror
    }

    /// Current remote document.
    #[must_use]
    pub fn document(&self) -> Option<MirrorDocument> {
        self.lock().clone()
    }

    /// Number of successful pushes so far.
    #[must_use]
    pub fn push_count(&self) -> usize {
        self.shared.pushes.load(Ordering::SeqCst)
    }

    /// Make pushes fail as if the remote were unreachable.
    pub fn set_fail_pushes(&self, fail: bool) {
        self.shared.fail_pushes.store(fail, Ordering::SeqCst);
    }

    /// Make fetches fail as if the remote were unreachable.
    pub fn set_fail_fetches(&self, fail: bool) {
        self.shared.fail_fetches.store(fail, Ordering::SeqCst);
    }

    /// Write `document` as another device would, notifying subscribers.
    pub fn write_external(&self, document: MirrorDocument) {
        *self.lock() = Some(document.clone());
        // No receivers is fine.
        let _ = self.shared.changes.send(document);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<MirrorDocument>> {
        self.shared
            .document
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InMemoryMirror {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteMirror for InMemoryMirror {
    fn describe(&self) -> String {
        "in-memory mirror".to_string()
    }

    async fn fetch(&self) -> MirrorResult<Option<MirrorDocument>> {
        if self.shared.fail_fetches.load(Ordering::SeqCst) {
            return Err(MirrorError::Unavailable("fetch disabled".to_string()));
        }
        Ok(self.document())
    }

    async fn push(&self, document: &MirrorDocument) -> MirrorResult<()> {
        if self.shared.fail_pushes.load(Ordering::SeqCst) {
            return Err(MirrorError::Unavailable("push disabled".to_string()));
        }
        self.write_external(document.clone());
        self.shared.pushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn subscribe(&self) -> MirrorResult<MirrorSubscription> {
        let mut changes = self.shared.changes.subscribe();
        let (sender, receiver) = mpsc::channel(CHANNEL_CAPACITY);
        let feeder = tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(document) => {
                        if sender.send(document).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::debug!("Subscriber skipped {skipped} mirror changes");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        Ok(MirrorSubscription::new(receiver, feeder))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn clones_share_the_document() {
        let mirror = InMemoryMirror::new();
        let other_device = mirror.clone();
        assert_eq!(mirror.fetch().await.unwrap(), None);

        other_device
            .push(&MirrorDocument::with_entries(Vec::new()))
            .await
            .unwrap();
        assert_eq!(
            mirror.fetch().await.unwrap(),
            Some(MirrorDocument::with_entries(Vec::new()))
        );
        assert_eq!(mirror.push_count(), 1);
    }

    #[tokio::test]
    async fn subscribers_receive_every_write() {
        let mirror = InMemoryMirror::new();
        let mut subscription = mirror.subscribe().await.unwrap();

        mirror.write_external(MirrorDocument::default());
        mirror
            .push(&MirrorDocument::with_entries(Vec::new()))
            .await
            .unwrap();

        let first = tokio::time::timeout(Duration::from_secs(1), subscription.next())
            .await
            .unwrap();
        let second = tokio::time::timeout(Duration::from_secs(1), subscription.next())
            .await
            .unwrap();
        assert_eq!(first, Some(MirrorDocument::default()));
        assert_eq!(second, Some(MirrorDocument::with_entries(Vec::new())));
    }

    #[tokio::test]
    async fn failure_switches_reject_calls() {
        let mirror = InMemoryMirror::with_document(MirrorDocument::default());
        mirror.set_fail_fetches(true);
        mirror.set_fail_pushes(true);

        assert!(matches!(
            mirror.fetch().await,
            Err(MirrorError::Unavailable(_))
        ));
        assert!(mirror.push(&MirrorDocument::default()).await.is_err());
        assert_eq!(mirror.push_count(), 0);

        mirror.set_fail_fetches(false);
        assert_eq!(
            mirror.fetch().await.unwrap(),
            Some(MirrorDocument::default())
        );
    }
}
