//! Local-first entry store with a remote mirror
//!
//! Every mutation is written to the local cache before it becomes visible in
//! memory, then the whole collection is pushed to the mirror in the
//! background. Remote snapshots replace local state according to the store's
//! [`ConvergencePolicy`].

mod policy;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::cache::{read_json, write_json, LocalCache, ENTRIES_KEY};
use crate::error::{Error, Result};
use crate::mirror::{MirrorDocument, RemoteMirror};
use crate::models::{newest_first, EntryCollection, EntryId, LogEntry};

pub use policy::{ConvergencePolicy, WholeCollectionOverwrite};

/// How many of our own recent pushes are remembered to recognize echoes.
const ECHO_HISTORY: usize = 8;

/// Result of a background push.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// The mirror accepted the collection.
    Pushed,
    /// A newer state had already been sent, so this one was dropped.
    Superseded,
    /// The mirror rejected the push or was unreachable.
    Failed,
    /// Nothing was sent (local-only mode or no runtime).
    Skipped,
}

/// A push started by a mutation.
///
/// Awaiting it is optional. Dropping it does not cancel the push.
#[derive(Debug)]
pub struct PendingPush(Option<JoinHandle<PushOutcome>>);

impl PendingPush {
    const fn skipped() -> Self {
        Self(None)
    }

    /// Wait for the push to finish.
    pub async fn wait(self) -> PushOutcome {
        match self.0 {
            Some(task) => task.await.unwrap_or(PushOutcome::Failed),
            None => PushOutcome::Skipped,
        }
    }
}

/// Where a change to the collection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// Initial read of the local cache.
    Loaded,
    /// A mutation made through this store.
    Local,
    /// A snapshot received from the mirror.
    Remote,
}

/// Notification sent whenever the in-memory collection changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreChange {
    pub revision: u64,
    pub origin: ChangeOrigin,
    pub entries: usize,
}

/// Outcome of a one-off read of the mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The remote collection was applied locally.
    Applied { entries: usize },
    /// The remote document does not exist or has no entries field.
    RemoteEmpty,
}

/// Running background sync. Dropping the handle stops it.
#[derive(Debug)]
pub struct SyncHandle {
    task: JoinHandle<()>,
}

impl SyncHandle {
    /// Stop listening for remote changes.
    pub fn stop(self) {
        self.task.abort();
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

struct State {
    entries: EntryCollection,
    revision: u64,
}

struct Inner<C, M> {
    cache: C,
    mirror: M,
    policy: Box<dyn ConvergencePolicy>,
    state: Mutex<State>,
    /// Pushes at or below this revision are stale.
    settled: AtomicU64,
    /// Serializes calls to the mirror.
    push_lock: tokio::sync::Mutex<()>,
    /// Collections recently sent to the mirror, to recognize their echoes.
    recent_pushes: Mutex<VecDeque<EntryCollection>>,
    changes: watch::Sender<StoreChange>,
}

/// The authoritative in-session view of the log entries.
pub struct SyncedEntryStore<C, M> {
    inner: Arc<Inner<C, M>>,
}

impl<C, M> Clone for SyncedEntryStore<C, M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C, M> SyncedEntryStore<C, M>
where
    C: LocalCache + 'static,
    M: RemoteMirror + 'static,
{
    /// Create a store from the local cache only. No remote traffic happens
    /// until [`start_sync`](Self::start_sync) or a mutation.
    pub fn open(cache: C, mirror: M) -> Result<Self> {
        Self::open_with_policy(cache, mirror, WholeCollectionOverwrite)
    }

    /// Like [`open`](Self::open) with a custom convergence policy.
    pub fn open_with_policy(
        cache: C,
        mirror: M,
        policy: impl ConvergencePolicy + 'static,
    ) -> Result<Self> {
        let entries: EntryCollection = read_json(&cache, ENTRIES_KEY)?;
        tracing::debug!(
            "Loaded {} cached entries; mirror: {}; policy: {}",
            entries.len(),
            mirror.describe(),
            policy.name()
        );

        let (changes, _) = watch::channel(StoreChange {
            revision: 0,
            origin: ChangeOrigin::Loaded,
            entries: entries.len(),
        });

        Ok(Self {
            inner: Arc::new(Inner {
                cache,
                mirror,
                policy: Box::new(policy),
                state: Mutex::new(State {
                    entries,
                    revision: 0,
                }),
                settled: AtomicU64::new(0),
                push_lock: tokio::sync::Mutex::new(()),
                recent_pushes: Mutex::new(VecDeque::with_capacity(ECHO_HISTORY)),
                changes,
            }),
        })
    }

    /// Open the store and start following the mirror.
    pub fn load(cache: C, mirror: M) -> Result<(Self, SyncHandle)> {
        let store = Self::open(cache, mirror)?;
        let handle = store.start_sync()?;
        Ok((store, handle))
    }

    /// Start the background sync task: subscribe to the mirror, read it once
    /// (the remote is authoritative when it has entries), then apply every
    /// change notification until the handle is dropped.
    pub fn start_sync(&self) -> Result<SyncHandle> {
        let runtime = Handle::try_current()
            .map_err(|error| Error::Runtime(format!("cannot start sync: {error}")))?;
        let store = self.clone();
        let task = runtime.spawn(async move { store.run_sync().await });
        Ok(SyncHandle { task })
    }

    async fn run_sync(self) {
        let subscription = match self.inner.mirror.subscribe().await {
            Ok(subscription) => Some(subscription),
            Err(error) => {
                tracing::warn!("Could not subscribe to mirror changes: {error}");
                None
            }
        };

        match self.refresh_from_remote().await {
            Ok(RefreshOutcome::Applied { entries }) => {
                tracing::info!("Loaded {entries} entries from mirror");
            }
            Ok(RefreshOutcome::RemoteEmpty) => {
                tracing::debug!("Mirror has no entries yet");
            }
            Err(error) => tracing::warn!("Initial mirror read failed: {error}"),
        }

        let Some(mut subscription) = subscription else {
            return;
        };
        while let Some(document) = subscription.next().await {
            self.apply_notification(document);
        }
        tracing::debug!("Mirror subscription ended");
    }

    /// Read the mirror once and apply its collection if it has one.
    pub async fn refresh_from_remote(&self) -> Result<RefreshOutcome> {
        let document = self.inner.mirror.fetch().await?;
        match document.and_then(|document| document.entries) {
            Some(entries) => {
                let count = entries.len();
                self.apply_remote(entries)?;
                Ok(RefreshOutcome::Applied { entries: count })
            }
            None => Ok(RefreshOutcome::RemoteEmpty),
        }
    }

    fn apply_notification(&self, document: MirrorDocument) {
        let Some(entries) = document.entries else {
            tracing::debug!("Ignoring mirror document without entries");
            return;
        };
        if self.take_own_echo(&entries) {
            tracing::debug!("Ignoring echo of our own push");
            return;
        }
        if let Err(error) = self.apply_remote(entries) {
            tracing::warn!("Could not apply remote change: {error}");
        }
    }

    /// Each push is recognized once. A match also forgets the pushes sent
    /// before it, whose echoes can no longer arrive in order.
    fn take_own_echo(&self, entries: &EntryCollection) -> bool {
        let mut recent = lock(&self.inner.recent_pushes);
        match recent.iter().position(|pushed| pushed == entries) {
            Some(index) => {
                recent.drain(..=index);
                true
            }
            None => false,
        }
    }

    /// Replace local state with a remote snapshot.
    ///
    /// The cache is written first; if that fails, memory is left as it was.
    /// Pushes of older local states that have not gone out yet are dropped.
    pub fn apply_remote(&self, incoming: EntryCollection) -> Result<()> {
        let mut state = lock(&self.inner.state);
        let next = self.inner.policy.reconcile(&state.entries, incoming);
        write_json(&self.inner.cache, ENTRIES_KEY, &next)?;

        state.revision += 1;
        state.entries = next;
        self.inner.settled.fetch_max(state.revision, Ordering::SeqCst);
        lock(&self.inner.recent_pushes).clear();
        self.notify(&state, ChangeOrigin::Remote);
        Ok(())
    }

    /// Insert `entry`, or replace the entry with the same id in place.
    pub fn upsert(&self, entry: LogEntry) -> Result<PendingPush> {
        entry.validate()?;
        let committed = self.commit(|entries| {
            match entries.iter().position(|existing| existing.id == entry.id) {
                Some(index) => entries[index] = entry,
                None => entries.push(entry),
            }
            true
        })?;
        Ok(committed.map_or_else(PendingPush::skipped, |(revision, snapshot)| {
            self.schedule_push(revision, snapshot)
        }))
    }

    /// Record a new entry.
    pub fn append(&self, entry: LogEntry) -> Result<PendingPush> {
        self.upsert(entry)
    }

    /// Replace an entry wholly, keyed by its id.
    pub fn update(&self, entry: LogEntry) -> Result<PendingPush> {
        self.upsert(entry)
    }

    /// Remove the entry with `id`. Returns `None` without writing anything
    /// when there is no such entry.
    pub fn remove(&self, id: &EntryId) -> Result<Option<PendingPush>> {
        let committed = self.commit(|entries| {
            let before = entries.len();
            entries.retain(|entry| &entry.id != id);
            entries.len() != before
        })?;
        Ok(committed.map(|(revision, snapshot)| self.schedule_push(revision, snapshot)))
    }

    /// Push the current collection even though nothing changed locally.
    pub async fn push_current(&self) -> PushOutcome {
        let (revision, snapshot) = {
            let mut state = lock(&self.inner.state);
            state.revision += 1;
            (state.revision, state.entries.clone())
        };
        self.schedule_push(revision, snapshot).wait().await
    }

    /// Apply `mutate` to a copy of the collection and, if it reports a
    /// change, persist it and make it current.
    fn commit<F>(&self, mutate: F) -> Result<Option<(u64, EntryCollection)>>
    where
        F: FnOnce(&mut EntryCollection) -> bool,
    {
        let mut state = lock(&self.inner.state);
        let mut next = state.entries.clone();
        if !mutate(&mut next) {
            return Ok(None);
        }
        write_json(&self.inner.cache, ENTRIES_KEY, &next)?;

        state.revision += 1;
        state.entries = next;
        self.notify(&state, ChangeOrigin::Local);
        Ok(Some((state.revision, state.entries.clone())))
    }

    fn notify(&self, state: &State, origin: ChangeOrigin) {
        self.inner.changes.send_replace(StoreChange {
            revision: state.revision,
            origin,
            entries: state.entries.len(),
        });
    }

    fn schedule_push(&self, revision: u64, snapshot: EntryCollection) -> PendingPush {
        if !self.inner.mirror.is_remote() {
            return PendingPush::skipped();
        }
        let Ok(runtime) = Handle::try_current() else {
            tracing::warn!("No async runtime; revision {revision} was not pushed to the mirror");
            return PendingPush::skipped();
        };

        let store = self.clone();
        PendingPush(Some(runtime.spawn(async move {
            store.push_revision(revision, snapshot).await
        })))
    }

    async fn push_revision(&self, revision: u64, snapshot: EntryCollection) -> PushOutcome {
        let _guard = self.inner.push_lock.lock().await;
        if revision <= self.inner.settled.load(Ordering::SeqCst) {
            tracing::debug!("Skipping push of revision {revision}; a newer state was sent");
            return PushOutcome::Superseded;
        }
        self.inner.settled.fetch_max(revision, Ordering::SeqCst);

        {
            let mut recent = lock(&self.inner.recent_pushes);
            if recent.len() == ECHO_HISTORY {
                recent.pop_front();
            }
            recent.push_back(snapshot.clone());
        }
        let document = MirrorDocument::with_entries(snapshot);
        match self.inner.mirror.push(&document).await {
            Ok(()) => {
                tracing::debug!("Pushed revision {revision} to {}", self.inner.mirror.describe());
                PushOutcome::Pushed
            }
            Err(error) => {
                // No echo will follow a rejected push.
                lock(&self.inner.recent_pushes).pop_back();
                tracing::warn!("Mirror push failed; remote stays stale until the next change: {error}");
                PushOutcome::Failed
            }
        }
    }
}

impl<C, M> SyncedEntryStore<C, M> {
    /// Snapshot of the collection in its stored order.
    #[must_use]
    pub fn current(&self) -> EntryCollection {
        lock(&self.inner.state).entries.clone()
    }

    #[must_use]
    pub fn get(&self, id: &EntryId) -> Option<LogEntry> {
        lock(&self.inner.state)
            .entries
            .iter()
            .find(|entry| &entry.id == id)
            .cloned()
    }

    /// Entries ordered newest first.
    #[must_use]
    pub fn timeline(&self) -> EntryCollection {
        newest_first(&lock(&self.inner.state).entries)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.inner.state).entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries whose id starts with `prefix`. An exact match wins over
    /// longer ids sharing the prefix.
    #[must_use]
    pub fn resolve_prefix(&self, prefix: &str) -> Vec<LogEntry> {
        let state = lock(&self.inner.state);
        if let Some(exact) = state.entries.iter().find(|entry| entry.id.as_str() == prefix) {
            return vec![exact.clone()];
        }
        state
            .entries
            .iter()
            .filter(|entry| entry.id.as_str().starts_with(prefix))
            .cloned()
            .collect()
    }

    /// Receive a notification whenever the collection changes.
    #[must_use]
    pub fn changes(&self) -> watch::Receiver<StoreChange> {
        self.inner.changes.subscribe()
    }

    pub fn cache(&self) -> &C {
        &self.inner.cache
    }

    pub fn mirror(&self) -> &M {
        &self.inner.mirror
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests;
