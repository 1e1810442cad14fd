use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;

use super::*;
use crate::cache::{MemoryCache, ReadOnlyCache};
use crate::mirror::{InMemoryMirror, LocalOnlyMirror};
use crate::models::{Activity, AngelNumber, Emotion, Mood, NOTES_MAX_CHARS};

type TestStore = SyncedEntryStore<Arc<MemoryCache>, InMemoryMirror>;

fn entry(id: &str, number: &str) -> LogEntry {
    LogEntry {
        id: EntryId::from(id),
        ..LogEntry::new(
            AngelNumber::from_canonical(number).unwrap(),
            Emotion::Joyful,
            Activity::Meditating,
        )
    }
}

fn ids(entries: &[LogEntry]) -> Vec<&str> {
    entries.iter().map(|entry| entry.id.as_str()).collect()
}

fn store_with_mirror(mirror: &InMemoryMirror) -> (TestStore, Arc<MemoryCache>) {
    let cache = Arc::new(MemoryCache::new());
    let store = SyncedEntryStore::open(Arc::clone(&cache), mirror.clone()).unwrap();
    (store, cache)
}

fn cached_entries(cache: &MemoryCache) -> EntryCollection {
    read_json(cache, ENTRIES_KEY).unwrap()
}

async fn eventually(mut condition: impl FnMut() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not met in time");
}

#[tokio::test]
async fn append_update_remove_scenario() {
    let mirror = InMemoryMirror::new();
    let (store, cache) = store_with_mirror(&mirror);

    store.append(entry("a", "111")).unwrap().wait().await;
    let current = store.current();
    assert_eq!(current.len(), 1);
    assert_eq!(current[0].angel_number.as_str(), "111");

    let mut enriched = store.get(&EntryId::from("a")).unwrap();
    enriched.spoken_insight_text = Some("hello".to_string());
    store.update(enriched).unwrap().wait().await;
    let current = store.current();
    assert_eq!(current.len(), 1);
    assert_eq!(current[0].spoken_insight_text.as_deref(), Some("hello"));

    let pending = store.remove(&EntryId::from("a")).unwrap();
    assert!(pending.is_some());
    assert!(store.current().is_empty());
    assert!(cached_entries(&cache).is_empty());
}

#[tokio::test]
async fn update_replaces_in_place() {
    let (store, _cache) = store_with_mirror(&InMemoryMirror::new());
    for (id, number) in [("a", "111"), ("b", "222"), ("c", "333")] {
        store.append(entry(id, number)).unwrap();
    }

    let mut changed = entry("b", "444");
    changed.mood = Some(Mood::Good);
    store.update(changed).unwrap();

    let current = store.current();
    assert_eq!(ids(&current), vec!["a", "b", "c"]);
    assert_eq!(current[1].angel_number.as_str(), "444");
    assert_eq!(current[1].mood, Some(Mood::Good));
}

#[tokio::test]
async fn removing_missing_id_writes_nothing() {
    let mirror = InMemoryMirror::new();
    let (store, cache) = store_with_mirror(&mirror);
    store.append(entry("a", "111")).unwrap().wait().await;
    let pushes = mirror.push_count();

    assert!(store.remove(&EntryId::from("zzz")).unwrap().is_none());
    assert_eq!(ids(&store.current()), vec!["a"]);
    assert_eq!(ids(&cached_entries(&cache)), vec!["a"]);
    assert_eq!(mirror.push_count(), pushes);
}

#[tokio::test]
async fn cache_matches_memory_after_every_mutation() {
    let (store, cache) = store_with_mirror(&InMemoryMirror::new());

    store.append(entry("a", "111")).unwrap();
    assert_eq!(cached_entries(&cache), store.current());

    store.append(entry("b", "7")).unwrap();
    assert_eq!(cached_entries(&cache), store.current());

    store.update(entry("a", "1212")).unwrap();
    assert_eq!(cached_entries(&cache), store.current());

    store.remove(&EntryId::from("b")).unwrap();
    assert_eq!(cached_entries(&cache), store.current());
}

#[tokio::test]
async fn open_reads_existing_cache() {
    let cache = Arc::new(MemoryCache::new());
    write_json(cache.as_ref(), ENTRIES_KEY, &vec![entry("a", "111")]).unwrap();

    let store = SyncedEntryStore::open(Arc::clone(&cache), LocalOnlyMirror).unwrap();
    assert_eq!(ids(&store.current()), vec!["a"]);
}

#[tokio::test]
async fn open_tolerates_corrupt_cache() {
    let cache = MemoryCache::new();
    cache.set(ENTRIES_KEY, "not json").unwrap();

    let store = SyncedEntryStore::open(cache, LocalOnlyMirror).unwrap();
    assert!(store.is_empty());
}

#[tokio::test]
async fn mutations_push_the_whole_collection() {
    let mirror = InMemoryMirror::new();
    let (store, _cache) = store_with_mirror(&mirror);

    assert_eq!(
        store.append(entry("a", "111")).unwrap().wait().await,
        PushOutcome::Pushed
    );
    store.append(entry("b", "222")).unwrap().wait().await;

    let remote = mirror.document().and_then(|document| document.entries);
    assert_eq!(remote, Some(store.current()));
}

#[tokio::test]
async fn remote_converges_on_last_mutation() {
    let mirror = InMemoryMirror::new();
    let (store, _cache) = store_with_mirror(&mirror);

    let pending: Vec<_> = (0..20)
        .map(|n| {
            store
                .append(entry(&format!("e{n}"), &format!("{n}")))
                .unwrap()
        })
        .collect();
    let mut outcomes = Vec::new();
    for push in pending {
        outcomes.push(push.wait().await);
    }

    assert_eq!(outcomes.last(), Some(&PushOutcome::Pushed));
    assert!(outcomes
        .iter()
        .all(|outcome| matches!(outcome, PushOutcome::Pushed | PushOutcome::Superseded)));
    let remote = mirror.document().and_then(|document| document.entries);
    assert_eq!(remote.map(|entries| entries.len()), Some(20));
}

#[tokio::test]
async fn push_failure_keeps_local_state() {
    let mirror = InMemoryMirror::new();
    mirror.set_fail_pushes(true);
    let (store, cache) = store_with_mirror(&mirror);

    let outcome = store.append(entry("a", "111")).unwrap().wait().await;
    assert_eq!(outcome, PushOutcome::Failed);
    assert_eq!(ids(&store.current()), vec!["a"]);
    assert_eq!(ids(&cached_entries(&cache)), vec!["a"]);
    assert_eq!(mirror.document(), None);

    // The next mutation brings the remote up to date.
    mirror.set_fail_pushes(false);
    store.append(entry("b", "222")).unwrap().wait().await;
    let remote = mirror.document().and_then(|document| document.entries);
    assert_eq!(remote.map(|entries| entries.len()), Some(2));
}

#[tokio::test]
async fn cache_failure_aborts_mutation() {
    let cache = ReadOnlyCache::seeded(
        ENTRIES_KEY,
        &serde_json::to_string(&vec![entry("a", "111")]).unwrap(),
    );
    let mirror = InMemoryMirror::new();
    let store = SyncedEntryStore::open(cache, mirror.clone()).unwrap();

    assert!(matches!(
        store.append(entry("b", "222")),
        Err(Error::Cache(_))
    ));
    assert!(store.remove(&EntryId::from("a")).is_err());
    assert_eq!(ids(&store.current()), vec!["a"]);
    assert_eq!(mirror.push_count(), 0);
}

#[tokio::test]
async fn apply_remote_cache_failure_keeps_memory() {
    let cache = ReadOnlyCache::seeded(
        ENTRIES_KEY,
        &serde_json::to_string(&vec![entry("a", "111")]).unwrap(),
    );
    let store = SyncedEntryStore::open(cache, LocalOnlyMirror).unwrap();

    assert!(store.apply_remote(vec![entry("r", "999")]).is_err());
    assert_eq!(ids(&store.current()), vec!["a"]);
}

#[tokio::test]
async fn invalid_entries_are_rejected() {
    let (store, _cache) = store_with_mirror(&InMemoryMirror::new());
    let mut long = entry("a", "111");
    long.notes = Some("x".repeat(NOTES_MAX_CHARS + 1));

    assert!(matches!(store.append(long), Err(Error::Validation(_))));
    assert!(store.is_empty());
}

#[tokio::test]
async fn local_only_mirror_skips_pushes() {
    let store = SyncedEntryStore::open(MemoryCache::new(), LocalOnlyMirror).unwrap();
    let outcome = store.append(entry("a", "111")).unwrap().wait().await;
    assert_eq!(outcome, PushOutcome::Skipped);
    assert_eq!(store.len(), 1);
}

#[test]
fn mutations_without_runtime_stay_local() {
    let mirror = InMemoryMirror::new();
    let (store, cache) = store_with_mirror(&mirror);

    let pending = store.append(entry("a", "111")).unwrap();
    assert!(pending.0.is_none());
    assert_eq!(ids(&cached_entries(&cache)), vec!["a"]);
    assert_eq!(mirror.push_count(), 0);
    assert!(store.start_sync().is_err());
}

#[tokio::test]
async fn remote_snapshot_replaces_local_state() {
    let mirror = InMemoryMirror::new();
    let (store, cache) = store_with_mirror(&mirror);
    store.append(entry("local-only", "111")).unwrap().wait().await;

    store.apply_remote(vec![entry("r1", "222"), entry("r2", "333")]).unwrap();

    assert_eq!(ids(&store.current()), vec!["r1", "r2"]);
    assert_eq!(cached_entries(&cache), store.current());
}

#[tokio::test]
async fn load_prefers_remote_entries() {
    let mirror =
        InMemoryMirror::with_document(MirrorDocument::with_entries(vec![entry("remote", "444")]));
    let cache = Arc::new(MemoryCache::new());
    write_json(cache.as_ref(), ENTRIES_KEY, &vec![entry("cached", "111")]).unwrap();

    let (store, _handle) = SyncedEntryStore::load(Arc::clone(&cache), mirror).unwrap();
    assert_eq!(ids(&store.current()), vec!["cached"]);

    eventually(|| ids(&store.current()) == vec!["remote"]).await;
    assert_eq!(ids(&cached_entries(&cache)), vec!["remote"]);
}

#[tokio::test]
async fn load_keeps_cache_when_remote_has_no_entries() {
    let mirror = InMemoryMirror::with_document(MirrorDocument::default());
    let cache = Arc::new(MemoryCache::new());
    write_json(cache.as_ref(), ENTRIES_KEY, &vec![entry("cached", "111")]).unwrap();

    let (store, handle) = SyncedEntryStore::load(Arc::clone(&cache), mirror.clone()).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(handle.is_running());
    assert_eq!(ids(&store.current()), vec!["cached"]);

    // A later notification is still applied.
    mirror.write_external(MirrorDocument::with_entries(vec![entry("late", "555")]));
    eventually(|| ids(&store.current()) == vec!["late"]).await;
}

#[tokio::test]
async fn unreachable_remote_leaves_local_usable() {
    let mirror = InMemoryMirror::new();
    mirror.set_fail_fetches(true);
    mirror.set_fail_pushes(true);
    let (store, _cache) = store_with_mirror(&mirror);
    let _handle = store.start_sync().unwrap();

    store.append(entry("a", "111")).unwrap().wait().await;
    assert!(store.refresh_from_remote().await.is_err());
    assert_eq!(ids(&store.current()), vec!["a"]);
}

#[tokio::test]
async fn two_devices_converge() {
    let mirror = InMemoryMirror::new();
    let (phone, _) = store_with_mirror(&mirror);
    let (laptop, _) = store_with_mirror(&mirror);
    let _phone_sync = phone.start_sync().unwrap();
    let _laptop_sync = laptop.start_sync().unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    phone.append(entry("a", "111")).unwrap().wait().await;
    eventually(|| ids(&laptop.current()) == vec!["a"]).await;

    laptop.append(entry("b", "222")).unwrap().wait().await;
    eventually(|| ids(&phone.current()) == vec!["a", "b"]).await;
}

#[tokio::test]
async fn own_echoes_do_not_roll_back_local_state() {
    let mirror = InMemoryMirror::new();
    let (store, _cache) = store_with_mirror(&mirror);
    let _sync = store.start_sync().unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    let mut last = None;
    for n in 0..5 {
        last = Some(store.append(entry(&format!("e{n}"), "808")).unwrap());
    }
    if let Some(push) = last {
        push.wait().await;
    }
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(store.len(), 5);
}

#[tokio::test]
async fn foreign_write_restoring_an_earlier_state_is_applied() {
    let mirror = InMemoryMirror::new();
    let (store, cache) = store_with_mirror(&mirror);
    let _sync = store.start_sync().unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    store.append(entry("a", "111")).unwrap().wait().await;
    store.append(entry("b", "222")).unwrap().wait().await;
    eventually(|| mirror.push_count() == 2).await;

    // Another device deletes "b", leaving the collection we pushed first.
    let remote = vec![store.get(&EntryId::from("a")).unwrap()];
    mirror.write_external(MirrorDocument::with_entries(remote.clone()));

    eventually(|| store.current() == remote).await;
    assert_eq!(cached_entries(&cache), remote);
}

#[tokio::test]
async fn failed_pushes_are_not_mistaken_for_echoes() {
    let mirror = InMemoryMirror::new();
    let (store, _cache) = store_with_mirror(&mirror);
    let _sync = store.start_sync().unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    mirror.set_fail_pushes(true);
    assert_eq!(
        store.append(entry("a", "111")).unwrap().wait().await,
        PushOutcome::Failed
    );
    store.append(entry("b", "222")).unwrap().wait().await;

    let remote = vec![store.get(&EntryId::from("a")).unwrap()];
    mirror.write_external(MirrorDocument::with_entries(remote.clone()));

    eventually(|| store.current() == remote).await;
}

#[tokio::test]
async fn stopping_sync_ignores_later_remote_changes() {
    let mirror = InMemoryMirror::new();
    let (store, _cache) = store_with_mirror(&mirror);
    let handle = store.start_sync().unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    handle.stop();
    tokio::time::sleep(Duration::from_millis(20)).await;

    mirror.write_external(MirrorDocument::with_entries(vec![entry("r", "1")]));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(store.is_empty());
}

#[tokio::test]
async fn change_notifications_report_origin() {
    let (store, _cache) = store_with_mirror(&InMemoryMirror::new());
    let mut changes = store.changes();

    store.append(entry("a", "111")).unwrap();
    changes.changed().await.unwrap();
    assert_eq!(changes.borrow_and_update().origin, ChangeOrigin::Local);

    store.apply_remote(Vec::new()).unwrap();
    changes.changed().await.unwrap();
    let change = *changes.borrow_and_update();
    assert_eq!(change.origin, ChangeOrigin::Remote);
    assert_eq!(change.entries, 0);
}

#[tokio::test]
async fn resolve_prefix_prefers_exact_match() {
    let store = SyncedEntryStore::open(MemoryCache::new(), LocalOnlyMirror).unwrap();
    for id in ["abc", "abcdef", "abd"] {
        store.append(entry(id, "111")).unwrap();
    }

    assert_eq!(ids(&store.resolve_prefix("abc")), vec!["abc"]);
    assert_eq!(ids(&store.resolve_prefix("ab")).len(), 3);
    assert_eq!(ids(&store.resolve_prefix("abcd")), vec!["abcdef"]);
    assert!(store.resolve_prefix("x").is_empty());
}

#[derive(Debug)]
struct KeepLocalAdditions;

impl ConvergencePolicy for KeepLocalAdditions {
    fn name(&self) -> &'static str {
        "keep local additions"
    }

    fn reconcile(&self, local: &[LogEntry], mut incoming: EntryCollection) -> EntryCollection {
        for entry in local {
            if !incoming.iter().any(|remote| remote.id == entry.id) {
                incoming.push(entry.clone());
            }
        }
        incoming
    }
}

#[tokio::test]
async fn convergence_policy_is_replaceable() {
    let store =
        SyncedEntryStore::open_with_policy(MemoryCache::new(), LocalOnlyMirror, KeepLocalAdditions)
            .unwrap();
    store.append(entry("mine", "111")).unwrap();

    store.apply_remote(vec![entry("theirs", "222")]).unwrap();
    assert_eq!(ids(&store.current()), vec!["theirs", "mine"]);
}

#[tokio::test]
async fn timeline_is_newest_first() {
    use chrono::{Duration as ChronoDuration, Utc};

    let store = SyncedEntryStore::open(MemoryCache::new(), LocalOnlyMirror).unwrap();
    let now = Utc::now();
    for (id, age) in [("old", 3), ("newest", 0), ("middle", 1)] {
        let mut log = entry(id, "111");
        log.timestamp = now - ChronoDuration::hours(age);
        store.append(log).unwrap();
    }

    assert_eq!(ids(&store.timeline()), vec!["newest", "middle", "old"]);
    assert_eq!(ids(&store.current()), vec!["old", "newest", "middle"]);
}
