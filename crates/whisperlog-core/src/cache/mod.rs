//! Local durable key/value cache
//!
//! The cache is the local source of truth. It stores whole JSON documents
//! under a handful of fixed keys and is always written synchronously.

mod migrations;
mod sqlite;

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;

pub use sqlite::SqliteCache;

/// Key holding the serialized entry collection.
pub const ENTRIES_KEY: &str = "logEntries";
/// Key holding the preferred interpretation language.
pub const LANGUAGE_KEY: &str = "whisperlog_language";
/// Key holding the most recent daily affirmation.
pub const AFFIRMATION_KEY: &str = "dailyAffirmation";

/// String key/value storage with synchronous writes.
pub trait LocalCache: Send + Sync {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete the value under `key`. Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

impl<C: LocalCache + ?Sized> LocalCache for std::sync::Arc<C> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// In-process cache backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryCache {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalCache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.remove(key);
        Ok(())
    }
}

/// Read a JSON value, falling back to `T::default()` when the key is
/// missing or the stored text does not parse.
pub fn read_json<T, C>(cache: &C, key: &str) -> Result<T>
where
    T: DeserializeOwned + Default,
    C: LocalCache + ?Sized,
{
    let Some(raw) = cache.get(key)? else {
        return Ok(T::default());
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(value),
        Err(error) => {
            tracing::warn!("Ignoring unreadable cached value for {key}: {error}");
            Ok(T::default())
        }
    }
}

/// Serialize `value` as JSON and store it under `key`.
pub fn write_json<T, C>(cache: &C, key: &str, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
    C: LocalCache + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    cache.set(key, &raw)?;
    tracing::debug!("Cached {} bytes under {key}", raw.len());
    Ok(())
}

/// Cache that rejects every write. Reads see whatever it was seeded with.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ReadOnlyCache {
    inner: MemoryCache,
}

#[cfg(test)]
impl ReadOnlyCache {
    pub fn seeded(key: &str, value: &str) -> Self {
        let inner = MemoryCache::new();
        inner.set(key, value).unwrap();
        Self { inner }
    }
}

#[cfg(test)]
impl LocalCache for ReadOnlyCache {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, _value: &str) -> Result<()> {
        Err(crate::Error::Cache(format!("refusing to write {key}")))
    }

    fn remove(&self, key: &str) -> Result<()> {
        Err(crate::Error::Cache(format!("refusing to remove {key}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn memory_cache_round_trips_values() {
        let cache = MemoryCache::new();
        assert_eq!(cache.get("k").unwrap(), None);

        cache.set("k", "v1").unwrap();
        cache.set("k", "v2").unwrap();
        assert_eq!(cache.get("k").unwrap().as_deref(), Some("v2"));

        cache.remove("k").unwrap();
        cache.remove("k").unwrap();
        assert_eq!(cache.get("k").unwrap(), None);
    }

    #[test]
    fn read_json_defaults_when_missing() {
        let cache = MemoryCache::new();
        let values: Vec<u32> = read_json(&cache, "numbers").unwrap();
        assert!(values.is_empty());
    }

    #[test]
    fn read_json_defaults_when_unparseable() {
        let cache = MemoryCache::new();
        cache.set("numbers", "{not json").unwrap();
        let values: Vec<u32> = read_json(&cache, "numbers").unwrap();
        assert!(values.is_empty());
    }

    #[test]
    fn write_json_then_read_json() {
        let cache = MemoryCache::new();
        write_json(&cache, "numbers", &vec![1_u32, 2, 3]).unwrap();
        let values: Vec<u32> = read_json(&cache, "numbers").unwrap();
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[test]
    fn read_only_cache_rejects_writes() {
        let cache = ReadOnlyCache::seeded("k", "\"v\"");
        assert!(write_json(&cache, "k", "other").is_err());
        let value: String = read_json(&cache, "k").unwrap();
        assert_eq!(value, "v");
    }
}
