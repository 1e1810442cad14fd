//! SQLite-backed cache

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rusqlite::{params, Connection, OptionalExtension};

use super::{migrations, LocalCache};
use crate::error::Result;

/// Durable cache stored in a single `SQLite` file.
pub struct SqliteCache {
    conn: Mutex<Connection>,
}

impl SqliteCache {
    /// Open the cache at `path`, creating the file and parent directories
    /// if they don't exist.
    ///
    /// Runs migrations automatically.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        let cache = Self::from_connection(conn)?;
        tracing::debug!("Opened local cache at {}", path.display());
        Ok(cache)
    }

    /// Open an in-memory cache (useful for testing)
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        configure(&conn)?;
        migrations::run(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Configure `SQLite` pragmas
fn configure(conn: &Connection) -> Result<()> {
    // In-memory databases report "memory" instead of switching to WAL.
    let _mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
    conn.execute_batch("PRAGMA synchronous = NORMAL;")?;
    Ok(())
}

impl LocalCache for SqliteCache {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn()
            .query_row(
                "SELECT value FROM kv_cache WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let now = chrono::Utc::now().timestamp_millis();
        self.conn().execute(
            "INSERT INTO kv_cache (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, now],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.conn()
            .execute("DELETE FROM kv_cache WHERE key = ?1", params![key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn in_memory_cache_round_trips_values() {
        let cache = SqliteCache::open_in_memory().unwrap();
        assert_eq!(cache.get("logEntries").unwrap(), None);

        cache.set("logEntries", "[]").unwrap();
        assert_eq!(cache.get("logEntries").unwrap().as_deref(), Some("[]"));

        cache.set("logEntries", "[1]").unwrap();
        assert_eq!(cache.get("logEntries").unwrap().as_deref(), Some("[1]"));

        cache.remove("logEntries").unwrap();
        assert_eq!(cache.get("logEntries").unwrap(), None);
    }

    #[test]
    fn values_survive_reopening() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("nested").join("whisperlog.db");

        {
            let cache = SqliteCache::open(&path).unwrap();
            cache.set("whisperlog_language", "\"Hindi\"").unwrap();
        }

        let reopened = SqliteCache::open(&path).unwrap();
        assert_eq!(
            reopened.get("whisperlog_language").unwrap().as_deref(),
            Some("\"Hindi\"")
        );
    }
}
