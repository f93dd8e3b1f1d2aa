//! SQLite-backed key-value adapter.
//!
//! # Responsibility
//! - Persist opaque values in the `kv_entries` table of a local replica.
//! - Keep blocking SQLite calls off the async executor.
//!
//! # Invariants
//! - All statements run on the blocking pool via `spawn_blocking`.
//! - One connection is shared behind a mutex; statements never interleave.

use crate::db::{open_db, open_db_in_memory};
use crate::storage::{KeyValueStore, KvError, KvResult};
use async_trait::async_trait;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Durable key-value store over one SQLite connection.
#[derive(Clone)]
pub struct SqliteKeyValueStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteKeyValueStore {
    /// Opens (or creates) a replica file.
    pub fn open(path: impl AsRef<Path>) -> KvResult<Self> {
        Ok(Self::from_connection(open_db(path)?))
    }

    /// Opens a throwaway in-memory replica.
    pub fn open_in_memory() -> KvResult<Self> {
        Ok(Self::from_connection(open_db_in_memory()?))
    }

    /// Wraps an already migrated connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Lists stored keys in ascending order.
    pub async fn keys(&self) -> KvResult<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT key FROM kv_entries ORDER BY key ASC;")?;
            let mut rows = stmt.query([])?;
            let mut keys: Vec<String> = Vec::new();
            while let Some(row) = rows.next()? {
                keys.push(row.get("key")?);
            }
            Ok(keys)
        })
        .await
    }

    async fn with_conn<T, F>(&self, f: F) -> KvResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> KvResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| KvError::Unavailable("replica connection lock poisoned".to_string()))?;
            f(&guard)
        })
        .await
        .map_err(|err| KvError::Unavailable(format!("replica worker failed: {err}")))?
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> KvResult<Option<Vec<u8>>> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            let value = conn
                .query_row(
                    "SELECT value FROM kv_entries WHERE key = ?1;",
                    [key.as_str()],
                    |row| row.get::<_, Vec<u8>>(0),
                )
                .optional()?;
            Ok(value)
        })
        .await
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> KvResult<()> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO kv_entries (key, value, updated_at)
                 VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at;",
                params![key.as_str(), value],
            )?;
            debug!("event=kv_set module=storage status=ok key={} bytes={}", key, value.len());
            Ok(())
        })
        .await
    }

    async fn remove(&self, key: &str) -> KvResult<()> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            conn.execute("DELETE FROM kv_entries WHERE key = ?1;", [key.as_str()])?;
            Ok(())
        })
        .await
    }
}
