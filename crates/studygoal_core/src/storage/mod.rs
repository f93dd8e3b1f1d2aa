//! Asynchronous key-value persistence adapters.
//!
//! # Responsibility
//! - Define the byte-level `KeyValueStore` capability the data store writes
//!   through to.
//! - Provide an in-memory adapter and a SQLite-backed durable adapter.
//!
//! # Invariants
//! - Adapters store opaque bytes; encoding is owned by the data store.
//! - `get` on a key that was never set (or was removed) returns `None`.

use crate::config::KeyNamespace;
use crate::db::DbError;
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory;
pub mod sqlite;

pub use memory::MemoryKeyValueStore;
pub use sqlite::SqliteKeyValueStore;

/// Persisted key holding the goal collection.
pub const GOALS_KEY: &str = "goals";
/// Persisted key holding the subject collection.
pub const SUBJECTS_KEY: &str = "subjects";

pub type KvResult<T> = Result<T, KvError>;

/// Adapter-level failure.
#[derive(Debug)]
pub enum KvError {
    /// SQLite replica failure.
    Db(DbError),
    /// Adapter could not serve the request (worker failure, injected fault).
    Unavailable(String),
}

impl Display for KvError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Unavailable(message) => write!(f, "storage unavailable: {message}"),
        }
    }
}

impl Error for KvError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for KvError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for KvError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable key-value byte storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads the bytes stored under `key`.
    async fn get(&self, key: &str) -> KvResult<Option<Vec<u8>>>;
    /// Replaces the bytes stored under `key`.
    async fn set(&self, key: &str, value: Vec<u8>) -> KvResult<()>;
    /// Removes `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> KvResult<()>;
}

/// Concrete storage keys for one data store instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreKeys {
    pub goals: String,
    pub subjects: String,
}

impl StoreKeys {
    /// Derives keys for a namespace. `Shared` yields the bare `goals` and
    /// `subjects` keys; `PerUser` prefixes them with `user/<uid>/`.
    pub fn new(namespace: &KeyNamespace) -> Self {
        match namespace {
            KeyNamespace::Shared => Self::default(),
            KeyNamespace::PerUser(uid) => Self {
                goals: format!("user/{uid}/{GOALS_KEY}"),
                subjects: format!("user/{uid}/{SUBJECTS_KEY}"),
            },
        }
    }
}

impl Default for StoreKeys {
    fn default() -> Self {
        Self {
            goals: GOALS_KEY.to_string(),
            subjects: SUBJECTS_KEY.to_string(),
        }
    }
}
