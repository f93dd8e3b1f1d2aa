//! Error taxonomy surfaced by the data store.
//!
//! # Invariants
//! - No variant leaves the store unusable; every failure is per-operation.
//! - `Persistence` never implies the in-memory change was rolled back.

use crate::model::id::RecordId;
use crate::repo::{RecordKind, RepoError};
use crate::service::data_store::StoreState;
use crate::storage::KvError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure of one data store operation.
#[derive(Debug)]
pub enum StoreError {
    /// Malformed or empty input, or a dangling subject reference.
    Validation(String),
    /// Subject name collision.
    Duplicate(String),
    /// Operation targets a nonexistent record.
    NotFound { kind: RecordKind, id: RecordId },
    /// Mutation attempted before the initial load completed.
    NotReady {
        operation: &'static str,
        state: StoreState,
    },
    /// Durable read or write failed.
    Persistence(PersistenceError),
}

impl StoreError {
    /// Stable machine-readable code for callers rendering messages.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Duplicate(_) => "duplicate",
            Self::NotFound { .. } => "not_found",
            Self::NotReady { .. } => "not_ready",
            Self::Persistence(_) => "persistence",
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "invalid input: {message}"),
            Self::Duplicate(name) => write!(f, "subject already exists: `{name}`"),
            Self::NotFound { kind, id } => write!(f, "{} not found: {id}", kind.as_str()),
            Self::NotReady { operation, state } => write!(
                f,
                "store is not ready for `{operation}` (state: {})",
                state.as_str()
            ),
            Self::Persistence(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Persistence(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(message) => Self::Validation(message),
            RepoError::DuplicateSubject(name) => Self::Duplicate(name),
            RepoError::NotFound { kind, id } => Self::NotFound { kind, id },
        }
    }
}

impl From<PersistenceError> for StoreError {
    fn from(value: PersistenceError) -> Self {
        Self::Persistence(value)
    }
}

/// Durable storage failure for one key.
#[derive(Debug)]
pub enum PersistenceError {
    Read { key: String, source: KvError },
    Write { key: String, source: KvError },
    /// Stored bytes are not a valid collection.
    Decode {
        key: String,
        source: serde_json::Error,
    },
    Encode {
        key: String,
        source: serde_json::Error,
    },
    /// Collection failed to load; writing it would overwrite stored data.
    Unrestored { key: String },
}

impl PersistenceError {
    pub fn key(&self) -> &str {
        match self {
            Self::Read { key, .. }
            | Self::Write { key, .. }
            | Self::Decode { key, .. }
            | Self::Encode { key, .. }
            | Self::Unrestored { key } => key,
        }
    }
}

impl Display for PersistenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { key, source } => write!(f, "failed to read `{key}`: {source}"),
            Self::Write { key, source } => write!(f, "failed to write `{key}`: {source}"),
            Self::Decode { key, source } => write!(f, "failed to decode `{key}`: {source}"),
            Self::Encode { key, source } => write!(f, "failed to encode `{key}`: {source}"),
            Self::Unrestored { key } => {
                write!(f, "`{key}` was not restored from storage; load again before writing")
            }
        }
    }
}

impl Error for PersistenceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } | Self::Write { source, .. } => Some(source),
            Self::Decode { source, .. } | Self::Encode { source, .. } => Some(source),
            Self::Unrestored { .. } => None,
        }
    }
}
