//! In-memory repositories over the subject and goal collections.
//!
//! # Responsibility
//! - Enforce record-level invariants (trimmed non-empty text, unique subject
//!   names, goal subjects resolving to a live subject at write time).
//! - Keep insertion order, which is the display order.
//!
//! # Invariants
//! - A failed operation leaves its collection unchanged.
//! - Repositories never touch persistence; the data store owns write-through.

use crate::model::id::RecordId;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod goal_repo;
pub mod subject_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Record family an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Subject,
    Goal,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Subject => "subject",
            Self::Goal => "goal",
        }
    }
}

/// Repository error for in-memory collection operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoError {
    /// Malformed input or a dangling subject reference.
    Validation(String),
    /// A subject with this exact name already exists.
    DuplicateSubject(String),
    /// No record with this id exists.
    NotFound { kind: RecordKind, id: RecordId },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "{message}"),
            Self::DuplicateSubject(name) => write!(f, "subject already exists: `{name}`"),
            Self::NotFound { kind, id } => write!(f, "{} not found: {id}", kind.as_str()),
        }
    }
}

impl Error for RepoError {}
