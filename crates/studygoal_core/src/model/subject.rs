//! Subject domain model.
//!
//! # Invariants
//! - `name` is trimmed and non-empty.
//! - Names are unique across the collection (exact, case-sensitive match).

use crate::model::id::{new_id, RecordId};
use serde::{Deserialize, Serialize};

/// Named category goals are organized under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// Stable identifier assigned at creation.
    pub id: RecordId,
    /// User-facing label, also the key goals refer to.
    pub name: String,
}

impl Subject {
    /// Creates a subject with a generated id.
    ///
    /// Callers are expected to pass an already normalized name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
        }
    }
}

/// Trims a subject name, returning `None` when nothing is left.
pub fn normalize_subject_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
