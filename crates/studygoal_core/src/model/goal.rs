//! Goal domain model.
//!
//! # Responsibility
//! - Define the trackable study task record and its input shapes.
//!
//! # Invariants
//! - `title` is trimmed and non-empty.
//! - `subject` is a weak reference: a subject name resolved at read time.
//! - `date` is stamped once at creation and never rewritten.

use crate::model::id::{new_id, RecordId};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Trackable study task associated with a subject by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    /// Stable identifier assigned at creation.
    pub id: RecordId,
    pub title: String,
    /// Name of the subject this goal belongs to.
    pub subject: String,
    /// Free-form notes. Empty when none were given.
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    /// Creation timestamp, RFC 3339 in UTC.
    pub date: String,
}

impl Goal {
    /// Creates an open goal stamped with the current time.
    pub fn new(
        title: impl Into<String>,
        subject: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self::with_date(title, subject, description, Utc::now())
    }

    /// Creates an open goal with a caller-provided creation time.
    pub fn with_date(
        title: impl Into<String>,
        subject: impl Into<String>,
        description: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            subject: subject.into(),
            description: description.into(),
            completed: false,
            date: created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// Parses the stored creation timestamp.
    ///
    /// Returns `None` when the persisted value is not valid RFC 3339.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.date)
            .ok()
            .map(|value| value.with_timezone(&Utc))
    }
}

/// Input for creating a goal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewGoal {
    pub title: String,
    /// Must name an existing subject.
    pub subject: String,
    pub description: Option<String>,
}

impl NewGoal {
    pub fn new(title: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subject: subject.into(),
            description: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Partial update for an existing goal. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoalPatch {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub description: Option<String>,
}

impl GoalPatch {
    /// Returns whether this patch carries no field at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.subject.is_none() && self.description.is_none()
    }
}
