//! Core data store for StudyGoal.
//! This crate is the single source of truth for subject/goal invariants.

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod storage;

pub use config::{KeyNamespace, StoreConfig};
pub use error::{PersistenceError, StoreError, StoreResult};
pub use logging::{default_log_level, init_logging, LoggingError};
pub use model::goal::{Goal, GoalPatch, NewGoal};
pub use model::id::{new_id, RecordId};
pub use model::subject::Subject;
pub use model::user::UserIdentity;
pub use repo::goal_repo::GoalRepository;
pub use repo::subject_repo::SubjectRepository;
pub use repo::{RecordKind, RepoError, RepoResult};
pub use service::data_store::{DataStore, LoadReport, StoreSnapshot, StoreState};
pub use storage::{
    KeyValueStore, KvError, KvResult, MemoryKeyValueStore, SqliteKeyValueStore, StoreKeys,
};
