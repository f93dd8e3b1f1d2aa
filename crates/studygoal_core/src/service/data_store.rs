//! Data store orchestration.
//!
//! # Responsibility
//! - Own the subject and goal repositories for the whole process.
//! - Load both collections from the key-value adapter before any mutation.
//! - Write every successful mutation through to the adapter and publish the
//!   new state to subscribers.
//!
//! # Invariants
//! - Mutations outside `StoreState::Ready` fail with `NotReady`; an empty
//!   pre-load cache is never written over durable data.
//! - Each collection mutex is held across mutate-then-persist, so writes to
//!   one key are serialized in arrival order.
//! - Lock order is `goals` before `subjects`; subject operations take only
//!   `subjects`.
//! - A collection whose stored value could not be read or decoded is never
//!   written until a later `load` restores it.
//! - A failed write keeps the in-memory change and reports `Persistence`.

use crate::error::{PersistenceError, StoreError, StoreResult};
use crate::model::goal::{Goal, GoalPatch, NewGoal};
use crate::model::subject::Subject;
use crate::repo::goal_repo::GoalRepository;
use crate::repo::subject_repo::SubjectRepository;
use crate::repo::RepoError;
use crate::storage::{KeyValueStore, StoreKeys};
use log::{error, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{watch, Mutex};

/// Lifecycle phase of a data store instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    /// Constructed, `load` not called yet.
    Uninitialized,
    /// Initial reads in flight.
    Loading,
    /// Collections populated; all operations available.
    Ready,
}

impl StoreState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Loading => "loading",
            Self::Ready => "ready",
        }
    }
}

/// Read-only view published to subscribers after every change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSnapshot {
    pub state: StoreState,
    /// Subjects in display order.
    pub subjects: Vec<Subject>,
    /// Goals in display order.
    pub goals: Vec<Goal>,
}

impl StoreSnapshot {
    fn empty() -> Self {
        Self {
            state: StoreState::Uninitialized,
            subjects: Vec::new(),
            goals: Vec::new(),
        }
    }

    /// Distinguishes "still loading" from "loaded, nothing stored yet".
    pub fn is_ready(&self) -> bool {
        self.state == StoreState::Ready
    }

    /// Resolves a goal's weak subject reference by name.
    pub fn resolve_subject(&self, goal: &Goal) -> Option<&Subject> {
        self.subjects
            .iter()
            .find(|subject| subject.name == goal.subject)
    }
}

/// Record counts restored by `DataStore::load`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub subjects: usize,
    pub goals: usize,
}

/// Process-wide owner of subjects and goals, synchronized with durable storage.
///
/// Construct once at startup, call [`DataStore::load`], then share the
/// instance (typically as `Arc<DataStore>`) with every caller.
pub struct DataStore {
    kv: Arc<dyn KeyValueStore>,
    keys: StoreKeys,
    goals: Mutex<GoalRepository>,
    subjects: Mutex<SubjectRepository>,
    snapshots: watch::Sender<StoreSnapshot>,
    goals_unrestored: AtomicBool,
    subjects_unrestored: AtomicBool,
}

impl DataStore {
    /// Creates a store over `kv` using the shared `goals`/`subjects` keys.
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self::with_keys(kv, StoreKeys::default())
    }

    /// Creates a store over `kv` using explicit storage keys.
    pub fn with_keys(kv: Arc<dyn KeyValueStore>, keys: StoreKeys) -> Self {
        let (snapshots, _) = watch::channel(StoreSnapshot::empty());
        Self {
            kv,
            keys,
            goals: Mutex::new(GoalRepository::new()),
            subjects: Mutex::new(SubjectRepository::new()),
            snapshots,
            goals_unrestored: AtomicBool::new(false),
            subjects_unrestored: AtomicBool::new(false),
        }
    }

    pub fn keys(&self) -> &StoreKeys {
        &self.keys
    }

    /// Reads both collections from storage and enters `Ready`.
    ///
    /// A key that is absent loads as an empty collection. A key that cannot be
    /// read or decoded is marked unrestored: the store still becomes `Ready`,
    /// mutations of that collection fail until a later `load` restores it, and
    /// the first such failure is returned. Calling `load` again once `Ready`
    /// re-reads only unrestored keys.
    ///
    /// # Errors
    /// - `NotReady` when another load is in flight.
    /// - `Persistence` when a collection could not be restored.
    pub async fn load(&self) -> StoreResult<LoadReport> {
        let mut first_load = false;
        let claimed = self.snapshots.send_if_modified(|snapshot| {
            let retry = snapshot.state == StoreState::Ready && self.has_unrestored();
            if snapshot.state == StoreState::Uninitialized || retry {
                first_load = snapshot.state == StoreState::Uninitialized;
                snapshot.state = StoreState::Loading;
                true
            } else {
                false
            }
        });
        if !claimed {
            let current = self.snapshot();
            return match current.state {
                StoreState::Ready => Ok(LoadReport {
                    subjects: current.subjects.len(),
                    goals: current.goals.len(),
                }),
                state => Err(StoreError::NotReady {
                    operation: "load",
                    state,
                }),
            };
        }

        let started_at = Instant::now();
        info!(
            "event=store_load module=store status=start mode={}",
            if first_load { "initial" } else { "retry" }
        );

        let mut goals = self.goals.lock().await;
        let mut subjects = self.subjects.lock().await;
        let mut failure: Option<PersistenceError> = None;

        if first_load || self.subjects_unrestored.load(Ordering::SeqCst) {
            match self.read_collection::<Subject>(&self.keys.subjects).await {
                Ok(records) => {
                    *subjects = SubjectRepository::from_records(records);
                    self.subjects_unrestored.store(false, Ordering::SeqCst);
                }
                Err(err) => {
                    log_load_failure(&err);
                    self.subjects_unrestored.store(true, Ordering::SeqCst);
                    failure.get_or_insert(err);
                }
            }
        }
        if first_load || self.goals_unrestored.load(Ordering::SeqCst) {
            match self.read_collection::<Goal>(&self.keys.goals).await {
                Ok(records) => {
                    *goals = GoalRepository::from_records(records);
                    self.goals_unrestored.store(false, Ordering::SeqCst);
                }
                Err(err) => {
                    log_load_failure(&err);
                    self.goals_unrestored.store(true, Ordering::SeqCst);
                    failure.get_or_insert(err);
                }
            }
        }

        let report = LoadReport {
            subjects: subjects.len(),
            goals: goals.len(),
        };
        self.snapshots.send_replace(StoreSnapshot {
            state: StoreState::Ready,
            subjects: subjects.list_subjects(),
            goals: goals.list_goals(),
        });

        info!(
            "event=store_load module=store status={} subjects={} goals={} duration_ms={}",
            if failure.is_some() { "degraded" } else { "ok" },
            report.subjects,
            report.goals,
            started_at.elapsed().as_millis()
        );

        match failure {
            Some(err) => Err(err.into()),
            None => Ok(report),
        }
    }

    /// Returns whether some collection failed to load and is write-locked.
    pub fn has_unrestored(&self) -> bool {
        self.subjects_unrestored.load(Ordering::SeqCst)
            || self.goals_unrestored.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> StoreState {
        self.snapshots.borrow().state
    }

    pub fn is_ready(&self) -> bool {
        self.state() == StoreState::Ready
    }

    /// Returns the latest published snapshot.
    pub fn snapshot(&self) -> StoreSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Subscribes to snapshots published after load and every mutation.
    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.snapshots.subscribe()
    }

    /// Current subjects in display order.
    pub fn subjects(&self) -> Vec<Subject> {
        self.snapshots.borrow().subjects.clone()
    }

    /// Current goals in display order.
    pub fn goals(&self) -> Vec<Goal> {
        self.snapshots.borrow().goals.clone()
    }

    /// Resolves the goal's subject name against live subjects.
    pub fn resolve_subject(&self, goal: &Goal) -> Option<Subject> {
        self.snapshots.borrow().resolve_subject(goal).cloned()
    }

    /// Goals whose subject name no longer matches any subject.
    pub fn orphaned_goals(&self) -> Vec<Goal> {
        let snapshot = self.snapshots.borrow();
        snapshot
            .goals
            .iter()
            .filter(|goal| snapshot.resolve_subject(goal).is_none())
            .cloned()
            .collect()
    }

    /// Goals referring to `name`, in display order.
    pub fn goals_for_subject(&self, name: &str) -> Vec<Goal> {
        self.snapshots
            .borrow()
            .goals
            .iter()
            .filter(|goal| goal.subject == name)
            .cloned()
            .collect()
    }

    pub async fn add_subject(&self, name: &str) -> StoreResult<Subject> {
        const OP: &str = "add_subject";
        self.ensure_ready(OP)?;
        let mut subjects = self.subjects.lock().await;
        self.ensure_restored(OP, &self.keys.subjects, &self.subjects_unrestored)?;
        let subject = subjects
            .add_subject(name)
            .map_err(|err| rejected(OP, err))?;
        self.commit_subjects(OP, &subjects).await?;
        Ok(subject)
    }

    /// Deletes a subject. Goals naming it are left as they are.
    pub async fn delete_subject(&self, id: &str) -> StoreResult<()> {
        const OP: &str = "delete_subject";
        self.ensure_ready(OP)?;
        let mut subjects = self.subjects.lock().await;
        self.ensure_restored(OP, &self.keys.subjects, &self.subjects_unrestored)?;
        subjects.delete_subject(id).map_err(|err| rejected(OP, err))?;
        self.commit_subjects(OP, &subjects).await
    }

    pub async fn add_goal(&self, input: NewGoal) -> StoreResult<Goal> {
        const OP: &str = "add_goal";
        self.ensure_ready(OP)?;
        let mut goals = self.goals.lock().await;
        self.ensure_restored(OP, &self.keys.goals, &self.goals_unrestored)?;
        let goal = {
            let subjects = self.subjects.lock().await;
            goals
                .add_goal(input, &subjects)
                .map_err(|err| rejected(OP, err))?
        };
        self.commit_goals(OP, &goals).await?;
        Ok(goal)
    }

    pub async fn toggle_goal_completion(&self, id: &str) -> StoreResult<Goal> {
        const OP: &str = "toggle_goal_completion";
        self.ensure_ready(OP)?;
        let mut goals = self.goals.lock().await;
        self.ensure_restored(OP, &self.keys.goals, &self.goals_unrestored)?;
        let goal = goals
            .toggle_goal_completion(id)
            .map_err(|err| rejected(OP, err))?;
        self.commit_goals(OP, &goals).await?;
        Ok(goal)
    }

    pub async fn update_goal(&self, id: &str, patch: GoalPatch) -> StoreResult<Goal> {
        const OP: &str = "update_goal";
        self.ensure_ready(OP)?;
        let mut goals = self.goals.lock().await;
        self.ensure_restored(OP, &self.keys.goals, &self.goals_unrestored)?;
        let goal = {
            let subjects = self.subjects.lock().await;
            goals
                .update_goal(id, patch, &subjects)
                .map_err(|err| rejected(OP, err))?
        };
        self.commit_goals(OP, &goals).await?;
        Ok(goal)
    }

    pub async fn delete_goal(&self, id: &str) -> StoreResult<()> {
        const OP: &str = "delete_goal";
        self.ensure_ready(OP)?;
        let mut goals = self.goals.lock().await;
        self.ensure_restored(OP, &self.keys.goals, &self.goals_unrestored)?;
        goals.delete_goal(id).map_err(|err| rejected(OP, err))?;
        self.commit_goals(OP, &goals).await
    }

    fn ensure_ready(&self, operation: &'static str) -> StoreResult<()> {
        let state = self.state();
        if state == StoreState::Ready {
            return Ok(());
        }
        warn!(
            "event=store_mutation module=store status=rejected op={} error_code=not_ready state={}",
            operation,
            state.as_str()
        );
        Err(StoreError::NotReady { operation, state })
    }

    fn ensure_restored(
        &self,
        operation: &'static str,
        key: &str,
        unrestored: &AtomicBool,
    ) -> StoreResult<()> {
        if !unrestored.load(Ordering::SeqCst) {
            return Ok(());
        }
        warn!(
            "event=store_mutation module=store status=rejected op={} error_code=unrestored key={}",
            operation, key
        );
        Err(PersistenceError::Unrestored {
            key: key.to_string(),
        }
        .into())
    }

    async fn commit_subjects(
        &self,
        operation: &'static str,
        subjects: &SubjectRepository,
    ) -> StoreResult<()> {
        let written = self
            .write_collection(operation, &self.keys.subjects, subjects.records())
            .await;
        let published = subjects.list_subjects();
        self.snapshots.send_modify(|snapshot| snapshot.subjects = published);
        written.map_err(StoreError::from)
    }

    async fn commit_goals(
        &self,
        operation: &'static str,
        goals: &GoalRepository,
    ) -> StoreResult<()> {
        let written = self
            .write_collection(operation, &self.keys.goals, goals.records())
            .await;
        let published = goals.list_goals();
        self.snapshots.send_modify(|snapshot| snapshot.goals = published);
        written.map_err(StoreError::from)
    }

    async fn read_collection<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Vec<T>, PersistenceError> {
        let bytes = self
            .kv
            .get(key)
            .await
            .map_err(|source| PersistenceError::Read {
                key: key.to_string(),
                source,
            })?;
        let Some(bytes) = bytes else {
            return Ok(Vec::new());
        };

        // A stored `null` is treated like an absent key.
        let records: Option<Vec<T>> =
            serde_json::from_slice(&bytes).map_err(|source| PersistenceError::Decode {
                key: key.to_string(),
                source,
            })?;
        Ok(records.unwrap_or_default())
    }

    async fn write_collection<T: Serialize>(
        &self,
        operation: &'static str,
        key: &str,
        records: &[T],
    ) -> Result<(), PersistenceError> {
        let started_at = Instant::now();
        let bytes = serde_json::to_vec(records).map_err(|source| PersistenceError::Encode {
            key: key.to_string(),
            source,
        })?;
        let size = bytes.len();

        match self.kv.set(key, bytes).await {
            Ok(()) => {
                info!(
                    "event=store_write module=store status=ok op={} key={} records={} bytes={} duration_ms={}",
                    operation,
                    key,
                    records.len(),
                    size,
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(source) => {
                error!(
                    "event=store_write module=store status=error op={} key={} duration_ms={} error_code=write_failed error={}",
                    operation,
                    key,
                    started_at.elapsed().as_millis(),
                    source
                );
                Err(PersistenceError::Write {
                    key: key.to_string(),
                    source,
                })
            }
        }
    }
}

fn log_load_failure(err: &PersistenceError) {
    error!(
        "event=store_load module=store status=error key={} error={}",
        err.key(),
        err
    );
}

fn rejected(operation: &'static str, err: RepoError) -> StoreError {
    let err = StoreError::from(err);
    warn!(
        "event=store_mutation module=store status=rejected op={} error_code={}",
        operation,
        err.code()
    );
    err
}
