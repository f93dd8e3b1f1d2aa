//! Runtime configuration for the data store and its replica.
//!
//! # Responsibility
//! - Resolve replica path, key namespace and logging settings from defaults
//!   and environment variables.
//!
//! # Invariants
//! - Blank environment values are treated as unset.
//! - `KeyNamespace::Shared` keeps the historical single-replica key layout.

use crate::logging::default_log_level;
use crate::model::user::UserIdentity;
use crate::storage::StoreKeys;
use std::path::PathBuf;

/// Environment variable overriding the replica file path.
pub const DB_PATH_ENV: &str = "STUDYGOAL_DB_PATH";
/// Environment variable overriding the log level.
pub const LOG_LEVEL_ENV: &str = "STUDYGOAL_LOG_LEVEL";
/// Environment variable enabling file logging into a directory.
pub const LOG_DIR_ENV: &str = "STUDYGOAL_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "studygoal.sqlite3";

/// How persisted keys are partitioned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum KeyNamespace {
    /// One replica shared by every account on the device.
    #[default]
    Shared,
    /// Keys prefixed by the signed-in user's uid.
    PerUser(String),
}

impl KeyNamespace {
    pub fn for_user(identity: &UserIdentity) -> Self {
        Self::PerUser(identity.uid.trim().to_string())
    }
}

/// Resolved store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// SQLite replica file.
    pub db_path: PathBuf,
    pub namespace: KeyNamespace,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute directory for rolling log files. `None` disables file logs.
    pub log_dir: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            namespace: KeyNamespace::Shared,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl StoreConfig {
    /// Builds a config from defaults overridden by process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from defaults overridden by `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = read(DB_PATH_ENV) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = read(LOG_LEVEL_ENV) {
            config.log_level = level;
        }
        config.log_dir = read(LOG_DIR_ENV).map(PathBuf::from);
        config
    }

    /// Scopes persisted keys to `identity`.
    pub fn with_user(mut self, identity: &UserIdentity) -> Self {
        self.namespace = KeyNamespace::for_user(identity);
        self
    }

    pub fn keys(&self) -> StoreKeys {
        StoreKeys::new(&self.namespace)
    }
}

#[cfg(test)]
mod tests {
    use super::{KeyNamespace, StoreConfig, DB_PATH_ENV, LOG_DIR_ENV, LOG_LEVEL_ENV};
    use crate::model::user::UserIdentity;
    use std::path::PathBuf;

    #[test]
    fn lookup_overrides_defaults_and_ignores_blank_values() {
        let config = StoreConfig::from_lookup(|name| match name {
            DB_PATH_ENV => Some(" /data/goals.sqlite3 ".to_string()),
            LOG_LEVEL_ENV => Some("   ".to_string()),
            LOG_DIR_ENV => Some("/var/log/studygoal".to_string()),
            _ => None,
        });

        assert_eq!(config.db_path, PathBuf::from("/data/goals.sqlite3"));
        assert_eq!(config.log_level, StoreConfig::default().log_level);
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/studygoal")));
        assert_eq!(config.namespace, KeyNamespace::Shared);
    }

    #[test]
    fn with_user_switches_to_per_user_keys() {
        let identity = UserIdentity::new("abc123", Some("Ada".to_string()));
        let config = StoreConfig::default().with_user(&identity);
        assert_eq!(config.keys().goals, "user/abc123/goals");
    }
}
