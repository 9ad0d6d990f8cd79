//! Core runtime configuration.
//!
//! # Responsibility
//! - Resolve storage location, key prefix and logging settings.
//! - Read overrides from `STUDYKIT_*` environment variables.
//!
//! # Invariants
//! - Blank environment values are ignored and fall back to defaults.

use crate::logging::default_log_level;
use crate::store::keys::DEFAULT_KEY_PREFIX;
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "STUDYKIT_DB_PATH";
pub const KEY_PREFIX_ENV: &str = "STUDYKIT_KEY_PREFIX";
pub const LOG_LEVEL_ENV: &str = "STUDYKIT_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "STUDYKIT_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "studykit_store.sqlite3";
const DEFAULT_LOG_DIR_NAME: &str = "studykit-logs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// SQLite file backing the key-value store.
    pub db_path: PathBuf,
    pub key_prefix: String,
    pub log_level: String,
    /// Absolute directory for rolling log files.
    pub log_dir: PathBuf,
}

impl Default for CoreConfig {
    fn default() -> Self {
        let temp_dir = std::env::temp_dir();
        Self {
            db_path: temp_dir.join(DEFAULT_DB_FILE_NAME),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            log_level: default_log_level().to_string(),
            log_dir: temp_dir.join(DEFAULT_LOG_DIR_NAME),
        }
    }
}

impl CoreConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden by `lookup`, which maps variable names to values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = non_blank(DB_PATH_ENV) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(prefix) = non_blank(KEY_PREFIX_ENV) {
            config.key_prefix = prefix;
        }
        if let Some(level) = non_blank(LOG_LEVEL_ENV) {
            config.log_level = level;
        }
        if let Some(dir) = non_blank(LOG_DIR_ENV) {
            config.log_dir = PathBuf::from(dir);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::{CoreConfig, DB_PATH_ENV, KEY_PREFIX_ENV, LOG_LEVEL_ENV};
    use std::collections::HashMap;
    use std::path::PathBuf;

    #[test]
    fn lookup_overrides_defaults() {
        let vars = HashMap::from([
            (DB_PATH_ENV, "/data/study.sqlite3"),
            (KEY_PREFIX_ENV, "campus:"),
            (LOG_LEVEL_ENV, "warn"),
        ]);
        let config = CoreConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.db_path, PathBuf::from("/data/study.sqlite3"));
        assert_eq!(config.key_prefix, "campus:");
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, CoreConfig::default().log_dir);
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = CoreConfig::from_lookup(|_| Some("   ".to_string()));
        assert_eq!(config, CoreConfig::default());
    }
}
