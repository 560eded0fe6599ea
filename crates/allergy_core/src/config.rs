//! Runtime configuration resolved from the environment.
//!
//! # Responsibility
//! - Resolve database path and logging settings in one place.
//! - Let callers inject an explicit config instead of reading globals.
//!
//! # Invariants
//! - Blank environment values count as unset.
//! - File logging stays off unless a log directory is configured.

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "ALLERGY_SHIELD_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "ALLERGY_SHIELD_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "ALLERGY_SHIELD_LOG_DIR";
pub const DEFAULT_DB_FILE_NAME: &str = "allergies.db";

/// Settings needed to open the store and start logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl AppConfig {
    /// Reads `ALLERGY_SHIELD_*` variables from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let defaults = Self::default();
        Self {
            db_path: read(DB_PATH_ENV).map_or(defaults.db_path, PathBuf::from),
            log_level: read(LOG_LEVEL_ENV).unwrap_or(defaults.log_level),
            log_dir: read(LOG_DIR_ENV).map(PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, DB_PATH_ENV, LOG_DIR_ENV, LOG_LEVEL_ENV};
    use std::collections::HashMap;
    use std::path::PathBuf;

    #[test]
    fn missing_values_fall_back_to_defaults() {
        let config = AppConfig::from_lookup(|_| None);
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.db_path, PathBuf::from("allergies.db"));
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn lookup_values_override_defaults_and_blanks_are_ignored() {
        let env = HashMap::from([
            (DB_PATH_ENV, " /tmp/allergy.db "),
            (LOG_LEVEL_ENV, "warn"),
            (LOG_DIR_ENV, "   "),
        ]);
        let config = AppConfig::from_lookup(|key| env.get(key).map(|value| value.to_string()));

        assert_eq!(config.db_path, PathBuf::from("/tmp/allergy.db"));
        assert_eq!(config.log_level, "warn");
        assert!(config.log_dir.is_none());
    }
}
