//! Environment-driven runtime configuration.
//!
//! # Responsibility
//! - Read `TASKBOARD_*` variables into a typed config.
//! - Bootstrap logging from config when a log directory is set.
//!
//! # Invariants
//! - Every field has a default except `log_dir`; logging stays off without it.

use crate::logging::{default_log_level, init_logging, LoggingError};
use serde::Deserialize;
use std::path::PathBuf;

const ENV_PREFIX: &str = "TASKBOARD_";
const DEFAULT_DATABASE_PATH: &str = "taskboard.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CoreConfig {
    /// `TASKBOARD_DATABASE_PATH`
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
    /// `TASKBOARD_LOG_LEVEL`
    #[serde(default = "default_level")]
    pub log_level: String,
    /// `TASKBOARD_LOG_DIR`; absolute path.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            log_level: default_level(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::prefixed(ENV_PREFIX).from_env()
    }

    /// Reads an explicit variable set; keys carry the `TASKBOARD_` prefix.
    pub fn from_vars<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::prefixed(ENV_PREFIX).from_iter(vars)
    }

    /// Starts file logging when `log_dir` is set. Returns whether it did.
    pub fn init_logging(&self) -> Result<bool, LoggingError> {
        match self.log_dir.as_deref() {
            Some(dir) => {
                init_logging(&self.log_level, dir)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

fn default_database_path() -> PathBuf {
    PathBuf::from(DEFAULT_DATABASE_PATH)
}

fn default_level() -> String {
    default_log_level().to_string()
}

#[cfg(test)]
mod tests {
    use super::CoreConfig;
    use std::path::PathBuf;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = CoreConfig::from_vars(Vec::new()).unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.database_path, PathBuf::from("taskboard.sqlite3"));
    }

    #[test]
    fn prefixed_variables_override_defaults() {
        let config = CoreConfig::from_vars(vars(&[
            ("TASKBOARD_DATABASE_PATH", "/tmp/board.db"),
            ("TASKBOARD_LOG_LEVEL", "warn"),
            ("TASKBOARD_LOG_DIR", "/tmp/taskboard-logs"),
            ("DATABASE_PATH", "/ignored.db"),
        ]))
        .unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/board.db"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, Some(PathBuf::from("/tmp/taskboard-logs")));
    }

    #[test]
    fn logging_stays_off_without_directory() {
        assert!(!CoreConfig::default().init_logging().unwrap());
    }
}
