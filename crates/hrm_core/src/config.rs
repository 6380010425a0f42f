//! Core runtime configuration.
//!
//! # Responsibility
//! - Load the JSON config file consumed by binaries embedding the core.
//! - Reject settings the store or logger would fail on later.
//!
//! # Invariants
//! - A loaded config has passed [`CoreConfig::validate`].
//! - Unknown keys are errors.

use crate::logging::default_log_level;
use crate::repo::document_store::DEFAULT_WRITE_ATTEMPTS;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "warning", "error"];

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(serde_json::Error),
    Invalid { field: &'static str, reason: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "malformed config: {err}"),
            Self::Invalid { field, reason } => write!(f, "invalid config `{field}`: {reason}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid { .. } => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Settings for opening the store and starting logging.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    /// SQLite file path. `:memory:` opens a throwaway database.
    pub database_path: PathBuf,
    pub log_level: String,
    /// Absolute log directory. `None` logs to stderr.
    pub log_dir: Option<PathBuf>,
    /// Compare-and-set attempts per document write.
    pub write_attempts: u32,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("hrm.sqlite3"),
            log_level: default_log_level().to_string(),
            log_dir: None,
            write_attempts: DEFAULT_WRITE_ATTEMPTS,
        }
    }
}

impl CoreConfig {
    /// Reads and validates a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_path.as_os_str().is_empty() {
            return Err(invalid("database_path", "must not be empty"));
        }
        let level = self.log_level.trim().to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(invalid(
                "log_level",
                format!("unsupported level `{}`", self.log_level),
            ));
        }
        if let Some(dir) = &self.log_dir {
            if !dir.is_absolute() {
                return Err(invalid(
                    "log_dir",
                    format!("`{}` is not absolute", dir.display()),
                ));
            }
        }
        if self.write_attempts == 0 {
            return Err(invalid("write_attempts", "must be at least 1"));
        }
        Ok(())
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == ":memory:"
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig};
    use crate::repo::document_store::DEFAULT_WRITE_ATTEMPTS;
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config = CoreConfig::from_json_str(r#"{"database_path": "/tmp/hr.db"}"#)
            .expect("valid config");
        assert_eq!(config.database_path, PathBuf::from("/tmp/hr.db"));
        assert_eq!(config.write_attempts, DEFAULT_WRITE_ATTEMPTS);
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = CoreConfig::from_json_str(r#"{"database": "x"}"#).expect_err("unknown key");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn zero_write_attempts_is_invalid() {
        let err = CoreConfig::from_json_str(r#"{"write_attempts": 0}"#).expect_err("zero");
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "write_attempts",
                ..
            }
        ));
    }

    #[test]
    fn relative_log_dir_is_invalid() {
        let err = CoreConfig::from_json_str(r#"{"log_dir": "logs"}"#).expect_err("relative");
        assert!(matches!(err, ConfigError::Invalid { field: "log_dir", .. }));
    }

    #[test]
    fn load_reads_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"{{"database_path": ":memory:", "log_level": "WARN", "write_attempts": 5}}"#
        )
        .expect("write config");
        let config = CoreConfig::load(file.path()).expect("load");
        assert!(config.is_in_memory());
        assert_eq!(config.write_attempts, 5);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = CoreConfig::load(std::path::Path::new("/nonexistent/hrm.json"))
            .expect_err("missing file");
        assert!(err.to_string().contains("/nonexistent/hrm.json"));
    }
}
