//! Store configuration
//!
//! Loaded from an optional JSON file. Every field has a default, so `{}`
//! is a valid configuration:
//!
//! ```json
//! {
//!   "data_dir": "database",
//!   "file_name": "database.json",
//!   "fsync": true,
//!   "log_level": "warn"
//! }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::Severity;

/// Default directory holding the backing file
pub const DEFAULT_DATA_DIR: &str = "database";

/// Default backing file name
pub const DEFAULT_FILE_NAME: &str = "database.json";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config JSON in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration for a document store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory containing the backing file (created if missing)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Backing file name inside `data_dir`
    #[serde(default = "default_file_name")]
    pub file_name: String,

    /// fsync the file and directory after every rewrite
    #[serde(default = "default_fsync")]
    pub fsync: bool,

    /// Minimum log severity: trace, info, warn, error or fatal
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}
fn default_file_name() -> String {
    DEFAULT_FILE_NAME.to_string()
}
fn default_fsync() -> bool {
    true
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            file_name: default_file_name(),
            fsync: default_fsync(),
            log_level: default_log_level(),
        }
    }
}

impl StoreConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: StoreConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                source: e,
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate field values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.file_name.trim().is_empty() {
            return Err(ConfigError::Invalid("file_name must not be empty".into()));
        }

        if self.file_name.contains('/') || self.file_name.contains('\\') {
            return Err(ConfigError::Invalid(format!(
                "file_name '{}' must not contain path separators; use data_dir",
                self.file_name
            )));
        }

        self.min_severity()?;
        Ok(())
    }

    /// Full path of the backing file
    pub fn file_path(&self) -> PathBuf {
        self.data_dir.join(&self.file_name)
    }

    /// Parsed `log_level`
    pub fn min_severity(&self) -> ConfigResult<Severity> {
        self.log_level.parse().map_err(ConfigError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.file_path(), Path::new("database").join("database.json"));
        assert!(config.fsync);
        assert_eq!(config.min_severity().unwrap(), Severity::Warn);
    }

    #[test]
    fn test_default_log_level_matches_logger_default() {
        assert_eq!(
            StoreConfig::default().min_severity().unwrap(),
            crate::observability::DEFAULT_MIN_SEVERITY
        );
    }

    #[test]
    fn test_load_empty_object_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("jsondb.json");
        fs::write(&path, "{}").unwrap();

        assert_eq!(StoreConfig::load(&path).unwrap(), StoreConfig::default());
    }

    #[test]
    fn test_load_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("jsondb.json");
        fs::write(
            &path,
            r#"{"data_dir": "/var/lib/app", "file_name": "users.json", "fsync": false, "log_level": "trace"}"#,
        )
        .unwrap();

        let config = StoreConfig::load(&path).unwrap();
        assert_eq!(config.file_path(), Path::new("/var/lib/app/users.json"));
        assert!(!config.fsync);
        assert_eq!(config.min_severity().unwrap(), Severity::Trace);
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = StoreConfig::load(&temp_dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("jsondb.json");
        fs::write(&path, "{ data_dir: }").unwrap();

        assert!(matches!(
            StoreConfig::load(&path).unwrap_err(),
            ConfigError::Parse { .. }
        ));
    }

    #[test]
    fn test_file_name_with_separator_rejected() {
        let config = StoreConfig {
            file_name: "nested/db.json".into(),
            ..StoreConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_log_level_rejected() {
        let config = StoreConfig {
            log_level: "loud".into(),
            ..StoreConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
