//! `.waymark/config.toml` loading.
//!
//! A missing file is not an error: every field has a default.

use crate::core::error::CheckpointError;
use crate::core::store::CONFIG_FILE;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Environment variable that overrides `log.filter`.
pub const LOG_ENV: &str = "WAYMARK_LOG";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// How long a connection waits on another process's write lock.
    pub busy_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            busy_timeout_ms: 5_000,
        }
    }
}

impl StorageConfig {
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
        }
    }
}

impl Config {
    /// Load `<waymark_dir>/config.toml`, falling back to defaults.
    pub fn load(waymark_dir: &Path) -> Result<Config, CheckpointError> {
        let config_path = waymark_dir.join(CONFIG_FILE);
        if !config_path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(&config_path)?;
        toml::from_str(&content).map_err(|e| {
            CheckpointError::ConfigError(format!("{}: {}", config_path.display(), e))
        })
    }

    /// Write the default config to `<waymark_dir>/config.toml` unless one exists.
    pub fn write_default_if_missing(waymark_dir: &Path) -> Result<bool, CheckpointError> {
        let config_path = waymark_dir.join(CONFIG_FILE);
        if config_path.exists() {
            return Ok(false);
        }
        let body = toml::to_string_pretty(&Config::default())
            .map_err(|e| CheckpointError::ConfigError(e.to_string()))?;
        fs::create_dir_all(waymark_dir)?;
        fs::write(&config_path, body)?;
        Ok(true)
    }

    /// Filter directive after applying the `WAYMARK_LOG` override.
    pub fn log_filter(&self) -> String {
        std::env::var(LOG_ENV).unwrap_or_else(|_| self.log.filter.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = Config::load(tmp.path()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.storage.busy_timeout(), Duration::from_secs(5));
        assert_eq!(config.log.filter, "warn");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            "[storage]\nbusy_timeout_ms = 250\n",
        )
        .unwrap();
        let config = Config::load(tmp.path()).unwrap();
        assert_eq!(config.storage.busy_timeout_ms, 250);
        assert_eq!(config.log.filter, "warn");
    }

    #[test]
    fn malformed_file_is_config_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "[storage\n").unwrap();
        let err = Config::load(tmp.path()).unwrap_err();
        assert!(matches!(err, CheckpointError::ConfigError(_)), "{err}");
    }

    #[test]
    fn default_config_round_trips_through_disk() {
        let tmp = TempDir::new().unwrap();
        assert!(Config::write_default_if_missing(tmp.path()).unwrap());
        assert!(!Config::write_default_if_missing(tmp.path()).unwrap());
        assert_eq!(Config::load(tmp.path()).unwrap(), Config::default());
    }
}
