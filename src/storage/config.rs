//! Application configuration.
//!
//! Loaded from `config.toml` in the platform data directory; a missing
//! file yields defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::live::MembershipPolicy;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Application version
    pub version: String,
    /// Data directory path
    #[serde(skip)]
    pub data_dir: PathBuf,
    /// Database settings
    pub database: DatabaseSettings,
    /// Feed settings
    pub feed: FeedSettings,
    /// Live session settings
    pub live: LiveSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            data_dir: PathBuf::new(),
            database: DatabaseSettings::default(),
            feed: FeedSettings::default(),
            live: LiveSettings::default(),
        }
    }
}

impl AppConfig {
    /// Resolved database path. Relative paths live under the data directory.
    pub fn database_path(&self) -> PathBuf {
        if self.database.path.is_absolute() {
            self.database.path.clone()
        } else {
            self.data_dir.join(&self.database.path)
        }
    }
}

/// Database settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// SQLite file, relative to the data directory unless absolute
    pub path: PathBuf,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("social.db"),
        }
    }
}

/// Activity feed settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedSettings {
    /// Rows per feed page
    pub page_size: usize,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self { page_size: 20 }
    }
}

/// Live session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveSettings {
    /// Attempts for participant-set mutations
    pub max_attempts: u32,
    /// Linear backoff step between attempts, in milliseconds
    pub backoff_step_ms: u64,
    /// Invite code length
    pub invite_code_length: usize,
    /// Attempts to find an unused invite code
    pub invite_code_attempts: u32,
    /// How long an open session still counts as a pending invite
    pub invite_window_hours: i64,
    /// Reject backward status transitions
    pub enforce_status_order: bool,
    /// Default session capacity
    pub max_participants: u32,
}

impl Default for LiveSettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_step_ms: 100,
            invite_code_length: 6,
            invite_code_attempts: 3,
            invite_window_hours: 3,
            enforce_status_order: false,
            max_participants: 10,
        }
    }
}

impl LiveSettings {
    /// Membership protocol parameters.
    pub fn membership_policy(&self) -> MembershipPolicy {
        MembershipPolicy {
            max_attempts: self.max_attempts.max(1),
            backoff_step: Duration::from_millis(self.backoff_step_ms),
            invite_code_length: self.invite_code_length,
            invite_code_attempts: self.invite_code_attempts.max(1),
            invite_window: chrono::Duration::hours(self.invite_window_hours),
            enforce_status_order: self.enforce_status_order,
            default_max_participants: self.max_participants,
        }
    }
}

/// Get the application data directory.
pub fn get_data_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "fitsocial", "FitSocial")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the configuration file path.
pub fn get_config_path() -> PathBuf {
    get_data_dir().join("config.toml")
}

/// Load application configuration from the default location.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&get_config_path(), get_data_dir())
}

/// Load configuration from `path`, falling back to defaults if it does not exist.
pub fn load_config_from(path: &Path, data_dir: PathBuf) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        return Ok(AppConfig {
            data_dir,
            ..Default::default()
        });
    }

    let content =
        std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

    let mut config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

    config.data_dir = data_dir;

    Ok(config)
}

/// Save application configuration to the default location.
pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    save_config_to(config, &get_config_path())
}

/// Save application configuration to `path`.
pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
    }

    let content =
        toml::to_string_pretty(config).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

    Ok(())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config =
            load_config_from(&dir.path().join("config.toml"), dir.path().to_path_buf()).unwrap();
        assert_eq!(config.live.max_attempts, 3);
        assert_eq!(config.live.backoff_step_ms, 100);
        assert_eq!(config.live.invite_window_hours, 3);
        assert!(!config.live.enforce_status_order);
        assert_eq!(config.database_path(), dir.path().join("social.db"));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[live]\nmax_attempts = 5\nenforce_status_order = true\n").unwrap();

        let config = load_config_from(&path, dir.path().to_path_buf()).unwrap();
        assert_eq!(config.live.max_attempts, 5);
        assert!(config.live.enforce_status_order);
        assert_eq!(config.live.invite_code_length, 6);
        assert_eq!(config.feed.page_size, 20);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = AppConfig::default();
        config.feed.page_size = 50;
        config.live.backoff_step_ms = 25;

        save_config_to(&config, &path).unwrap();
        let loaded = load_config_from(&path, dir.path().to_path_buf()).unwrap();
        assert_eq!(loaded.feed.page_size, 50);
        assert_eq!(loaded.live.backoff_step_ms, 25);
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[live\nmax_attempts = ").unwrap();
        let err = load_config_from(&path, dir.path().to_path_buf()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_membership_policy_from_settings() {
        let settings = LiveSettings {
            max_attempts: 0,
            backoff_step_ms: 7,
            ..Default::default()
        };
        let policy = settings.membership_policy();
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.backoff_step, Duration::from_millis(7));
        assert_eq!(policy.default_max_participants, 10);
    }
}
