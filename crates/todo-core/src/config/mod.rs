//! Configuration management for todo.
//!
//! Configuration is loaded from multiple sources with the following priority:
//! 1. Environment variables (highest priority)
//! 2. Project-local `todo.toml` file
//! 3. User config `~/.config/todo/config.toml`
//! 4. Built-in defaults (lowest priority)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

mod defaults;

pub use defaults::*;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,

    /// Remote config provider configuration.
    pub remote: RemoteSettings,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// Searches for config in order:
    /// 1. `./todo.toml` (project local)
    /// 2. `~/.config/todo/config.toml` (user config)
    /// 3. Falls back to defaults
    pub fn load() -> Result<Self, ConfigError> {
        if Path::new("todo.toml").exists() {
            return Self::from_file("todo.toml");
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("todo").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("TODO_DATA_DIR") {
            self.storage.data_dir = dir;
        }

        if let Ok(provider) = std::env::var("TODO_REMOTE_PROVIDER") {
            self.remote.provider = provider;
        }
        if let Ok(key) = std::env::var("TODO_REMOTE_API_KEY") {
            self.remote.api_key = key;
        }
        if let Ok(project) = std::env::var("TODO_REMOTE_PROJECT_ID") {
            self.remote.project_id = project;
        }
        if let Ok(app) = std::env::var("TODO_REMOTE_APP_ID") {
            self.remote.app_id = app;
        }
        if let Ok(secs) = std::env::var("TODO_REMOTE_FETCH_INTERVAL") {
            if let Ok(n) = secs.parse() {
                self.remote.minimum_fetch_interval_secs = n;
            }
        }

        if let Ok(level) = std::env::var("TODO_LOG") {
            self.logging.level = level;
        }
    }

    /// Reject settings the stores cannot work with.
    fn validate(&self) -> Result<(), ConfigError> {
        for key in [
            &self.storage.tasks_key,
            &self.storage.categories_key,
            &self.storage.flags_key,
        ] {
            if key.trim().is_empty() {
                return Err(ConfigError::Invalid("storage keys must not be empty".to_string()));
            }
        }

        match self.remote.provider.as_str() {
            "none" | "static" | "firebase" => Ok(()),
            other => Err(ConfigError::Invalid(format!("unknown remote provider: {other}"))),
        }
    }

    /// Create a default config file content as a string.
    pub fn default_config_string() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding one file per storage key. Relative paths are
    /// resolved against the home directory.
    pub data_dir: String,

    /// Key of the task collection.
    pub tasks_key: String,

    /// Key of the category collection.
    pub categories_key: String,

    /// Key of the cached feature flags.
    pub flags_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: DEFAULT_DATA_DIR.to_string(),
            tasks_key: DEFAULT_TASKS_KEY.to_string(),
            categories_key: DEFAULT_CATEGORIES_KEY.to_string(),
            flags_key: DEFAULT_FLAGS_KEY.to_string(),
        }
    }
}

impl StorageConfig {
    /// Get the absolute data directory.
    pub fn data_path(&self) -> PathBuf {
        let dir = PathBuf::from(&self.data_dir);
        if dir.is_absolute() {
            return dir;
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(dir)
    }
}

/// Remote config provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteSettings {
    /// Provider name: "none", "static" or "firebase".
    pub provider: String,

    /// API key of the Firebase project.
    #[serde(skip_serializing)]
    pub api_key: String,

    /// Firebase project id.
    pub project_id: String,

    /// Firebase app id.
    pub app_id: String,

    /// Base URL override for the remote API.
    pub base_url: Option<String>,

    /// Minimum number of seconds between two remote fetches.
    pub minimum_fetch_interval_secs: u64,

    /// Values served by the "static" provider, as raw strings.
    pub values: BTreeMap<String, String>,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            provider: DEFAULT_REMOTE_PROVIDER.to_string(),
            api_key: String::new(),
            project_id: String::new(),
            app_id: String::new(),
            base_url: None,
            minimum_fetch_interval_secs: DEFAULT_MINIMUM_FETCH_INTERVAL_SECS,
            values: BTreeMap::new(),
        }
    }
}

impl RemoteSettings {
    /// Returns true when the credentials were filled in by the user.
    ///
    /// Empty values and values still carrying a template marker count as
    /// unconfigured.
    pub fn credentials_configured(&self) -> bool {
        [&self.api_key, &self.project_id, &self.app_id]
            .iter()
            .all(|value| is_real_credential(value))
    }

    /// Get the minimum fetch interval as a duration.
    pub fn minimum_fetch_interval(&self) -> Duration {
        Duration::from_secs(self.minimum_fetch_interval_secs)
    }

    /// Get the base URL, falling back to the Firebase default.
    pub fn base_url_or_default(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_FIREBASE_URL.to_string())
    }
}

fn is_real_credential(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty()
        && !PLACEHOLDER_CREDENTIAL_MARKERS
            .iter()
            .any(|marker| value.contains(marker))
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}
