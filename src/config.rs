//! Configuration loading and management.
//!
//! Configuration is loaded with the following precedence:
//! 1. Environment variables (`MIRRORMIND_*`)
//! 2. Config file (`~/.mirrormind/config.toml`)
//! 3. Defaults

use crate::error::{Error, Result};
use crate::storage::file::get_mirrormind_home;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration struct.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Where conversations are persisted.
    pub backend: BackendConfig,

    /// Chat pacing.
    pub chat: ChatConfig,

    /// Signed-in user.
    pub user: UserConfig,

    /// Local storage configuration.
    pub storage: StorageConfig,
}

/// Which store backs the conversation.
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// JSON files under the storage path (default).
    #[default]
    File,

    /// Hosted backend over HTTP RPC.
    Remote,
}

/// Backend configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Backend kind.
    pub kind: BackendKind,

    /// Project URL of the hosted backend.
    pub url: String,

    /// Public API key sent with every request.
    pub api_key: String,

    /// User access token; the API key is used as bearer when absent.
    pub access_token: Option<String>,

    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::File,
            url: String::new(),
            api_key: String::new(),
            access_token: None,
            timeout_seconds: 30,
        }
    }
}

/// Chat pacing configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Pause before the companion replies, in milliseconds.
    pub reply_delay_ms: u64,

    /// Pause between the reply and the save, in milliseconds.
    pub save_delay_ms: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            reply_delay_ms: 1000,
            save_delay_ms: 500,
        }
    }
}

impl ChatConfig {
    /// Reply delay as a `Duration`.
    #[must_use]
    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }

    /// Save delay as a `Duration`.
    #[must_use]
    pub fn save_delay(&self) -> Duration {
        Duration::from_millis(self.save_delay_ms)
    }
}

/// Signed-in user configuration.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct UserConfig {
    /// User id the conversation is scoped to.
    pub id: Option<String>,
}

/// Local storage configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the mirrormind home directory.
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: get_mirrormind_home(),
        }
    }
}

impl Config {
    /// Resolve the user id, preferring an explicit override.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingUserId`] if neither is set.
    pub fn user_id(&self, explicit: Option<&str>) -> Result<String> {
        explicit
            .map(str::to_string)
            .or_else(|| self.user.id.clone())
            .filter(|id| !id.trim().is_empty())
            .ok_or(Error::MissingUserId)
    }
}

/// Load configuration with precedence: env vars → file → defaults.
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed.
pub fn load_config() -> Result<Config> {
    let mut config = Config::default();

    let config_path = get_config_path();
    if config_path.exists() {
        let contents = fs::read_to_string(&config_path).map_err(Error::Storage)?;
        config = toml::from_str(&contents).map_err(|e| Error::Config(e.to_string()))?;
    }

    apply_env_overrides(&mut config);

    Ok(config)
}

/// Get the path to the config file.
fn get_config_path() -> PathBuf {
    if let Ok(path) = env::var("MIRRORMIND_CONFIG") {
        return PathBuf::from(path);
    }

    get_mirrormind_home().join("config.toml")
}

/// Apply environment variable overrides to config.
fn apply_env_overrides(config: &mut Config) {
    if let Ok(path) = env::var("MIRRORMIND_STORAGE_PATH") {
        config.storage.path = PathBuf::from(path);
    } else if let Ok(home) = env::var("MIRRORMIND_HOME") {
        config.storage.path = PathBuf::from(home);
    }

    if let Ok(kind) = env::var("MIRRORMIND_BACKEND") {
        config.backend.kind = match kind.to_lowercase().as_str() {
            "remote" => BackendKind::Remote,
            _ => BackendKind::File,
        };
    }

    if let Ok(url) = env::var("MIRRORMIND_BACKEND_URL") {
        config.backend.url = url;
    }

    if let Ok(key) = env::var("MIRRORMIND_API_KEY") {
        config.backend.api_key = key;
    }

    if let Ok(token) = env::var("MIRRORMIND_ACCESS_TOKEN") {
        config.backend.access_token = Some(token);
    }

    if let Ok(val) = env::var("MIRRORMIND_TIMEOUT_SECONDS") {
        if let Ok(secs) = val.parse() {
            config.backend.timeout_seconds = secs;
        }
    }

    if let Ok(val) = env::var("MIRRORMIND_REPLY_DELAY_MS") {
        if let Ok(ms) = val.parse() {
            config.chat.reply_delay_ms = ms;
        }
    }

    if let Ok(val) = env::var("MIRRORMIND_SAVE_DELAY_MS") {
        if let Ok(ms) = val.parse() {
            config.chat.save_delay_ms = ms;
        }
    }

    if let Ok(id) = env::var("MIRRORMIND_USER_ID") {
        config.user.id = Some(id);
    }
}
