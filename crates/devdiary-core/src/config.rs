//! Configuration management for DevDiary
//!
//! Handles loading and validation of TOML configuration files. Credentials are
//! never read from here; see [`crate::api_key`].

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure for DevDiary
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Storage-related settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Generative backend settings
    #[serde(default)]
    pub ai: AiConfig,

    /// Snippet source settings
    #[serde(default)]
    pub snippets: SnippetsConfig,

    /// Version control settings
    #[serde(default)]
    pub git: GitConfig,

    /// Document-database destination
    #[serde(default)]
    pub notion: NotionConfig,

    /// Gist-host destination
    #[serde(default)]
    pub gist: GistConfig,

    /// Chat-notifier destination
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Periodic diary scheduler
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Foreground clipboard watcher
    #[serde(default)]
    pub clipboard: ClipboardConfig,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Base data directory (default: ~/.devdiary/)
    #[serde(
        default = "default_data_dir",
        deserialize_with = "deserialize_data_dir"
    )]
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Generative backend configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AiConfig {
    /// Backend: "gemini" or "openai"
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model name; empty means the backend's own default
    #[serde(default)]
    pub model: String,

    /// Sampling temperature (default: 0.7)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum output tokens per completion (default: 4000)
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Input token budget of the backend. When set, activity payloads that
    /// estimate above 70% of it are truncated before the first pass.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_token_budget: Option<usize>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: String::new(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            input_token_budget: None,
        }
    }
}

/// Snippet source configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SnippetsConfig {
    /// "local", "pieces" or "none"
    #[serde(default = "default_snippet_source")]
    pub source: String,

    /// Base URL of the Pieces-style local service
    #[serde(default = "default_pieces_base_url")]
    pub pieces_base_url: String,
}

impl Default for SnippetsConfig {
    fn default() -> Self {
        Self {
            source: default_snippet_source(),
            pieces_base_url: default_pieces_base_url(),
        }
    }
}

/// Version control configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GitConfig {
    /// Repository to read commits and branches from; disabled when absent
    #[serde(
        default,
        deserialize_with = "deserialize_optional_path",
        skip_serializing_if = "Option::is_none"
    )]
    pub repository_path: Option<PathBuf>,
}

/// Document-database destination configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NotionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_id: Option<String>,
}

/// Gist-host destination configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GistConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Filename suffix; the published file is `<YYYY-MM-DD>-<filename>`
    #[serde(default = "default_gist_filename")]
    pub filename: String,

    #[serde(default)]
    pub public: bool,
}

impl Default for GistConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            filename: default_gist_filename(),
            public: false,
        }
    }
}

/// Chat-notifier destination configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TelegramConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
}

/// Periodic scheduler configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScheduleConfig {
    /// Interval between automatic diary runs in seconds (default: 86400)
    #[serde(default = "default_schedule_interval")]
    pub interval_seconds: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_schedule_interval(),
        }
    }
}

/// Clipboard watcher configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClipboardConfig {
    /// How often the foreground watcher re-reads the system clipboard
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: default_poll_interval(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".devdiary")
}

fn default_provider() -> String {
    "gemini".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_output_tokens() -> u32 {
    4000
}

fn default_snippet_source() -> String {
    "local".to_string()
}

fn default_pieces_base_url() -> String {
    "http://localhost:1000".to_string()
}

fn default_gist_filename() -> String {
    "dev-diary.md".to_string()
}

fn default_schedule_interval() -> u64 {
    86400
}

fn default_poll_interval() -> u64 {
    2
}

/// Expands a leading tilde (~) to the home directory
fn expand_tilde(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    if let Some(rest) = path_str.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    } else if path_str == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    path.to_path_buf()
}

fn deserialize_data_dir<'de, D>(deserializer: D) -> Result<PathBuf, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let path_str = String::deserialize(deserializer)?;
    Ok(expand_tilde(&PathBuf::from(path_str)))
}

fn deserialize_optional_path<'de, D>(deserializer: D) -> Result<Option<PathBuf>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let path_str = Option::<String>::deserialize(deserializer)?;
    Ok(path_str
        .filter(|s| !s.trim().is_empty())
        .map(|s| expand_tilde(&PathBuf::from(s))))
}

impl Config {
    /// Validates the configuration values
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` if:
    /// - `ai.provider` is not "gemini" or "openai"
    /// - `ai.temperature` is outside 0.0..=2.0
    /// - `ai.max_output_tokens` or `ai.input_token_budget` is 0
    /// - `snippets.source` is not "local", "pieces" or "none"
    /// - `schedule.interval_seconds` or `clipboard.poll_interval_seconds` is 0
    /// - `gist.filename` is blank
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !["gemini", "openai"].contains(&self.ai.provider.as_str()) {
            return Err(ConfigError::InvalidValue(
                "provider must be 'gemini' or 'openai'".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.ai.temperature) {
            return Err(ConfigError::InvalidValue(
                "temperature must be between 0.0 and 2.0".to_string(),
            ));
        }

        if self.ai.max_output_tokens == 0 {
            return Err(ConfigError::InvalidValue(
                "max_output_tokens must be > 0".to_string(),
            ));
        }

        if self.ai.input_token_budget == Some(0) {
            return Err(ConfigError::InvalidValue(
                "input_token_budget must be > 0 when set".to_string(),
            ));
        }

        if !["local", "pieces", "none"].contains(&self.snippets.source.as_str()) {
            return Err(ConfigError::InvalidValue(
                "snippets.source must be 'local', 'pieces' or 'none'".to_string(),
            ));
        }

        if self.schedule.interval_seconds == 0 {
            return Err(ConfigError::InvalidValue(
                "interval_seconds must be > 0".to_string(),
            ));
        }

        if self.clipboard.poll_interval_seconds == 0 {
            return Err(ConfigError::InvalidValue(
                "poll_interval_seconds must be > 0".to_string(),
            ));
        }

        if self.gist.filename.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "gist.filename must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Returns the default configuration file path (`~/.devdiary/config.toml`)
pub fn get_default_config_path() -> PathBuf {
    default_data_dir().join("config.toml")
}

/// Loads configuration from the specified path
///
/// If the file doesn't exist, creates a default configuration file.
/// If the file is invalid or contains invalid values, returns default configuration.
///
/// # Returns
/// * `Ok(Config)` - Successfully loaded or default configuration
/// * `Err(ConfigError)` - Only for IO errors during file creation
pub fn load_config_from_path(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let default_config = Config::default();
        let toml_str = toml::to_string_pretty(&default_config)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        fs::write(path, &toml_str)?;

        tracing::info!(path = ?path, "Created default configuration file");
        return Ok(default_config);
    }

    let content = fs::read_to_string(path)?;

    let config: Config = match toml::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(
                "Failed to parse configuration file {:?}: {}. Using default configuration.",
                path,
                e
            );
            return Ok(Config::default());
        }
    };

    if let Err(e) = config.validate() {
        tracing::warn!(
            "Invalid configuration in {:?}: {}. Using default configuration.",
            path,
            e
        );
        return Ok(Config::default());
    }

    Ok(config)
}

/// Loads configuration from the default path (`~/.devdiary/config.toml`)
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from_path(&get_default_config_path())
}
