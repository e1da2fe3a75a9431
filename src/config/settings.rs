//! Application settings management

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// General settings
    #[serde(default)]
    pub general: GeneralSettings,

    /// Gemini analysis settings
    #[serde(default)]
    pub gemini: GeminiSettings,

    /// Secondary coaching backend settings
    #[serde(default)]
    pub backend: BackendSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralSettings {
    /// Data directory for the recording library
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiSettings {
    /// API key (or PODIUM_GEMINI_API_KEY)
    #[serde(default)]
    pub api_key: String,

    /// Model name
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// API endpoint base (empty = Google-hosted default)
    #[serde(default)]
    pub endpoint: String,

    /// Per-request timeout in seconds (upload, state check, generation)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// First readiness-poll delay in milliseconds
    #[serde(default = "default_poll_initial_ms")]
    pub poll_initial_ms: u64,

    /// Cap on a single readiness-poll delay in milliseconds
    #[serde(default = "default_poll_max_ms")]
    pub poll_max_ms: u64,

    /// Cumulative readiness wait bound in milliseconds
    #[serde(default = "default_poll_max_wait_ms")]
    pub poll_max_wait_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendSettings {
    /// Base URL of the coaching backend (empty = disabled, or PODIUM_BACKEND_URL)
    #[serde(default)]
    pub url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

// Default value functions

fn default_data_dir() -> PathBuf {
    ProjectDirs::from("com", "podium", "podium")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.local/share/podium"))
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_poll_initial_ms() -> u64 {
    2_000
}

fn default_poll_max_ms() -> u64 {
    10_000
}

fn default_poll_max_wait_ms() -> u64 {
    180_000
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_gemini_model(),
            endpoint: String::new(),
            request_timeout_secs: default_request_timeout_secs(),
            poll_initial_ms: default_poll_initial_ms(),
            poll_max_ms: default_poll_max_ms(),
            poll_max_wait_ms: default_poll_max_wait_ms(),
        }
    }
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            general: GeneralSettings::default(),
            gemini: GeminiSettings::default(),
            backend: BackendSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from the configuration file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            tracing::info!("No config file found, using defaults");
            let mut settings = Self::default();
            settings.apply_env_overrides();
            return Ok(settings);
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let mut settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        settings.apply_env_overrides();

        Ok(settings)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if self.gemini.api_key.trim().is_empty() {
            if let Ok(key) = std::env::var("PODIUM_GEMINI_API_KEY") {
                if !key.trim().is_empty() {
                    self.gemini.api_key = key;
                }
            }
        }

        if self.backend.url.trim().is_empty() {
            if let Ok(url) = std::env::var("PODIUM_BACKEND_URL") {
                if !url.trim().is_empty() {
                    self.backend.url = url;
                }
            }
        }
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("com", "podium", "podium")
            .context("Could not determine config directory")?;

        let config_dir = dirs.config_dir();
        Ok(config_dir.join("config.toml"))
    }

    /// Write default configuration to a file
    pub fn write_default(path: &PathBuf) -> Result<()> {
        let settings = Self::default();
        let content = toml::to_string_pretty(&settings)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the path of the persisted recording library
    pub fn library_path(&self) -> PathBuf {
        self.general.data_dir.join("library.json")
    }

    /// Get the imported videos directory
    pub fn videos_dir(&self) -> PathBuf {
        self.general.data_dir.join("videos")
    }

    /// Ensure all required directories exist
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.general.data_dir)?;
        std::fs::create_dir_all(self.videos_dir())?;
        Ok(())
    }
}
