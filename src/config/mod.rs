// fitagent — Personal fitness assistant in Rust
// License: Apache-2.0

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadFile(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("home directory not found")]
    NoHomeDir,
    #[error("no API key configured for the completion endpoint")]
    MissingApiKey,
    #[error("invalid completion api_base '{0}'")]
    InvalidApiBase(String),
    #[error("{0}")]
    Other(String),
}

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding `user_data.json`.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> String {
    "~/.fitagent".to_string()
}

// ---------------------------------------------------------------------------
// Completion endpoint
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    #[serde(default)]
    pub api_key: String,
    /// Empty means the Groq OpenAI-compatible endpoint.
    #[serde(default)]
    pub api_base: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_revision_temperature")]
    pub revision_temperature: f64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: String::new(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            revision_temperature: default_revision_temperature(),
        }
    }
}

fn default_model() -> String {
    "llama3-70b-8192".to_string()
}
fn default_timeout_secs() -> u64 {
    120
}
fn default_revision_temperature() -> f64 {
    0.5
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_export_title")]
    pub title: String,
    /// File name without extension; `.pdf` or `.txt` is appended.
    #[serde(default = "default_file_stem")]
    pub file_stem: String,
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            title: default_export_title(),
            file_stem: default_file_stem(),
            max_pages: default_max_pages(),
        }
    }
}

fn default_export_title() -> String {
    "AI Fitness Assistant Responses".to_string()
}
fn default_file_stem() -> String {
    "fitness_agent_responses".to_string()
}
fn default_max_pages() -> usize {
    500
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a JSON file, falling back to defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            serde_json::from_str(&contents)?
        } else {
            tracing::debug!("Config file not found at {:?}, using defaults", path);
            Config::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (prefix: FITAGENT_).
    /// `GROQ_API_KEY` is honoured when no fitagent-specific key is set.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(v) = var("FITAGENT_DATA_DIR") {
            self.store.data_dir = v;
        }
        if let Some(v) = var("FITAGENT_API_KEY").or_else(|| var("GROQ_API_KEY")) {
            self.completion.api_key = v;
        }
        if let Some(v) = var("FITAGENT_API_BASE") {
            self.completion.api_base = v;
        }
        if let Some(v) = var("FITAGENT_MODEL") {
            self.completion.model = v;
        }
        if let Some(v) = var("FITAGENT_TIMEOUT_SECS") {
            if let Ok(n) = v.parse() {
                self.completion.timeout_secs = n;
            }
        }
    }

    /// Resolve the data directory, expanding `~` to home directory.
    pub fn data_dir(&self) -> Result<PathBuf, ConfigError> {
        let dir = &self.store.data_dir;
        if let Some(stripped) = dir.strip_prefix('~') {
            let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
            Ok(home.join(dir.strip_prefix("~/").unwrap_or(stripped)))
        } else {
            Ok(PathBuf::from(dir))
        }
    }

    /// Get the default config file path: ~/.fitagent/config.json
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".fitagent").join("config.json"))
    }

    /// Validate what the completion commands need.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.completion.api_key.is_empty() {
            return Err(ConfigError::MissingApiKey);
        }

        let base = &self.completion.api_base;
        if !base.is_empty() {
            let parsed =
                url::Url::parse(base).map_err(|_| ConfigError::InvalidApiBase(base.clone()))?;
            if parsed.scheme() != "http" && parsed.scheme() != "https" {
                return Err(ConfigError::InvalidApiBase(base.clone()));
            }
        }

        if self.export.max_pages == 0 {
            return Err(ConfigError::Other("export.max_pages must be at least 1".into()));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
