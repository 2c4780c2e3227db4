use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::ConfigError;
use crate::wav::AudioFormat;

pub const DEFAULT_CONFIG_FILE: &str = "echomuse.toml";
pub const CONFIG_PATH_ENV: &str = "ECHOMUSE_CONFIG";

/// Fallback key variable, checked after the configured one.
const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

pub const MAX_HISTORY_CAPACITY: usize = 1000;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub speech: SpeechConfig,
    pub audio: AudioFormat,
    pub history: HistoryConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub endpoint: String,
    pub model: String,
    /// Environment variable holding the API key. The key itself never lives in the file.
    pub api_key_env: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub capacity: usize,
    pub snippet_chars: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub file_prefix: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.5-flash-preview-tts".to_string(),
            api_key_env: "API_KEY".to_string(),
            timeout_secs: 60,
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: 20,
            snippet_chars: 50,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            file_prefix: "echomuse".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Loads `$ECHOMUSE_CONFIG` or `./echomuse.toml` when present, defaults otherwise.
    /// A `.env` file is read first so either can point at the config.
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let path = env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        if path.is_file() {
            debug!("Loading configuration from {}", path.display());
            Self::load_from_file(&path)
        } else {
            debug!("No configuration file at {}, using defaults", path.display());
            let config = Self::default();
            config.validate()?;
            Ok(config)
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.audio
            .byte_rate()
            .map_err(|e| ConfigError::Validation(format!("audio format: {}", e)))?;

        if self.speech.endpoint.trim().is_empty() {
            return Err(ConfigError::Validation(
                "speech endpoint must not be empty".to_string(),
            ));
        }
        if self.speech.model.trim().is_empty() {
            return Err(ConfigError::Validation(
                "speech model must not be empty".to_string(),
            ));
        }
        if self.speech.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "speech timeout must be positive".to_string(),
            ));
        }
        if self.history.capacity == 0 || self.history.capacity > MAX_HISTORY_CAPACITY {
            return Err(ConfigError::Validation(format!(
                "history capacity must be between 1 and {}",
                MAX_HISTORY_CAPACITY
            )));
        }
        if self.history.snippet_chars == 0 {
            return Err(ConfigError::Validation(
                "history snippet length must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// API key from the configured variable, falling back to `GEMINI_API_KEY`.
    pub fn api_key(&self) -> Option<String> {
        first_key([self.speech.api_key_env.as_str(), GEMINI_API_KEY_ENV])
    }
}

/// First non-blank value among the named environment variables.
fn first_key<'a>(names: impl IntoIterator<Item = &'a str>) -> Option<String> {
    names
        .into_iter()
        .filter_map(|name| env::var(name).ok())
        .find(|key| !key.trim().is_empty())
}
