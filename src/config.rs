//! Configuration management for smart-ats
//!
//! Two sources, both read once at startup and then passed down explicitly:
//! the TOML settings file (model, endpoint, timeouts, output preferences) and
//! the API credential, which only ever comes from the environment.

use crate::error::{Result, SmartAtsError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Environment variable holding the generation API credential.
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub generation: GenerationConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub model: String,
    pub endpoint: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
    Raw,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-flash-8b".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout_secs: 60,
            connect_timeout_secs: 10,
            temperature: None,
            max_output_tokens: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Console,
            color_output: true,
        }
    }
}

impl Config {
    /// Load settings from `path`, or from the default location when `None`.
    ///
    /// A missing file is not an error: defaults are used and nothing is
    /// written. Use [`Config::save`] (`config reset`) to materialise one.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_path);

        let config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content).map_err(|e| {
                SmartAtsError::Configuration(format!(
                    "Failed to parse config '{}': {}",
                    config_path.display(),
                    e
                ))
            })?
        } else {
            log::debug!("No config file at {}, using defaults", config_path.display());
            Self::default()
        };

        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf> {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_path);

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| SmartAtsError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(&config_path, content)?;
        Ok(config_path)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("smart-ats")
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        let generation = &self.generation;
        if generation.model.trim().is_empty() {
            return Err(SmartAtsError::Configuration("generation.model must not be empty".into()));
        }
        if !(generation.endpoint.starts_with("https://") || generation.endpoint.starts_with("http://")) {
            return Err(SmartAtsError::Configuration(format!(
                "generation.endpoint must be an http(s) URL, got '{}'",
                generation.endpoint
            )));
        }
        if generation.timeout_secs == 0 {
            return Err(SmartAtsError::Configuration("generation.timeout_secs must be at least 1".into()));
        }
        if let Some(t) = generation.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(SmartAtsError::Configuration(format!(
                    "generation.temperature must be within 0.0..=2.0, got {}",
                    t
                )));
            }
        }
        Ok(())
    }
}

/// The generation API credential.
///
/// `Debug` and `Display` never print the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Read the credential from the process environment, loading `.env`
    /// first if one is present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_value(std::env::var(API_KEY_ENV).ok())
    }

    pub fn from_value(value: Option<String>) -> Result<Self> {
        match value {
            Some(key) if !key.trim().is_empty() => Ok(Self(key.trim().to_string())),
            Some(_) => Err(SmartAtsError::Configuration(format!(
                "environment variable {} is set but empty",
                API_KEY_ENV
            ))),
            None => Err(SmartAtsError::Configuration(format!(
                "environment variable {} is not set",
                API_KEY_ENV
            ))),
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}
