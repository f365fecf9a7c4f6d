//! Configuration for the analysis backend.

use anygraph_sandbox::{ProcessRunner, ResourceLimits};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable that overrides the configured API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Read(#[source] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("No API key: set {API_KEY_ENV} or the [llm] api_key config field")]
    MissingApiKey,
}

/// Application configuration, loaded from `~/.config/anygraph/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub llm: LlmSettings,

    #[serde(default)]
    pub sandbox: SandboxSettings,
}

/// LLM provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// API key; the `GEMINI_API_KEY` env var takes precedence
    pub api_key: Option<String>,

    /// Model name
    #[serde(default = "LlmSettings::default_model")]
    pub model: String,

    /// Endpoint base URL override (local proxies)
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: Self::default_model(),
            endpoint: None,
        }
    }
}

impl LlmSettings {
    fn default_model() -> String {
        "gemini-2.5-flash".to_string()
    }
}

/// Sandbox settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SandboxSettings {
    /// Interpreter binary used for generated analysis code
    #[serde(default = "SandboxSettings::default_interpreter")]
    pub interpreter: String,

    /// Wall-clock budget per execution, in seconds
    #[serde(default = "SandboxSettings::default_timeout_secs")]
    pub timeout_secs: u64,

    /// Address-space ceiling per execution, in MiB
    #[serde(default = "SandboxSettings::default_memory_limit_mib")]
    pub memory_limit_mib: u64,
}

impl Default for SandboxSettings {
    fn default() -> Self {
        Self {
            interpreter: Self::default_interpreter(),
            timeout_secs: Self::default_timeout_secs(),
            memory_limit_mib: Self::default_memory_limit_mib(),
        }
    }
}

impl SandboxSettings {
    fn default_interpreter() -> String {
        "python3".to_string()
    }

    fn default_timeout_secs() -> u64 {
        60
    }

    fn default_memory_limit_mib() -> u64 {
        512
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Build the process runner these settings describe.
    pub fn runner(&self) -> ProcessRunner {
        ProcessRunner::with_interpreter(self.interpreter.as_str()).with_limits(ResourceLimits {
            max_memory_bytes: Some(self.memory_limit_mib * 1024 * 1024),
            max_cpu_seconds: None,
        })
    }
}

impl AppConfig {
    /// Load from the default path, falling back to defaults when the file
    /// does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Read)?;
        Ok(toml::from_str(&content)?)
    }

    /// Default config file location.
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config").join("anygraph").join("config.toml"))
    }

    /// Resolve the API key: environment first, then config.
    pub fn api_key(&self) -> Result<String, ConfigError> {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.is_empty() {
                return Ok(key);
            }
        }
        self.llm
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }
}
