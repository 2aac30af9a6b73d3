//! Configuration management for tabchat.
//!
//! Handles loading configuration from a TOML file with environment-variable
//! fallbacks. CLI flags override both (applied in `main`).

use crate::error::{ChatError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// LLM settings.
    #[serde(default)]
    pub llm: LlmConfig,
}

/// LLM settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider: "ollama" or "mock".
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model name (e.g., "llama3:latest").
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the Ollama API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_provider() -> String {
    "ollama".to_string()
}

fn default_model() -> String {
    "llama3:latest".to_string()
}

fn default_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tabchat")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file. A missing file yields defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ChatError::config(format!("Failed to read config file: {e}")))?;

        let mut config: Config = toml::from_str(&content).map_err(|e| {
            ChatError::config(format!("Configuration error in {}:\n  {}", path.display(), e))
        })?;

        config.apply_env_defaults();
        Ok(config)
    }

    /// Applies `OLLAMA_URL` and `OLLAMA_MODEL` when the file left defaults.
    pub fn apply_env_defaults(&mut self) {
        if self.llm.base_url == default_base_url() {
            if let Ok(url) = std::env::var("OLLAMA_URL") {
                self.llm.base_url = url;
            }
        }
        if self.llm.model == default_model() {
            if let Ok(model) = std::env::var("OLLAMA_MODEL") {
                self.llm.model = model;
            }
        }
    }
}
