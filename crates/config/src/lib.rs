//! Configuration loading, validation, and management for ragchat.
//!
//! Loads configuration from `~/.ragchat/config.toml` with environment
//! variable overrides. The agent section is validated both at load time and
//! again when a pipeline is built from it.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.ragchat/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Model, credentials and persona
    #[serde(default)]
    pub agent: AgentConfig,

    /// HTTP endpoint settings for the model provider
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Context store settings
    #[serde(default)]
    pub memory: MemoryConfig,
}

/// Settings that shape a single pipeline instance.
#[derive(Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Provider API key (required before a pipeline can be built)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model name sent with every request
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature, within [0, 1]
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Persona and ground rules sent as the first system message
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

pub const DEFAULT_MODEL: &str = "mixtral-8x7b-32768";

pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are a knowledgeable, careful AI assistant. Help the user accurately and clearly.

When answering:
- Use any provided context first and say so when you rely on it.
- Break complex requests into steps and verify your reasoning.
- Keep the level of detail appropriate to the question.
- If you are uncertain, say so; if the context is insufficient, ask for clarification.
- Respect user privacy and decline requests that are unsafe or unethical.";

fn default_model() -> String {
    DEFAULT_MODEL.into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.into()
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            temperature: default_temperature(),
            system_prompt: default_system_prompt(),
        }
    }
}

impl AgentConfig {
    /// Build a config with the given key and every other field defaulted.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// Check that the config can back a pipeline.
    ///
    /// A missing or blank key is reported as [`ConfigError::MissingApiKey`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key().is_none() {
            return Err(ConfigError::MissingApiKey);
        }

        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationError(format!(
                "agent.temperature must be between 0.0 and 1.0, got {}",
                self.temperature
            )));
        }

        if self.model.trim().is_empty() {
            return Err(ConfigError::ValidationError("agent.model must not be empty".into()));
        }

        Ok(())
    }

    /// The API key, if one is set and not blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentConfig")
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("system_prompt_len", &self.system_prompt.len())
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Label used in logs
    #[serde(default = "default_provider_name")]
    pub name: String,

    /// OpenAI-compatible base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// HTTP timeout for one completion call; 0 disables it
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Completion token cap
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_provider_name() -> String {
    "groq".into()
}
fn default_base_url() -> String {
    "https://api.groq.com/openai/v1".into()
}
fn default_timeout_secs() -> u64 {
    120
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: default_provider_name(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            max_tokens: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Bind a context store when the chat starts
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Files loaded into the store at startup
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub documents: Vec<PathBuf>,

    /// Snippets returned per query
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Chunk size in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters shared between consecutive chunks
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

fn default_true() -> bool {
    true
}
fn default_max_results() -> usize {
    4
}
fn default_chunk_size() -> usize {
    1000
}
fn default_chunk_overlap() -> usize {
    200
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            documents: vec![],
            max_results: default_max_results(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.ragchat/config.toml).
    ///
    /// Environment overrides:
    /// - `RAGCHAT_API_KEY`, then `GROQ_API_KEY`, fill a missing key
    /// - `RAGCHAT_MODEL` overrides the model
    /// - `RAGCHAT_BASE_URL` overrides the provider endpoint
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();
        let mut config = Self::read_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate_structure()?;
        Ok(config)
    }

    /// Load configuration from a specific file path, without env overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::read_from(path)?;
        config.validate_structure()?;
        Ok(config)
    }

    fn read_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Apply overrides from an environment lookup function.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.agent.api_key().is_none() {
            if let Some(key) = lookup("RAGCHAT_API_KEY").or_else(|| lookup("GROQ_API_KEY")) {
                self.agent.api_key = Some(key);
            }
        }

        if let Some(model) = lookup("RAGCHAT_MODEL") {
            self.agent.model = model;
        }

        if let Some(url) = lookup("RAGCHAT_BASE_URL") {
            self.provider.base_url = url;
        }
    }

    /// Validate everything except the presence of a key.
    ///
    /// A config file without a key is still loadable (the key may come from
    /// the environment or be added later); the key is required only when a
    /// pipeline is built.
    fn validate_structure(&self) -> Result<(), ConfigError> {
        match self.agent.validate() {
            Ok(()) | Err(ConfigError::MissingApiKey) => {}
            Err(e) => return Err(e),
        }

        if self.memory.chunk_size == 0 {
            return Err(ConfigError::ValidationError(
                "memory.chunk_size must be > 0".into(),
            ));
        }

        if self.memory.chunk_overlap >= self.memory.chunk_size {
            return Err(ConfigError::ValidationError(
                "memory.chunk_overlap must be smaller than memory.chunk_size".into(),
            ));
        }

        if self.memory.max_results == 0 {
            return Err(ConfigError::ValidationError(
                "memory.max_results must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".ragchat")
    }

    /// Get the configuration file path.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Generate a default config TOML string (for `ragchat config`).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("API key is not configured")]
    MissingApiKey,

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
