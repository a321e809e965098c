//! Configuration management for AIVA
//!
//! Parses TOML configuration files and provides typed access to settings.
//! Every section has sensible defaults, so the service runs with no config
//! file at all. The API key is never read from the file; it comes from the
//! environment variable named by `ai.api_key_env`.

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub breaker: BreakerConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

/// AI provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AiConfig {
    /// Model identifier passed to the provider
    #[serde(default = "default_model")]
    pub model: String,
    /// Provider base URL (overridable so tests can point at a local mock)
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Outbound request timeout; a timeout counts as a breaker failure
    #[serde(default = "default_ai_timeout")]
    pub request_timeout_seconds: u64,
    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            request_timeout_seconds: default_ai_timeout(),
            api_key_env: default_api_key_env(),
        }
    }
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_ai_timeout() -> u64 {
    30
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

/// Circuit breaker configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BreakerConfig {
    /// Consecutive failures before the circuit opens
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
    /// Seconds to wait before attempting a half-open trial call
    #[serde(default = "default_cooldown")]
    pub cooldown_seconds: u64,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: default_failure_threshold(),
            cooldown_seconds: default_cooldown(),
        }
    }
}

fn default_failure_threshold() -> u32 {
    3
}

fn default_cooldown() -> u64 {
    60
}

/// Static data file locations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataConfig {
    #[serde(default = "default_transactions_path")]
    pub transactions_path: String,
    #[serde(default = "default_knowledge_base_path")]
    pub knowledge_base_path: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            transactions_path: default_transactions_path(),
            knowledge_base_path: default_knowledge_base_path(),
        }
    }
}

fn default_transactions_path() -> String {
    "data/mock_transactions.json".to_string()
}

fn default_knowledge_base_path() -> String {
    "data/knowledge_base.json".to_string()
}

/// Observability configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from a TOML file, falling back to defaults when
    /// the file does not exist
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::info!(path = %path.display(), "No config file found, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse {}: {e}", path.display()))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field constraints not expressible in serde defaults
    pub fn validate(&self) -> AppResult<()> {
        if self.breaker.failure_threshold == 0 {
            return Err(AppError::Config(
                "breaker.failure_threshold must be at least 1".to_string(),
            ));
        }
        if self.breaker.cooldown_seconds == 0 {
            return Err(AppError::Config(
                "breaker.cooldown_seconds must be at least 1".to_string(),
            ));
        }
        if self.ai.request_timeout_seconds == 0 || self.ai.request_timeout_seconds > 300 {
            return Err(AppError::Config(
                "ai.request_timeout_seconds must be in range 1-300".to_string(),
            ));
        }
        Ok(())
    }
}
