//! Configuration management for ragchat
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::chat_mode::{ChatMode, Persona};
use crate::error::{Result, RagchatError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for ragchat
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Chat backend connection settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Defaults for outgoing chat messages
    #[serde(default)]
    pub chat: ChatConfig,
    /// Defaults for knowledge ingestion
    #[serde(default)]
    pub ingest: IngestConfig,
}

/// Chat backend connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the backend, e.g. `http://localhost:8080`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Optional per-request timeout in seconds
    ///
    /// Unset means requests wait until the transport gives up.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: None,
        }
    }
}

/// Defaults applied to every message sent from the client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Default chat mode: "rag" or "normal"
    #[serde(default = "default_chat_mode")]
    pub default_mode: String,

    /// Persona sent with plain chat requests
    #[serde(default = "default_role")]
    pub default_role: String,

    /// Knowledge namespace for RAG queries; empty searches all namespaces
    #[serde(default)]
    pub namespace: String,

    /// Number of documents the backend retrieves for RAG queries
    #[serde(default = "default_top_k")]
    pub top_k: u32,

    /// Ask the backend to report which documents it hit
    #[serde(default)]
    pub debug: bool,

    /// Delay between revealed characters of an answer
    #[serde(default = "default_reveal_interval_ms")]
    pub reveal_interval_ms: u64,
}

fn default_chat_mode() -> String {
    "rag".to_string()
}

fn default_role() -> String {
    "general".to_string()
}

fn default_top_k() -> u32 {
    3
}

fn default_reveal_interval_ms() -> u64 {
    30
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            default_mode: default_chat_mode(),
            default_role: default_role(),
            namespace: String::new(),
            top_k: default_top_k(),
            debug: false,
            reveal_interval_ms: default_reveal_interval_ms(),
        }
    }
}

impl ChatConfig {
    /// Parsed default chat mode, falling back to RAG
    pub fn mode(&self) -> ChatMode {
        ChatMode::parse_str(&self.default_mode).unwrap_or_default()
    }

    /// Parsed default persona, falling back to the general assistant
    pub fn persona(&self) -> Persona {
        Persona::parse_str(&self.default_role).unwrap_or_default()
    }
}

/// Defaults for knowledge ingestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Source label used when none is given
    #[serde(default = "default_ingest_source")]
    pub default_source: String,

    /// Namespace used when none is given
    #[serde(default = "default_ingest_namespace")]
    pub default_namespace: String,
}

fn default_ingest_source() -> String {
    "manual".to_string()
}

fn default_ingest_namespace() -> String {
    "default".to_string()
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            default_source: default_ingest_source(),
            default_namespace: default_ingest_namespace(),
        }
    }
}

/// Largest `top_k` the client will send
pub const MAX_TOP_K: u32 = 50;

/// Upper bound for the reveal interval
pub const MAX_REVEAL_INTERVAL_MS: u64 = 1000;

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// A missing file is not an error: defaults are used and a warning is
    /// logged.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            RagchatError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        let config: Config = serde_yaml::from_str(&contents)
            .map_err(|e| RagchatError::Config(format!("Failed to parse config file: {}", e)))?;
        Ok(config)
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var("RAGCHAT_BASE_URL") {
            self.server.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("RAGCHAT_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.server.timeout_seconds = Some(value);
            } else {
                tracing::warn!("Invalid RAGCHAT_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(mode) = std::env::var("RAGCHAT_MODE") {
            self.chat.default_mode = mode;
        }

        if let Ok(role) = std::env::var("RAGCHAT_ROLE") {
            self.chat.default_role = role;
        }

        if let Ok(namespace) = std::env::var("RAGCHAT_NAMESPACE") {
            self.chat.namespace = namespace;
        }

        if let Ok(top_k) = std::env::var("RAGCHAT_TOP_K") {
            if let Ok(value) = top_k.parse() {
                self.chat.top_k = value;
            } else {
                tracing::warn!("Invalid RAGCHAT_TOP_K: {}", top_k);
            }
        }

        if let Ok(flag) = std::env::var("RAGCHAT_DEBUG") {
            match flag.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.chat.debug = true,
                "0" | "false" | "no" | "off" => self.chat.debug = false,
                _ => tracing::warn!("Invalid RAGCHAT_DEBUG: {}", flag),
            }
        }

        if let Ok(interval) = std::env::var("RAGCHAT_REVEAL_INTERVAL_MS") {
            if let Ok(value) = interval.parse() {
                self.chat.reveal_interval_ms = value;
            } else {
                tracing::warn!("Invalid RAGCHAT_REVEAL_INTERVAL_MS: {}", interval);
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(server) = &cli.server {
            self.server.base_url = server.clone();
        }
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns `RagchatError::Config` describing the first invalid field
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.server.base_url).map_err(|e| {
            RagchatError::Config(format!(
                "Invalid server.base_url {}: {}",
                self.server.base_url, e
            ))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(RagchatError::Config(format!(
                "server.base_url must use http or https, got {}",
                url.scheme()
            ))
            .into());
        }

        if self.server.timeout_seconds == Some(0) {
            return Err(RagchatError::Config(
                "server.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        ChatMode::parse_str(&self.chat.default_mode).map_err(RagchatError::Config)?;
        Persona::parse_str(&self.chat.default_role).map_err(RagchatError::Config)?;

        if self.chat.top_k == 0 || self.chat.top_k > MAX_TOP_K {
            return Err(RagchatError::Config(format!(
                "chat.top_k must be between 1 and {}",
                MAX_TOP_K
            ))
            .into());
        }

        if self.chat.reveal_interval_ms > MAX_REVEAL_INTERVAL_MS {
            return Err(RagchatError::Config(format!(
                "chat.reveal_interval_ms must be at most {}",
                MAX_REVEAL_INTERVAL_MS
            ))
            .into());
        }

        if self.ingest.default_source.trim().is_empty()
            || self.ingest.default_namespace.trim().is_empty()
        {
            return Err(RagchatError::Config(
                "ingest defaults must not be empty".to_string(),
            )
            .into());
        }

        Ok(())
    }
}
