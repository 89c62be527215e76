//! Inputs and outcomes of controller operations

use std::time::Duration;

use crate::api::KnowledgeRequest;
use crate::chat_mode::{ChatMode, Persona};
use crate::config::{ChatConfig, Config};
use crate::error::{Result, RagchatError};

const EMPTY_KNOWLEDGE: &str = "Please enter a title and content";

/// Tuning knobs of a [`SessionController`](super::SessionController)
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// Delay between revealed characters; zero reveals without waiting
    pub reveal_interval: Duration,
    /// Source used for ingestion when the form leaves it blank
    pub default_source: String,
    /// Namespace used for ingestion when the form leaves it blank
    pub default_namespace: String,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            reveal_interval: Duration::from_millis(30),
            default_source: "manual".to_string(),
            default_namespace: "default".to_string(),
        }
    }
}

impl ControllerOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            reveal_interval: Duration::from_millis(config.chat.reveal_interval_ms),
            default_source: config.ingest.default_source.clone(),
            default_namespace: config.ingest.default_namespace.clone(),
        }
    }
}

/// One message to send, with its routing parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendRequest {
    pub text: String,
    pub mode: ChatMode,
    /// Only used by normal mode
    pub persona: Persona,
    /// Only used by RAG mode; empty means all namespaces
    pub namespace: String,
    pub top_k: u32,
    pub debug: bool,
}

impl SendRequest {
    /// A RAG request with the default parameters
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            mode: ChatMode::Rag,
            persona: Persona::General,
            namespace: String::new(),
            top_k: 3,
            debug: false,
        }
    }

    /// A request carrying the configured chat defaults
    pub fn from_config(text: impl Into<String>, chat: &ChatConfig) -> Self {
        Self {
            text: text.into(),
            mode: chat.mode(),
            persona: chat.persona(),
            namespace: chat.namespace.clone(),
            top_k: chat.top_k,
            debug: chat.debug,
        }
    }

    pub fn with_mode(mut self, mode: ChatMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_persona(mut self, persona: Persona) -> Self {
        self.persona = persona;
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// What became of a send attempt that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// A response is still pending; nothing was done
    Busy,
    /// The message was blank; nothing was done
    Empty,
    /// The request succeeded and the answer is being revealed
    Sent,
}

/// Contents of the knowledge ingestion form
///
/// Cleared by a successful ingestion, retained on failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestForm {
    pub title: String,
    pub content: String,
    pub source: String,
    pub namespace: String,
}

impl IngestForm {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Build the ingestion request, trimming every field
    ///
    /// Blank source and namespace fall back to the given defaults.
    ///
    /// # Errors
    ///
    /// Returns `RagchatError::Validation` if the title or content is blank
    pub fn to_request(&self, default_source: &str, default_namespace: &str) -> Result<KnowledgeRequest> {
        let title = self.title.trim();
        let content = self.content.trim();
        if title.is_empty() || content.is_empty() {
            return Err(RagchatError::Validation(EMPTY_KNOWLEDGE.to_string()).into());
        }

        let or_default = |value: &str, default: &str| match value.trim() {
            "" => default.to_string(),
            value => value.to_string(),
        };
        Ok(KnowledgeRequest {
            title: title.to_string(),
            content: content.to_string(),
            source: or_default(&self.source, default_source),
            namespace: or_default(&self.namespace, default_namespace),
        })
    }
}
