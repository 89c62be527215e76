//! Wire types for the chat backend
//!
//! Field names follow the backend's JSON exactly. Lists the backend may send
//! as `null` are modeled as `Option<Vec<_>>` and flattened by accessors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Session summary as reported by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque, stable identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Number of persisted messages; only the list endpoint reports it
    #[serde(default)]
    pub message_count: u64,
    /// Creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

/// Author of a persisted message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
    #[serde(other)]
    Other,
}

/// A persisted chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Body of `POST /api/sessions` and `PUT /api/sessions/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionNameRequest {
    pub name: String,
}

/// Body of `POST /chat`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub role: String,
    pub session_id: String,
}

/// Body of `POST /rag/chat`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagChatRequest {
    pub query: String,
    pub mode: String,
    /// Omitted entirely when no namespace is selected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub top_k: u32,
    pub debug: bool,
}

/// Reply from either chat endpoint
///
/// Plain chat answers in `reply`, RAG chat in `answer`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hit_docs: Option<Vec<String>>,
    #[serde(default)]
    pub fallback: bool,
}

impl ChatReply {
    /// Plain chat reply
    pub fn plain(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
            ..Self::default()
        }
    }

    /// RAG reply
    pub fn rag(answer: impl Into<String>) -> Self {
        Self {
            answer: Some(answer.into()),
            mode: Some("rag".to_string()),
            ..Self::default()
        }
    }

    /// First non-empty of `reply` and `answer`
    pub fn text(&self) -> Option<&str> {
        [self.reply.as_deref(), self.answer.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
    }

    /// Titles of the documents the backend retrieved
    pub fn hit_docs(&self) -> &[String] {
        self.hit_docs.as_deref().unwrap_or_default()
    }
}

/// Body of `POST /rag/knowledge`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeRequest {
    pub title: String,
    pub content: String,
    pub source: String,
    pub namespace: String,
}

/// Response of `POST /rag/knowledge`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestReceipt {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunks: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knowledges: Option<Vec<serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl IngestReceipt {
    /// Number of stored chunks
    ///
    /// Uses `chunks` when it is non-zero, otherwise counts `knowledges`.
    pub fn chunk_count(&self) -> u64 {
        match self.chunks {
            Some(n) if n > 0 => n,
            _ => self.knowledges.as_ref().map_or(0, |k| k.len() as u64),
        }
    }
}

/// `{"sessions": [...]}`
#[derive(Debug, Deserialize)]
pub(crate) struct SessionsEnvelope {
    #[serde(default)]
    pub sessions: Option<Vec<Session>>,
}

/// `{"session": {...}}`
#[derive(Debug, Deserialize)]
pub(crate) struct SessionEnvelope {
    pub session: Session,
}

/// `{"messages": [...]}`
#[derive(Debug, Deserialize)]
pub(crate) struct MessagesEnvelope {
    #[serde(default)]
    pub messages: Option<Vec<ChatMessage>>,
}
