//! Chat backend client
//!
//! The [`ChatBackend`] trait is the seam between the session controller and
//! the HTTP API. [`HttpBackend`] talks to a real server; [`FakeBackend`]
//! keeps everything in memory for tests.

pub mod fake;
pub mod http;
pub mod types;

use async_trait::async_trait;

use crate::error::Result;

pub use fake::{BackendCall, FakeBackend};
pub use http::HttpBackend;
pub use types::{
    ChatMessage, ChatReply, ChatRequest, IngestReceipt, KnowledgeRequest, MessageRole,
    RagChatRequest, Session,
};

/// Operations the controller needs from the backend
///
/// Every method is a single request. Any non-2xx status or transport
/// failure is reported as `RagchatError::Backend`.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// `GET /api/sessions`
    async fn list_sessions(&self) -> Result<Vec<Session>>;

    /// `POST /api/sessions`
    async fn create_session(&self, name: &str) -> Result<Session>;

    /// `GET /api/sessions/{id}`
    async fn get_session(&self, id: &str) -> Result<Session>;

    /// `GET /api/sessions/{id}/messages`
    async fn get_messages(&self, id: &str) -> Result<Vec<ChatMessage>>;

    /// `PUT /api/sessions/{id}`
    async fn rename_session(&self, id: &str, name: &str) -> Result<()>;

    /// `DELETE /api/sessions/{id}`
    async fn delete_session(&self, id: &str) -> Result<()>;

    /// `POST /chat`
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply>;

    /// `POST /rag/chat`
    async fn rag_chat(&self, request: &RagChatRequest) -> Result<ChatReply>;

    /// `POST /rag/knowledge`
    async fn ingest_knowledge(&self, request: &KnowledgeRequest) -> Result<IngestReceipt>;
}
