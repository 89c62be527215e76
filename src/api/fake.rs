//! In-process fake backend for controller unit and integration tests
//!
//! [`FakeBackend`] implements [`ChatBackend`] over an in-memory session
//! store. Tests can script replies, make individual calls fail, delay calls
//! to force out-of-order completions, and inspect which requests were made.
//!
//! # Example
//!
//! ```
//! use ragchat::api::{BackendCall, ChatBackend, FakeBackend};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let backend = FakeBackend::new();
//! let session = backend.create_session("first").await.unwrap();
//! assert_eq!(backend.list_sessions().await.unwrap()[0].id, session.id);
//!
//! backend.fail(BackendCall::ListSessions);
//! assert!(backend.list_sessions().await.is_err());
//! assert_eq!(backend.count(BackendCall::ListSessions), 2);
//! # }
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::api::types::{
    ChatMessage, ChatReply, ChatRequest, IngestReceipt, KnowledgeRequest, RagChatRequest, Session,
};
use crate::api::ChatBackend;
use crate::error::{Result, RagchatError};

/// Identifies one backend operation, for failure injection and call counting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendCall {
    ListSessions,
    CreateSession,
    GetSession,
    GetMessages,
    RenameSession,
    DeleteSession,
    Chat,
    RagChat,
    IngestKnowledge,
}

#[derive(Debug, Default)]
struct FakeState {
    sessions: Vec<Session>,
    messages: HashMap<String, Vec<ChatMessage>>,
    next_id: u64,
    calls: Vec<BackendCall>,
    failing: HashSet<BackendCall>,
    call_delays: HashMap<BackendCall, Duration>,
    session_delays: HashMap<String, Duration>,
    rag_reply: Option<ChatReply>,
    chat_reply: Option<ChatReply>,
    chat_requests: Vec<ChatRequest>,
    rag_requests: Vec<RagChatRequest>,
    knowledge_requests: Vec<KnowledgeRequest>,
}

/// In-memory [`ChatBackend`]
///
/// Plain chat persists both sides of the exchange in the addressed session,
/// like the real server. RAG chat is stateless. Unless a reply is scripted,
/// the assistant answers `"echo: <message>"`.
#[derive(Debug, Default)]
pub struct FakeBackend {
    state: Mutex<FakeState>,
}

impl FakeBackend {
    /// Create an empty fake backend
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Seed a session directly, bypassing call recording
    pub fn insert_session(&self, id: &str, name: &str) -> Session {
        let session = Session {
            id: id.to_string(),
            name: name.to_string(),
            message_count: 0,
            created_at: Some(Utc::now()),
            updated_at: Utc::now(),
        };
        let mut state = self.lock();
        state.sessions.insert(0, session.clone());
        state.messages.entry(id.to_string()).or_default();
        session
    }

    /// Seed persisted messages for a session
    pub fn insert_messages(&self, id: &str, messages: Vec<ChatMessage>) {
        let mut state = self.lock();
        let count = messages.len() as u64;
        state
            .messages
            .entry(id.to_string())
            .or_default()
            .extend(messages);
        if let Some(session) = state.sessions.iter_mut().find(|s| s.id == id) {
            session.message_count += count;
        }
    }

    /// Make every subsequent `call` fail with HTTP 500
    pub fn fail(&self, call: BackendCall) {
        self.lock().failing.insert(call);
    }

    /// Undo [`FakeBackend::fail`]
    pub fn recover(&self, call: BackendCall) {
        self.lock().failing.remove(&call);
    }

    /// Delay every subsequent `call` before it is answered
    pub fn set_delay(&self, call: BackendCall, delay: Duration) {
        self.lock().call_delays.insert(call, delay);
    }

    /// Delay `get_session` and `get_messages` for one session id
    pub fn set_session_delay(&self, id: &str, delay: Duration) {
        self.lock().session_delays.insert(id.to_string(), delay);
    }

    /// Script the reply of `/chat`
    pub fn set_chat_reply(&self, reply: ChatReply) {
        self.lock().chat_reply = Some(reply);
    }

    /// Script the reply of `/rag/chat`
    pub fn set_rag_reply(&self, reply: ChatReply) {
        self.lock().rag_reply = Some(reply);
    }

    /// All calls made so far, in order
    pub fn calls(&self) -> Vec<BackendCall> {
        self.lock().calls.clone()
    }

    /// Number of times `call` was made
    pub fn count(&self, call: BackendCall) -> usize {
        self.lock().calls.iter().filter(|c| **c == call).count()
    }

    /// Plain chat requests received
    pub fn chat_requests(&self) -> Vec<ChatRequest> {
        self.lock().chat_requests.clone()
    }

    /// RAG chat requests received
    pub fn rag_requests(&self) -> Vec<RagChatRequest> {
        self.lock().rag_requests.clone()
    }

    /// Knowledge ingestion requests received
    pub fn knowledge_requests(&self) -> Vec<KnowledgeRequest> {
        self.lock().knowledge_requests.clone()
    }

    /// Server-side snapshot of the session store
    pub fn stored_sessions(&self) -> Vec<Session> {
        self.lock().sessions.clone()
    }

    /// Records the call, waits out any configured delay, then reports
    /// whether the call is set to fail.
    async fn enter(&self, call: BackendCall, session_id: Option<&str>) -> Result<()> {
        let delay = {
            let mut state = self.lock();
            state.calls.push(call);
            let by_call = state.call_delays.get(&call).copied();
            let by_session = session_id.and_then(|id| state.session_delays.get(id).copied());
            by_session.or(by_call)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.lock().failing.contains(&call) {
            return Err(RagchatError::from_status(500, r#"{"error":"injected failure"}"#).into());
        }
        Ok(())
    }

    fn not_found(id: &str) -> anyhow::Error {
        RagchatError::from_status(404, &format!(r#"{{"error":"session not found: {}"}}"#, id))
            .into()
    }
}

#[async_trait]
impl ChatBackend for FakeBackend {
    async fn list_sessions(&self) -> Result<Vec<Session>> {
        self.enter(BackendCall::ListSessions, None).await?;
        Ok(self.lock().sessions.clone())
    }

    async fn create_session(&self, name: &str) -> Result<Session> {
        self.enter(BackendCall::CreateSession, None).await?;
        let mut state = self.lock();
        state.next_id += 1;
        let now = Utc::now();
        let session = Session {
            id: format!("session-{}", state.next_id),
            name: name.to_string(),
            message_count: 0,
            created_at: Some(now),
            updated_at: now,
        };
        state.sessions.insert(0, session.clone());
        state.messages.insert(session.id.clone(), Vec::new());
        Ok(session)
    }

    async fn get_session(&self, id: &str) -> Result<Session> {
        self.enter(BackendCall::GetSession, Some(id)).await?;
        self.lock()
            .sessions
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| Self::not_found(id))
    }

    async fn get_messages(&self, id: &str) -> Result<Vec<ChatMessage>> {
        self.enter(BackendCall::GetMessages, Some(id)).await?;
        self.lock()
            .messages
            .get(id)
            .cloned()
            .ok_or_else(|| Self::not_found(id))
    }

    async fn rename_session(&self, id: &str, name: &str) -> Result<()> {
        self.enter(BackendCall::RenameSession, Some(id)).await?;
        let mut state = self.lock();
        let session = state
            .sessions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| Self::not_found(id))?;
        session.name = name.to_string();
        session.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_session(&self, id: &str) -> Result<()> {
        self.enter(BackendCall::DeleteSession, Some(id)).await?;
        let mut state = self.lock();
        let before = state.sessions.len();
        state.sessions.retain(|s| s.id != id);
        if state.sessions.len() == before {
            return Err(Self::not_found(id));
        }
        state.messages.remove(id);
        Ok(())
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply> {
        self.enter(BackendCall::Chat, None).await?;
        let mut state = self.lock();
        state.chat_requests.push(request.clone());

        let reply = state
            .chat_reply
            .clone()
            .unwrap_or_else(|| ChatReply::plain(format!("echo: {}", request.message)));
        let answer = reply.text().unwrap_or_default().to_string();

        let session = state
            .sessions
            .iter_mut()
            .find(|s| s.id == request.session_id)
            .ok_or_else(|| Self::not_found(&request.session_id))?;
        session.message_count += 2;
        session.updated_at = Utc::now();

        let history = state.messages.entry(request.session_id.clone()).or_default();
        history.push(ChatMessage::user(request.message.clone()));
        history.push(ChatMessage::assistant(answer));

        Ok(ChatReply {
            session_id: Some(request.session_id.clone()),
            ..reply
        })
    }

    async fn rag_chat(&self, request: &RagChatRequest) -> Result<ChatReply> {
        self.enter(BackendCall::RagChat, None).await?;
        let mut state = self.lock();
        state.rag_requests.push(request.clone());
        Ok(state
            .rag_reply
            .clone()
            .unwrap_or_else(|| ChatReply::rag(format!("echo: {}", request.query))))
    }

    async fn ingest_knowledge(&self, request: &KnowledgeRequest) -> Result<IngestReceipt> {
        self.enter(BackendCall::IngestKnowledge, None).await?;
        let mut state = self.lock();
        state.knowledge_requests.push(request.clone());
        let chunks = ((request.content.len() + 499) / 500).max(1) as u64;
        Ok(IngestReceipt {
            chunks: Some(chunks),
            knowledges: None,
            message: Some("ingested".to_string()),
        })
    }
}
