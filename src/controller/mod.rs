//! Session view controller
//!
//! [`SessionController`] owns the client-side view of the backend: the cached
//! session list, the active-session pointer, the visible transcript and the
//! single-flight flag that allows one outstanding chat request at a time.
//!
//! Every operation follows the same shape: update local state, issue one
//! request, update local state again with the outcome. State lives behind a
//! mutex that is never held across an `.await`, so a rename or delete can
//! interleave with a pending chat reply; the last writer wins on the cache.
//!
//! # Stale responses
//!
//! Each [`SessionController::switch_session`] draws a sequence number and its
//! responses are applied only while no later switch has started. A chat reply
//! whose transcript was replaced in the meantime is dropped from view.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use ragchat::api::FakeBackend;
//! use ragchat::controller::{ControllerOptions, SendRequest, SessionController};
//! use ragchat::view::RecordingPresenter;
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let options = ControllerOptions {
//!     reveal_interval: Duration::ZERO,
//!     ..ControllerOptions::default()
//! };
//! let controller = SessionController::new(
//!     Arc::new(FakeBackend::new()),
//!     Arc::new(RecordingPresenter::new()),
//!     options,
//! );
//!
//! controller.mount().await?;
//! controller.send_message(SendRequest::new("hello")).await?;
//! controller.wait_idle().await;
//! assert_eq!(controller.transcript().len(), 2);
//! # Ok(())
//! # }
//! ```

mod request;
mod reveal;
pub mod transcript;

pub use request::{ControllerOptions, IngestForm, SendOutcome, SendRequest};
pub use transcript::{EntryKind, EntryState, Transcript, TranscriptEntry};

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Local, Utc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::api::{ChatBackend, ChatRequest, RagChatRequest, Session};
use crate::chat_mode::ChatMode;
use crate::error::{is_validation, Result, RagchatError};
use crate::view::{
    render_session_list, render_transcript, window_title, Dialog, Presenter, SessionListView,
    TranscriptView,
};

/// Assistant text shown when a request failed or the reply was empty
pub const FAILED_REPLY: &str = "Something went wrong, please try again later";
/// Prefix of the debug line listing retrieved documents
pub const HIT_DOCS_PREFIX: &str = "Hit documents: ";
/// System line appended when RAG found nothing and answered as plain chat
pub const FALLBACK_NOTICE: &str = "Notice: no knowledge base hit, fell back to plain chat.";

const NO_SESSION: &str = "Please create or select a session first";
const EMPTY_NAME: &str = "Please enter a session name";

/// Name given to sessions created without one
pub fn default_session_name(now: DateTime<Local>) -> String {
    format!("New chat {}", now.format("%m-%d %H:%M"))
}

#[derive(Debug, Default)]
struct ControllerState {
    sessions: Vec<Session>,
    current: Option<Session>,
    transcript: Transcript,
    title: String,
    waiting: bool,
    switch_seq: u64,
    reveal: Option<JoinHandle<()>>,
}

impl ControllerState {
    fn current_id(&self) -> Option<&str> {
        self.current.as_ref().map(|s| s.id.as_str())
    }
}

struct Shared {
    backend: Arc<dyn ChatBackend>,
    presenter: Arc<dyn Presenter>,
    options: ControllerOptions,
    state: Mutex<ControllerState>,
    shutdown: CancellationToken,
}

/// Client-side controller for sessions and the active conversation
///
/// Cloning is cheap and every clone drives the same state, the way several
/// UI event handlers share one page.
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<Shared>,
}

impl SessionController {
    /// Create a controller with an empty cache and no active session
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        presenter: Arc<dyn Presenter>,
        options: ControllerOptions,
    ) -> Self {
        let state = ControllerState {
            title: window_title(None),
            ..ControllerState::default()
        };
        Self {
            inner: Arc::new(Shared {
                backend,
                presenter,
                options,
                state: Mutex::new(state),
                shutdown: CancellationToken::new(),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, ControllerState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn backend(&self) -> &dyn ChatBackend {
        self.inner.backend.as_ref()
    }

    fn presenter(&self) -> &dyn Presenter {
        self.inner.presenter.as_ref()
    }

    // ------------------------------------------------------------------
    // Read accessors
    // ------------------------------------------------------------------

    /// Cached session list, newest first
    pub fn sessions(&self) -> Vec<Session> {
        self.state().sessions.clone()
    }

    pub fn current_session_id(&self) -> Option<String> {
        self.state().current_id().map(str::to_string)
    }

    /// Detail of the active session as fetched on the last switch
    pub fn current_session(&self) -> Option<Session> {
        self.state().current.clone()
    }

    pub fn transcript(&self) -> Transcript {
        self.state().transcript.clone()
    }

    pub fn title(&self) -> String {
        self.state().title.clone()
    }

    /// True while a chat response is pending or being revealed
    pub fn is_waiting(&self) -> bool {
        self.state().waiting
    }

    pub fn session_list_view(&self) -> SessionListView {
        let state = self.state();
        render_session_list(&state.sessions, state.current_id())
    }

    pub fn transcript_view(&self) -> TranscriptView {
        render_transcript(&self.state().transcript)
    }

    // ------------------------------------------------------------------
    // Presentation helpers
    // ------------------------------------------------------------------

    fn publish_sessions(&self) {
        let view = self.session_list_view();
        self.presenter().sessions_changed(&view);
    }

    fn publish_transcript(&self) {
        let view = self.transcript_view();
        self.presenter().transcript_changed(&view);
    }

    fn set_title(&self, session_name: Option<&str>) {
        let title = window_title(session_name);
        self.state().title = title.clone();
        self.presenter().title_changed(&title);
    }

    /// Surface a failed user action
    fn report(&self, action: &str, err: &anyhow::Error) {
        if is_validation(err) {
            self.presenter().alert(&err.to_string());
        } else {
            tracing::error!("{}: {}", action, err);
            self.presenter().alert(&format!("{}: {}", action, err));
        }
    }

    fn reject(&self, message: &str) -> anyhow::Error {
        let err: anyhow::Error = RagchatError::Validation(message.to_string()).into();
        self.report("", &err);
        err
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Initial load: fetch the session list, then start a fresh session
    ///
    /// # Errors
    ///
    /// Returns error if the new session cannot be created. A failed list
    /// load is only logged.
    pub async fn mount(&self) -> Result<()> {
        tracing::info!("Mounting session view");
        // Background refresh: already logged, the stale list stays.
        let _ = self.load_sessions().await;
        self.create_session().await?;
        Ok(())
    }

    /// Tear down: stop a running reveal and release the single-flight flag
    pub async fn shutdown(&self) {
        tracing::info!("Shutting down session view");
        self.inner.shutdown.cancel();
        self.wait_idle().await;
        self.state().waiting = false;
    }

    /// Wait until a running answer reveal has finished
    pub async fn wait_idle(&self) {
        let task = self.state().reveal.take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                tracing::warn!("Answer reveal task failed: {}", e);
            }
        }
    }

    // ------------------------------------------------------------------
    // Sessions
    // ------------------------------------------------------------------

    /// Fetch all session summaries and replace the cache
    ///
    /// This is a background refresh: failures are logged, not surfaced,
    /// and the cached list is left as it was.
    ///
    /// # Errors
    ///
    /// Returns the backend error so callers can tell the refresh failed
    pub async fn load_sessions(&self) -> Result<()> {
        match self.backend().list_sessions().await {
            Ok(sessions) => {
                tracing::debug!("Loaded {} sessions", sessions.len());
                self.state().sessions = sessions;
                self.publish_sessions();
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Failed to load sessions: {}", e);
                Err(e)
            }
        }
    }

    /// Create a session with a timestamped default name and switch to it
    ///
    /// # Errors
    ///
    /// Returns error if creation or the following switch fails
    pub async fn create_session(&self) -> Result<Session> {
        self.create_named_session(&default_session_name(Local::now()))
            .await
    }

    /// Create a session with the given name and switch to it
    ///
    /// # Errors
    ///
    /// Returns `RagchatError::Validation` for a blank name, or the backend
    /// error if creation or the following switch fails
    pub async fn create_named_session(&self, name: &str) -> Result<Session> {
        let name = name.trim();
        if name.is_empty() {
            return Err(self.reject(EMPTY_NAME));
        }

        let session = match self.backend().create_session(name).await {
            Ok(session) => session,
            Err(e) => {
                self.report("Failed to create session", &e);
                return Err(e);
            }
        };
        tracing::info!("Created session {} ({})", session.id, session.name);

        {
            let mut state = self.state();
            state.sessions.retain(|s| s.id != session.id);
            state.sessions.insert(0, session.clone());
            state.transcript.clear();
        }
        self.publish_sessions();
        self.publish_transcript();

        self.switch_session(&session.id).await?;
        Ok(session)
    }

    /// Make `id` the active session and load its transcript
    ///
    /// Switching to the already active session re-fetches and re-renders.
    ///
    /// # Errors
    ///
    /// Returns error if the session detail cannot be fetched. A failed
    /// message fetch is only logged and leaves the transcript as it was.
    pub async fn switch_session(&self, id: &str) -> Result<()> {
        let seq = {
            let mut state = self.state();
            state.switch_seq += 1;
            state.switch_seq
        };
        tracing::debug!("Switching to session {} (switch #{})", id, seq);

        let session = match self.backend().get_session(id).await {
            Ok(session) => session,
            Err(e) => {
                if self.is_stale(seq) {
                    tracing::debug!("Ignoring failed superseded switch to {}: {}", id, e);
                } else {
                    self.report("Failed to switch session", &e);
                }
                return Err(e);
            }
        };

        {
            let mut state = self.state();
            if state.switch_seq != seq {
                tracing::debug!("Discarding stale session detail for {}", id);
                return Ok(());
            }
            state.current = Some(session.clone());
        }
        self.publish_sessions();

        match self.backend().get_messages(id).await {
            Ok(messages) => {
                {
                    let mut state = self.state();
                    if state.switch_seq != seq {
                        tracing::debug!("Discarding stale messages for {}", id);
                        return Ok(());
                    }
                    state.transcript.replace_with(&messages);
                }
                self.publish_transcript();
                self.presenter().scroll_to_bottom();
            }
            Err(e) => {
                tracing::warn!("Failed to load messages for session {}: {}", id, e);
                if self.is_stale(seq) {
                    return Ok(());
                }
            }
        }

        self.set_title(Some(&session.name));
        Ok(())
    }

    fn is_stale(&self, seq: u64) -> bool {
        self.state().switch_seq != seq
    }

    /// Rename a session
    ///
    /// On success only that cache entry's name and timestamp change.
    ///
    /// # Errors
    ///
    /// Returns `RagchatError::Validation` for a blank name, or the backend
    /// error; the cache is unchanged on failure
    pub async fn rename_session(&self, id: &str, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(self.reject(EMPTY_NAME));
        }

        if let Err(e) = self.backend().rename_session(id, name).await {
            self.report("Failed to rename session", &e);
            return Err(e);
        }
        tracing::info!("Renamed session {} to {}", id, name);

        let is_current = {
            let mut state = self.state();
            if let Some(session) = state.sessions.iter_mut().find(|s| s.id == id) {
                session.name = name.to_string();
                session.updated_at = Utc::now();
            }
            let is_current = match state.current.as_mut() {
                Some(current) if current.id == id => {
                    current.name = name.to_string();
                    true
                }
                _ => false,
            };
            is_current
        };

        if is_current {
            self.set_title(Some(name));
        }
        self.publish_sessions();
        self.presenter().close_dialog(Dialog::Rename);
        Ok(())
    }

    /// Delete a session
    ///
    /// Deleting the active session starts a new one in its place.
    ///
    /// # Errors
    ///
    /// Returns the backend error of the delete, or of creating the
    /// replacement session
    pub async fn delete_session(&self, id: &str) -> Result<()> {
        if let Err(e) = self.backend().delete_session(id).await {
            self.report("Failed to delete session", &e);
            return Err(e);
        }
        tracing::info!("Deleted session {}", id);

        let was_current = {
            let mut state = self.state();
            state.sessions.retain(|s| s.id != id);
            let was_current = state.current_id() == Some(id);
            if was_current {
                state.current = None;
                state.transcript.clear();
            }
            was_current
        };
        self.presenter().close_dialog(Dialog::Delete);

        if was_current {
            self.publish_transcript();
            self.set_title(None);
            self.create_session().await?;
        } else {
            self.publish_sessions();
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Chat
    // ------------------------------------------------------------------

    /// Send a message in the active session
    ///
    /// Returns [`SendOutcome::Busy`] without touching anything while an
    /// earlier response is pending, and [`SendOutcome::Empty`] for blank
    /// text. On success the answer keeps revealing after this returns; the
    /// single-flight flag is released when the reveal ends.
    ///
    /// # Errors
    ///
    /// Returns `RagchatError::Validation` when no session is active, or the
    /// backend error of the chat request
    pub async fn send_message(&self, request: SendRequest) -> Result<SendOutcome> {
        let text = request.text.trim().to_string();

        let (session_id, placeholder) = {
            let mut state = self.state();
            if state.waiting {
                tracing::debug!("Ignoring message while a response is pending");
                return Ok(SendOutcome::Busy);
            }
            if text.is_empty() {
                return Ok(SendOutcome::Empty);
            }
            let Some(session_id) = state.current_id().map(str::to_string) else {
                drop(state);
                return Err(self.reject(NO_SESSION));
            };

            state
                .transcript
                .push(TranscriptEntry::settled(EntryKind::User, text.clone()));
            let placeholder = state.transcript.push(TranscriptEntry {
                kind: EntryKind::Assistant,
                text: String::new(),
                state: EntryState::Pending,
            });
            state.waiting = true;
            (session_id, placeholder)
        };
        self.publish_transcript();
        self.presenter().scroll_to_bottom();

        let result = match request.mode {
            ChatMode::Rag => {
                let body = RagChatRequest {
                    query: text,
                    mode: ChatMode::Rag.as_str().to_string(),
                    namespace: Some(request.namespace.trim().to_string()).filter(|ns| !ns.is_empty()),
                    top_k: request.top_k,
                    debug: request.debug,
                };
                tracing::debug!("Sending RAG query in session {}", session_id);
                self.backend().rag_chat(&body).await
            }
            ChatMode::Normal => {
                let body = ChatRequest {
                    message: text,
                    role: request.persona.as_str().to_string(),
                    session_id: session_id.clone(),
                };
                tracing::debug!("Sending chat message in session {}", session_id);
                self.backend().chat(&body).await
            }
        };

        let reply = match result {
            Ok(reply) => reply,
            Err(e) => {
                {
                    let mut state = self.state();
                    if let Some(entry) = state.transcript.get_mut(placeholder) {
                        entry.text = FAILED_REPLY.to_string();
                        entry.state = EntryState::Settled;
                    }
                    state.waiting = false;
                }
                self.publish_transcript();
                self.report("Failed to send message", &e);
                return Err(e);
            }
        };

        let answer = reply.text().unwrap_or(FAILED_REPLY).to_string();
        let is_rag = request.mode == ChatMode::Rag;
        let live = {
            let mut state = self.state();
            let live = state.transcript.is_live(placeholder);
            if let Some(entry) = state.transcript.get_mut(placeholder) {
                entry.text.clear();
                entry.state = EntryState::Revealing;
            }
            if live {
                if is_rag && request.debug && !reply.hit_docs().is_empty() {
                    let line = format!("{}{}", HIT_DOCS_PREFIX, reply.hit_docs().join(" | "));
                    state
                        .transcript
                        .push(TranscriptEntry::settled(EntryKind::System, line));
                }
                if is_rag && reply.fallback {
                    state
                        .transcript
                        .push(TranscriptEntry::settled(EntryKind::System, FALLBACK_NOTICE));
                }
            } else {
                tracing::debug!("Transcript replaced while waiting; dropping reply from view");
                state.waiting = false;
            }
            live
        };
        self.publish_transcript();

        if live {
            self.start_reveal(placeholder, answer);
        }

        // Background refresh for counts and timestamps; failures are logged.
        let _ = self.load_sessions().await;
        Ok(SendOutcome::Sent)
    }

    // ------------------------------------------------------------------
    // Knowledge
    // ------------------------------------------------------------------

    /// Ingest the form's document into the knowledge base
    ///
    /// Blank source and namespace fall back to the configured defaults. On
    /// success the chunk count is reported and the form is cleared.
    ///
    /// # Errors
    ///
    /// Returns `RagchatError::Validation` for a blank title or content
    /// without issuing a request, or the backend error; the form is kept on
    /// failure
    pub async fn ingest_knowledge(&self, form: &mut IngestForm) -> Result<u64> {
        let options = &self.inner.options;
        let request = match form.to_request(&options.default_source, &options.default_namespace) {
            Ok(request) => request,
            Err(e) => {
                self.report("Failed to ingest knowledge", &e);
                return Err(e);
            }
        };

        match self.backend().ingest_knowledge(&request).await {
            Ok(receipt) => {
                let chunks = receipt.chunk_count();
                tracing::info!(
                    "Ingested '{}' into namespace {}: {} chunks",
                    request.title,
                    request.namespace,
                    chunks
                );
                self.presenter()
                    .alert(&format!("Ingested, chunks: {}", chunks));
                form.clear();
                Ok(chunks)
            }
            Err(e) => {
                self.report("Failed to ingest knowledge", &e);
                Err(e)
            }
        }
    }
}
