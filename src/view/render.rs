//! Pure render functions
//!
//! These turn controller state into plain view models. They do no I/O and
//! never interpret names or message text as markup.

use chrono::{DateTime, Local, Utc};

use crate::api::Session;
use crate::controller::transcript::{EntryKind, EntryState, Transcript};

/// Prefix of user lines
pub const USER_PREFIX: &str = "You: ";
/// Prefix of assistant lines
pub const ASSISTANT_PREFIX: &str = "AI: ";
/// Text of the assistant placeholder while a request is outstanding
pub const PENDING_TEXT: &str = "typing...";
/// Window title when no session is active
pub const APP_TITLE: &str = "AI Chat Assistant";

/// One row of the session sidebar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRow {
    pub id: String,
    pub name: String,
    pub message_count_label: String,
    pub updated_label: String,
    pub active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionListView {
    pub rows: Vec<SessionRow>,
}

impl SessionListView {
    pub fn active_row(&self) -> Option<&SessionRow> {
        self.rows.iter().find(|r| r.active)
    }
}

/// One rendered transcript line, prefix included
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptLine {
    pub kind: EntryKind,
    pub state: EntryState,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscriptView {
    /// Changes whenever the transcript was replaced rather than appended to
    pub generation: u64,
    pub lines: Vec<TranscriptLine>,
}

/// Format a timestamp as `MM-DD HH:MM` in local time
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%m-%d %H:%M").to_string()
}

/// Render the session sidebar
pub fn render_session_list(sessions: &[Session], current: Option<&str>) -> SessionListView {
    let rows = sessions
        .iter()
        .map(|session| SessionRow {
            id: session.id.clone(),
            name: session.name.clone(),
            message_count_label: match session.message_count {
                1 => "1 message".to_string(),
                n => format!("{} messages", n),
            },
            updated_label: format_timestamp(session.updated_at),
            active: current == Some(session.id.as_str()),
        })
        .collect();
    SessionListView { rows }
}

/// Render the transcript
pub fn render_transcript(transcript: &Transcript) -> TranscriptView {
    let lines = transcript
        .entries()
        .iter()
        .map(|entry| {
            let text = match (entry.kind, entry.state) {
                (EntryKind::User, _) => format!("{}{}", USER_PREFIX, entry.text),
                (EntryKind::Assistant, EntryState::Pending) => {
                    format!("{}{}", ASSISTANT_PREFIX, PENDING_TEXT)
                }
                (EntryKind::Assistant, _) => format!("{}{}", ASSISTANT_PREFIX, entry.text),
                (EntryKind::System, _) => entry.text.clone(),
            };
            TranscriptLine {
                kind: entry.kind,
                state: entry.state,
                text,
            }
        })
        .collect();
    TranscriptView {
        generation: transcript.generation(),
        lines,
    }
}

/// Window title for the active session
pub fn window_title(session_name: Option<&str>) -> String {
    match session_name {
        Some(name) => format!("{} - {}", name, APP_TITLE),
        None => APP_TITLE.to_string(),
    }
}
