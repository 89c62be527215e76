//! Presenter that remembers everything it was shown

use std::sync::{Mutex, MutexGuard};

use crate::view::{Dialog, Presenter, SessionListView, TranscriptView};

#[derive(Debug, Default)]
struct Recorded {
    alerts: Vec<String>,
    sessions: Option<SessionListView>,
    transcript: Option<TranscriptView>,
    revealed: String,
    reveals_finished: usize,
    titles: Vec<String>,
    scrolls: usize,
    closed_dialogs: Vec<Dialog>,
}

/// In-memory [`Presenter`] for tests
///
/// # Examples
///
/// ```
/// use ragchat::view::{Presenter, RecordingPresenter};
///
/// let presenter = RecordingPresenter::new();
/// presenter.alert("Please enter a session name");
/// assert_eq!(presenter.alerts(), vec!["Please enter a session name".to_string()]);
/// ```
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    recorded: Mutex<Recorded>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Recorded> {
        self.recorded
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn alerts(&self) -> Vec<String> {
        self.lock().alerts.clone()
    }

    /// Last rendered session list
    pub fn sessions(&self) -> Option<SessionListView> {
        self.lock().sessions.clone()
    }

    /// Last rendered transcript
    pub fn transcript(&self) -> Option<TranscriptView> {
        self.lock().transcript.clone()
    }

    /// Concatenation of every revealed delta
    pub fn revealed(&self) -> String {
        self.lock().revealed.clone()
    }

    pub fn reveals_finished(&self) -> usize {
        self.lock().reveals_finished
    }

    pub fn last_title(&self) -> Option<String> {
        self.lock().titles.last().cloned()
    }

    pub fn scrolls(&self) -> usize {
        self.lock().scrolls
    }

    pub fn closed_dialogs(&self) -> Vec<Dialog> {
        self.lock().closed_dialogs.clone()
    }
}

impl Presenter for RecordingPresenter {
    fn alert(&self, message: &str) {
        self.lock().alerts.push(message.to_string());
    }

    fn sessions_changed(&self, view: &SessionListView) {
        self.lock().sessions = Some(view.clone());
    }

    fn transcript_changed(&self, view: &TranscriptView) {
        self.lock().transcript = Some(view.clone());
    }

    fn assistant_delta(&self, delta: &str) {
        self.lock().revealed.push_str(delta);
    }

    fn reveal_finished(&self) {
        self.lock().reveals_finished += 1;
    }

    fn title_changed(&self, title: &str) {
        self.lock().titles.push(title.to_string());
    }

    fn scroll_to_bottom(&self) {
        self.lock().scrolls += 1;
    }

    fn close_dialog(&self, dialog: Dialog) {
        self.lock().closed_dialogs.push(dialog);
    }
}
