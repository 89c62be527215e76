//! Presentation layer
//!
//! The controller never draws anything itself. It renders its state with the
//! pure functions in [`render`] and hands the resulting view models to a
//! [`Presenter`]: the terminal front end in the binary, or a
//! [`RecordingPresenter`] in tests.

pub mod recording;
pub mod render;

pub use recording::RecordingPresenter;
pub use render::{
    format_timestamp, render_session_list, render_transcript, window_title, SessionListView,
    SessionRow, TranscriptLine, TranscriptView,
};

/// Dialogs the controller asks the front end to close
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialog {
    Rename,
    Delete,
}

/// Receives view updates from the controller
///
/// Methods are called with no controller lock held, from whichever task
/// drives the operation, including the background reveal task.
pub trait Presenter: Send + Sync {
    /// Blocking user notification
    fn alert(&self, message: &str);

    /// The session list was re-rendered
    fn sessions_changed(&self, _view: &SessionListView) {}

    /// Entries were added, replaced or changed state
    fn transcript_changed(&self, _view: &TranscriptView) {}

    /// More of the answer being revealed became visible
    fn assistant_delta(&self, _delta: &str) {}

    /// The answer being revealed is complete
    fn reveal_finished(&self) {}

    fn title_changed(&self, _title: &str) {}

    fn scroll_to_bottom(&self) {}

    fn close_dialog(&self, _dialog: Dialog) {}
}
