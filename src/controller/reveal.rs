//! Character-by-character playback of an assistant answer
//!
//! The full answer is already known when playback starts; the reveal only
//! paces how it becomes visible. It runs as its own task so the caller is not
//! blocked, stops early if the transcript it writes into was replaced, and
//! jumps to the full text when the controller shuts down.

use super::transcript::{EntryHandle, EntryState};
use super::SessionController;

impl SessionController {
    pub(super) fn start_reveal(&self, handle: EntryHandle, answer: String) {
        let controller = self.clone();
        let task = tokio::spawn(async move { controller.reveal(handle, answer).await });
        self.state().reveal = Some(task);
    }

    async fn reveal(&self, handle: EntryHandle, answer: String) {
        let interval = self.inner.options.reveal_interval;
        let shutdown = self.inner.shutdown.clone();

        for ch in answer.chars() {
            if !self.append(handle, ch) {
                tracing::debug!("Transcript replaced during reveal; stopping");
                break;
            }
            self.presenter().assistant_delta(ch.encode_utf8(&mut [0; 4]));
            self.presenter().scroll_to_bottom();

            if interval.is_zero() {
                tokio::task::yield_now().await;
                continue;
            }
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }
        }

        self.finish_reveal(handle, &answer);
    }

    fn append(&self, handle: EntryHandle, ch: char) -> bool {
        let mut state = self.state();
        let Some(entry) = state.transcript.get_mut(handle) else {
            return false;
        };
        entry.text.push(ch);
        true
    }

    /// Settle the entry on the full answer and release the single-flight flag
    fn finish_reveal(&self, handle: EntryHandle, answer: &str) {
        let live = {
            let mut state = self.state();
            state.waiting = false;
            let live = state.transcript.is_live(handle);
            if let Some(entry) = state.transcript.get_mut(handle) {
                entry.text = answer.to_string();
                entry.state = EntryState::Settled;
            }
            live
        };

        if live {
            self.presenter().reveal_finished();
        }
        self.publish_transcript();
    }
}
