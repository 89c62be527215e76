//! Terminal front end for the session controller
//!
//! [`TerminalPresenter`] turns controller view updates into console output.
//! Transcript lines are printed once, in order, as they settle; an answer
//! being revealed is streamed in place and the lines after it wait until it
//! completes. A replaced transcript (new generation) is printed from the top.

use std::io::{self, IsTerminal, Write};
use std::sync::{Mutex, MutexGuard};

use colored::Colorize;

use crate::controller::{EntryKind, EntryState};
use crate::view::{Presenter, TranscriptLine, TranscriptView};

struct Screen<W> {
    out: W,
    generation: Option<u64>,
    printed: usize,
    typing: bool,
    revealing: bool,
}

impl<W: Write> Screen<W> {
    fn emit(&mut self, text: &str) {
        let result = self
            .out
            .write_all(text.as_bytes())
            .and_then(|_| self.out.flush());
        if let Err(e) = result {
            tracing::debug!("Failed to write to terminal: {}", e);
        }
    }

    fn clear_typing(&mut self) {
        if self.typing {
            self.emit("\r\x1b[2K");
            self.typing = false;
        }
    }

    fn render(&mut self, view: &TranscriptView) {
        if self.generation != Some(view.generation) {
            if self.revealing {
                self.emit("\n");
            }
            self.clear_typing();
            self.generation = Some(view.generation);
            self.printed = 0;
            self.revealing = false;
        }
        if self.revealing {
            return;
        }

        while let Some(line) = view.lines.get(self.printed) {
            match line.state {
                EntryState::Pending => {
                    if !self.typing {
                        self.emit(&line.text.dimmed().to_string());
                        self.typing = true;
                    }
                    return;
                }
                EntryState::Revealing => {
                    self.clear_typing();
                    self.emit(&line.text);
                    self.revealing = true;
                    return;
                }
                EntryState::Settled => {
                    self.clear_typing();
                    self.emit(&format!("{}\n", styled(line)));
                    self.printed += 1;
                }
            }
        }
    }
}

fn styled(line: &TranscriptLine) -> String {
    match line.kind {
        EntryKind::User => line.text.green().to_string(),
        EntryKind::Assistant => line.text.clone(),
        EntryKind::System => line.text.dimmed().to_string(),
    }
}

/// [`Presenter`] that prints to a terminal
pub struct TerminalPresenter<W = io::Stdout> {
    screen: Mutex<Screen<W>>,
    set_window_title: bool,
}

impl TerminalPresenter<io::Stdout> {
    /// Print to stdout, setting the window title when it is a terminal
    pub fn stdout() -> Self {
        let set_window_title = io::stdout().is_terminal();
        Self {
            set_window_title,
            ..Self::with_writer(io::stdout())
        }
    }
}

impl<W: Write + Send> TerminalPresenter<W> {
    pub fn with_writer(out: W) -> Self {
        Self {
            screen: Mutex::new(Screen {
                out,
                generation: None,
                printed: 0,
                typing: false,
                revealing: false,
            }),
            set_window_title: false,
        }
    }

    fn screen(&self) -> MutexGuard<'_, Screen<W>> {
        self.screen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Recover the writer, for inspecting captured output
    pub fn into_inner(self) -> W {
        self.screen
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .out
    }
}

impl<W: Write + Send> Presenter for TerminalPresenter<W> {
    fn alert(&self, message: &str) {
        let mut screen = self.screen();
        screen.clear_typing();
        screen.emit(&format!("{}\n", message.yellow()));
    }

    fn transcript_changed(&self, view: &TranscriptView) {
        self.screen().render(view);
    }

    fn assistant_delta(&self, delta: &str) {
        let mut screen = self.screen();
        if screen.revealing {
            screen.emit(delta);
        }
    }

    fn reveal_finished(&self) {
        let mut screen = self.screen();
        if screen.revealing {
            screen.emit("\n");
            screen.revealing = false;
            screen.printed += 1;
        }
    }

    fn title_changed(&self, title: &str) {
        if self.set_window_title {
            // Session names come from the backend and must not end the sequence early
            let title: String = title.chars().filter(|c| !c.is_control()).collect();
            self.screen().emit(&format!("\x1b]0;{}\x07", title));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(kind: EntryKind, state: EntryState, text: &str) -> TranscriptLine {
        TranscriptLine {
            kind,
            state,
            text: text.to_string(),
        }
    }

    fn output(presenter: TerminalPresenter<Vec<u8>>) -> String {
        String::from_utf8(presenter.into_inner()).unwrap()
    }

    #[test]
    fn test_settled_lines_print_once() {
        let presenter = TerminalPresenter::with_writer(Vec::new());
        let mut view = TranscriptView {
            generation: 1,
            lines: vec![line(EntryKind::User, EntryState::Settled, "You: hi")],
        };
        presenter.transcript_changed(&view);
        view.lines
            .push(line(EntryKind::Assistant, EntryState::Settled, "AI: hello"));
        presenter.transcript_changed(&view);

        let out = output(presenter);
        assert_eq!(out.matches("You: hi").count(), 1);
        assert_eq!(out.matches("AI: hello").count(), 1);
    }

    #[test]
    fn test_reveal_streams_then_releases_following_lines() {
        let presenter = TerminalPresenter::with_writer(Vec::new());
        let user = line(EntryKind::User, EntryState::Settled, "You: q");
        presenter.transcript_changed(&TranscriptView {
            generation: 1,
            lines: vec![
                user.clone(),
                line(EntryKind::Assistant, EntryState::Pending, "AI: typing..."),
            ],
        });
        presenter.transcript_changed(&TranscriptView {
            generation: 1,
            lines: vec![
                user.clone(),
                line(EntryKind::Assistant, EntryState::Revealing, "AI: "),
                line(EntryKind::System, EntryState::Settled, "Notice: fallback"),
            ],
        });
        presenter.assistant_delta("o");
        presenter.assistant_delta("k");
        presenter.reveal_finished();
        presenter.transcript_changed(&TranscriptView {
            generation: 1,
            lines: vec![
                user,
                line(EntryKind::Assistant, EntryState::Settled, "AI: ok"),
                line(EntryKind::System, EntryState::Settled, "Notice: fallback"),
            ],
        });

        let out = output(presenter);
        assert!(out.contains("typing..."));
        assert!(out.contains("AI: ok\n"));
        assert_eq!(out.matches("Notice: fallback").count(), 1);
        assert!(out.find("AI: ok").unwrap() < out.find("Notice: fallback").unwrap());
    }

    #[test]
    fn test_new_generation_reprints_from_top() {
        let presenter = TerminalPresenter::with_writer(Vec::new());
        let view = TranscriptView {
            generation: 1,
            lines: vec![line(EntryKind::User, EntryState::Settled, "You: same")],
        };
        presenter.transcript_changed(&view);
        presenter.transcript_changed(&TranscriptView {
            generation: 2,
            ..view
        });

        assert_eq!(output(presenter).matches("You: same").count(), 2);
    }

    #[test]
    fn test_alert_is_printed() {
        let presenter = TerminalPresenter::with_writer(Vec::new());
        presenter.alert("Please enter a session name");
        assert!(output(presenter).contains("Please enter a session name"));
    }

    #[test]
    fn test_title_not_written_to_plain_writer() {
        let presenter = TerminalPresenter::with_writer(Vec::new());
        presenter.title_changed("Work - AI Chat Assistant");
        assert!(output(presenter).is_empty());
    }

    #[test]
    fn test_title_strips_control_characters() {
        let presenter = TerminalPresenter {
            set_window_title: true,
            ..TerminalPresenter::with_writer(Vec::new())
        };
        presenter.title_changed("Work\x07\x1b]0;owned\n - AI Chat Assistant");

        assert_eq!(
            output(presenter),
            "\x1b]0;Work]0;owned - AI Chat Assistant\x07"
        );
    }
}
