//! Visible chat transcript
//!
//! The transcript is what the user sees for the active session: persisted
//! messages after a switch, plus entries added locally while chatting. Each
//! replacement bumps the generation so late writers can tell their entry is
//! gone.

use crate::api::{ChatMessage, MessageRole};

/// Who an entry is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    User,
    Assistant,
    /// Informational line from the client itself (hit documents, fallback)
    System,
}

/// Lifecycle of an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    Settled,
    /// Assistant placeholder while the request is outstanding
    Pending,
    /// Assistant answer being played back
    Revealing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub kind: EntryKind,
    pub text: String,
    pub state: EntryState,
}

impl TranscriptEntry {
    pub fn settled(kind: EntryKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            state: EntryState::Settled,
        }
    }
}

/// Position of an entry that survives only as long as its generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryHandle {
    generation: u64,
    index: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    generation: u64,
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.generation += 1;
        self.entries.clear();
    }

    /// Replace the transcript with persisted history
    ///
    /// Only user and assistant messages are shown.
    pub fn replace_with(&mut self, messages: &[ChatMessage]) {
        self.clear();
        self.entries.extend(messages.iter().filter_map(|m| {
            let kind = match m.role {
                MessageRole::User => EntryKind::User,
                MessageRole::Assistant => EntryKind::Assistant,
                MessageRole::System | MessageRole::Other => return None,
            };
            Some(TranscriptEntry::settled(kind, m.content.clone()))
        }));
    }

    pub fn push(&mut self, entry: TranscriptEntry) -> EntryHandle {
        self.entries.push(entry);
        EntryHandle {
            generation: self.generation,
            index: self.entries.len() - 1,
        }
    }

    /// The entry behind `handle`, unless the transcript was replaced since
    pub fn get_mut(&mut self, handle: EntryHandle) -> Option<&mut TranscriptEntry> {
        if handle.generation != self.generation {
            return None;
        }
        self.entries.get_mut(handle.index)
    }

    pub fn is_live(&self, handle: EntryHandle) -> bool {
        handle.generation == self.generation && handle.index < self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_with_skips_non_chat_roles() {
        let mut transcript = Transcript::new();
        transcript.replace_with(&[
            ChatMessage {
                role: MessageRole::System,
                content: "prompt".to_string(),
            },
            ChatMessage::user("hi"),
            ChatMessage::assistant("hello"),
        ]);
        assert_eq!(
            transcript.entries(),
            [
                TranscriptEntry::settled(EntryKind::User, "hi"),
                TranscriptEntry::settled(EntryKind::Assistant, "hello"),
            ]
        );
    }

    #[test]
    fn test_handle_dies_with_generation() {
        let mut transcript = Transcript::new();
        let handle = transcript.push(TranscriptEntry::settled(EntryKind::User, "a"));
        assert!(transcript.is_live(handle));
        assert!(transcript.get_mut(handle).is_some());

        transcript.clear();
        transcript.push(TranscriptEntry::settled(EntryKind::User, "b"));
        assert!(!transcript.is_live(handle));
        assert!(transcript.get_mut(handle).is_none());
    }

    #[test]
    fn test_replace_bumps_generation() {
        let mut transcript = Transcript::new();
        let before = transcript.generation();
        transcript.replace_with(&[]);
        assert_eq!(transcript.generation(), before + 1);
        assert!(transcript.is_empty());
    }
}
