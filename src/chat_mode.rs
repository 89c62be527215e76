//! Chat mode types and utilities
//!
//! This module defines how a message is routed to the backend:
//! - RAG mode: the backend may consult the knowledge base first
//! - Normal mode: plain chat, persisted in the active session
//!
//! It also defines the personas the plain chat endpoint understands.

use colored::Colorize;
use std::fmt;

/// Chat mode for outgoing messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatMode {
    /// Retrieval-augmented chat via `/rag/chat`
    #[default]
    Rag,

    /// Plain chat via `/chat`
    Normal,
}

impl fmt::Display for ChatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ChatMode {
    /// Parse a chat mode from a string
    ///
    /// # Examples
    ///
    /// ```
    /// use ragchat::chat_mode::ChatMode;
    ///
    /// assert_eq!(ChatMode::parse_str("RAG").unwrap(), ChatMode::Rag);
    /// assert_eq!(ChatMode::parse_str("normal").unwrap(), ChatMode::Normal);
    /// assert!(ChatMode::parse_str("write").is_err());
    /// ```
    pub fn parse_str(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "rag" => Ok(Self::Rag),
            "normal" => Ok(Self::Normal),
            other => Err(format!("Unknown chat mode: {}", other)),
        }
    }

    /// Wire name of the mode
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rag => "rag",
            Self::Normal => "normal",
        }
    }

    /// Get a user-friendly description of this mode
    pub fn description(&self) -> &'static str {
        match self {
            Self::Rag => "Answer from the knowledge base when it has a hit",
            Self::Normal => "Plain chat with session history",
        }
    }

    /// Get a colored tag representation of this mode
    pub fn colored_tag(&self) -> String {
        match self {
            Self::Rag => format!("[{}]", "RAG".purple()),
            Self::Normal => format!("[{}]", "CHAT".green()),
        }
    }
}

/// Persona sent as `role` to the plain chat endpoint
///
/// The backend picks a system prompt from this value and falls back to the
/// general assistant for anything it does not recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Persona {
    /// General-purpose assistant
    #[default]
    General,
    /// Programming expert
    Coder,
    /// Chinese/English translator
    Translator,
    /// Product manager
    Pm,
    /// Academic tutor
    Scholar,
}

impl Persona {
    /// All personas, in menu order
    pub const ALL: [Persona; 5] = [
        Persona::General,
        Persona::Coder,
        Persona::Translator,
        Persona::Pm,
        Persona::Scholar,
    ];

    /// Parse a persona from a string
    ///
    /// # Examples
    ///
    /// ```
    /// use ragchat::chat_mode::Persona;
    ///
    /// assert_eq!(Persona::parse_str("coder").unwrap(), Persona::Coder);
    /// assert!(Persona::parse_str("pirate").is_err());
    /// ```
    pub fn parse_str(s: &str) -> Result<Self, String> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == lower)
            .ok_or_else(|| {
                format!(
                    "Unknown role: {}. Must be one of: {}",
                    lower,
                    Self::ALL.map(|p| p.as_str()).join(", ")
                )
            })
    }

    /// Wire name of the persona
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Coder => "coder",
            Self::Translator => "translator",
            Self::Pm => "pm",
            Self::Scholar => "scholar",
        }
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
