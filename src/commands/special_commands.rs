//! Special commands parser for interactive chat mode
//!
//! This module parses special commands that can be entered during an
//! interactive chat. Special commands allow users to:
//! - Create, list, switch, rename and delete sessions
//! - Change the chat mode and its retrieval parameters
//! - Ingest a document into the knowledge base
//! - View status, display help, and exit
//!
//! Commands are prefixed with `/`. The command word is case-insensitive,
//! arguments such as names and ids are kept as typed.

use crate::chat_mode::{ChatMode, Persona};
use crate::config::MAX_TOP_K;
use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// How `/switch` names its target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionRef {
    Id(String),
    /// 1-based position in the listing from `/sessions`
    Index(usize),
}

/// Special commands that can be executed during interactive chat
///
/// These commands act on sessions or change how later messages are sent,
/// rather than being sent to the backend as chat text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Start a new session, optionally named
    NewSession(Option<String>),

    /// Refresh and print the session list
    ListSessions,

    /// Make another session active
    Switch(SessionRef),

    /// Rename the active session
    Rename(String),

    /// Delete a session; the active one when no id is given
    Delete(Option<String>),

    /// Switch between RAG and normal chat
    SwitchMode(ChatMode),

    /// Change the persona used in normal mode
    SwitchRole(Persona),

    /// Restrict retrieval to a namespace; empty searches all
    SetNamespace(String),

    /// Number of documents retrieved per query
    SetTopK(u32),

    /// Show retrieved documents under each RAG answer
    SetDebug(bool),

    /// Prompt for a document and ingest it
    Ingest,

    /// Display the current session and chat settings
    ShowStatus,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command (regular chat text)
    None,
}

/// Parse user input into a special command
///
/// Returns `Ok(SpecialCommand::None)` for input that should be sent as a chat
/// message, and an error for a `/command` that is unknown or misused.
///
/// # Examples
///
/// ```
/// use ragchat::chat_mode::ChatMode;
/// use ragchat::commands::special_commands::{parse_special_command, SessionRef, SpecialCommand};
///
/// let cmd = parse_special_command("/mode normal").unwrap();
/// assert_eq!(cmd, SpecialCommand::SwitchMode(ChatMode::Normal));
///
/// let cmd = parse_special_command("/switch #2").unwrap();
/// assert_eq!(cmd, SpecialCommand::Switch(SessionRef::Index(2)));
///
/// let cmd = parse_special_command("hello there").unwrap();
/// assert_eq!(cmd, SpecialCommand::None);
///
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let (word, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (trimmed, ""),
    };
    let word = word.to_lowercase();

    // If input doesn't start with "/", it's not a command (except exit/quit)
    if !trimmed.starts_with('/') {
        return Ok(match (word.as_str(), rest) {
            ("exit" | "quit", "") => SpecialCommand::Exit,
            _ => SpecialCommand::None,
        });
    }

    match word.as_str() {
        "/new" => Ok(SpecialCommand::NewSession(
            Some(rest.to_string()).filter(|name| !name.is_empty()),
        )),
        "/sessions" | "/ls" => Ok(SpecialCommand::ListSessions),
        "/switch" => parse_switch(rest),
        "/rename" => {
            let name = require(rest, "/rename", "/rename <name>")?;
            Ok(SpecialCommand::Rename(name.to_string()))
        }
        "/delete" => Ok(SpecialCommand::Delete(
            Some(rest.to_string()).filter(|id| !id.is_empty()),
        )),

        "/mode" => {
            let arg = require(rest, "/mode", "/mode <rag|normal>")?;
            ChatMode::parse_str(arg)
                .map(SpecialCommand::SwitchMode)
                .map_err(|_| unsupported("/mode", arg))
        }
        "/rag" => Ok(SpecialCommand::SwitchMode(ChatMode::Rag)),
        "/normal" => Ok(SpecialCommand::SwitchMode(ChatMode::Normal)),
        "/role" => {
            let arg = require(rest, "/role", "/role <general|coder|translator|pm|scholar>")?;
            Persona::parse_str(arg)
                .map(SpecialCommand::SwitchRole)
                .map_err(|_| unsupported("/role", arg))
        }
        "/namespace" | "/ns" => Ok(SpecialCommand::SetNamespace(rest.to_string())),
        "/topk" => {
            let arg = require(rest, "/topk", "/topk <1-50>")?;
            match arg.parse::<u32>() {
                Ok(k) if (1..=MAX_TOP_K).contains(&k) => Ok(SpecialCommand::SetTopK(k)),
                _ => Err(unsupported("/topk", arg)),
            }
        }
        "/debug" => match rest.to_lowercase().as_str() {
            "" => Err(CommandError::MissingArgument {
                command: "/debug".to_string(),
                usage: "/debug <on|off>".to_string(),
            }),
            "on" => Ok(SpecialCommand::SetDebug(true)),
            "off" => Ok(SpecialCommand::SetDebug(false)),
            _ => Err(unsupported("/debug", rest)),
        },

        "/ingest" => Ok(SpecialCommand::Ingest),
        "/status" => Ok(SpecialCommand::ShowStatus),
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "/exit" | "/quit" => Ok(SpecialCommand::Exit),

        _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
    }
}

fn parse_switch(rest: &str) -> Result<SpecialCommand, CommandError> {
    let target = require(rest, "/switch", "/switch <id|#index>")?;
    match target.strip_prefix('#') {
        Some(index) => match index.parse::<usize>() {
            Ok(n) if n >= 1 => Ok(SpecialCommand::Switch(SessionRef::Index(n))),
            _ => Err(unsupported("/switch", target)),
        },
        None => Ok(SpecialCommand::Switch(SessionRef::Id(target.to_string()))),
    }
}

fn require<'a>(arg: &'a str, command: &str, usage: &str) -> Result<&'a str, CommandError> {
    if arg.is_empty() {
        Err(CommandError::MissingArgument {
            command: command.to_string(),
            usage: usage.to_string(),
        })
    } else {
        Ok(arg)
    }
}

fn unsupported(command: &str, arg: &str) -> CommandError {
    CommandError::UnsupportedArgument {
        command: command.to_string(),
        arg: arg.to_string(),
    }
}

/// Display help information for special commands
///
/// # Examples
///
/// ```
/// use ragchat::commands::special_commands::print_help;
///
/// print_help();
/// ```
pub fn print_help() {
    println!(
        r#"
Special Commands for Interactive Chat Mode
===========================================

SESSIONS:
  /new [name]       - Start a new session
  /sessions         - List sessions (also /ls)
  /switch <id>      - Switch to a session by id
  /switch #<n>      - Switch to the n-th session of the list
  /rename <name>    - Rename the current session
  /delete [id]      - Delete a session (default: the current one)

CHAT MODE:
  /mode rag         - Answer from the knowledge base (also /rag)
  /mode normal      - Plain chat with history (also /normal)
  /role <persona>   - Persona for normal mode: general, coder,
                      translator, pm, scholar
  /namespace [ns]   - Restrict retrieval to a namespace; empty for all
  /topk <n>         - Documents retrieved per query (1-50)
  /debug on|off     - Show retrieved documents under RAG answers

KNOWLEDGE BASE:
  /ingest           - Add a document (prompts for title and content)

SESSION INFORMATION:
  /status           - Show current session and settings
  /help             - Show this help message
  /?                - Same as /help

SESSION CONTROL:
  exit              - Exit interactive mode
  quit              - Same as exit

NOTES:
  - Command names are case-insensitive
  - Regular text (not starting with /) is sent as a message
  - A new message is accepted once the previous answer is complete
"#
    );
}
