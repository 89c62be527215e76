//! Command-line interface definition for ragchat
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for interactive chat, session management, and
//! knowledge ingestion.

use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;

/// ragchat - terminal client for a RAG chat backend
///
/// Chat with or without retrieval over a knowledge base, keep conversations
/// in persisted sessions, and ingest documents.
#[derive(Parser, Debug, Clone)]
#[command(name = "ragchat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Backend base URL, overriding the configuration
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for ragchat
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat
    Chat {
        /// Resume an existing session instead of starting a new one
        #[arg(short, long)]
        session: Option<String>,

        /// Chat mode: rag (knowledge base) or normal (plain chat)
        #[arg(short, long)]
        mode: Option<String>,

        /// Assistant persona for normal mode (general, coder, translator, pm, scholar)
        #[arg(short, long)]
        role: Option<String>,

        /// Knowledge base namespace for RAG mode
        #[arg(short, long)]
        namespace: Option<String>,

        /// Number of documents to retrieve in RAG mode
        #[arg(short = 'k', long)]
        top_k: Option<u32>,

        /// Show which documents were retrieved
        #[arg(short, long)]
        debug: bool,
    },

    /// Manage chat sessions
    Sessions {
        /// Session management subcommand
        #[command(subcommand)]
        command: SessionCommand,
    },

    /// Ingest a document into the knowledge base
    #[command(group(ArgGroup::new("body").required(true).args(["content", "file"])))]
    Ingest {
        /// Document title
        #[arg(short, long)]
        title: String,

        /// Document text
        #[arg(short, long)]
        content: Option<String>,

        /// Read the document text from a file
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Where the document came from
        #[arg(short, long)]
        source: Option<String>,

        /// Target namespace
        #[arg(short, long)]
        namespace: Option<String>,
    },
}

/// Session management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum SessionCommand {
    /// List all sessions
    List,

    /// Create a new session
    Create {
        /// Session name; defaults to a timestamped name
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Show a session and its messages
    Show {
        /// Session ID
        id: String,
    },

    /// Rename a session
    Rename {
        /// Session ID
        id: String,

        /// New name
        name: String,
    },

    /// Delete a session
    Delete {
        /// Session ID
        id: String,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_chat_defaults() {
        let cli = Cli::try_parse_from(["ragchat", "chat"]).unwrap();
        assert_eq!(cli.config, Some("config/config.yaml".to_string()));
        assert!(!cli.verbose);
        if let Commands::Chat {
            session,
            mode,
            top_k,
            debug,
            ..
        } = cli.command
        {
            assert_eq!(session, None);
            assert_eq!(mode, None);
            assert_eq!(top_k, None);
            assert!(!debug);
        } else {
            panic!("Expected Chat command");
        }
    }

    #[test]
    fn test_cli_parse_chat_with_options() {
        let cli = Cli::try_parse_from([
            "ragchat",
            "chat",
            "--session",
            "abc",
            "--mode",
            "normal",
            "--role",
            "coder",
            "-k",
            "7",
            "--debug",
        ])
        .unwrap();
        if let Commands::Chat {
            session,
            mode,
            role,
            namespace,
            top_k,
            debug,
        } = cli.command
        {
            assert_eq!(session.as_deref(), Some("abc"));
            assert_eq!(mode.as_deref(), Some("normal"));
            assert_eq!(role.as_deref(), Some("coder"));
            assert_eq!(namespace, None);
            assert_eq!(top_k, Some(7));
            assert!(debug);
        } else {
            panic!("Expected Chat command");
        }
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "ragchat",
            "sessions",
            "list",
            "--server",
            "http://example:9000",
            "-v",
        ])
        .unwrap();
        assert_eq!(cli.server.as_deref(), Some("http://example:9000"));
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Sessions {
                command: SessionCommand::List
            }
        ));
    }

    #[test]
    fn test_cli_parse_sessions_rename() {
        let cli = Cli::try_parse_from(["ragchat", "sessions", "rename", "s1", "Work"]).unwrap();
        if let Commands::Sessions {
            command: SessionCommand::Rename { id, name },
        } = cli.command
        {
            assert_eq!(id, "s1");
            assert_eq!(name, "Work");
        } else {
            panic!("Expected sessions rename");
        }
    }

    #[test]
    fn test_cli_parse_sessions_create_with_name() {
        let cli =
            Cli::try_parse_from(["ragchat", "sessions", "create", "--name", "Notes"]).unwrap();
        if let Commands::Sessions {
            command: SessionCommand::Create { name },
        } = cli.command
        {
            assert_eq!(name.as_deref(), Some("Notes"));
        } else {
            panic!("Expected sessions create");
        }
    }

    #[test]
    fn test_cli_sessions_show_requires_id() {
        assert!(Cli::try_parse_from(["ragchat", "sessions", "show"]).is_err());
    }

    #[test]
    fn test_cli_parse_ingest_with_content() {
        let cli = Cli::try_parse_from([
            "ragchat",
            "ingest",
            "--title",
            "Policy",
            "--content",
            "Ten days",
            "--namespace",
            "hr",
        ])
        .unwrap();
        if let Commands::Ingest {
            title,
            content,
            file,
            source,
            namespace,
        } = cli.command
        {
            assert_eq!(title, "Policy");
            assert_eq!(content.as_deref(), Some("Ten days"));
            assert_eq!(file, None);
            assert_eq!(source, None);
            assert_eq!(namespace.as_deref(), Some("hr"));
        } else {
            panic!("Expected Ingest command");
        }
    }

    #[test]
    fn test_cli_ingest_requires_body() {
        assert!(Cli::try_parse_from(["ragchat", "ingest", "--title", "t"]).is_err());
    }

    #[test]
    fn test_cli_ingest_content_and_file_conflict() {
        let result = Cli::try_parse_from([
            "ragchat", "ingest", "--title", "t", "--content", "c", "--file", "doc.txt",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_custom_config_path() {
        let cli = Cli::try_parse_from(["ragchat", "--config", "custom.yaml", "chat"]).unwrap();
        assert_eq!(cli.config, Some("custom.yaml".to_string()));
    }

    #[test]
    fn test_cli_requires_command() {
        assert!(Cli::try_parse_from(["ragchat"]).is_err());
    }
}
