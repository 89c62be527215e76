/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes three top-level command modules:

- `chat`: Interactive chat driven by the session controller
- `sessions`: One-shot session management
- `ingest`: One-shot knowledge ingestion

The interactive handler renders through a [`terminal::TerminalPresenter`];
the one-shot handlers talk to the backend directly and print their result.
*/

// Special commands parser for the interactive chat
pub mod special_commands;

// Terminal presenter for the interactive chat
pub mod terminal;

// Session management commands
pub mod sessions;

// Knowledge ingestion command
pub mod ingest;

// Chat command handler
pub mod chat {
    //! Interactive chat mode handler.
    //!
    //! Connects a [`SessionController`] to the backend and the terminal,
    //! and runs a readline-based loop that sends input lines as messages
    //! or executes special commands.

    use crate::api::HttpBackend;
    use crate::chat_mode::{ChatMode, Persona};
    use crate::commands::sessions::print_session_table;
    use crate::commands::special_commands::{
        parse_special_command, print_help, SessionRef, SpecialCommand,
    };
    use crate::commands::terminal::TerminalPresenter;
    use crate::config::{ChatConfig, Config};
    use crate::controller::{ControllerOptions, IngestForm, SendOutcome, SendRequest, SessionController};
    use crate::error::Result;
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;
    use std::sync::Arc;

    /// Command-line overrides for an interactive chat
    #[derive(Debug, Clone, Default)]
    pub struct ChatArgs {
        pub session: Option<String>,
        pub mode: Option<String>,
        pub role: Option<String>,
        pub namespace: Option<String>,
        pub top_k: Option<u32>,
        pub debug: bool,
    }

    impl ChatArgs {
        /// Fold the overrides into the chat configuration
        pub fn apply(&self, chat: &mut ChatConfig) {
            if let Some(mode) = &self.mode {
                chat.default_mode = mode.clone();
            }
            if let Some(role) = &self.role {
                chat.default_role = role.clone();
            }
            if let Some(namespace) = &self.namespace {
                chat.namespace = namespace.clone();
            }
            if let Some(top_k) = self.top_k {
                chat.top_k = top_k;
            }
            if self.debug {
                chat.debug = true;
            }
        }
    }

    /// Start interactive chat mode
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `args` - Command-line overrides
    ///
    /// # Errors
    ///
    /// Returns error if the overrides are invalid, the first session cannot
    /// be opened, or the terminal cannot be read
    pub async fn run_chat(mut config: Config, args: ChatArgs) -> Result<()> {
        tracing::info!("Starting interactive chat mode");
        args.apply(&mut config.chat);
        config.validate()?;

        let backend = Arc::new(HttpBackend::new(&config.server)?);
        let presenter = Arc::new(TerminalPresenter::stdout());
        let controller = SessionController::new(
            backend,
            presenter,
            ControllerOptions::from_config(&config),
        );

        match &args.session {
            Some(id) => {
                tracing::debug!("Resuming session: {}", id);
                // Only the list is best-effort; the switch must succeed.
                let _ = controller.load_sessions().await;
                controller.switch_session(id).await?;
            }
            None => controller.mount().await?,
        }

        let mut settings = SendRequest::from_config("", &config.chat);
        let mut rl = DefaultEditor::new()?;

        print_welcome_banner(&controller, &settings);

        loop {
            controller.wait_idle().await;
            let prompt = format!("{} >>> ", settings.mode.colored_tag());
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(trimmed);

                    // Check for special commands first
                    match parse_special_command(trimmed) {
                        Ok(SpecialCommand::None) => {}
                        Ok(SpecialCommand::Exit) => break,
                        Ok(command) => {
                            handle_special(&controller, &mut settings, command, &mut rl).await;
                            continue;
                        }
                        Err(e) => {
                            eprintln!("{}", e.to_string().red());
                            continue;
                        }
                    }

                    let request = SendRequest {
                        text: trimmed.to_string(),
                        ..settings.clone()
                    };
                    match controller.send_message(request).await {
                        Ok(SendOutcome::Busy) => {
                            println!("{}", "Still answering, please wait.".yellow());
                        }
                        Ok(_) => {}
                        // Already shown by the presenter
                        Err(e) => tracing::debug!("Send failed: {}", e),
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        controller.shutdown().await;
        println!("Goodbye!");
        Ok(())
    }

    async fn handle_special(
        controller: &SessionController,
        settings: &mut SendRequest,
        command: SpecialCommand,
        rl: &mut DefaultEditor,
    ) {
        // Controller failures were already shown by the presenter.
        let result = match command {
            SpecialCommand::NewSession(name) => match name {
                Some(name) => controller.create_named_session(&name).await.map(|_| ()),
                None => controller.create_session().await.map(|_| ()),
            },
            SpecialCommand::ListSessions => {
                let _ = controller.load_sessions().await;
                let view = controller.session_list_view();
                if view.rows.is_empty() {
                    println!("{}", "No sessions found.".yellow());
                } else {
                    print_session_table(&view);
                }
                Ok(())
            }
            SpecialCommand::Switch(target) => {
                let id = match target {
                    SessionRef::Id(id) => Some(id),
                    SessionRef::Index(n) => controller.sessions().get(n - 1).map(|s| s.id.clone()),
                };
                match id {
                    Some(id) => controller.switch_session(&id).await,
                    None => {
                        println!(
                            "{}",
                            "No such session; use /sessions to list them.".yellow()
                        );
                        Ok(())
                    }
                }
            }
            SpecialCommand::Rename(name) => match controller.current_session_id() {
                Some(id) => controller.rename_session(&id, &name).await,
                None => {
                    println!("{}", "Please create or select a session first".yellow());
                    Ok(())
                }
            },
            SpecialCommand::Delete(id) => match id.or_else(|| controller.current_session_id()) {
                Some(id) => controller.delete_session(&id).await,
                None => {
                    println!("{}", "Please create or select a session first".yellow());
                    Ok(())
                }
            },
            SpecialCommand::SwitchMode(mode) => {
                settings.mode = mode;
                println!("Switched to {} mode: {}\n", mode.colored_tag(), mode.description());
                Ok(())
            }
            SpecialCommand::SwitchRole(persona) => {
                settings.persona = persona;
                println!("Persona set to {}", persona.as_str().cyan());
                if settings.mode == ChatMode::Rag {
                    println!("The persona applies in normal mode (/mode normal).");
                }
                Ok(())
            }
            SpecialCommand::SetNamespace(namespace) => {
                if namespace.is_empty() {
                    println!("Searching all namespaces");
                } else {
                    println!("Namespace set to {}", namespace.cyan());
                }
                settings.namespace = namespace;
                Ok(())
            }
            SpecialCommand::SetTopK(top_k) => {
                settings.top_k = top_k;
                println!("Retrieving {} documents per query", top_k);
                Ok(())
            }
            SpecialCommand::SetDebug(debug) => {
                settings.debug = debug;
                println!(
                    "Retrieval debug output {}",
                    if debug { "on".green() } else { "off".red() }
                );
                Ok(())
            }
            SpecialCommand::Ingest => match read_ingest_form(rl) {
                Ok(mut form) => controller.ingest_knowledge(&mut form).await.map(|_| ()),
                Err(e) => Err(e),
            },
            SpecialCommand::ShowStatus => {
                print_status_display(controller, settings);
                Ok(())
            }
            SpecialCommand::Help => {
                print_help();
                Ok(())
            }
            SpecialCommand::Exit | SpecialCommand::None => Ok(()),
        };

        if let Err(e) = result {
            tracing::debug!("Special command failed: {}", e);
        }
    }

    /// Prompt for the fields of a document; content ends at an empty line
    fn read_ingest_form(rl: &mut DefaultEditor) -> Result<IngestForm> {
        let title = rl.readline("Title: ")?;
        println!("Content (finish with an empty line):");
        let mut lines = Vec::new();
        loop {
            let line = rl.readline("")?;
            if line.trim().is_empty() {
                break;
            }
            lines.push(line);
        }
        let source = rl.readline("Source [manual]: ")?;
        let namespace = rl.readline("Namespace [default]: ")?;
        Ok(IngestForm {
            title,
            content: lines.join("\n"),
            source,
            namespace,
        })
    }

    /// Display welcome banner at the start of interactive chat mode
    fn print_welcome_banner(controller: &SessionController, settings: &SendRequest) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║              ragchat Interactive Chat - Welcome!             ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!(
            "Mode:    {} ({})",
            settings.mode.colored_tag(),
            settings.mode.description()
        );
        if let Some(session) = controller.current_session() {
            println!("Session: {} ({})", session.name, session.id.cyan());
        }
        println!("Type '/help' for available commands, 'exit' to quit\n");
    }

    fn print_status_display(controller: &SessionController, settings: &SendRequest) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                     ragchat Session Status                   ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        match controller.current_session() {
            Some(session) => println!("Session:    {} ({})", session.name, session.id.cyan()),
            None => println!("Session:    {}", "none".yellow()),
        }
        println!(
            "Mode:       {} ({})",
            settings.mode.colored_tag(),
            settings.mode.description()
        );
        println!("Persona:    {}", persona_label(settings.persona));
        println!(
            "Namespace:  {}",
            if settings.namespace.is_empty() {
                "(all)"
            } else {
                settings.namespace.as_str()
            }
        );
        println!("Top K:      {}", settings.top_k);
        println!("Debug:      {}", if settings.debug { "on" } else { "off" });
        println!("Messages:   {}", controller.transcript().len());
        println!();
    }

    fn persona_label(persona: Persona) -> String {
        let others: Vec<&str> = Persona::ALL
            .iter()
            .filter(|p| **p != persona)
            .map(|p| p.as_str())
            .collect();
        format!("{} (others: {})", persona.as_str(), others.join(", "))
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_chat_args_apply_overrides() {
            let mut chat = ChatConfig::default();
            let args = ChatArgs {
                mode: Some("normal".to_string()),
                role: Some("pm".to_string()),
                namespace: Some("hr".to_string()),
                top_k: Some(9),
                debug: true,
                ..ChatArgs::default()
            };
            args.apply(&mut chat);
            assert_eq!(chat.mode(), ChatMode::Normal);
            assert_eq!(chat.persona(), Persona::Pm);
            assert_eq!(chat.namespace, "hr");
            assert_eq!(chat.top_k, 9);
            assert!(chat.debug);
        }

        #[test]
        fn test_chat_args_without_overrides_keep_config() {
            let mut chat = ChatConfig::default();
            ChatArgs::default().apply(&mut chat);
            assert_eq!(chat.mode(), ChatMode::Rag);
            assert_eq!(chat.top_k, 3);
            assert!(!chat.debug);
        }

        #[test]
        fn test_invalid_role_override_fails_validation() {
            let mut config = Config::default();
            ChatArgs {
                role: Some("pirate".to_string()),
                ..ChatArgs::default()
            }
            .apply(&mut config.chat);
            assert!(config.validate().is_err());
        }

        #[test]
        fn test_persona_label_lists_others() {
            let label = persona_label(Persona::Coder);
            assert!(label.starts_with("coder (others: general, translator"));
        }
    }
}
