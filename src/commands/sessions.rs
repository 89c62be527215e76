use crate::api::{ChatBackend, HttpBackend, Session};
use crate::cli::SessionCommand;
use crate::config::Config;
use crate::controller::default_session_name;
use crate::error::{Result, RagchatError};
use crate::view::{render_session_list, render_transcript, SessionListView};
use chrono::Local;
use colored::Colorize;
use prettytable::{format, Table};

/// Handle session management commands
pub async fn handle_sessions(config: &Config, command: SessionCommand) -> Result<()> {
    let backend = HttpBackend::new(&config.server)?;
    run(&backend, command).await
}

/// Run a session command against any backend
pub async fn run(backend: &dyn ChatBackend, command: SessionCommand) -> Result<()> {
    match command {
        SessionCommand::List => {
            let sessions = backend.list_sessions().await?;
            if sessions.is_empty() {
                println!("{}", "No sessions found.".yellow());
                return Ok(());
            }

            println!("\nSessions:");
            print_session_table(&render_session_list(&sessions, None));
            println!();
            println!(
                "Use {} to continue a session.",
                "ragchat chat --session <ID>".cyan()
            );
            println!();
        }
        SessionCommand::Create { name } => {
            let name = name.unwrap_or_else(|| default_session_name(Local::now()));
            let name = require_name(&name)?;
            let session = backend.create_session(name).await?;
            println!(
                "{}",
                format!("Created session {} ({})", session.name, session.id).green()
            );
        }
        SessionCommand::Show { id } => {
            let session = backend.get_session(&id).await?;
            let messages = backend.get_messages(&id).await?;
            print_session_detail(&session);

            let mut transcript = crate::controller::Transcript::new();
            transcript.replace_with(&messages);
            for line in render_transcript(&transcript).lines {
                println!("{}", line.text);
            }
            println!();
        }
        SessionCommand::Rename { id, name } => {
            let name = require_name(&name)?;
            backend.rename_session(&id, name).await?;
            println!("{}", format!("Renamed session {} to {}", id, name).green());
        }
        SessionCommand::Delete { id } => {
            backend.delete_session(&id).await?;
            println!("{}", format!("Deleted session {}", id).green());
        }
    }

    Ok(())
}

fn require_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(RagchatError::Validation("Please enter a session name".to_string()).into());
    }
    Ok(name)
}

/// Print sessions as a numbered table; `#` is what `/switch #n` refers to
pub fn print_session_table(view: &SessionListView) {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "#".bold(),
        "ID".bold(),
        "Name".bold(),
        "Messages".bold(),
        "Last Updated".bold()
    ]);

    for (index, row) in view.rows.iter().enumerate() {
        let marker = if row.active {
            format!("*{}", index + 1).green().to_string()
        } else {
            (index + 1).to_string()
        };
        let name = if row.name.chars().count() > 40 {
            format!("{}...", row.name.chars().take(37).collect::<String>())
        } else {
            row.name.clone()
        };
        table.add_row(prettytable::row![
            marker,
            row.id.cyan(),
            name,
            row.message_count_label,
            row.updated_label
        ]);
    }

    table.printstd();
}

fn print_session_detail(session: &Session) {
    println!("\n{} {}", "Session:".bold(), session.name);
    println!("{} {}", "ID:".bold(), session.id.cyan());
    println!("{} {}", "Messages:".bold(), session.message_count);
    if let Some(created) = session.created_at {
        println!(
            "{} {}",
            "Created:".bold(),
            crate::view::format_timestamp(created)
        );
    }
    println!(
        "{} {}\n",
        "Updated:".bold(),
        crate::view::format_timestamp(session.updated_at)
    );
}
