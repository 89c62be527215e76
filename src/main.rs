//! ragchat - terminal client for a RAG chat backend
//!
#![doc = "ragchat - terminal client for a RAG chat backend"]
#![doc = "Main entry point for the ragchat application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ragchat::cli::{Cli, Commands};
use ragchat::commands;
use ragchat::commands::chat::ChatArgs;
use ragchat::commands::ingest::IngestArgs;
use ragchat::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat {
            session,
            mode,
            role,
            namespace,
            top_k,
            debug,
        } => {
            if let Some(m) = &mode {
                tracing::debug!("Using mode override: {}", m);
            }
            if let Some(r) = &role {
                tracing::debug!("Using role override: {}", r);
            }

            // Moves `config` into the handler (match arms are exclusive)
            commands::chat::run_chat(
                config,
                ChatArgs {
                    session,
                    mode,
                    role,
                    namespace,
                    top_k,
                    debug,
                },
            )
            .await?;
            Ok(())
        }
        Commands::Sessions { command } => {
            tracing::info!("Starting session management command");
            commands::sessions::handle_sessions(&config, command).await?;
            Ok(())
        }
        Commands::Ingest {
            title,
            content,
            file,
            source,
            namespace,
        } => {
            tracing::info!("Starting knowledge ingestion");
            commands::ingest::run_ingest(
                &config,
                IngestArgs {
                    title,
                    content,
                    file,
                    source,
                    namespace,
                },
            )
            .await?;
            Ok(())
        }
    }
}

/// Initialize tracing on stderr so chat output on stdout stays clean
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "ragchat=debug" } else { "ragchat=warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
