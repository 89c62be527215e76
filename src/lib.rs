//! ragchat - terminal client library for a RAG chat backend
//!
//! This library provides the client side of a chat service with persisted
//! sessions, plain and retrieval-augmented chat, and knowledge ingestion.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `api`: Backend trait, HTTP client, wire types, and an in-memory fake
//! - `controller`: Session view controller (cache, active session, transcript)
//! - `view`: Pure render functions and the presenter trait
//! - `chat_mode`: Chat modes and personas
//! - `commands`: CLI command handlers and the terminal presenter
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use ragchat::api::HttpBackend;
//! use ragchat::controller::{ControllerOptions, SendRequest, SessionController};
//! use ragchat::view::RecordingPresenter;
//! use ragchat::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     config.validate()?;
//!
//!     let controller = SessionController::new(
//!         Arc::new(HttpBackend::new(&config.server)?),
//!         Arc::new(RecordingPresenter::new()),
//!         ControllerOptions::from_config(&config),
//!     );
//!     controller.mount().await?;
//!     controller.send_message(SendRequest::new("What is our leave policy?")).await?;
//!     controller.wait_idle().await;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod chat_mode;
pub mod cli;
pub mod commands;
pub mod config;
pub mod controller;
pub mod error;
pub mod view;

// Re-export commonly used types
pub use api::{ChatBackend, FakeBackend, HttpBackend};
pub use chat_mode::{ChatMode, Persona};
pub use config::Config;
pub use controller::SessionController;
pub use error::{RagchatError, Result};
