use crate::api::{ChatBackend, HttpBackend};
use crate::config::Config;
use crate::controller::IngestForm;
use crate::error::Result;
use colored::Colorize;
use std::path::PathBuf;

/// Arguments of `ragchat ingest`
#[derive(Debug, Clone, Default)]
pub struct IngestArgs {
    pub title: String,
    pub content: Option<String>,
    pub file: Option<PathBuf>,
    pub source: Option<String>,
    pub namespace: Option<String>,
}

impl IngestArgs {
    /// Resolve the document body and build the form
    ///
    /// # Errors
    ///
    /// Returns error if `file` is set and cannot be read
    pub fn into_form(self) -> Result<IngestForm> {
        let content = match (self.content, self.file) {
            (Some(content), _) => content,
            (None, Some(path)) => {
                tracing::debug!("Reading document from {}", path.display());
                std::fs::read_to_string(&path)?
            }
            (None, None) => String::new(),
        };
        Ok(IngestForm {
            title: self.title,
            content,
            source: self.source.unwrap_or_default(),
            namespace: self.namespace.unwrap_or_default(),
        })
    }
}

/// Ingest one document into the knowledge base
pub async fn run_ingest(config: &Config, args: IngestArgs) -> Result<()> {
    let backend = HttpBackend::new(&config.server)?;
    let chunks = ingest(&backend, config, args).await?;
    println!("{}", format!("Ingested, chunks: {}", chunks).green());
    Ok(())
}

/// Validate and send the document, returning the chunk count
pub async fn ingest(backend: &dyn ChatBackend, config: &Config, args: IngestArgs) -> Result<u64> {
    let form = args.into_form()?;
    let request = form.to_request(
        &config.ingest.default_source,
        &config.ingest.default_namespace,
    )?;
    tracing::info!(
        "Ingesting '{}' into namespace {}",
        request.title,
        request.namespace
    );
    let receipt = backend.ingest_knowledge(&request).await?;
    Ok(receipt.chunk_count())
}
