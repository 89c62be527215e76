//! HTTP implementation of [`ChatBackend`]
//!
//! A thin reqwest wrapper: JSON in, JSON out, and every non-2xx status is
//! turned into `RagchatError::Backend` without further inspection.

use crate::api::types::{
    ChatMessage, ChatReply, ChatRequest, IngestReceipt, KnowledgeRequest, MessagesEnvelope,
    RagChatRequest, Session, SessionEnvelope, SessionNameRequest, SessionsEnvelope,
};
use crate::api::ChatBackend;
use crate::config::ServerConfig;
use crate::error::{Result, RagchatError};

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use url::Url;

/// Chat backend reached over HTTP
///
/// # Examples
///
/// ```
/// use ragchat::api::HttpBackend;
/// use ragchat::config::ServerConfig;
///
/// let backend = HttpBackend::new(&ServerConfig::default()).unwrap();
/// assert_eq!(backend.base_url().as_str(), "http://localhost:8080/");
/// ```
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    /// Create a backend client from server settings
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is invalid or the HTTP client cannot be
    /// built
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            RagchatError::Config(format!("Invalid server URL {}: {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(RagchatError::Config(format!(
                "Server URL cannot be used as a base: {}",
                config.base_url
            ))
            .into());
        }

        let mut builder =
            Client::builder().user_agent(concat!("ragchat/", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(RagchatError::Http)?;

        Ok(Self { client, base_url })
    }

    /// Base URL all endpoints are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build an endpoint URL from path segments
    ///
    /// Each segment is percent-encoded, so session ids can never escape
    /// their path position.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                RagchatError::Config(format!(
                    "Server URL cannot be used as a base: {}",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let url = self.endpoint(segments)?;
        tracing::debug!("{} {}", method, url);
        Ok(self.client.request(method, url))
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(|e| {
            tracing::debug!("Request to chat backend failed: {}", e);
            RagchatError::Backend(format!("Failed to reach chat backend: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!("Chat backend returned {}: {}", status, body);
            return Err(RagchatError::from_status(status.as_u16(), &body).into());
        }

        Ok(response)
    }

    async fn execute_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &str,
    ) -> Result<T> {
        let response = self.execute(request).await?;
        let parsed = response.json::<T>().await.map_err(|e| {
            tracing::debug!("Failed to parse {} response: {}", what, e);
            RagchatError::Backend(format!("Failed to parse {} response: {}", what, e))
        })?;
        Ok(parsed)
    }

    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
        what: &str,
    ) -> Result<T> {
        let request = self.request(Method::POST, segments)?.json(body);
        self.execute_json(request, what).await
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn list_sessions(&self) -> Result<Vec<Session>> {
        let request = self.request(Method::GET, &["api", "sessions"])?;
        let envelope: SessionsEnvelope = self.execute_json(request, "session list").await?;
        Ok(envelope.sessions.unwrap_or_default())
    }

    async fn create_session(&self, name: &str) -> Result<Session> {
        let body = SessionNameRequest {
            name: name.to_string(),
        };
        let envelope: SessionEnvelope = self
            .post_json(&["api", "sessions"], &body, "create session")
            .await?;
        Ok(envelope.session)
    }

    async fn get_session(&self, id: &str) -> Result<Session> {
        let request = self.request(Method::GET, &["api", "sessions", id])?;
        let envelope: SessionEnvelope = self.execute_json(request, "session").await?;
        Ok(envelope.session)
    }

    async fn get_messages(&self, id: &str) -> Result<Vec<ChatMessage>> {
        let request = self.request(Method::GET, &["api", "sessions", id, "messages"])?;
        let envelope: MessagesEnvelope = self.execute_json(request, "messages").await?;
        Ok(envelope.messages.unwrap_or_default())
    }

    async fn rename_session(&self, id: &str, name: &str) -> Result<()> {
        let body = SessionNameRequest {
            name: name.to_string(),
        };
        let request = self
            .request(Method::PUT, &["api", "sessions", id])?
            .json(&body);
        self.execute(request).await?;
        Ok(())
    }

    async fn delete_session(&self, id: &str) -> Result<()> {
        let request = self.request(Method::DELETE, &["api", "sessions", id])?;
        self.execute(request).await?;
        Ok(())
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply> {
        self.post_json(&["chat"], request, "chat").await
    }

    async fn rag_chat(&self, request: &RagChatRequest) -> Result<ChatReply> {
        self.post_json(&["rag", "chat"], request, "rag chat").await
    }

    async fn ingest_knowledge(&self, request: &KnowledgeRequest) -> Result<IngestReceipt> {
        self.post_json(&["rag", "knowledge"], request, "ingest").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(base: &str) -> HttpBackend {
        HttpBackend::new(&ServerConfig {
            base_url: base.to_string(),
            timeout_seconds: None,
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let b = backend("http://localhost:8080");
        let url = b.endpoint(&["api", "sessions", "abc", "messages"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/sessions/abc/messages");
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let b = backend("http://example.com/chat-app/");
        let url = b.endpoint(&["rag", "chat"]).unwrap();
        assert_eq!(url.as_str(), "http://example.com/chat-app/rag/chat");
    }

    #[test]
    fn test_endpoint_encodes_session_id() {
        let b = backend("http://localhost:8080");
        let url = b.endpoint(&["api", "sessions", "a/b c"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/sessions/a%2Fb%20c");
    }

    #[test]
    fn test_new_rejects_invalid_url() {
        let result = HttpBackend::new(&ServerConfig {
            base_url: "::not a url".to_string(),
            timeout_seconds: None,
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_new_rejects_non_base_url() {
        let result = HttpBackend::new(&ServerConfig {
            base_url: "mailto:someone@example.com".to_string(),
            timeout_seconds: None,
        });
        assert!(result.is_err());
    }
}
