//! Error types for ragchat
//!
//! This module defines all error types used throughout the client,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for ragchat operations
///
/// Backend failures of any kind (non-2xx status or a request that never got
/// a response) share the single [`RagchatError::Backend`] variant. Problems
/// detected locally before any request is issued use
/// [`RagchatError::Validation`].
#[derive(Error, Debug)]
pub enum RagchatError {
    /// Transport or server failure talking to the chat backend
    #[error("Backend error: {0}")]
    Backend(String),

    /// Locally detected invalid input (empty name, no active session, ...)
    #[error("{0}")]
    Validation(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP client construction errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Line editor errors in the interactive REPL
    #[error("Readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
}

impl RagchatError {
    /// Build a backend error for a non-2xx response
    ///
    /// The backend reports failures as `{"error": "..."}`; when that field is
    /// present it is kept, otherwise only the status code is reported.
    pub fn from_status(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string));

        match detail {
            Some(message) if !message.is_empty() => {
                Self::Backend(format!("HTTP {}: {}", status, message))
            }
            _ => Self::Backend(format!("HTTP {}", status)),
        }
    }
}

/// Returns true if the error was detected locally before any request
///
/// Validation errors are reported to the user like backend errors but are
/// never logged as failures.
pub fn is_validation(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<RagchatError>(),
        Some(RagchatError::Validation(_))
    )
}

/// Result type alias for ragchat operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_display() {
        let error = RagchatError::Backend("HTTP 500".to_string());
        assert_eq!(error.to_string(), "Backend error: HTTP 500");
    }

    #[test]
    fn test_validation_error_display_is_bare_message() {
        let error = RagchatError::Validation("Please enter a session name".to_string());
        assert_eq!(error.to_string(), "Please enter a session name");
    }

    #[test]
    fn test_config_error_display() {
        let error = RagchatError::Config("invalid format".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid format");
    }

    #[test]
    fn test_from_status_keeps_backend_error_field() {
        let error = RagchatError::from_status(500, r#"{"error":"create session failed"}"#);
        assert_eq!(
            error.to_string(),
            "Backend error: HTTP 500: create session failed"
        );
    }

    #[test]
    fn test_from_status_without_json_body() {
        let error = RagchatError::from_status(502, "<html>bad gateway</html>");
        assert_eq!(error.to_string(), "Backend error: HTTP 502");
    }

    #[test]
    fn test_from_status_with_empty_error_field() {
        let error = RagchatError::from_status(404, r#"{"error":""}"#);
        assert_eq!(error.to_string(), "Backend error: HTTP 404");
    }

    #[test]
    fn test_is_validation() {
        let validation: anyhow::Error = RagchatError::Validation("empty".to_string()).into();
        let backend: anyhow::Error = RagchatError::Backend("HTTP 500".to_string()).into();
        let other = anyhow::anyhow!("something else");
        assert!(is_validation(&validation));
        assert!(!is_validation(&backend));
        assert!(!is_validation(&other));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: RagchatError = io_error.into();
        assert!(matches!(error, RagchatError::Io(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("invalid: : yaml").unwrap_err();
        let error: RagchatError = yaml_error.into();
        assert!(matches!(error, RagchatError::Yaml(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RagchatError>();
    }
}
