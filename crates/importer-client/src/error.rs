//! Error types for the import API client.

use thiserror::Error;

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a non-success status.
    #[error("HTTP {status}: {}", detail.as_deref().unwrap_or("no detail"))]
    Api { status: u16, detail: Option<String> },

    /// Network timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Connection failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Response body did not match the expected shape
    #[error("Invalid response body: {0}")]
    Decode(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Any other HTTP client failure
    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout(err.to_string())
        } else if err.is_connect() {
            ClientError::ConnectionFailed(err.to_string())
        } else if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Http(err)
        }
    }
}

impl ClientError {
    /// Build an [`ClientError::Api`] from a status code and raw body.
    ///
    /// Error bodies carry a human-readable `detail` string; validation
    /// errors use a list there instead, which is not surfaced.
    pub fn from_http_status(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string))
            .filter(|d| !d.trim().is_empty());
        ClientError::Api { status, detail }
    }

    /// Server-provided detail message, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ClientError::Api { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// Server detail or the given fallback.
    pub fn detail_or(&self, fallback: &str) -> String {
        self.detail().unwrap_or(fallback).to_string()
    }

    /// HTTP status, when the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns true if the request never got an HTTP answer.
    pub fn is_network_error(&self) -> bool {
        match self {
            ClientError::Timeout(_) | ClientError::ConnectionFailed(_) => true,
            ClientError::Http(e) => e.is_request() || e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }

    /// Get a user-friendly error message.
    pub fn friendly_message(&self) -> String {
        match self {
            ClientError::Api {
                detail: Some(detail),
                ..
            } => detail.clone(),
            ClientError::Api { status, detail: None } => {
                format!("Server returned HTTP {}", status)
            }
            ClientError::Timeout(_) => "Request timed out. Check your connection.".to_string(),
            ClientError::ConnectionFailed(_) => {
                "Could not reach the import server. Check the base URL.".to_string()
            }
            ClientError::Decode(_) => "Server sent an unexpected response.".to_string(),
            _ => format!("Error: {}", self),
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_extracted_from_body() {
        let err = ClientError::from_http_status(400, r#"{"detail":"Only CSV files are allowed"}"#);
        assert_eq!(err.detail(), Some("Only CSV files are allowed"));
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.friendly_message(), "Only CSV files are allowed");
    }

    #[test]
    fn test_validation_detail_list_is_ignored() {
        let body = r#"{"detail":[{"loc":["body","url"],"msg":"invalid url"}]}"#;
        let err = ClientError::from_http_status(422, body);
        assert_eq!(err.detail(), None);
        assert_eq!(err.detail_or("Failed to save webhook"), "Failed to save webhook");
    }

    #[test]
    fn test_non_json_body_has_no_detail() {
        let err = ClientError::from_http_status(502, "<html>Bad Gateway</html>");
        assert_eq!(err.detail(), None);
        assert_eq!(err.friendly_message(), "Server returned HTTP 502");
    }

    #[test]
    fn test_network_classification() {
        let err = ClientError::ConnectionFailed("refused".into());
        assert!(err.is_network_error());
        assert_eq!(err.detail(), None);
        assert_eq!(
            err.friendly_message(),
            "Could not reach the import server. Check the base URL."
        );

        let err = ClientError::Decode("missing field".into());
        assert!(!err.is_network_error());
    }

    #[test]
    fn test_status_only_for_answers() {
        let err = ClientError::from_http_status(404, r#"{"detail":"Import job not found"}"#);
        assert_eq!(err.status(), Some(404));
        assert_eq!(ClientError::Timeout("t".into()).status(), None);
    }
}
