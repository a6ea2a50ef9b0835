//! Error types for the Aurax client

use aurax_core::domain::task::{TaskId, TaskStatus};
use aurax_core::validation::ValidationError;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when using the Aurax client
///
/// Every variant produced from an HTTP response keeps the status code and the
/// raw response body exactly as the service sent them.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request could not be completed (DNS, connect, TLS, I/O)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The service rejected the request payload
    #[error("bad request (status {status}): {body}")]
    BadRequest { status: u16, body: String },

    /// The credentials were missing or rejected
    #[error("authentication failed (status {status}): {body}")]
    Authentication { status: u16, body: String },

    /// The task or resource does not exist
    #[error("not found (status {status}): {body}")]
    NotFound { status: u16, body: String },

    /// Any other non-success response
    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },

    /// Polling gave up before the task reached a terminal status
    #[error("timed out after {elapsed:?} waiting for task {task_id} (last status: {last_status})")]
    Timeout {
        task_id: TaskId,
        elapsed: Duration,
        last_status: TaskStatus,
    },

    /// Failed to parse a response
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// The request was rejected before being sent
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] ValidationError),

    /// Invalid client configuration
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// Classifies a non-success response
    pub fn from_response(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        match status {
            401 | 403 => Self::Authentication { status, body },
            404 => Self::NotFound { status, body },
            400..=499 => Self::BadRequest { status, body },
            _ => Self::Api { status, body },
        }
    }

    /// HTTP status code, when the error came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::BadRequest { status, .. }
            | Self::Authentication { status, .. }
            | Self::NotFound { status, .. }
            | Self::Api { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Raw response body, when the error came from a response
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::BadRequest { body, .. }
            | Self::Authentication { body, .. }
            | Self::NotFound { body, .. }
            | Self::Api { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Response body parsed as JSON, if it is JSON
    pub fn body_json(&self) -> Option<serde_json::Value> {
        self.body().and_then(|body| serde_json::from_str(body).ok())
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether repeating the same call unchanged may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout { .. } => true,
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_response_classification() {
        assert!(matches!(
            ClientError::from_response(400, "missing image"),
            ClientError::BadRequest { status: 400, .. }
        ));
        assert!(matches!(
            ClientError::from_response(422, "bad"),
            ClientError::BadRequest { status: 422, .. }
        ));
        assert!(matches!(
            ClientError::from_response(401, "no key"),
            ClientError::Authentication { status: 401, .. }
        ));
        assert!(matches!(
            ClientError::from_response(404, "no task"),
            ClientError::NotFound { status: 404, .. }
        ));
        assert!(matches!(
            ClientError::from_response(500, "boom"),
            ClientError::Api { status: 500, .. }
        ));
        assert!(matches!(
            ClientError::from_response(302, "moved"),
            ClientError::Api { status: 302, .. }
        ));
    }

    #[test]
    fn test_body_is_kept_verbatim() {
        let err = ClientError::from_response(400, r#"{"error":"personImage is required"}"#);
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.body(), Some(r#"{"error":"personImage is required"}"#));
        assert_eq!(err.body_json().unwrap()["error"], "personImage is required");
        assert!(err.to_string().contains("personImage is required"));
    }

    #[test]
    fn test_retryable() {
        assert!(ClientError::from_response(503, "").is_retryable());
        assert!(!ClientError::from_response(400, "").is_retryable());
        assert!(!ClientError::from_response(401, "").is_retryable());
        assert!(
            ClientError::Timeout {
                task_id: "t".into(),
                elapsed: Duration::from_secs(1),
                last_status: "QUEUED".into(),
            }
            .is_retryable()
        );
    }
}
