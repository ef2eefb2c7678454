//! Error types for dockswarm

use reqwest::StatusCode;
use thiserror::Error;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// dockswarm error types
#[derive(Error, Debug)]
pub enum Error {
    /// No HTTP response was received at all
    #[error("Transport error: {0}")]
    Transport(String),

    /// The engine answered with a non-2xx status
    #[error("Response code {status} ({})", reason(.status))]
    Request {
        status: u16,
        message: String,
        body: String,
    },

    #[error("Missing required parameter: {name} (operation {operation})")]
    MissingParameter {
        operation: &'static str,
        name: String,
    },

    #[error("Invalid parameter {name} for {operation}: {reason}")]
    InvalidParameter {
        operation: &'static str,
        name: String,
        reason: String,
    },

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Invalid operation catalog: {0}")]
    Catalog(String),

    #[error("Invalid engine host: {0}")]
    InvalidHost(String),

    #[error("Failed to decode {what}: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// HTTP status of a remote rejection
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Request { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Engine-provided message of a remote rejection
    pub fn message(&self) -> Option<&str> {
        match self {
            Error::Request { message, .. } => Some(message),
            _ => None,
        }
    }

    /// 409: stale version index, or an unlock against a cluster that is not locked
    pub fn is_conflict(&self) -> bool {
        self.status() == Some(409)
    }

    /// 404: the resource does not exist
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// 503: node is not part of a swarm, or the join target is unreachable
    pub fn is_unavailable(&self) -> bool {
        self.status() == Some(503)
    }
}

fn reason(status: &u16) -> &'static str {
    StatusCode::from_u16(*status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown")
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_error(status: u16) -> Error {
        Error::Request {
            status,
            message: "boom".to_string(),
            body: String::new(),
        }
    }

    #[test]
    fn test_request_error_display_matches_status_line() {
        assert_eq!(
            request_error(503).to_string(),
            "Response code 503 (Service Unavailable)"
        );
        assert_eq!(request_error(409).to_string(), "Response code 409 (Conflict)");
        assert_eq!(request_error(599).to_string(), "Response code 599 (Unknown)");
    }

    #[test]
    fn test_status_helpers() {
        assert!(request_error(409).is_conflict());
        assert!(request_error(404).is_not_found());
        assert!(request_error(503).is_unavailable());
        assert!(!request_error(500).is_conflict());
        assert_eq!(request_error(500).message(), Some("boom"));

        let local = Error::UnknownOperation("NodeFrobnicate".to_string());
        assert_eq!(local.status(), None);
        assert!(!local.is_not_found());
    }
}
