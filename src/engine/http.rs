//! HTTP transport for engine API calls
//!
//! The executor only needs something that turns a [`TransportRequest`] into
//! a status code and a body. [`HttpTransport`] does that over TCP with
//! reqwest; callers that reach the engine some other way (a Unix socket, an
//! SSH tunnel, a test double) implement [`Transport`] themselves.

use crate::error::Result;
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::Value;
use std::time::Duration;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
pub(crate) fn sanitize_for_log(body: &str) -> String {
    let truncated = match body.char_indices().nth(MAX_LOG_BODY_LENGTH) {
        Some((cut, _)) => format!("{}... [truncated, {} bytes total]", &body[..cut], body.len()),
        None => body.to_string(),
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// A fully resolved request, ready to go on the wire
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

/// Whatever the engine answered, successful or not
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Carries requests to the engine.
///
/// Implementations must resolve with a [`TransportResponse`] for every HTTP
/// answer, including non-2xx ones, and fail only when no answer arrived.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(&self, request: TransportRequest) -> Result<TransportResponse>;
}

/// reqwest-backed transport for `tcp://`, `http://` and `https://` engines
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a new HTTP transport
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(&self, request: TransportRequest) -> Result<TransportResponse> {
        let mut builder = self.client.request(request.method, request.url.as_str());

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(TransportResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_short_bodies() {
        assert_eq!(
            sanitize_for_log(r#"{"message": "node not found"}"#),
            r#"{"message": "node not found"}"#
        );
    }

    #[test]
    fn test_sanitize_truncates_on_char_boundary() {
        let body = "é".repeat(300);
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.contains("[truncated, 600 bytes total]"));
    }

    #[test]
    fn test_sanitize_strips_control_characters() {
        assert_eq!(sanitize_for_log("line one\nline\ttwo"), "line onelinetwo");
    }

    #[test]
    fn test_transport_creation() {
        let result = HttpTransport::new(DEFAULT_TIMEOUT, "dockswarm-test");
        assert!(result.is_ok());
    }

    #[test]
    fn test_success_range() {
        let response = |status| TransportResponse {
            status,
            body: String::new(),
        };
        assert!(response(200).is_success());
        assert!(response(204).is_success());
        assert!(!response(304).is_success());
        assert!(!response(409).is_success());
    }
}
