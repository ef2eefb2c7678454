//! Engine Client
//!
//! Main client for interacting with the engine API, combining the
//! transport, the engine address and the API version prefix.

use super::host::{EngineHost, DEFAULT_HOST};
use super::http::{HttpTransport, Transport, DEFAULT_TIMEOUT};
use crate::api::{NodeApi, SecretApi, SwarmApi};
use crate::catalog::{self, Operation, RequestParams};
use crate::error::{Error, Result};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Base URL used when a custom transport reaches the engine over a socket
const SOCKET_BASE_URL: &str = "http://localhost";

/// Main engine client
///
/// Cheap to clone; clones share the transport. Entities returned by the
/// façades keep a clone so they can act on themselves later.
#[derive(Clone)]
pub struct EngineClient {
    transport: Arc<dyn Transport>,
    base_url: String,
    api_version: String,
}

impl fmt::Debug for EngineClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineClient")
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .finish_non_exhaustive()
    }
}

impl EngineClient {
    /// Create a client for an engine address such as `tcp://127.0.0.1:2375/v1.41`
    pub fn new(host: &str) -> Result<Self> {
        Self::builder().host(host).build()
    }

    pub fn builder() -> EngineClientBuilder {
        EngineClientBuilder::default()
    }

    /// API version used in the path prefix, e.g. `1.41`
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    /// Build the absolute URL for a resolved operation path
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/v{}{}", self.base_url, self.api_version, path)
    }

    /// Run a catalog operation
    pub async fn execute(&self, op: Operation, params: RequestParams) -> Result<Option<Value>> {
        catalog::execute(self, op, params).await
    }

    /// Run a catalog operation looked up by its engine name
    pub async fn execute_named(&self, name: &str, params: RequestParams) -> Result<Option<Value>> {
        catalog::execute_named(self, name, params).await
    }

    // =========================================================================
    // Resource façades
    // =========================================================================

    pub fn nodes(&self) -> NodeApi {
        NodeApi::new(self.clone())
    }

    pub fn secrets(&self) -> SecretApi {
        SecretApi::new(self.clone())
    }

    pub fn swarm(&self) -> SwarmApi {
        SwarmApi::new(self.clone())
    }
}

/// Builder for [`EngineClient`]
pub struct EngineClientBuilder {
    host: Option<String>,
    api_version: Option<String>,
    timeout: Duration,
    user_agent: String,
    transport: Option<Arc<dyn Transport>>,
}

impl Default for EngineClientBuilder {
    fn default() -> Self {
        Self {
            host: None,
            api_version: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("dockswarm/{}", env!("CARGO_PKG_VERSION")),
            transport: None,
        }
    }
}

impl EngineClientBuilder {
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Override the API version; wins over a version carried by the host
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into().trim_start_matches('v').to_string());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Use a caller-supplied transport instead of the built-in HTTP one
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> Result<EngineClient> {
        // Fail fast on a malformed operation table
        let catalog = catalog::get_catalog()?;

        let host = EngineHost::parse(self.host.as_deref().unwrap_or(DEFAULT_HOST))?;

        let api_version = self
            .api_version
            .or_else(|| host.api_version.clone())
            .unwrap_or_else(|| catalog.api_version.clone());
        if !catalog::is_api_version(&api_version) {
            return Err(Error::InvalidHost(format!(
                "invalid API version {:?}",
                api_version
            )));
        }

        let (transport, base_url): (Arc<dyn Transport>, String) = match self.transport {
            Some(transport) if host.is_unix() => (transport, SOCKET_BASE_URL.to_string()),
            Some(transport) => (transport, host.base_url()?),
            None => {
                let base_url = host.base_url()?;
                let transport = HttpTransport::new(self.timeout, &self.user_agent)?;
                (Arc::new(transport), base_url)
            }
        };

        tracing::debug!("engine client: base={}, api=v{}", base_url, api_version);

        Ok(EngineClient {
            transport,
            base_url,
            api_version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = EngineClient::new("tcp://127.0.0.1:2375").unwrap();
        assert_eq!(client.api_version(), "1.41");
        assert_eq!(client.base_url(), "http://127.0.0.1:2375");
    }

    #[test]
    fn test_endpoint_is_version_prefixed() {
        let client = EngineClient::new("tcp://127.0.0.1:2375/v1.43").unwrap();
        assert_eq!(
            client.endpoint("/nodes/abc"),
            "http://127.0.0.1:2375/v1.43/nodes/abc"
        );
    }

    #[test]
    fn test_explicit_version_wins_over_host() {
        let client = EngineClient::builder()
            .host("tcp://127.0.0.1:2375/v1.43")
            .api_version("v1.40")
            .build()
            .unwrap();
        assert_eq!(client.api_version(), "1.40");
    }

    #[test]
    fn test_bad_version_is_rejected() {
        let result = EngineClient::builder().api_version("latest").build();
        assert!(matches!(result, Err(Error::InvalidHost(_))));
    }

    #[test]
    fn test_unix_host_requires_custom_transport() {
        let result = EngineClient::new("unix:/var/run/docker.sock:/v1.41");
        assert!(matches!(result, Err(Error::InvalidHost(_))));
    }

    #[test]
    fn test_debug_hides_transport() {
        let client = EngineClient::new("tcp://127.0.0.1:2375").unwrap();
        let rendered = format!("{:?}", client);
        assert!(rendered.contains("base_url"));
        assert!(rendered.contains(".."));
    }
}
