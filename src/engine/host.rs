//! Engine address parsing
//!
//! Accepts the address forms the engine tooling uses:
//! `tcp://host:port`, `http(s)://host:port`, bare `host:port`,
//! `unix:///path/to/socket` and the short `unix:/path/to/socket:/v1.41`.
//! Any of them may carry an API version suffix (`/v1.41`).

use crate::error::{Error, Result};
use url::Url;

/// Default engine address when nothing else is configured
pub const DEFAULT_HOST: &str = "tcp://127.0.0.1:2375";

/// How the engine is reached
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostKind {
    /// Plain HTTP over TCP (`tcp://` and `http://`)
    Http,
    /// HTTPS over TCP
    Https,
    /// Unix domain socket path
    Unix(String),
}

/// A parsed engine address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineHost {
    pub kind: HostKind,
    /// `host:port` for TCP addresses, empty for sockets
    pub authority: String,
    /// API version carried by the address, without the leading `v`
    pub api_version: Option<String>,
}

impl EngineHost {
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(Error::InvalidHost("empty address".to_string()));
        }

        if let Some(rest) = raw.strip_prefix("unix://") {
            return Self::parse_unix(raw, rest);
        }
        if let Some(rest) = raw.strip_prefix("unix:") {
            return Self::parse_unix(raw, rest);
        }

        let with_scheme = if raw.contains("://") {
            raw.to_string()
        } else {
            format!("tcp://{}", raw)
        };
        let url = Url::parse(&with_scheme)
            .map_err(|e| Error::InvalidHost(format!("{}: {}", raw, e)))?;

        let kind = match url.scheme() {
            "tcp" | "http" => HostKind::Http,
            "https" => HostKind::Https,
            other => {
                return Err(Error::InvalidHost(format!(
                    "{}: unsupported scheme {}",
                    raw, other
                )))
            }
        };

        let Some(host) = url.host_str().filter(|h| !h.is_empty()) else {
            return Err(Error::InvalidHost(format!("{}: missing host", raw)));
        };
        let port = url.port().unwrap_or(match kind {
            HostKind::Https => 2376,
            _ => 2375,
        });
        let api_version = parse_version_path(raw, url.path())?;

        Ok(Self {
            kind,
            authority: format!("{}:{}", host, port),
            api_version,
        })
    }

    fn parse_unix(raw: &str, rest: &str) -> Result<Self> {
        // Short form: unix:/var/run/docker.sock:/v1.41
        let (socket, version_path) = match rest.rsplit_once(":/") {
            Some((socket, version)) => (socket, format!("/{}", version)),
            None => (rest, String::new()),
        };
        if socket.is_empty() {
            return Err(Error::InvalidHost(format!("{}: missing socket path", raw)));
        }

        Ok(Self {
            kind: HostKind::Unix(socket.to_string()),
            authority: String::new(),
            api_version: parse_version_path(raw, &version_path)?,
        })
    }

    /// Base URL the HTTP transport talks to
    pub fn base_url(&self) -> Result<String> {
        match &self.kind {
            HostKind::Http => Ok(format!("http://{}", self.authority)),
            HostKind::Https => Ok(format!("https://{}", self.authority)),
            HostKind::Unix(path) => Err(Error::InvalidHost(format!(
                "unix socket {} needs a custom transport",
                path
            ))),
        }
    }

    pub fn is_unix(&self) -> bool {
        matches!(self.kind, HostKind::Unix(_))
    }
}

fn parse_version_path(raw: &str, path: &str) -> Result<Option<String>> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.strip_prefix('v') {
        Some(version) if !version.is_empty() && !version.contains('/') => {
            Ok(Some(version.to_string()))
        }
        _ => Err(Error::InvalidHost(format!(
            "{}: expected an API version path like /v1.41, got {}",
            raw, path
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tcp_host_maps_to_http() {
        let host = EngineHost::parse("tcp://10.0.0.5:2375").unwrap();
        assert_eq!(host.kind, HostKind::Http);
        assert_eq!(host.base_url().unwrap(), "http://10.0.0.5:2375");
        assert_eq!(host.api_version, None);
    }

    #[test]
    fn test_version_suffix_is_extracted() {
        let host = EngineHost::parse("http://localhost:2375/v1.41").unwrap();
        assert_eq!(host.api_version.as_deref(), Some("1.41"));
        assert_eq!(host.base_url().unwrap(), "http://localhost:2375");
    }

    #[test]
    fn test_bare_address_and_default_ports() {
        let host = EngineHost::parse("docker.internal").unwrap();
        assert_eq!(host.authority, "docker.internal:2375");

        let tls = EngineHost::parse("https://docker.internal").unwrap();
        assert_eq!(tls.base_url().unwrap(), "https://docker.internal:2376");
    }

    #[test]
    fn test_short_unix_form() {
        let host = EngineHost::parse("unix:/var/run/docker.sock:/v1.41").unwrap();
        assert_eq!(host.kind, HostKind::Unix("/var/run/docker.sock".to_string()));
        assert_eq!(host.api_version.as_deref(), Some("1.41"));
        assert!(host.is_unix());
        assert!(matches!(host.base_url(), Err(Error::InvalidHost(_))));
    }

    #[test]
    fn test_unix_url_form() {
        let host = EngineHost::parse("unix:///var/run/docker.sock").unwrap();
        assert_eq!(host.kind, HostKind::Unix("/var/run/docker.sock".to_string()));
        assert_eq!(host.api_version, None);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(EngineHost::parse("").is_err());
        assert!(EngineHost::parse("ftp://host:21").is_err());
        assert!(EngineHost::parse("tcp://host:2375/containers").is_err());
        assert!(EngineHost::parse("unix:").is_err());
    }
}
