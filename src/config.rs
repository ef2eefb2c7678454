//! Configuration Management
//!
//! Handles persistent configuration storage for the dockswarm CLI.

use crate::engine::DEFAULT_HOST;
use anyhow::Result;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How command results are printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Engine address, e.g. `tcp://127.0.0.1:2375`
    #[serde(default)]
    pub host: Option<String>,
    /// API version without the leading `v`
    #[serde(default)]
    pub api_version: Option<String>,
    #[serde(default)]
    pub output: Option<OutputFormat>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("dockswarm").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load configuration from a specific file; missing or unreadable files
    /// yield the defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed config {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Get effective host (config > DOCKER_HOST > default)
    pub fn effective_host(&self) -> String {
        self.host_with_env(env_var("DOCKER_HOST"))
    }

    /// Get effective API version (config > DOCKER_API_VERSION), `None` to
    /// use whatever the host or the catalog says
    pub fn effective_api_version(&self) -> Option<String> {
        self.api_version_with_env(env_var("DOCKER_API_VERSION"))
    }

    fn host_with_env(&self, env: Option<String>) -> String {
        self.host
            .clone()
            .or(env)
            .unwrap_or_else(|| DEFAULT_HOST.to_string())
    }

    fn api_version_with_env(&self, env: Option<String>) -> Option<String> {
        self.api_version.clone().or(env)
    }

    /// Set host and save
    pub fn set_host(&mut self, host: &str) -> Result<()> {
        self.host = Some(host.to_string());
        self.save()
    }

    /// Set API version and save
    pub fn set_api_version(&mut self, version: &str) -> Result<()> {
        self.api_version = Some(version.trim_start_matches('v').to_string());
        self.save()
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            host: Some("tcp://10.0.0.1:2375".to_string()),
            api_version: Some("1.43".to_string()),
            output: Some(OutputFormat::Yaml),
        };
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path), config);
    }

    #[test]
    fn test_missing_or_malformed_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        assert_eq!(Config::load_from(&path), Config::default());

        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(Config::load_from(&path), Config::default());
    }

    #[test]
    fn test_host_precedence() {
        let empty = Config::default();
        assert_eq!(empty.host_with_env(None), DEFAULT_HOST);
        assert_eq!(
            empty.host_with_env(Some("tcp://env:2375".to_string())),
            "tcp://env:2375"
        );

        let configured = Config {
            host: Some("tcp://file:2375".to_string()),
            ..Default::default()
        };
        assert_eq!(
            configured.host_with_env(Some("tcp://env:2375".to_string())),
            "tcp://file:2375"
        );
    }

    #[test]
    fn test_api_version_precedence() {
        let empty = Config::default();
        assert_eq!(empty.api_version_with_env(None), None);
        assert_eq!(
            empty.api_version_with_env(Some("1.40".to_string())).as_deref(),
            Some("1.40")
        );
    }
}
