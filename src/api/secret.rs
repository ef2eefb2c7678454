//! Swarm secrets

use super::wrap_list;
use crate::catalog::{execute_json, Operation, RequestParams};
use crate::engine::EngineClient;
use crate::error::{Error, Result};
use crate::models::{IdResponse, ListFilters, SecretInfo, SecretSpec};
use serde_json::Value;
use std::ops::Deref;

/// Collection-level secret operations
#[derive(Debug, Clone)]
pub struct SecretApi {
    client: EngineClient,
}

impl SecretApi {
    pub fn new(client: EngineClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Secret>> {
        self.list_with(&ListFilters::default()).await
    }

    /// List secrets matching filters (`id`, `label`, `name`, `names`)
    pub async fn list_with(&self, filters: &ListFilters) -> Result<Vec<Secret>> {
        let params = RequestParams::new().query_opt("filters", filters.to_query());
        let raw = self.client.execute(Operation::SecretList, params).await?;
        wrap_list(raw, "SecretList", |value| {
            Secret::from_value(self.client.clone(), value)
        })
    }

    pub async fn get(&self, id: &str) -> Result<Secret> {
        let params = RequestParams::new().path("id", id);
        let raw: Value = execute_json(&self.client, Operation::SecretInspect, params).await?;
        Secret::from_value(self.client.clone(), raw)
    }

    /// Alias of [`SecretApi::get`]
    pub async fn inspect(&self, id: &str) -> Result<Secret> {
        self.get(id).await
    }

    /// Create a secret and return the engine's acknowledgement.
    ///
    /// Only the new id comes back; use [`SecretApi::get`] for the full record.
    pub async fn create(&self, spec: &SecretSpec) -> Result<IdResponse> {
        tracing::info!(
            "creating secret {}",
            spec.name.as_deref().unwrap_or("<unnamed>")
        );
        let params = RequestParams::new().body(spec)?;
        execute_json(&self.client, Operation::SecretCreate, params).await
    }

    /// Update a secret's spec. Only labels may change; `version` must be current.
    pub async fn update(
        &self,
        id: &str,
        version: u64,
        spec: &SecretSpec,
    ) -> Result<Option<Value>> {
        tracing::info!("updating secret {} at version {}", id, version);
        let params = RequestParams::new()
            .path("id", id)
            .query("version", version)
            .body(spec)?;
        self.client.execute(Operation::SecretUpdate, params).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        tracing::info!("deleting secret {}", id);
        let params = RequestParams::new().path("id", id);
        self.client.execute(Operation::SecretDelete, params).await?;
        Ok(())
    }
}

/// A fetched secret with bound operations
#[derive(Debug, Clone)]
pub struct Secret {
    client: EngineClient,
    info: SecretInfo,
    raw: Value,
}

impl Secret {
    pub(crate) fn from_value(client: EngineClient, raw: Value) -> Result<Self> {
        let info = serde_json::from_value(raw.clone()).map_err(|source| Error::Decode {
            what: "Secret",
            source,
        })?;
        Ok(Self { client, info, raw })
    }

    pub fn id(&self) -> &str {
        &self.info.id
    }

    pub fn version(&self) -> u64 {
        self.info.version.index
    }

    pub fn spec(&self) -> &SecretSpec {
        &self.info.spec
    }

    pub fn info(&self) -> &SecretInfo {
        &self.info
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn into_raw(self) -> Value {
        self.raw
    }

    fn api(&self) -> SecretApi {
        SecretApi::new(self.client.clone())
    }

    pub async fn inspect(&self) -> Result<Secret> {
        self.api().get(self.id()).await
    }

    pub async fn update(&self, version: Option<u64>, spec: &SecretSpec) -> Result<Option<Value>> {
        let version = version.unwrap_or_else(|| self.version());
        self.api().update(self.id(), version, spec).await
    }

    pub async fn delete(&self) -> Result<()> {
        self.api().delete(self.id()).await
    }
}

impl Deref for Secret {
    type Target = SecretInfo;

    fn deref(&self) -> &Self::Target {
        &self.info
    }
}
