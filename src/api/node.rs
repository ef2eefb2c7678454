//! Swarm nodes
//!
//! [`NodeApi`] covers the collection; a fetched [`Node`] can inspect, update
//! and delete itself using the id and version it was fetched with.

use super::wrap_list;
use crate::catalog::{execute_json, Operation, RequestParams};
use crate::engine::EngineClient;
use crate::error::{Error, Result};
use crate::models::{ListFilters, NodeInfo, NodeSpec};
use serde_json::Value;
use std::ops::Deref;

/// Collection-level node operations
#[derive(Debug, Clone)]
pub struct NodeApi {
    client: EngineClient,
}

impl NodeApi {
    pub fn new(client: EngineClient) -> Self {
        Self { client }
    }

    /// List all nodes, in the order the engine returns them
    pub async fn list(&self) -> Result<Vec<Node>> {
        self.list_with(&ListFilters::default()).await
    }

    /// List nodes matching filters (`id`, `label`, `membership`, `name`, `role`)
    pub async fn list_with(&self, filters: &ListFilters) -> Result<Vec<Node>> {
        let params = RequestParams::new().query_opt("filters", filters.to_query());
        let raw = self.client.execute(Operation::NodeList, params).await?;
        wrap_list(raw, "NodeList", |value| Node::from_value(self.client.clone(), value))
    }

    /// Fetch a single node
    pub async fn get(&self, id: &str) -> Result<Node> {
        let params = RequestParams::new().path("id", id);
        let raw: Value = execute_json(&self.client, Operation::NodeInspect, params).await?;
        Node::from_value(self.client.clone(), raw)
    }

    /// Alias of [`NodeApi::get`]
    pub async fn inspect(&self, id: &str) -> Result<Node> {
        self.get(id).await
    }

    /// Replace a node's spec. `version` must be the node's current `Version.Index`.
    pub async fn update(&self, id: &str, version: u64, spec: &NodeSpec) -> Result<Option<Value>> {
        tracing::info!("updating node {} at version {}", id, version);
        let params = RequestParams::new()
            .path("id", id)
            .query("version", version)
            .body(spec)?;
        self.client.execute(Operation::NodeUpdate, params).await
    }

    /// Remove a node from the swarm. The engine refuses to remove managers
    /// and nodes that are still up.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.remove(id, false).await
    }

    /// Remove a node even if it is still up
    pub async fn force_delete(&self, id: &str) -> Result<()> {
        self.remove(id, true).await
    }

    async fn remove(&self, id: &str, force: bool) -> Result<()> {
        tracing::info!("deleting node {} (force={})", id, force);
        let params = RequestParams::new()
            .path("id", id)
            .query_opt("force", force.then_some(true));
        self.client.execute(Operation::NodeDelete, params).await?;
        Ok(())
    }
}

/// A fetched node: a snapshot of the engine's record plus bound operations.
///
/// The snapshot is never refreshed; call [`Node::inspect`] for a new one.
#[derive(Debug, Clone)]
pub struct Node {
    client: EngineClient,
    info: NodeInfo,
    raw: Value,
}

impl Node {
    pub(crate) fn from_value(client: EngineClient, raw: Value) -> Result<Self> {
        let info = serde_json::from_value(raw.clone()).map_err(|source| Error::Decode {
            what: "Node",
            source,
        })?;
        Ok(Self { client, info, raw })
    }

    pub fn id(&self) -> &str {
        &self.info.id
    }

    /// `Version.Index` at the time of the fetch
    pub fn version(&self) -> u64 {
        self.info.version.index
    }

    pub fn spec(&self) -> &NodeSpec {
        &self.info.spec
    }

    pub fn info(&self) -> &NodeInfo {
        &self.info
    }

    /// The JSON the engine returned for this node
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn into_raw(self) -> Value {
        self.raw
    }

    fn api(&self) -> NodeApi {
        NodeApi::new(self.client.clone())
    }

    /// Fetch a fresh snapshot of this node
    pub async fn inspect(&self) -> Result<Node> {
        self.api().get(self.id()).await
    }

    /// Update this node with its own version, or `version` when given
    pub async fn update(&self, version: Option<u64>, spec: &NodeSpec) -> Result<Option<Value>> {
        let version = version.unwrap_or_else(|| self.version());
        self.api().update(self.id(), version, spec).await
    }

    pub async fn delete(&self) -> Result<()> {
        self.api().delete(self.id()).await
    }

    pub async fn force_delete(&self) -> Result<()> {
        self.api().force_delete(self.id()).await
    }
}

impl Deref for Node {
    type Target = NodeInfo;

    fn deref(&self) -> &Self::Target {
        &self.info
    }
}
