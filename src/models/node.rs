//! Swarm node models

use super::common::{Labels, ObjectVersion, TlsInfo};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Node role in the swarm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    Worker,
    Manager,
}

/// Whether the scheduler may place tasks on the node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeAvailability {
    Active,
    Pause,
    Drain,
}

/// Node state as reported by the managers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeState {
    Down,
    Ready,
    Disconnected,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Raft reachability of a manager
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reachability {
    Unreachable,
    Reachable,
    #[default]
    #[serde(other)]
    Unknown,
}

/// User-modifiable node configuration; every field is optional so a spec
/// can be sent as an update patch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NodeSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Labels>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<NodeRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<NodeAvailability>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Platform {
    #[serde(default)]
    pub architecture: Option<String>,
    #[serde(default, rename = "OS")]
    pub os: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NodeResources {
    #[serde(default, rename = "NanoCPUs")]
    pub nano_cpus: Option<i64>,
    #[serde(default)]
    pub memory_bytes: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EnginePlugin {
    #[serde(rename = "Type")]
    pub kind: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EngineDescription {
    #[serde(default)]
    pub engine_version: Option<String>,
    #[serde(default)]
    pub labels: Option<Labels>,
    #[serde(default)]
    pub plugins: Option<Vec<EnginePlugin>>,
}

/// What the node reports about itself
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NodeDescription {
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub platform: Option<Platform>,
    #[serde(default)]
    pub resources: Option<NodeResources>,
    #[serde(default)]
    pub engine: Option<EngineDescription>,
    #[serde(default, rename = "TLSInfo")]
    pub tls_info: Option<TlsInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NodeStatus {
    #[serde(default)]
    pub state: NodeState,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub addr: Option<String>,
}

/// Present only on manager nodes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ManagerStatus {
    #[serde(default)]
    pub leader: bool,
    #[serde(default)]
    pub reachability: Reachability,
    #[serde(default)]
    pub addr: Option<String>,
}

/// A node as returned by NodeList / NodeInspect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NodeInfo {
    #[serde(rename = "ID")]
    pub id: String,
    pub version: ObjectVersion,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub spec: NodeSpec,
    #[serde(default)]
    pub description: Option<NodeDescription>,
    #[serde(default)]
    pub status: Option<NodeStatus>,
    #[serde(default)]
    pub manager_status: Option<ManagerStatus>,
}

impl NodeInfo {
    pub fn is_manager(&self) -> bool {
        self.spec.role == Some(NodeRole::Manager) || self.manager_status.is_some()
    }

    pub fn hostname(&self) -> Option<&str> {
        self.description.as_ref()?.hostname.as_deref()
    }
}
