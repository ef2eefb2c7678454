//! Types shared by several engine resources

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Free-form key/value labels
pub type Labels = HashMap<String, String>;

/// Optimistic-concurrency marker carried by every mutable resource
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ObjectVersion {
    pub index: u64,
}

/// Named driver with options (secret drivers, templating, log drivers)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Driver {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<HashMap<String, String>>,
}

/// TLS material the cluster CA advertises
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TlsInfo {
    #[serde(default)]
    pub trust_root: Option<String>,
    #[serde(default)]
    pub cert_issuer_subject: Option<String>,
    #[serde(default)]
    pub cert_issuer_public_key: Option<String>,
}

/// Acknowledgement of a create call.
///
/// The API documents `Id` but the engine answers `ID` for secrets; both are
/// accepted and land in `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdResponse {
    #[serde(rename = "ID", alias = "Id")]
    pub id: String,
}

/// `filters` query parameter for list calls, e.g. `{"name": ["s1"]}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ListFilters(BTreeMap<String, Vec<String>>);

impl ListFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value for a filter key; repeated keys accumulate
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.0.entry(key.to_string()).or_default().push(value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// JSON form sent on the wire, `None` when no filter is set
    pub fn to_query(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        serde_json::to_string(&self.0).ok()
    }
}
