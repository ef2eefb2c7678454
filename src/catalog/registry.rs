//! Operation Registry - Load operation descriptors from JSON
//!
//! The engine operations are described in an embedded JSON table that is
//! parsed and validated once, on first access. Every [`Operation`] variant
//! must have exactly one well-formed descriptor.

use super::operation::Operation;
use crate::error::{Error, Result};
use reqwest::Method;
use serde::{Deserialize, Deserializer};
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

/// Embedded operation table (compiled into the binary)
const CATALOG_SOURCE: &str = include_str!("../operations/engine.json");

/// Wire type of a query parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    Boolean,
    Integer,
    String,
    /// JSON document sent as a string (e.g. `filters`)
    Json,
}

/// Query parameter definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct QueryParamDef {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: QueryType,
    #[serde(default)]
    pub required: bool,
}

/// Request body definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct BodyDef {
    /// Engine schema name of the payload
    pub schema: String,
    #[serde(default)]
    pub required: bool,
}

/// What a successful response carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    Json,
    Empty,
}

/// Operation descriptor from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct OperationDef {
    #[serde(deserialize_with = "deserialize_method")]
    pub method: Method,
    /// Path template relative to the versioned API root, e.g. `/nodes/{id}`
    pub path: String,
    #[serde(default)]
    pub path_params: Vec<String>,
    #[serde(default)]
    pub query: Vec<QueryParamDef>,
    #[serde(default)]
    pub body: Option<BodyDef>,
    pub response: ResponseKind,
}

impl OperationDef {
    /// Look up a query parameter definition by name
    pub fn query_param(&self, name: &str) -> Option<&QueryParamDef> {
        self.query.iter().find(|q| q.name == name)
    }

    /// Whether the operation refuses to run without a body
    pub fn requires_body(&self) -> bool {
        self.body.as_ref().is_some_and(|b| b.required)
    }
}

fn deserialize_method<'de, D>(deserializer: D) -> std::result::Result<Method, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Method::from_bytes(raw.as_bytes()).map_err(serde::de::Error::custom)
}

/// Root structure of operations/engine.json
#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
    /// Default engine API version, `<major>.<minor>`
    pub api_version: String,
    pub operations: HashMap<String, OperationDef>,
}

impl Catalog {
    /// Parse and validate a catalog document
    pub fn parse(source: &str) -> Result<Self> {
        let catalog: Catalog = serde_json::from_str(source)
            .map_err(|e| Error::Catalog(format!("failed to parse operation table: {}", e)))?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Check that every descriptor is well formed and that the table covers
    /// exactly the known operations
    pub fn validate(&self) -> Result<()> {
        if !is_api_version(&self.api_version) {
            return Err(Error::Catalog(format!(
                "api_version must look like <major>.<minor>, got {:?}",
                self.api_version
            )));
        }

        for op in Operation::ALL {
            if !self.operations.contains_key(op.as_str()) {
                return Err(Error::Catalog(format!("missing descriptor for {}", op)));
            }
        }

        for (name, def) in &self.operations {
            name.parse::<Operation>()
                .map_err(|_| Error::Catalog(format!("descriptor for unknown operation {}", name)))?;
            validate_descriptor(name, def)?;
        }

        Ok(())
    }

    /// Descriptor for an operation
    pub fn operation(&self, op: Operation) -> Result<&OperationDef> {
        self.operations
            .get(op.as_str())
            .ok_or_else(|| Error::Catalog(format!("missing descriptor for {}", op)))
    }
}

fn validate_descriptor(name: &str, def: &OperationDef) -> Result<()> {
    let fail = |reason: String| Error::Catalog(format!("{}: {}", name, reason));

    if ![Method::GET, Method::POST, Method::PUT, Method::DELETE].contains(&def.method) {
        return Err(fail(format!("unsupported method {}", def.method)));
    }
    if !def.path.starts_with('/') {
        return Err(fail(format!("path {:?} must start with '/'", def.path)));
    }

    let placeholders = template_placeholders(&def.path).map_err(fail)?;
    let declared: HashSet<&str> = def.path_params.iter().map(String::as_str).collect();
    if declared.len() != def.path_params.len() {
        return Err(fail("duplicate path parameter".to_string()));
    }
    let in_template: HashSet<&str> = placeholders.iter().copied().collect();
    if declared != in_template {
        return Err(fail(format!(
            "path parameters {:?} do not match template {:?}",
            def.path_params, def.path
        )));
    }

    let mut seen = HashSet::new();
    for param in &def.query {
        if param.name.is_empty() {
            return Err(fail("empty query parameter name".to_string()));
        }
        if !seen.insert(param.name.as_str()) {
            return Err(fail(format!("duplicate query parameter {}", param.name)));
        }
    }

    if let Some(body) = &def.body {
        if body.schema.is_empty() {
            return Err(fail("body schema must be named".to_string()));
        }
    }

    Ok(())
}

/// Extract `{name}` placeholders from a path template
pub(crate) fn template_placeholders(template: &str) -> std::result::Result<Vec<&str>, String> {
    let mut names = Vec::new();
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        if rest[..start].contains('}') {
            return Err(format!("stray '}}' in {:?}", template));
        }
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            return Err(format!("unclosed placeholder in {:?}", template));
        };
        let name = &after[..end];
        if name.is_empty() || name.contains('{') {
            return Err(format!("malformed placeholder in {:?}", template));
        }
        names.push(name);
        rest = &after[end + 1..];
    }

    if rest.contains('}') {
        return Err(format!("stray '}}' in {:?}", template));
    }

    Ok(names)
}

pub(crate) fn is_api_version(version: &str) -> bool {
    let Some((major, minor)) = version.split_once('.') else {
        return false;
    };
    let numeric = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    numeric(major) && numeric(minor)
}

/// Global catalog loaded from JSON
static CATALOG: OnceLock<std::result::Result<Catalog, String>> = OnceLock::new();

/// Get the operation catalog (parses and validates on first access)
pub fn get_catalog() -> Result<&'static Catalog> {
    CATALOG
        .get_or_init(|| Catalog::parse(CATALOG_SOURCE).map_err(|e| e.to_string()))
        .as_ref()
        .map_err(|e| Error::Catalog(e.clone()))
}

/// Get the descriptor for an operation
pub fn get_operation(op: Operation) -> Result<&'static OperationDef> {
    get_catalog()?.operation(op)
}
