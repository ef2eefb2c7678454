//! Typed resource access
//!
//! Façades ([`NodeApi`], [`SecretApi`], [`SwarmApi`]) expose the
//! collection-level calls; [`Node`] and [`Secret`] are fetched entities that
//! carry their own id and version for follow-up calls.

mod node;
mod secret;
mod swarm;

pub use node::{Node, NodeApi};
pub use secret::{Secret, SecretApi};
pub use swarm::SwarmApi;

use crate::error::{Error, Result};
use serde_json::Value;

/// Wrap each element of a list response, preserving the engine's order
fn wrap_list<T>(
    raw: Option<Value>,
    what: &'static str,
    wrap: impl FnMut(Value) -> Result<T>,
) -> Result<Vec<T>> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    let items: Vec<Value> =
        serde_json::from_value(raw).map_err(|source| Error::Decode { what, source })?;
    items.into_iter().map(wrap).collect()
}
