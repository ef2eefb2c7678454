//! Engine API data models
//!
//! Field names follow the engine's PascalCase JSON. Specs are all-optional
//! so the same type doubles as an update patch.

pub mod common;
pub mod node;
pub mod secret;
pub mod swarm;

pub use common::*;
pub use node::*;
pub use secret::*;
pub use swarm::*;
