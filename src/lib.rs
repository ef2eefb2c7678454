//! Typed client for the Docker Engine swarm, node and secret APIs.
//!
//! Every call is described once in an embedded operation catalog and run by
//! a generic executor; the typed façades in [`api`] are thin layers on top.
//!
//! ```no_run
//! use dockswarm::models::SecretSpec;
//! use dockswarm::EngineClient;
//!
//! # async fn example() -> dockswarm::Result<()> {
//! let client = EngineClient::new("tcp://127.0.0.1:2375/v1.41")?;
//!
//! let ack = client.secrets().create(&SecretSpec::new("s1", "VEhJUyBJUyBBIFRFU1Q=")).await?;
//! let secret = client.secrets().get(&ack.id).await?;
//! secret.delete().await?;
//!
//! let swarm = client.swarm().inspect().await?;
//! println!("swarm {} at version {}", swarm.id, swarm.version.index);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;

pub use api::{Node, NodeApi, Secret, SecretApi, SwarmApi};
pub use catalog::{Operation, RequestParams};
pub use engine::{EngineClient, EngineClientBuilder, Transport, TransportRequest, TransportResponse};
pub use error::{Error, Result};
