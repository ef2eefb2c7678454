//! Engine API access
//!
//! This module provides the plumbing for talking to the engine's management
//! API: address parsing, the transport seam, and the client that ties them
//! to an API version.
//!
//! # Module Structure
//!
//! - [`host`] - Engine address parsing (`tcp://`, `https://`, `unix:`)
//! - [`http`] - The [`Transport`] trait and its reqwest implementation
//! - [`client`] - Main engine client for making API requests
//!
//! # Example
//!
//! ```no_run
//! use dockswarm::EngineClient;
//!
//! async fn example() -> dockswarm::Result<()> {
//!     let client = EngineClient::new("tcp://127.0.0.1:2375/v1.41")?;
//!     let nodes = client.nodes().list().await?;
//!     println!("{} nodes", nodes.len());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod host;
pub mod http;

pub use client::{EngineClient, EngineClientBuilder};
pub use host::{EngineHost, HostKind, DEFAULT_HOST};
pub use http::{HttpTransport, Transport, TransportRequest, TransportResponse};
