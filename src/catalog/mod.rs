//! Operation catalog
//!
//! This module provides a data-driven approach to calling the engine.
//! Operation descriptors are loaded from JSON at compile time; every typed
//! call in [`crate::api`] is a thin wrapper that fills in a
//! [`RequestParams`] bag and hands it to the generic executor.
//!
//! # Architecture
//!
//! - [`operation`] - The closed set of known operations
//! - [`registry`] - Loads and validates descriptors from embedded JSON
//! - [`executor`] - Resolves a descriptor plus parameters into a transport call
//!
//! # Example
//!
//! ```no_run
//! use dockswarm::catalog::{Operation, RequestParams};
//! use dockswarm::EngineClient;
//!
//! async fn raw_inspect(client: &EngineClient) -> dockswarm::Result<()> {
//!     let params = RequestParams::new().path("id", "24ifsmvkjbyhk");
//!     let node = client.execute(Operation::NodeInspect, params).await?;
//!     println!("{:?}", node);
//!     Ok(())
//! }
//! ```

pub mod executor;
pub mod operation;
pub mod registry;

pub use executor::{execute, execute_json, execute_named, RequestParams};
pub use operation::Operation;
pub(crate) use registry::is_api_version;
pub use registry::{
    get_catalog, get_operation, BodyDef, Catalog, OperationDef, QueryParamDef, QueryType,
    ResponseKind,
};
