//! Sphynx
//!
//! Execution core of a graph-analytics server. Graph data lives in a dense
//! entity model (vertex sets, edge bundles, attributes); named operations
//! read entities and parameters and publish new entities.
//!
//! # Layout
//!
//! - `entity`: vertex sets, edge bundles and typed attributes
//! - `param`: loosely typed operation parameters with typed getters
//! - `accessor`: per-execution view of inputs, parameters and outputs
//! - `operation`: the operation registry and the built-in operations
//! - `engine`: conversion to and from the graph-algorithms engine
//! - `server`: request handling on top of an in-memory entity cache
//!
//! ## Example Usage
//!
//! ```rust
//! use sphynx::{EntityAccessor, Entity, OperationRegistry, Params, SphynxConfig};
//! use sphynx_graph_algorithms::Engine;
//! use std::sync::Arc;
//!
//! let config = SphynxConfig::default();
//! let registry = OperationRegistry::with_builtins(Arc::new(Engine::new()), &config.engine).unwrap();
//!
//! let graph = registry.execute("ExampleGraph", EntityAccessor::new(Params::new())).unwrap();
//!
//! let params = Params::new()
//!     .with("op", "PLM")
//!     .with("options", Params::new().with("gamma", 1.0));
//! let ea = EntityAccessor::new(params)
//!     .with_input("vs", Arc::clone(&graph["vertices"]))
//!     .with_input("es", Arc::clone(&graph["edges"]));
//! let outputs = registry.execute("NetworKitCommunityDetection", ea).unwrap();
//!
//! assert!(matches!(outputs["belongsTo"].as_ref(), Entity::EdgeBundle(_)));
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod accessor;
pub mod config;
pub mod engine;
pub mod entity;
pub mod error;
pub mod operation;
pub mod param;
pub mod server;

// Re-export main types for convenience
pub use accessor::{EntityAccessor, Outputs};
pub use config::{EngineConfig, ServerConfig, SphynxConfig};
pub use entity::{
    Attribute, DoubleAttribute, DoubleTuple2, DoubleTuple2Attribute, EdgeBundle, Entity,
    LongAttribute, SphynxId, StringAttribute, VertexSet,
};
pub use error::{SphynxError, SphynxResult};
pub use operation::{Operation, OperationRegistry};
pub use param::{AlgorithmOptions, ParamValue, Params};
pub use server::{EntityCache, OperationRequest, Server};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
        assert_eq!(version(), env!("CARGO_PKG_VERSION"));
    }
}
