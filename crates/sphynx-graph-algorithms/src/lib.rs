//! Graph-algorithms engine for Sphynx.
//!
//! The engine owns every object it creates. Callers only ever see opaque
//! handles and must hand each one back through the matching `delete_*` call,
//! the same contract a native library binding imposes. All entry points go
//! through an [`EngineSession`], which holds the engine lock so that the
//! process-wide seed and thread count cannot change underneath a running
//! algorithm.

pub mod common;
pub mod community;
pub mod error;
pub mod partition;
pub mod runtime;

pub use common::{Graph, SymmetricView};
pub use community::{Plm, PlmConfig};
pub use error::{EngineError, EngineResult};
pub use partition::Partition;
pub use runtime::{
    max_threads, Engine, EngineSession, GraphHandle, PartitionHandle, PlmHandle, VectorHandle,
};
