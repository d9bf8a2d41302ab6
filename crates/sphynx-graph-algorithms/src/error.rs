//! Error types for the engine

use thiserror::Error;

/// Faults signalled by the engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("invalid {kind} handle {id}")]
    InvalidHandle { kind: &'static str, id: u64 },

    #[error("node {node} out of range for graph with {count} nodes")]
    NodeOutOfRange { node: u64, count: u64 },

    #[error("edge weight {0} is not a finite non-negative number")]
    InvalidWeight(f64),

    #[error("index {index} out of range for vector of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("algorithm has not been run yet")]
    NotRun,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("thread pool error: {0}")]
    ThreadPool(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
