//! Conversion layer between the entity model and the graph-algorithms engine
//!
//! - `scope`: scoped ownership of engine objects and the engine lock
//! - `convert`: vertex set + edge bundle + weights -> engine graph
//! - `materialize`: engine partition -> community vertex set + membership

pub mod convert;
pub mod materialize;
pub mod scope;

pub use convert::{to_engine_graph, DEFAULT_WEIGHT};
pub use materialize::{materialize_partition, read_partition};
pub use scope::ForeignScope;

use crate::error::{SphynxError, SphynxResult};
use crate::param::AlgorithmOptions;

/// Community-detection algorithms the engine binding knows how to drive.
///
/// Every variant needs its own object lifetime handling, so the set is
/// closed and matched explicitly.
#[derive(Debug, Clone, PartialEq)]
pub enum Algorithm {
    /// Parallel Louvain Method
    Plm { gamma: f64, refine: bool },
}

impl Algorithm {
    /// Resolve the `op` selector and decode the options that algorithm needs
    pub fn from_selector(selector: &str, options: &AlgorithmOptions) -> SphynxResult<Self> {
        match selector {
            "PLM" => Ok(Algorithm::Plm {
                gamma: options.gamma()?,
                refine: options.refine()?,
            }),
            other => Err(SphynxError::UnsupportedAlgorithm(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Plm { .. } => "PLM",
        }
    }
}
