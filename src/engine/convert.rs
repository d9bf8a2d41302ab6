//! Entity model -> engine graph

use super::scope::ForeignScope;
use crate::entity::{DoubleAttribute, EdgeBundle, VertexSet};
use crate::error::SphynxResult;
use sphynx_graph_algorithms::GraphHandle;
use tracing::debug;

/// Weight of an edge with no weight attribute, or an undefined entry in one
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// Build an engine graph with one node per vertex and one edge per bundle
/// entry, in bundle order.
///
/// Without a weight attribute every edge weighs [`DEFAULT_WEIGHT`]. Entries
/// of the weight attribute that are not defined fall back to the same
/// default.
pub fn to_engine_graph(
    scope: &mut ForeignScope<'_>,
    vs: &VertexSet,
    es: &EdgeBundle,
    weight: Option<&DoubleAttribute>,
    directed: bool,
) -> SphynxResult<GraphHandle> {
    es.check_lengths()?;
    if let Some(w) = weight {
        w.validate(es.size())?;
    }

    let g = scope.new_graph(vs.size() as u64, weight.is_some(), directed);

    let mut undefined = 0usize;
    for (i, (src, dst)) in es.edges().enumerate() {
        let w = match weight {
            None => DEFAULT_WEIGHT,
            Some(attr) => match attr.get(i) {
                Some(&w) => w,
                None => {
                    undefined += 1;
                    DEFAULT_WEIGHT
                }
            },
        };
        scope.session_mut().add_edge(g, src as u64, dst as u64, w)?;
    }

    if undefined > 0 {
        debug!("{} of {} edge weights undefined, using {}", undefined, es.size(), DEFAULT_WEIGHT);
    }
    Ok(g)
}
