//! Community detection through the graph-algorithms engine
//!
//! Inputs: `vs` (vertices), `es` (edges), optional `weight` on `es`.
//! Parameters: `op` selects the algorithm, `options` holds its settings
//! (`gamma`, `seed`, `directed`, `refine`, `threads`).
//! Outputs: `partitions` (one vertex per community) and `belongsTo`
//! (vertex -> community).

use super::Operation;
use crate::accessor::EntityAccessor;
use crate::engine::{materialize_partition, read_partition, to_engine_graph, Algorithm, ForeignScope};
use crate::error::{SphynxError, SphynxResult};
use crate::param::AlgorithmOptions;
use sphynx_graph_algorithms::Engine;
use std::sync::Arc;
use tracing::debug;

pub struct CommunityDetection {
    engine: Arc<Engine>,
    /// Thread count used when the options do not set one; None = environment
    threads: Option<usize>,
}

impl CommunityDetection {
    pub const NAME: &'static str = "NetworKitCommunityDetection";

    pub fn new(engine: Arc<Engine>, threads: Option<usize>) -> Self {
        Self { engine, threads }
    }
}

impl Operation for CommunityDetection {
    fn execute(&self, ea: &mut EntityAccessor) -> SphynxResult<()> {
        let options = AlgorithmOptions::new(ea.params().opt_map("options")?.unwrap_or_default());
        let algorithm = Algorithm::from_selector(ea.get_string_param("op")?, &options)?;
        let seed = options.seed()?;
        let threads = options.threads()?.or(self.threads);
        let directed = options.directed();

        let vs = ea.get_vertex_set("vs")?;
        let es = ea.get_edge_bundle("es")?;
        let weight = ea.get_double_attribute_opt("weight")?;

        let (partitions, belongs_to) = {
            let mut scope = ForeignScope::enter(&self.engine);

            let session = scope.session_mut();
            session.set_seed(seed);
            match threads {
                Some(t) => session.set_number_of_threads(t)?,
                None => session.set_threads_from_env(),
            }

            let g = to_engine_graph(&mut scope, vs, es, weight, directed)?;
            let p = match algorithm {
                Algorithm::Plm { gamma, refine } => {
                    let c = scope.new_plm(g, refine, gamma)?;
                    scope.session_mut().run_plm(c)?;
                    scope.plm_partition(c)?
                }
            };

            let (subsets, labels) = read_partition(&mut scope, p)?;
            if labels.len() != vs.size() {
                return Err(SphynxError::ExternalEngineFailure(format!(
                    "partition covers {} vertices, expected {}",
                    labels.len(),
                    vs.size()
                )));
            }
            debug!(
                "{} found {} communities among {} vertices",
                algorithm.name(),
                subsets,
                labels.len()
            );
            materialize_partition(subsets, &labels)?
        };

        ea.output("partitions", partitions)?;
        ea.output("belongsTo", belongs_to)?;
        Ok(())
    }
}
