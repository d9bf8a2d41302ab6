//! Engine runtime: object table, global configuration and the session API
//!
//! Objects are addressed by opaque handles and live until the matching
//! `delete_*` call. The random seed and the thread count are engine-wide
//! settings; a session holds the engine lock, so everything done through
//! one session observes one consistent configuration.

use super::common::Graph;
use super::community::{Plm, PlmConfig};
use super::error::{EngineError, EngineResult};
use super::partition::Partition;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::ThreadPool;
use rustc_hash::FxHashMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use tracing::{debug, trace, warn};

/// Environment variable consulted by `set_threads_from_env`
pub const THREADS_ENV: &str = "OMP_NUM_THREADS";

macro_rules! handle_type {
    ($name:ident, $kind:literal) => {
        #[doc = concat!("Opaque handle to an engine-owned ", $kind, " object")]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(u64);

        impl $name {
            pub const KIND: &'static str = $kind;

            pub fn id(&self) -> u64 {
                self.0
            }
        }
    };
}

handle_type!(GraphHandle, "graph");
handle_type!(PlmHandle, "PLM");
handle_type!(PartitionHandle, "partition");
handle_type!(VectorHandle, "vector");

enum Object {
    Graph(Graph),
    Plm { graph: GraphHandle, plm: Plm },
    Partition(Partition),
    Vector(Vec<u64>),
}

struct EngineState {
    next_id: u64,
    objects: FxHashMap<u64, Object>,
    rng: StdRng,
    threads: usize,
    /// Worker pool for `threads`, built on first use after a change
    pool: Option<ThreadPool>,
}

impl EngineState {
    fn new() -> Self {
        Self {
            next_id: 1,
            objects: FxHashMap::default(),
            rng: StdRng::from_entropy(),
            threads: max_threads(),
            pool: None,
        }
    }

    fn insert(&mut self, object: Object) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.objects.insert(id, object);
        id
    }
}

/// The graph-algorithms engine
pub struct Engine {
    state: Mutex<EngineState>,
}

impl Engine {
    /// Create an isolated engine instance
    pub fn new() -> Self {
        Self {
            state: Mutex::new(EngineState::new()),
        }
    }

    /// The process-wide engine instance
    pub fn global() -> Arc<Engine> {
        static GLOBAL: OnceLock<Arc<Engine>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(Engine::new())))
    }

    /// Enter the engine. Blocks while another session is open.
    pub fn lock(&self) -> EngineSession<'_> {
        // A panic inside a session must not take the engine down with it
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        EngineSession { state }
    }

    /// Number of objects created and not yet deleted
    pub fn live_objects(&self) -> usize {
        self.lock().live_objects()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// Exclusive access to the engine
pub struct EngineSession<'e> {
    state: MutexGuard<'e, EngineState>,
}

impl EngineSession<'_> {
    /// Reseed the engine RNG
    pub fn set_seed(&mut self, seed: u64) {
        debug!("engine seed set to {}", seed);
        self.state.rng = StdRng::seed_from_u64(seed);
    }

    /// Set the worker count. Requests above [`max_threads`] are capped.
    pub fn set_number_of_threads(&mut self, threads: usize) -> EngineResult<()> {
        if threads == 0 {
            return Err(EngineError::InvalidArgument(
                "number of threads must be positive".to_string(),
            ));
        }
        self.apply_threads(threads);
        Ok(())
    }

    /// Take the thread count from `OMP_NUM_THREADS`, falling back to the
    /// available parallelism.
    pub fn set_threads_from_env(&mut self) {
        let threads = std::env::var(THREADS_ENV)
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or_else(max_threads);
        self.apply_threads(threads);
    }

    fn apply_threads(&mut self, requested: usize) {
        let limit = max_threads();
        if requested > limit {
            warn!("{} threads requested, capped at {}", requested, limit);
        }
        let threads = requested.min(limit);
        if threads != self.state.threads {
            self.state.pool = None;
        }
        debug!("engine threads set to {}", threads);
        self.state.threads = threads;
    }

    pub fn number_of_threads(&self) -> usize {
        self.state.threads
    }

    pub fn live_objects(&self) -> usize {
        self.state.objects.len()
    }

    // ---- graph ----

    pub fn new_graph(&mut self, nodes: u64, weighted: bool, directed: bool) -> GraphHandle {
        let id = self
            .state
            .insert(Object::Graph(Graph::new(nodes as usize, weighted, directed)));
        trace!("created graph {} with {} nodes", id, nodes);
        GraphHandle(id)
    }

    pub fn add_edge(&mut self, g: GraphHandle, u: u64, v: u64, weight: f64) -> EngineResult<()> {
        self.graph_mut(g)?.add_edge(u as usize, v as usize, weight)
    }

    pub fn number_of_nodes(&self, g: GraphHandle) -> EngineResult<u64> {
        Ok(self.graph(g)?.node_count() as u64)
    }

    pub fn number_of_edges(&self, g: GraphHandle) -> EngineResult<u64> {
        Ok(self.graph(g)?.edge_count() as u64)
    }

    pub fn total_edge_weight(&self, g: GraphHandle) -> EngineResult<f64> {
        Ok(self.graph(g)?.total_edge_weight())
    }

    pub fn delete_graph(&mut self, g: GraphHandle) -> EngineResult<()> {
        self.remove(g.0, GraphHandle::KIND, |o| matches!(o, Object::Graph(_)))
    }

    // ---- PLM ----

    pub fn new_plm(&mut self, g: GraphHandle, refine: bool, gamma: f64) -> EngineResult<PlmHandle> {
        self.graph(g)?;
        if !gamma.is_finite() || gamma < 0.0 {
            return Err(EngineError::InvalidArgument(format!(
                "resolution must be a finite non-negative number, got {}",
                gamma
            )));
        }
        let plm = Plm::new(PlmConfig {
            gamma,
            refine,
            ..Default::default()
        });
        Ok(PlmHandle(self.state.insert(Object::Plm { graph: g, plm })))
    }

    pub fn run_plm(&mut self, c: PlmHandle) -> EngineResult<()> {
        let state = &mut *self.state;
        let threads = state.threads;
        let pool = match state.pool.take() {
            Some(pool) => pool,
            None => rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| EngineError::ThreadPool(e.to_string()))?,
        };
        let result = run_on(state, c, &pool, threads);
        state.pool = Some(pool);
        result
    }

    /// Copy the PLM result into a new partition object
    pub fn plm_partition(&mut self, c: PlmHandle) -> EngineResult<PartitionHandle> {
        let partition = match self.state.objects.get(&c.0) {
            Some(Object::Plm { plm, .. }) => plm.partition().cloned().ok_or(EngineError::NotRun)?,
            _ => return Err(invalid(c.0, PlmHandle::KIND)),
        };
        Ok(PartitionHandle(self.state.insert(Object::Partition(partition))))
    }

    pub fn delete_plm(&mut self, c: PlmHandle) -> EngineResult<()> {
        self.remove(c.0, PlmHandle::KIND, |o| matches!(o, Object::Plm { .. }))
    }

    // ---- partition ----

    pub fn number_of_subsets(&self, p: PartitionHandle) -> EngineResult<u64> {
        Ok(self.partition(p)?.number_of_subsets())
    }

    pub fn number_of_elements(&self, p: PartitionHandle) -> EngineResult<u64> {
        Ok(self.partition(p)?.number_of_elements())
    }

    /// Copy the subset assignment into a new vector object
    pub fn partition_vector(&mut self, p: PartitionHandle) -> EngineResult<VectorHandle> {
        let labels = self.partition(p)?.vector().to_vec();
        Ok(VectorHandle(self.state.insert(Object::Vector(labels))))
    }

    pub fn delete_partition(&mut self, p: PartitionHandle) -> EngineResult<()> {
        self.remove(p.0, PartitionHandle::KIND, |o| matches!(o, Object::Partition(_)))
    }

    // ---- vector ----

    pub fn vector_len(&self, v: VectorHandle) -> EngineResult<usize> {
        Ok(self.vector(v)?.len())
    }

    pub fn vector_get(&self, v: VectorHandle, index: usize) -> EngineResult<u64> {
        let values = self.vector(v)?;
        values.get(index).copied().ok_or(EngineError::IndexOutOfRange {
            index,
            len: values.len(),
        })
    }

    pub fn delete_vector(&mut self, v: VectorHandle) -> EngineResult<()> {
        self.remove(v.0, VectorHandle::KIND, |o| matches!(o, Object::Vector(_)))
    }

    // ---- lookups ----

    fn graph(&self, g: GraphHandle) -> EngineResult<&Graph> {
        match self.state.objects.get(&g.0) {
            Some(Object::Graph(graph)) => Ok(graph),
            _ => Err(invalid(g.0, GraphHandle::KIND)),
        }
    }

    fn graph_mut(&mut self, g: GraphHandle) -> EngineResult<&mut Graph> {
        match self.state.objects.get_mut(&g.0) {
            Some(Object::Graph(graph)) => Ok(graph),
            _ => Err(invalid(g.0, GraphHandle::KIND)),
        }
    }

    fn partition(&self, p: PartitionHandle) -> EngineResult<&Partition> {
        match self.state.objects.get(&p.0) {
            Some(Object::Partition(partition)) => Ok(partition),
            _ => Err(invalid(p.0, PartitionHandle::KIND)),
        }
    }

    fn vector(&self, v: VectorHandle) -> EngineResult<&Vec<u64>> {
        match self.state.objects.get(&v.0) {
            Some(Object::Vector(values)) => Ok(values),
            _ => Err(invalid(v.0, VectorHandle::KIND)),
        }
    }

    fn remove(&mut self, id: u64, kind: &'static str, is_kind: fn(&Object) -> bool) -> EngineResult<()> {
        match self.state.objects.get(&id) {
            Some(object) if is_kind(object) => {
                self.state.objects.remove(&id);
                trace!("deleted {} {}", kind, id);
                Ok(())
            }
            _ => Err(invalid(id, kind)),
        }
    }
}

fn run_on(state: &mut EngineState, c: PlmHandle, pool: &ThreadPool, threads: usize) -> EngineResult<()> {
    // Take the PLM out so the graph can be borrowed alongside it
    let (graph_handle, mut plm) = match state.objects.remove(&c.0) {
        Some(Object::Plm { graph, plm }) => (graph, plm),
        Some(other) => {
            state.objects.insert(c.0, other);
            return Err(invalid(c.0, PlmHandle::KIND));
        }
        None => return Err(invalid(c.0, PlmHandle::KIND)),
    };

    let result = match state.objects.get(&graph_handle.0) {
        Some(Object::Graph(graph)) => {
            debug!(
                "running PLM on {} nodes, {} edges, {} threads",
                graph.node_count(),
                graph.edge_count(),
                threads
            );
            plm.run(graph, &mut state.rng, pool);
            Ok(())
        }
        _ => Err(invalid(graph_handle.0, GraphHandle::KIND)),
    };

    state.objects.insert(
        c.0,
        Object::Plm {
            graph: graph_handle,
            plm,
        },
    );
    result
}

fn invalid(id: u64, kind: &'static str) -> EngineError {
    EngineError::InvalidHandle { kind, id }
}

/// Upper bound on the engine thread count: the available parallelism
pub fn max_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
