//! Community detection algorithms
//!
//! Implements PLM, the multilevel Louvain method for modularity
//! maximization with a resolution parameter:
//!
//! ```text
//! Q = (1/2m) × Σ[A_ij - γ(k_i × k_j)/(2m)] × δ(c_i, c_j)
//! ```
//!
//! Each level greedily moves nodes between neighboring communities, then
//! contracts every community into a single node and repeats on the
//! coarser graph until no node moves. Directed input is symmetrized.

use super::common::{sorted_row, Graph, SymmetricView};
use super::partition::Partition;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rayon::prelude::*;
use rayon::ThreadPool;
use rustc_hash::FxHashMap;

/// Minimum modularity gain for a move to count as an improvement
const GAIN_EPSILON: f64 = 1e-12;

/// PLM configuration
#[derive(Debug, Clone)]
pub struct PlmConfig {
    /// Resolution parameter (1.0 is standard modularity)
    pub gamma: f64,
    /// Run an extra local-moving pass on the input graph after coarsening
    pub refine: bool,
    /// Maximum number of local-moving sweeps per level
    pub max_iterations: usize,
}

impl Default for PlmConfig {
    fn default() -> Self {
        Self {
            gamma: 1.0,
            refine: false,
            max_iterations: 32,
        }
    }
}

/// Parallel Louvain Method
#[derive(Debug)]
pub struct Plm {
    config: PlmConfig,
    result: Option<Partition>,
}

impl Plm {
    pub fn new(config: PlmConfig) -> Self {
        Self {
            config,
            result: None,
        }
    }

    pub fn config(&self) -> &PlmConfig {
        &self.config
    }

    /// Run the algorithm. A second run replaces the previous result.
    pub fn run(&mut self, graph: &Graph, rng: &mut StdRng, pool: &ThreadPool) {
        self.result = Some(detect(graph, &self.config, rng, pool));
    }

    pub fn has_finished(&self) -> bool {
        self.result.is_some()
    }

    pub fn partition(&self) -> Option<&Partition> {
        self.result.as_ref()
    }
}

fn detect(graph: &Graph, config: &PlmConfig, rng: &mut StdRng, pool: &ThreadPool) -> Partition {
    let n = graph.node_count();
    let base = SymmetricView::from_graph(graph);

    // Without edge weight every node stays a singleton
    if base.total_strength() <= 0.0 {
        return Partition::from_labels(0..n);
    }

    let mut assignment: Vec<usize> = (0..n).collect();
    let mut level = base.clone();

    loop {
        let mut communities: Vec<usize> = (0..level.node_count).collect();
        let moved = local_moving(&level, &mut communities, config, rng);
        if !moved {
            break;
        }

        let (compact, k) = compact_labels(&communities);
        for a in assignment.iter_mut() {
            *a = compact[*a];
        }
        if k == level.node_count {
            break;
        }
        level = coarsen(&level, &compact, k, pool);
    }

    if config.refine {
        local_moving(&base, &mut assignment, config, rng);
    }

    Partition::from_labels(assignment)
}

/// Greedy node moves until a sweep changes nothing. Returns true if any
/// node changed community.
fn local_moving(
    view: &SymmetricView,
    communities: &mut [usize],
    config: &PlmConfig,
    rng: &mut StdRng,
) -> bool {
    let n = view.node_count;
    let two_m = view.total_strength();
    let strengths: Vec<f64> = (0..n).map(|u| view.strength(u)).collect();

    let mut totals = vec![0.0; n];
    for u in 0..n {
        totals[communities[u]] += strengths[u];
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(rng);

    let mut links: FxHashMap<usize, f64> = FxHashMap::default();
    let mut moved_any = false;

    for _ in 0..config.max_iterations {
        let mut moved = false;

        for &u in &order {
            let current = communities[u];
            let k_u = strengths[u];

            links.clear();
            for (v, w) in view.neighbors(u) {
                if v != u {
                    *links.entry(communities[v]).or_insert(0.0) += w;
                }
            }

            totals[current] -= k_u;

            let gain = |c: usize, w_in: f64| w_in - config.gamma * totals[c] * k_u / two_m;
            let mut best = current;
            let mut best_gain = gain(current, links.get(&current).copied().unwrap_or(0.0));

            let mut candidates: Vec<(usize, f64)> = links.iter().map(|(&c, &w)| (c, w)).collect();
            candidates.sort_unstable_by_key(|&(c, _)| c);
            for (c, w_in) in candidates {
                if c == current {
                    continue;
                }
                let g = gain(c, w_in);
                if g > best_gain + GAIN_EPSILON {
                    best = c;
                    best_gain = g;
                }
            }

            totals[best] += k_u;
            if best != current {
                communities[u] = best;
                moved = true;
            }
        }

        if !moved {
            break;
        }
        moved_any = true;
    }

    moved_any
}

/// Renumber labels to `0..k` in order of first appearance.
fn compact_labels(labels: &[usize]) -> (Vec<usize>, usize) {
    let mut remap: FxHashMap<usize, usize> = FxHashMap::default();
    let compact = labels
        .iter()
        .map(|&l| {
            let next = remap.len();
            *remap.entry(l).or_insert(next)
        })
        .collect();
    (compact, remap.len())
}

/// Contract every community into one node. Rows are built on the pool.
fn coarsen(view: &SymmetricView, compact: &[usize], k: usize, pool: &ThreadPool) -> SymmetricView {
    let mut members: Vec<Vec<usize>> = vec![Vec::new(); k];
    for (u, &c) in compact.iter().enumerate() {
        members[c].push(u);
    }

    let rows: Vec<Vec<(usize, f64)>> = pool.install(|| {
        members
            .par_iter()
            .map(|nodes| {
                let mut row: FxHashMap<usize, f64> = FxHashMap::default();
                for &u in nodes {
                    for (v, w) in view.neighbors(u) {
                        *row.entry(compact[v]).or_insert(0.0) += w;
                    }
                }
                sorted_row(row)
            })
            .collect()
    });

    SymmetricView::from_rows(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn pool(threads: usize) -> ThreadPool {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .unwrap()
    }

    fn two_triangles() -> Graph {
        let mut g = Graph::new(6, false, false);
        for (u, v) in [(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3), (2, 3)] {
            g.add_edge(u, v, 1.0).unwrap();
        }
        g
    }

    fn run(graph: &Graph, config: PlmConfig, seed: u64, threads: usize) -> Partition {
        let mut plm = Plm::new(config);
        let mut rng = StdRng::seed_from_u64(seed);
        plm.run(graph, &mut rng, &pool(threads));
        plm.partition().unwrap().clone()
    }

    #[test]
    fn test_two_triangles() {
        let p = run(&two_triangles(), PlmConfig::default(), 1, 2);
        let v = p.vector();

        assert_eq!(p.number_of_subsets(), 2);
        assert_eq!(v[0], v[1]);
        assert_eq!(v[1], v[2]);
        assert_eq!(v[3], v[4]);
        assert_eq!(v[4], v[5]);
        assert_ne!(v[0], v[3]);
    }

    #[test]
    fn test_high_resolution_keeps_singletons() {
        let config = PlmConfig {
            gamma: 100.0,
            ..Default::default()
        };
        let p = run(&two_triangles(), config, 1, 1);
        assert_eq!(p.number_of_subsets(), 6);
    }

    #[test]
    fn test_empty_and_edgeless_graphs() {
        let p = run(&Graph::new(0, false, true), PlmConfig::default(), 1, 1);
        assert_eq!(p.number_of_subsets(), 0);
        assert_eq!(p.number_of_elements(), 0);

        let p = run(&Graph::new(3, false, true), PlmConfig::default(), 1, 1);
        assert_eq!(p.vector(), &[0, 1, 2]);
    }

    #[test]
    fn test_same_seed_same_partition() {
        let mut g = Graph::new(12, true, true);
        for i in 0..12 {
            g.add_edge(i, (i + 1) % 12, 1.0 + (i % 3) as f64).unwrap();
            g.add_edge(i, (i + 5) % 12, 0.5).unwrap();
        }
        let a = run(&g, PlmConfig::default(), 42, 4);
        let b = run(&g, PlmConfig::default(), 42, 4);
        assert_eq!(a, b);
    }

    #[test]
    fn test_refine_keeps_partition_valid() {
        let config = PlmConfig {
            refine: true,
            ..Default::default()
        };
        let p = run(&two_triangles(), config, 7, 2);
        assert_eq!(p.number_of_elements(), 6);
        assert!(p.vector().iter().all(|&l| l < p.number_of_subsets()));
    }
}
