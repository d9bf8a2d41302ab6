//! Shared graph structures for algorithm execution
//!
//! [`Graph`] is the mutable object callers build edge by edge.
//! [`SymmetricView`] is the read-only, Compressed Sparse Row projection that
//! the modularity algorithms iterate over.

use super::error::{EngineError, EngineResult};
use rustc_hash::FxHashMap;

/// Engine-side graph built incrementally through `add_edge`.
#[derive(Debug, Clone)]
pub struct Graph {
    node_count: usize,
    weighted: bool,
    directed: bool,
    /// (source, target, weight) in insertion order
    edges: Vec<(usize, usize, f64)>,
}

impl Graph {
    pub fn new(node_count: usize, weighted: bool, directed: bool) -> Self {
        Self {
            node_count,
            weighted,
            directed,
            edges: Vec::new(),
        }
    }

    /// Add an edge. Unweighted graphs ignore `weight` and store 1.0.
    pub fn add_edge(&mut self, u: usize, v: usize, weight: f64) -> EngineResult<()> {
        for node in [u, v] {
            if node >= self.node_count {
                return Err(EngineError::NodeOutOfRange {
                    node: node as u64,
                    count: self.node_count as u64,
                });
            }
        }
        let w = if self.weighted { weight } else { 1.0 };
        if !w.is_finite() || w < 0.0 {
            return Err(EngineError::InvalidWeight(w));
        }
        self.edges.push((u, v, w));
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_weighted(&self) -> bool {
        self.weighted
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    pub fn edges(&self) -> &[(usize, usize, f64)] {
        &self.edges
    }

    /// Sum of all edge weights
    pub fn total_edge_weight(&self) -> f64 {
        self.edges.iter().map(|&(_, _, w)| w).sum()
    }
}

/// An undirected, weighted CSR view.
///
/// Each edge `{u, v}` is listed under both endpoints. A self-loop is listed
/// once, with its weight doubled, so that the strength of a node is always
/// the plain sum of its row.
#[derive(Debug, Clone)]
pub struct SymmetricView {
    /// Number of nodes
    pub node_count: usize,
    /// Offsets into `targets`/`weights`. Size = node_count + 1
    pub offsets: Vec<usize>,
    /// Contiguous neighbor indices, sorted within a row
    pub targets: Vec<usize>,
    /// Weights aligned with `targets`
    pub weights: Vec<f64>,
}

impl SymmetricView {
    /// Project a graph onto undirected adjacency. Parallel edges are merged.
    ///
    /// A directed graph keeps every arc, so `u -> v` and `v -> u` add up. In
    /// an undirected graph a pair listed in both orientations is one edge,
    /// weighted by the mean of the two orientations.
    pub fn from_graph(graph: &Graph) -> Self {
        let n = graph.node_count();
        let mut rows: Vec<FxHashMap<usize, f64>> = vec![FxHashMap::default(); n];
        let link = |rows: &mut Vec<FxHashMap<usize, f64>>, u: usize, v: usize, w: f64| {
            if u == v {
                *rows[u].entry(u).or_insert(0.0) += 2.0 * w;
            } else {
                *rows[u].entry(v).or_insert(0.0) += w;
                *rows[v].entry(u).or_insert(0.0) += w;
            }
        };

        if graph.is_directed() {
            for &(u, v, w) in graph.edges() {
                link(&mut rows, u, v, w);
            }
        } else {
            let mut oriented: FxHashMap<(usize, usize), f64> = FxHashMap::default();
            for &(u, v, w) in graph.edges() {
                *oriented.entry((u, v)).or_insert(0.0) += w;
            }
            for (&(u, v), &w) in &oriented {
                match oriented.get(&(v, u)) {
                    Some(_) if u == v => link(&mut rows, u, v, w),
                    Some(&back) if u < v => link(&mut rows, u, v, (w + back) / 2.0),
                    Some(_) => {}
                    None => link(&mut rows, u, v, w),
                }
            }
        }

        Self::from_rows(rows.into_iter().map(sorted_row).collect())
    }

    /// Build from per-node rows already sorted by target.
    pub fn from_rows(rows: Vec<Vec<(usize, f64)>>) -> Self {
        let node_count = rows.len();
        let mut offsets = Vec::with_capacity(node_count + 1);
        let mut targets = Vec::new();
        let mut weights = Vec::new();

        offsets.push(0);
        for row in rows {
            for (t, w) in row {
                targets.push(t);
                weights.push(w);
            }
            offsets.push(targets.len());
        }

        Self {
            node_count,
            offsets,
            targets,
            weights,
        }
    }

    /// Neighbors of a node with their weights
    pub fn neighbors(&self, idx: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let start = self.offsets[idx];
        let end = self.offsets[idx + 1];
        self.targets[start..end]
            .iter()
            .copied()
            .zip(self.weights[start..end].iter().copied())
    }

    /// Weighted degree, self-loops counted twice
    pub fn strength(&self, idx: usize) -> f64 {
        let start = self.offsets[idx];
        let end = self.offsets[idx + 1];
        self.weights[start..end].iter().sum()
    }

    /// Sum of all strengths (2m)
    pub fn total_strength(&self) -> f64 {
        self.weights.iter().sum()
    }
}

pub(crate) fn sorted_row(row: FxHashMap<usize, f64>) -> Vec<(usize, f64)> {
    let mut row: Vec<(usize, f64)> = row.into_iter().collect();
    row.sort_unstable_by_key(|&(t, _)| t);
    row
}
