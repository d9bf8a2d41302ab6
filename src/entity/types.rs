//! Vertex sets and edge bundles

use crate::error::{SphynxError, SphynxResult};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Dense index into a vertex set or edge bundle
pub type SphynxId = u32;

/// A dense id space `[0, N)`.
///
/// `mapping_to_unordered[i]` is the persistent identifier of dense index `i`.
/// A freshly synthesized vertex set uses the identity mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexSet {
    pub mapping_to_unordered: Vec<i64>,
}

impl VertexSet {
    pub fn new(mapping_to_unordered: Vec<i64>) -> Self {
        Self {
            mapping_to_unordered,
        }
    }

    /// Vertex set of size `n` with `mapping[i] == i`
    pub fn with_identity(n: usize) -> Self {
        Self::new((0..n as i64).collect())
    }

    pub fn size(&self) -> usize {
        self.mapping_to_unordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping_to_unordered.is_empty()
    }

    /// Persistent ids must be unique
    pub fn validate(&self) -> SphynxResult<()> {
        let mut seen = FxHashSet::default();
        for (i, id) in self.mapping_to_unordered.iter().enumerate() {
            if !seen.insert(*id) {
                return Err(SphynxError::InvalidInput(format!(
                    "vertex set maps index {} to duplicate id {}",
                    i, id
                )));
            }
        }
        Ok(())
    }
}

/// Directed edges over one or two vertex sets.
///
/// Edge `i` goes from `src[i]` to `dst[i]`; `edge_mapping[i]` is its stable id.
/// The vertex sets themselves are not referenced; whoever reads the bundle
/// supplies them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeBundle {
    pub src: Vec<SphynxId>,
    pub dst: Vec<SphynxId>,
    pub edge_mapping: Vec<i64>,
}

impl EdgeBundle {
    pub fn new(src: Vec<SphynxId>, dst: Vec<SphynxId>, edge_mapping: Vec<i64>) -> SphynxResult<Self> {
        let es = Self {
            src,
            dst,
            edge_mapping,
        };
        es.check_lengths()?;
        Ok(es)
    }

    /// Bundle with identity edge mapping
    pub fn from_pairs(pairs: &[(SphynxId, SphynxId)]) -> Self {
        Self {
            src: pairs.iter().map(|&(s, _)| s).collect(),
            dst: pairs.iter().map(|&(_, d)| d).collect(),
            edge_mapping: (0..pairs.len() as i64).collect(),
        }
    }

    pub fn size(&self) -> usize {
        self.edge_mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edge_mapping.is_empty()
    }

    pub fn edges(&self) -> impl Iterator<Item = (SphynxId, SphynxId)> + '_ {
        self.src.iter().copied().zip(self.dst.iter().copied())
    }

    pub fn check_lengths(&self) -> SphynxResult<()> {
        if self.src.len() != self.dst.len() || self.src.len() != self.edge_mapping.len() {
            return Err(SphynxError::InvalidInput(format!(
                "edge bundle columns differ in length: src {}, dst {}, mapping {}",
                self.src.len(),
                self.dst.len(),
                self.edge_mapping.len()
            )));
        }
        Ok(())
    }

    /// Check column lengths and that every endpoint is a valid dense index
    pub fn validate(&self, src_vs: &VertexSet, dst_vs: &VertexSet) -> SphynxResult<()> {
        self.check_lengths()?;
        for (i, (s, d)) in self.edges().enumerate() {
            if s as usize >= src_vs.size() {
                return Err(SphynxError::InvalidInput(format!(
                    "edge {} source {} out of range for {} vertices",
                    i,
                    s,
                    src_vs.size()
                )));
            }
            if d as usize >= dst_vs.size() {
                return Err(SphynxError::InvalidInput(format!(
                    "edge {} destination {} out of range for {} vertices",
                    i,
                    d,
                    dst_vs.size()
                )));
            }
        }
        Ok(())
    }
}
