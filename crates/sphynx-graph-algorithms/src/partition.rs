//! Partition of a node set into subsets

/// Assignment of every element to a subset id in `0..number_of_subsets`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    labels: Vec<u64>,
    subsets: u64,
}

impl Partition {
    /// Build a partition from arbitrary labels, renumbering them to
    /// `0..k` in order of first appearance.
    pub fn from_labels<I>(labels: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        let mut remap: rustc_hash::FxHashMap<usize, u64> = Default::default();
        let labels: Vec<u64> = labels
            .into_iter()
            .map(|l| {
                let next = remap.len() as u64;
                *remap.entry(l).or_insert(next)
            })
            .collect();
        let subsets = remap.len() as u64;
        Self { labels, subsets }
    }

    pub fn number_of_subsets(&self) -> u64 {
        self.subsets
    }

    pub fn number_of_elements(&self) -> u64 {
        self.labels.len() as u64
    }

    pub fn subset_of(&self, element: usize) -> Option<u64> {
        self.labels.get(element).copied()
    }

    pub fn vector(&self) -> &[u64] {
        &self.labels
    }
}
