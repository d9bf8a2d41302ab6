//! Engine partition -> entity model
//!
//! A partition of N vertices into K communities becomes a community vertex
//! set of size K and a `belongsTo` edge bundle with one edge per original
//! vertex, pointing at its community.

use super::scope::ForeignScope;
use crate::entity::{EdgeBundle, SphynxId, VertexSet};
use crate::error::{SphynxError, SphynxResult};
use sphynx_graph_algorithms::PartitionHandle;

/// Copy the subset count and the per-vertex labels out of a partition
pub fn read_partition(
    scope: &mut ForeignScope<'_>,
    p: PartitionHandle,
) -> SphynxResult<(usize, Vec<u64>)> {
    let subsets = scope.session().number_of_subsets(p)? as usize;
    let elements = scope.session().number_of_elements(p)? as usize;
    let v = scope.partition_vector(p)?;

    let session = scope.session();
    let len = session.vector_len(v)?;
    if len != elements {
        return Err(SphynxError::ExternalEngineFailure(format!(
            "partition has {} elements but its vector has {}",
            elements, len
        )));
    }
    let labels = (0..len)
        .map(|i| session.vector_get(v, i))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((subsets, labels))
}

/// Build the community vertex set and the membership bundle.
///
/// Pure: the same `subsets` and `labels` always give identical entities.
pub fn materialize_partition(subsets: usize, labels: &[u64]) -> SphynxResult<(VertexSet, EdgeBundle)> {
    let partitions = VertexSet::with_identity(subsets);

    let mut src = Vec::with_capacity(labels.len());
    let mut dst = Vec::with_capacity(labels.len());
    for (i, &label) in labels.iter().enumerate() {
        if label as usize >= subsets {
            return Err(SphynxError::ExternalEngineFailure(format!(
                "vertex {} labelled {} but only {} communities reported",
                i, label, subsets
            )));
        }
        src.push(dense_id(i as u64)?);
        dst.push(dense_id(label)?);
    }
    let edge_mapping = (0..labels.len() as i64).collect();

    let belongs_to = EdgeBundle::new(src, dst, edge_mapping)?;
    Ok((partitions, belongs_to))
}

fn dense_id(v: u64) -> SphynxResult<SphynxId> {
    SphynxId::try_from(v)
        .map_err(|_| SphynxError::InvalidInput(format!("index {} exceeds the dense id range", v)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_bundle() {
        let (partitions, belongs_to) = materialize_partition(2, &[0, 0, 1, 0]).unwrap();

        assert_eq!(partitions.mapping_to_unordered, vec![0, 1]);
        assert_eq!(belongs_to.src, vec![0, 1, 2, 3]);
        assert_eq!(belongs_to.dst, vec![0, 0, 1, 0]);
        assert_eq!(belongs_to.edge_mapping, vec![0, 1, 2, 3]);
        assert!(belongs_to
            .validate(&VertexSet::with_identity(4), &partitions)
            .is_ok());
    }

    #[test]
    fn test_idempotent() {
        let labels = [2, 0, 1, 1, 2];
        let first = materialize_partition(3, &labels).unwrap();
        let second = materialize_partition(3, &labels).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_partition() {
        let (partitions, belongs_to) = materialize_partition(0, &[]).unwrap();
        assert!(partitions.is_empty());
        assert!(belongs_to.is_empty());
    }

    #[test]
    fn test_label_out_of_range() {
        assert!(matches!(
            materialize_partition(1, &[0, 1]),
            Err(SphynxError::ExternalEngineFailure(_))
        ));
    }
}
