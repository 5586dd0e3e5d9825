//! Sharded edge lists.
//!
//! An [`EdgeListShard`] holds one local edge partition as parallel columns:
//! major ids, minor ids, and optional per-edge properties (weights, edge ids,
//! edge type ids). "Major" and "minor" are the two axes of the 2D sparse-matrix
//! decomposition, not fixed source/destination roles.
//!
//! Relabeling rewrites `majors` and `minors` in place; property columns are
//! never touched, so edge `k` keeps its properties across renumbering.

use crate::renumber_error::RenumberError;
use crate::topology::vertex::{EdgeCount, VertexId};

/// Per-shard offsets splitting a shard into contiguous sub-ranges, one per
/// row-group peer. `offsets[s][j]..offsets[s][j + 1]` holds the edges of shard
/// `s` whose minor endpoint is owned by row-group peer `j`.
pub type SubRangeOffsets = Vec<Vec<usize>>;

/// One local edge partition.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EdgeListShard<V: VertexId> {
    majors: Vec<V>,
    minors: Vec<V>,
    weights: Option<Vec<f64>>,
    edge_ids: Option<Vec<u64>>,
    edge_types: Option<Vec<i32>>,
}

impl<V: VertexId> EdgeListShard<V> {
    pub fn new(majors: Vec<V>, minors: Vec<V>) -> Self {
        Self {
            majors,
            minors,
            weights: None,
            edge_ids: None,
            edge_types: None,
        }
    }

    /// Build a shard from `(major, minor)` pairs.
    pub fn from_pairs(pairs: &[(V, V)]) -> Self {
        let (majors, minors) = pairs.iter().copied().unzip();
        Self::new(majors, minors)
    }

    pub fn with_weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = Some(weights);
        self
    }

    pub fn with_edge_ids(mut self, edge_ids: Vec<u64>) -> Self {
        self.edge_ids = Some(edge_ids);
        self
    }

    pub fn with_edge_types(mut self, edge_types: Vec<i32>) -> Self {
        self.edge_types = Some(edge_types);
        self
    }

    pub fn majors(&self) -> &[V] {
        &self.majors
    }

    pub fn minors(&self) -> &[V] {
        &self.minors
    }

    pub fn majors_mut(&mut self) -> &mut [V] {
        &mut self.majors
    }

    pub fn minors_mut(&mut self) -> &mut [V] {
        &mut self.minors
    }

    pub fn weights(&self) -> Option<&[f64]> {
        self.weights.as_deref()
    }

    pub fn edge_ids(&self) -> Option<&[u64]> {
        self.edge_ids.as_deref()
    }

    pub fn edge_types(&self) -> Option<&[i32]> {
        self.edge_types.as_deref()
    }

    /// Number of edges, taken from the major column.
    pub fn len(&self) -> EdgeCount {
        self.majors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.majors.is_empty()
    }

    /// Iterate `(major, minor)` pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (V, V)> + '_ {
        self.majors.iter().copied().zip(self.minors.iter().copied())
    }

    /// Verify that every present column has the same length as `majors`.
    pub fn check_lengths(&self, shard: usize) -> Result<(), RenumberError> {
        let expected = self.majors.len();
        let columns: [(&'static str, Option<usize>); 4] = [
            ("minors", Some(self.minors.len())),
            ("weights", self.weights.as_ref().map(Vec::len)),
            ("edge_ids", self.edge_ids.as_ref().map(Vec::len)),
            ("edge_types", self.edge_types.as_ref().map(Vec::len)),
        ];
        for (column, found) in columns {
            if let Some(found) = found {
                if found != expected {
                    return Err(RenumberError::ShardLengthMismatch {
                        shard,
                        column,
                        expected,
                        found,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Check that `offsets` splits every shard into `cols` contiguous sub-ranges.
pub fn check_sub_range_offsets<V: VertexId>(
    offsets: &SubRangeOffsets,
    shards: &[EdgeListShard<V>],
    cols: usize,
) -> Result<(), RenumberError> {
    if offsets.len() != shards.len() {
        return Err(RenumberError::InvalidSubRangeOffsets {
            shard: offsets.len().min(shards.len()),
            reason: format!("{} offset arrays for {} shards", offsets.len(), shards.len()),
        });
    }
    for (shard, (offs, edges)) in offsets.iter().zip(shards).enumerate() {
        let bad = |reason: String| Err(RenumberError::InvalidSubRangeOffsets { shard, reason });
        if offs.len() != cols + 1 {
            return bad(format!("{} offsets, expected {}", offs.len(), cols + 1));
        }
        if offs[0] != 0 {
            return bad(format!("first offset is {}", offs[0]));
        }
        if let Some(j) = offs.windows(2).position(|w| w[0] > w[1]) {
            return bad(format!("offsets decrease at sub-range {j}"));
        }
        if offs[cols] != edges.len() {
            return bad(format!("last offset {} but shard holds {} edges", offs[cols], edges.len()));
        }
    }
    Ok(())
}

/// Total number of edges across shards.
pub fn total_edges<V: VertexId>(shards: &[EdgeListShard<V>]) -> EdgeCount {
    shards.iter().map(EdgeListShard::len).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_range_offsets_shape() {
        let shards = vec![EdgeListShard::<u32>::from_pairs(&[(1, 2), (1, 3), (4, 5)])];
        assert!(check_sub_range_offsets(&vec![vec![0, 2, 3]], &shards, 2).is_ok());
        for bad in [vec![0, 3], vec![1, 2, 3], vec![0, 3, 2], vec![0, 1, 2]] {
            assert!(matches!(
                check_sub_range_offsets(&vec![bad], &shards, 2),
                Err(RenumberError::InvalidSubRangeOffsets { shard: 0, .. })
            ));
        }
        assert!(check_sub_range_offsets(&vec![], &shards, 2).is_err());
    }

    #[test]
    fn from_pairs_splits_columns() {
        let s = EdgeListShard::<u32>::from_pairs(&[(1, 2), (3, 4)]);
        assert_eq!(s.majors(), &[1, 3]);
        assert_eq!(s.minors(), &[2, 4]);
        assert_eq!(s.pairs().collect::<Vec<_>>(), vec![(1, 2), (3, 4)]);
    }

    #[test]
    fn mismatched_property_column_is_reported() {
        let s = EdgeListShard::<i64>::from_pairs(&[(1, 2), (3, 4)]).with_weights(vec![1.0]);
        let err = s.check_lengths(3).unwrap_err();
        assert_eq!(
            err,
            RenumberError::ShardLengthMismatch {
                shard: 3,
                column: "weights",
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn consistent_columns_pass() {
        let s = EdgeListShard::<u64>::from_pairs(&[(1, 2)])
            .with_edge_ids(vec![9])
            .with_edge_types(vec![0]);
        assert!(s.check_lengths(0).is_ok());
        assert_eq!(total_edges(&[s.clone(), s]), 2);
    }
}
