//! Local sort / group-by primitives shared by the builder and validator.

use crate::topology::vertex::VertexId;
use itertools::Itertools;

/// Sort `ids` and collapse runs into `(id, occurrences)`.
pub fn count_sorted<V: VertexId>(mut ids: Vec<V>) -> Vec<(V, u64)> {
    ids.sort_unstable();
    ids.into_iter()
        .dedup_with_count()
        .map(|(n, v)| (v, n as u64))
        .collect()
}

/// Sort pairs by key and sum the values of equal keys.
pub fn group_by_sum<V: VertexId>(mut pairs: Vec<(V, u64)>) -> Vec<(V, u64)> {
    pairs.sort_unstable_by_key(|&(v, _)| v);
    pairs
        .into_iter()
        .coalesce(|a, b| {
            if a.0 == b.0 {
                Ok((a.0, a.1 + b.1))
            } else {
                Err((a, b))
            }
        })
        .collect()
}

/// Sort and remove duplicates.
pub fn dedup_sorted<V: VertexId>(mut ids: Vec<V>) -> Vec<V> {
    ids.sort_unstable();
    ids.dedup();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_runs() {
        assert_eq!(
            count_sorted(vec![5u32, 1, 5, 2, 5]),
            vec![(1, 1), (2, 1), (5, 3)]
        );
        assert!(count_sorted(Vec::<u64>::new()).is_empty());
    }

    #[test]
    fn sums_equal_keys() {
        let merged = group_by_sum(vec![(3i64, 2), (1, 1), (3, 4), (-2, 0)]);
        assert_eq!(merged, vec![(-2, 0), (1, 1), (3, 6)]);
    }

    #[test]
    fn dedups() {
        assert_eq!(dedup_sorted(vec![4u32, 4, 1]), vec![1, 4]);
    }
}
