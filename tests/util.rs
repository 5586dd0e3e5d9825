#![allow(dead_code)]
use grid_renumber::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeMap, BTreeSet};

/// Inputs of one process: its shards and the matching sub-range offsets.
#[derive(Clone, Debug)]
pub struct RankInput<V: VertexId> {
    pub shards: Vec<EdgeListShard<V>>,
    pub sub_ranges: SubRangeOffsets,
    pub local_vertices: Vec<V>,
}

/// Pre-shuffle a global edge list onto a grid, the way callers must.
///
/// Within each shard edges are grouped by the row peer owning the minor
/// endpoint, so the returned sub-range offsets are valid.
pub fn distribute<V: VertexId>(
    own: &HashGridOwnership,
    edges: &[(V, V)],
    vertices: &[V],
) -> Vec<RankInput<V>> {
    let grid = own.grid();
    let mut buckets: Vec<Vec<Vec<Vec<(V, V)>>>> =
        vec![vec![vec![Vec::new(); grid.cols]; grid.rows]; grid.size()];
    for &(major, minor) in edges {
        let at = own.edge_owner(major, minor);
        buckets[at.rank][at.shard][own.minor_sub_range(minor)].push((major, minor));
    }
    buckets
        .into_iter()
        .enumerate()
        .map(|(rank, shards)| {
            let mut sub_ranges = Vec::new();
            let shards = shards
                .into_iter()
                .map(|parts| {
                    let mut offs = vec![0];
                    let mut pairs = Vec::new();
                    for part in parts {
                        pairs.extend(part);
                        offs.push(pairs.len());
                    }
                    sub_ranges.push(offs);
                    EdgeListShard::from_pairs(&pairs)
                })
                .collect();
            let local_vertices = vertices
                .iter()
                .copied()
                .filter(|&v| own.vertex_owner(v) == rank)
                .collect();
            RankInput {
                shards,
                sub_ranges,
                local_vertices,
            }
        })
        .collect()
}

/// Aggregate degree of every vertex: one per endpoint appearance.
pub fn reference_degrees<V: VertexId>(edges: &[(V, V)], vertices: &[V]) -> BTreeMap<V, u64> {
    let mut deg: BTreeMap<V, u64> = vertices.iter().map(|&v| (v, 0)).collect();
    for &(a, b) in edges {
        *deg.entry(a).or_default() += 1;
        *deg.entry(b).or_default() += 1;
    }
    deg
}

/// Single-process renumber map computed directly: descending degree, ties
/// by ascending id.
pub fn reference_order<V: VertexId>(edges: &[(V, V)], vertices: &[V]) -> Vec<V> {
    let mut by_degree: Vec<(V, u64)> = reference_degrees(edges, vertices).into_iter().collect();
    by_degree.sort_by(|a, b| b.1.cmp(&a.1));
    by_degree.into_iter().map(|(v, _)| v).collect()
}

/// Seeded random multigraph on ids `0..n` with self loops allowed.
pub fn random_edges(seed: u64, n: u64, m: usize) -> Vec<(u64, u64)> {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..m)
        .map(|_| (rng.gen_range(0..n), rng.gen_range(0..n)))
        .collect()
}

pub fn vertex_set<V: VertexId>(edges: &[(V, V)]) -> Vec<V> {
    let set: BTreeSet<V> = edges.iter().flat_map(|&(a, b)| [a, b]).collect();
    set.into_iter().collect()
}

/// Some id owned by `rank`, searching upward from `start`.
pub fn owned_by(own: &HashGridOwnership, rank: usize, start: u64) -> u64 {
    (start..)
        .find(|&v| own.vertex_owner(v) == rank)
        .unwrap()
}

/// Assert vec is a permutation of another vec (order-agnostic).
pub fn assert_permutation<T: Ord + Copy + std::fmt::Debug>(got: &[T], want: &[T]) {
    let mut a = got.to_vec();
    a.sort_unstable();
    let mut b = want.to_vec();
    b.sort_unstable();
    assert_eq!(a, b, "not a permutation\n got={:?}\nwant={:?}", got, want);
}

/// Run a full renumbering on a `rows x cols` thread grid and return, per
/// rank, the map and the relabeled shards.
pub fn run_grid(
    rows: usize,
    cols: usize,
    edges: &[(u64, u64)],
    vertices: &[u64],
    config: &RenumberConfig,
) -> Vec<(RenumberMap<u64>, Vec<EdgeListShard<u64>>)> {
    let own = HashGridOwnership::new(GridShape::new(rows, cols));
    let inputs = distribute(&own, edges, vertices);
    ThreadComm::run(rows * cols, |comm| {
        let rank = comm.rank();
        let ctx = GridComm::new(comm, rows, cols).unwrap();
        let input = &inputs[rank];
        let mut shards = input.shards.clone();
        let map = renumber_edgelist(
            &ctx,
            &own,
            &mut shards,
            Some(input.local_vertices.as_slice()),
            Some(&input.sub_ranges),
            config,
        )
        .unwrap();
        (map, shards)
    })
}

/// Concatenate per-rank blocks into the global dense → original table.
pub fn global_labels(results: &[(RenumberMap<u64>, Vec<EdgeListShard<u64>>)]) -> Vec<u64> {
    results
        .iter()
        .flat_map(|(map, _)| map.labels().iter().copied())
        .collect()
}

/// Relabeled edges mapped back to original ids, sorted.
pub fn unrelabeled_edges(results: &[(RenumberMap<u64>, Vec<EdgeListShard<u64>>)]) -> Vec<(u64, u64)> {
    let labels = global_labels(results);
    let mut out: Vec<(u64, u64)> = results
        .iter()
        .flat_map(|(_, shards)| shards.iter().flat_map(|s| s.pairs()))
        .map(|(a, b)| (labels[a as usize], labels[b as usize]))
        .collect();
    out.sort_unstable();
    out
}
