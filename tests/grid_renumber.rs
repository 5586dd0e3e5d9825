//! Multi-process renumbering on thread-backed process grids.
mod util;

use grid_renumber::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use util::*;

fn graph() -> (Vec<(u64, u64)>, Vec<u64>) {
    let edges = random_edges(42, 80, 400);
    let mut vertices = vertex_set(&edges);
    vertices.extend(500..510);
    (edges, vertices)
}

#[test]
fn dense_ids_form_a_bijection() {
    let (edges, vertices) = graph();
    for (rows, cols) in [(2, 2), (1, 3), (3, 1)] {
        let results = run_grid(rows, cols, &edges, &vertices, &RenumberConfig::default());
        let labels = global_labels(&results);
        assert_permutation(&labels, &vertices);
        let unique: BTreeSet<u64> = labels.iter().copied().collect();
        assert_eq!(unique.len(), labels.len());
        for (rank, (map, _)) in results.iter().enumerate() {
            let topo = map.topology();
            assert_eq!(topo.comm_rank(), rank);
            assert_eq!(topo.number_of_vertices(), vertices.len());
            assert_eq!(topo.local_vertex_range().len(), map.len());
        }
    }
}

#[test]
fn blocks_are_degree_ordered_with_true_degrees() {
    let (edges, vertices) = graph();
    let want = reference_degrees(&edges, &vertices);
    let results = run_grid(2, 2, &edges, &vertices, &RenumberConfig::default());
    let own = HashGridOwnership::new(GridShape::new(2, 2));
    for (rank, (map, _)) in results.iter().enumerate() {
        for (&v, &d) in map.labels().iter().zip(map.degrees()) {
            assert_eq!(own.vertex_owner(v), rank);
            assert_eq!(want[&v], d, "degree of {v}");
        }
        for w in map.labels().windows(2).zip(map.degrees().windows(2)) {
            let (l, d) = w;
            assert!(d[0] > d[1] || (d[0] == d[1] && l[0] < l[1]));
        }
    }
}

#[test]
fn segments_are_monotonic_and_cover_blocks() {
    let (edges, vertices) = graph();
    let cfg = RenumberConfig {
        thresholds: DegreeThresholds {
            high: 8,
            mid: 4,
            hypersparse: Some(2),
        },
        ..RenumberConfig::default()
    };
    let results = run_grid(2, 2, &edges, &vertices, &cfg);
    // thresholds are scaled by the two columns
    for (map, _) in &results {
        let segs = map.segment_offsets();
        assert_eq!(segs.num_segments(), 5);
        assert!(segs.as_slice().windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(segs.block_len(), map.len());
        for i in segs.segment(0) {
            assert!(map.degrees()[i] >= 16);
        }
        for i in segs.segment(3) {
            assert!((1..4).contains(&map.degrees()[i]));
        }
        for i in segs.class_range(DegreeClass::Isolated).unwrap() {
            assert_eq!(map.degrees()[i], 0);
        }
    }
}

#[test]
fn relabeled_edges_map_back_to_the_input() {
    let (edges, vertices) = graph();
    let mut want = edges.clone();
    want.sort_unstable();
    for (rows, cols) in [(2, 2), (2, 3)] {
        let results = run_grid(rows, cols, &edges, &vertices, &RenumberConfig::default());
        assert_eq!(unrelabeled_edges(&results), want, "{rows}x{cols}");
    }
}

#[test]
fn relabeled_ids_fall_in_the_expected_ranges() {
    let (edges, vertices) = graph();
    let results = run_grid(2, 2, &edges, &vertices, &RenumberConfig::default());
    for (map, shards) in &results {
        let topo = map.topology();
        let minor = topo.minor_range_first()..topo.minor_range_first() + topo.minor_range_size();
        for (i, shard) in shards.iter().enumerate() {
            let major = topo.major_range_first(i)..topo.major_range_first(i) + topo.major_range_size(i);
            for (a, b) in shard.pairs() {
                assert!(major.contains(&(a as usize)));
                assert!(minor.contains(&(b as usize)));
            }
        }
    }
}

#[test]
fn minor_strategies_produce_identical_edges() {
    let (edges, vertices) = graph();
    let run = |minor_strategy| {
        let cfg = RenumberConfig {
            minor_strategy,
            ..RenumberConfig::default()
        };
        run_grid(2, 3, &edges, &vertices, &cfg)
            .into_iter()
            .map(|(_, shards)| shards)
            .collect::<Vec<_>>()
    };
    let full = run(MinorRelabelStrategy::FullGather);
    assert_eq!(run(MinorRelabelStrategy::PerPeerBroadcast), full);
    assert_eq!(run(MinorRelabelStrategy::Auto), full);
}

#[test]
fn property_columns_survive_relabeling() {
    let own = HashGridOwnership::new(GridShape::new(1, 2));
    let edges = random_edges(3, 20, 30);
    let inputs = distribute(&own, &edges, &vertex_set(&edges));
    let results = ThreadComm::run(2, |comm| {
        let rank = comm.rank();
        let ctx = GridComm::new(comm, 1, 2).unwrap();
        let n = inputs[rank].shards[0].len();
        let weights: Vec<f64> = (0..n).map(|k| k as f64 * 0.25).collect();
        let ids: Vec<u64> = (0..n as u64).map(|k| 100 * rank as u64 + k).collect();
        let mut shards = vec![
            inputs[rank].shards[0]
                .clone()
                .with_weights(weights.clone())
                .with_edge_ids(ids.clone()),
        ];
        renumber_edgelist(&ctx, &own, &mut shards, None, None, &RenumberConfig::default())
            .unwrap();
        (shards, weights, ids)
    });
    for (shards, weights, ids) in results {
        assert_eq!(shards[0].weights(), Some(weights.as_slice()));
        assert_eq!(shards[0].edge_ids(), Some(ids.as_slice()));
    }
}

#[test]
fn lookup_miss_reaches_every_process() {
    let own = HashGridOwnership::new(GridShape::new(2, 1));
    let edges = random_edges(5, 30, 60);
    let inputs = distribute(&own, &edges, &vertex_set(&edges));
    let results = ThreadComm::run(2, |comm| {
        let rank = comm.rank();
        let ctx = GridComm::new(comm, 2, 1).unwrap();
        let cfg = RenumberConfig::default();
        let map = build_renumber_map(&ctx, &own, &inputs[rank].shards, None, &cfg).unwrap();
        let mut shards = inputs[rank].shards.clone();
        if rank == 1 {
            // an id nobody owns
            shards[0] = EdgeListShard::from_pairs(&[(9999, 9999)]);
        }
        relabel_edges(&ctx, &map, &mut shards, None, &cfg)
    });
    assert_eq!(results[1], Err(RenumberError::MissingFromRenumberMap(9999)));
    assert_eq!(results[0], Err(RenumberError::RemoteFailure { ranks: vec![1] }));
}

#[test]
fn forced_per_peer_with_partial_sub_ranges_matches_full_gather() {
    let own = HashGridOwnership::new(GridShape::new(1, 2));
    let (edges, vertices) = graph();
    let inputs = distribute(&own, &edges, &vertices);
    let run = |minor_strategy, only_rank_0: bool| {
        let cfg = RenumberConfig {
            minor_strategy,
            ..RenumberConfig::default()
        };
        ThreadComm::run(2, |comm| {
            let rank = comm.rank();
            let ctx = GridComm::new(comm, 1, 2).unwrap();
            let input = &inputs[rank];
            // rank 1 withholds its sub-ranges, so nobody may broadcast per peer
            let sub_ranges = (!only_rank_0 || rank == 0).then_some(&input.sub_ranges);
            let mut shards = input.shards.clone();
            renumber_edgelist(&ctx, &own, &mut shards, None, sub_ranges, &cfg).unwrap();
            shards
        })
    };
    let full = run(MinorRelabelStrategy::FullGather, false);
    assert_eq!(run(MinorRelabelStrategy::PerPeerBroadcast, true), full);
    assert_eq!(run(MinorRelabelStrategy::PerPeerBroadcast, false), full);
}

#[test]
fn major_only_degrees_on_a_grid() {
    let (edges, vertices) = graph();
    let mut want: BTreeMap<u64, u64> = vertices.iter().map(|&v| (v, 0)).collect();
    for &(a, _) in &edges {
        *want.get_mut(&a).unwrap() += 1;
    }
    let cfg = RenumberConfig {
        degree_source: DegreeSource::MajorOnly,
        ..RenumberConfig::default()
    };
    let results = run_grid(2, 2, &edges, &vertices, &cfg);
    let own = HashGridOwnership::new(GridShape::new(2, 2));
    for (rank, (map, _)) in results.iter().enumerate() {
        for (&v, &d) in map.labels().iter().zip(map.degrees()) {
            assert_eq!(own.vertex_owner(v), rank);
            assert_eq!(want[&v], d, "major degree of {v}");
        }
        for (l, d) in map.labels().windows(2).zip(map.degrees().windows(2)) {
            assert!(d[0] > d[1] || (d[0] == d[1] && l[0] < l[1]));
        }
    }
    assert_permutation(&global_labels(&results), &vertices);
    let mut all = edges.clone();
    all.sort_unstable();
    assert_eq!(unrelabeled_edges(&results), all);
}
