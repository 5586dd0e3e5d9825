use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use grid_renumber::algs::hash_table::LookupTable;
use grid_renumber::prelude::*;

// Synthetic power-law-ish edge list: low ids are picked far more often
fn skewed_edges(n: u64, m: usize, seed: u64) -> Vec<(u64, u64)> {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..m)
        .map(|_| {
            let a = (rng.r#gen::<f64>().powi(3) * n as f64) as u64;
            let b = rng.gen_range(0..n);
            (a, b)
        })
        .collect()
}

fn bench_single_process(c: &mut Criterion) {
    let mut group = c.benchmark_group("renumber_single");
    for &m in &[10_000usize, 100_000] {
        let edges = skewed_edges(m as u64 / 8, m, 7);
        group.bench_with_input(BenchmarkId::from_parameter(m), &edges, |b, edges| {
            let ctx = GridComm::single();
            let own = HashGridOwnership::new(GridShape::single());
            let cfg = RenumberConfig::default();
            b.iter(|| {
                let mut shards = vec![EdgeListShard::from_pairs(edges)];
                renumber_edgelist(&ctx, &own, &mut shards, None, None, &cfg).unwrap()
            })
        });
    }
    group.finish();
}

fn bench_thread_grid(c: &mut Criterion) {
    let edges = skewed_edges(10_000, 80_000, 11);
    let own = HashGridOwnership::new(GridShape::new(2, 2));
    let mut inputs = vec![vec![Vec::new(); 2]; 4];
    for &(a, b) in &edges {
        let at = own.edge_owner(a, b);
        inputs[at.rank][at.shard].push((a, b));
    }
    // group each shard by the row peer owning the minor endpoint
    let sub_ranges: Vec<SubRangeOffsets> = inputs
        .iter_mut()
        .map(|shards| {
            shards
                .iter_mut()
                .map(|pairs| {
                    pairs.sort_by_key(|&(_, b)| own.minor_sub_range(b));
                    let mut offs = vec![0; 3];
                    for &(_, b) in pairs.iter() {
                        offs[own.minor_sub_range(b) + 1] += 1;
                    }
                    offs[2] += offs[1];
                    offs
                })
                .collect()
        })
        .collect();
    let mut group = c.benchmark_group("renumber_grid_2x2");
    group.sample_size(10);
    for strategy in [
        MinorRelabelStrategy::FullGather,
        MinorRelabelStrategy::PerPeerBroadcast,
    ] {
        let cfg = RenumberConfig {
            minor_strategy: strategy,
            ..RenumberConfig::default()
        };
        group.bench_function(format!("{strategy:?}"), |b| {
            b.iter(|| {
                ThreadComm::run(4, |comm| {
                    let rank = comm.rank();
                    let ctx = GridComm::new(comm, 2, 2).unwrap();
                    let mut shards: Vec<EdgeListShard<u64>> = inputs[rank]
                        .iter()
                        .map(|p| EdgeListShard::from_pairs(p))
                        .collect();
                    let offs = Some(&sub_ranges[rank]);
                    renumber_edgelist(&ctx, &own, &mut shards, None, offs, &cfg)
                        .unwrap()
                        .len()
                })
            })
        });
    }
    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let labels: Vec<u64> = (0..200_000u64).map(|v| v.wrapping_mul(0x9e37_79b9)).collect();
    let table = LookupTable::dense(&labels, 0, 0.7).unwrap();
    c.bench_function("lookup_200k", |b| {
        b.iter(|| {
            let mut ids = labels.clone();
            table.bulk_lookup_in_place(&mut ids).unwrap();
            ids
        })
    });
}

criterion_group!(benches, bench_single_process, bench_thread_grid, bench_lookup);
criterion_main!(benches);
