//! In-place relabeling of sharded edge endpoints to dense ids.
//!
//! Majors are relabeled along the column sub-group: column peer `i` owns the
//! major range of shard `i` and broadcasts its block, every member builds a
//! lookup table for it and rewrites shard `i`'s majors. Minors are relabeled
//! along the row sub-group, whose members together own the contiguous minor
//! range, with one of two strategies that yield identical results:
//!
//! * per-peer broadcast: row peer `j` broadcasts its block and members only
//!   look up the caller-declared sub-range `j` of each shard;
//! * full gather: the row group all-gathers the whole minor range into one
//!   table and every minor id is looked up in a single pass.
//!
//! Lookup failures are deferred until every broadcast of the phase has been
//! matched, then agreed on over the world, so a miss on one process never
//! leaves its peers blocked in a sub-group collective.

use crate::algs::collectives::{agree, all_gather_ids, all_reduce_and, broadcast_ids};
use crate::algs::communicator::Communicator;
use crate::algs::grid::GridComm;
use crate::algs::hash_table::LookupTable;
use crate::algs::renumber::{MinorRelabelStrategy, RenumberConfig};
use crate::algs::renumber_map::RenumberMap;
use crate::renumber_error::RenumberError;
use crate::topology::edgelist::{
    EdgeListShard, SubRangeOffsets, check_sub_range_offsets, total_edges,
};
use crate::topology::vertex::VertexId;

fn check_relabel_inputs<C, V>(
    ctx: &GridComm<C>,
    map: &RenumberMap<V>,
    shards: &[EdgeListShard<V>],
    sub_ranges: Option<&SubRangeOffsets>,
    config: &RenumberConfig,
) -> Result<(), RenumberError>
where
    C: Communicator,
    V: VertexId,
{
    config.validate_config()?;
    let shape = ctx.shape();
    let topo = map.topology();
    if topo.grid() != shape || topo.comm_rank() != ctx.rank() {
        return Err(RenumberError::InvalidTopology(format!(
            "renumber map belongs to rank {} of a {}x{} grid, caller is rank {} of {}x{}",
            topo.comm_rank(),
            topo.grid().rows,
            topo.grid().cols,
            ctx.rank(),
            shape.rows,
            shape.cols
        )));
    }
    if shards.len() != shape.rows {
        return Err(RenumberError::ShardCountMismatch {
            expected: shape.rows,
            found: shards.len(),
        });
    }
    if let Some(offsets) = sub_ranges {
        check_sub_range_offsets(offsets, shards, shape.cols)?;
    }
    Ok(())
}

/// Whether this process would rather relabel minors peer by peer.
fn prefers_per_peer<V: VertexId>(
    strategy: MinorRelabelStrategy,
    map: &RenumberMap<V>,
    shards: &[EdgeListShard<V>],
    have_sub_ranges: bool,
    cols: usize,
) -> bool {
    match strategy {
        MinorRelabelStrategy::FullGather => false,
        MinorRelabelStrategy::PerPeerBroadcast => have_sub_ranges,
        MinorRelabelStrategy::Auto => {
            have_sub_ranges
                && cols >= 2
                && 2 * map.topology().minor_range_size() > total_edges(shards)
        }
    }
}

/// Rewrite every major and minor id in `shards` to its dense id (collective).
///
/// `sub_ranges`, when given, must split each shard by the row-group peer
/// owning the minor endpoint. Only the id columns change.
pub fn relabel_edges<C, V>(
    ctx: &GridComm<C>,
    map: &RenumberMap<V>,
    shards: &mut [EdgeListShard<V>],
    sub_ranges: Option<&SubRangeOffsets>,
    config: &RenumberConfig,
) -> Result<(), RenumberError>
where
    C: Communicator,
    V: VertexId,
{
    agree(
        ctx.world(),
        check_relabel_inputs(ctx, map, shards, sub_ranges, config),
    )?;
    let shape = ctx.shape();
    let topo = map.topology();
    let lf = config.max_load_factor;
    let rank = ctx.rank();

    let mut outcome = Ok(());
    for (i, shard) in shards.iter_mut().enumerate() {
        let labels = broadcast_ids(ctx.col(), i, map.labels())?;
        if outcome.is_ok() {
            outcome = LookupTable::dense(&labels, topo.major_range_first(i), lf)
                .and_then(|table| table.bulk_lookup_in_place(shard.majors_mut()));
        }
    }
    agree(ctx.world(), outcome)?;
    log::debug!("rank {rank}: majors relabeled");

    ctx.phase_barrier("minor relabel")?;

    let local = prefers_per_peer(
        config.minor_strategy,
        map,
        shards,
        sub_ranges.is_some(),
        shape.cols,
    );
    let per_peer = all_reduce_and(ctx.world(), local)?;
    if config.minor_strategy == MinorRelabelStrategy::PerPeerBroadcast && !per_peer {
        log::warn!("rank {rank}: per-peer minor relabel needs sub-ranges on every rank, using full gather");
    }

    let mut outcome = Ok(());
    match sub_ranges {
        Some(offsets) if per_peer => {
            log::trace!("rank {rank}: minor relabel by per-peer broadcast");
            for j in 0..shape.cols {
                let labels = broadcast_ids(ctx.row(), j, map.labels())?;
                if outcome.is_err() {
                    continue;
                }
                outcome = LookupTable::dense(&labels, topo.minor_sub_range_first(j), lf)
                    .and_then(|table| {
                        shards.iter_mut().zip(offsets).try_for_each(|(shard, offs)| {
                            table.bulk_lookup_in_place(&mut shard.minors_mut()[offs[j]..offs[j + 1]])
                        })
                    });
            }
        }
        _ => {
            log::trace!("rank {rank}: minor relabel by full gather");
            let labels: Vec<V> = all_gather_ids(ctx.row(), map.labels())?
                .into_iter()
                .flatten()
                .collect();
            outcome = LookupTable::dense(&labels, topo.minor_range_first(), lf).and_then(|table| {
                shards
                    .iter_mut()
                    .try_for_each(|shard| table.bulk_lookup_in_place(shard.minors_mut()))
            });
        }
    }
    agree(ctx.world(), outcome)?;
    log::debug!("rank {rank}: minors relabeled");
    Ok(())
}
