//! Collective consistency checks on renumbering inputs.
//!
//! Catches caller-contract violations before any map is built: malformed
//! shards, the reserved sentinel id, local vertex lists that are duplicated
//! or owned elsewhere, edges stored on the wrong process or shard, endpoints
//! outside the global vertex set, and mis-declared sub-ranges.
//!
//! Checks are local except the dangling-endpoint check, which ships each
//! distinct endpoint to its owner over the world communicator. Each stage
//! ends in an agreement step, so every process returns an error when any
//! process found one.

use crate::algs::collectives::{agree, all_reduce_and, shuffle_ids};
use crate::algs::communicator::Communicator;
use crate::algs::grid::GridComm;
use crate::algs::reduce::dedup_sorted;
use crate::partitioning::VertexOwnership;
use crate::renumber_error::RenumberError;
use crate::topology::edgelist::{EdgeListShard, SubRangeOffsets, check_sub_range_offsets};
use crate::topology::vertex::VertexId;
use hashbrown::HashSet;

fn check_local_vertices<V, O>(
    ownership: &O,
    rank: usize,
    local_vertices: &[V],
) -> Result<HashSet<V>, RenumberError>
where
    V: VertexId,
    O: VertexOwnership,
{
    let mut seen = HashSet::with_capacity(local_vertices.len());
    for &v in local_vertices {
        if v.is_invalid() {
            return Err(RenumberError::InvalidVertexId);
        }
        if !seen.insert(v) {
            return Err(RenumberError::DuplicateLocalVertex(v.to_wire()));
        }
        let owner = ownership.vertex_owner(v);
        if owner != rank {
            return Err(RenumberError::VertexNotOwned {
                vertex: v.to_wire(),
                owner,
                rank,
            });
        }
    }
    Ok(seen)
}

fn check_placement<V, O>(
    ownership: &O,
    rank: usize,
    shards: &[EdgeListShard<V>],
) -> Result<(), RenumberError>
where
    V: VertexId,
    O: VertexOwnership,
{
    for (shard, edges) in shards.iter().enumerate() {
        edges.check_lengths(shard)?;
        for (major, minor) in edges.pairs() {
            if major.is_invalid() || minor.is_invalid() {
                return Err(RenumberError::InvalidVertexId);
            }
            let owner = ownership.edge_owner(major, minor);
            if owner.rank != rank || owner.shard != shard {
                return Err(RenumberError::EdgeNotPreShuffled {
                    rank,
                    shard,
                    major: major.to_wire(),
                    minor: minor.to_wire(),
                    expected_rank: owner.rank,
                    expected_shard: owner.shard,
                });
            }
        }
    }
    Ok(())
}

fn check_sub_ranges<V, O>(
    ownership: &O,
    shards: &[EdgeListShard<V>],
    offsets: &SubRangeOffsets,
) -> Result<(), RenumberError>
where
    V: VertexId,
    O: VertexOwnership,
{
    let cols = ownership.grid().cols;
    check_sub_range_offsets(offsets, shards, cols)?;
    for (shard, (edges, offs)) in shards.iter().zip(offsets).enumerate() {
        for declared in 0..cols {
            for &minor in &edges.minors()[offs[declared]..offs[declared + 1]] {
                let actual = ownership.minor_sub_range(minor);
                if actual != declared {
                    return Err(RenumberError::EdgeOutsideSubRange {
                        shard,
                        minor: minor.to_wire(),
                        declared,
                        actual,
                    });
                }
            }
        }
    }
    Ok(())
}

/// All process-local checks, in reporting order.
fn check_local<C, V, O>(
    ctx: &GridComm<C>,
    ownership: &O,
    shards: &[EdgeListShard<V>],
    local_vertices: Option<&[V]>,
    sub_ranges: Option<&SubRangeOffsets>,
) -> Result<Option<HashSet<V>>, RenumberError>
where
    C: Communicator,
    V: VertexId,
    O: VertexOwnership,
{
    let shape = ctx.shape();
    if ownership.grid() != shape {
        return Err(RenumberError::GridShapeMismatch {
            rows: ownership.grid().rows,
            cols: ownership.grid().cols,
            size: ctx.size(),
        });
    }
    if shards.len() != shape.rows {
        return Err(RenumberError::ShardCountMismatch {
            expected: shape.rows,
            found: shards.len(),
        });
    }
    let rank = ctx.rank();
    let owned = local_vertices
        .map(|lv| check_local_vertices(ownership, rank, lv))
        .transpose()?;
    check_placement(ownership, rank, shards)?;
    if let Some(offsets) = sub_ranges {
        check_sub_ranges(ownership, shards, offsets)?;
    }
    Ok(owned)
}

/// Validate renumbering inputs on every process (collective).
///
/// Returns `Ok` on every process or an error on every process; processes
/// whose own inputs were fine report [`RenumberError::RemoteFailure`].
///
/// The dangling-endpoint check runs only when every process supplies
/// `local_vertices`; otherwise the vertex set is implied by the edges.
pub fn validate_inputs<C, V, O>(
    ctx: &GridComm<C>,
    ownership: &O,
    shards: &[EdgeListShard<V>],
    local_vertices: Option<&[V]>,
    sub_ranges: Option<&SubRangeOffsets>,
) -> Result<(), RenumberError>
where
    C: Communicator,
    V: VertexId,
    O: VertexOwnership,
{
    let rank = ctx.rank();
    let owned = agree(
        ctx.world(),
        check_local(ctx, ownership, shards, local_vertices, sub_ranges),
    )?;
    log::debug!("rank {rank}: local input checks passed");

    let supplied = all_reduce_and(ctx.world(), owned.is_some())?;
    let owned = match owned {
        Some(set) if supplied => set,
        _ => {
            log::trace!("rank {rank}: no explicit vertex set everywhere, skipping dangling check");
            return Ok(());
        }
    };

    let endpoints = dedup_sorted(
        shards
            .iter()
            .flat_map(|s| s.majors().iter().chain(s.minors()).copied())
            .collect(),
    );
    let received = shuffle_ids(ctx.world(), &endpoints, |v| ownership.vertex_owner(v))?;
    let dangling = received
        .iter()
        .flatten()
        .find(|v| !owned.contains(*v))
        .map_or(Ok(()), |v| Err(RenumberError::DanglingVertex(v.to_wire())));
    agree(ctx.world(), dangling)?;
    log::debug!("rank {rank}: {} endpoints checked against owners", endpoints.len());
    Ok(())
}
