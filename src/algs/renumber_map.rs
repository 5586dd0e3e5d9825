//! Collective construction of the dense, degree-ordered vertex relabeling.
//!
//! Every process ends up with one contiguous block of the global map: the
//! original ids it owns, sorted by descending degree (ties by ascending
//! original id), followed by its isolated vertices. Block sizes are exchanged
//! to form the vertex-partition offset table, so process `p` assigns dense ids
//! `offsets[p]..offsets[p + 1]` in block order.
//!
//! Phases (column axis, barrier, row axis):
//! 1. per shard, sort major ids and count occurrences;
//! 2. gather shard `i`'s counts to column peer `i` and sum;
//! 3. route partial counts along the row to the owning column and sum;
//! 4. count minor ids, route them along the row to the owner and sum;
//! 5. merge major and minor tables into one `(vertex, degree)` table;
//! 6. append caller-supplied vertices absent from the table as isolated;
//! 7. stable-sort by descending degree;
//! 8. compute degree-class segment offsets.

use crate::algs::collectives::{agree, all_gather_scalar, gather_pairs, shuffle_pairs};
use crate::algs::communicator::Communicator;
use crate::algs::grid::GridComm;
use crate::algs::hash_table::LookupTable;
use crate::algs::reduce::{count_sorted, dedup_sorted, group_by_sum};
use crate::algs::renumber::{DegreeSource, RenumberConfig};
use crate::algs::segments::SegmentOffsets;
use crate::debug_invariants::DebugInvariants;
use crate::partitioning::VertexOwnership;
use crate::renumber_error::RenumberError;
use crate::topology::edgelist::EdgeListShard;
use crate::topology::partition::PartitionTopology;
use crate::topology::vertex::VertexId;

/// This process's block of the global renumber map.
///
/// Position `i` of [`RenumberMap::labels`] holds the original id whose dense
/// id is `topology().local_vertex_range().start + i`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenumberMap<V: VertexId> {
    labels: Vec<V>,
    degrees: Vec<u64>,
    segment_offsets: SegmentOffsets,
    topology: PartitionTopology<V>,
}

impl<V: VertexId> RenumberMap<V> {
    pub fn labels(&self) -> &[V] {
        &self.labels
    }

    /// Degree of each label, aligned with [`RenumberMap::labels`].
    pub fn degrees(&self) -> &[u64] {
        &self.degrees
    }

    pub fn segment_offsets(&self) -> &SegmentOffsets {
        &self.segment_offsets
    }

    pub fn topology(&self) -> &PartitionTopology<V> {
        &self.topology
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// First dense id of this block.
    pub fn first_dense(&self) -> usize {
        self.topology.local_vertex_range().start
    }

    /// Original id of a locally owned dense id.
    pub fn original_of(&self, dense: V) -> Option<V> {
        let idx = dense.to_usize()?.checked_sub(self.first_dense())?;
        self.labels.get(idx).copied()
    }

    /// Original → dense table for this block.
    pub fn lookup_table(&self, max_load_factor: f64) -> Result<LookupTable<V>, RenumberError> {
        LookupTable::dense(&self.labels, self.first_dense(), max_load_factor)
    }

    /// Dense id of a locally owned original id (linear scan).
    pub fn dense_of(&self, original: V) -> Option<V> {
        let idx = self.labels.iter().position(|&l| l == original)?;
        V::from_index(self.first_dense() + idx).ok()
    }

    /// Map locally owned dense ids back to original ids, in place.
    pub fn unrenumber_local(&self, ids: &mut [V]) -> Result<(), RenumberError> {
        for id in ids.iter_mut() {
            *id = self
                .original_of(*id)
                .ok_or(RenumberError::MissingFromRenumberMap(id.to_wire()))?;
        }
        Ok(())
    }

    pub fn into_parts(self) -> (Vec<V>, SegmentOffsets, PartitionTopology<V>) {
        (self.labels, self.segment_offsets, self.topology)
    }
}

impl<V: VertexId> DebugInvariants for RenumberMap<V> {
    fn validate_invariants(&self) -> Result<(), RenumberError> {
        self.topology.validate_invariants()?;
        self.segment_offsets.validate_invariants()?;
        let span = self.topology.local_vertex_range().len();
        if self.labels.len() != span {
            return Err(RenumberError::InvalidTopology(format!(
                "block holds {} labels but partition spans {span}",
                self.labels.len()
            )));
        }
        if self.segment_offsets.block_len() != self.labels.len() {
            return Err(RenumberError::InvalidSegmentOffsets(format!(
                "last offset {} differs from block length {}",
                self.segment_offsets.block_len(),
                self.labels.len()
            )));
        }
        if self.degrees.len() != self.labels.len() {
            return Err(RenumberError::InvalidTopology(
                "degree array does not match labels".into(),
            ));
        }
        if self.labels.iter().any(|l| l.is_invalid()) {
            return Err(RenumberError::InvalidVertexId);
        }
        if let Some(i) = self.degrees.windows(2).position(|w| w[0] < w[1]) {
            return Err(RenumberError::InvalidSegmentOffsets(format!(
                "degrees increase at position {i}"
            )));
        }
        Ok(())
    }
}

/// Local checks every collective entry point runs before its first exchange.
pub(crate) fn check_preconditions<C, V, O>(
    ctx: &GridComm<C>,
    ownership: &O,
    shards: &[EdgeListShard<V>],
    config: &RenumberConfig,
) -> Result<(), RenumberError>
where
    C: Communicator,
    V: VertexId,
    O: VertexOwnership,
{
    config.validate_config()?;
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
    Ok(())
}

/// Build this process's block of the renumber map (collective).
///
/// `shards[i]` must hold the edges whose major endpoint is owned by column
/// peer `i`. `local_vertices`, when given, lists vertices owned by this
/// process that must appear even without edges.
pub fn build_renumber_map<C, V, O>(
    ctx: &GridComm<C>,
    ownership: &O,
    shards: &[EdgeListShard<V>],
    local_vertices: Option<&[V]>,
    config: &RenumberConfig,
) -> Result<RenumberMap<V>, RenumberError>
where
    C: Communicator,
    V: VertexId,
    O: VertexOwnership,
{
    let shape = ctx.shape();
    agree(ctx.world(), check_preconditions(ctx, ownership, shards, config))?;
    let rank = ctx.rank();
    let owner_col = |v: V| shape.col_of(ownership.vertex_owner(v));

    // column axis: each shard's major counts go to the column peer owning that slice
    let mut partial = Vec::new();
    for (i, shard) in shards.iter().enumerate() {
        let counts = count_sorted(shard.majors().to_vec());
        if let Some(recv) = gather_pairs(ctx.col(), i, &counts)? {
            partial = recv;
        }
    }
    let partial = group_by_sum(partial);
    log::debug!("rank {rank}: {} partial major-degree entries", partial.len());

    ctx.phase_barrier("row-axis degree merge")?;

    let major_table = group_by_sum(shuffle_pairs(ctx.row(), &partial, owner_col)?);

    let minors: Vec<V> = shards
        .iter()
        .flat_map(|s| s.minors().iter().copied())
        .collect();
    let mut minor_counts = count_sorted(minors);
    if config.degree_source == DegreeSource::MajorOnly {
        minor_counts.iter_mut().for_each(|(_, n)| *n = 0);
    }
    let minor_table = group_by_sum(shuffle_pairs(ctx.row(), &minor_counts, owner_col)?);
    log::debug!(
        "rank {rank}: {} major and {} minor table entries",
        major_table.len(),
        minor_table.len()
    );

    let mut merged = major_table;
    merged.extend(minor_table);
    let mut table = group_by_sum(merged);

    let isolated: Vec<V> = match local_vertices {
        Some(lv) => dedup_sorted(lv.to_vec())
            .into_iter()
            .filter(|v| table.binary_search_by_key(v, |&(k, _)| k).is_err())
            .collect(),
        None => Vec::new(),
    };

    // stable: equal degrees keep ascending id order from the grouped table
    table.sort_by(|a, b| b.1.cmp(&a.1));

    let mut labels = Vec::with_capacity(table.len() + isolated.len());
    let mut degrees = Vec::with_capacity(table.len() + isolated.len());
    for (v, d) in table {
        labels.push(v);
        degrees.push(d);
    }
    degrees.resize(labels.len() + isolated.len(), 0);
    labels.extend(isolated);

    let thresholds = config.thresholds.scaled(shape.cols);
    let segment_offsets = SegmentOffsets::from_sorted_degrees(&degrees, &thresholds);

    ctx.phase_barrier("partition offset exchange")?;
    let sizes = all_gather_scalar(ctx.world(), labels.len() as u64)?;
    let mut offsets = Vec::with_capacity(sizes.len() + 1);
    offsets.push(0usize);
    for s in sizes {
        let next = offsets[offsets.len() - 1] + s as usize;
        offsets.push(next);
    }
    let topology = PartitionTopology::new(
        offsets,
        shape.rows,
        shape.cols,
        ctx.row_rank(),
        ctx.col_rank(),
    )?;
    log::debug!(
        "rank {rank}: block of {} vertices, segments {:?}, {} vertices globally",
        labels.len(),
        segment_offsets.as_slice(),
        topology.number_of_vertices()
    );

    let map = RenumberMap {
        labels,
        degrees,
        segment_offsets,
        topology,
    };
    map.debug_assert_invariants();
    Ok(map)
}
