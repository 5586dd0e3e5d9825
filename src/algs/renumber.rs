//! Top-level renumbering entry point and its configuration.
//!
//! [`renumber_edgelist`] chains the three collective stages: optional input
//! validation, map construction, and in-place edge relabeling. Every process
//! of the grid must call it with the same configuration.

use crate::algs::communicator::Communicator;
use crate::algs::grid::GridComm;
use crate::algs::hash_table::check_load_factor;
use crate::algs::relabel::relabel_edges;
use crate::algs::renumber_map::{RenumberMap, build_renumber_map};
use crate::algs::segments::DegreeThresholds;
use crate::algs::validate::validate_inputs;
use crate::partitioning::VertexOwnership;
use crate::renumber_error::RenumberError;
use crate::topology::edgelist::{EdgeListShard, SubRangeOffsets};
use crate::topology::vertex::VertexId;
use serde::{Deserialize, Serialize};

/// Which endpoint appearances contribute to a vertex's degree.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DegreeSource {
    /// Major and minor appearances; a self loop counts twice.
    #[default]
    Aggregate,
    /// Major appearances only; minor-only vertices get degree 0.
    MajorOnly,
}

/// How the minor endpoints are relabeled.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MinorRelabelStrategy {
    /// Per-peer broadcast when sub-ranges are given and the minor range
    /// dominates the local edge count, full gather otherwise.
    #[default]
    Auto,
    /// One broadcast per row-group peer, lookups restricted to its sub-range.
    PerPeerBroadcast,
    /// Gather the whole minor range once and look up every minor id.
    FullGather,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenumberConfig {
    pub thresholds: DegreeThresholds,
    pub degree_source: DegreeSource,
    pub minor_strategy: MinorRelabelStrategy,
    /// Maximum load factor of the relabeling lookup tables, in (0, 1).
    pub max_load_factor: f64,
    /// Run the consistency validator before building the map.
    pub validate: bool,
}

impl Default for RenumberConfig {
    fn default() -> Self {
        Self {
            thresholds: DegreeThresholds::default(),
            degree_source: DegreeSource::default(),
            minor_strategy: MinorRelabelStrategy::default(),
            max_load_factor: 0.7,
            validate: false,
        }
    }
}

impl RenumberConfig {
    pub fn validate_config(&self) -> Result<(), RenumberError> {
        check_load_factor(self.max_load_factor)?;
        self.thresholds.validate()
    }
}

/// Renumber a 2D-partitioned edge list in place (collective).
///
/// On success every edge endpoint in `shards` holds its dense id and the
/// returned map holds this process's block of the dense → original
/// relabeling. On error the contents of `shards` are unspecified.
pub fn renumber_edgelist<C, V, O>(
    ctx: &GridComm<C>,
    ownership: &O,
    shards: &mut [EdgeListShard<V>],
    local_vertices: Option<&[V]>,
    sub_ranges: Option<&SubRangeOffsets>,
    config: &RenumberConfig,
) -> Result<RenumberMap<V>, RenumberError>
where
    C: Communicator,
    V: VertexId,
    O: VertexOwnership,
{
    if config.validate {
        validate_inputs(ctx, ownership, shards, local_vertices, sub_ranges)?;
    }
    let map = build_renumber_map(ctx, ownership, shards, local_vertices, config)?;
    ctx.phase_barrier("edge relabel")?;
    relabel_edges(ctx, &map, shards, sub_ranges, config)?;
    log::debug!(
        "rank {}: renumbered {} local vertices of {}",
        ctx.rank(),
        map.len(),
        map.topology().number_of_vertices()
    );
    Ok(map)
}
