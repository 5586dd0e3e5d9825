//! Read-only geometry of the 2D process grid after renumbering.
//!
//! [`PartitionTopology`] stores the global vertex-partition offset table
//! (length `P + 1`) and this process's position in the `R x C` grid. Process
//! `p` owns the dense ids `offsets[p]..offsets[p + 1]`.
//!
//! Each process holds `R` local edge shards. Shard `i` has as its major range
//! the vertex partition of column-group peer `i` (rank `i * C + col`), and all
//! shards share one minor range: the contiguous partitions of the row group,
//! `row * C .. (row + 1) * C`.

use crate::debug_invariants::DebugInvariants;
use crate::partitioning::GridShape;
use crate::renumber_error::RenumberError;
use crate::topology::vertex::VertexId;
use std::marker::PhantomData;
use std::ops::Range;

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PartitionTopology<V: VertexId> {
    offsets: Vec<usize>,
    grid: GridShape,
    row_rank: usize,
    col_rank: usize,
    #[serde(skip)]
    _id: PhantomData<V>,
}

impl<V: VertexId> PartitionTopology<V> {
    /// Build a topology from the global offset table and grid coordinates.
    pub fn new(
        offsets: Vec<usize>,
        rows: usize,
        cols: usize,
        row_rank: usize,
        col_rank: usize,
    ) -> Result<Self, RenumberError> {
        let topo = Self {
            offsets,
            grid: GridShape::new(rows, cols),
            row_rank,
            col_rank,
            _id: PhantomData,
        };
        topo.validate_invariants()?;
        Ok(topo)
    }

    /// Single-process topology owning `n` vertices.
    pub fn single(n: usize) -> Result<Self, RenumberError> {
        Self::new(vec![0, n], 1, 1, 0, 0)
    }

    pub fn grid(&self) -> GridShape {
        self.grid
    }

    pub fn row_rank(&self) -> usize {
        self.row_rank
    }

    pub fn col_rank(&self) -> usize {
        self.col_rank
    }

    pub fn comm_rank(&self) -> usize {
        self.grid.rank_of(self.row_rank, self.col_rank)
    }

    pub fn comm_size(&self) -> usize {
        self.grid.size()
    }

    pub fn vertex_partition_offsets(&self) -> &[usize] {
        &self.offsets
    }

    pub fn number_of_vertices(&self) -> usize {
        self.offsets.last().copied().unwrap_or(0)
    }

    pub fn vertex_partition_first(&self, partition: usize) -> usize {
        self.offsets[partition]
    }

    pub fn vertex_partition_size(&self, partition: usize) -> usize {
        self.offsets[partition + 1] - self.offsets[partition]
    }

    pub fn vertex_partition_range(&self, partition: usize) -> Range<usize> {
        self.offsets[partition]..self.offsets[partition + 1]
    }

    /// Dense id range owned by this process.
    pub fn local_vertex_range(&self) -> Range<usize> {
        self.vertex_partition_range(self.comm_rank())
    }

    /// Global partition index of the major slice for column-group peer `i`.
    pub fn major_partition(&self, i: usize) -> usize {
        self.grid.rank_of(i, self.col_rank)
    }

    pub fn major_range_first(&self, i: usize) -> usize {
        self.vertex_partition_first(self.major_partition(i))
    }

    pub fn major_range_size(&self, i: usize) -> usize {
        self.vertex_partition_size(self.major_partition(i))
    }

    pub fn minor_range_first(&self) -> usize {
        self.offsets[self.grid.rank_of(self.row_rank, 0)]
    }

    pub fn minor_range_size(&self) -> usize {
        self.offsets[self.grid.rank_of(self.row_rank + 1, 0)] - self.minor_range_first()
    }

    /// First dense id of row-group peer `j`'s partition.
    pub fn minor_sub_range_first(&self, j: usize) -> usize {
        self.vertex_partition_first(self.grid.rank_of(self.row_rank, j))
    }

    /// Owner of a renumbered id, or `None` when out of range.
    pub fn vertex_owner(&self, v: V) -> Option<usize> {
        let idx = usize::try_from(v.to_i64()?).ok()?;
        if idx >= self.number_of_vertices() {
            return None;
        }
        // offsets are non-decreasing; the owner is the last p with offsets[p] <= idx
        let p = self.offsets.partition_point(|&o| o <= idx) - 1;
        Some(p)
    }

    pub fn is_local(&self, v: V) -> bool {
        self.vertex_owner(v) == Some(self.comm_rank())
    }
}

impl<V: VertexId> DebugInvariants for PartitionTopology<V> {
    fn validate_invariants(&self) -> Result<(), RenumberError> {
        let p = self.grid.size();
        if p == 0 {
            return Err(RenumberError::InvalidTopology("empty process grid".into()));
        }
        if self.offsets.len() != p + 1 {
            return Err(RenumberError::InvalidTopology(format!(
                "offset table has {} entries, expected {}",
                self.offsets.len(),
                p + 1
            )));
        }
        if self.offsets[0] != 0 {
            return Err(RenumberError::InvalidTopology(
                "offset table must start at 0".into(),
            ));
        }
        if let Some(w) = self.offsets.windows(2).position(|w| w[0] > w[1]) {
            return Err(RenumberError::InvalidTopology(format!(
                "offset table decreases at partition {w}"
            )));
        }
        if self.row_rank >= self.grid.rows || self.col_rank >= self.grid.cols {
            return Err(RenumberError::InvalidTopology(format!(
                "grid coordinates ({}, {}) outside {}x{} grid",
                self.row_rank, self.col_rank, self.grid.rows, self.grid.cols
            )));
        }
        Ok(())
    }
}
