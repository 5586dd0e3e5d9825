//! Ownership policies for the 2D process grid.
//!
//! The renumbering algorithms never decide where a vertex or edge lives; they
//! ask a [`VertexOwnership`] policy. The policy must be a pure function of the
//! id and the grid geometry so every process reaches the same answer.
//!
//! Grid layout: `rank = row * cols + col`. The column sub-group of a process
//! holds the `rows` ranks sharing its column; the row sub-group holds the
//! `cols` ranks sharing its row.

use crate::topology::vertex::VertexId;
use ahash::RandomState;

/// Shape of the `rows x cols` process grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct GridShape {
    pub rows: usize,
    pub cols: usize,
}

impl GridShape {
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// The degenerate 1x1 grid used in single-process mode.
    pub const fn single() -> Self {
        Self { rows: 1, cols: 1 }
    }

    pub const fn size(&self) -> usize {
        self.rows * self.cols
    }

    pub const fn row_of(&self, rank: usize) -> usize {
        rank / self.cols
    }

    pub const fn col_of(&self, rank: usize) -> usize {
        rank % self.cols
    }

    pub const fn rank_of(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }
}

impl Default for GridShape {
    fn default() -> Self {
        Self::single()
    }
}

/// Placement of one edge: owning process and local shard index.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EdgeOwner {
    pub rank: usize,
    pub shard: usize,
}

/// Deterministic vertex → process and edge → (process, shard) mapping.
pub trait VertexOwnership: Send + Sync {
    fn grid(&self) -> GridShape;

    /// Rank owning `v` before renumbering.
    fn vertex_owner<V: VertexId>(&self, v: V) -> usize;

    /// Rank and shard that must store the edge `(major, minor)`.
    ///
    /// The rank shares its column with the major owner and its row with the
    /// minor owner; the shard index is the major owner's row.
    fn edge_owner<V: VertexId>(&self, major: V, minor: V) -> EdgeOwner {
        let grid = self.grid();
        let major_owner = self.vertex_owner(major);
        let minor_owner = self.vertex_owner(minor);
        EdgeOwner {
            rank: grid.rank_of(grid.row_of(minor_owner), grid.col_of(major_owner)),
            shard: grid.row_of(major_owner),
        }
    }

    /// Row-group peer index owning `minor`; selects the intra-shard sub-range.
    fn minor_sub_range<V: VertexId>(&self, minor: V) -> usize {
        self.grid().col_of(self.vertex_owner(minor))
    }
}

/// Hash-based ownership: `owner(v) = hash(v) mod P` with fixed hasher seeds.
#[derive(Clone, Debug)]
pub struct HashGridOwnership {
    grid: GridShape,
    hasher: RandomState,
}

const OWNER_SEEDS: [u64; 4] = [
    0x243f_6a88_85a3_08d3,
    0x1319_8a2e_0370_7344,
    0xa409_3822_299f_31d0,
    0x082e_fa98_ec4e_6c89,
];

impl HashGridOwnership {
    pub fn new(grid: GridShape) -> Self {
        let [k0, k1, k2, k3] = OWNER_SEEDS;
        Self {
            grid,
            hasher: RandomState::with_seeds(k0, k1, k2, k3),
        }
    }

    /// Raw hash of a vertex id; exposed so callers can pre-shard inputs.
    pub fn hash_vertex<V: VertexId>(&self, v: V) -> u64 {
        self.hasher.hash_one(v.to_wire())
    }
}

impl VertexOwnership for HashGridOwnership {
    fn grid(&self) -> GridShape {
        self.grid
    }

    fn vertex_owner<V: VertexId>(&self, v: V) -> usize {
        (self.hash_vertex(v) % self.grid.size() as u64) as usize
    }
}
