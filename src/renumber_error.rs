//! RenumberError: unified error type for grid-renumber public APIs
//!
//! Every collective entry point returns this type. Variants fall into three
//! groups: caller-contract violations (reported by the validator), structural
//! invariant violations (a vertex missing from the renumber map), and
//! communication/configuration failures.

use thiserror::Error;

/// Unified error type for renumbering operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenumberError {
    /// The vertex-partition offset table or grid ranks are malformed.
    #[error("Invalid partition topology: {0}")]
    InvalidTopology(String),
    /// `rows * cols` does not match the number of processes.
    #[error("Grid shape {rows}x{cols} does not match communicator size {size}")]
    GridShapeMismatch { rows: usize, cols: usize, size: usize },
    /// A process must hold exactly one shard per column-group peer.
    #[error("Expected {expected} local edge shards, found {found}")]
    ShardCountMismatch { expected: usize, found: usize },
    /// Parallel per-edge columns of a shard disagree in length.
    #[error("Shard {shard}: column `{column}` has {found} entries, expected {expected}")]
    ShardLengthMismatch {
        shard: usize,
        column: &'static str,
        expected: usize,
        found: usize,
    },
    /// The reserved sentinel value appeared as an input vertex.
    #[error("Input contains the reserved invalid vertex id")]
    InvalidVertexId,
    /// The explicit local vertex list contains the same id twice.
    #[error("Invalid input: duplicate local vertex {0}")]
    DuplicateLocalVertex(u64),
    /// A local vertex is owned by another process.
    #[error("Invalid input: local vertex {vertex} is owned by rank {owner}, not rank {rank}")]
    VertexNotOwned { vertex: u64, owner: usize, rank: usize },
    /// An edge is stored on a process or shard the ownership function does not assign it to.
    #[error(
        "Invalid input: edge ({major}, {minor}) in shard {shard} on rank {rank} is not pre-shuffled \
         (belongs to rank {expected_rank}, shard {expected_shard})"
    )]
    EdgeNotPreShuffled {
        rank: usize,
        shard: usize,
        major: u64,
        minor: u64,
        expected_rank: usize,
        expected_shard: usize,
    },
    /// An edge endpoint is absent from the global vertex set.
    #[error("Invalid input: edge endpoint {0} is not in the global vertex set")]
    DanglingVertex(u64),
    /// Intra-partition sub-range offsets are malformed.
    #[error("Invalid sub-range offsets for shard {shard}: {reason}")]
    InvalidSubRangeOffsets { shard: usize, reason: String },
    /// An edge lies inside a declared sub-range its minor endpoint does not belong to.
    #[error(
        "Invalid input: shard {shard} edge with minor {minor} lies in sub-range {declared} but belongs to {actual}"
    )]
    EdgeOutsideSubRange {
        shard: usize,
        minor: u64,
        declared: usize,
        actual: usize,
    },
    /// Another process failed during the same collective call.
    #[error("Collective call failed on peer rank(s) {ranks:?}")]
    RemoteFailure { ranks: Vec<usize> },
    /// A vertex expected in the renumber map was not found during lookup.
    #[error("Structural invariant violated: vertex {0} missing from renumber map")]
    MissingFromRenumberMap(u64),
    /// A dense id does not fit the vertex integer type.
    #[error("Dense vertex id {0} does not fit the vertex id type")]
    VertexIdOverflow(usize),
    /// Configuration values are out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    /// A collective operation failed.
    #[error("Communication error with rank {neighbor}: {message}")]
    CommError { neighbor: usize, message: String },
    /// A received buffer is not a whole number of records.
    #[error("Wire buffer of {found} bytes is not a multiple of record size {record}")]
    WireLength { record: usize, found: usize },
    /// A segment offset array breaks monotonicity or its end points.
    #[error("Invalid segment offsets: {0}")]
    InvalidSegmentOffsets(String),
}
