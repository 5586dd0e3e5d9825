#![cfg_attr(docsrs, feature(doc_cfg))]
//! # grid-renumber
//!
//! grid-renumber relabels the vertices of a graph distributed over a 2D
//! process grid with dense, degree-ordered ids, and rewrites the sharded edge
//! list to use them.
//!
//! ## Features
//! - Collective construction of a per-process renumber map: high-degree
//!   vertices first, isolated vertices last, degree-class segment offsets
//! - Vertex-partition topology queries (major/minor ranges per grid position)
//! - Optional collective consistency validation of caller-supplied shards
//! - In-place edge relabeling with two equivalent minor-dimension strategies
//! - Pluggable communication backends (serial, in-process threads, MPI)
//!
//! ## Grid layout
//!
//! `P = R * C` processes are laid out row-major: rank `p` sits at row
//! `p / C`, column `p % C`. Each process holds `R` edge shards; shard `i`
//! contains edges whose major endpoint is owned by column peer `i` and whose
//! minor endpoint is owned by a row peer.
//!
//! ## Usage
//!
//! ```toml
//! [dependencies]
//! grid-renumber = "0.1"
//! # Optional features:
//! # features = ["mpi-support", "rayon", "check-invariants"]
//! ```
//!
//! ```
//! use grid_renumber::prelude::*;
//!
//! let ctx = GridComm::single();
//! let ownership = HashGridOwnership::new(GridShape::single());
//! let mut shards = vec![EdgeListShard::<u32>::from_pairs(&[(1, 2), (2, 3)])];
//! let map = renumber_edgelist(&ctx, &ownership, &mut shards, None, None, &RenumberConfig::default())?;
//! assert_eq!(map.labels(), &[2, 1, 3]);
//! assert_eq!(shards[0].majors(), &[1, 0]);
//! # Ok::<(), RenumberError>(())
//! ```

pub mod algs;
pub mod debug_invariants;
pub mod partitioning;
pub mod renumber_error;
pub mod topology;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::communicator::{Communicator, NoComm, ThreadComm};
    #[cfg(feature = "mpi-support")]
    pub use crate::algs::communicator::MpiComm;
    pub use crate::algs::grid::GridComm;
    pub use crate::algs::relabel::relabel_edges;
    pub use crate::algs::renumber::{
        DegreeSource, MinorRelabelStrategy, RenumberConfig, renumber_edgelist,
    };
    pub use crate::algs::renumber_map::{RenumberMap, build_renumber_map};
    pub use crate::algs::segments::{DegreeClass, DegreeThresholds, SegmentOffsets};
    pub use crate::algs::validate::validate_inputs;
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::partitioning::{EdgeOwner, GridShape, HashGridOwnership, VertexOwnership};
    pub use crate::renumber_error::RenumberError;
    pub use crate::topology::edgelist::{EdgeListShard, SubRangeOffsets};
    pub use crate::topology::partition::PartitionTopology;
    pub use crate::topology::vertex::VertexId;
}
