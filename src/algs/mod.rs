//! Collective renumbering algorithms and the communication layer they run on.

pub mod collectives;
pub mod communicator;
pub mod grid;
pub mod hash_table;
pub mod reduce;
pub mod relabel;
pub mod renumber;
pub mod renumber_map;
pub mod segments;
pub mod validate;
pub mod wire;

pub use relabel::relabel_edges;
pub use renumber::renumber_edgelist;
pub use renumber_map::build_renumber_map;
pub use validate::validate_inputs;
