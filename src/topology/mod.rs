//! Data model of a 2D-partitioned graph.
//!
//! This module provides:
//! - the [`vertex::VertexId`] trait and its reserved sentinel
//! - sharded edge lists with optional per-edge property columns
//! - the vertex-partition offset table mapping dense ids to processes
//!
//! Most users build [`edgelist::EdgeListShard`]s, hand them to
//! [`crate::algs::renumber_edgelist`], and query the resulting
//! [`partition::PartitionTopology`].

pub mod edgelist;
pub mod partition;
pub mod vertex;
