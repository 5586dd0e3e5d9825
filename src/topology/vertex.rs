//! `VertexId`: the integer-width policy for vertex identifiers.
//!
//! Every algorithm in this crate is generic over one vertex integer type.
//! The type reserves its maximum value as the `INVALID` sentinel: input ids
//! must never use it, and a lookup that would yield it is a structural error.
//!
//! On the wire every id travels as a `u64` (sign-extended for signed types),
//! so collectives are independent of the chosen width.

use crate::renumber_error::RenumberError;
use bytemuck::Pod;
use num_traits::PrimInt;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Number of edges held by a local shard.
pub type EdgeCount = usize;

/// Integer types usable as vertex identifiers.
pub trait VertexId:
    PrimInt + Pod + Hash + Debug + Display + Default + Send + Sync + 'static
{
    /// Reserved sentinel; never a valid vertex.
    const INVALID: Self;

    /// Lossless widening for transport.
    fn to_wire(self) -> u64;

    /// Inverse of [`VertexId::to_wire`].
    fn from_wire(w: u64) -> Self;

    /// Convert a dense position into an id of this type.
    ///
    /// Fails if the position does not fit or collides with the sentinel.
    #[inline]
    fn from_index(idx: usize) -> Result<Self, RenumberError> {
        match num_traits::cast::<usize, Self>(idx) {
            Some(v) if v != Self::INVALID => Ok(v),
            _ => Err(RenumberError::VertexIdOverflow(idx)),
        }
    }

    #[inline]
    fn is_invalid(self) -> bool {
        self == Self::INVALID
    }
}

macro_rules! impl_vertex_id {
    ($($t:ty),*) => {$(
        impl VertexId for $t {
            const INVALID: Self = <$t>::MAX;

            #[inline]
            fn to_wire(self) -> u64 {
                self as u64
            }

            #[inline]
            fn from_wire(w: u64) -> Self {
                w as $t
            }
        }
    )*};
}

impl_vertex_id!(i32, i64, u32, u64);
