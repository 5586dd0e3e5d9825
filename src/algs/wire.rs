//! Fixed little-endian wire records for collective exchanges.
//!
//! All multi-byte integers are stored pre-LE with `.to_le()` and decoded with
//! `.from_le()`. Vertex ids travel as `u64` regardless of the in-memory width.

use crate::renumber_error::RenumberError;
use crate::topology::vertex::VertexId;
use bytemuck::{Pod, Zeroable};
use std::mem::size_of;

/// Copy a typed slice into an owned byte buffer.
pub fn encode<T: Pod>(v: &[T]) -> Vec<u8> {
    bytemuck::cast_slice(v).to_vec()
}

/// Decode a byte buffer into typed records.
///
/// The input may be arbitrarily aligned, so records are copied rather than
/// reinterpreted in place.
pub fn decode<T: Pod>(bytes: &[u8]) -> Result<Vec<T>, RenumberError> {
    let record = size_of::<T>();
    if record == 0 || bytes.len() % record != 0 {
        return Err(RenumberError::WireLength {
            record,
            found: bytes.len(),
        });
    }
    let mut out = vec![T::zeroed(); bytes.len() / record];
    bytemuck::cast_slice_mut::<T, u8>(&mut out).copy_from_slice(bytes);
    Ok(out)
}

/// A vertex id carried on the wire.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable, Debug, PartialEq, Eq)]
pub struct WireId {
    pub id_le: u64,
}

impl WireId {
    pub fn of<V: VertexId>(v: V) -> Self {
        Self {
            id_le: v.to_wire().to_le(),
        }
    }
    pub fn get<V: VertexId>(&self) -> V {
        V::from_wire(u64::from_le(self.id_le))
    }
}

/// A `(vertex, count)` record used for degree exchanges.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable, Debug, PartialEq, Eq)]
pub struct WirePair {
    pub key_le: u64,
    pub value_le: u64,
}

impl WirePair {
    pub fn new<V: VertexId>(key: V, value: u64) -> Self {
        Self {
            key_le: key.to_wire().to_le(),
            value_le: value.to_le(),
        }
    }
    pub fn key<V: VertexId>(&self) -> V {
        V::from_wire(u64::from_le(self.key_le))
    }
    pub fn value(&self) -> u64 {
        u64::from_le(self.value_le)
    }
}

pub fn encode_ids<V: VertexId>(ids: &[V]) -> Vec<u8> {
    let wire: Vec<WireId> = ids.iter().map(|&v| WireId::of(v)).collect();
    encode(&wire)
}

pub fn decode_ids<V: VertexId>(bytes: &[u8]) -> Result<Vec<V>, RenumberError> {
    Ok(decode::<WireId>(bytes)?.iter().map(|w| w.get()).collect())
}

pub fn encode_pairs<V: VertexId>(pairs: &[(V, u64)]) -> Vec<u8> {
    let wire: Vec<WirePair> = pairs.iter().map(|&(k, n)| WirePair::new(k, n)).collect();
    encode(&wire)
}

pub fn decode_pairs<V: VertexId>(bytes: &[u8]) -> Result<Vec<(V, u64)>, RenumberError> {
    Ok(decode::<WirePair>(bytes)?
        .iter()
        .map(|w| (w.key(), w.value()))
        .collect())
}
