//! Typed collectives built on the byte-level [`Communicator`] primitives.
//!
//! Vertex ids and `(vertex, count)` pairs are framed with the records in
//! [`crate::algs::wire`]; arbitrary `Pod` payloads go through `encode`/`decode`.

use crate::algs::communicator::Communicator;
use crate::algs::wire::{decode, decode_ids, decode_pairs, encode, encode_ids, encode_pairs};
use crate::renumber_error::RenumberError;
use crate::topology::vertex::VertexId;
use bytemuck::Pod;

/// All-gather one scalar per member.
pub fn all_gather_scalar<C, T>(comm: &C, value: T) -> Result<Vec<T>, RenumberError>
where
    C: Communicator,
    T: Pod,
{
    comm.all_gather_bytes(&encode(std::slice::from_ref(&value)))?
        .iter()
        .map(|b| {
            decode::<T>(b)?
                .first()
                .copied()
                .ok_or(RenumberError::WireLength {
                    record: std::mem::size_of::<T>(),
                    found: b.len(),
                })
        })
        .collect()
}

/// True on every member if `flag` is true on every member.
pub fn all_reduce_and<C: Communicator>(comm: &C, flag: bool) -> Result<bool, RenumberError> {
    Ok(all_gather_scalar(comm, flag as u8)?.iter().all(|&f| f != 0))
}

/// Make a local outcome collective.
///
/// Every member learns which ranks failed. A failing member returns its own
/// error; the others return [`RenumberError::RemoteFailure`], so nobody walks
/// into the next collective alone.
pub fn agree<C, T>(comm: &C, local: Result<T, RenumberError>) -> Result<T, RenumberError>
where
    C: Communicator,
{
    let flags = all_gather_scalar(comm, local.is_err() as u8)?;
    let ranks: Vec<usize> = flags
        .iter()
        .enumerate()
        .filter(|&(_, &f)| f != 0)
        .map(|(r, _)| r)
        .collect();
    match local {
        Ok(_) if !ranks.is_empty() => {
            log::debug!("rank {}: peers {ranks:?} failed", comm.rank());
            Err(RenumberError::RemoteFailure { ranks })
        }
        other => other,
    }
}

/// All-gather variable-length id vectors, one per member in rank order.
pub fn all_gather_ids<C, V>(comm: &C, ids: &[V]) -> Result<Vec<Vec<V>>, RenumberError>
where
    C: Communicator,
    V: VertexId,
{
    comm.all_gather_bytes(&encode_ids(ids))?
        .iter()
        .map(|b| decode_ids(b))
        .collect()
}

/// Broadcast an id vector from `root`.
pub fn broadcast_ids<C, V>(comm: &C, root: usize, ids: &[V]) -> Result<Vec<V>, RenumberError>
where
    C: Communicator,
    V: VertexId,
{
    decode_ids(&comm.broadcast_bytes(root, &encode_ids(ids))?)
}

/// Gather `(vertex, count)` pairs to `root`, concatenated in source-rank order.
pub fn gather_pairs<C, V>(
    comm: &C,
    root: usize,
    pairs: &[(V, u64)],
) -> Result<Option<Vec<(V, u64)>>, RenumberError>
where
    C: Communicator,
    V: VertexId,
{
    match comm.gather_bytes(root, &encode_pairs(pairs))? {
        Some(bufs) => {
            let mut out = Vec::new();
            for b in &bufs {
                out.extend(decode_pairs::<V>(b)?);
            }
            Ok(Some(out))
        }
        None => Ok(None),
    }
}

/// Route each pair to `dest(pair)` and return everything received.
pub fn shuffle_pairs<C, V, F>(
    comm: &C,
    pairs: &[(V, u64)],
    dest: F,
) -> Result<Vec<(V, u64)>, RenumberError>
where
    C: Communicator,
    V: VertexId,
    F: Fn(V) -> usize,
{
    let mut buckets: Vec<Vec<(V, u64)>> = vec![Vec::new(); comm.size()];
    for &(v, n) in pairs {
        buckets[dest(v)].push((v, n));
    }
    let sends = buckets.iter().map(|b| encode_pairs(b)).collect();
    let mut out = Vec::new();
    for b in comm.all_to_all_bytes(sends)? {
        out.extend(decode_pairs::<V>(&b)?);
    }
    Ok(out)
}

/// Route each id to `dest(id)`; the result keeps one vector per source member.
pub fn shuffle_ids<C, V, F>(comm: &C, ids: &[V], dest: F) -> Result<Vec<Vec<V>>, RenumberError>
where
    C: Communicator,
    V: VertexId,
    F: Fn(V) -> usize,
{
    let mut buckets: Vec<Vec<V>> = vec![Vec::new(); comm.size()];
    for &v in ids {
        buckets[dest(v)].push(v);
    }
    let sends = buckets.iter().map(|b| encode_ids(b)).collect();
    comm.all_to_all_bytes(sends)?
        .iter()
        .map(|b| decode_ids(b))
        .collect()
}
