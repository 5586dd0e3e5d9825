//! Throwaway key → dense-id tables for bulk relabeling.
//!
//! [`LookupTable`] is an open-addressing table with linear probing. Empty slots
//! hold `V::INVALID`, so the sentinel can never be stored as a key. Capacity is
//! the next power of two holding `n` keys under the configured maximum load
//! factor, and always leaves at least one free slot so probing terminates.

use crate::renumber_error::RenumberError;
use crate::topology::vertex::VertexId;
use ahash::RandomState;

const TABLE_SEEDS: [u64; 4] = [
    0x9e37_79b9_7f4a_7c15,
    0xbf58_476d_1ce4_e5b9,
    0x94d0_49bb_1331_11eb,
    0x2545_f491_4f6c_dd1d,
];

#[derive(Clone, Debug)]
pub struct LookupTable<V: VertexId> {
    keys: Vec<V>,
    values: Vec<V>,
    mask: usize,
    len: usize,
    hasher: RandomState,
}

/// Smallest accepted load factor; bounds a table at 64 slots per key.
pub const MIN_LOAD_FACTOR: f64 = 1.0 / 64.0;

/// Reject load factors outside `[MIN_LOAD_FACTOR, 1)`.
pub fn check_load_factor(max_load_factor: f64) -> Result<(), RenumberError> {
    if (MIN_LOAD_FACTOR..1.0).contains(&max_load_factor) {
        Ok(())
    } else {
        Err(RenumberError::InvalidConfig(format!(
            "max load factor must lie in [{MIN_LOAD_FACTOR}, 1), got {max_load_factor}"
        )))
    }
}

/// Power-of-two slot count holding `n` keys under `max_load_factor`, with
/// at least one free slot.
fn table_capacity(n: usize, max_load_factor: f64) -> Result<usize, RenumberError> {
    let overflow = || {
        RenumberError::InvalidConfig(format!(
            "lookup table for {n} keys at load factor {max_load_factor} overflows"
        ))
    };
    let wanted = (n as f64 / max_load_factor).ceil();
    if !wanted.is_finite() || wanted >= usize::MAX as f64 {
        return Err(overflow());
    }
    let min = n.checked_add(1).ok_or_else(overflow)?;
    (wanted as usize)
        .max(min)
        .checked_next_power_of_two()
        .ok_or_else(overflow)
}

impl<V: VertexId> LookupTable<V> {
    /// Build a table mapping `keys[i] → values[i]`.
    pub fn bulk_build(keys: &[V], values: &[V], max_load_factor: f64) -> Result<Self, RenumberError> {
        check_load_factor(max_load_factor)?;
        debug_assert_eq!(keys.len(), values.len());
        let capacity = table_capacity(keys.len(), max_load_factor)?;
        let [k0, k1, k2, k3] = TABLE_SEEDS;
        let mut table = Self {
            keys: vec![V::INVALID; capacity],
            values: vec![V::INVALID; capacity],
            mask: capacity - 1,
            len: 0,
            hasher: RandomState::with_seeds(k0, k1, k2, k3),
        };
        for (&k, &v) in keys.iter().zip(values) {
            table.insert(k, v)?;
        }
        Ok(table)
    }

    /// Build a table mapping `labels[i] → first + i`.
    pub fn dense(labels: &[V], first: usize, max_load_factor: f64) -> Result<Self, RenumberError> {
        let values = (0..labels.len())
            .map(|i| V::from_index(first + i))
            .collect::<Result<Vec<V>, _>>()?;
        Self::bulk_build(labels, &values, max_load_factor)
    }

    fn slot(&self, key: V) -> usize {
        (self.hasher.hash_one(key.to_wire()) as usize) & self.mask
    }

    fn insert(&mut self, key: V, value: V) -> Result<(), RenumberError> {
        if key.is_invalid() {
            return Err(RenumberError::InvalidVertexId);
        }
        let mut i = self.slot(key);
        loop {
            if self.keys[i] == key {
                self.values[i] = value;
                return Ok(());
            }
            if self.keys[i].is_invalid() {
                self.keys[i] = key;
                self.values[i] = value;
                self.len += 1;
                return Ok(());
            }
            i = (i + 1) & self.mask;
        }
    }

    pub fn find(&self, key: V) -> Option<V> {
        if key.is_invalid() {
            return None;
        }
        let mut i = self.slot(key);
        loop {
            let k = self.keys[i];
            if k == key {
                return Some(self.values[i]);
            }
            if k.is_invalid() {
                return None;
            }
            i = (i + 1) & self.mask;
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.keys.len()
    }

    /// Replace every id with its mapped value; a miss is a structural error.
    pub fn bulk_lookup_in_place(&self, ids: &mut [V]) -> Result<(), RenumberError> {
        let lookup = |id: &mut V| -> Result<(), RenumberError> {
            *id = self
                .find(*id)
                .ok_or(RenumberError::MissingFromRenumberMap(id.to_wire()))?;
            Ok(())
        };
        #[cfg(feature = "rayon")]
        let result = {
            use rayon::prelude::*;
            ids.par_iter_mut().try_for_each(lookup)
        };
        #[cfg(not(feature = "rayon"))]
        let result = ids.iter_mut().try_for_each(lookup);
        result
    }
}
