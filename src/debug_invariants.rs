//! Structural self-checks for the renumbering outputs.
//!
//! [`PartitionTopology`](crate::topology::partition::PartitionTopology),
//! [`SegmentOffsets`](crate::algs::segments::SegmentOffsets) and
//! [`RenumberMap`](crate::algs::renumber_map::RenumberMap) implement
//! [`DebugInvariants`]. Constructors call `validate_invariants` and report
//! the error; `debug_assert_invariants` panics instead, and only runs in
//! debug builds or with the `check-invariants` feature.

use crate::renumber_error::RenumberError;

pub trait DebugInvariants {
    /// Validate invariants and return the first error encountered.
    fn validate_invariants(&self) -> Result<(), RenumberError>;

    /// Panic on a broken invariant in debug builds or when the
    /// `check-invariants` feature is on. A no-op otherwise.
    fn debug_assert_invariants(&self) {
        #[cfg(any(debug_assertions, feature = "check-invariants"))]
        if let Err(e) = self.validate_invariants() {
            panic!("[invariants] {}: {e}", std::any::type_name::<Self>());
        }
    }
}
