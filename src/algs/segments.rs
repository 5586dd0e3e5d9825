//! Degree-class segment boundaries of a renumbered vertex block.
//!
//! A block is sorted by descending degree, so each degree class is a
//! contiguous range. Boundaries come from a monotonic search of the sorted
//! degree array against fixed thresholds; in multi-process mode thresholds
//! are multiplied by the column-group width.
//!
//! Segments, in order: high (`deg >= high`), mid (`deg >= mid`), low
//! (`deg >= 1`, or `deg >= hypersparse` when enabled), the optional
//! hypersparse class (`1 <= deg < hypersparse`), and finally the isolated
//! degree-0 vertices.

use crate::debug_invariants::DebugInvariants;
use crate::renumber_error::RenumberError;
use std::ops::Range;

pub const DEFAULT_HIGH_DEGREE_THRESHOLD: u64 = 1024;
pub const DEFAULT_MID_DEGREE_THRESHOLD: u64 = 32;

#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DegreeThresholds {
    pub high: u64,
    pub mid: u64,
    /// Enables the hypersparse class below this degree.
    pub hypersparse: Option<u64>,
}

impl Default for DegreeThresholds {
    fn default() -> Self {
        Self {
            high: DEFAULT_HIGH_DEGREE_THRESHOLD,
            mid: DEFAULT_MID_DEGREE_THRESHOLD,
            hypersparse: None,
        }
    }
}

impl DegreeThresholds {
    /// Thresholds scaled by the column-group width (no-op for `cols <= 1`).
    pub fn scaled(&self, cols: usize) -> Self {
        if cols <= 1 {
            return *self;
        }
        let c = cols as u64;
        Self {
            high: self.high.saturating_mul(c),
            mid: self.mid.saturating_mul(c),
            hypersparse: self.hypersparse.map(|h| h.saturating_mul(c)),
        }
    }

    pub fn validate(&self) -> Result<(), RenumberError> {
        if self.mid == 0 || self.high < self.mid {
            return Err(RenumberError::InvalidConfig(format!(
                "degree thresholds must satisfy high >= mid >= 1 (high {}, mid {})",
                self.high, self.mid
            )));
        }
        if let Some(h) = self.hypersparse {
            if h == 0 || h > self.mid {
                return Err(RenumberError::InvalidConfig(format!(
                    "hypersparse threshold {h} must lie in [1, mid = {}]",
                    self.mid
                )));
            }
        }
        Ok(())
    }

    /// Descending lower bounds of each non-isolated class.
    fn lower_bounds(&self) -> Vec<u64> {
        let mut b = vec![self.high, self.mid, self.hypersparse.unwrap_or(1)];
        if self.hypersparse.is_some() {
            b.push(1);
        }
        b
    }
}

/// Named degree classes; `Hypersparse` exists only when enabled.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DegreeClass {
    High,
    Mid,
    Low,
    Hypersparse,
    Isolated,
}

/// Non-decreasing boundaries splitting a block into degree classes.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SegmentOffsets(Vec<usize>);

impl SegmentOffsets {
    /// Compute boundaries over degrees sorted in descending order.
    pub fn from_sorted_degrees(degrees: &[u64], thresholds: &DegreeThresholds) -> Self {
        let mut offsets = Vec::with_capacity(6);
        offsets.push(0);
        for bound in thresholds.lower_bounds() {
            offsets.push(degrees.partition_point(|&d| d >= bound));
        }
        offsets.push(degrees.len());
        Self(offsets)
    }

    pub fn from_raw(offsets: Vec<usize>) -> Result<Self, RenumberError> {
        let s = Self(offsets);
        s.validate_invariants()?;
        Ok(s)
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<usize> {
        self.0
    }

    pub fn num_segments(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    pub fn has_hypersparse(&self) -> bool {
        self.num_segments() == 5
    }

    /// Length of the block the offsets split.
    pub fn block_len(&self) -> usize {
        self.0.last().copied().unwrap_or(0)
    }

    pub fn segment(&self, i: usize) -> Range<usize> {
        self.0[i]..self.0[i + 1]
    }

    pub fn class_range(&self, class: DegreeClass) -> Option<Range<usize>> {
        let idx = match class {
            DegreeClass::High => 0,
            DegreeClass::Mid => 1,
            DegreeClass::Low => 2,
            DegreeClass::Hypersparse if self.has_hypersparse() => 3,
            DegreeClass::Hypersparse => return None,
            DegreeClass::Isolated => self.num_segments().checked_sub(1)?,
        };
        (idx < self.num_segments()).then(|| self.segment(idx))
    }
}

impl DebugInvariants for SegmentOffsets {
    fn validate_invariants(&self) -> Result<(), RenumberError> {
        match self.0.first() {
            Some(0) => {}
            Some(&f) => {
                return Err(RenumberError::InvalidSegmentOffsets(format!(
                    "first offset is {f}, expected 0"
                )));
            }
            None => return Err(RenumberError::InvalidSegmentOffsets("empty".into())),
        }
        if let Some(i) = self.0.windows(2).position(|w| w[0] > w[1]) {
            return Err(RenumberError::InvalidSegmentOffsets(format!(
                "offsets decrease at boundary {i}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_boundary_counts_degrees_at_threshold() {
        let t = DegreeThresholds {
            high: 2,
            mid: 2,
            hypersparse: None,
        };
        let s = SegmentOffsets::from_sorted_degrees(&[3, 2, 1, 1, 1, 0], &t);
        assert_eq!(s.as_slice(), &[0, 2, 2, 5, 6]);
        assert_eq!(s.class_range(DegreeClass::High), Some(0..2));
        assert_eq!(s.class_range(DegreeClass::Isolated), Some(5..6));
        assert_eq!(s.class_range(DegreeClass::Hypersparse), None);
    }

    #[test]
    fn hypersparse_adds_a_segment() {
        let t = DegreeThresholds {
            high: 8,
            mid: 4,
            hypersparse: Some(2),
        };
        let s = SegmentOffsets::from_sorted_degrees(&[9, 5, 3, 2, 1, 1, 0, 0], &t);
        assert_eq!(s.as_slice(), &[0, 1, 2, 4, 6, 8]);
        assert!(s.has_hypersparse());
        assert_eq!(s.class_range(DegreeClass::Hypersparse), Some(4..6));
        assert_eq!(s.class_range(DegreeClass::Isolated), Some(6..8));
    }

    #[test]
    fn scaling_multiplies_by_column_width() {
        let t = DegreeThresholds::default();
        assert_eq!(t.scaled(1), t);
        let s = t.scaled(4);
        assert_eq!((s.high, s.mid), (4096, 128));
    }

    #[test]
    fn threshold_ordering_is_validated() {
        let bad = DegreeThresholds {
            high: 1,
            mid: 4,
            hypersparse: None,
        };
        assert!(bad.validate().is_err());
        let bad_hs = DegreeThresholds {
            hypersparse: Some(64),
            ..DegreeThresholds::default()
        };
        assert!(bad_hs.validate().is_err());
        assert!(DegreeThresholds::default().validate().is_ok());
    }

    #[test]
    fn raw_offsets_must_be_monotonic() {
        assert!(SegmentOffsets::from_raw(vec![0, 3, 2]).is_err());
        assert!(SegmentOffsets::from_raw(vec![1, 3]).is_err());
        assert_eq!(SegmentOffsets::from_raw(vec![0, 0, 4]).unwrap().block_len(), 4);
    }
}
