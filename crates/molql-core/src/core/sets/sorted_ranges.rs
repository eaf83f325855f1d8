use super::ordered_set::OrderedSet;
use crate::core::utils::hash::{hash_fnv32a, hash2};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Many disjoint closed intervals stored as one flat ascending sequence
/// `[lo0, hi0, lo1, hi1, ...]`.
///
/// Ranges never overlap and are kept in ascending order; `hi` is inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u32>")]
pub struct SortedRanges(Arc<[u32]>);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid sorted ranges: expected ascending, disjoint [lo, hi] pairs")]
pub struct InvalidRangesError;

impl TryFrom<Vec<u32>> for SortedRanges {
    type Error = InvalidRangesError;

    fn try_from(flat: Vec<u32>) -> Result<Self, Self::Error> {
        let paired = flat.len() % 2 == 0;
        let ordered = flat.chunks_exact(2).all(|pair| pair[0] <= pair[1])
            && flat.windows(2).enumerate().all(|(i, w)| {
                if i % 2 == 0 { w[0] <= w[1] } else { w[0] < w[1] }
            });
        if paired && ordered {
            Ok(Self(Arc::from(flat)))
        } else {
            Err(InvalidRangesError)
        }
    }
}

impl Default for SortedRanges {
    fn default() -> Self {
        Self::empty()
    }
}

impl SortedRanges {
    pub fn empty() -> Self {
        Self(Arc::from(Vec::new()))
    }

    /// Wraps flat `[lo, hi]` pairs that are already ascending and disjoint.
    pub fn of_sorted_ranges(flat: Vec<u32>) -> Self {
        debug_assert!(flat.len() % 2 == 0, "ranges must come in [lo, hi] pairs");
        debug_assert!(
            flat.chunks_exact(2).all(|pair| pair[0] <= pair[1])
                && flat.windows(2).all(|w| w[0] <= w[1]),
            "ranges must be ascending and disjoint"
        );
        Self(Arc::from(flat))
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    /// Number of ranges.
    pub fn count(&self) -> usize {
        self.0.len() / 2
    }

    /// Number of values covered by all ranges.
    pub fn size(&self) -> usize {
        self.ranges().map(|(lo, hi)| (hi - lo) as usize + 1).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn min(&self) -> Option<u32> {
        self.0.first().copied()
    }

    pub fn max(&self) -> Option<u32> {
        self.0.last().copied()
    }

    pub fn has(&self, value: u32) -> bool {
        // Index of the first range whose upper bound is >= value.
        let count = self.count();
        let (mut lo, mut hi) = (0usize, count);
        while lo < hi {
            let mid = (lo + hi) / 2;
            if self.0[2 * mid + 1] < value {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        lo < count && self.0[2 * lo] <= value
    }

    pub fn ranges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.0.chunks_exact(2).map(|pair| (pair[0], pair[1]))
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.ranges().flat_map(|(lo, hi)| lo..=hi)
    }

    pub fn to_ordered_set(&self) -> OrderedSet {
        if self.count() == 1 {
            return OrderedSet::of_range(self.0[0], self.0[1]);
        }
        OrderedSet::of_sorted(self.iter().collect())
    }

    pub fn hash_code(&self) -> i32 {
        hash2(self.0.len() as i32, hash_fnv32a(&self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranges() -> SortedRanges {
        SortedRanges::of_sorted_ranges(vec![0, 2, 5, 5, 9, 12])
    }

    #[test]
    fn counts_and_sizes() {
        let r = ranges();
        assert_eq!(r.count(), 3);
        assert_eq!(r.size(), 3 + 1 + 4);
        assert_eq!(r.min(), Some(0));
        assert_eq!(r.max(), Some(12));
        assert!(SortedRanges::empty().is_empty());
    }

    #[test]
    fn membership_checks_every_range() {
        let r = ranges();
        for value in [0, 1, 2, 5, 9, 12] {
            assert!(r.has(value), "expected {value} to be present");
        }
        for value in [3, 4, 6, 8, 13] {
            assert!(!r.has(value), "expected {value} to be absent");
        }
    }

    #[test]
    fn iteration_expands_ranges() {
        let values: Vec<u32> = ranges().iter().collect();
        assert_eq!(values, vec![0, 1, 2, 5, 9, 10, 11, 12]);
    }

    #[test]
    fn single_range_converts_to_interval() {
        let set = SortedRanges::of_sorted_ranges(vec![4, 9]).to_ordered_set();
        assert_eq!(set, OrderedSet::of_range(4, 9));
        assert!(set.is_interval());
    }
}
