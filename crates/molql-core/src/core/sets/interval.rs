use std::ops::Range;

/// A contiguous run of indices `[start, end)`.
///
/// Intervals are the cheapest [`OrderedSet`](super::OrderedSet) representation:
/// membership, size and positional lookups are all O(1). The empty interval is
/// always stored as `[0, 0)` so that two empty intervals compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Interval {
    start: u32,
    end: u32,
}

impl Interval {
    pub const EMPTY: Interval = Interval { start: 0, end: 0 };

    /// Creates the half-open interval `[start, end)`.
    pub fn of_bounds(start: u32, end: u32) -> Self {
        if end <= start {
            Self::EMPTY
        } else {
            Self { start, end }
        }
    }

    /// Creates the closed interval `[min, max]`.
    pub fn of_range(min: u32, max: u32) -> Self {
        if max < min {
            Self::EMPTY
        } else {
            Self::of_bounds(min, max + 1)
        }
    }

    pub fn of_single(value: u32) -> Self {
        Self::of_bounds(value, value + 1)
    }

    #[inline]
    pub fn start(&self) -> u32 {
        self.start
    }

    #[inline]
    pub fn end(&self) -> u32 {
        self.end
    }

    pub fn min(&self) -> Option<u32> {
        (!self.is_empty()).then_some(self.start)
    }

    pub fn max(&self) -> Option<u32> {
        (!self.is_empty()).then(|| self.end - 1)
    }

    #[inline]
    pub fn size(&self) -> usize {
        (self.end - self.start) as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }

    #[inline]
    pub fn has(&self, value: u32) -> bool {
        value >= self.start && value < self.end
    }

    pub fn index_of(&self, value: u32) -> Option<usize> {
        self.has(value).then(|| (value - self.start) as usize)
    }

    #[inline]
    pub fn get_at(&self, index: usize) -> u32 {
        self.start + index as u32
    }

    /// Number of members strictly smaller than `value`.
    pub fn find_predecessor_index(&self, value: u32) -> usize {
        if value <= self.start {
            0
        } else if value >= self.end {
            self.size()
        } else {
            (value - self.start) as usize
        }
    }

    pub fn are_intersecting(&self, other: &Interval) -> bool {
        !self.is_empty() && !other.is_empty() && self.start < other.end && other.start < self.end
    }

    /// True when the two intervals overlap or touch, so that their union is
    /// itself an interval.
    pub fn is_adjacent_or_overlapping(&self, other: &Interval) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    pub fn intersect(&self, other: &Interval) -> Interval {
        Interval::of_bounds(self.start.max(other.start), self.end.min(other.end))
    }

    /// `self ⊆ other`
    pub fn is_subset(&self, other: &Interval) -> bool {
        self.is_empty() || (self.start >= other.start && self.end <= other.end)
    }

    pub fn iter(&self) -> Range<u32> {
        self.start..self.end
    }
}

impl IntoIterator for Interval {
    type Item = u32;
    type IntoIter = Range<u32>;

    fn into_iter(self) -> Self::IntoIter {
        self.start..self.end
    }
}
