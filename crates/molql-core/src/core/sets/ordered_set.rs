use super::interval::Interval;
use super::sorted_array::SortedArray;
use std::ops::Range;

/// An ascending set of unique indices, stored either as an [`Interval`] or as a
/// [`SortedArray`].
///
/// The representation is normalized on construction: an empty or gap-free set
/// is always an `Interval`, so a `Sorted` value always has at least one gap.
/// Because of that, the derived equality is exactly set equality.
///
/// Every binary operation dispatches on the pair of concrete kinds so that the
/// interval cases never materialize their members.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OrderedSet {
    Interval(Interval),
    Sorted(SortedArray),
}

impl Default for OrderedSet {
    fn default() -> Self {
        Self::empty()
    }
}

impl OrderedSet {
    pub fn empty() -> Self {
        OrderedSet::Interval(Interval::EMPTY)
    }

    pub fn of_bounds(start: u32, end: u32) -> Self {
        OrderedSet::Interval(Interval::of_bounds(start, end))
    }

    pub fn of_range(min: u32, max: u32) -> Self {
        OrderedSet::Interval(Interval::of_range(min, max))
    }

    pub fn of_single(value: u32) -> Self {
        OrderedSet::Interval(Interval::of_single(value))
    }

    /// Builds a set from strictly ascending values, collapsing gap-free input
    /// to an interval.
    pub fn of_sorted(values: Vec<u32>) -> Self {
        match (values.first(), values.last()) {
            (None, _) | (_, None) => Self::empty(),
            (Some(&min), Some(&max)) if (max - min) as usize + 1 == values.len() => {
                Self::of_range(min, max)
            }
            _ => OrderedSet::Sorted(SortedArray::of_sorted(values)),
        }
    }

    pub fn of_unsorted(mut values: Vec<u32>) -> Self {
        values.sort_unstable();
        values.dedup();
        Self::of_sorted(values)
    }

    pub fn of_sorted_array(array: SortedArray) -> Self {
        if array.is_empty() {
            Self::empty()
        } else if array.is_contiguous() {
            let (min, max) = (array[0], array[array.len() - 1]);
            Self::of_range(min, max)
        } else {
            OrderedSet::Sorted(array)
        }
    }

    pub fn is_interval(&self) -> bool {
        matches!(self, OrderedSet::Interval(_))
    }

    pub fn size(&self) -> usize {
        match self {
            OrderedSet::Interval(i) => i.size(),
            OrderedSet::Sorted(a) => a.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn min(&self) -> Option<u32> {
        match self {
            OrderedSet::Interval(i) => i.min(),
            OrderedSet::Sorted(a) => a.min(),
        }
    }

    pub fn max(&self) -> Option<u32> {
        match self {
            OrderedSet::Interval(i) => i.max(),
            OrderedSet::Sorted(a) => a.max(),
        }
    }

    pub fn has(&self, value: u32) -> bool {
        match self {
            OrderedSet::Interval(i) => i.has(value),
            OrderedSet::Sorted(a) => a.has(value),
        }
    }

    pub fn index_of(&self, value: u32) -> Option<usize> {
        match self {
            OrderedSet::Interval(i) => i.index_of(value),
            OrderedSet::Sorted(a) => a.index_of(value),
        }
    }

    pub fn get_at(&self, index: usize) -> u32 {
        match self {
            OrderedSet::Interval(i) => i.get_at(index),
            OrderedSet::Sorted(a) => a[index],
        }
    }

    pub fn find_predecessor_index(&self, value: u32) -> usize {
        match self {
            OrderedSet::Interval(i) => i.find_predecessor_index(value),
            OrderedSet::Sorted(a) => a.find_predecessor_index(value),
        }
    }

    pub fn iter(&self) -> OrderedSetIter<'_> {
        match self {
            OrderedSet::Interval(i) => OrderedSetIter::Interval(i.iter()),
            OrderedSet::Sorted(a) => OrderedSetIter::Sorted(a.iter()),
        }
    }

    pub fn to_vec(&self) -> Vec<u32> {
        self.iter().collect()
    }

    pub fn union(&self, other: &OrderedSet) -> OrderedSet {
        use OrderedSet as S;
        if self.is_empty() {
            return other.clone();
        }
        if other.is_empty() {
            return self.clone();
        }
        match (self, other) {
            (S::Interval(a), S::Interval(b)) => {
                if a.is_adjacent_or_overlapping(b) {
                    Self::of_bounds(a.start().min(b.start()), a.end().max(b.end()))
                } else {
                    let (lo, hi) = if a.start() < b.start() { (a, b) } else { (b, a) };
                    OrderedSet::Sorted(SortedArray::of_sorted(lo.iter().chain(hi.iter()).collect()))
                }
            }
            (S::Interval(i), S::Sorted(s)) | (S::Sorted(s), S::Interval(i)) => union_interval_array(i, s),
            (S::Sorted(a), S::Sorted(b)) => {
                if a.ptr_eq(b) {
                    return self.clone();
                }
                Self::of_sorted(merge_union(a, b))
            }
        }
    }

    pub fn intersect(&self, other: &OrderedSet) -> OrderedSet {
        use OrderedSet as S;
        if self.is_empty() || other.is_empty() {
            return Self::empty();
        }
        match (self, other) {
            (S::Interval(a), S::Interval(b)) => OrderedSet::Interval(a.intersect(b)),
            (S::Interval(i), S::Sorted(s)) | (S::Sorted(s), S::Interval(i)) => {
                let range = sorted_range_within(s, i);
                Self::of_sorted(s[range].to_vec())
            }
            (S::Sorted(a), S::Sorted(b)) => {
                if a.ptr_eq(b) {
                    return self.clone();
                }
                Self::of_sorted(merge_intersect(a, b))
            }
        }
    }

    /// Members of `self` that are not members of `other`.
    pub fn subtract(&self, other: &OrderedSet) -> OrderedSet {
        use OrderedSet as S;
        if self.is_empty() || other.is_empty() || !self.are_intersecting(other) {
            return self.clone();
        }
        match (self, other) {
            (S::Interval(a), S::Interval(b)) => {
                let left = Interval::of_bounds(a.start(), b.start().min(a.end()));
                let right = Interval::of_bounds(b.end().max(a.start()), a.end());
                match (left.is_empty(), right.is_empty()) {
                    (true, true) => Self::empty(),
                    (false, true) => OrderedSet::Interval(left),
                    (true, false) => OrderedSet::Interval(right),
                    (false, false) => OrderedSet::Sorted(SortedArray::of_sorted(
                        left.iter().chain(right.iter()).collect(),
                    )),
                }
            }
            (S::Interval(a), S::Sorted(b)) => {
                let range = sorted_range_within(b, a);
                let holes = &b[range];
                let mut result = Vec::with_capacity(a.size() - holes.len());
                let mut k = 0usize;
                for value in a.iter() {
                    if k < holes.len() && holes[k] == value {
                        k += 1;
                    } else {
                        result.push(value);
                    }
                }
                Self::of_sorted(result)
            }
            (S::Sorted(a), S::Interval(b)) => {
                let range = sorted_range_within(a, b);
                let mut result = Vec::with_capacity(a.len() - range.len());
                result.extend_from_slice(&a[..range.start]);
                result.extend_from_slice(&a[range.end..]);
                Self::of_sorted(result)
            }
            (S::Sorted(a), S::Sorted(b)) => Self::of_sorted(merge_subtract(a, b)),
        }
    }

    pub fn are_intersecting(&self, other: &OrderedSet) -> bool {
        use OrderedSet as S;
        if self.is_empty() || other.is_empty() {
            return false;
        }
        match (self, other) {
            (S::Interval(a), S::Interval(b)) => a.are_intersecting(b),
            (S::Interval(i), S::Sorted(s)) | (S::Sorted(s), S::Interval(i)) => {
                !sorted_range_within(s, i).is_empty()
            }
            (S::Sorted(a), S::Sorted(b)) => {
                if a.ptr_eq(b) {
                    return true;
                }
                if a[a.len() - 1] < b[0] || b[b.len() - 1] < a[0] {
                    return false;
                }
                let (mut i, mut j) = (0usize, 0usize);
                while i < a.len() && j < b.len() {
                    match a[i].cmp(&b[j]) {
                        std::cmp::Ordering::Less => i += 1,
                        std::cmp::Ordering::Greater => j += 1,
                        std::cmp::Ordering::Equal => return true,
                    }
                }
                false
            }
        }
    }

    /// `self ⊆ other`
    pub fn is_subset(&self, other: &OrderedSet) -> bool {
        use OrderedSet as S;
        if self.is_empty() {
            return true;
        }
        if self.size() > other.size() {
            return false;
        }
        match (self, other) {
            (S::Interval(a), S::Interval(b)) => a.is_subset(b),
            (S::Interval(a), S::Sorted(b)) => sorted_range_within(b, a).len() == a.size(),
            (S::Sorted(a), S::Interval(b)) => b.has(a[0]) && b.has(a[a.len() - 1]),
            (S::Sorted(a), S::Sorted(b)) => {
                let mut from = 0usize;
                for &value in a.iter() {
                    let offset = b[from..].partition_point(|&x| x < value);
                    let position = from + offset;
                    if position >= b.len() || b[position] != value {
                        return false;
                    }
                    from = position + 1;
                }
                true
            }
        }
    }

    pub fn are_equal(&self, other: &OrderedSet) -> bool {
        self == other
    }
}

/// Positions of the members of `array` that fall inside `interval`.
fn sorted_range_within(array: &SortedArray, interval: &Interval) -> Range<usize> {
    let start = array.find_predecessor_index(interval.start());
    let end = array.find_predecessor_index(interval.end());
    start..end
}

fn union_interval_array(interval: &Interval, array: &SortedArray) -> OrderedSet {
    let range = sorted_range_within(array, interval);
    if range.len() == array.len() {
        return OrderedSet::Interval(*interval);
    }
    let mut result = Vec::with_capacity(interval.size() + array.len() - range.len());
    result.extend_from_slice(&array[..range.start]);
    result.extend(interval.iter());
    result.extend_from_slice(&array[range.end..]);
    OrderedSet::of_sorted(result)
}

fn merge_union(a: &[u32], b: &[u32]) -> Vec<u32> {
    let mut result = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0usize, 0usize);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => {
                result.push(a[i]);
                i += 1;
            }
            std::cmp::Ordering::Greater => {
                result.push(b[j]);
                j += 1;
            }
            std::cmp::Ordering::Equal => {
                result.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    result.extend_from_slice(&a[i..]);
    result.extend_from_slice(&b[j..]);
    result
}

fn merge_intersect(a: &[u32], b: &[u32]) -> Vec<u32> {
    let mut result = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0usize, 0usize);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                result.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    result
}

fn merge_subtract(a: &[u32], b: &[u32]) -> Vec<u32> {
    let mut result = Vec::with_capacity(a.len());
    let mut j = 0usize;
    for &value in a {
        while j < b.len() && b[j] < value {
            j += 1;
        }
        if j < b.len() && b[j] == value {
            continue;
        }
        result.push(value);
    }
    result
}

pub enum OrderedSetIter<'a> {
    Interval(Range<u32>),
    Sorted(std::slice::Iter<'a, u32>),
}

impl Iterator for OrderedSetIter<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        match self {
            OrderedSetIter::Interval(range) => range.next(),
            OrderedSetIter::Sorted(iter) => iter.next().copied(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            OrderedSetIter::Interval(range) => range.size_hint(),
            OrderedSetIter::Sorted(iter) => iter.size_hint(),
        }
    }
}

impl ExactSizeIterator for OrderedSetIter<'_> {}

impl From<Interval> for OrderedSet {
    fn from(interval: Interval) -> Self {
        OrderedSet::Interval(interval)
    }
}

impl From<SortedArray> for OrderedSet {
    fn from(array: SortedArray) -> Self {
        OrderedSet::of_sorted_array(array)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(values: &[u32]) -> OrderedSet {
        OrderedSet::of_sorted(values.to_vec())
    }

    mod normalization {
        use super::*;

        #[test]
        fn contiguous_arrays_become_intervals() {
            assert_eq!(sorted(&[3, 4, 5]), OrderedSet::of_range(3, 5));
            assert!(sorted(&[3, 4, 5]).is_interval());
            assert!(!sorted(&[3, 5]).is_interval());
        }

        #[test]
        fn empty_inputs_are_the_empty_interval() {
            assert_eq!(sorted(&[]), OrderedSet::empty());
            assert_eq!(OrderedSet::of_unsorted(vec![]), OrderedSet::empty());
            assert!(OrderedSet::of_sorted_array(SortedArray::empty()).is_empty());
        }

        #[test]
        fn of_unsorted_sorts_and_deduplicates() {
            assert_eq!(OrderedSet::of_unsorted(vec![9, 1, 9, 4]), sorted(&[1, 4, 9]));
        }
    }

    mod union {
        use super::*;

        #[test]
        fn overlapping_intervals_stay_an_interval() {
            let result = OrderedSet::of_bounds(0, 5).union(&OrderedSet::of_bounds(3, 8));
            assert_eq!(result, OrderedSet::of_bounds(0, 8));
            assert!(result.is_interval());
        }

        #[test]
        fn adjacent_intervals_merge() {
            let result = OrderedSet::of_range(0, 4).union(&OrderedSet::of_range(5, 9));
            assert_eq!(result, OrderedSet::of_range(0, 9));
        }

        #[test]
        fn disjoint_intervals_degrade_to_array() {
            let result = OrderedSet::of_range(7, 8).union(&OrderedSet::of_range(0, 1));
            assert_eq!(result.to_vec(), vec![0, 1, 7, 8]);
            assert!(!result.is_interval());
        }

        #[test]
        fn array_inside_interval_keeps_interval() {
            let result = OrderedSet::of_range(0, 10).union(&sorted(&[2, 5, 9]));
            assert_eq!(result, OrderedSet::of_range(0, 10));
        }

        #[test]
        fn interval_and_array_that_fill_gaps_collapse() {
            let result = sorted(&[0, 1, 5, 6]).union(&OrderedSet::of_range(2, 4));
            assert_eq!(result, OrderedSet::of_range(0, 6));
        }

        #[test]
        fn arrays_merge_without_duplicates() {
            let result = sorted(&[1, 3, 5]).union(&sorted(&[3, 7, 9]));
            assert_eq!(result.to_vec(), vec![1, 3, 5, 7, 9]);
        }

        #[test]
        fn empty_operand_is_identity() {
            let a = sorted(&[1, 3]);
            assert_eq!(a.union(&OrderedSet::empty()), a);
            assert_eq!(OrderedSet::empty().union(&a), a);
        }
    }

    mod intersect_and_subtract {
        use super::*;

        #[test]
        fn interval_intersections() {
            let a = OrderedSet::of_range(0, 9);
            assert_eq!(a.intersect(&OrderedSet::of_range(5, 20)), OrderedSet::of_range(5, 9));
            assert_eq!(a.intersect(&sorted(&[1, 4, 12])), sorted(&[1, 4]));
            assert_eq!(sorted(&[1, 4, 6, 8]).intersect(&sorted(&[4, 5, 6])), sorted(&[4, 6]));
        }

        #[test]
        fn subtract_interval_from_interval_splits() {
            let result = OrderedSet::of_range(0, 9).subtract(&OrderedSet::of_range(3, 5));
            assert_eq!(result.to_vec(), vec![0, 1, 2, 6, 7, 8, 9]);
            let trimmed = OrderedSet::of_range(0, 9).subtract(&OrderedSet::of_range(5, 20));
            assert_eq!(trimmed, OrderedSet::of_range(0, 4));
            let gone = OrderedSet::of_range(3, 4).subtract(&OrderedSet::of_range(0, 9));
            assert!(gone.is_empty());
        }

        #[test]
        fn subtract_mixed_kinds() {
            assert_eq!(OrderedSet::of_range(0, 5).subtract(&sorted(&[0, 5])), OrderedSet::of_range(1, 4));
            assert_eq!(sorted(&[1, 3, 5, 7]).subtract(&OrderedSet::of_range(2, 5)), sorted(&[1, 7]));
            assert_eq!(sorted(&[1, 3, 5, 7]).subtract(&sorted(&[3, 7, 8])), sorted(&[1, 5]));
        }

        #[test]
        fn subtract_disjoint_returns_self() {
            let a = sorted(&[1, 3]);
            assert_eq!(a.subtract(&OrderedSet::of_range(10, 20)), a);
        }
    }

    mod predicates {
        use super::*;

        #[test]
        fn intersection_tests() {
            assert!(OrderedSet::of_range(0, 4).are_intersecting(&sorted(&[4, 8])));
            assert!(!OrderedSet::of_range(0, 3).are_intersecting(&sorted(&[4, 8])));
            assert!(sorted(&[1, 5, 9]).are_intersecting(&sorted(&[2, 9])));
            assert!(!sorted(&[1, 5, 9]).are_intersecting(&sorted(&[2, 6])));
            assert!(!OrderedSet::empty().are_intersecting(&OrderedSet::empty()));
        }

        #[test]
        fn subset_tests() {
            assert!(sorted(&[1, 3]).is_subset(&OrderedSet::of_range(0, 4)));
            assert!(OrderedSet::of_range(2, 3).is_subset(&sorted(&[1, 2, 3, 7])));
            assert!(!OrderedSet::of_range(2, 4).is_subset(&sorted(&[1, 2, 3, 7])));
            assert!(sorted(&[2, 7]).is_subset(&sorted(&[1, 2, 3, 7])));
            assert!(!sorted(&[2, 8]).is_subset(&sorted(&[1, 2, 3, 7])));
            assert!(OrderedSet::empty().is_subset(&sorted(&[1, 9])));
        }

        #[test]
        fn positional_access_matches_iteration() {
            let set = sorted(&[2, 4, 8]);
            assert_eq!(set.get_at(1), 4);
            assert_eq!(set.index_of(8), Some(2));
            assert_eq!(set.index_of(3), None);
            assert_eq!(set.iter().len(), 3);
            assert_eq!(set.min(), Some(2));
            assert_eq!(set.max(), Some(8));
        }
    }
}
