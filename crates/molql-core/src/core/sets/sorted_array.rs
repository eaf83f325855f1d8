use crate::core::utils::hash::hash3;
use serde::{Deserialize, Serialize};
use std::ops::Deref;
use std::sync::Arc;

/// An immutable, shared, strictly ascending array of indices.
///
/// Cloning is a reference-count bump, which is what lets units, loci and
/// queries hand the same element arrays around without copying. Identity
/// (`ptr_eq`) is meaningful: two units whose arrays are the same allocation are
/// known to hold identical elements without comparing them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<u32>")]
pub struct SortedArray(Arc<[u32]>);

impl Default for SortedArray {
    fn default() -> Self {
        Self::empty()
    }
}

impl SortedArray {
    pub fn empty() -> Self {
        Self(Arc::from(Vec::new()))
    }

    /// Wraps a vector that is already strictly ascending.
    pub fn of_sorted(values: Vec<u32>) -> Self {
        debug_assert!(
            values.windows(2).all(|w| w[0] < w[1]),
            "SortedArray::of_sorted requires strictly ascending input"
        );
        Self(Arc::from(values))
    }

    pub fn of_unsorted(mut values: Vec<u32>) -> Self {
        values.sort_unstable();
        values.dedup();
        Self(Arc::from(values))
    }

    pub fn of_range(min: u32, max: u32) -> Self {
        if max < min {
            return Self::empty();
        }
        Self(Arc::from((min..=max).collect::<Vec<_>>()))
    }

    #[inline]
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    pub fn min(&self) -> Option<u32> {
        self.0.first().copied()
    }

    pub fn max(&self) -> Option<u32> {
        self.0.last().copied()
    }

    #[inline]
    pub fn has(&self, value: u32) -> bool {
        self.0.binary_search(&value).is_ok()
    }

    #[inline]
    pub fn index_of(&self, value: u32) -> Option<usize> {
        self.0.binary_search(&value).ok()
    }

    /// Number of members strictly smaller than `value`.
    #[inline]
    pub fn find_predecessor_index(&self, value: u32) -> usize {
        self.0.partition_point(|&x| x < value)
    }

    /// True when both arrays are the same allocation.
    pub fn ptr_eq(&self, other: &SortedArray) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// True when the members form one gap-free run.
    pub fn is_contiguous(&self) -> bool {
        match (self.min(), self.max()) {
            (Some(min), Some(max)) => (max - min) as usize + 1 == self.0.len(),
            _ => false,
        }
    }

    /// Positions of every member of `subset` within `self`. Members absent from
    /// `self` are skipped.
    pub fn indices_of(&self, subset: &[u32]) -> Vec<u32> {
        let mut result = Vec::with_capacity(subset.len());
        let mut from = 0usize;
        for &value in subset {
            let offset = self.0[from..].partition_point(|&x| x < value);
            let position = from + offset;
            if position < self.0.len() && self.0[position] == value {
                result.push(position as u32);
                from = position + 1;
            } else {
                from = position;
            }
        }
        result
    }

    pub fn hash_code(&self) -> i32 {
        match (self.min(), self.max()) {
            (Some(min), Some(max)) => hash3(self.0.len() as i32, min as i32, max as i32),
            _ => 0,
        }
    }
}

impl Deref for SortedArray {
    type Target = [u32];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<u32>> for SortedArray {
    fn from(values: Vec<u32>) -> Self {
        Self::of_unsorted(values)
    }
}
