//! # Ordered-Set Primitives
//!
//! Index containers shared by every layer above: [`Interval`] and
//! [`SortedArray`] as the two concrete [`OrderedSet`] representations,
//! [`SortedRanges`] for multi-run patterns, and [`Segmentation`] for the
//! atom-to-residue and atom-to-chain partitions of a model.

pub mod interval;
pub mod ordered_set;
pub mod segmentation;
pub mod sorted_array;
pub mod sorted_ranges;

pub use interval::Interval;
pub use ordered_set::OrderedSet;
pub use segmentation::{Segment, Segmentation};
pub use sorted_array::SortedArray;
pub use sorted_ranges::SortedRanges;
