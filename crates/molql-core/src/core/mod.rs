//! # Core Module
//!
//! Stateless data model of the library: the index containers everything is
//! built on, the structure model the queries read, and the element algebra
//! their results are expressed in.
//!
//! - **Index Sets** ([`sets`]) - intervals, sorted arrays, ranges and segmentations
//! - **Structures** ([`structure`]) - models, units, structures, bonds and spatial lookup
//! - **Elements** ([`element`]) - locations, loci and persisted queries
//! - **Utilities** ([`utils`]) - geometry, hashing and element radii

pub mod element;
pub mod sets;
pub mod structure;
pub mod utils;
