//! # Structure Model
//!
//! Read surface of molecular structures as consumed by the query engine.
//!
//! - [`model`] - one model: atomic and coarse hierarchies, bonds, property tables
//! - [`unit`] - homogeneous chunks of a structure placed by one operator
//! - [`structure`] - immutable unit collections, derivation, identity hashing
//! - [`bonds`] - bond orders, link flags and the per-model bond graph
//! - [`properties`] - modified/missing residue and component classification tables
//! - [`lookup`] - spatial search over element positions

pub mod bonds;
pub mod ids;
pub mod lookup;
pub mod model;
pub mod properties;
pub mod structure;
pub mod unit;

#[cfg(test)]
pub(crate) mod testing;

pub use bonds::{BondOrder, LinkFlags};
pub use ids::{ElementIndex, UnitId, UnitIndex};
pub use model::{Model, ModelBuilder};
pub use structure::{Structure, StructureSubsetBuilder};
pub use unit::{SymmetryOperator, Unit, UnitKind};

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PropertyError {
    #[error("Property '{property}' requires {expected} units, found a {found} unit")]
    WrongUnitKind {
        property: &'static str,
        expected: UnitKind,
        found: UnitKind,
    },
    #[error("Element {element} is out of range for a unit of {count} elements")]
    ElementOutOfRange { element: ElementIndex, count: usize },
}
