//! # Structure Elements
//!
//! Addressing and set algebra over the elements of a structure.
//!
//! - [`location`] - a cursor onto one element and its property accessors
//! - [`loci`] - immutable element selections, their algebra and boundaries
//! - [`query`] - structure-independent, replayable encoding of a loci

pub mod location;
pub mod loci;
pub mod query;

pub use location::Location;
pub use loci::{Boundary, Loci, LociElement};
pub use query::{Query, QueryElement, ReplayError};
