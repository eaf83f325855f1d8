//! # Workflows Module
//!
//! Entry points that tie the engine and the core model together.
//!
//! - **Selection** ([`select`]) - run query text against a structure and derive
//!   its loci, a persistable query and the canonical script
//! - **Replay** ([`replay`]) - re-apply a persisted query to a structure

pub mod replay;
pub mod select;
