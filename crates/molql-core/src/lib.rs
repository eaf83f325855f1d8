//! # MolQL Core Library
//!
//! A structural query language and selection algebra for macromolecular
//! structures: expressions select atoms and coarse elements, selections
//! become loci, and loci can be persisted and replayed or printed back as
//! query text.
//!
//! ## Architecture
//!
//! - **[`core`]: The Foundation.** Index sets, the read-only structure model
//!   (models, units, structures, bonds, spatial lookup) and the loci algebra.
//!
//! - **[`engine`]: The Query Language.** Expression trees and their text
//!   syntax, the symbol registry, the compiler and the runtime context.
//!
//! - **[`workflows`]: The Public API.** Complete select and replay procedures
//!   for callers that just want answers.

pub mod core;
pub mod engine;
pub mod workflows;
