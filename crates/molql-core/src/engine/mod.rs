//! # Engine Module
//!
//! The query language: expressions are parsed or built in code, compiled
//! against the symbol registry into an evaluator tree, and run against a
//! structure to produce a [`selection::StructureSelection`].
//!
//! - **Expressions** ([`expression`], [`lexer`], [`parser`]) - the tree and its text syntax
//! - **Compilation** ([`compiler`], [`symbols`]) - symbol resolution, argument binding, constant folding
//! - **Evaluation** ([`context`], [`value`], [`selection`]) - runtime state and results
//! - **Scripts** ([`script`]) - loci back to query expressions
//! - **Configuration** ([`config`]) and **Errors** ([`error`])

pub mod compiler;
pub mod config;
pub mod context;
pub mod error;
pub mod expression;
pub mod lexer;
pub mod parser;
pub mod script;
pub mod selection;
pub mod symbols;
pub mod value;
