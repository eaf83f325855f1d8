//! Helpers for running query text in symbol tests.

use crate::core::structure::testing::create_standard_test_structure;
use crate::core::structure::Structure;
use crate::engine::compiler::compile;
use crate::engine::config::QueryConfig;
use crate::engine::context::QueryContext;
use crate::engine::error::QueryError;
use crate::engine::parser::parse;
use crate::engine::selection::StructureSelection;
use crate::engine::value::Value;
use std::sync::Arc;

pub fn try_run_on(structure: &Arc<Structure>, source: &str) -> Result<Value, QueryError> {
    let query = compile(&parse(source).unwrap()).unwrap();
    let mut ctx = QueryContext::new(structure.clone(), QueryConfig::default());
    query.evaluate(&mut ctx)
}

pub fn try_run(source: &str) -> Result<Value, QueryError> {
    try_run_on(&create_standard_test_structure(), source)
}

pub fn run_on(structure: &Arc<Structure>, source: &str) -> StructureSelection {
    try_run_on(structure, source)
        .unwrap()
        .into_selection("test")
        .unwrap()
}

pub fn run(source: &str) -> StructureSelection {
    run_on(&create_standard_test_structure(), source)
}

/// Selected model elements as `(unit id, element)` pairs.
pub fn selected(selection: &StructureSelection) -> Vec<(u32, u32)> {
    let structure = selection.union_structure();
    structure
        .units()
        .iter()
        .flat_map(|u| u.elements().iter().map(move |&e| (u.id(), e)))
        .collect()
}

/// Model elements of unit `unit` in `selection`.
pub fn elements_of(selection: &StructureSelection, unit: u32) -> Vec<u32> {
    selected(selection)
        .into_iter()
        .filter(|(u, _)| *u == unit)
        .map(|(_, e)| e)
        .collect()
}

/// Element counts of every structure in a sequence.
pub fn group_sizes(selection: &StructureSelection) -> Vec<usize> {
    selection
        .structures()
        .iter()
        .map(|s| s.element_count())
        .collect()
}
