use crate::core::element::loci::Loci;
use crate::core::element::query::Query;
use crate::core::structure::Structure;
use crate::engine::compiler::Compiler;
use crate::engine::config::QueryConfig;
use crate::engine::context::QueryContext;
use crate::engine::error::EngineError;
use crate::engine::expression::Expression;
use crate::engine::parser::parse_with_max_depth;
use crate::engine::script::to_script_expression_with_cutoff;
use crate::engine::selection::StructureSelection;
use crate::engine::symbols::SymbolTable;
use std::sync::Arc;
use tracing::{info, instrument};

#[derive(Debug, Clone)]
pub struct SelectionResult {
    pub selection: StructureSelection,
    pub loci: Loci,
    /// Replayable encoding of `loci`, stamped with the structure hash.
    pub query: Query,
    /// Canonical query selecting exactly `loci`.
    pub script: Expression,
}

/// Parses, compiles and runs `source` against `structure`.
#[instrument(skip_all, name = "select_workflow")]
pub fn run(
    structure: &Arc<Structure>,
    source: &str,
    config: &QueryConfig,
) -> Result<SelectionResult, EngineError> {
    let expression = parse_with_max_depth(source, config.max_nesting_depth)?;
    run_expression(structure, &expression, config, None)
}

/// Runs an already built expression. `previous` is what
/// `current-selection` evaluates to.
#[instrument(skip_all, name = "select_expression")]
pub fn run_expression(
    structure: &Arc<Structure>,
    expression: &Expression,
    config: &QueryConfig,
    previous: Option<StructureSelection>,
) -> Result<SelectionResult, EngineError> {
    let compiled = Compiler::new(SymbolTable::standard())
        .with_max_depth(config.max_nesting_depth)
        .compile(expression)?;

    let mut ctx = QueryContext::new(structure.clone(), config.clone());
    if let Some(previous) = previous {
        ctx = ctx.with_current_selection(previous);
    }
    let selection = compiled.run(&mut ctx)?;

    let loci = selection.to_loci();
    let query = Query::from_loci_with_cutoff(&loci, config.query_range_cutoff);
    let script = to_script_expression_with_cutoff(&loci, config.script_range_cutoff);
    info!(
        structures = selection.len(),
        elements = loci.size(),
        "Selection complete."
    );
    Ok(SelectionResult {
        selection,
        loci,
        query,
        script,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::structure::testing::create_standard_test_structure;
    use crate::engine::error::{CompileError, ParseError};

    #[test]
    fn selection_loci_query_and_script_agree() {
        let structure = create_standard_test_structure();
        let result = run(
            &structure,
            "(atom-groups :residue-test (= label_comp_id SER))",
            &QueryConfig::default(),
        )
        .unwrap();
        assert_eq!(result.loci.size(), 6);
        assert!(Loci::are_equal(&result.query.to_loci(&structure).unwrap(), &result.loci));

        let again = run(&structure, &result.script.to_string(), &QueryConfig::default()).unwrap();
        assert!(Loci::are_equal(&again.loci, &result.loci));
    }

    #[test]
    fn previous_selection_feeds_current_selection() {
        let structure = create_standard_test_structure();
        let config = QueryConfig::default();
        let first = run(&structure, "(atom-groups :atom-test (= label_atom_id SE))", &config).unwrap();
        let expression = parse_with_max_depth("(whole-residues :0 (current-selection))", 16).unwrap();
        let grown = run_expression(&structure, &expression, &config, Some(first.selection)).unwrap();
        assert_eq!(grown.loci.size(), 5);
    }

    #[test]
    fn configured_depth_limits_both_stages() {
        let structure = create_standard_test_structure();
        let config = QueryConfig::builder().max_nesting_depth(2).build().unwrap();
        assert!(run(&structure, "(all)", &config).is_ok());
        let err = run(&structure, "(not (not (not true)))", &config).unwrap_err();
        assert!(matches!(err, EngineError::Parse(ParseError::NestingTooDeep { .. })));

        let deep = parse_with_max_depth("(not (not (not true)))", 16).unwrap();
        let err = run_expression(&structure, &deep, &config, None).unwrap_err();
        assert!(matches!(err, EngineError::Compile(CompileError::NestingTooDeep { .. })));
    }

    #[test]
    fn failures_surface_by_stage() {
        let structure = create_standard_test_structure();
        let config = QueryConfig::default();
        assert!(matches!(run(&structure, "(all", &config), Err(EngineError::Parse(_))));
        assert!(matches!(run(&structure, "(no.such.symbol)", &config), Err(EngineError::Compile(_))));
        assert!(matches!(
            run(&structure, "(atom-groups :atom-test 1)", &config),
            Err(EngineError::Query(_))
        ));
    }
}
