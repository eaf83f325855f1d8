//! Selection combinators.

use super::names;
use super::{Args, Params, Symbol};
use crate::core::structure::Structure;
use crate::engine::compiler::Evaluator;
use crate::engine::context::QueryContext;
use crate::engine::error::QueryError;
use crate::engine::selection::{StructureSelection, UniqueSelectionBuilder};
use crate::engine::value::Value;

const AT_LEAST_ONE: Params = Params::Variadic { min: 1, max: None };

pub(super) fn symbols() -> Vec<Symbol> {
    vec![
        Symbol::dynamic(names::COMBINATOR_MERGE, AT_LEAST_ONE, merge),
        Symbol::dynamic(names::COMBINATOR_INTERSECT, AT_LEAST_ONE, intersect),
    ]
}

fn selections(
    ctx: &mut QueryContext,
    args: &Args<Box<dyn Evaluator>>,
) -> Result<Vec<StructureSelection>, QueryError> {
    (0..args.len()).map(|i| args.selection(i, ctx)).collect()
}

/// Singleton inputs merge into singletons; anything else becomes a
/// deduplicated sequence of every member in argument order.
fn merge(ctx: &mut QueryContext, args: &Args<Box<dyn Evaluator>>) -> Result<Value, QueryError> {
    let inputs = selections(ctx, args)?;
    let source = ctx.input().clone();
    let all_singletons = inputs
        .iter()
        .all(|s| matches!(s, StructureSelection::Singletons { .. }));
    if all_singletons {
        let parts: Vec<_> = inputs.iter().map(|s| s.union_structure()).collect();
        return Ok(StructureSelection::singletons(&source, Structure::union(&source, &parts)).into());
    }
    let mut builder = UniqueSelectionBuilder::new(&source);
    for input in &inputs {
        for structure in input.structures() {
            builder.add(structure);
        }
    }
    Ok(builder.build().into())
}

/// Elements present in every input, as singletons.
fn intersect(ctx: &mut QueryContext, args: &Args<Box<dyn Evaluator>>) -> Result<Value, QueryError> {
    let inputs = selections(ctx, args)?;
    let source = ctx.input().clone();
    let mut iter = inputs.iter();
    let Some(first) = iter.next() else {
        return Ok(StructureSelection::empty(&source).into());
    };
    let mut result = first.union_structure();
    for input in iter {
        if result.is_empty() {
            break;
        }
        result = Structure::intersect(&result, &input.union_structure());
    }
    Ok(StructureSelection::singletons(&source, result).into())
}
