//! Aggregates over the structure under test.

use super::names;
use super::support::property_keys;
use super::{required, Args, Param, Params, Symbol};
use crate::engine::compiler::Evaluator;
use crate::engine::context::QueryContext;
use crate::engine::error::QueryError;
use crate::engine::value::Value;

const NONE: Params = Params::Fixed(&[]);
const COUNT_QUERY: &[Param] = &[required("0")];
const PROPERTY_SET: &[Param] = &[required("0")];

pub(super) fn symbols() -> Vec<Symbol> {
    vec![
        Symbol::dynamic(names::ATOM_SET_ATOM_COUNT, NONE, atom_count),
        Symbol::dynamic(names::ATOM_SET_COUNT_QUERY, Params::Fixed(COUNT_QUERY), count_query),
        Symbol::dynamic(names::ATOM_SET_PROPERTY_SET, Params::Fixed(PROPERTY_SET), property_set),
    ]
}

fn atom_count(ctx: &mut QueryContext, _args: &Args<Box<dyn Evaluator>>) -> Result<Value, QueryError> {
    let structure = ctx.current_structure(names::ATOM_SET_ATOM_COUNT)?;
    Ok(Value::Number(structure.element_count() as f64))
}

/// Runs a query against the current structure and counts its members.
fn count_query(ctx: &mut QueryContext, args: &Args<Box<dyn Evaluator>>) -> Result<Value, QueryError> {
    let structure = ctx.current_structure(names::ATOM_SET_COUNT_QUERY)?.clone();
    let saved = ctx.replace_input(structure);
    let result = args.selection(0, ctx);
    ctx.replace_input(saved);
    Ok(Value::Number(result?.len() as f64))
}

/// Distinct values of a property over the current structure.
fn property_set(ctx: &mut QueryContext, args: &Args<Box<dyn Evaluator>>) -> Result<Value, QueryError> {
    let structure = ctx.current_structure(names::ATOM_SET_PROPERTY_SET)?.clone();
    let keys = property_keys(ctx, &**args.required(0)?, args.symbol(), &structure)?;
    Ok(Value::Set(keys))
}
