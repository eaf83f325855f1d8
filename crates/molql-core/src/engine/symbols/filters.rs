//! Selection filters.
//!
//! Filters keep or drop whole members of a selection. Singletons are tested
//! one element at a time.

use super::names;
use super::support::{filter_selection, property_keys};
use super::{optional, required, Args, Param, Params, Symbol};
use crate::core::element::location::Location;
use crate::core::structure::{Structure, StructureSubsetBuilder};
use crate::engine::compiler::Evaluator;
use crate::engine::context::{LinkLocation, QueryContext};
use crate::engine::error::QueryError;
use crate::engine::selection::StructureSelection;
use crate::engine::value::Value;
use std::sync::Arc;

const PICK: &[Param] = &[required("0"), required("test")];
const FIRST: &[Param] = &[required("0")];
const WITHIN: &[Param] = &[
    required("0"),
    required("target"),
    optional("min-radius"),
    required("max-radius"),
    optional("invert"),
];
const INTERSECTED_BY: &[Param] = &[required("0"), required("by")];
const IS_CONNECTED_TO: &[Param] = &[
    required("0"),
    required("target"),
    optional("bond-test"),
    optional("disjunct"),
    optional("invert"),
];
const WITH_SAME_ATOM_PROPERTIES: &[Param] = &[required("0"), required("source"), required("property")];

pub(super) fn symbols() -> Vec<Symbol> {
    vec![
        Symbol::dynamic(names::FILTER_PICK, Params::Fixed(PICK), pick),
        Symbol::dynamic(names::FILTER_FIRST, Params::Fixed(FIRST), first),
        Symbol::dynamic(names::FILTER_WITHIN, Params::Fixed(WITHIN), within),
        Symbol::dynamic(
            names::FILTER_INTERSECTED_BY,
            Params::Fixed(INTERSECTED_BY),
            intersected_by,
        ),
        Symbol::dynamic(
            names::FILTER_IS_CONNECTED_TO,
            Params::Fixed(IS_CONNECTED_TO),
            is_connected_to,
        ),
        Symbol::dynamic(
            names::FILTER_WITH_SAME_ATOM_PROPERTIES,
            Params::Fixed(WITH_SAME_ATOM_PROPERTIES),
            with_same_atom_properties,
        ),
    ]
}

/// Keeps members for which `test` holds with the member as the current
/// structure.
fn pick(ctx: &mut QueryContext, args: &Args<Box<dyn Evaluator>>) -> Result<Value, QueryError> {
    let selection = args.selection(0, ctx)?;
    let result = filter_selection(ctx, &selection, |ctx, structure| {
        ctx.push_current_structure(structure.clone());
        let keep = args.boolean(1, ctx);
        ctx.pop_current_structure();
        keep
    })?;
    Ok(result.into())
}

fn first(ctx: &mut QueryContext, args: &Args<Box<dyn Evaluator>>) -> Result<Value, QueryError> {
    let selection = args.selection(0, ctx)?;
    let result = match &selection {
        StructureSelection::Singletons { source, structure } => {
            let mut builder = StructureSubsetBuilder::new(source.clone());
            if let Some(unit) = structure.units().first() {
                if let Some(&element) = unit.elements().first() {
                    builder.add_element(unit.id(), element);
                }
            }
            StructureSelection::singletons(source, builder.build())
        }
        StructureSelection::Sequence { source, structures } => StructureSelection::Sequence {
            source: source.clone(),
            structures: structures.iter().take(1).cloned().collect(),
        },
    };
    Ok(result.into())
}

/// Keeps members with at least one element whose distance to the target lies
/// in `[min-radius, max-radius]`.
fn within(ctx: &mut QueryContext, args: &Args<Box<dyn Evaluator>>) -> Result<Value, QueryError> {
    let selection = args.selection(0, ctx)?;
    let target = args.selection(1, ctx)?.union_structure();
    let min_radius = args.number_or(2, ctx, 0.0)?;
    let max_radius = args.evaluate(3, ctx)?.as_number(args.symbol())?;
    let invert = args.boolean_or(4, ctx, false)?;
    if !(min_radius >= 0.0) || !(max_radius >= min_radius) {
        return Err(QueryError::InvalidArgument {
            symbol: args.symbol(),
            message: format!("invalid radius range [{min_radius}, {max_radius}]"),
        });
    }

    let lookup = target.lookup();
    let result = filter_selection(ctx, &selection, |_, structure| {
        let near = structure.units().iter().any(|unit| {
            unit.elements().iter().any(|&element| {
                lookup
                    .find(&unit.position(element), max_radius)
                    .iter()
                    .any(|hit| hit.distance >= min_radius)
            })
        });
        Ok(near != invert)
    })?;
    Ok(result.into())
}

fn intersected_by(
    ctx: &mut QueryContext,
    args: &Args<Box<dyn Evaluator>>,
) -> Result<Value, QueryError> {
    let selection = args.selection(0, ctx)?;
    let by = args.selection(1, ctx)?.union_structure();
    let result = filter_selection(ctx, &selection, |_, structure| {
        Ok(Structure::are_intersecting(structure, &by))
    })?;
    Ok(result.into())
}

struct ConnectionTest<'a> {
    input: &'a Arc<Structure>,
    target: &'a Structure,
    bond_test: Option<&'a dyn Evaluator>,
    disjunct: bool,
}

impl ConnectionTest<'_> {
    /// True when some element of `structure` has a bond (passing the bond
    /// test) to an element of the target.
    fn is_connected(
        &self,
        ctx: &mut QueryContext,
        symbol: &'static str,
        structure: &Structure,
    ) -> Result<bool, QueryError> {
        let bonds = self.input.bonds();
        for unit in structure.units() {
            let Some(position) = self.input.unit_position(unit.id()) else {
                continue;
            };
            let input_unit = &self.input.units()[position];
            for &element in unit.elements().iter() {
                let Some(index) = input_unit.elements().index_of(element) else {
                    continue;
                };
                for bonded in bonds.neighbors(position, index as u32) {
                    let partner_unit = &self.input.units()[bonded.unit];
                    let partner = partner_unit.elements()[bonded.index as usize];
                    let contains = |s: &Structure| {
                        s.unit(partner_unit.id())
                            .is_some_and(|u| u.elements().has(partner))
                    };
                    if !contains(self.target) || (self.disjunct && contains(structure)) {
                        continue;
                    }
                    if let Some(test) = self.bond_test {
                        ctx.replace_link(Some(LinkLocation {
                            a: Location::new(input_unit.clone(), element),
                            b: Location::new(partner_unit.clone(), partner),
                            order: bonded.order,
                            flags: bonded.flags,
                        }));
                        if !test.evaluate(ctx)?.as_bool(symbol)? {
                            continue;
                        }
                    }
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}

fn is_connected_to(
    ctx: &mut QueryContext,
    args: &Args<Box<dyn Evaluator>>,
) -> Result<Value, QueryError> {
    let selection = args.selection(0, ctx)?;
    let target = args.selection(1, ctx)?.union_structure();
    let disjunct = args.boolean_or(3, ctx, true)?;
    let invert = args.boolean_or(4, ctx, false)?;
    let input = ctx.input().clone();
    let test = ConnectionTest {
        input: &input,
        target: &target,
        bond_test: args.get(2).map(|e| &**e),
        disjunct,
    };

    let saved = ctx.replace_link(None);
    let result = filter_selection(ctx, &selection, |ctx, structure| {
        Ok(test.is_connected(ctx, args.symbol(), structure)? != invert)
    });
    ctx.replace_link(saved);
    Ok(result?.into())
}

/// Keeps members sharing at least one property value with the source
/// selection.
fn with_same_atom_properties(
    ctx: &mut QueryContext,
    args: &Args<Box<dyn Evaluator>>,
) -> Result<Value, QueryError> {
    let selection = args.selection(0, ctx)?;
    let source = args.selection(1, ctx)?.union_structure();
    let property = &**args.required(2)?;
    let wanted = property_keys(ctx, property, args.symbol(), &source)?;
    let result = filter_selection(ctx, &selection, |ctx, structure| {
        let found = property_keys(ctx, property, args.symbol(), structure)?;
        Ok(!found.is_disjoint(&wanted))
    })?;
    Ok(result.into())
}
