//! Selection modifiers.
//!
//! A modifier maps every member of its input selection to a new structure.
//! Singletons are modified as one structure and stay singletons; sequence
//! members are modified one by one and duplicates collapse.

use super::names;
use super::support::{elements_with_property, property_keys, whole_residues};
use super::{optional, required, Args, Param, Params, Symbol};
use crate::core::element::location::Location;
use crate::core::structure::{Structure, StructureSubsetBuilder};
use crate::engine::compiler::Evaluator;
use crate::engine::context::{LinkLocation, QueryContext};
use crate::engine::error::QueryError;
use crate::engine::selection::StructureSelection;
use crate::engine::value::Value;
use std::sync::Arc;
use tracing::trace;

const UNION: &[Param] = &[required("0")];
const INCLUDE_SURROUNDINGS: &[Param] = &[
    required("0"),
    required("radius"),
    optional("as-whole-residues"),
];
const WHOLE_RESIDUES: &[Param] = &[required("0")];
const EXPAND_PROPERTY: &[Param] = &[required("0"), required("property")];
const BY: &[Param] = &[required("0"), required("by")];
const INCLUDE_CONNECTED: &[Param] = &[
    required("0"),
    optional("layer-count"),
    optional("bond-test"),
    optional("fixed-point"),
    optional("as-whole-residues"),
];

pub(super) fn symbols() -> Vec<Symbol> {
    vec![
        Symbol::dynamic(names::MODIFIER_UNION, Params::Fixed(UNION), union),
        Symbol::dynamic(
            names::MODIFIER_INCLUDE_SURROUNDINGS,
            Params::Fixed(INCLUDE_SURROUNDINGS),
            include_surroundings,
        ),
        Symbol::dynamic(
            names::MODIFIER_WHOLE_RESIDUES,
            Params::Fixed(WHOLE_RESIDUES),
            whole_residues_of,
        ),
        Symbol::dynamic(
            names::MODIFIER_EXPAND_PROPERTY,
            Params::Fixed(EXPAND_PROPERTY),
            expand_property,
        ),
        Symbol::dynamic(names::MODIFIER_EXCEPT_BY, Params::Fixed(BY), except_by),
        Symbol::dynamic(names::MODIFIER_INTERSECT_BY, Params::Fixed(BY), intersect_by),
        Symbol::dynamic(
            names::MODIFIER_INCLUDE_CONNECTED,
            Params::Fixed(INCLUDE_CONNECTED),
            include_connected,
        ),
    ]
}

/// Collapses a selection into a one-member sequence.
fn union(ctx: &mut QueryContext, args: &Args<Box<dyn Evaluator>>) -> Result<Value, QueryError> {
    let selection = args.selection(0, ctx)?;
    let source = selection.source().clone();
    if selection.is_empty() {
        return Ok(StructureSelection::empty(&source).into());
    }
    Ok(StructureSelection::Sequence {
        structures: vec![selection.union_structure()],
        source,
    }
    .into())
}

fn include_surroundings(
    ctx: &mut QueryContext,
    args: &Args<Box<dyn Evaluator>>,
) -> Result<Value, QueryError> {
    let selection = args.selection(0, ctx)?;
    let radius = args.evaluate(1, ctx)?.as_number(args.symbol())?;
    if !(radius >= 0.0) {
        return Err(QueryError::InvalidArgument {
            symbol: args.symbol(),
            message: format!("radius must be non-negative, got {radius}"),
        });
    }
    let as_whole_residues = args.boolean_or(2, ctx, false)?;
    let input = ctx.input().clone();
    trace!(radius, as_whole_residues, "including surroundings");

    let result = selection.try_map(|structure| {
        let grown = surroundings(&input, structure, radius);
        Ok::<_, QueryError>(if as_whole_residues {
            whole_residues(&input, &grown)
        } else {
            grown
        })
    })?;
    Ok(result.into())
}

/// Every element of `input` within `radius` of some element of `structure`.
fn surroundings(input: &Arc<Structure>, structure: &Structure, radius: f64) -> Arc<Structure> {
    let lookup = input.lookup();
    let mut builder = StructureSubsetBuilder::new(input.clone());
    for unit in structure.units() {
        for &element in unit.elements().iter() {
            for hit in lookup.find(&unit.position(element), radius) {
                let found = &input.units()[hit.unit];
                builder.add_element(found.id(), found.elements()[hit.index as usize]);
            }
        }
    }
    builder.build()
}

fn whole_residues_of(
    ctx: &mut QueryContext,
    args: &Args<Box<dyn Evaluator>>,
) -> Result<Value, QueryError> {
    let selection = args.selection(0, ctx)?;
    let input = ctx.input().clone();
    let result = selection.try_map(|structure| Ok::<_, QueryError>(whole_residues(&input, structure)))?;
    Ok(result.into())
}

/// Grows every member to all input elements sharing one of its property
/// values.
fn expand_property(
    ctx: &mut QueryContext,
    args: &Args<Box<dyn Evaluator>>,
) -> Result<Value, QueryError> {
    let selection = args.selection(0, ctx)?;
    let property = &**args.required(1)?;
    let input = ctx.input().clone();
    let result = selection.try_map(|structure| {
        let keys = property_keys(ctx, property, args.symbol(), structure)?;
        elements_with_property(ctx, property, args.symbol(), &input, &keys)
    })?;
    Ok(result.into())
}

fn except_by(ctx: &mut QueryContext, args: &Args<Box<dyn Evaluator>>) -> Result<Value, QueryError> {
    let selection = args.selection(0, ctx)?;
    let by = args.selection(1, ctx)?.union_structure();
    let result = selection.try_map(|structure| Ok::<_, QueryError>(Structure::subtract(structure, &by)))?;
    Ok(result.into())
}

fn intersect_by(
    ctx: &mut QueryContext,
    args: &Args<Box<dyn Evaluator>>,
) -> Result<Value, QueryError> {
    let selection = args.selection(0, ctx)?;
    let by = args.selection(1, ctx)?.union_structure();
    let result = selection.try_map(|structure| Ok::<_, QueryError>(Structure::intersect(structure, &by)))?;
    Ok(result.into())
}

struct ConnectedOptions {
    layer_count: usize,
    fixed_point: bool,
    as_whole_residues: bool,
}

fn include_connected(
    ctx: &mut QueryContext,
    args: &Args<Box<dyn Evaluator>>,
) -> Result<Value, QueryError> {
    let selection = args.selection(0, ctx)?;
    let layer_count = args.number_or(1, ctx, 1.0)?;
    if !(layer_count >= 0.0) || layer_count.fract() != 0.0 {
        return Err(QueryError::InvalidArgument {
            symbol: args.symbol(),
            message: format!("layer-count must be a non-negative integer, got {layer_count}"),
        });
    }
    let options = ConnectedOptions {
        layer_count: layer_count as usize,
        fixed_point: args.boolean_or(3, ctx, false)?,
        as_whole_residues: args.boolean_or(4, ctx, false)?,
    };
    let input = ctx.input().clone();

    let saved = ctx.replace_link(None);
    let result = selection.try_map(|structure| connected(ctx, args, &input, structure, &options));
    ctx.replace_link(saved);
    Ok(result?.into())
}

/// Adds bonded layers around `start` until the layer budget is spent or,
/// with a fixed point, until nothing more is reachable.
fn connected(
    ctx: &mut QueryContext,
    args: &Args<Box<dyn Evaluator>>,
    input: &Arc<Structure>,
    start: &Arc<Structure>,
    options: &ConnectedOptions,
) -> Result<Arc<Structure>, QueryError> {
    let bonds = input.bonds();
    let mut current = if options.as_whole_residues {
        whole_residues(input, start)
    } else {
        start.clone()
    };
    let mut layer = 0;
    while options.fixed_point || layer < options.layer_count {
        let mut builder = StructureSubsetBuilder::new(input.clone());
        for unit in current.units() {
            builder.add_elements(unit.id(), unit.elements());
        }
        for unit in current.units() {
            let Some(position) = input.unit_position(unit.id()) else {
                continue;
            };
            let input_unit = &input.units()[position];
            for &element in unit.elements().iter() {
                let Some(index) = input_unit.elements().index_of(element) else {
                    continue;
                };
                for bonded in bonds.neighbors(position, index as u32) {
                    let partner_unit = &input.units()[bonded.unit];
                    let partner = partner_unit.elements()[bonded.index as usize];
                    let already_in = current
                        .unit(partner_unit.id())
                        .is_some_and(|u| u.elements().has(partner));
                    if already_in {
                        continue;
                    }
                    if let Some(test) = args.get(2) {
                        ctx.replace_link(Some(LinkLocation {
                            a: Location::new(input_unit.clone(), element),
                            b: Location::new(partner_unit.clone(), partner),
                            order: bonded.order,
                            flags: bonded.flags,
                        }));
                        if !test.evaluate(ctx)?.as_bool(args.symbol())? {
                            continue;
                        }
                    }
                    builder.add_element(partner_unit.id(), partner);
                }
            }
        }
        let mut next = builder.build();
        if options.as_whole_residues {
            next = whole_residues(input, &next);
        }
        layer += 1;
        let grew = next.element_count() > current.element_count();
        current = next;
        if !grew {
            break;
        }
    }
    Ok(current)
}
