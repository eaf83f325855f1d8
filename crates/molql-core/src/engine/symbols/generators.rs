//! Selection generators.

use super::names;
use super::{optional, Args, Param, Params, Symbol};
use crate::core::structure::{ElementIndex, Structure, StructureSubsetBuilder, Unit, UnitKind};
use crate::engine::compiler::Evaluator;
use crate::engine::context::QueryContext;
use crate::engine::error::QueryError;
use crate::engine::selection::{LinearSelectionBuilder, StructureSelection};
use crate::engine::value::{SetKey, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

const ATOM_GROUPS: &[Param] = &[
    optional("unit-test"),
    optional("entity-test"),
    optional("chain-test"),
    optional("residue-test"),
    optional("atom-test"),
    optional("group-by"),
];
const UNIT_TEST: usize = 0;
const ENTITY_TEST: usize = 1;
const CHAIN_TEST: usize = 2;
const RESIDUE_TEST: usize = 3;
const ATOM_TEST: usize = 4;
const GROUP_BY: usize = 5;

const NONE: Params = Params::Fixed(&[]);

pub(super) fn symbols() -> Vec<Symbol> {
    vec![
        Symbol::dynamic(names::GENERATOR_ATOM_GROUPS, Params::Fixed(ATOM_GROUPS), atom_groups),
        Symbol::dynamic(names::GENERATOR_ALL, NONE, all),
        Symbol::dynamic(names::GENERATOR_EMPTY, NONE, empty),
        Symbol::dynamic(names::GENERATOR_CURRENT_SELECTION, NONE, current_selection),
    ]
}

/// Where accepted elements go: one flat set, or one group per key.
enum Collector {
    Flat(StructureSubsetBuilder),
    Grouped {
        source: Arc<Structure>,
        keys: HashMap<SetKey, usize>,
        groups: Vec<StructureSubsetBuilder>,
    },
}

impl Collector {
    fn new(source: &Arc<Structure>, grouped: bool) -> Self {
        if grouped {
            Collector::Grouped {
                source: source.clone(),
                keys: HashMap::new(),
                groups: Vec::new(),
            }
        } else {
            Collector::Flat(StructureSubsetBuilder::new(source.clone()))
        }
    }

    fn add(
        &mut self,
        ctx: &mut QueryContext,
        args: &Args<Box<dyn Evaluator>>,
        unit: &Unit,
        element: ElementIndex,
    ) -> Result<(), QueryError> {
        match self {
            Collector::Flat(builder) => builder.add_element(unit.id(), element),
            Collector::Grouped {
                source,
                keys,
                groups,
            } => {
                let key = args
                    .evaluate(GROUP_BY, ctx)?
                    .to_key(names::GENERATOR_ATOM_GROUPS)?;
                let next = groups.len();
                let slot = *keys.entry(key).or_insert(next);
                if slot == next {
                    groups.push(StructureSubsetBuilder::new(source.clone()));
                }
                groups[slot].add_element(unit.id(), element);
            }
        }
        Ok(())
    }

    fn finish(self, source: &Arc<Structure>) -> StructureSelection {
        match self {
            Collector::Flat(builder) => StructureSelection::singletons(source, builder.build()),
            Collector::Grouped { groups, .. } => {
                let mut result = LinearSelectionBuilder::new(source);
                for group in groups {
                    result.add(group.build());
                }
                result.build()
            }
        }
    }
}

fn passes(
    args: &Args<Box<dyn Evaluator>>,
    test: usize,
    ctx: &mut QueryContext,
) -> Result<bool, QueryError> {
    match args.get(test) {
        None => Ok(true),
        Some(test) => test.evaluate(ctx)?.as_bool(names::GENERATOR_ATOM_GROUPS),
    }
}

/// Walks unit, entity, chain, residue and atom levels, testing each with the
/// cursor on the level's first element. Coarse elements stand for every
/// level at once.
fn atom_groups(ctx: &mut QueryContext, args: &Args<Box<dyn Evaluator>>) -> Result<Value, QueryError> {
    let input = ctx.input().clone();
    let saved = ctx.take_element();
    let result = collect_groups(ctx, args, &input);
    ctx.restore_element(saved);
    Ok(Value::Selection(result?))
}

fn collect_groups(
    ctx: &mut QueryContext,
    args: &Args<Box<dyn Evaluator>>,
    input: &Arc<Structure>,
) -> Result<StructureSelection, QueryError> {
    let mut collector = Collector::new(input, args.get(GROUP_BY).is_some());

    for unit in input.units() {
        let elements = unit.elements();
        let Some(&first) = elements.first() else {
            continue;
        };
        ctx.set_element(unit, first);
        if !passes(args, UNIT_TEST, ctx)? {
            trace!(unit = unit.id(), "Unit rejected");
            continue;
        }

        match unit.kind() {
            UnitKind::Atomic => {
                let atomic = unit.model().atomic();
                for chain in atomic.chain_segments.transient_segments(elements) {
                    ctx.set_element(unit, elements[chain.start]);
                    if !passes(args, ENTITY_TEST, ctx)? || !passes(args, CHAIN_TEST, ctx)? {
                        continue;
                    }
                    for residue in atomic
                        .residue_segments
                        .transient_segments_in(elements, chain.start..chain.end)
                    {
                        ctx.set_element(unit, elements[residue.start]);
                        if !passes(args, RESIDUE_TEST, ctx)? {
                            continue;
                        }
                        for &element in &elements[residue.start..residue.end] {
                            ctx.set_element(unit, element);
                            if passes(args, ATOM_TEST, ctx)? {
                                collector.add(ctx, args, unit, element)?;
                            }
                        }
                    }
                }
            }
            UnitKind::Spheres | UnitKind::Gaussians => {
                for &element in elements.iter() {
                    ctx.set_element(unit, element);
                    if passes(args, ENTITY_TEST, ctx)?
                        && passes(args, CHAIN_TEST, ctx)?
                        && passes(args, RESIDUE_TEST, ctx)?
                        && passes(args, ATOM_TEST, ctx)?
                    {
                        collector.add(ctx, args, unit, element)?;
                    }
                }
            }
        }
    }

    Ok(collector.finish(input))
}

fn all(ctx: &mut QueryContext, _args: &Args<Box<dyn Evaluator>>) -> Result<Value, QueryError> {
    let input = ctx.input().clone();
    Ok(Value::Selection(StructureSelection::singletons(&input, input.clone())))
}

fn empty(ctx: &mut QueryContext, _args: &Args<Box<dyn Evaluator>>) -> Result<Value, QueryError> {
    Ok(Value::Selection(StructureSelection::empty(ctx.input())))
}

/// The selection handed to the context by the caller, or nothing.
fn current_selection(
    ctx: &mut QueryContext,
    _args: &Args<Box<dyn Evaluator>>,
) -> Result<Value, QueryError> {
    let selection = match ctx.current_selection() {
        Some(selection) => selection.clone(),
        None => StructureSelection::empty(ctx.input()),
    };
    Ok(Value::Selection(selection))
}
