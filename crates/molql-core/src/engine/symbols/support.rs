//! Helpers shared by the structure-query symbols.

use crate::core::element::loci::Loci;
use crate::core::structure::{Structure, StructureSubsetBuilder};
use crate::engine::compiler::Evaluator;
use crate::engine::context::QueryContext;
use crate::engine::error::QueryError;
use crate::engine::selection::{LinearSelectionBuilder, StructureSelection};
use crate::engine::value::SetKey;
use std::collections::BTreeSet;
use std::sync::Arc;

/// `structure` grown to whole residues of `input`.
pub(super) fn whole_residues(input: &Arc<Structure>, structure: &Structure) -> Arc<Structure> {
    Loci::from_structure(input, structure)
        .extend_to_whole_residues()
        .to_structure()
}

/// Runs `f` with the element cursor on every element of `structure`,
/// restoring the caller's cursor afterwards.
pub(super) fn for_each_element(
    ctx: &mut QueryContext,
    structure: &Structure,
    mut f: impl FnMut(&mut QueryContext) -> Result<(), QueryError>,
) -> Result<(), QueryError> {
    let saved = ctx.take_element();
    let mut result = Ok(());
    'units: for unit in structure.units() {
        for &element in unit.elements().iter() {
            ctx.set_element(unit, element);
            result = f(ctx);
            if result.is_err() {
                break 'units;
            }
        }
    }
    ctx.restore_element(saved);
    result
}

/// Distinct values of `property` over the elements of `structure`.
pub(super) fn property_keys(
    ctx: &mut QueryContext,
    property: &dyn Evaluator,
    symbol: &'static str,
    structure: &Structure,
) -> Result<BTreeSet<SetKey>, QueryError> {
    let mut keys = BTreeSet::new();
    for_each_element(ctx, structure, |ctx| {
        keys.insert(property.evaluate(ctx)?.to_key(symbol)?);
        Ok(())
    })?;
    Ok(keys)
}

/// Elements of `structure` whose `property` value is one of `keys`.
pub(super) fn elements_with_property(
    ctx: &mut QueryContext,
    property: &dyn Evaluator,
    symbol: &'static str,
    structure: &Arc<Structure>,
    keys: &BTreeSet<SetKey>,
) -> Result<Arc<Structure>, QueryError> {
    let mut builder = StructureSubsetBuilder::new(structure.clone());
    let saved = ctx.take_element();
    let mut result = Ok(());
    'units: for unit in structure.units() {
        for &element in unit.elements().iter() {
            ctx.set_element(unit, element);
            match property.evaluate(ctx).and_then(|v| v.to_key(symbol)) {
                Ok(key) if keys.contains(&key) => builder.add_element(unit.id(), element),
                Ok(_) => {}
                Err(e) => {
                    result = Err(e);
                    break 'units;
                }
            }
        }
    }
    ctx.restore_element(saved);
    result.map(|_| builder.build())
}

/// Keeps the members for which `keep` holds. Singletons are tested element
/// by element and stay singletons.
pub(super) fn filter_selection(
    ctx: &mut QueryContext,
    selection: &StructureSelection,
    mut keep: impl FnMut(&mut QueryContext, &Arc<Structure>) -> Result<bool, QueryError>,
) -> Result<StructureSelection, QueryError> {
    match selection {
        StructureSelection::Singletons { source, .. } => {
            let mut builder = StructureSubsetBuilder::new(source.clone());
            for single in selection.structures() {
                if keep(ctx, &single)? {
                    for unit in single.units() {
                        builder.add_elements(unit.id(), unit.elements());
                    }
                }
            }
            Ok(StructureSelection::singletons(source, builder.build()))
        }
        StructureSelection::Sequence { source, structures } => {
            let mut builder = LinearSelectionBuilder::new(source);
            for structure in structures {
                if keep(ctx, structure)? {
                    builder.add(structure.clone());
                }
            }
            Ok(builder.build())
        }
    }
}
