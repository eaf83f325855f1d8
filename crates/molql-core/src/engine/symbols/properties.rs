//! Atom and link property readers.

use super::names;
use super::{Args, Params, Symbol};
use crate::core::element::location::Location;
use crate::core::structure::{PropertyError, UnitKind};
use crate::engine::compiler::Evaluator;
use crate::engine::context::QueryContext;
use crate::engine::error::QueryError;
use crate::engine::value::Value;

const NONE: Params = Params::Fixed(&[]);

pub(super) fn symbols() -> Vec<Symbol> {
    vec![
        // Every unit kind.
        Symbol::property(names::PROP_X, |l| Ok(l.position()?.x.into())),
        Symbol::property(names::PROP_Y, |l| Ok(l.position()?.y.into())),
        Symbol::property(names::PROP_Z, |l| Ok(l.position()?.z.into())),
        Symbol::property(names::PROP_VDW_RADIUS, |l| Ok(l.vdw_radius()?.into())),
        Symbol::property(names::PROP_SOURCE_INDEX, |l| Ok(l.source_index().into())),
        Symbol::property(names::PROP_OPERATOR_NAME, |l| Ok(l.operator_name().into())),
        Symbol::property(names::PROP_MODEL_INDEX, |l| Ok(l.model_num().into())),
        Symbol::property(names::PROP_MODEL_LABEL, |l| Ok(l.model_label().into())),
        Symbol::property(names::PROP_UNIT_KIND, |l| Ok(l.kind().as_str().into())),
        Symbol::property(names::PROP_RESIDUE_KEY, |l| Ok(l.residue_key()?.into())),
        Symbol::property(names::PROP_CHAIN_KEY, chain_key),
        Symbol::property(names::PROP_ENTITY_KEY, |l| {
            Ok(l.unit.entity_index(l.element).into())
        }),
        Symbol::property(names::PROP_LABEL_ASYM_ID, |l| Ok(l.label_asym_id()?.into())),
        Symbol::property(names::PROP_AUTH_ASYM_ID, |l| Ok(l.auth_asym_id()?.into())),
        Symbol::property(names::PROP_LABEL_ENTITY_ID, |l| Ok(l.entity()?.id.as_str().into())),
        Symbol::property(names::PROP_ENTITY_TYPE, |l| {
            Ok(l.entity()?.entity_type.as_str().into())
        }),
        // Atomic units.
        Symbol::property(names::PROP_TYPE_SYMBOL, |l| Ok(l.type_symbol()?.into())),
        Symbol::property(names::PROP_ATOM_ID, |l| Ok(l.atom_id()?.into())),
        Symbol::property(names::PROP_LABEL_ATOM_ID, |l| Ok(l.label_atom_id()?.into())),
        Symbol::property(names::PROP_AUTH_ATOM_ID, |l| Ok(l.auth_atom_id()?.into())),
        Symbol::property(names::PROP_LABEL_ALT_ID, |l| Ok(l.label_alt_id()?.into())),
        Symbol::property(names::PROP_OCCUPANCY, |l| Ok(l.occupancy()?.into())),
        Symbol::property(names::PROP_B_ISO, |l| Ok(l.b_iso()?.into())),
        Symbol::property(names::PROP_FORMAL_CHARGE, |l| Ok(l.formal_charge()?.into())),
        Symbol::property(names::PROP_LABEL_COMP_ID, |l| Ok(l.label_comp_id()?.into())),
        Symbol::property(names::PROP_AUTH_COMP_ID, |l| Ok(l.auth_comp_id()?.into())),
        Symbol::property(names::PROP_LABEL_SEQ_ID, |l| Ok(l.label_seq_id()?.into())),
        Symbol::property(names::PROP_AUTH_SEQ_ID, |l| Ok(l.auth_seq_id()?.into())),
        Symbol::property(names::PROP_INS_CODE, |l| Ok(l.ins_code()?.into())),
        Symbol::property(names::PROP_CHEM_COMP_TYPE, |l| Ok(l.chem_comp_type()?.into())),
        Symbol::property(names::PROP_IS_MODIFIED, |l| Ok(l.is_modified()?.into())),
        Symbol::property(names::PROP_MODIFIED_PARENT_NAME, |l| {
            Ok(l.modified_parent_name()?.into())
        }),
        Symbol::property(names::PROP_IS_SACCHARIDE, |l| Ok(l.is_saccharide()?.into())),
        Symbol::property(names::PROP_NEXT_RESIDUE_MISSING, |l| {
            Ok(l.next_residue_missing()?.into())
        }),
        // Coarse units.
        Symbol::property(names::PROP_SEQ_ID_BEGIN, |l| Ok(l.seq_id_begin()?.into())),
        Symbol::property(names::PROP_SEQ_ID_END, |l| Ok(l.seq_id_end()?.into())),
        // Links.
        Symbol::dynamic(names::LINK_FLAGS, NONE, link_flags),
        Symbol::dynamic(names::LINK_ORDER, NONE, link_order),
        Symbol::dynamic(names::LINK_LENGTH, NONE, link_length),
    ]
}

/// Chain index within the model for atoms; coarse elements have no chain
/// table and are keyed by their asym id instead.
fn chain_key(location: &Location) -> Result<Value, PropertyError> {
    match location.kind() {
        UnitKind::Atomic => Ok(location
            .unit
            .model()
            .atomic()
            .chain_index(location.element)
            .into()),
        UnitKind::Spheres | UnitKind::Gaussians => Ok(location.label_asym_id()?.into()),
    }
}

fn link_flags(ctx: &mut QueryContext, _args: &Args<Box<dyn Evaluator>>) -> Result<Value, QueryError> {
    Ok(Value::Flags(ctx.link(names::LINK_FLAGS)?.flags.bits()))
}

fn link_order(ctx: &mut QueryContext, _args: &Args<Box<dyn Evaluator>>) -> Result<Value, QueryError> {
    Ok(Value::Number(ctx.link(names::LINK_ORDER)?.order.as_number() as f64))
}

fn link_length(ctx: &mut QueryContext, _args: &Args<Box<dyn Evaluator>>) -> Result<Value, QueryError> {
    Ok(Value::Number(ctx.link(names::LINK_LENGTH)?.length()?))
}
