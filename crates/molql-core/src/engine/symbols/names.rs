//! Full names of built-in symbols.

pub const LOGIC_AND: &str = "core.logic.and";
pub const LOGIC_OR: &str = "core.logic.or";
pub const LOGIC_NOT: &str = "core.logic.not";

pub const CTRL_IF: &str = "core.ctrl.if";

pub const REL_EQ: &str = "core.rel.eq";
pub const REL_NEQ: &str = "core.rel.neq";
pub const REL_LT: &str = "core.rel.lt";
pub const REL_LTE: &str = "core.rel.lte";
pub const REL_GR: &str = "core.rel.gr";
pub const REL_GRE: &str = "core.rel.gre";
pub const REL_IN_RANGE: &str = "core.rel.in-range";

pub const MATH_ADD: &str = "core.math.add";
pub const MATH_SUB: &str = "core.math.sub";
pub const MATH_MULT: &str = "core.math.mult";
pub const MATH_DIV: &str = "core.math.div";

pub const STR_CONCAT: &str = "core.str.concat";
pub const STR_MATCH: &str = "core.str.match";

pub const SET_HAS: &str = "core.set.has";
pub const SET_IS_SUBSET: &str = "core.set.is-subset";

pub const FLAGS_HAS_ANY: &str = "core.flags.has-any";
pub const FLAGS_HAS_ALL: &str = "core.flags.has-all";

pub const TYPE_BOOL: &str = "core.type.bool";
pub const TYPE_NUM: &str = "core.type.num";
pub const TYPE_STR: &str = "core.type.str";
pub const TYPE_LIST: &str = "core.type.list";
pub const TYPE_SET: &str = "core.type.set";
pub const TYPE_LINK_FLAGS: &str = "structure-query.type.link-flags";

pub const LIST_GET_AT: &str = "core.list.get-at";

pub const GENERATOR_ATOM_GROUPS: &str = "structure-query.generator.atom-groups";
pub const GENERATOR_ALL: &str = "structure-query.generator.all";
pub const GENERATOR_EMPTY: &str = "structure-query.generator.empty";
pub const GENERATOR_CURRENT_SELECTION: &str = "structure-query.generator.current-selection";

pub const MODIFIER_UNION: &str = "structure-query.modifier.union";
pub const MODIFIER_INCLUDE_SURROUNDINGS: &str = "structure-query.modifier.include-surroundings";
pub const MODIFIER_WHOLE_RESIDUES: &str = "structure-query.modifier.whole-residues";
pub const MODIFIER_EXPAND_PROPERTY: &str = "structure-query.modifier.expand-property";
pub const MODIFIER_EXCEPT_BY: &str = "structure-query.modifier.except-by";
pub const MODIFIER_INTERSECT_BY: &str = "structure-query.modifier.intersect-by";
pub const MODIFIER_INCLUDE_CONNECTED: &str = "structure-query.modifier.include-connected";

pub const FILTER_PICK: &str = "structure-query.filter.pick";
pub const FILTER_FIRST: &str = "structure-query.filter.first";
pub const FILTER_WITHIN: &str = "structure-query.filter.within";
pub const FILTER_INTERSECTED_BY: &str = "structure-query.filter.intersected-by";
pub const FILTER_IS_CONNECTED_TO: &str = "structure-query.filter.is-connected-to";
pub const FILTER_WITH_SAME_ATOM_PROPERTIES: &str =
    "structure-query.filter.with-same-atom-properties";

pub const COMBINATOR_MERGE: &str = "structure-query.combinator.merge";
pub const COMBINATOR_INTERSECT: &str = "structure-query.combinator.intersect";

pub const ATOM_SET_ATOM_COUNT: &str = "structure-query.atom-set.atom-count";
pub const ATOM_SET_COUNT_QUERY: &str = "structure-query.atom-set.count-query";
pub const ATOM_SET_PROPERTY_SET: &str = "structure-query.atom-set.property-set";

pub const LINK_FLAGS: &str = "structure-query.link-property.flags";
pub const LINK_ORDER: &str = "structure-query.link-property.order";
pub const LINK_LENGTH: &str = "structure-query.link-property.length";

pub const PROP_X: &str = "structure-query.atom-property.core.x";
pub const PROP_Y: &str = "structure-query.atom-property.core.y";
pub const PROP_Z: &str = "structure-query.atom-property.core.z";
pub const PROP_VDW_RADIUS: &str = "structure-query.atom-property.core.vdw-radius";
pub const PROP_SOURCE_INDEX: &str = "structure-query.atom-property.core.source-index";
pub const PROP_OPERATOR_NAME: &str = "structure-query.atom-property.core.operator-name";
pub const PROP_MODEL_INDEX: &str = "structure-query.atom-property.core.model-index";
pub const PROP_MODEL_LABEL: &str = "structure-query.atom-property.core.model-label";
pub const PROP_UNIT_KIND: &str = "structure-query.atom-property.core.unit-kind";
pub const PROP_RESIDUE_KEY: &str = "structure-query.atom-property.core.residue-key";
pub const PROP_CHAIN_KEY: &str = "structure-query.atom-property.core.chain-key";
pub const PROP_ENTITY_KEY: &str = "structure-query.atom-property.core.entity-key";

pub const PROP_TYPE_SYMBOL: &str = "structure-query.atom-property.macromolecular.type_symbol";
pub const PROP_ATOM_ID: &str = "structure-query.atom-property.macromolecular.id";
pub const PROP_LABEL_ATOM_ID: &str = "structure-query.atom-property.macromolecular.label_atom_id";
pub const PROP_AUTH_ATOM_ID: &str = "structure-query.atom-property.macromolecular.auth_atom_id";
pub const PROP_LABEL_ALT_ID: &str = "structure-query.atom-property.macromolecular.label_alt_id";
pub const PROP_OCCUPANCY: &str = "structure-query.atom-property.macromolecular.occupancy";
pub const PROP_B_ISO: &str = "structure-query.atom-property.macromolecular.B_iso";
pub const PROP_FORMAL_CHARGE: &str = "structure-query.atom-property.macromolecular.formal-charge";
pub const PROP_LABEL_COMP_ID: &str = "structure-query.atom-property.macromolecular.label_comp_id";
pub const PROP_AUTH_COMP_ID: &str = "structure-query.atom-property.macromolecular.auth_comp_id";
pub const PROP_LABEL_SEQ_ID: &str = "structure-query.atom-property.macromolecular.label_seq_id";
pub const PROP_AUTH_SEQ_ID: &str = "structure-query.atom-property.macromolecular.auth_seq_id";
pub const PROP_INS_CODE: &str = "structure-query.atom-property.macromolecular.ins-code";
pub const PROP_LABEL_ASYM_ID: &str = "structure-query.atom-property.macromolecular.label_asym_id";
pub const PROP_AUTH_ASYM_ID: &str = "structure-query.atom-property.macromolecular.auth_asym_id";
pub const PROP_LABEL_ENTITY_ID: &str =
    "structure-query.atom-property.macromolecular.label_entity_id";
pub const PROP_ENTITY_TYPE: &str = "structure-query.atom-property.macromolecular.entity-type";
pub const PROP_CHEM_COMP_TYPE: &str = "structure-query.atom-property.macromolecular.chem-comp-type";
pub const PROP_IS_MODIFIED: &str = "structure-query.atom-property.macromolecular.is-modified";
pub const PROP_MODIFIED_PARENT_NAME: &str =
    "structure-query.atom-property.macromolecular.modified-parent-name";
pub const PROP_IS_SACCHARIDE: &str = "structure-query.atom-property.macromolecular.is-saccharide";
pub const PROP_NEXT_RESIDUE_MISSING: &str =
    "structure-query.atom-property.macromolecular.next-residue-missing";

pub const PROP_SEQ_ID_BEGIN: &str = "structure-query.atom-property.coarse.seq-id-begin";
pub const PROP_SEQ_ID_END: &str = "structure-query.atom-property.coarse.seq-id-end";
