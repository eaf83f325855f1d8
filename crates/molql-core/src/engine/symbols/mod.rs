//! # Symbol Registry
//!
//! Every symbol the compiler can resolve is an entry binding a name to a
//! parameter shape and one of three implementation kinds:
//!
//! - **Constant** functions receive evaluated argument values. When all of
//!   their arguments are constant the compiler folds the call away.
//! - **Dynamic** functions receive the argument evaluators themselves and
//!   decide when (and how often) to run them. Logic, generators, modifiers
//!   and filters are dynamic.
//! - **Property** readers resolve a value from a location: an explicit
//!   argument when given, otherwise the context's current element.

pub mod names;

mod atom_set;
mod combinators;
mod filters;
mod generators;
mod modifiers;
mod primitives;
mod properties;
mod support;

#[cfg(test)]
mod testing;

pub use primitives::link_flag;

use super::compiler::Evaluator;
use super::context::QueryContext;
use super::error::QueryError;
use super::selection::StructureSelection;
use super::value::Value;
use crate::core::element::location::Location;
use crate::core::structure::PropertyError;
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

pub type ConstantFn = fn(&Args<Value>) -> Result<Value, QueryError>;
pub type DynamicFn = fn(&mut QueryContext, &Args<Box<dyn Evaluator>>) -> Result<Value, QueryError>;
pub type PropertyFn = fn(&Location) -> Result<Value, PropertyError>;

#[derive(Clone, Copy)]
pub enum SymbolImpl {
    Constant(ConstantFn),
    Dynamic(DynamicFn),
    Property(PropertyFn),
}

impl fmt::Debug for SymbolImpl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SymbolImpl::Constant(_) => "Constant",
            SymbolImpl::Dynamic(_) => "Dynamic",
            SymbolImpl::Property(_) => "Property",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param {
    pub name: &'static str,
    pub required: bool,
}

pub const fn required(name: &'static str) -> Param {
    Param {
        name,
        required: true,
    }
}

pub const fn optional(name: &'static str) -> Param {
    Param {
        name,
        required: false,
    }
}

/// Accepted argument shape.
///
/// Fixed parameters bind by position or by name (a parameter can also be
/// named by its position, e.g. `:0`). Variadic symbols take any number of
/// arguments within bounds; named variadic arguments are ordered by numeric
/// name first, then by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Params {
    Fixed(&'static [Param]),
    Variadic { min: usize, max: Option<usize> },
}

/// Property readers take the location to read as an optional first argument.
pub const LOCATION_PARAMS: &[Param] = &[optional("0")];

#[derive(Debug, Clone, Copy)]
pub struct Symbol {
    pub name: &'static str,
    pub params: Params,
    pub imp: SymbolImpl,
}

impl Symbol {
    pub const fn constant(name: &'static str, params: Params, imp: ConstantFn) -> Self {
        Self {
            name,
            params,
            imp: SymbolImpl::Constant(imp),
        }
    }

    pub const fn dynamic(name: &'static str, params: Params, imp: DynamicFn) -> Self {
        Self {
            name,
            params,
            imp: SymbolImpl::Dynamic(imp),
        }
    }

    pub const fn property(name: &'static str, imp: PropertyFn) -> Self {
        Self {
            name,
            params: Params::Fixed(LOCATION_PARAMS),
            imp: SymbolImpl::Property(imp),
        }
    }
}

/// Bound arguments of one call. Fixed parameters get one slot each (empty
/// when an optional argument was omitted); variadic arguments fill every
/// slot.
#[derive(Debug)]
pub struct Args<T> {
    symbol: &'static str,
    items: Vec<Option<T>>,
}

impl<T> Args<T> {
    pub fn new(symbol: &'static str, items: Vec<Option<T>>) -> Self {
        Self { symbol, items }
    }

    pub fn symbol(&self) -> &'static str {
        self.symbol
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index).and_then(Option::as_ref)
    }

    /// Present arguments in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter().flatten()
    }

    pub fn slots(&self) -> &[Option<T>] {
        &self.items
    }

    pub fn into_slots(self) -> Vec<Option<T>> {
        self.items
    }

    pub fn required(&self, index: usize) -> Result<&T, QueryError> {
        self.get(index).ok_or_else(|| QueryError::InvalidArgument {
            symbol: self.symbol,
            message: format!("argument {index} is missing"),
        })
    }
}

impl Args<Value> {
    pub fn number(&self, index: usize) -> Result<f64, QueryError> {
        self.required(index)?.as_number(self.symbol)
    }

    pub fn boolean(&self, index: usize) -> Result<bool, QueryError> {
        self.required(index)?.as_bool(self.symbol)
    }

    pub fn string(&self, index: usize) -> Result<&str, QueryError> {
        self.required(index)?.as_str(self.symbol)
    }

    pub fn flags(&self, index: usize) -> Result<u32, QueryError> {
        self.required(index)?.as_flags(self.symbol)
    }

    pub fn numbers(&self) -> Result<Vec<f64>, QueryError> {
        self.iter().map(|v| v.as_number(self.symbol)).collect()
    }
}

impl Args<Box<dyn Evaluator>> {
    pub fn evaluate(&self, index: usize, ctx: &mut QueryContext) -> Result<Value, QueryError> {
        self.required(index)?.evaluate(ctx)
    }

    pub fn evaluate_optional(
        &self,
        index: usize,
        ctx: &mut QueryContext,
    ) -> Result<Option<Value>, QueryError> {
        self.get(index).map(|e| e.evaluate(ctx)).transpose()
    }

    pub fn boolean(&self, index: usize, ctx: &mut QueryContext) -> Result<bool, QueryError> {
        self.evaluate(index, ctx)?.as_bool(self.symbol)
    }

    pub fn boolean_or(
        &self,
        index: usize,
        ctx: &mut QueryContext,
        default: bool,
    ) -> Result<bool, QueryError> {
        match self.get(index) {
            Some(e) => e.evaluate(ctx)?.as_bool(self.symbol),
            None => Ok(default),
        }
    }

    pub fn number_or(
        &self,
        index: usize,
        ctx: &mut QueryContext,
        default: f64,
    ) -> Result<f64, QueryError> {
        match self.get(index) {
            Some(e) => e.evaluate(ctx)?.as_number(self.symbol),
            None => Ok(default),
        }
    }

    pub fn selection(
        &self,
        index: usize,
        ctx: &mut QueryContext,
    ) -> Result<StructureSelection, QueryError> {
        self.evaluate(index, ctx)?.into_selection(self.symbol)
    }
}

static ALIASES: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "and" => names::LOGIC_AND,
    "or" => names::LOGIC_OR,
    "not" => names::LOGIC_NOT,
    "if" => names::CTRL_IF,
    "=" => names::REL_EQ,
    "eq" => names::REL_EQ,
    "!=" => names::REL_NEQ,
    "neq" => names::REL_NEQ,
    "<" => names::REL_LT,
    "<=" => names::REL_LTE,
    ">" => names::REL_GR,
    ">=" => names::REL_GRE,
    "in-range" => names::REL_IN_RANGE,
    "+" => names::MATH_ADD,
    "-" => names::MATH_SUB,
    "*" => names::MATH_MULT,
    "/" => names::MATH_DIV,
    "has" => names::SET_HAS,
    "set" => names::TYPE_SET,
    "list" => names::TYPE_LIST,
    "link-flags" => names::TYPE_LINK_FLAGS,
    "atom-groups" => names::GENERATOR_ATOM_GROUPS,
    "all" => names::GENERATOR_ALL,
    "empty" => names::GENERATOR_EMPTY,
    "current-selection" => names::GENERATOR_CURRENT_SELECTION,
    "union" => names::MODIFIER_UNION,
    "include-surroundings" => names::MODIFIER_INCLUDE_SURROUNDINGS,
    "whole-residues" => names::MODIFIER_WHOLE_RESIDUES,
    "expand-property" => names::MODIFIER_EXPAND_PROPERTY,
    "except-by" => names::MODIFIER_EXCEPT_BY,
    "intersect-by" => names::MODIFIER_INTERSECT_BY,
    "include-connected" => names::MODIFIER_INCLUDE_CONNECTED,
    "pick" => names::FILTER_PICK,
    "first" => names::FILTER_FIRST,
    "within" => names::FILTER_WITHIN,
    "intersected-by" => names::FILTER_INTERSECTED_BY,
    "is-connected-to" => names::FILTER_IS_CONNECTED_TO,
    "with-same-atom-properties" => names::FILTER_WITH_SAME_ATOM_PROPERTIES,
    "merge" => names::COMBINATOR_MERGE,
    "intersect" => names::COMBINATOR_INTERSECT,
    "atom-count" => names::ATOM_SET_ATOM_COUNT,
    "count-query" => names::ATOM_SET_COUNT_QUERY,
    "property-set" => names::ATOM_SET_PROPERTY_SET,
    "residue-key" => names::PROP_RESIDUE_KEY,
    "chain-key" => names::PROP_CHAIN_KEY,
    "entity-key" => names::PROP_ENTITY_KEY,
    "type_symbol" => names::PROP_TYPE_SYMBOL,
    "label_atom_id" => names::PROP_LABEL_ATOM_ID,
    "auth_atom_id" => names::PROP_AUTH_ATOM_ID,
    "label_comp_id" => names::PROP_LABEL_COMP_ID,
    "auth_comp_id" => names::PROP_AUTH_COMP_ID,
    "label_seq_id" => names::PROP_LABEL_SEQ_ID,
    "auth_seq_id" => names::PROP_AUTH_SEQ_ID,
    "label_asym_id" => names::PROP_LABEL_ASYM_ID,
    "auth_asym_id" => names::PROP_AUTH_ASYM_ID,
    "label_entity_id" => names::PROP_LABEL_ENTITY_ID,
    "entity-type" => names::PROP_ENTITY_TYPE,
    "B_iso" => names::PROP_B_ISO,
    "occupancy" => names::PROP_OCCUPANCY,
};

/// True when `word` is a short name for a registered symbol.
pub fn is_alias(word: &str) -> bool {
    ALIASES.contains_key(word)
}

/// Full symbol name for `name`, which may be an alias.
pub fn resolve_alias(name: &str) -> &str {
    ALIASES.get(name).copied().unwrap_or(name)
}

/// Registry of symbol implementations keyed by full name.
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: HashMap<&'static str, Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The table holding every built-in symbol, built on first use.
    pub fn standard() -> &'static SymbolTable {
        static STANDARD: OnceLock<SymbolTable> = OnceLock::new();
        STANDARD.get_or_init(|| {
            let mut table = SymbolTable::new();
            table.extend(primitives::symbols());
            table.extend(generators::symbols());
            table.extend(modifiers::symbols());
            table.extend(filters::symbols());
            table.extend(combinators::symbols());
            table.extend(atom_set::symbols());
            table.extend(properties::symbols());
            table
        })
    }

    /// Adds a symbol, replacing any entry of the same name.
    pub fn register(&mut self, symbol: Symbol) {
        self.symbols.insert(symbol.name, symbol);
    }

    pub fn extend(&mut self, symbols: impl IntoIterator<Item = Symbol>) {
        for symbol in symbols {
            self.register(symbol);
        }
    }

    /// Looks up a full name or an alias.
    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(resolve_alias(name))
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.symbols.keys().copied().collect();
        names.sort_unstable();
        names
    }
}
