use super::config::QueryConfig;
use super::error::QueryError;
use super::selection::StructureSelection;
use crate::core::element::location::Location;
use crate::core::structure::{BondOrder, ElementIndex, LinkFlags, Structure, Unit};
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;

/// The bond currently under test, seen from `a` towards `b`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkLocation {
    pub a: Location,
    pub b: Location,
    pub order: BondOrder,
    pub flags: LinkFlags,
}

impl LinkLocation {
    pub fn length(&self) -> Result<f64, QueryError> {
        Ok((self.a.position()? - self.b.position()?).norm())
    }
}

/// Mutable state for one evaluation of a compiled query.
///
/// Generators move the element cursor, bond tests move the link cursor and
/// filters push the structure they are testing. A context is owned by a
/// single evaluation and is never shared.
#[derive(Debug)]
pub struct QueryContext {
    input: Arc<Structure>,
    config: QueryConfig,
    element: Option<Location>,
    link: Option<LinkLocation>,
    structures: Vec<Arc<Structure>>,
    current_selection: Option<StructureSelection>,
    patterns: HashMap<String, Regex>,
}

impl QueryContext {
    pub fn new(input: Arc<Structure>, config: QueryConfig) -> Self {
        Self {
            input,
            config,
            element: None,
            link: None,
            structures: Vec::new(),
            current_selection: None,
            patterns: HashMap::new(),
        }
    }

    /// Makes a prior selection available to `current-selection`.
    pub fn with_current_selection(mut self, selection: StructureSelection) -> Self {
        self.current_selection = Some(selection);
        self
    }

    pub fn input(&self) -> &Arc<Structure> {
        &self.input
    }

    /// Replaces the input structure and returns the previous one.
    pub fn replace_input(&mut self, input: Arc<Structure>) -> Arc<Structure> {
        std::mem::replace(&mut self.input, input)
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    pub fn current_selection(&self) -> Option<&StructureSelection> {
        self.current_selection.as_ref()
    }

    pub fn element(&self, symbol: &'static str) -> Result<&Location, QueryError> {
        self.element
            .as_ref()
            .ok_or(QueryError::NoCurrentElement(symbol))
    }

    /// Moves the element cursor, reusing the current location when present.
    pub fn set_element(&mut self, unit: &Arc<Unit>, element: ElementIndex) {
        match &mut self.element {
            Some(location) => location.set(unit, element),
            None => self.element = Some(Location::new(unit.clone(), element)),
        }
    }

    /// Detaches the element cursor so a nested generator can own it; hand the
    /// result back to [`restore_element`](Self::restore_element).
    pub fn take_element(&mut self) -> Option<Location> {
        self.element.take()
    }

    pub fn restore_element(&mut self, element: Option<Location>) {
        self.element = element;
    }

    pub fn link(&self, symbol: &'static str) -> Result<&LinkLocation, QueryError> {
        self.link.as_ref().ok_or(QueryError::NoCurrentLink(symbol))
    }

    /// Sets the link cursor and returns the previous one.
    pub fn replace_link(&mut self, link: Option<LinkLocation>) -> Option<LinkLocation> {
        std::mem::replace(&mut self.link, link)
    }

    pub fn current_structure(&self, symbol: &'static str) -> Result<&Arc<Structure>, QueryError> {
        self.structures
            .last()
            .ok_or(QueryError::NoCurrentStructure(symbol))
    }

    pub fn push_current_structure(&mut self, structure: Arc<Structure>) {
        self.structures.push(structure);
    }

    pub fn pop_current_structure(&mut self) -> Option<Arc<Structure>> {
        self.structures.pop()
    }

    /// Compiled regular expression for `pattern`, built once per evaluation.
    pub fn regex(&mut self, pattern: &str) -> Result<&Regex, QueryError> {
        if !self.patterns.contains_key(pattern) {
            let regex = Regex::new(pattern).map_err(|e| QueryError::InvalidRegex {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })?;
            self.patterns.insert(pattern.to_string(), regex);
        }
        self.patterns
            .get(pattern)
            .ok_or_else(|| QueryError::InvalidRegex {
                pattern: pattern.to_string(),
                message: "pattern cache miss".to_string(),
            })
    }
}
