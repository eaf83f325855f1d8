use super::error::QueryError;
use super::selection::StructureSelection;
use crate::core::element::location::Location;
use std::collections::BTreeSet;
use std::fmt;

/// Hashable, ordered form of a scalar value, used as a set member.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SetKey {
    Bool(bool),
    Number(NumberKey),
    Str(String),
}

/// An `f64` compared by bit pattern, with `-0.0` folded into `0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NumberKey(u64);

impl NumberKey {
    pub fn new(value: f64) -> Self {
        let value = if value == 0.0 { 0.0 } else { value };
        Self(value.to_bits())
    }

    pub fn value(self) -> f64 {
        f64::from_bits(self.0)
    }
}

impl From<SetKey> for Value {
    fn from(key: SetKey) -> Self {
        match key {
            SetKey::Bool(b) => Value::Bool(b),
            SetKey::Number(n) => Value::Number(n.value()),
            SetKey::Str(s) => Value::Str(s),
        }
    }
}

/// A runtime value flowing between compiled expression nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Number(f64),
    Str(String),
    List(Vec<Value>),
    Set(BTreeSet<SetKey>),
    Flags(u32),
    Location(Location),
    Selection(StructureSelection),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Set(_) => "set",
            Value::Flags(_) => "flags",
            Value::Location(_) => "location",
            Value::Selection(_) => "selection",
        }
    }

    fn mismatch(&self, symbol: &'static str, expected: &'static str) -> QueryError {
        QueryError::TypeMismatch {
            symbol,
            expected,
            found: self.type_name(),
        }
    }

    pub fn as_bool(&self, symbol: &'static str) -> Result<bool, QueryError> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(other.mismatch(symbol, "bool")),
        }
    }

    /// Numbers, booleans (0/1) and flags are all numeric.
    pub fn as_number(&self, symbol: &'static str) -> Result<f64, QueryError> {
        match self {
            Value::Number(n) => Ok(*n),
            Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            Value::Flags(f) => Ok(*f as f64),
            other => Err(other.mismatch(symbol, "number")),
        }
    }

    pub fn as_str(&self, symbol: &'static str) -> Result<&str, QueryError> {
        match self {
            Value::Str(s) => Ok(s),
            other => Err(other.mismatch(symbol, "string")),
        }
    }

    /// Flags, or a non-negative integral number read as a bit mask.
    pub fn as_flags(&self, symbol: &'static str) -> Result<u32, QueryError> {
        match self {
            Value::Flags(f) => Ok(*f),
            Value::Number(n) if *n >= 0.0 && n.fract() == 0.0 && *n <= u32::MAX as f64 => {
                Ok(*n as u32)
            }
            other => Err(other.mismatch(symbol, "flags")),
        }
    }

    pub fn as_list(&self, symbol: &'static str) -> Result<&[Value], QueryError> {
        match self {
            Value::List(items) => Ok(items),
            other => Err(other.mismatch(symbol, "list")),
        }
    }

    /// Sets as they are; lists are converted member by member.
    pub fn to_set(&self, symbol: &'static str) -> Result<BTreeSet<SetKey>, QueryError> {
        match self {
            Value::Set(set) => Ok(set.clone()),
            Value::List(items) => items
                .iter()
                .map(|item| item.to_key(symbol))
                .collect(),
            other => Err(other.mismatch(symbol, "set")),
        }
    }

    pub fn as_location(&self, symbol: &'static str) -> Result<&Location, QueryError> {
        match self {
            Value::Location(l) => Ok(l),
            other => Err(other.mismatch(symbol, "location")),
        }
    }

    pub fn as_selection(&self, symbol: &'static str) -> Result<&StructureSelection, QueryError> {
        match self {
            Value::Selection(s) => Ok(s),
            other => Err(other.mismatch(symbol, "selection")),
        }
    }

    pub fn into_selection(self, symbol: &'static str) -> Result<StructureSelection, QueryError> {
        match self {
            Value::Selection(s) => Ok(s),
            other => Err(other.mismatch(symbol, "selection")),
        }
    }

    pub fn to_key(&self, symbol: &'static str) -> Result<SetKey, QueryError> {
        match self {
            Value::Bool(b) => Ok(SetKey::Bool(*b)),
            Value::Number(n) => Ok(SetKey::Number(NumberKey::new(*n))),
            Value::Flags(f) => Ok(SetKey::Number(NumberKey::new(*f as f64))),
            Value::Str(s) => Ok(SetKey::Str(s.clone())),
            other => Err(other.mismatch(symbol, "scalar")),
        }
    }

    /// Equality as used by relational symbols: numeric values compare by
    /// value, everything else structurally.
    pub fn loosely_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(_) | Value::Flags(_), Value::Number(_) | Value::Flags(_)) => {
                self.as_number("eq").ok() == other.as_number("eq").ok()
            }
            _ => self == other,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(value as f64)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Number(value as f64)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<StructureSelection> for Value {
    fn from(value: StructureSelection) -> Self {
        Value::Selection(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Set(set) => {
                f.write_str("{")?;
                for (i, key) in set.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", Value::from(key.clone()))?;
                }
                f.write_str("}")
            }
            Value::Flags(bits) => write!(f, "flags({bits:#x})"),
            Value::Location(l) => write!(f, "location(unit {}, element {})", l.unit.id(), l.element),
            Value::Selection(s) => write!(f, "selection({} structures)", s.len()),
        }
    }
}
