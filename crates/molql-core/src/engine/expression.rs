use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Bool(bool),
    Number(f64),
    Str(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Arguments {
    #[default]
    None,
    Positional(Vec<Expression>),
    Named(BTreeMap<String, Expression>),
}

impl Arguments {
    pub fn len(&self) -> usize {
        match self {
            Arguments::None => 0,
            Arguments::Positional(args) => args.len(),
            Arguments::Named(args) => args.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A parsed or programmatically built query expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Literal),
    Symbol(String),
    Apply {
        head: Box<Expression>,
        args: Arguments,
    },
}

impl Expression {
    pub fn symbol_name(&self) -> Option<&str> {
        match self {
            Expression::Symbol(name) => Some(name),
            _ => None,
        }
    }

    /// Name of the applied symbol, for an application with a symbol head.
    pub fn head_name(&self) -> Option<&str> {
        match self {
            Expression::Apply { head, .. } => head.symbol_name(),
            _ => None,
        }
    }

    /// Nesting depth; a literal or symbol has depth 1.
    pub fn depth(&self) -> usize {
        match self {
            Expression::Literal(_) | Expression::Symbol(_) => 1,
            Expression::Apply { head, args } => {
                let nested = match args {
                    Arguments::None => 0,
                    Arguments::Positional(args) => args.iter().map(|a| a.depth()).max().unwrap_or(0),
                    Arguments::Named(args) => args.values().map(|a| a.depth()).max().unwrap_or(0),
                };
                1 + nested.max(head.depth())
            }
        }
    }
}

impl From<bool> for Expression {
    fn from(value: bool) -> Self {
        Expression::Literal(Literal::Bool(value))
    }
}

impl From<f64> for Expression {
    fn from(value: f64) -> Self {
        Expression::Literal(Literal::Number(value))
    }
}

impl From<u32> for Expression {
    fn from(value: u32) -> Self {
        Expression::Literal(Literal::Number(value as f64))
    }
}

impl From<&str> for Expression {
    fn from(value: &str) -> Self {
        Expression::Literal(Literal::Str(value.to_string()))
    }
}

impl From<String> for Expression {
    fn from(value: String) -> Self {
        Expression::Literal(Literal::Str(value))
    }
}

/// Functions for assembling expressions in code.
pub mod builder {
    use super::{Arguments, Expression};
    use std::collections::BTreeMap;

    pub fn symbol(name: &str) -> Expression {
        Expression::Symbol(name.to_string())
    }

    /// `(name)` with no arguments.
    pub fn call(name: &str) -> Expression {
        Expression::Apply {
            head: Box::new(symbol(name)),
            args: Arguments::None,
        }
    }

    pub fn apply(name: &str, args: Vec<Expression>) -> Expression {
        Expression::Apply {
            head: Box::new(symbol(name)),
            args: if args.is_empty() {
                Arguments::None
            } else {
                Arguments::Positional(args)
            },
        }
    }

    pub fn apply_named<'a>(
        name: &str,
        args: impl IntoIterator<Item = (&'a str, Expression)>,
    ) -> Expression {
        let args: BTreeMap<String, Expression> =
            args.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
        Expression::Apply {
            head: Box::new(symbol(name)),
            args: if args.is_empty() {
                Arguments::None
            } else {
                Arguments::Named(args)
            },
        }
    }

    pub fn num(value: f64) -> Expression {
        value.into()
    }

    pub fn boolean(value: bool) -> Expression {
        value.into()
    }

    pub fn string(value: &str) -> Expression {
        value.into()
    }
}

fn write_string(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    f.write_str("\"")?;
    for ch in value.chars() {
        match ch {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            _ => write!(f, "{ch}")?,
        }
    }
    f.write_str("\"")
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Bool(value) => write!(f, "{value}"),
            Literal::Number(value) => write!(f, "{value}"),
            Literal::Str(value) => write_string(f, value),
        }
    }
}

/// Canonical text form, accepted back by the parser.
impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(literal) => write!(f, "{literal}"),
            Expression::Symbol(name) => f.write_str(name),
            Expression::Apply { head, args } => {
                write!(f, "({head}")?;
                match args {
                    Arguments::None => {}
                    Arguments::Positional(args) => {
                        for arg in args {
                            write!(f, " {arg}")?;
                        }
                    }
                    Arguments::Named(args) => {
                        for (name, arg) in args {
                            write!(f, " :{name} {arg}")?;
                        }
                    }
                }
                f.write_str(")")
            }
        }
    }
}
