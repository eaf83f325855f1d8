use super::config::ConfigError;
use crate::core::element::query::ReplayError;
use crate::core::structure::PropertyError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq, Hash)]
pub enum ParseError {
    #[error("Unexpected end of input")]
    UnexpectedEnd,
    #[error("Unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },
    #[error("Unterminated string starting at offset {0}")]
    UnterminatedString(usize),
    #[error("Invalid escape sequence at offset {0}")]
    InvalidEscape(usize),
    #[error("Empty application at offset {0}")]
    EmptyApplication(usize),
    #[error("Named argument ':{name}' at offset {offset} has no value")]
    MissingNamedValue { name: String, offset: usize },
    #[error("Positional and named arguments mixed at offset {0}")]
    MixedArguments(usize),
    #[error("Duplicate named argument ':{name}' at offset {offset}")]
    DuplicateArgument { name: String, offset: usize },
    #[error("Expression nesting exceeds {max} levels at offset {offset}")]
    NestingTooDeep { max: usize, offset: usize },
    #[error("Unexpected trailing input at offset {0}")]
    TrailingInput(usize),
}

/// Compilation failures. `path` names the offending argument, e.g.
/// `root/atom-test/0`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CompileError {
    #[error("Unresolved symbol '{name}' at {path}")]
    UnresolvedSymbol { name: String, path: String },
    #[error("Symbol '{symbol}' is missing required argument '{argument}' at {path}")]
    MissingArgument {
        symbol: String,
        argument: String,
        path: String,
    },
    #[error("Symbol '{symbol}' does not accept argument '{argument}' at {path}")]
    UnexpectedArgument {
        symbol: String,
        argument: String,
        path: String,
    },
    #[error("Symbol '{symbol}' expects {expected} arguments, got {found} at {path}")]
    Arity {
        symbol: String,
        expected: String,
        found: usize,
        path: String,
    },
    #[error("Application head must be a symbol at {path}")]
    InvalidHead { path: String },
    #[error("Expression nesting exceeds {max} levels at {path}")]
    NestingTooDeep { max: usize, path: String },
    #[error("Constant evaluation failed at {path}: {source}")]
    ConstantEvaluation {
        path: String,
        #[source]
        source: Box<QueryError>,
    },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum QueryError {
    #[error("Symbol '{symbol}' expected {expected}, got {found}")]
    TypeMismatch {
        symbol: &'static str,
        expected: &'static str,
        found: &'static str,
    },
    #[error("Invalid argument to '{symbol}': {message}")]
    InvalidArgument {
        symbol: &'static str,
        message: String,
    },
    #[error("Property access failed: {source}")]
    Property {
        #[from]
        source: PropertyError,
    },
    #[error("No current element; '{0}' must be evaluated inside a generator or given a location")]
    NoCurrentElement(&'static str),
    #[error("No current link; '{0}' must be evaluated inside a bond test")]
    NoCurrentLink(&'static str),
    #[error("No current structure; '{0}' must be evaluated inside a filter")]
    NoCurrentStructure(&'static str),
    #[error("Invalid regular expression '{pattern}': {message}")]
    InvalidRegex { pattern: String, message: String },
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),
    #[error("Query evaluation failed: {0}")]
    Query(#[from] QueryError),
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Query replay failed: {0}")]
    Replay(#[from] ReplayError),
}
