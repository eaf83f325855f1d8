//! # Expression Text Syntax
//!
//! Queries are written as S-expressions:
//!
//! ```text
//! (structure-query.generator.atom-groups
//!   :residue-test (core.rel.eq (structure-query.atom-property.macromolecular.label_comp_id) ALA))
//! ```
//!
//! An application either lists positional arguments or `:name value` pairs,
//! never both. Numbers, `true`/`false` and double-quoted strings are
//! literals. A bare word in head position is always a symbol; in argument
//! position it is a symbol when it contains a `.` or is a known alias, and a
//! string otherwise. `;` starts a comment that runs to the end of the line.
//!
//! The grammar itself only balances parentheses; argument shapes are checked
//! on the resulting tree so errors point at the offending token.

use super::config::DEFAULT_MAX_NESTING_DEPTH;
use super::error::ParseError;
use super::expression::{Arguments, Expression, Literal};
use super::lexer::{Span, Token, lexer};
use super::symbols::is_alias;
use chumsky::Stream;
use chumsky::prelude::*;
use std::collections::BTreeMap;

pub fn parse(source: &str) -> Result<Expression, ParseError> {
    parse_with_max_depth(source, DEFAULT_MAX_NESTING_DEPTH)
}

/// Parses one expression. Nesting counts parentheses only, the same way the
/// compiler counts applications.
pub fn parse_with_max_depth(source: &str, max_depth: usize) -> Result<Expression, ParseError> {
    let tokens = lexer().parse(source).map_err(|errors| lex_error(&errors))?;
    check_tokens(&tokens, max_depth)?;

    let len = source.len();
    let (root, trailing) = node()
        .then(any().map_with_span(|_, span: Span| span.start).or_not())
        .parse(Stream::from_iter(len..len + 1, tokens.into_iter()))
        .map_err(|errors| syntax_error(&errors))?;
    if let Some(offset) = trailing {
        return Err(ParseError::TrailingInput(offset));
    }
    expression(&root, Role::Argument)
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Word(String),
    Str(String),
    Name(String),
    List(Vec<(Node, Span)>),
}

fn node() -> impl Parser<Token, (Node, Span), Error = Simple<Token>> + Clone {
    recursive(|node| {
        let atom = select! {
            Token::Word(word) => Node::Word(word),
            Token::Str(value) => Node::Str(value),
            Token::Name(name) => Node::Name(name),
        };
        let list = node
            .repeated()
            .delimited_by(just(Token::LParen), just(Token::RParen))
            .map(Node::List);
        atom.or(list).map_with_span(|node, span| (node, span))
    })
}

/// Runs before the grammar so deep input never reaches the recursive parser.
fn check_tokens(tokens: &[(Token, Span)], max_depth: usize) -> Result<(), ParseError> {
    let mut depth = 0usize;
    for (token, span) in tokens {
        match token {
            Token::Malformed(error) => return Err(error.clone()),
            Token::LParen => {
                depth += 1;
                if depth > max_depth {
                    return Err(ParseError::NestingTooDeep {
                        max: max_depth,
                        offset: span.start,
                    });
                }
            }
            Token::RParen => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Ok(())
}

fn lex_error(errors: &[Simple<char>]) -> ParseError {
    match errors.first() {
        Some(error) => match error.found() {
            Some(&ch) => ParseError::UnexpectedChar {
                ch,
                offset: error.span().start,
            },
            None => ParseError::UnexpectedEnd,
        },
        None => ParseError::UnexpectedEnd,
    }
}

fn syntax_error(errors: &[Simple<Token>]) -> ParseError {
    let Some(error) = errors.first() else {
        return ParseError::UnexpectedEnd;
    };
    match error.found() {
        None => ParseError::UnexpectedEnd,
        Some(Token::Malformed(malformed)) => malformed.clone(),
        Some(token) => ParseError::UnexpectedChar {
            ch: leading_char(token),
            offset: error.span().start,
        },
    }
}

fn leading_char(token: &Token) -> char {
    match token {
        Token::LParen => '(',
        Token::RParen => ')',
        Token::Name(_) => ':',
        Token::Str(_) | Token::Malformed(_) => '"',
        Token::Word(word) => word.chars().next().unwrap_or(' '),
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Role {
    Head,
    Argument,
}

fn expression((node, span): &(Node, Span), role: Role) -> Result<Expression, ParseError> {
    match node {
        Node::Word(word) => Ok(atom(word, role)),
        Node::Str(value) => Ok(Expression::Literal(Literal::Str(value.clone()))),
        Node::Name(_) => Err(ParseError::UnexpectedChar {
            ch: ':',
            offset: span.start,
        }),
        Node::List(items) => application(items, span.start),
    }
}

fn application(items: &[(Node, Span)], start: usize) -> Result<Expression, ParseError> {
    let Some((head, rest)) = items.split_first() else {
        return Err(ParseError::EmptyApplication(start));
    };
    let head = expression(head, Role::Head)?;

    let mut positional = Vec::new();
    let mut named = BTreeMap::new();
    let mut rest = rest.iter();
    while let Some(item) = rest.next() {
        let offset = item.1.start;
        let Node::Name(name) = &item.0 else {
            if !named.is_empty() {
                return Err(ParseError::MixedArguments(offset));
            }
            positional.push(expression(item, Role::Argument)?);
            continue;
        };
        if !positional.is_empty() {
            return Err(ParseError::MixedArguments(offset));
        }
        if name.is_empty() {
            return Err(ParseError::UnexpectedChar { ch: ':', offset });
        }
        let value = match rest.next() {
            Some(value) if !matches!(value.0, Node::Name(_)) => {
                expression(value, Role::Argument)?
            }
            _ => {
                return Err(ParseError::MissingNamedValue {
                    name: name.clone(),
                    offset,
                });
            }
        };
        if named.contains_key(name) {
            return Err(ParseError::DuplicateArgument {
                name: name.clone(),
                offset,
            });
        }
        named.insert(name.clone(), value);
    }

    let args = if !named.is_empty() {
        Arguments::Named(named)
    } else if !positional.is_empty() {
        Arguments::Positional(positional)
    } else {
        Arguments::None
    };
    Ok(Expression::Apply {
        head: Box::new(head),
        args,
    })
}

fn atom(word: &str, role: Role) -> Expression {
    match word {
        "true" => return Expression::Literal(Literal::Bool(true)),
        "false" => return Expression::Literal(Literal::Bool(false)),
        _ => {}
    }
    if let Some(number) = parse_number(word) {
        return Expression::Literal(Literal::Number(number));
    }
    if role == Role::Head || word.contains('.') || is_alias(word) {
        Expression::Symbol(word.to_string())
    } else {
        Expression::Literal(Literal::Str(word.to_string()))
    }
}

/// Only words that start like a number are numbers, so `inf` or `nan`
/// stay strings.
fn parse_number(word: &str) -> Option<f64> {
    let mut chars = word.chars();
    let first = chars.next()?;
    let starts_numeric = match first {
        '0'..='9' => true,
        '-' | '+' | '.' => chars.next().is_some_and(|c| c.is_ascii_digit() || c == '.'),
        _ => false,
    };
    if !starts_numeric {
        return None;
    }
    word.parse::<f64>().ok().filter(|n| n.is_finite())
}
