//! Tokenizer for query text.

use super::error::ParseError;
use chumsky::prelude::*;
use std::ops::Range;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Token {
    LParen,
    RParen,
    /// `:name`. Empty when the colon stands alone.
    Name(String),
    Str(String),
    Word(String),
    /// A string literal that could not be decoded.
    Malformed(ParseError),
}

pub type Span = Range<usize>;

fn is_delimiter(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, '(' | ')' | '"' | ';')
}

#[derive(Clone, Debug)]
enum Piece {
    Char(char),
    Escape(Option<char>, usize),
}

/// Every input tokenizes; bad string literals come out as
/// [`Token::Malformed`] so the parser can report them in order.
pub fn lexer() -> impl Parser<char, Vec<(Token, Span)>, Error = Simple<char>> {
    let word_char = filter(|c: &char| !is_delimiter(*c));

    let word = filter(|c: &char| !is_delimiter(*c) && *c != ':')
        .chain(word_char.clone().repeated())
        .collect::<String>()
        .map(Token::Word);

    let name = just(':')
        .ignore_then(word_char.repeated())
        .collect::<String>()
        .map(Token::Name);

    let piece = just('\\')
        .ignore_then(any().or_not())
        .map_with_span(|escaped, span: Span| Piece::Escape(escaped, span.start))
        .or(none_of("\\\"").map(Piece::Char));

    let string = just('"')
        .ignore_then(piece.repeated())
        .then(just('"').or_not())
        .map_with_span(|(pieces, close), span: Span| {
            decode_string(pieces, close.is_some(), span.start)
        });

    let comment = just(';').then(none_of('\n').repeated()).ignored();

    let token = choice((
        just('(').to(Token::LParen),
        just(')').to(Token::RParen),
        string,
        name,
        word,
    ));

    comment
        .to(None::<Token>)
        .or(token.map(Some))
        .map_with_span(|token, span| token.map(|token| (token, span)))
        .padded()
        .repeated()
        .padded()
        .then_ignore(end())
        .map(|items| items.into_iter().flatten().collect())
}

fn decode_string(pieces: Vec<Piece>, closed: bool, start: usize) -> Token {
    let mut value = String::with_capacity(pieces.len());
    for piece in pieces {
        match piece {
            Piece::Char(ch) => value.push(ch),
            Piece::Escape(Some('"'), _) => value.push('"'),
            Piece::Escape(Some('\\'), _) => value.push('\\'),
            Piece::Escape(Some('n'), _) => value.push('\n'),
            Piece::Escape(Some('t'), _) => value.push('\t'),
            Piece::Escape(Some(_), offset) => {
                return Token::Malformed(ParseError::InvalidEscape(offset));
            }
            Piece::Escape(None, _) => {
                return Token::Malformed(ParseError::UnterminatedString(start));
            }
        }
    }
    if closed {
        Token::Str(value)
    } else {
        Token::Malformed(ParseError::UnterminatedString(start))
    }
}
