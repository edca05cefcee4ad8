use core::fmt;

use thiserror::Error;

use crate::{arena::ArenaError, lexer::TokenKind};

/// A fatal condition, together with the input byte offset where it was
/// detected.
///
/// Parsing stops at the first error and nothing that was built before it is
/// handed back.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{source} at byte {offset}")]
pub struct ParseError {
    pub(crate) source: ErrorSource,
    pub(crate) offset: usize,
}

impl ParseError {
    pub(crate) fn new(source: impl Into<ErrorSource>, offset: usize) -> Self {
        let err = Self {
            source: source.into(),
            offset,
        };
        log::debug!("json parse aborted: {err}");
        err
    }

    #[must_use]
    pub fn kind(&self) -> &ErrorSource {
        &self.source
    }

    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorSource {
    #[error("allocation error: {0}")]
    Arena(#[from] ArenaError),
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxError {
    /// A byte outside every lexical class. Non-ASCII bytes are reported as
    /// U+FFFD.
    #[error("invalid character {0:?}")]
    InvalidCharacter(char),
    #[error("unterminated string")]
    UnterminatedString,
    #[error("expected {expected}, found {found}")]
    UnexpectedToken { expected: Expected, found: TokenKind },
    #[error("nesting deeper than {0} levels")]
    TooDeep(usize),
}

/// What the parser was looking for when it hit an unexpected token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    Value,
    ObjectStart,
    ArrayStart,
    Key,
    Colon,
    CommaOrObjectEnd,
    CommaOrArrayEnd,
    EndOfInput,
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Expected::Value => "a value",
            Expected::ObjectStart => "`{`",
            Expected::ArrayStart => "`[`",
            Expected::Key => "an object key",
            Expected::Colon => "`:`",
            Expected::CommaOrObjectEnd => "`,` or `}`",
            Expected::CommaOrArrayEnd => "`,` or `]`",
            Expected::EndOfInput => "end of input",
        })
    }
}
