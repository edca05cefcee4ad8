//! Tokenizer: turns input bytes into a flat run of [`Token`]s.
//!
//! Token metadata goes to one arena and token payloads to another. The
//! payloads are:
//! - punctuation: a one-byte copy of the character, kept so that the token
//!   stream can be printed uniformly;
//! - strings: the raw bytes between the quotes, with no escape processing;
//! - numbers: the decoded value as 8 little-endian bytes, so the parser never
//!   re-reads digits.
//!
//! A NUL byte or the end of the slice ends the input. Exactly one
//! [`TokenKind::EndOfInput`] token closes every successful run.

use core::fmt;

use bstr::ByteSlice;

use crate::{
    arena::{Arena, Buffer},
    error::{ParseError, SyntaxError},
};


#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TokenKind {
    #[default]
    EndOfInput,
    /// Never produced by [`tokenize`]; lexical errors abort instead.
    Invalid,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Comma,
    Colon,
    String,
    Number,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TokenKind::EndOfInput => "end of input",
            TokenKind::Invalid => "invalid token",
            TokenKind::LeftBrace => "`{`",
            TokenKind::RightBrace => "`}`",
            TokenKind::LeftBracket => "`[`",
            TokenKind::RightBracket => "`]`",
            TokenKind::Comma => "`,`",
            TokenKind::Colon => "`:`",
            TokenKind::String => "string",
            TokenKind::Number => "number",
        })
    }
}

/// One lexical unit. `payload` points into the literal arena.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub payload: Buffer,
    /// Input offset of the token's first byte.
    pub offset: u32,
}

impl Token {
    /// The decoded value of a [`TokenKind::Number`] token.
    #[must_use]
    pub fn number(&self, literals: &Arena<u8>) -> Option<f64> {
        match self.kind {
            TokenKind::Number => literals.read_f64(self.payload),
            _ => None,
        }
    }

    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset as usize
    }
}

/// Scans `input` and appends its tokens to `tokens`, their payloads to
/// `literals`.
///
/// # Errors
///
/// - [`SyntaxError::InvalidCharacter`] for a byte that starts no token;
/// - [`SyntaxError::UnterminatedString`] when a string runs into the end of
///   input;
/// - an arena error when either arena fills up.
pub fn tokenize(
    input: &[u8],
    tokens: &mut Arena<Token>,
    literals: &mut Arena<u8>,
) -> Result<(), ParseError> {
    let first = tokens.used();
    Lexer {
        input,
        pos: 0,
        tokens,
        literals,
    }
    .run()?;
    log::debug!(
        "tokenized {} input bytes into {} tokens, {} literal bytes",
        input.len(),
        tokens.used() - first,
        literals.used()
    );
    Ok(())
}

fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\n' | b'\r' | b'\t')
}

fn reported_char(byte: u8) -> char {
    if byte.is_ascii() {
        char::from(byte)
    } else {
        char::REPLACEMENT_CHARACTER
    }
}

struct Lexer<'src, 'a> {
    input: &'src [u8],
    pos: usize,
    tokens: &'a mut Arena<Token>,
    literals: &'a mut Arena<u8>,
}

impl Lexer<'_, '_> {
    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied().filter(|&byte| byte != 0)
    }

    fn run(&mut self) -> Result<(), ParseError> {
        loop {
            let Some(byte) = self.peek() else {
                return self.push(TokenKind::EndOfInput, Buffer::EMPTY, self.pos);
            };
            match byte {
                b'{' => self.punctuator(TokenKind::LeftBrace, byte)?,
                b'}' => self.punctuator(TokenKind::RightBrace, byte)?,
                b'[' => self.punctuator(TokenKind::LeftBracket, byte)?,
                b']' => self.punctuator(TokenKind::RightBracket, byte)?,
                b',' => self.punctuator(TokenKind::Comma, byte)?,
                b':' => self.punctuator(TokenKind::Colon, byte)?,
                b'"' => self.string()?,
                b'0'..=b'9' => self.number()?,
                _ if is_whitespace(byte) => self.pos += 1,
                _ => {
                    return Err(ParseError::new(
                        SyntaxError::InvalidCharacter(reported_char(byte)),
                        self.pos,
                    ));
                }
            }
        }
    }

    fn punctuator(&mut self, kind: TokenKind, byte: u8) -> Result<(), ParseError> {
        let start = self.pos;
        let payload = self
            .literals
            .push(byte)
            .map_err(|err| ParseError::new(err, start))?;
        self.pos += 1;
        self.push(kind, payload, start)
    }

    fn string(&mut self) -> Result<(), ParseError> {
        let start = self.pos;
        let body = start + 1;
        // The closing quote must come before the end of input.
        let len = match self.input[body..].find_byteset(b"\"\0") {
            Some(len) if self.input[body + len] == b'"' => len,
            _ => return Err(ParseError::new(SyntaxError::UnterminatedString, start)),
        };
        let payload = self
            .literals
            .extend_from_slice(&self.input[body..body + len])
            .map_err(|err| ParseError::new(err, start))?;
        self.pos = body + len + 1;
        self.push(TokenKind::String, payload, start)
    }

    fn number(&mut self) -> Result<(), ParseError> {
        let start = self.pos;
        let mut value = 0.0;
        while let Some(digit) = self.digit() {
            value = value * 10.0 + digit;
        }
        if self.peek() == Some(b'.') {
            self.pos += 1;
            let mut scale = 0.1;
            while let Some(digit) = self.digit() {
                value += scale * digit;
                scale /= 10.0;
            }
        }
        let payload = self
            .literals
            .push_f64(value)
            .map_err(|err| ParseError::new(err, start))?;
        self.push(TokenKind::Number, payload, start)
    }

    /// Consumes one ASCII digit.
    fn digit(&mut self) -> Option<f64> {
        let byte = self.peek().filter(u8::is_ascii_digit)?;
        self.pos += 1;
        Some(f64::from(byte - b'0'))
    }

    fn push(&mut self, kind: TokenKind, payload: Buffer, offset: usize) -> Result<(), ParseError> {
        let token = Token {
            kind,
            payload,
            offset: u32::try_from(offset).unwrap_or(u32::MAX),
        };
        self.tokens
            .push(token)
            .map(|_| ())
            .map_err(|err| ParseError::new(err, offset))
    }
}

/// Debug listing of a token stream: one line per token up to and including
/// the end of input.
///
/// Punctuation and strings print their literal bytes, numbers print with 16
/// fractional digits, and the end of input prints `EOF`.
pub struct TokenDump<'a> {
    tokens: &'a [Token],
    literals: &'a Arena<u8>,
}

impl<'a> TokenDump<'a> {
    #[must_use]
    pub fn new(tokens: &'a [Token], literals: &'a Arena<u8>) -> Self {
        Self { tokens, literals }
    }
}

impl fmt::Display for TokenDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in self.tokens {
            match token.kind {
                TokenKind::EndOfInput => return writeln!(f, "EOF"),
                TokenKind::Invalid => writeln!(f, "Invalid")?,
                TokenKind::Number => match token.number(self.literals) {
                    Some(value) => writeln!(f, "{value:.16}")?,
                    None => writeln!(f, "Invalid")?,
                },
                TokenKind::LeftBrace
                | TokenKind::RightBrace
                | TokenKind::LeftBracket
                | TokenKind::RightBracket
                | TokenKind::Comma
                | TokenKind::Colon
                | TokenKind::String => writeln!(f, "{}", self.literals.bytes(token.payload))?,
            }
        }
        Ok(())
    }
}
