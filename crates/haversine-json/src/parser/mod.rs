//! Recursive descent over the token stream.
//!
//! [`parse`] runs the whole pipeline: it sizes three arenas, tokenizes the
//! input into the first two and builds the tree in the third. The grammar is
//!
//! ```text
//! document := object
//! object   := '{' '}' | '{' member (',' member)* '}'
//! member   := string ':' value
//! array    := '[' ']' | '[' value (',' value)* ']'
//! value    := string | number | object | array
//! ```
//!
//! The cursor only moves forward. Any mismatch aborts the parse; the
//! arenas built so far are dropped along with the error.

use crate::{
    arena::{Arena, ArenaUsage},
    error::{Expected, ParseError, SyntaxError},
    lexer::{self, Token, TokenDump, TokenKind},
    options::{ArenaCapacities, ParserOptions},
    value::{JsonArray, JsonObject, ObjectRef, Store, TreeArena, Value},
};


/// A parsed input: the root object and the arenas its handles point into.
#[derive(Debug)]
pub struct Document {
    tokens: Arena<Token>,
    literals: Arena<u8>,
    tree: TreeArena,
    root: JsonObject,
}

/// Per-arena accounting of a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentUsage {
    pub tokens: ArenaUsage,
    pub literals: ArenaUsage,
    pub keys: ArenaUsage,
    pub values: ArenaUsage,
}

impl Document {
    #[must_use]
    pub fn root(&self) -> ObjectRef<'_> {
        Store {
            literals: &self.literals,
            tree: &self.tree,
        }
        .object(self.root)
    }

    /// The token stream, ending with [`TokenKind::EndOfInput`].
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        self.tokens.as_slice()
    }

    #[must_use]
    pub fn literals(&self) -> &Arena<u8> {
        &self.literals
    }

    #[must_use]
    pub fn tree(&self) -> &TreeArena {
        &self.tree
    }

    /// Debug listing of the token stream.
    #[must_use]
    pub fn dump_tokens(&self) -> TokenDump<'_> {
        TokenDump::new(self.tokens.as_slice(), &self.literals)
    }

    #[must_use]
    pub fn arena_usage(&self) -> DocumentUsage {
        let [keys, values] = self.tree.usage();
        DocumentUsage {
            tokens: self.tokens.usage(),
            literals: self.literals.usage(),
            keys,
            values,
        }
    }
}

/// Parses `input` into a [`Document`] whose root is an object.
///
/// # Errors
///
/// The first fatal condition: an invalid byte, an unterminated string, a
/// grammar violation, nesting beyond [`ParserOptions::max_depth`] or an
/// exhausted arena.
///
/// # Examples
///
/// ```rust
/// use haversine_json::{ParserOptions, parse};
///
/// let doc = parse(br#"{"pairs":[{"x0":1.5}]}"#, ParserOptions::default()).unwrap();
/// let pairs = doc.root().get("pairs").and_then(|v| v.as_array()).unwrap();
/// let x0 = pairs.get(0).and_then(|v| v.as_object()).and_then(|o| o.get("x0"));
/// assert_eq!(x0.and_then(|v| v.as_number()), Some(1.5));
/// ```
pub fn parse(input: &[u8], options: ParserOptions) -> Result<Document, ParseError> {
    let result = build(input, &options);

    #[cfg(any(test, feature = "fuzzing"))]
    if options.panic_on_error {
        if let Err(err) = &result {
            panic!("{err}");
        }
    }

    result
}

fn build(input: &[u8], options: &ParserOptions) -> Result<Document, ParseError> {
    let capacities = options
        .capacities
        .unwrap_or_else(|| ArenaCapacities::for_input_len(input.len()));

    let mut tokens = Arena::with_capacity("tokens", capacities.tokens);
    let mut literals = Arena::with_capacity("literals", capacities.literal_bytes);
    lexer::tokenize(input, &mut tokens, &mut literals)?;

    let mut tree = TreeArena::with_capacity(capacities.tree_slots);
    let root = Parser {
        tokens: tokens.as_slice(),
        pos: 0,
        literals: &literals,
        tree: &mut tree,
        depth: 0,
        max_depth: options.max_depth,
    }
    .parse_document(options.allow_trailing_tokens)?;

    log::debug!(
        "parsed {} root members using {} key and {} value slots",
        root.len(),
        tree.keys().used(),
        tree.values().used()
    );

    Ok(Document {
        tokens,
        literals,
        tree,
        root,
    })
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    literals: &'a Arena<u8>,
    tree: &'a mut TreeArena,
    depth: usize,
    max_depth: usize,
}

impl Parser<'_> {
    fn parse_document(&mut self, allow_trailing_tokens: bool) -> Result<JsonObject, ParseError> {
        let root = self.parse_object()?;
        let next = self.peek();
        if !allow_trailing_tokens && next.kind != TokenKind::EndOfInput {
            return Err(unexpected(Expected::EndOfInput, next));
        }
        Ok(root)
    }

    fn parse_value(&mut self) -> Result<Value, ParseError> {
        let token = self.peek();
        match token.kind {
            TokenKind::String => {
                self.bump();
                Ok(Value::String(token.payload))
            }
            TokenKind::Number => {
                let Some(n) = token.number(self.literals) else {
                    return Err(unexpected(Expected::Value, token));
                };
                self.bump();
                Ok(Value::Number(n))
            }
            TokenKind::LeftBrace => self.parse_object().map(Value::Object),
            TokenKind::LeftBracket => self.parse_array().map(Value::Array),
            _ => Err(unexpected(Expected::Value, token)),
        }
    }

    fn parse_object(&mut self) -> Result<JsonObject, ParseError> {
        let open = self.expect(TokenKind::LeftBrace, Expected::ObjectStart)?;
        self.descend(open)?;
        let mut object = JsonObject::with_initial_capacity(self.tree)
            .map_err(|err| ParseError::new(err, open.offset()))?;

        if self.peek().kind == TokenKind::RightBrace {
            self.bump();
            self.depth -= 1;
            return Ok(object);
        }

        loop {
            let key = self.expect(TokenKind::String, Expected::Key)?;
            self.expect(TokenKind::Colon, Expected::Colon)?;
            let value = self.parse_value()?;
            object
                .push(self.tree, key.payload, value)
                .map_err(|err| ParseError::new(err, key.offset()))?;

            let next = self.bump();
            match next.kind {
                TokenKind::Comma => {}
                TokenKind::RightBrace => break,
                _ => return Err(unexpected(Expected::CommaOrObjectEnd, next)),
            }
        }

        self.depth -= 1;
        Ok(object)
    }

    fn parse_array(&mut self) -> Result<JsonArray, ParseError> {
        let open = self.expect(TokenKind::LeftBracket, Expected::ArrayStart)?;
        self.descend(open)?;
        let mut array = JsonArray::with_initial_capacity(self.tree)
            .map_err(|err| ParseError::new(err, open.offset()))?;

        if self.peek().kind == TokenKind::RightBracket {
            self.bump();
            self.depth -= 1;
            return Ok(array);
        }

        loop {
            let first = self.peek();
            let value = self.parse_value()?;
            array
                .push(self.tree, value)
                .map_err(|err| ParseError::new(err, first.offset()))?;

            let next = self.bump();
            match next.kind {
                TokenKind::Comma => {}
                TokenKind::RightBracket => break,
                _ => return Err(unexpected(Expected::CommaOrArrayEnd, next)),
            }
        }

        self.depth -= 1;
        Ok(array)
    }

    fn descend(&mut self, open: Token) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(ParseError::new(
                SyntaxError::TooDeep(self.max_depth),
                open.offset(),
            ));
        }
        Ok(())
    }

    /// The current token. Past the end this is a default token, which is
    /// end of input.
    fn peek(&self) -> Token {
        self.tokens.get(self.pos).copied().unwrap_or_default()
    }

    /// Consumes and returns the current token.
    fn bump(&mut self) -> Token {
        let token = self.peek();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, kind: TokenKind, expected: Expected) -> Result<Token, ParseError> {
        let token = self.bump();
        if token.kind == kind {
            Ok(token)
        } else {
            Err(unexpected(expected, token))
        }
    }
}

fn unexpected(expected: Expected, found: Token) -> ParseError {
    ParseError::new(
        SyntaxError::UnexpectedToken {
            expected,
            found: found.kind,
        },
        found.offset(),
    )
}
