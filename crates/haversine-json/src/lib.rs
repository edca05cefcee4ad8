//! Arena-backed JSON front end for the haversine benchmark.
//!
//! Input bytes go through three phases, each with its own arena:
//!
//! 1. [`tokenize`] scans the input into [`Token`]s. Token metadata goes to
//!    the token arena and payloads to the literal arena. Numbers are decoded
//!    here, once.
//! 2. The parser walks the tokens by recursive descent and builds a tree of
//!    [`Value`]s in a [`TreeArena`].
//! 3. The caller queries the resulting [`Document`] through [`ObjectRef`],
//!    [`ArrayRef`] and [`ValueRef`].
//!
//! The grammar is a subset of JSON: objects, arrays, strings without escape
//! processing, and unsigned decimal numbers without exponents. The document
//! root must be an object. Every violation is fatal and comes back as a
//! [`ParseError`]; no partial tree is ever returned.
//!
//! ```rust
//! use haversine_json::{ParserOptions, parse};
//!
//! let doc = parse(br#"{"pairs":[{"x0":0,"y0":0,"x1":0,"y1":0}]}"#, ParserOptions::default())?;
//! let pairs = doc.root().get("pairs").and_then(|v| v.as_array()).unwrap();
//! assert_eq!(pairs.len(), 1);
//! # Ok::<(), haversine_json::ParseError>(())
//! ```

#![no_std]
#![allow(missing_docs)]
extern crate alloc;

#[cfg(test)]
extern crate std;

mod arena;
mod error;
mod lexer;
mod options;
mod parser;
mod value;

#[cfg(test)]
mod tests;

pub use arena::{Arena, ArenaError, ArenaUsage, Buffer, Region};
pub use bstr::BStr;
pub use error::{ErrorSource, Expected, ParseError, SyntaxError};
pub use lexer::{Token, TokenDump, TokenKind, tokenize};
pub use options::{ArenaCapacities, DEFAULT_MAX_DEPTH, ParserOptions};
pub use parser::{Document, DocumentUsage, parse};
pub use value::{
    ArrayRef, INITIAL_CAPACITY, JsonArray, JsonObject, ObjectRef, TreeArena, Value, ValueRef,
};
