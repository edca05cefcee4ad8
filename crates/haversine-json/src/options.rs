use core::mem::size_of;

use crate::value::INITIAL_CAPACITY;

/// Default for [`ParserOptions::max_depth`].
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Configuration for [`parse`](crate::parse).
///
/// # Examples
///
/// ```rust
/// use haversine_json::{ArenaCapacities, ParserOptions, parse};
///
/// let options = ParserOptions {
///     capacities: Some(ArenaCapacities {
///         tokens: 64,
///         literal_bytes: 256,
///         tree_slots: 64,
///     }),
///     ..Default::default()
/// };
/// let doc = parse(br#"{"pairs":[]}"#, options).unwrap();
/// assert_eq!(doc.root().len(), 1);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ParserOptions {
    /// Fixed arena sizes.
    ///
    /// # Default
    ///
    /// `None`: limits derived from the input length with
    /// [`ArenaCapacities::for_input_len`], which no well-formed input can
    /// exhaust.
    pub capacities: Option<ArenaCapacities>,

    /// Whether tokens may follow the root object.
    ///
    /// When `false`, anything but end of input after the closing `}` of the
    /// root is a syntax error. When `true`, the rest of the token stream is
    /// ignored once the root object is complete.
    ///
    /// # Default
    ///
    /// `false`
    pub allow_trailing_tokens: bool,

    /// How many objects and arrays may be nested, the root object included.
    ///
    /// # Default
    ///
    /// [`DEFAULT_MAX_DEPTH`]
    pub max_depth: usize,

    #[cfg(any(test, feature = "fuzzing"))]
    /// Panic on fatal errors instead of returning them.
    ///
    /// Enabled only in test builds to produce backtraces on parse failures.
    pub panic_on_error: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            capacities: None,
            allow_trailing_tokens: false,
            max_depth: DEFAULT_MAX_DEPTH,
            #[cfg(any(test, feature = "fuzzing"))]
            panic_on_error: false,
        }
    }
}

/// Element capacities of the three parsing arenas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaCapacities {
    /// Tokens, including the final end-of-input token.
    pub tokens: usize,
    /// Bytes of string payloads, punctuation copies and encoded numbers.
    pub literal_bytes: usize,
    /// Slots in each of the two tree pools (object keys and values).
    pub tree_slots: usize,
}

impl ArenaCapacities {
    /// Worst-case limits for an input of `len` bytes.
    ///
    /// These are limits only: arenas grow their storage on demand, so the
    /// memory actually held follows what the input uses.
    ///
    /// - every token but the last consumes at least one byte;
    /// - a number writes 8 literal bytes for at least one input byte;
    /// - a container consumes at least two bytes and takes
    ///   [`INITIAL_CAPACITY`] slots up front. Once it holds `n` elements,
    ///   doubling has taken fewer than `4n` slots in total: under `2n` in
    ///   the live region and under `2n` of dead space.
    #[must_use]
    pub fn for_input_len(len: usize) -> Self {
        Self {
            tokens: len.saturating_add(1),
            literal_bytes: len.saturating_mul(size_of::<f64>()),
            tree_slots: len.saturating_mul(9).saturating_add(INITIAL_CAPACITY),
        }
    }
}
