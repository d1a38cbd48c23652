#![allow(clippy::struct_excessive_bools)]

use alloc::{string::String, vec::Vec};

/// Configuration for a standalone [`Tokenizer`](crate::Tokenizer).
///
/// # Default
///
/// Unbounded accumulators, no separator (a single top-level value), no
/// partial tokens.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenizerOptions {
    /// Capacity of the scratch buffer strings are accumulated in before being
    /// decoded into the token value.
    ///
    /// Values of 4 or less (the longest UTF-8 sequence) leave string
    /// accumulation unbounded.
    ///
    /// # Default
    ///
    /// `0`
    pub string_buffer_size: usize,

    /// Capacity of the scratch buffer numbers are accumulated in.
    ///
    /// `0` leaves number accumulation unbounded.
    ///
    /// # Default
    ///
    /// `0`
    pub number_buffer_size: usize,

    /// Byte sequence expected between top-level values.
    ///
    /// Only non-empty separators are matched by the tokenizer; see
    /// [`JsonParserOptions::separator`] for the full semantics.
    ///
    /// # Default
    ///
    /// `None`
    pub separator: Option<String>,

    /// Whether to emit an incomplete token at the end of every `write` that
    /// leaves a literal, string or number open.
    ///
    /// # Default
    ///
    /// `false`
    pub emit_partial_tokens: bool,
}

/// Configuration for a standalone [`TokenParser`](crate::TokenParser).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenParserOptions {
    /// Selector paths deciding which values are emitted.
    ///
    /// Each path starts with `$` and is split on `.`; a `*` segment matches
    /// any key. `"$*"` matches everything.
    ///
    /// # Default
    ///
    /// `None` (emit every value)
    pub paths: Option<Vec<String>>,

    /// Whether values stay attached to their parent containers after the
    /// emission decision.
    ///
    /// With `false`, a value is dropped from its parent once no ancestor was
    /// selected, which keeps memory flat on huge arrays and objects.
    ///
    /// # Default
    ///
    /// `true`
    pub keep_stack: bool,

    /// Separator token expected between top-level values.
    ///
    /// # Default
    ///
    /// `None`
    pub separator: Option<String>,

    /// Whether incomplete tokens produce `partial` emissions.
    ///
    /// # Default
    ///
    /// `false`
    pub emit_partial_values: bool,
}

impl Default for TokenParserOptions {
    fn default() -> Self {
        Self {
            paths: None,
            keep_stack: true,
            separator: None,
            emit_partial_values: false,
        }
    }
}

/// Configuration for a [`JsonParser`](crate::JsonParser).
///
/// # Examples
///
/// ```rust
/// use jsonpipe::{JsonParser, JsonParserOptions};
///
/// let options = JsonParserOptions {
///     separator: Some("\n".into()),
///     paths: Some(vec!["$.id".into()]),
///     ..Default::default()
/// };
/// let parser = JsonParser::new(options).unwrap();
/// assert!(!parser.is_ended());
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonParserOptions {
    /// See [`TokenizerOptions::string_buffer_size`].
    pub string_buffer_size: usize,

    /// See [`TokenizerOptions::number_buffer_size`].
    pub number_buffer_size: usize,

    /// Separator between top-level values.
    ///
    /// - `None`: the parser ends on its own after one top-level value.
    /// - `Some("")`: any number of concatenated top-level values.
    /// - `Some(sep)`: top-level values must be delimited by exactly `sep`
    ///   (for example `"\n"` for ND-JSON).
    ///
    /// # Default
    ///
    /// `None`
    pub separator: Option<String>,

    /// See [`TokenParserOptions::paths`].
    pub paths: Option<Vec<String>>,

    /// See [`TokenParserOptions::keep_stack`].
    ///
    /// # Default
    ///
    /// `true`
    pub keep_stack: bool,

    /// See [`TokenizerOptions::emit_partial_tokens`].
    pub emit_partial_tokens: bool,

    /// See [`TokenParserOptions::emit_partial_values`]. Enabling this also
    /// enables partial tokens.
    pub emit_partial_values: bool,
}

impl Default for JsonParserOptions {
    fn default() -> Self {
        Self {
            string_buffer_size: 0,
            number_buffer_size: 0,
            separator: None,
            paths: None,
            keep_stack: true,
            emit_partial_tokens: false,
            emit_partial_values: false,
        }
    }
}

impl JsonParserOptions {
    /// The tokenizer half of this configuration.
    #[must_use]
    pub fn tokenizer_options(&self) -> TokenizerOptions {
        TokenizerOptions {
            string_buffer_size: self.string_buffer_size,
            number_buffer_size: self.number_buffer_size,
            separator: self.separator.clone(),
            emit_partial_tokens: self.emit_partial_tokens || self.emit_partial_values,
        }
    }

    /// The token parser half of this configuration.
    #[must_use]
    pub fn token_parser_options(&self) -> TokenParserOptions {
        TokenParserOptions {
            paths: self.paths.clone(),
            keep_stack: self.keep_stack,
            separator: self.separator.clone(),
            emit_partial_values: self.emit_partial_values,
        }
    }
}

/// Configuration for an [`OptimisticParser`](crate::OptimisticParser).
///
/// Partial tokens are always on; they are what keeps the live value current.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptimisticParserOptions {
    /// See [`TokenizerOptions::string_buffer_size`].
    pub string_buffer_size: usize,

    /// See [`TokenizerOptions::number_buffer_size`].
    pub number_buffer_size: usize,

    /// See [`JsonParserOptions::separator`]. Each new top-level value
    /// replaces the previous one.
    pub separator: Option<String>,
}

impl OptimisticParserOptions {
    /// The tokenizer half of this configuration.
    #[must_use]
    pub fn tokenizer_options(&self) -> TokenizerOptions {
        TokenizerOptions {
            string_buffer_size: self.string_buffer_size,
            number_buffer_size: self.number_buffer_size,
            separator: self.separator.clone(),
            emit_partial_tokens: true,
        }
    }
}
