//! Incremental JSON parsing over byte chunks of any size.
//!
//! The pipeline has two stages. A [`Tokenizer`] turns bytes into
//! [`ParsedToken`]s; a [`TokenParser`] assembles tokens into [`Value`]s and
//! reports the ones a JSONPath-like [`Selector`] accepts. [`JsonParser`] wires
//! both together and is the usual entry point.
//!
//! Values are pushed into a [`ValueHandler`] as soon as they are complete,
//! innermost first, so huge arrays and newline-delimited streams can be
//! consumed without holding the whole document:
//!
//! ```
//! use jsonpipe::{JsonParser, JsonParserOptions, ParsedElement, value_fn};
//!
//! let mut seen = Vec::new();
//! let options = JsonParserOptions {
//!     paths: Some(vec!["$.*".into()]),
//!     keep_stack: false,
//!     ..Default::default()
//! };
//! let handler = value_fn(|el: ParsedElement<'_>| {
//!     seen.push(el.value.map(ToString::to_string));
//!     Ok(())
//! });
//! let mut parser = JsonParser::with_handler(options, handler).unwrap();
//! parser.write(r#"[{"a": 1}, "b", "#).unwrap();
//! parser.write("[null]]").unwrap();
//! assert!(parser.is_ended());
//! drop(parser);
//! assert_eq!(
//!     seen,
//!     vec![
//!         Some(r#"{"a":1}"#.to_string()),
//!         Some(r#""b""#.to_string()),
//!         Some("[null]".to_string()),
//!     ]
//! );
//! ```
//!
//! # Ancestors
//!
//! Open containers are owned by the parser while they are built, so the
//! [`StackFrame`]s seen through [`ParsedElement::stack`] hold each ancestor
//! with the children completed so far. The branch that is still open is
//! missing from it: while `1` in `{"x":0,"a":{"b":1}}` is reported, the root
//! frame holds `{"x":0}`. Use [`ParsedElement::parent`] for the direct
//! container and [`ParsedElement::path`] to locate a value.
#![no_std]
extern crate alloc;

#[cfg(test)]
extern crate std;

mod bom;
mod buffered_string;
mod escape_buffer;

mod error;
mod handler;
mod json_parser;
mod optimistic;
mod options;
mod path;
mod selector;
mod token;
mod token_parser;
mod tokenizer;
mod value;

#[cfg(test)]
mod tests;

pub use error::{ParseError, SelectorError, TokenParserError, TokenizerError};
pub use handler::{
    ParsedElement, TokenFn, TokenHandler, Unset, ValueFn, ValueHandler, token_fn, value_fn,
};
pub use json_parser::JsonParser;
pub use optimistic::OptimisticParser;
pub use options::{
    JsonParserOptions, OptimisticParserOptions, TokenParserOptions, TokenizerOptions,
};
#[doc(hidden)]
pub use path::PathItemFrom;
pub use path::{Path, PathItem};
pub use selector::Selector;
pub use token::{ParsedToken, Token};
pub use token_parser::{ParserMode, StackFrame, TokenParser, TokenParserState};
pub use tokenizer::{Tokenizer, TokenizerState};
pub use value::{Array, Map, Value};

#[doc(hidden)]
pub use alloc::vec;

/// Builds a [`Path`] from a heterogeneous list of keys and indices.
///
/// ```rust
/// extern crate alloc;
/// # use jsonpipe::{path, PathItem};
/// let p = path![0, "foo", 2];
/// assert_eq!(
///     p,
///     vec![
///         PathItem::Index(0),
///         PathItem::Key("foo".into()),
///         PathItem::Index(2)
///     ]
/// );
/// ```
#[macro_export]
macro_rules! path {
    ( $( $elem:expr ),* $(,)? ) => {{
        #[allow(unused_imports)]
        use $crate::PathItemFrom;
        $crate::vec![$($crate::PathItem::from_path_component($elem)),*]
    }};
}
