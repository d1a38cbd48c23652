//! Callback seams between the stages and their consumers.
//!
//! A [`Tokenizer`](crate::Tokenizer) pushes tokens into a [`TokenHandler`]; a
//! [`TokenParser`](crate::TokenParser) pushes elements into a
//! [`ValueHandler`]. Both are held by value, so a pipeline is a single owned
//! object with no shared state. Instances built without a handler hold
//! [`Unset`], which rejects the first callback with
//! [`ParseError::CallbackNotSet`].
use core::fmt;

use crate::{ParseError, ParsedToken, Path, PathItem, StackFrame, Value};

/// Receives tokens from a [`Tokenizer`](crate::Tokenizer).
pub trait TokenHandler {
    /// Called once per complete token, and once per `write` for a token
    /// still in flight when partial tokens are enabled.
    ///
    /// # Errors
    ///
    /// An error fails the tokenizer and is returned from `write`/`end`.
    fn on_token(&mut self, token: ParsedToken) -> Result<(), ParseError>;

    /// Called once when the tokenizer ends successfully.
    ///
    /// # Errors
    ///
    /// An error is returned from the tokenizer's `end`.
    fn on_end(&mut self) -> Result<(), ParseError> {
        Ok(())
    }
}

/// One value considered for emission, borrowed from the parser for the
/// duration of the callback.
#[derive(Debug, Clone, Copy)]
pub struct ParsedElement<'a> {
    /// The value. Always present for complete elements; absent for partial
    /// elements announcing a key or a freshly opened container.
    pub value: Option<&'a Value>,
    /// Key of the value inside `parent`; `None` at the top level.
    pub key: Option<&'a PathItem>,
    /// The container the value belongs to.
    ///
    /// Partial values are not inserted into it. With `keep_stack` disabled the
    /// value may already have been dropped from it.
    pub parent: Option<&'a Value>,
    /// Frames of all open ancestor containers, outermost first.
    pub stack: &'a [StackFrame],
    /// `true` when the value is still being read.
    pub partial: bool,
}

impl ParsedElement<'_> {
    /// The full key path of this element, outermost first.
    ///
    /// ```
    /// use jsonpipe::{JsonParser, JsonParserOptions, ParsedElement, path, value_fn};
    ///
    /// let mut paths = Vec::new();
    /// let handler = value_fn(|el: ParsedElement<'_>| {
    ///     paths.push(el.path());
    ///     Ok(())
    /// });
    /// let mut parser = JsonParser::with_handler(JsonParserOptions::default(), handler).unwrap();
    /// parser.write(r#"{"a":[true]}"#).unwrap();
    /// drop(parser);
    /// assert_eq!(paths, vec![path!["a", 0], path!["a"], path![]]);
    /// ```
    #[must_use]
    pub fn path(&self) -> Path {
        self.stack
            .iter()
            .skip(1)
            .filter_map(|frame| frame.key.clone())
            .chain(self.key.cloned())
            .collect()
    }
}

/// Receives elements from a [`TokenParser`](crate::TokenParser).
pub trait ValueHandler {
    /// Called for every element the selector accepts.
    ///
    /// # Errors
    ///
    /// An error fails the parser and is returned from `write`/`end`.
    fn on_value(&mut self, element: ParsedElement<'_>) -> Result<(), ParseError>;

    /// Called once when parsing ends successfully.
    fn on_end(&mut self) {}

    /// Called once with every error that fails the parser, before it is
    /// returned to the caller.
    fn on_error(&mut self, _error: &ParseError) {}
}

/// Placeholder handler of instances built without one.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unset;

impl TokenHandler for Unset {
    fn on_token(&mut self, _token: ParsedToken) -> Result<(), ParseError> {
        Err(ParseError::CallbackNotSet("onToken"))
    }
}

impl ValueHandler for Unset {
    fn on_value(&mut self, _element: ParsedElement<'_>) -> Result<(), ParseError> {
        Err(ParseError::CallbackNotSet("onValue"))
    }
}

/// [`TokenHandler`] backed by a closure; see [`token_fn`].
pub struct TokenFn<F>(F);

impl<F> fmt::Debug for TokenFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenFn").finish_non_exhaustive()
    }
}

/// Wraps a closure as a [`TokenHandler`].
pub fn token_fn<F>(f: F) -> TokenFn<F>
where
    F: FnMut(ParsedToken) -> Result<(), ParseError>,
{
    TokenFn(f)
}

impl<F> TokenHandler for TokenFn<F>
where
    F: FnMut(ParsedToken) -> Result<(), ParseError>,
{
    fn on_token(&mut self, token: ParsedToken) -> Result<(), ParseError> {
        (self.0)(token)
    }
}

/// [`ValueHandler`] backed by a closure; see [`value_fn`].
pub struct ValueFn<F>(F);

impl<F> fmt::Debug for ValueFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueFn").finish_non_exhaustive()
    }
}

/// Wraps a closure as a [`ValueHandler`].
pub fn value_fn<F>(f: F) -> ValueFn<F>
where
    F: FnMut(ParsedElement<'_>) -> Result<(), ParseError>,
{
    ValueFn(f)
}

impl<F> ValueHandler for ValueFn<F>
where
    F: FnMut(ParsedElement<'_>) -> Result<(), ParseError>,
{
    fn on_value(&mut self, element: ParsedElement<'_>) -> Result<(), ParseError> {
        (self.0)(element)
    }
}
