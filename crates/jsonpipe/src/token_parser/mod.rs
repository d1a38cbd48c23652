//! Incremental value builder over a token stream.
//!
//! [`TokenParser`] consumes [`ParsedToken`]s and builds the JSON value tree
//! bottom-up. The container being filled lives in the parser itself; opening
//! a nested container moves it, together with its key and mode, into a
//! [`StackFrame`], and closing the nested container moves it back and stores
//! the finished child in it. Every container is therefore owned by exactly
//! one place at a time.
//!
//! A scalar is considered for emission when it is written, a container when it
//! is closed. The [`Selector`] decides whether the [`ValueHandler`] sees it;
//! with `keep_stack` disabled, values are dropped from their parent unless an
//! ancestor container was selected.
use alloc::{string::String, sync::Arc, vec::Vec};
use core::fmt;

use crate::{
    Map, ParseError, ParsedElement, ParsedToken, PathItem, Selector, Token, TokenHandler,
    TokenParserError, TokenParserOptions, Unset, Value, ValueHandler,
};


/// States of the [`TokenParser`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenParserState {
    /// Expecting a value.
    Value,
    /// Expecting an object key or `}`.
    Key,
    /// Expecting `:`.
    Colon,
    /// Expecting `,` or the end of the current container.
    Comma,
    /// Finished.
    Ended,
    /// Failed.
    Error,
    /// Expecting the separator between top-level values.
    Separator,
}

impl fmt::Display for TokenParserState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Value => "VALUE",
            Self::Key => "KEY",
            Self::Colon => "COLON",
            Self::Comma => "COMMA",
            Self::Ended => "ENDED",
            Self::Error => "ERROR",
            Self::Separator => "SEPARATOR",
        })
    }
}

/// Kind of the container currently being filled.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParserMode {
    /// Inside `{ ... }`.
    Object,
    /// Inside `[ ... ]`.
    Array,
}

/// One open ancestor container.
#[derive(Debug, Clone, PartialEq)]
pub struct StackFrame {
    /// Key under which the nested container will be stored in `value`;
    /// `None` for the top level.
    pub key: Option<PathItem>,
    /// The ancestor container, holding its children completed so far. `None`
    /// for the top level.
    pub value: Option<Value>,
    /// Mode of `value`; `None` for the top level.
    pub mode: Option<ParserMode>,
    /// Whether the nested container was selected when it was opened.
    pub emit: bool,
}

/// Builds values from tokens and reports the selected ones.
///
/// # Examples
///
/// ```
/// use jsonpipe::{ParsedElement, ParsedToken, Token, TokenParser, TokenParserOptions, value_fn};
///
/// let mut values = Vec::new();
/// let handler = value_fn(|el: ParsedElement<'_>| {
///     values.push(el.value.cloned());
///     Ok(())
/// });
/// let options = TokenParserOptions {
///     paths: Some(vec!["$.*".into()]),
///     ..Default::default()
/// };
/// let mut parser = TokenParser::with_handler(options, handler).unwrap();
/// for (offset, token) in [Token::LeftBracket, Token::Null, Token::Comma, Token::True, Token::RightBracket]
///     .into_iter()
///     .enumerate()
/// {
///     parser.write(ParsedToken::new(token, offset)).unwrap();
/// }
/// assert!(parser.is_ended());
/// drop(parser);
/// assert_eq!(values, vec![Some(jsonpipe::Value::Null), Some(jsonpipe::Value::Boolean(true))]);
/// ```
#[derive(Debug)]
pub struct TokenParser<V = Unset> {
    handler: V,
    selector: Selector,
    keep_stack: bool,
    separator: Option<String>,
    emit_partial_values: bool,
    state: TokenParserState,
    mode: Option<ParserMode>,
    key: Option<PathItem>,
    /// The container being filled; `None` at the top level.
    value: Option<Value>,
    stack: Vec<StackFrame>,
}

impl TokenParser<Unset> {
    /// Creates a parser without a value handler. The first emission fails
    /// with [`ParseError::CallbackNotSet`].
    ///
    /// # Errors
    ///
    /// Fails when a selector path is malformed.
    pub fn new(options: TokenParserOptions) -> Result<Self, ParseError> {
        Self::with_handler(options, Unset)
    }
}

impl<V: ValueHandler> TokenParser<V> {
    /// Creates a parser emitting into `handler`.
    ///
    /// # Errors
    ///
    /// Fails when a selector path is malformed.
    pub fn with_handler(options: TokenParserOptions, handler: V) -> Result<Self, ParseError> {
        let selector = Selector::new(options.paths.as_deref())?;
        Ok(Self {
            handler,
            selector,
            keep_stack: options.keep_stack,
            separator: options.separator,
            emit_partial_values: options.emit_partial_values,
            state: TokenParserState::Value,
            mode: None,
            key: None,
            value: None,
            stack: Vec::new(),
        })
    }

    /// The current state.
    pub fn state(&self) -> TokenParserState {
        self.state
    }

    /// Whether the parser has ended, on its own or through [`end`](Self::end).
    pub fn is_ended(&self) -> bool {
        self.state == TokenParserState::Ended
    }

    /// The value handler.
    pub fn handler(&self) -> &V {
        &self.handler
    }

    /// The value handler, mutably.
    pub fn handler_mut(&mut self) -> &mut V {
        &mut self.handler
    }

    /// Consumes the parser, returning its handler.
    pub fn into_handler(self) -> V {
        self.handler
    }

    /// Consumes one token.
    ///
    /// Partial tokens only matter with `emit_partial_values`; otherwise
    /// they are ignored.
    ///
    /// # Errors
    ///
    /// Fails on a token the current state does not accept and on handler
    /// errors. Any failure leaves the parser in [`TokenParserState::Error`]
    /// unless it had already ended.
    pub fn write(&mut self, token: ParsedToken) -> Result<(), ParseError> {
        let ParsedToken { token, partial, .. } = token;
        if partial {
            return if self.emit_partial_values {
                self.write_partial(token)
            } else {
                Ok(())
            };
        }

        use TokenParserState as S;
        match self.state {
            S::Value => match Value::try_from(token) {
                Ok(value) => {
                    if self.mode.is_some() {
                        self.state = S::Comma;
                    }
                    let emit = self.should_emit();
                    self.emit(value, emit)
                }
                Err(Token::LeftBrace) => {
                    self.push(Value::Object(Map::new()), ParserMode::Object, None);
                    self.state = S::Key;
                    self.emit_opened()
                }
                Err(Token::LeftBracket) => {
                    self.push(
                        Value::Array(Vec::new()),
                        ParserMode::Array,
                        Some(PathItem::Index(0)),
                    );
                    self.emit_opened()
                }
                Err(Token::RightBracket)
                    if self.mode == Some(ParserMode::Array)
                        && self.key == Some(PathItem::Index(0)) =>
                {
                    self.pop(Token::RightBracket)
                }
                Err(token) => self.unexpected(token),
            },
            S::Key => match token {
                Token::String(key) => {
                    self.key = Some(PathItem::Key(Arc::from(key)));
                    self.state = S::Colon;
                    if self.emit_partial_values {
                        self.emit_partial(None, self.key.clone())
                    } else {
                        Ok(())
                    }
                }
                Token::RightBrace if self.mode == Some(ParserMode::Object) && self.key.is_none() => {
                    self.pop(Token::RightBrace)
                }
                token => self.unexpected(token),
            },
            S::Colon => match token {
                Token::Colon => {
                    self.state = S::Value;
                    Ok(())
                }
                token => self.unexpected(token),
            },
            S::Comma => match (token, self.mode) {
                (Token::Comma, Some(ParserMode::Array)) => {
                    if let Some(PathItem::Index(i)) = &mut self.key {
                        *i += 1;
                    }
                    self.state = S::Value;
                    Ok(())
                }
                (Token::Comma, Some(ParserMode::Object)) => {
                    self.state = S::Key;
                    Ok(())
                }
                (Token::RightBrace, Some(ParserMode::Object)) => self.pop(Token::RightBrace),
                (Token::RightBracket, Some(ParserMode::Array)) => self.pop(Token::RightBracket),
                (token, _) => self.unexpected(token),
            },
            S::Separator => match token {
                Token::Separator(sep) if self.separator.as_deref() == Some(&*sep) => {
                    self.state = S::Value;
                    Ok(())
                }
                token => self.unexpected(token),
            },
            S::Ended | S::Error => self.unexpected(token),
        }
    }

    /// Finishes parsing.
    ///
    /// # Errors
    ///
    /// Fails unless the parser sits between top-level values with no open
    /// container, or when it already ended.
    pub fn end(&mut self) -> Result<(), ParseError> {
        let at_boundary = matches!(
            self.state,
            TokenParserState::Value | TokenParserState::Separator
        ) && self.stack.is_empty();
        if !at_boundary {
            return self.fail(
                TokenParserError::EndedMidParsing { state: self.state }.into(),
            );
        }
        self.state = TokenParserState::Ended;
        log::debug!("token parser ended");
        self.handler.on_end();
        Ok(())
    }

    fn fail<T>(&mut self, err: ParseError) -> Result<T, ParseError> {
        if self.state != TokenParserState::Ended {
            self.state = TokenParserState::Error;
        }
        log::debug!("token parser failed: {err}");
        self.handler.on_error(&err);
        Err(err)
    }

    fn unexpected(&mut self, token: Token) -> Result<(), ParseError> {
        let state = self.state;
        self.fail(TokenParserError::UnexpectedToken { token, state }.into())
    }

    fn should_emit(&self) -> bool {
        self.selector.matches(&self.stack, self.key.as_ref())
    }

    /// Opens `container` as the new current container.
    fn push(&mut self, container: Value, mode: ParserMode, key: Option<PathItem>) {
        let emit = self.should_emit();
        self.stack.push(StackFrame {
            key: self.key.take(),
            value: self.value.replace(container),
            mode: self.mode.replace(mode),
            emit,
        });
        self.key = key;
    }

    /// Closes the current container and considers it for emission.
    fn pop(&mut self, token: Token) -> Result<(), ParseError> {
        let Some(frame) = self.stack.pop() else {
            return self.unexpected(token);
        };
        let child = core::mem::replace(&mut self.value, frame.value).unwrap_or_default();
        self.key = frame.key;
        self.mode = frame.mode;
        self.state = if self.mode.is_some() {
            TokenParserState::Comma
        } else {
            TokenParserState::Value
        };
        self.emit(child, frame.emit)
    }

    /// Stores a finished value in its parent and reports it when `emit`.
    fn emit(&mut self, value: Value, emit: bool) -> Result<(), ParseError> {
        let prune = !self.keep_stack && self.stack.iter().all(|frame| !frame.emit);
        let detached = match (&mut self.value, &self.key) {
            (Some(parent), Some(key)) if !prune => {
                parent.insert_child(key, value);
                None
            }
            _ => Some(value),
        };

        if emit {
            let Self {
                handler,
                stack,
                key,
                value: parent,
                ..
            } = self;
            let value = detached.as_ref().or_else(|| {
                parent
                    .as_ref()
                    .zip(key.as_ref())
                    .and_then(|(parent, key)| parent.child(key))
            });
            log::trace!("emitting value at depth {}", stack.len());
            let result = handler.on_value(ParsedElement {
                value,
                key: key.as_ref(),
                parent: parent.as_ref(),
                stack,
                partial: false,
            });
            if let Err(err) = result {
                return self.fail(err);
            }
        }

        if self.stack.is_empty() {
            return self.complete_top_level();
        }
        Ok(())
    }

    fn complete_top_level(&mut self) -> Result<(), ParseError> {
        match self.separator.as_deref() {
            None => self.end(),
            Some("") => Ok(()),
            Some(_) => {
                log::debug!("top-level value complete, awaiting separator");
                self.state = TokenParserState::Separator;
                Ok(())
            }
        }
    }

    fn write_partial(&mut self, token: Token) -> Result<(), ParseError> {
        match self.state {
            TokenParserState::Value => match Value::try_from(token) {
                Ok(value) => self.emit_partial(Some(&value), self.key.clone()),
                Err(token) => self.unexpected(token),
            },
            TokenParserState::Key => match token {
                Token::String(key) => {
                    self.emit_partial(None, Some(PathItem::Key(Arc::from(key))))
                }
                token => self.unexpected(token),
            },
            _ => self.unexpected(token),
        }
    }

    /// Announces a freshly opened container.
    fn emit_opened(&mut self) -> Result<(), ParseError> {
        if self.emit_partial_values {
            self.emit_partial(None, self.key.clone())
        } else {
            Ok(())
        }
    }

    /// Reports an element still being read. The value is not stored.
    fn emit_partial(&mut self, value: Option<&Value>, key: Option<PathItem>) -> Result<(), ParseError> {
        if !self.selector.matches(&self.stack, key.as_ref()) {
            return Ok(());
        }
        let result = self.handler.on_value(ParsedElement {
            value,
            key: key.as_ref(),
            parent: self.value.as_ref(),
            stack: &self.stack,
            partial: true,
        });
        result.or_else(|err| self.fail(err))
    }
}

impl<V: ValueHandler> TokenHandler for TokenParser<V> {
    fn on_token(&mut self, token: ParsedToken) -> Result<(), ParseError> {
        self.write(token)
    }

    fn on_end(&mut self) -> Result<(), ParseError> {
        if self.is_ended() {
            Ok(())
        } else {
            self.end()
        }
    }
}
