//! A parser that exposes the document while it is still being read.
//!
//! [`OptimisticParser`] keeps one live [`Value`] for the current top-level
//! document. Object members appear as soon as their key starts, holding
//! [`Value::Null`] until their value begins. Strings, numbers and literals cut
//! off at the end of a chunk are written in place and overwritten as more
//! input arrives.
//!
//! The open containers are not detached as in [`TokenParser`]: they stay in
//! the root, and the stack only records the keys leading to the innermost one.
//!
//! [`TokenParser`]: crate::TokenParser
use alloc::{string::String, sync::Arc, vec::Vec};

use crate::{
    Map, OptimisticParserOptions, ParseError, ParsedToken, ParserMode, PathItem, Token,
    TokenHandler, TokenParserError, TokenParserState, Tokenizer, TokenizerState, Value,
};

#[derive(Debug, Clone)]
struct Frame {
    /// Key of the nested container in its parent; `None` for the top level.
    key: Option<PathItem>,
    mode: Option<ParserMode>,
}

/// The innermost open container, reached from the root through the keys on
/// the stack.
fn container<'a>(root: &'a mut Option<Value>, stack: &[Frame]) -> Option<&'a mut Value> {
    if stack.is_empty() {
        return None;
    }
    stack
        .iter()
        .skip(1)
        .try_fold(root.as_mut()?, |node, frame| node.child_mut(frame.key.as_ref()?))
}

#[derive(Debug)]
struct OptimisticTokenParser {
    separator: Option<String>,
    state: TokenParserState,
    mode: Option<ParserMode>,
    key: Option<PathItem>,
    /// Member inserted for a key that is still being read.
    pending_key: Option<Arc<str>>,
    root: Option<Value>,
    stack: Vec<Frame>,
}

impl OptimisticTokenParser {
    fn new(separator: Option<String>) -> Self {
        Self {
            separator,
            state: TokenParserState::Value,
            mode: None,
            key: None,
            pending_key: None,
            root: None,
            stack: Vec::new(),
        }
    }

    fn is_ended(&self) -> bool {
        self.state == TokenParserState::Ended
    }

    fn write(&mut self, token: ParsedToken) -> Result<(), ParseError> {
        let ParsedToken { token, partial, .. } = token;

        use TokenParserState as S;
        match self.state {
            S::Value => match Value::try_from(token) {
                Ok(value) => {
                    self.place(value);
                    if partial {
                        Ok(())
                    } else if self.mode.is_some() {
                        self.state = S::Comma;
                        Ok(())
                    } else {
                        self.complete_top_level()
                    }
                }
                Err(Token::LeftBrace) => {
                    self.open(Value::Object(Map::new()), ParserMode::Object, None);
                    self.state = S::Key;
                    Ok(())
                }
                Err(Token::LeftBracket) => {
                    self.open(
                        Value::Array(Vec::new()),
                        ParserMode::Array,
                        Some(PathItem::Index(0)),
                    );
                    Ok(())
                }
                Err(Token::RightBracket)
                    if self.mode == Some(ParserMode::Array)
                        && self.key == Some(PathItem::Index(0)) =>
                {
                    self.close(Token::RightBracket)
                }
                Err(token) => self.unexpected(token),
            },
            S::Key => match token {
                Token::String(name) => {
                    self.name_member(&name, partial);
                    if !partial {
                        self.key = Some(PathItem::from(name));
                        self.state = S::Colon;
                    }
                    Ok(())
                }
                Token::RightBrace if self.mode == Some(ParserMode::Object) && self.key.is_none() => {
                    self.close(Token::RightBrace)
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
                (Token::RightBrace, Some(ParserMode::Object)) => self.close(Token::RightBrace),
                (Token::RightBracket, Some(ParserMode::Array)) => self.close(Token::RightBracket),
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

    fn end(&mut self) -> Result<(), ParseError> {
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
        log::debug!("optimistic parser ended");
        Ok(())
    }

    fn fail<T>(&mut self, err: ParseError) -> Result<T, ParseError> {
        if self.state != TokenParserState::Ended {
            self.state = TokenParserState::Error;
        }
        log::debug!("optimistic parser failed: {err}");
        Err(err)
    }

    fn unexpected(&mut self, token: Token) -> Result<(), ParseError> {
        let state = self.state;
        self.fail(TokenParserError::UnexpectedToken { token, state }.into())
    }

    /// Writes `value` at the current key, replacing what an earlier partial
    /// token left there. At the top level it becomes the new root.
    fn place(&mut self, value: Value) {
        let Self {
            root, stack, key, ..
        } = self;
        if stack.is_empty() {
            *root = Some(value);
            return;
        }
        if let (Some(parent), Some(key)) = (container(root, stack), key.as_ref()) {
            parent.insert_child(key, value);
        }
    }

    /// Stores `empty` at the current key and makes it the innermost container.
    fn open(&mut self, empty: Value, mode: ParserMode, key: Option<PathItem>) {
        self.place(empty);
        self.stack.push(Frame {
            key: self.key.take(),
            mode: self.mode.replace(mode),
        });
        self.key = key;
    }

    fn close(&mut self, token: Token) -> Result<(), ParseError> {
        let Some(frame) = self.stack.pop() else {
            return self.unexpected(token);
        };
        self.key = frame.key;
        self.mode = frame.mode;
        if self.mode.is_some() {
            self.state = TokenParserState::Comma;
            Ok(())
        } else {
            self.state = TokenParserState::Value;
            self.complete_top_level()
        }
    }

    fn complete_top_level(&mut self) -> Result<(), ParseError> {
        match self.separator.as_deref() {
            None => self.end(),
            Some("") => Ok(()),
            Some(_) => {
                self.state = TokenParserState::Separator;
                Ok(())
            }
        }
    }

    /// Adds a `null` member for a key as it is read. A key that grows across
    /// chunks replaces the member its shorter prefix added.
    fn name_member(&mut self, name: &str, partial: bool) {
        let Self {
            root,
            stack,
            pending_key,
            ..
        } = self;
        let Some(Value::Object(map)) = container(root, stack) else {
            return;
        };
        if let Some(pending) = pending_key.take() {
            map.remove(&*pending);
        }
        if !map.contains_key(name) {
            let key = Arc::<str>::from(name);
            map.insert(Arc::clone(&key), Value::Null);
            if partial {
                *pending_key = Some(key);
            }
        }
    }
}

impl TokenHandler for OptimisticTokenParser {
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

/// Streaming JSON parser whose [`value`](Self::value) is readable after every
/// chunk, complete or not.
///
/// Unlike [`JsonParser`](crate::JsonParser) there is no selector and no
/// handler: the whole document is kept, and errors are only returned.
///
/// # Examples
///
/// ```
/// use jsonpipe::{OptimisticParser, OptimisticParserOptions};
///
/// let mut parser = OptimisticParser::new(OptimisticParserOptions::default());
/// parser.write(r#"{"name": "Ad"#).unwrap();
/// assert_eq!(parser.value().unwrap().to_string(), r#"{"name":"Ad"}"#);
/// parser.write(r#"a", "tags": [1"#).unwrap();
/// assert_eq!(parser.value().unwrap().to_string(), r#"{"name":"Ada","tags":[1]}"#);
/// parser.write("2]}").unwrap();
/// assert!(parser.is_ended());
/// assert_eq!(parser.value().unwrap().to_string(), r#"{"name":"Ada","tags":[12]}"#);
/// ```
#[derive(Debug)]
pub struct OptimisticParser {
    tokenizer: Tokenizer<OptimisticTokenParser>,
}

impl Default for OptimisticParser {
    fn default() -> Self {
        Self::new(OptimisticParserOptions::default())
    }
}

impl OptimisticParser {
    /// Creates a parser with no value yet.
    #[must_use]
    pub fn new(options: OptimisticParserOptions) -> Self {
        let parser = OptimisticTokenParser::new(options.separator.clone());
        Self {
            tokenizer: Tokenizer::with_handler(options.tokenizer_options(), parser),
        }
    }

    /// Parses one chunk of input and updates the live value.
    ///
    /// # Errors
    ///
    /// Fails on malformed input and on writes after the parser ended. The
    /// value keeps whatever was built before the failure.
    pub fn write(&mut self, chunk: impl AsRef<[u8]>) -> Result<(), ParseError> {
        let result = self.tokenizer.write(chunk);
        if self.tokenizer.handler().is_ended() && !self.tokenizer.is_ended() {
            let closed = self.tokenizer.end();
            return result.and(closed);
        }
        result
    }

    /// Finishes parsing. Calling it on an ended parser is a no-op.
    ///
    /// # Errors
    ///
    /// Fails when the input stopped in the middle of a token or value.
    pub fn end(&mut self) -> Result<(), ParseError> {
        if self.is_ended() {
            return Ok(());
        }
        self.tokenizer.end()
    }

    /// Whether both stages have ended.
    pub fn is_ended(&self) -> bool {
        self.tokenizer.is_ended() && self.tokenizer.handler().is_ended()
    }

    /// The structural state.
    pub fn state(&self) -> TokenParserState {
        self.tokenizer.handler().state
    }

    /// The tokenizer state.
    pub fn tokenizer_state(&self) -> TokenizerState {
        self.tokenizer.state()
    }

    /// The document as read so far; `None` before its first token.
    pub fn value(&self) -> Option<&Value> {
        self.tokenizer.handler().root.as_ref()
    }

    /// Consumes the parser, returning the document as read so far.
    pub fn into_value(self) -> Option<Value> {
        self.tokenizer.into_handler().root
    }
}
