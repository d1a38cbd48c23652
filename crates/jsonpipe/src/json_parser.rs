use crate::{
    JsonParserOptions, ParseError, TokenParser, Tokenizer, TokenizerState, Unset, ValueHandler,
};

/// Streaming JSON parser: a [`Tokenizer`] feeding a [`TokenParser`].
///
/// Feed it byte chunks of any size with [`write`](Self::write); every value
/// the selector accepts is reported to the [`ValueHandler`] as soon as it is
/// complete. Without a separator the parser ends on its own after the first
/// top-level value.
///
/// # Examples
///
/// ```
/// use jsonpipe::{JsonParser, JsonParserOptions, ParsedElement, Value, value_fn};
///
/// let mut ids = Vec::new();
/// let options = JsonParserOptions {
///     paths: Some(vec!["$.id".into()]),
///     separator: Some("\n".into()),
///     ..Default::default()
/// };
/// let handler = value_fn(|el: ParsedElement<'_>| {
///     ids.extend(el.value.and_then(Value::as_f64));
///     Ok(())
/// });
/// let mut parser = JsonParser::with_handler(options, handler).unwrap();
/// parser.write("{\"id\": 1}\n{\"i").unwrap();
/// parser.write("d\": 2}").unwrap();
/// parser.end().unwrap();
/// drop(parser);
/// assert_eq!(ids, vec![1.0, 2.0]);
/// ```
#[derive(Debug)]
pub struct JsonParser<V = Unset> {
    tokenizer: Tokenizer<TokenParser<V>>,
}

impl JsonParser<Unset> {
    /// Creates a parser without a value handler. The first emitted value
    /// fails with [`ParseError::CallbackNotSet`].
    ///
    /// # Errors
    ///
    /// Fails when a selector path is malformed.
    pub fn new(options: JsonParserOptions) -> Result<Self, ParseError> {
        Self::with_handler(options, Unset)
    }
}

impl<V: ValueHandler> JsonParser<V> {
    /// Creates a parser reporting into `handler`.
    ///
    /// # Errors
    ///
    /// Fails when a selector path is malformed.
    pub fn with_handler(options: JsonParserOptions, handler: V) -> Result<Self, ParseError> {
        let parser = TokenParser::with_handler(options.token_parser_options(), handler)?;
        Ok(Self {
            tokenizer: Tokenizer::with_handler(options.tokenizer_options(), parser),
        })
    }

    /// Parses one chunk of input.
    ///
    /// Once the token parser has ended on its own, the tokenizer is closed
    /// too, so trailing input is an error.
    ///
    /// # Errors
    ///
    /// Fails on malformed input, on handler errors and on writes after the
    /// parser ended. The value handler's `on_error` sees every error once.
    pub fn write(&mut self, chunk: impl AsRef<[u8]>) -> Result<(), ParseError> {
        let result = self.tokenizer.write(chunk);
        self.settle(result)
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
        let result = self.tokenizer.end();
        self.report(result)
    }

    /// Whether both stages have ended.
    pub fn is_ended(&self) -> bool {
        self.tokenizer.is_ended() && self.parser().is_ended()
    }

    /// The tokenizer state.
    pub fn tokenizer_state(&self) -> TokenizerState {
        self.tokenizer.state()
    }

    /// The token parser.
    pub fn parser(&self) -> &TokenParser<V> {
        self.tokenizer.handler()
    }

    /// The value handler.
    pub fn handler(&self) -> &V {
        self.parser().handler()
    }

    /// The value handler, mutably.
    pub fn handler_mut(&mut self) -> &mut V {
        self.tokenizer.handler_mut().handler_mut()
    }

    /// Consumes the parser, returning its value handler.
    pub fn into_handler(self) -> V {
        self.tokenizer.into_handler().into_handler()
    }

    /// Closes the tokenizer behind a token parser that ended on its own.
    fn settle(&mut self, result: Result<(), ParseError>) -> Result<(), ParseError> {
        let parser_ended = self.parser().is_ended();
        let result = match result {
            Ok(()) if parser_ended && !self.tokenizer.is_ended() => self.tokenizer.end(),
            Err(err) => {
                if parser_ended && !self.tokenizer.is_ended() {
                    let _ = self.tokenizer.end();
                }
                Err(err)
            }
            ok => ok,
        };
        self.report(result)
    }

    /// Hands tokenizer errors to the value handler. Every other error passed
    /// through the token parser, which reports its own.
    fn report(&mut self, result: Result<(), ParseError>) -> Result<(), ParseError> {
        if let Err(err @ ParseError::Tokenizer(_)) = &result {
            self.handler_mut().on_error(err);
        }
        result
    }
}
