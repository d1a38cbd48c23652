//! Byte-level JSON tokenizer.
//!
//! ## What it does
//!
//! [`Tokenizer`] turns a stream of byte chunks into a stream of
//! [`ParsedToken`]s pushed into a [`TokenHandler`]. It is a pure state
//! machine with no knowledge of JSON structure: `[1}` tokenizes fine and is
//! rejected one stage later by the [`TokenParser`](crate::TokenParser).
//!
//! ## Invariants
//!
//! - Chunk boundaries are invisible: every state survives the end of a chunk,
//!   including the middle of a multi-byte UTF-8 sequence, which is parked in a
//!   four-byte carry buffer until the next `write` completes it.
//! - Token offsets are absolute stream offsets of the token's first byte.
//! - A number is only known to be complete when the byte after it arrives.
//!   That byte is processed a second time from [`TokenizerState::Start`]
//!   without advancing the cursor.
//! - Once [`TokenizerState::Ended`] or [`TokenizerState::Error`] is reached,
//!   every further `write` fails.
use alloc::sync::Arc;
use core::fmt;

use crate::{
    ParseError, ParsedToken, Token, TokenHandler, TokenizerError, TokenizerOptions, Unset,
    bom::{BomSniffer, Sniffed},
    buffered_string::BufferedString,
    escape_buffer::UnicodeEscapeBuffer,
};


/// States of the [`Tokenizer`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum TokenizerState {
    Start,
    Ended,
    Error,
    True1,
    True2,
    True3,
    False1,
    False2,
    False3,
    False4,
    Null1,
    Null2,
    Null3,
    StringDefault,
    StringAfterBackslash,
    StringUnicodeDigit1,
    StringUnicodeDigit2,
    StringUnicodeDigit3,
    StringUnicodeDigit4,
    StringIncompleteChar,
    NumberAfterInitialMinus,
    NumberAfterInitialZero,
    NumberAfterInitialNonZero,
    NumberAfterFullStop,
    NumberAfterDecimal,
    NumberAfterE,
    NumberAfterEAndSign,
    NumberAfterEAndDigit,
    Separator,
}

impl TokenizerState {
    fn name(self) -> &'static str {
        match self {
            Self::Start => "START",
            Self::Ended => "ENDED",
            Self::Error => "ERROR",
            Self::True1 => "TRUE1",
            Self::True2 => "TRUE2",
            Self::True3 => "TRUE3",
            Self::False1 => "FALSE1",
            Self::False2 => "FALSE2",
            Self::False3 => "FALSE3",
            Self::False4 => "FALSE4",
            Self::Null1 => "NULL1",
            Self::Null2 => "NULL2",
            Self::Null3 => "NULL3",
            Self::StringDefault => "STRING_DEFAULT",
            Self::StringAfterBackslash => "STRING_AFTER_BACKSLASH",
            Self::StringUnicodeDigit1 => "STRING_UNICODE_DIGIT_1",
            Self::StringUnicodeDigit2 => "STRING_UNICODE_DIGIT_2",
            Self::StringUnicodeDigit3 => "STRING_UNICODE_DIGIT_3",
            Self::StringUnicodeDigit4 => "STRING_UNICODE_DIGIT_4",
            Self::StringIncompleteChar => "STRING_INCOMPLETE_CHAR",
            Self::NumberAfterInitialMinus => "NUMBER_AFTER_INITIAL_MINUS",
            Self::NumberAfterInitialZero => "NUMBER_AFTER_INITIAL_ZERO",
            Self::NumberAfterInitialNonZero => "NUMBER_AFTER_INITIAL_NON_ZERO",
            Self::NumberAfterFullStop => "NUMBER_AFTER_FULL_STOP",
            Self::NumberAfterDecimal => "NUMBER_AFTER_DECIMAL",
            Self::NumberAfterE => "NUMBER_AFTER_E",
            Self::NumberAfterEAndSign => "NUMBER_AFTER_E_AND_SIGN",
            Self::NumberAfterEAndDigit => "NUMBER_AFTER_E_AND_DIGIT",
            Self::Separator => "SEPARATOR",
        }
    }

    /// States in which the accumulated number text is a complete number.
    fn holds_complete_number(self) -> bool {
        matches!(
            self,
            Self::NumberAfterInitialZero
                | Self::NumberAfterInitialNonZero
                | Self::NumberAfterDecimal
                | Self::NumberAfterEAndDigit
        )
    }
}

impl fmt::Display for TokenizerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of feeding one byte to the state machine.
enum Step {
    /// Advance past this many bytes.
    Consumed(usize),
    /// Process the same byte again in the new state.
    Reprocess,
    Reject,
}

/// Length of the UTF-8 sequence introduced by `lead`.
fn utf8_sequence_len(lead: u8) -> usize {
    match lead {
        0xC2..=0xDF => 2,
        0x00..=0xEF => 3,
        _ => 4,
    }
}

/// Number of leading continuation bytes in `bytes`, at most `max`.
fn continuation_len(bytes: &[u8], max: usize) -> usize {
    bytes
        .iter()
        .take(max)
        .take_while(|&&b| b & 0xC0 == 0x80)
        .count()
}

fn unescape(byte: u8) -> Option<u8> {
    match byte {
        b'"' | b'\\' | b'/' => Some(byte),
        b'b' => Some(0x08),
        b'f' => Some(0x0C),
        b'n' => Some(b'\n'),
        b'r' => Some(b'\r'),
        b't' => Some(b'\t'),
        _ => None,
    }
}

/// Streaming JSON tokenizer.
///
/// # Examples
///
/// ```
/// use jsonpipe::{ParsedToken, Token, Tokenizer, TokenizerOptions, token_fn};
///
/// let mut tokens = Vec::new();
/// let handler = token_fn(|t: ParsedToken| {
///     tokens.push((t.token, t.offset));
///     Ok(())
/// });
/// let mut tokenizer = Tokenizer::with_handler(TokenizerOptions::default(), handler);
/// tokenizer.write("[tr").unwrap();
/// tokenizer.write("ue]").unwrap();
/// tokenizer.end().unwrap();
/// drop(tokenizer);
/// assert_eq!(
///     tokens,
///     vec![(Token::LeftBracket, 0), (Token::True, 1), (Token::RightBracket, 5)]
/// );
/// ```
#[derive(Debug)]
pub struct Tokenizer<H = Unset> {
    handler: H,
    state: TokenizerState,
    emit_partial_tokens: bool,
    /// Only non-empty separators are matched.
    separator: Option<Arc<str>>,
    separator_index: usize,
    string: BufferedString,
    number: BufferedString,
    escape: UnicodeEscapeBuffer,
    char_split_buffer: [u8; 4],
    bytes_in_sequence: usize,
    bytes_remaining: usize,
    bom: BomSniffer,
    /// Absolute offset of the next byte handed to the state machine.
    position: usize,
    token_start: usize,
}

impl Tokenizer<Unset> {
    /// Creates a tokenizer without a token handler. The first token it
    /// produces fails with [`ParseError::CallbackNotSet`].
    #[must_use]
    pub fn new(options: TokenizerOptions) -> Self {
        Self::with_handler(options, Unset)
    }
}

impl<H: TokenHandler> Tokenizer<H> {
    /// Creates a tokenizer feeding `handler`.
    pub fn with_handler(options: TokenizerOptions, handler: H) -> Self {
        let string = if options.string_buffer_size > 4 {
            BufferedString::bounded(options.string_buffer_size)
        } else {
            BufferedString::unbounded()
        };
        let number = if options.number_buffer_size > 0 {
            BufferedString::bounded(options.number_buffer_size)
        } else {
            BufferedString::unbounded()
        };
        Self {
            handler,
            state: TokenizerState::Start,
            emit_partial_tokens: options.emit_partial_tokens,
            separator: options
                .separator
                .filter(|sep| !sep.is_empty())
                .map(Arc::from),
            separator_index: 0,
            string,
            number,
            escape: UnicodeEscapeBuffer::default(),
            char_split_buffer: [0; 4],
            bytes_in_sequence: 0,
            bytes_remaining: 0,
            bom: BomSniffer::default(),
            position: 0,
            token_start: 0,
        }
    }

    /// The current state.
    pub fn state(&self) -> TokenizerState {
        self.state
    }

    /// Whether [`end`](Self::end) has completed.
    pub fn is_ended(&self) -> bool {
        self.state == TokenizerState::Ended
    }

    /// The token handler.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// The token handler, mutably.
    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Consumes the tokenizer, returning its handler.
    pub fn into_handler(self) -> H {
        self.handler
    }

    /// Tokenizes one chunk of input.
    ///
    /// A leading byte-order mark is skipped, even when split across the
    /// first chunks.
    ///
    /// # Errors
    ///
    /// Fails on a byte that cannot continue the current token, on a handler
    /// error, or when the tokenizer already ended or failed. Any failure
    /// leaves the tokenizer in [`TokenizerState::Error`] unless it had
    /// already ended.
    pub fn write(&mut self, chunk: impl AsRef<[u8]>) -> Result<(), ParseError> {
        if matches!(self.state, TokenizerState::Ended | TokenizerState::Error) {
            return Err(TokenizerError::Closed { state: self.state }.into());
        }
        let Sniffed {
            skipped,
            replay,
            rest,
        } = self.bom.sniff(chunk.as_ref());
        if skipped > 0 {
            log::debug!("skipped {skipped}-byte byte order mark");
        }
        self.position += skipped;

        let result = self
            .process(replay.as_slice())
            .and_then(|()| self.process(rest))
            .and_then(|()| {
                if self.emit_partial_tokens {
                    self.emit_partial()
                } else {
                    Ok(())
                }
            });
        result.or_else(|err| self.fail(err))
    }

    /// Finishes the stream.
    ///
    /// A number still being read is emitted as a final complete token.
    ///
    /// # Errors
    ///
    /// Fails when a string, literal or incomplete number is still open,
    /// when the tokenizer already ended, or when the handler's `on_end`
    /// fails.
    pub fn end(&mut self) -> Result<(), ParseError> {
        if self.state == TokenizerState::Ended {
            return Err(TokenizerError::Closed { state: self.state }.into());
        }
        let Sniffed { skipped, replay, .. } = self.bom.finish();
        self.position += skipped;
        if self.state != TokenizerState::Error {
            if let Err(err) = self.process(replay.as_slice()) {
                return self.fail(err);
            }
        }

        match self.state {
            state if state.holds_complete_number() => {
                self.state = TokenizerState::Ended;
                if let Err(err) = self.emit_number(false) {
                    return self.fail(err);
                }
            }
            TokenizerState::Start | TokenizerState::Error | TokenizerState::Separator => {
                self.state = TokenizerState::Ended;
            }
            state => return self.fail(TokenizerError::EndedMidToken { state }.into()),
        }
        log::debug!("tokenizer ended after {} bytes", self.position);
        self.handler.on_end().or_else(|err| self.fail(err))
    }

    fn fail<T>(&mut self, err: ParseError) -> Result<T, ParseError> {
        if self.state != TokenizerState::Ended {
            self.state = TokenizerState::Error;
        }
        log::debug!("tokenizer failed: {err}");
        Err(err)
    }

    fn process(&mut self, buffer: &[u8]) -> Result<(), ParseError> {
        let mut i = 0;
        while i < buffer.len() {
            let offset = self.position + i;
            match self.step(&buffer[i..], offset)? {
                Step::Consumed(n) => i += n,
                Step::Reprocess => {}
                Step::Reject => {
                    return Err(TokenizerError::UnexpectedByte {
                        byte: buffer[i],
                        offset,
                        state: self.state,
                    }
                    .into());
                }
            }
        }
        self.position += buffer.len();
        Ok(())
    }

    /// Feeds `input[0]`; `input` holds the rest of the chunk for multi-byte
    /// sequences.
    #[allow(clippy::too_many_lines)]
    fn step(&mut self, input: &[u8], offset: usize) -> Result<Step, ParseError> {
        use TokenizerState as S;

        let n = input[0];
        let step = match (self.state, n) {
            (S::Start, _) if self.separator_byte(0) == Some(n) => {
                self.token_start = offset;
                self.separator_index = 1;
                self.state = S::Separator;
                self.advance_separator()?
            }
            (S::Start, b' ' | b'\t' | b'\n' | b'\r') => Step::Consumed(1),
            (S::Start, b'{') => self.emit_structural(Token::LeftBrace, offset)?,
            (S::Start, b'}') => self.emit_structural(Token::RightBrace, offset)?,
            (S::Start, b'[') => self.emit_structural(Token::LeftBracket, offset)?,
            (S::Start, b']') => self.emit_structural(Token::RightBracket, offset)?,
            (S::Start, b':') => self.emit_structural(Token::Colon, offset)?,
            (S::Start, b',') => self.emit_structural(Token::Comma, offset)?,
            (S::Start, b't') => self.begin_token(S::True1, offset),
            (S::Start, b'f') => self.begin_token(S::False1, offset),
            (S::Start, b'n') => self.begin_token(S::Null1, offset),
            (S::Start, b'"') => {
                self.string.reset();
                self.begin_token(S::StringDefault, offset)
            }
            (S::Start, b'-' | b'0'..=b'9') => {
                self.number.reset();
                self.number.push_byte(n);
                let next = match n {
                    b'-' => S::NumberAfterInitialMinus,
                    b'0' => S::NumberAfterInitialZero,
                    _ => S::NumberAfterInitialNonZero,
                };
                self.begin_token(next, offset)
            }

            (S::True1, b'r') => self.goto(S::True2),
            (S::True2, b'u') => self.goto(S::True3),
            (S::True3, b'e') => self.finish_literal(Token::True)?,
            (S::False1, b'a') => self.goto(S::False2),
            (S::False2, b'l') => self.goto(S::False3),
            (S::False3, b's') => self.goto(S::False4),
            (S::False4, b'e') => self.finish_literal(Token::False)?,
            (S::Null1, b'u') => self.goto(S::Null2),
            (S::Null2, b'l') => self.goto(S::Null3),
            (S::Null3, b'l') => self.finish_literal(Token::Null)?,

            (S::StringDefault, b'"') => {
                self.escape.flush_dangling_into(&mut self.string);
                let value = self.string.take();
                self.state = S::Start;
                self.emit(Token::String(value), self.token_start, false)?;
                Step::Consumed(1)
            }
            (S::StringDefault, b'\\') => self.goto(S::StringAfterBackslash),
            (S::StringDefault, 0x80..=0xFF) => self.push_multi_byte(input),
            (S::StringDefault, 0x20..=0x7F) => {
                self.escape.flush_dangling_into(&mut self.string);
                self.string.push_byte(n);
                Step::Consumed(1)
            }
            (S::StringIncompleteChar, _) => self.complete_split_char(input),
            (S::StringAfterBackslash, b'u') => {
                self.escape.begin();
                self.goto(S::StringUnicodeDigit1)
            }
            (S::StringAfterBackslash, _) => match unescape(n) {
                Some(byte) => {
                    self.escape.flush_dangling_into(&mut self.string);
                    self.string.push_byte(byte);
                    self.goto(S::StringDefault)
                }
                None => Step::Reject,
            },
            (
                S::StringUnicodeDigit1
                | S::StringUnicodeDigit2
                | S::StringUnicodeDigit3
                | S::StringUnicodeDigit4,
                _,
            ) => {
                if !self.escape.push_digit(n) {
                    return Ok(Step::Reject);
                }
                match self.state {
                    S::StringUnicodeDigit1 => self.goto(S::StringUnicodeDigit2),
                    S::StringUnicodeDigit2 => self.goto(S::StringUnicodeDigit3),
                    S::StringUnicodeDigit3 => self.goto(S::StringUnicodeDigit4),
                    _ => {
                        self.escape.finish_into(&mut self.string);
                        self.goto(S::StringDefault)
                    }
                }
            }

            (S::NumberAfterInitialMinus, b'0') => self.push_digit(n, S::NumberAfterInitialZero),
            (S::NumberAfterInitialMinus, b'1'..=b'9') => {
                self.push_digit(n, S::NumberAfterInitialNonZero)
            }
            (S::NumberAfterInitialZero | S::NumberAfterInitialNonZero, b'.') => {
                self.push_digit(n, S::NumberAfterFullStop)
            }
            (
                S::NumberAfterInitialZero | S::NumberAfterInitialNonZero | S::NumberAfterDecimal,
                b'e' | b'E',
            ) => self.push_digit(n, S::NumberAfterE),
            (S::NumberAfterInitialNonZero, b'0'..=b'9') => {
                self.push_digit(n, S::NumberAfterInitialNonZero)
            }
            (S::NumberAfterFullStop | S::NumberAfterDecimal, b'0'..=b'9') => {
                self.push_digit(n, S::NumberAfterDecimal)
            }
            (S::NumberAfterE, b'+' | b'-') => self.push_digit(n, S::NumberAfterEAndSign),
            (
                S::NumberAfterE | S::NumberAfterEAndSign | S::NumberAfterEAndDigit,
                b'0'..=b'9',
            ) => self.push_digit(n, S::NumberAfterEAndDigit),
            (state, _) if state.holds_complete_number() => {
                self.state = S::Start;
                self.emit_number(false)?;
                Step::Reprocess
            }

            (S::Separator, _) if self.separator_byte(self.separator_index) == Some(n) => {
                self.separator_index += 1;
                self.advance_separator()?
            }

            _ => Step::Reject,
        };
        Ok(step)
    }

    fn goto(&mut self, state: TokenizerState) -> Step {
        self.state = state;
        Step::Consumed(1)
    }

    fn begin_token(&mut self, state: TokenizerState, offset: usize) -> Step {
        self.token_start = offset;
        self.goto(state)
    }

    fn push_digit(&mut self, byte: u8, state: TokenizerState) -> Step {
        self.number.push_byte(byte);
        self.goto(state)
    }

    fn emit(&mut self, token: Token, offset: usize, partial: bool) -> Result<(), ParseError> {
        log::trace!("token {token} at {offset} (partial: {partial})");
        self.handler.on_token(ParsedToken {
            token,
            offset,
            partial,
        })
    }

    fn emit_structural(&mut self, token: Token, offset: usize) -> Result<Step, ParseError> {
        self.emit(token, offset, false)?;
        Ok(Step::Consumed(1))
    }

    fn finish_literal(&mut self, token: Token) -> Result<Step, ParseError> {
        self.state = TokenizerState::Start;
        self.emit(token, self.token_start, false)?;
        Ok(Step::Consumed(1))
    }

    fn parse_number(&mut self) -> Result<f64, ParseError> {
        let text = self.number.as_str();
        text.parse()
            .map_err(|_| TokenizerError::InvalidNumber(text.into()).into())
    }

    fn emit_number(&mut self, partial: bool) -> Result<(), ParseError> {
        let value = self.parse_number()?;
        self.emit(Token::Number(value), self.token_start, partial)
    }

    fn separator_byte(&self, index: usize) -> Option<u8> {
        self.separator
            .as_deref()
            .and_then(|sep| sep.as_bytes().get(index).copied())
    }

    /// Emits the separator once all of its bytes matched.
    fn advance_separator(&mut self) -> Result<Step, ParseError> {
        if let Some(sep) = self
            .separator
            .as_ref()
            .filter(|sep| sep.len() == self.separator_index)
        {
            let token = Token::Separator(Arc::clone(sep));
            self.state = TokenizerState::Start;
            self.emit(token, self.token_start, false)?;
        }
        Ok(Step::Consumed(1))
    }

    /// Copies one UTF-8 sequence into the string. A sequence cut short by a
    /// byte that cannot continue it is stored as is and decodes to U+FFFD.
    fn push_multi_byte(&mut self, input: &[u8]) -> Step {
        self.escape.flush_dangling_into(&mut self.string);
        let len = utf8_sequence_len(input[0]);
        let available = 1 + continuation_len(&input[1..], len - 1);
        if available == len || available < input.len() {
            self.string.push_bytes(&input[..available]);
            return Step::Consumed(available);
        }
        self.char_split_buffer[..available].copy_from_slice(input);
        self.bytes_in_sequence = len;
        self.bytes_remaining = len - available;
        self.state = TokenizerState::StringIncompleteChar;
        Step::Consumed(available)
    }

    fn complete_split_char(&mut self, input: &[u8]) -> Step {
        let take = continuation_len(input, self.bytes_remaining);
        let filled = self.bytes_in_sequence - self.bytes_remaining;
        self.char_split_buffer[filled..filled + take].copy_from_slice(&input[..take]);
        self.bytes_remaining -= take;
        if self.bytes_remaining == 0 || take < input.len() {
            self.string
                .push_bytes(&self.char_split_buffer[..filled + take]);
            self.state = TokenizerState::StringDefault;
        }
        if take == 0 {
            Step::Reprocess
        } else {
            Step::Consumed(take)
        }
    }

    /// Reports the token in flight at the end of a chunk.
    fn emit_partial(&mut self) -> Result<(), ParseError> {
        use TokenizerState as S;

        let token = match self.state {
            S::True1 | S::True2 | S::True3 => Token::True,
            S::False1 | S::False2 | S::False3 | S::False4 => Token::False,
            S::Null1 | S::Null2 | S::Null3 => Token::Null,
            S::StringDefault
            | S::StringAfterBackslash
            | S::StringUnicodeDigit1
            | S::StringUnicodeDigit2
            | S::StringUnicodeDigit3
            | S::StringUnicodeDigit4
            | S::StringIncompleteChar => Token::String(self.string.as_str().into()),
            state if state.holds_complete_number() => Token::Number(self.parse_number()?),
            _ => return Ok(()),
        };
        self.emit(token, self.token_start, true)
    }
}
