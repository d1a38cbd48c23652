use alloc::string::String;

use bstr::BStr;
use thiserror::Error;

use crate::{Token, TokenParserState, TokenizerState};

/// Any failure raised while configuring or driving a parser.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Lexical failure or misuse of the [`Tokenizer`](crate::Tokenizer).
    #[error(transparent)]
    Tokenizer(#[from] TokenizerError),
    /// Structural failure in the [`TokenParser`](crate::TokenParser).
    #[error(transparent)]
    TokenParser(#[from] TokenParserError),
    /// A selector path was rejected at construction time.
    #[error(transparent)]
    Selector(#[from] SelectorError),
    /// Data reached a stage whose callback was never configured.
    #[error("Can't emit data before the \"{0}\" callback has been set up.")]
    CallbackNotSet(&'static str),
}

/// Errors raised by the [`Tokenizer`](crate::Tokenizer).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TokenizerError {
    /// A byte that no transition of the current state accepts.
    #[error("Unexpected \"{}\" at position \"{offset}\" in state {state}", display_byte(.byte))]
    UnexpectedByte {
        /// The offending byte.
        byte: u8,
        /// Absolute offset of the byte in the stream.
        offset: usize,
        /// State the tokenizer was in.
        state: TokenizerState,
    },
    /// `end` was called while a string, literal or incomplete number was open.
    #[error(
        "Tokenizer ended in the middle of a token (state: {state}). Either not all the data was received or the data was invalid."
    )]
    EndedMidToken {
        /// State the tokenizer was in.
        state: TokenizerState,
    },
    /// The tokenizer already ended or failed.
    #[error("Tokenizer is closed (state: {state}) and cannot accept more input.")]
    Closed {
        /// State the tokenizer was in.
        state: TokenizerState,
    },
    /// Accumulated number text that does not parse as a float.
    #[error("Invalid number \"{0}\"")]
    InvalidNumber(String),
}

/// Errors raised by the [`TokenParser`](crate::TokenParser).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TokenParserError {
    /// A token that the current state does not accept.
    #[error("Unexpected {token} in state {state}")]
    UnexpectedToken {
        /// The offending token.
        token: Token,
        /// State the parser was in.
        state: TokenParserState,
    },
    /// `end` was called away from a top-level value boundary.
    #[error(
        "Parser ended in mid-parsing (state: {state}). Either not all the data was received or the data was invalid."
    )]
    EndedMidParsing {
        /// State the parser was in.
        state: TokenParserState,
    },
}

/// Malformed selector paths.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    /// Every selector is rooted at `$`.
    #[error("Invalid selector \"{0}\". Should start with \"$\".")]
    MissingRoot(String),
    /// Recursive descent (`..`) is not available.
    #[error("Invalid selector \"{0}\". \"..\" syntax not supported.")]
    RecursiveDescent(String),
}

fn display_byte(byte: &u8) -> &BStr {
    BStr::new(core::slice::from_ref(byte))
}
