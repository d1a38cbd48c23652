use alloc::{string::String, sync::Arc};
use core::fmt;

use crate::{Value, value::write_escaped_string};

/// A lexical unit produced by the [`Tokenizer`](crate::Tokenizer).
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `:`
    Colon,
    /// `,`
    Comma,
    /// `true`
    True,
    /// `false`
    False,
    /// `null`
    Null,
    /// A decoded string.
    String(String),
    /// A number.
    Number(f64),
    /// The configured top-level separator.
    Separator(Arc<str>),
}

impl Token {
    /// The token kind, spelled the way error messages print it.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::LeftBrace => "LEFT_BRACE",
            Self::RightBrace => "RIGHT_BRACE",
            Self::LeftBracket => "LEFT_BRACKET",
            Self::RightBracket => "RIGHT_BRACKET",
            Self::Colon => "COLON",
            Self::Comma => "COMMA",
            Self::True => "TRUE",
            Self::False => "FALSE",
            Self::Null => "NULL",
            Self::String(_) => "STRING",
            Self::Number(_) => "NUMBER",
            Self::Separator(_) => "SEPARATOR",
        }
    }
}

/// Renders as the kind followed by the token's JSON text, e.g. `STRING ("a")`.
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (", self.name())?;
        match self {
            Self::LeftBrace => f.write_str("\"{\"")?,
            Self::RightBrace => f.write_str("\"}\"")?,
            Self::LeftBracket => f.write_str("\"[\"")?,
            Self::RightBracket => f.write_str("\"]\"")?,
            Self::Colon => f.write_str("\":\"")?,
            Self::Comma => f.write_str("\",\"")?,
            Self::True => f.write_str("true")?,
            Self::False => f.write_str("false")?,
            Self::Null => f.write_str("null")?,
            Self::Number(n) => write!(f, "{}", Value::Number(*n))?,
            Self::String(s) => {
                f.write_str("\"")?;
                write_escaped_string(s, f)?;
                f.write_str("\"")?;
            }
            Self::Separator(s) => {
                f.write_str("\"")?;
                write_escaped_string(s, f)?;
                f.write_str("\"")?;
            }
        }
        f.write_str(")")
    }
}

/// Scalar tokens convert into values; every other token is handed back.
impl TryFrom<Token> for Value {
    type Error = Token;

    fn try_from(token: Token) -> Result<Self, Token> {
        match token {
            Token::True => Ok(Value::Boolean(true)),
            Token::False => Ok(Value::Boolean(false)),
            Token::Null => Ok(Value::Null),
            Token::String(s) => Ok(Value::String(s)),
            Token::Number(n) => Ok(Value::Number(n)),
            other => Err(other),
        }
    }
}

/// A token together with where it started and whether it is complete.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedToken {
    /// The token and its value.
    pub token: Token,
    /// Absolute byte offset of the token's first byte in the stream.
    pub offset: usize,
    /// `true` when the token is still being read and a later token will
    /// supersede it.
    pub partial: bool,
}

impl ParsedToken {
    /// A complete token.
    #[must_use]
    pub fn new(token: Token, offset: usize) -> Self {
        Self {
            token,
            offset,
            partial: false,
        }
    }
}
