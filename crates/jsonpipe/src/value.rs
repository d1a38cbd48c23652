//! JSON value types built by the [`TokenParser`](crate::TokenParser).
//!
//! [`Value`] is the tagged union every emitted element is expressed in. Object
//! keys are shared [`Arc<str>`] so that the parser can hand the same key to the
//! ancestor stack, the emitted [`PathItem`] and the containing map without
//! copying it.
use alloc::{collections::BTreeMap, string::String, sync::Arc, vec::Vec};
use core::fmt::Write;

use crate::PathItem;

/// Members of a JSON object, ordered by key.
pub type Map = BTreeMap<Arc<str>, Value>;
/// Elements of a JSON array.
pub type Array = Vec<Value>;

/// A JSON value as defined by [RFC 8259].
///
/// Numbers are always stored as `f64`; integers beyond 2^53 lose precision the
/// same way they would in any standard JSON number parse.
///
/// # Examples
///
/// ```
/// use jsonpipe::{Map, Value};
///
/// let mut map = Map::new();
/// map.insert("key".into(), Value::String("value".into()));
/// let v = Value::Object(map);
/// assert_eq!(v.to_string(), r#"{"key":"value"}"#);
/// ```
///
/// [RFC 8259]: https://datatracker.ietf.org/doc/html/rfc8259
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// `null`
    #[default]
    Null,
    /// `true` or `false`
    Boolean(bool),
    /// Any JSON number.
    Number(f64),
    /// A decoded string.
    String(String),
    /// An array of values.
    Array(Array),
    /// An object.
    Object(Map),
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.into())
    }
}

impl From<Array> for Value {
    fn from(v: Array) -> Self {
        Self::Array(v)
    }
}

impl From<Map> for Value {
    fn from(v: Map) -> Self {
        Self::Object(v)
    }
}

impl Value {
    /// Returns `true` if the value is [`Null`].
    ///
    /// [`Null`]: Value::Null
    ///
    /// # Examples
    ///
    /// ```
    /// use jsonpipe::Value;
    ///
    /// assert!(Value::Null.is_null());
    /// assert!(!Value::Boolean(false).is_null());
    /// ```
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the boolean if the value is a [`Boolean`](Value::Boolean).
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the number if the value is a [`Number`](Value::Number).
    ///
    /// # Examples
    ///
    /// ```
    /// use jsonpipe::Value;
    ///
    /// assert_eq!(Value::Number(1.5).as_f64(), Some(1.5));
    /// assert_eq!(Value::Null.as_f64(), None);
    /// ```
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the string slice if the value is a [`String`](Value::String).
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the elements if the value is an [`Array`](Value::Array).
    #[must_use]
    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Returns the members if the value is an [`Object`](Value::Object).
    #[must_use]
    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Self::Object(m) => Some(m),
            _ => None,
        }
    }

    /// Number of direct children of a container, `None` for scalars.
    ///
    /// # Examples
    ///
    /// ```
    /// use jsonpipe::Value;
    ///
    /// assert_eq!(Value::Array(vec![Value::Null]).len(), Some(1));
    /// assert_eq!(Value::Null.len(), None);
    /// ```
    #[must_use]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::Array(a) => Some(a.len()),
            Self::Object(m) => Some(m.len()),
            _ => None,
        }
    }

    /// Looks up the direct child stored under `key`.
    #[must_use]
    pub fn child(&self, key: &PathItem) -> Option<&Value> {
        match (self, key) {
            (Self::Array(a), PathItem::Index(i)) => a.get(*i),
            (Self::Object(m), PathItem::Key(k)) => m.get(k),
            _ => None,
        }
    }

    pub(crate) fn child_mut(&mut self, key: &PathItem) -> Option<&mut Value> {
        match (self, key) {
            (Self::Array(a), PathItem::Index(i)) => a.get_mut(*i),
            (Self::Object(m), PathItem::Key(k)) => m.get_mut(k),
            _ => None,
        }
    }

    /// Stores `value` as the direct child `key` of this container.
    ///
    /// Array indices past the end append. A key of the wrong kind for the
    /// container, or a scalar receiver, drops the value.
    pub(crate) fn insert_child(&mut self, key: &PathItem, value: Value) {
        match (self, key) {
            (Self::Array(a), PathItem::Index(i)) => match a.get_mut(*i) {
                Some(slot) => *slot = value,
                None => a.push(value),
            },
            (Self::Object(m), PathItem::Key(k)) => {
                m.insert(Arc::clone(k), value);
            }
            _ => {}
        }
    }
}

/// Escapes a string for inclusion in a JSON string literal.
///
/// Quotes, backslashes, control characters in the basic multilingual plane
/// and the Unicode line separators are written as escape sequences.
pub(crate) fn write_escaped_string<W: Write>(src: &str, f: &mut W) -> core::fmt::Result {
    for c in src.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\u{2028}' | '\u{2029}' => write!(f, "\\u{:04X}", c as u32)?,
            c if c.is_ascii_control() || c.is_control() && c as u32 <= 0xFFFF => {
                write!(f, "\\u{:04X}", c as u32)?;
            }
            _ => f.write_char(c)?,
        }
    }
    Ok(())
}

fn write_quoted<W: Write>(src: &str, f: &mut W) -> core::fmt::Result {
    f.write_char('"')?;
    write_escaped_string(src, f)?;
    f.write_char('"')
}

impl core::fmt::Display for Value {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => f.write_str(if *b { "true" } else { "false" }),
            // JSON has no spelling for infinities; `1e400` parses to one.
            Value::Number(n) if !n.is_finite() => f.write_str("null"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => write_quoted(s, f),
            Value::Array(arr) => {
                f.write_char('[')?;
                for (i, v) in arr.iter().enumerate() {
                    if i > 0 {
                        f.write_char(',')?;
                    }
                    write!(f, "{v}")?;
                }
                f.write_char(']')
            }
            Value::Object(map) => {
                f.write_char('{')?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_char(',')?;
                    }
                    write_quoted(k, f)?;
                    write!(f, ":{v}")?;
                }
                f.write_char('}')
            }
        }
    }
}
