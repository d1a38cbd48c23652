//! JSONPath-lite selectors deciding which values are emitted.
//!
//! A selector path is `$` followed by `.`-separated segments, each either a
//! literal key (array indices are written in decimal) or the `*` wildcard.
//! `$` alone selects the root, `$*` selects everything.
use alloc::{
    string::{String, ToString},
    vec::Vec,
};

use crate::{PathItem, SelectorError, StackFrame};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Wildcard,
    Name {
        name: String,
        /// Set when `name` is the canonical decimal spelling of an index.
        index: Option<usize>,
    },
}

impl Segment {
    fn parse(segment: &str) -> Self {
        if segment == "*" {
            return Self::Wildcard;
        }
        let index = segment
            .parse::<usize>()
            .ok()
            .filter(|i| i.to_string() == segment);
        Self::Name {
            name: segment.into(),
            index,
        }
    }

    fn matches(&self, key: Option<&PathItem>) -> bool {
        match (self, key) {
            (Self::Wildcard, _) => true,
            (Self::Name { name, .. }, Some(PathItem::Key(key))) => **key == **name,
            (Self::Name { index, .. }, Some(PathItem::Index(i))) => *index == Some(*i),
            (Self::Name { .. }, None) => false,
        }
    }
}

/// One parsed selector path; `None` segments means "match everything".
#[derive(Debug, Clone, PartialEq, Eq)]
struct SelectorPath {
    segments: Option<Vec<Segment>>,
}

impl SelectorPath {
    fn parse(path: &str) -> Result<Self, SelectorError> {
        if path == "$*" {
            return Ok(Self { segments: None });
        }
        if !path.starts_with('$') {
            return Err(SelectorError::MissingRoot(path.into()));
        }
        let segments = path
            .split('.')
            .skip(1)
            .map(|segment| {
                if segment.is_empty() {
                    Err(SelectorError::RecursiveDescent(path.into()))
                } else {
                    Ok(Segment::parse(segment))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            segments: Some(segments),
        })
    }

    fn matches(&self, stack: &[StackFrame], key: Option<&PathItem>) -> bool {
        let Some(segments) = &self.segments else {
            return true;
        };
        if segments.len() != stack.len() {
            return false;
        }
        let Some((last, ancestors)) = segments.split_last() else {
            // `$` selects the root value, the only one without a key.
            return key.is_none();
        };
        ancestors
            .iter()
            .zip(stack.iter().skip(1))
            .all(|(segment, frame)| segment.matches(frame.key.as_ref()))
            && last.matches(key)
    }
}

/// A set of selector paths; a value is selected when any of them matches.
///
/// # Examples
///
/// ```
/// use jsonpipe::Selector;
///
/// assert!(Selector::new(Some(["$.a.*"])).is_ok());
/// assert_eq!(
///     Selector::new(Some(["a.b"])).unwrap_err().to_string(),
///     r#"Invalid selector "a.b". Should start with "$"."#
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    /// `None` selects everything.
    paths: Option<Vec<SelectorPath>>,
}

impl Selector {
    /// Parses `paths`; `None` selects every value.
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError`] for a path that does not start with `$` or
    /// that contains an empty segment (`..`).
    pub fn new<I, S>(paths: Option<I>) -> Result<Self, SelectorError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let paths = paths
            .map(|paths| {
                paths
                    .into_iter()
                    .map(|path| SelectorPath::parse(path.as_ref()))
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;
        Ok(Self { paths })
    }

    /// Selects everything.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Whether the value stored under `key`, inside the containers described
    /// by `stack`, is selected.
    #[must_use]
    pub fn matches(&self, stack: &[StackFrame], key: Option<&PathItem>) -> bool {
        self.paths
            .as_ref()
            .is_none_or(|paths| paths.iter().any(|path| path.matches(stack, key)))
    }
}
