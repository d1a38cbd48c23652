use alloc::{string::String, sync::Arc, vec::Vec};
use core::fmt;

/// A path to a JSON value, outermost key first.
pub type Path = Vec<PathItem>;

/// The position of a value inside its parent container.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathItem {
    /// A member name inside a JSON object.
    Key(Arc<str>),
    /// An index into a JSON array.
    Index(usize),
}

impl PathItem {
    /// The index, if this item addresses an array element.
    #[must_use]
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Index(i) => Some(*i),
            Self::Key(_) => None,
        }
    }

    /// The member name, if this item addresses an object member.
    #[must_use]
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Self::Key(k) => Some(k),
            Self::Index(_) => None,
        }
    }
}

impl fmt::Display for PathItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(k) => f.write_str(k),
            Self::Index(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for PathItem {
    fn from(s: &str) -> Self {
        Self::Key(s.into())
    }
}

impl From<String> for PathItem {
    fn from(s: String) -> Self {
        Self::Key(s.into())
    }
}

impl From<usize> for PathItem {
    fn from(i: usize) -> Self {
        Self::Index(i)
    }
}

#[doc(hidden)]
pub trait PathItemFrom<T> {
    fn from_path_component(value: T) -> PathItem;
}

// Integer literals in `path!` default to i32, so every integer width maps to
// an index.
macro_rules! impl_unsigned_as_path_component {
    ($($t:ty),+) => {
        $(
            impl PathItemFrom<$t> for PathItem {
                fn from_path_component(value: $t) -> Self {
                    #[allow(clippy::cast_possible_truncation)]
                    PathItem::Index(value as usize)
                }
            }
        )+
    };
}
impl_unsigned_as_path_component!(u8, u16, u32, u64, usize);

macro_rules! impl_signed_as_path_component {
    ($($t:ty),+) => {
        $(
            impl PathItemFrom<$t> for PathItem {
                fn from_path_component(value: $t) -> Self {
                    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
                    PathItem::Index(value.max(0) as usize)
                }
            }
        )+
    };
}
impl_signed_as_path_component!(i8, i16, i32, i64, isize);

impl PathItemFrom<&str> for PathItem {
    fn from_path_component(value: &str) -> Self {
        PathItem::Key(value.into())
    }
}
