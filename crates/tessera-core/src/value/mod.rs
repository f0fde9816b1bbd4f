#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

///
/// Value
/// dynamic slot value, lookup argument and prepared parameter
///
/// Null        → the slot holds no value (SQL NULL).
/// List        → an ordered tuple; composite lookups use it for row values.
///
/// Variant order is significant: the derived ordering sorts `Null` first.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Value {
    Null,
    Blob(Vec<u8>),
    Bool(bool),
    Int(i64),
    Int128(i128),
    List(Vec<Self>),
    Text(String),
    Uint(u64),
    Uint128(u128),
}

impl Value {
    /// Build a tuple value from anything that yields values.
    pub fn tuple<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Self>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Short variant label used in diagnostics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Blob(_) => "blob",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Int128(_) => "int128",
            Self::List(_) => "list",
            Self::Text(_) => "text",
            Self::Uint(_) => "uint",
            Self::Uint128(_) => "uint128",
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Blob(bytes) => {
                write!(f, "0x")?;
                for b in bytes {
                    write!(f, "{b:02x}")?;
                }
                Ok(())
            }
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Int128(v) => write!(f, "{v}"),
            Self::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
            Self::Text(s) => write!(f, "{s}"),
            Self::Uint(v) => write!(f, "{v}"),
            Self::Uint128(v) => write!(f, "{v}"),
        }
    }
}

//
// From
//

macro_rules! impl_from_value {
    ( $( $ty:ty => $variant:ident ),* $(,)? ) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::$variant(v.into())
                }
            }
        )*
    };
}

impl_from_value! {
    bool => Bool,
    i8 => Int,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    i128 => Int128,
    u8 => Uint,
    u16 => Uint,
    u32 => Uint,
    u64 => Uint,
    u128 => Uint128,
    String => Text,
    &str => Text,
    Vec<u8> => Blob,
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}
