//! Collection keys
//!
//! Every entry in an [`OrderedMap`](crate::OrderedMap) is addressed by a
//! tagged key: either a positional index assigned by insertion order, or a
//! caller-supplied name. The two arms never coerce into each other — the
//! named key `"3"` and the positional key `3` address different entries.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::CollectionError;
use crate::value::Value;

/// A collection key: positional index or name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Positional key (0-based, assigned by insertion order)
    Index(usize),
    /// Named key (caller-supplied string)
    Name(Arc<str>),
}

impl Key {
    /// Returns the positional index if this is an `Index` key
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Key::Index(i) => Some(*i),
            Key::Name(_) => None,
        }
    }

    /// Returns the name if this is a `Name` key
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Key::Index(_) => None,
            Key::Name(name) => Some(name),
        }
    }

    /// Create a named key
    pub fn name(name: impl AsRef<str>) -> Self {
        Key::Name(Arc::from(name.as_ref()))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Index(i) => write!(f, "{i}"),
            Key::Name(name) => write!(f, "{name}"),
        }
    }
}

impl From<usize> for Key {
    fn from(index: usize) -> Self {
        Key::Index(index)
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Name(Arc::from(name))
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Name(Arc::from(name.as_str()))
    }
}

/// Convert a value into a key, as required by `combine`, `group_by` and
/// `map_to_groups`: non-negative integers become positional keys, strings
/// become named keys, everything else is rejected.
impl TryFrom<&Value> for Key {
    type Error = CollectionError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Integer(i) if *i >= 0 => Ok(Key::Index(*i as usize)),
            Value::String(s) => Ok(Key::Name(s.clone())),
            other => Err(CollectionError::invalid_argument(format!(
                "value {other} cannot be used as a key"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_key_is_distinct_from_positional() {
        assert_ne!(Key::from("3"), Key::Index(3));
    }

    #[test]
    fn test_key_from_value() {
        assert_eq!(Key::try_from(&Value::Integer(2)), Ok(Key::Index(2)));
        assert_eq!(Key::try_from(&Value::from("name")), Ok(Key::name("name")));
        assert!(Key::try_from(&Value::Boolean(true)).is_err());
        assert!(Key::try_from(&Value::Integer(-1)).is_err());
    }
}
