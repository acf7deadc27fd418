//! Associative records and the single-attribute wrapper record

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::value::Value;

/// An ordered, string-keyed field map with value equality.
///
/// Records are the associative element shape consumed by
/// [`Collection::group_by_field`](crate::Collection::group_by_field).
/// Field insertion order is preserved; overwriting a field keeps its
/// original position.
#[derive(Debug, Clone, Default)]
pub struct Record {
    fields: IndexMap<Arc<str>, Value>,
}

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self {
            fields: IndexMap::new(),
        }
    }

    /// Create a record from an ordered sequence of field/value pairs
    pub fn from_pairs<N, I>(pairs: I) -> Self
    where
        N: AsRef<str>,
        I: IntoIterator<Item = (N, Value)>,
    {
        let mut record = Self::new();
        for (name, value) in pairs {
            record.set(name, value);
        }
        record
    }

    /// Get a field's value, or `None` if the field is absent
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Insert or overwrite a field
    pub fn set(&mut self, name: impl AsRef<str>, value: Value) {
        self.fields.insert(Arc::from(name.as_ref()), value);
    }

    /// Builder-style `set`, for literal construction
    pub fn with(mut self, name: impl AsRef<str>, value: Value) -> Self {
        self.set(name, value);
        self
    }

    /// Iterate fields in insertion order
    pub fn fields(&self) -> impl Iterator<Item = (&Arc<str>, &Value)> {
        self.fields.iter()
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        write!(f, "}}")
    }
}

/// Immutable record with exactly one textual attribute and value equality.
///
/// This is the wrapper type targeted by
/// [`Collection::map_into`](crate::Collection::map_into): converting from a
/// [`Value`] captures that value's string rendition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Label {
    text: Arc<str>,
}

impl Label {
    /// Create a label from any text
    pub fn new(text: impl AsRef<str>) -> Self {
        Self {
            text: Arc::from(text.as_ref()),
        }
    }

    /// The label's text
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl From<&Value> for Label {
    fn from(value: &Value) -> Self {
        Label::new(value.to_string())
    }
}

impl From<Label> for Value {
    fn from(label: Label) -> Self {
        Value::Label(label)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_value_equality() {
        let a = Record::new().with("name", "Ada".into());
        let b = Record::from_pairs([("name", Value::from("Ada"))]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_record_overwrite_keeps_position() {
        let mut record = Record::from_pairs([
            ("first", Value::Integer(1)),
            ("second", Value::Integer(2)),
        ]);
        record.set("first", Value::Integer(10));
        let names: Vec<_> = record.fields().map(|(n, _)| n.as_ref().to_owned()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn test_label_equality_by_value() {
        assert_eq!(Label::new("Ada"), Label::new("Ada"));
        assert_ne!(Label::new("Ada"), Label::new("Grace"));
        assert_eq!(Label::from(&Value::Integer(7)).text(), "7");
    }
}
