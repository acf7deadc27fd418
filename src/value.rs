//! Core value types for collection elements
//!
//! Every element of a collection is a [`Value`]. Scalars are represented
//! directly; associative elements are [`Record`]s and nested sequences are
//! full [`Collection`]s, which is what grouping, zipping and chunking
//! operators produce.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Serialize};

use crate::eager::Collection;
use crate::error::{CollectionError, Result};
use crate::record::{Label, Record};

/// Dynamic value type for collection elements
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Boolean value
    Boolean(bool),

    /// Integer value (64-bit signed)
    Integer(i64),

    /// Decimal value with arbitrary precision
    Decimal(Decimal),

    /// String value
    String(Arc<str>),

    /// Associative record (ordered field map)
    Record(Arc<Record>),

    /// Single-attribute wrapper record
    Label(Label),

    /// Nested collection of values
    Collection(Collection),
}

impl Value {
    /// Returns the integer if this is an `Integer` value
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the string slice if this is a `String` value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the record if this is a `Record` value
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Returns the nested collection if this is a `Collection` value
    pub fn as_collection(&self) -> Option<&Collection> {
        match self {
            Value::Collection(collection) => Some(collection),
            _ => None,
        }
    }

    /// True for `Integer` and `Decimal` values
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Decimal(_))
    }

    /// Numeric view of this value, when it has one
    pub fn to_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Integer(i) => Some(Decimal::from(*i)),
            Value::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    /// Total ordering used by `sort`, `sort_desc`, `min` and `max`.
    ///
    /// Numerics compare numerically across `Integer` and `Decimal`, strings
    /// lexicographically, booleans false-before-true. Heterogeneous values
    /// compare by type rank, which keeps the ordering total and the sort
    /// stable for ties.
    pub fn compare(&self, other: &Value) -> Ordering {
        if let (Some(a), Some(b)) = (self.to_decimal(), other.to_decimal()) {
            return a.cmp(&b);
        }
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (Value::String(a), Value::String(b)) => a.as_ref().cmp(b.as_ref()),
            (Value::Label(a), Value::Label(b)) => a.text().cmp(b.text()),
            _ => self.type_rank().cmp(&other.type_rank()),
        }
    }

    fn type_rank(&self) -> u8 {
        match self {
            Value::Boolean(_) => 0,
            Value::Integer(_) | Value::Decimal(_) => 1,
            Value::String(_) => 2,
            Value::Label(_) => 3,
            Value::Record(_) => 4,
            Value::Collection(_) => 5,
        }
    }

    /// Build a value from a `serde_json` literal.
    ///
    /// Arrays become positionally keyed collections and objects become
    /// records. JSON `null` has no counterpart and is rejected.
    pub fn from_json(json: &serde_json::Value) -> Result<Value> {
        match json {
            serde_json::Value::Null => Err(CollectionError::type_error(
                "null is not a collection value",
            )),
            serde_json::Value::Bool(b) => Ok(Value::Boolean(*b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Value::Integer(i))
                } else {
                    let f = n.as_f64().ok_or_else(|| {
                        CollectionError::type_error(format!("number {n} is out of range"))
                    })?;
                    let d = Decimal::try_from(f).map_err(|_| {
                        CollectionError::type_error(format!("number {n} is out of range"))
                    })?;
                    Ok(Value::Decimal(d))
                }
            }
            serde_json::Value::String(s) => Ok(Value::from(s.as_str())),
            serde_json::Value::Array(items) => {
                let values = items
                    .iter()
                    .map(Value::from_json)
                    .collect::<Result<Vec<_>>>()?;
                Ok(Value::Collection(Collection::from_values(values)))
            }
            serde_json::Value::Object(fields) => {
                let mut record = Record::new();
                for (name, field) in fields {
                    record.set(name.as_str(), Value::from_json(field)?);
                }
                Ok(Value::Record(Arc::new(record)))
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Decimal(d) => write!(f, "{d}"),
            Value::String(s) => write!(f, "{s}"),
            Value::Label(label) => write!(f, "{}", label.text()),
            Value::Record(record) => write!(f, "{record}"),
            Value::Collection(collection) => {
                write!(f, "[")?;
                for (i, (_, value)) in collection.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{value}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i as i64)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Decimal(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Arc::from(s.as_str()))
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Record(Arc::new(record))
    }
}

impl From<Collection> for Value {
    fn from(collection: Collection) -> Self {
        Value::Collection(collection)
    }
}

/// Map field marking a serialized decimal, so that precision survives
/// formats whose native numbers are floats
const DECIMAL_FIELD: &str = "$decimal";

/// Serialization representation:
///
/// - scalars serialize natively, except `Decimal`, which serializes as a
///   single-entry map `{"$decimal": "<exact rendition>"}` — floating-point
///   numbers cannot carry its full precision;
/// - positionally keyed collections serialize as sequences and round-trip
///   exactly;
/// - associative collections serialize as maps and deserialize as records,
///   the same representation records use.
impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Decimal(d) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(DECIMAL_FIELD, d)?;
                map.end()
            }
            Value::String(s) => serializer.serialize_str(s),
            Value::Label(label) => serializer.serialize_str(label.text()),
            Value::Record(record) => {
                let mut map = serializer.serialize_map(Some(record.len()))?;
                for (name, value) in record.fields() {
                    map.serialize_entry(name.as_ref(), value)?;
                }
                map.end()
            }
            Value::Collection(collection) => {
                // Positionally keyed collections round-trip as sequences;
                // associative ones serialize as maps keyed by rendition.
                if collection.iter().all(|(k, _)| k.as_index().is_some()) {
                    let mut seq = serializer.serialize_seq(Some(collection.len()))?;
                    for (_, value) in collection.iter() {
                        seq.serialize_element(value)?;
                    }
                    seq.end()
                } else {
                    let mut map = serializer.serialize_map(Some(collection.len()))?;
                    for (key, value) in collection.iter() {
                        map.serialize_entry(&key.to_string(), value)?;
                    }
                    map.end()
                }
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a collection value")
            }

            fn visit_bool<E>(self, value: bool) -> std::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Value::Boolean(value))
            }

            fn visit_i64<E>(self, value: i64) -> std::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Value::Integer(value))
            }

            fn visit_u64<E>(self, value: u64) -> std::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                i64::try_from(value)
                    .map(Value::Integer)
                    .map_err(|_| E::custom(format!("integer {value} is out of range")))
            }

            fn visit_f64<E>(self, value: f64) -> std::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                Decimal::try_from(value)
                    .map(Value::Decimal)
                    .map_err(|_| E::custom(format!("number {value} is out of range")))
            }

            fn visit_str<E>(self, value: &str) -> std::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Value::from(value))
            }

            fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut values = Vec::new();
                while let Some(value) = seq.next_element()? {
                    values.push(value);
                }
                Ok(Value::Collection(Collection::from_values(values)))
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut record = Record::new();
                while let Some((name, value)) = map.next_entry::<String, Value>()? {
                    record.set(name.as_str(), value);
                }

                // A single-entry decimal marker map restores the decimal it
                // was serialized from.
                if record.len() == 1 {
                    if let Some(Value::String(text)) = record.get(DECIMAL_FIELD) {
                        if let Ok(d) = Decimal::from_str_exact(text) {
                            return Ok(Value::Decimal(d));
                        }
                    }
                }

                Ok(Value::Record(Arc::new(record)))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_comparison_crosses_variants() {
        let one = Value::Integer(1);
        let one_decimal = Value::Decimal(Decimal::from(1));
        let two = Value::Integer(2);

        assert_eq!(one.compare(&one_decimal), Ordering::Equal);
        assert_eq!(one.compare(&two), Ordering::Less);
        assert_eq!(two.compare(&one), Ordering::Greater);
    }

    #[test]
    fn test_display_rendition() {
        assert_eq!(Value::Integer(42).to_string(), "42");
        assert_eq!(Value::from("hello").to_string(), "hello");
        assert_eq!(
            Value::Collection(Collection::from_values(vec![1.into(), 2.into()])).to_string(),
            "[1, 2]"
        );
    }

    #[test]
    fn test_from_json_literal() {
        let json = serde_json::json!({"name": "Ada", "division": "Compilers"});
        let value = Value::from_json(&json).unwrap();
        let record = value.as_record().unwrap();
        assert_eq!(record.get("name"), Some(&Value::from("Ada")));

        assert!(Value::from_json(&serde_json::Value::Null).is_err());
    }

    #[test]
    fn test_deserialize_sequence_to_collection() {
        let value: Value = serde_json::from_str("[1, 2, 3]").unwrap();
        let collection = value.as_collection().unwrap();
        assert_eq!(collection.len(), 3);
        assert_eq!(collection.values(), vec![1.into(), 2.into(), 3.into()]);
    }

    #[test]
    fn test_serde_round_trip_keeps_decimal_precision() {
        let original = Value::Decimal(
            Decimal::from_str_exact("0.1000000000000000000000000001").unwrap(),
        );

        let json = serde_json::to_string(&original).unwrap();
        assert_eq!(json, r#"{"$decimal":"0.1000000000000000000000000001"}"#);

        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn test_serde_round_trip_positional_collection() {
        let original = Value::Collection(Collection::from_values([
            Value::Integer(1),
            Value::from("two"),
            Value::Decimal(Decimal::from_str_exact("3.50").unwrap()),
            Value::Boolean(true),
        ]));

        let json = serde_json::to_string(&original).unwrap();
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn test_serde_associative_collection_becomes_record() {
        use crate::key::Key;

        let original = Value::Collection(Collection::from_pairs([
            (Key::name("name"), Value::from("Ada")),
            (Key::name("score"), Value::Integer(100)),
        ]));

        let json = serde_json::to_string(&original).unwrap();
        assert_eq!(json, r#"{"name":"Ada","score":100}"#);

        // Maps deserialize as records, the shared associative shape.
        let back: Value = serde_json::from_str(&json).unwrap();
        let expected = Value::from(
            Record::new()
                .with("name", "Ada".into())
                .with("score", Value::Integer(100)),
        );
        assert_eq!(back, expected);
    }
}
