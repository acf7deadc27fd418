//! Eager collection operators
//!
//! [`Collection`] wraps one [`OrderedMap`] exclusively; every operator runs
//! to completion and returns a freshly allocated collection (or a scalar),
//! leaving the receiver untouched. The only mutating exceptions are the
//! structural pair `push` and `pop`.
//!
//! The load-bearing contract throughout is which keys a result carries:
//! "preserves keys" means source keys (positional or named) survive into the
//! result, "re-indexes" means the result gets fresh positional keys `0..n`
//! regardless of source keys. Each operator documents its choice.

use indexmap::IndexMap;
use log::trace;

use crate::error::{CollectionError, Result};
use crate::key::Key;
use crate::ordered_map::OrderedMap;
use crate::value::Value;

/// Ordered, optionally-keyed eager collection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    map: OrderedMap,
}

impl Collection {
    /// Create an empty collection
    pub fn new() -> Self {
        Self {
            map: OrderedMap::new(),
        }
    }

    /// Create a collection from values under fresh positional keys
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        Self {
            map: OrderedMap::from_values(values),
        }
    }

    /// Create a collection from explicit key/value pairs
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Key, Value)>,
    {
        Self {
            map: OrderedMap::from_pairs(pairs),
        }
    }

    /// Build a collection from a `serde_json` array or object literal
    pub fn from_json(json: &serde_json::Value) -> Result<Self> {
        match Value::from_json(json)? {
            Value::Collection(collection) => Ok(collection),
            Value::Record(record) => Ok(Self::from_pairs(
                record
                    .fields()
                    .map(|(name, value)| (Key::Name(name.clone()), value.clone())),
            )),
            other => Err(CollectionError::type_error(format!(
                "expected a sequence or record literal, got {other}"
            ))),
        }
    }

    /// Ordered (key, value) pairs backing the collection, as a defensive copy
    pub fn all(&self) -> Vec<(Key, Value)> {
        self.map.all()
    }

    /// Ordered values without their keys
    pub fn values(&self) -> Vec<Value> {
        self.map.values()
    }

    /// Iterate entries in order without copying
    pub fn iter(&self) -> indexmap::map::Iter<'_, Key, Value> {
        self.map.iter()
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True when the collection holds no elements
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// True when the collection holds at least one element
    pub fn is_not_empty(&self) -> bool {
        !self.is_empty()
    }

    /// Look up a value by key
    pub fn get(&self, key: &Key) -> Option<&Value> {
        self.map.get(key)
    }

    /// Insert or overwrite an entry (OrderedMap position rules)
    pub fn set(&mut self, key: impl Into<Key>, value: Value) {
        self.map.set(key, value);
    }

    /// Append values under fresh positional keys; mutates the receiver and
    /// returns it for chaining
    pub fn push<I>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = Value>,
    {
        self.map.push(values);
        self
    }

    /// Remove and return the last element
    pub fn pop(&mut self) -> Result<Value> {
        self.map.pop()
    }

    // ---- transformation -------------------------------------------------

    /// Apply `f` to every element in order. Preserves keys; result length
    /// equals source length.
    pub fn map<F>(&self, f: F) -> Collection
    where
        F: Fn(&Value) -> Value,
    {
        Self::from_pairs(self.map.iter().map(|(k, v)| (k.clone(), f(v))))
    }

    /// Wrap every element in a constructible record type. Preserves keys.
    ///
    /// `T` is typically [`Label`](crate::Label): conversion from a value
    /// captures its string rendition.
    pub fn map_into<T>(&self) -> Collection
    where
        T: for<'a> From<&'a Value> + Into<Value>,
    {
        self.map(|v| T::from(v).into())
    }

    /// Call `f` with each element's inner values spread positionally.
    ///
    /// Every element must itself be a nested collection; its values are
    /// passed as a slice in order. Re-indexes the result.
    pub fn map_spread<F>(&self, f: F) -> Result<Collection>
    where
        F: Fn(&[Value]) -> Value,
    {
        let mut values = Vec::with_capacity(self.len());
        for (_, value) in self.map.iter() {
            let row = value.as_collection().ok_or_else(|| {
                CollectionError::type_error(format!(
                    "map_spread requires sequence elements, got {value}"
                ))
            })?;
            values.push(f(&row.values()));
        }
        Ok(Self::from_values(values))
    }

    /// Distribute elements into groups named by `f`.
    ///
    /// `f` returns one (group key, item) pair per element. Items sharing a
    /// group key collect, in first-seen order, into one nested collection
    /// per key; the result is keyed by group key in first-occurrence order,
    /// with group members re-indexed.
    pub fn map_to_groups<F>(&self, f: F) -> Result<Collection>
    where
        F: Fn(&Value) -> (Value, Value),
    {
        let mut groups: IndexMap<Key, Vec<Value>> = IndexMap::new();
        for (_, value) in self.map.iter() {
            let (group_key, item) = f(value);
            groups.entry(Key::try_from(&group_key)?).or_default().push(item);
        }
        trace!("map_to_groups produced {} groups", groups.len());
        Ok(Self::from_pairs(groups.into_iter().map(|(key, items)| {
            (key, Value::Collection(Self::from_values(items)))
        })))
    }

    /// Apply `f` to every element and concatenate the returned iterables in
    /// source order. Re-indexes the result.
    pub fn flat_map<F, I>(&self, f: F) -> Collection
    where
        F: Fn(&Value) -> I,
        I: IntoIterator<Item = Value>,
    {
        Self::from_values(self.map.iter().flat_map(|(_, v)| f(v)))
    }

    /// Group elements by the key computed by `f(value, key)`.
    ///
    /// Group key equality is value equality after the callback's transform.
    /// Groups preserve element order (members re-indexed); the result is
    /// keyed by distinct group key in first-seen order.
    pub fn group_by<F>(&self, f: F) -> Result<Collection>
    where
        F: Fn(&Value, &Key) -> Value,
    {
        let mut groups: IndexMap<Key, Vec<Value>> = IndexMap::new();
        for (key, value) in self.map.iter() {
            let group_key = f(value, key);
            groups
                .entry(Key::try_from(&group_key)?)
                .or_default()
                .push(value.clone());
        }
        trace!("group_by produced {} groups", groups.len());
        Ok(Self::from_pairs(groups.into_iter().map(|(key, members)| {
            (key, Value::Collection(Self::from_values(members)))
        })))
    }

    /// Group record elements by the value of one field.
    ///
    /// Every element must be a record carrying the field; grouping semantics
    /// match [`group_by`](Self::group_by).
    pub fn group_by_field(&self, field: &str) -> Result<Collection> {
        let mut groups: IndexMap<Key, Vec<Value>> = IndexMap::new();
        for (_, value) in self.map.iter() {
            let record = value.as_record().ok_or_else(|| {
                CollectionError::type_error(format!(
                    "group_by_field requires record elements, got {value}"
                ))
            })?;
            let group_key = record.get(field).ok_or_else(|| {
                CollectionError::type_error(format!("record {record} has no field {field}"))
            })?;
            groups
                .entry(Key::try_from(group_key)?)
                .or_default()
                .push(value.clone());
        }
        Ok(Self::from_pairs(groups.into_iter().map(|(key, members)| {
            (key, Value::Collection(Self::from_values(members)))
        })))
    }

    // ---- filtering and partitioning -------------------------------------

    /// Keep entries where `pred(value, key)` holds. Preserves original
    /// keys: filtering an associative collection keeps its named keys, and
    /// filtering a positional collection leaves gaps in the index sequence.
    pub fn filter<F>(&self, pred: F) -> Collection
    where
        F: Fn(&Value, &Key) -> bool,
    {
        Self::from_pairs(
            self.map
                .iter()
                .filter(|(k, v)| pred(v, k))
                .map(|(k, v)| (k.clone(), v.clone())),
        )
    }

    /// Split into `(matching, non_matching)` by `pred`, each side with keys
    /// preserved exactly as in [`filter`](Self::filter)
    pub fn partition<F>(&self, pred: F) -> (Collection, Collection)
    where
        F: Fn(&Value, &Key) -> bool,
    {
        let mut matching = Collection::new();
        let mut rest = Collection::new();
        for (key, value) in self.map.iter() {
            if pred(value, key) {
                matching.set(key.clone(), value.clone());
            } else {
                rest.set(key.clone(), value.clone());
            }
        }
        (matching, rest)
    }

    // ---- combination -----------------------------------------------------

    /// Pairwise-combine with `other` into two-element rows, truncated to the
    /// shorter operand. Re-indexes the result.
    pub fn zip(&self, other: &Collection) -> Collection {
        Self::from_values(
            self.map
                .iter()
                .zip(other.map.iter())
                .map(|((_, a), (_, b))| {
                    Value::Collection(Self::from_values([a.clone(), b.clone()]))
                }),
        )
    }

    /// Append all of `other`'s values after this collection's. Re-indexes
    /// both sides, so key collisions cannot occur.
    pub fn concat(&self, other: &Collection) -> Collection {
        Self::from_values(self.values().into_iter().chain(other.values()))
    }

    /// Use this collection's values as keys and `other`'s values at the same
    /// position as values, pairing up to the shorter length.
    pub fn combine(&self, other: &Collection) -> Result<Collection> {
        let mut result = Collection::new();
        for ((_, key_value), (_, value)) in self.map.iter().zip(other.map.iter()) {
            result.set(Key::try_from(key_value)?, value.clone());
        }
        Ok(result)
    }

    /// Concatenate nested elements in outer-then-inner order into one flat
    /// result. Every element must be a nested collection. Re-indexes.
    pub fn collapse(&self) -> Result<Collection> {
        let mut values = Vec::new();
        for (_, value) in self.map.iter() {
            let inner = value.as_collection().ok_or_else(|| {
                CollectionError::type_error(format!(
                    "collapse requires sequence elements, got {value}"
                ))
            })?;
            values.extend(inner.values());
        }
        Ok(Self::from_values(values))
    }

    // ---- string rendition ------------------------------------------------

    /// Concatenate element renditions with `glue` between every pair
    pub fn join(&self, glue: &str) -> String {
        self.join_final(glue, glue)
    }

    /// Concatenate element renditions with `glue` between every pair except
    /// the final one, which uses `final_glue`. A single element is returned
    /// unglued; an empty collection yields the empty string.
    pub fn join_final(&self, glue: &str, final_glue: &str) -> String {
        let parts: Vec<String> = self.map.iter().map(|(_, v)| v.to_string()).collect();
        match parts.split_last() {
            None => String::new(),
            Some((last, [])) => last.clone(),
            Some((last, rest)) => format!("{}{final_glue}{last}", rest.join(glue)),
        }
    }

    // ---- slicing ---------------------------------------------------------

    /// Elements from `offset` spanning `length` elements (to the end when
    /// absent). A negative offset counts from the end. Preserves keys.
    pub fn slice(&self, offset: i64, length: Option<usize>) -> Collection {
        let len = self.len();
        let start = if offset < 0 {
            len.saturating_sub(offset.unsigned_abs() as usize)
        } else {
            (offset as usize).min(len)
        };
        let end = match length {
            Some(length) => (start + length).min(len),
            None => len,
        };
        Self::from_pairs(
            self.map
                .iter()
                .skip(start)
                .take(end - start)
                .map(|(k, v)| (k.clone(), v.clone())),
        )
    }

    /// The first `n` elements, or the last `|n|` when `n` is negative.
    /// Preserves keys.
    pub fn take(&self, n: i64) -> Collection {
        if n < 0 {
            self.slice(n, None)
        } else {
            self.slice(0, Some(n as usize))
        }
    }

    /// The longest prefix whose elements satisfy `pred`, stopping at the
    /// first failure. Preserves keys.
    pub fn take_while<F>(&self, pred: F) -> Collection
    where
        F: Fn(&Value, &Key) -> bool,
    {
        Self::from_pairs(
            self.map
                .iter()
                .take_while(|(k, v)| pred(v, k))
                .map(|(k, v)| (k.clone(), v.clone())),
        )
    }

    /// The longest prefix before the first element satisfying `pred`; the
    /// matching element is excluded. Preserves keys.
    pub fn take_until<F>(&self, pred: F) -> Collection
    where
        F: Fn(&Value, &Key) -> bool,
    {
        self.take_while(|v, k| !pred(v, k))
    }

    /// Drop the first `n` elements and return the rest. Preserves keys.
    pub fn skip(&self, n: usize) -> Collection {
        Self::from_pairs(self.map.iter().skip(n).map(|(k, v)| (k.clone(), v.clone())))
    }

    /// Drop the prefix while `pred` holds; the remainder starts at the first
    /// failing element. Preserves keys.
    pub fn skip_while<F>(&self, pred: F) -> Collection
    where
        F: Fn(&Value, &Key) -> bool,
    {
        Self::from_pairs(
            self.map
                .iter()
                .skip_while(|(k, v)| pred(v, k))
                .map(|(k, v)| (k.clone(), v.clone())),
        )
    }

    /// Drop the prefix until `pred` first holds; the remainder starts at the
    /// first matching element. Preserves keys.
    pub fn skip_until<F>(&self, pred: F) -> Collection
    where
        F: Fn(&Value, &Key) -> bool,
    {
        self.skip_while(|v, k| !pred(v, k))
    }

    /// Split into consecutive nested collections of at most `size` elements,
    /// in order; the final chunk may be shorter. Keys are preserved inside
    /// each chunk; the chunk sequence itself is positionally keyed.
    pub fn chunk(&self, size: usize) -> Result<Collection> {
        if size == 0 {
            return Err(CollectionError::invalid_argument("chunk size must be at least 1"));
        }
        let entries = self.all();
        Ok(Self::from_values(entries.chunks(size).map(|chunk| {
            Value::Collection(Self::from_pairs(chunk.iter().cloned()))
        })))
    }

    // ---- element access and membership -----------------------------------

    /// The first element in iteration order
    pub fn first(&self) -> Option<&Value> {
        self.map.iter().next().map(|(_, v)| v)
    }

    /// The first element satisfying `pred`
    pub fn first_where<F>(&self, pred: F) -> Option<&Value>
    where
        F: Fn(&Value, &Key) -> bool,
    {
        self.map.iter().find(|(k, v)| pred(v, k)).map(|(_, v)| v)
    }

    /// The last element in iteration order
    pub fn last(&self) -> Option<&Value> {
        self.map.last().map(|(_, v)| v)
    }

    /// The last element satisfying `pred`
    pub fn last_where<F>(&self, pred: F) -> Option<&Value>
    where
        F: Fn(&Value, &Key) -> bool,
    {
        self.map
            .iter()
            .filter(|(k, v)| pred(v, k))
            .last()
            .map(|(_, v)| v)
    }

    /// True when any element equals `value`
    pub fn contains(&self, value: &Value) -> bool {
        self.map.iter().any(|(_, v)| v == value)
    }

    /// True when any element satisfies `pred`
    pub fn contains_where<F>(&self, pred: F) -> bool
    where
        F: Fn(&Value, &Key) -> bool,
    {
        self.map.iter().any(|(k, v)| pred(v, k))
    }

    // ---- ordering --------------------------------------------------------

    /// Elements ordered ascending by natural value ordering. The sort is
    /// stable and keys travel with their values; only position changes.
    pub fn sort(&self) -> Collection {
        let mut entries = self.all();
        entries.sort_by(|(_, a), (_, b)| a.compare(b));
        Self::from_pairs(entries)
    }

    /// Elements ordered descending, otherwise as [`sort`](Self::sort)
    pub fn sort_desc(&self) -> Collection {
        let mut entries = self.all();
        entries.sort_by(|(_, a), (_, b)| b.compare(a));
        Self::from_pairs(entries)
    }

    // ---- aggregation -----------------------------------------------------

    /// Numeric sum of all elements.
    ///
    /// Stays `Integer` when every element is an integer and the total fits;
    /// otherwise the sum is a `Decimal`. All aggregates fail with
    /// `EmptyCollection` on an empty source.
    pub fn sum(&self) -> Result<Value> {
        let (total, all_integer) = self.numeric_total()?;
        if all_integer {
            if let Some(i) = rust_decimal::prelude::ToPrimitive::to_i64(&total) {
                return Ok(Value::Integer(i));
            }
        }
        Ok(Value::Decimal(total))
    }

    /// Arithmetic mean of all elements, as a `Decimal`
    pub fn avg(&self) -> Result<Value> {
        let (total, _) = self.numeric_total()?;
        Ok(Value::Decimal(total / rust_decimal::Decimal::from(self.len() as u64)))
    }

    /// Smallest element by natural value ordering
    pub fn min(&self) -> Result<Value> {
        self.values()
            .into_iter()
            .min_by(|a, b| a.compare(b))
            .ok_or(CollectionError::EmptyCollection)
    }

    /// Largest element by natural value ordering
    pub fn max(&self) -> Result<Value> {
        self.values()
            .into_iter()
            .max_by(|a, b| a.compare(b))
            .ok_or(CollectionError::EmptyCollection)
    }

    fn numeric_total(&self) -> Result<(rust_decimal::Decimal, bool)> {
        if self.is_empty() {
            return Err(CollectionError::EmptyCollection);
        }
        let mut total = rust_decimal::Decimal::ZERO;
        let mut all_integer = true;
        for (_, value) in self.map.iter() {
            let d = value.to_decimal().ok_or_else(|| {
                CollectionError::type_error(format!("cannot aggregate non-numeric value {value}"))
            })?;
            total += d;
            all_integer &= matches!(value, Value::Integer(_));
        }
        Ok((total, all_integer))
    }

    /// Fold left-to-right seeding the accumulator from the first element;
    /// `None` when the collection is empty
    pub fn reduce<F>(&self, f: F) -> Option<Value>
    where
        F: Fn(Value, &Value) -> Value,
    {
        let mut iter = self.map.iter().map(|(_, v)| v);
        let first = iter.next()?.clone();
        Some(iter.fold(first, |acc, v| f(acc, v)))
    }

    /// Fold left-to-right from an explicit initial accumulator
    pub fn fold<F>(&self, initial: Value, f: F) -> Value
    where
        F: Fn(Value, &Value) -> Value,
    {
        self.map.iter().map(|(_, v)| v).fold(initial, |acc, v| f(acc, v))
    }

    // ---- randomness ------------------------------------------------------

    /// One uniformly chosen element, or `None` when empty
    pub fn random(&self) -> Option<&Value> {
        self.random_with(|len| fastrand::usize(..len))
    }

    /// One element chosen by an injected index source: `rng` receives the
    /// collection length and returns an index (reduced modulo the length)
    pub fn random_with<R>(&self, mut rng: R) -> Option<&Value>
    where
        R: FnMut(usize) -> usize,
    {
        if self.is_empty() {
            return None;
        }
        let index = rng(self.len()) % self.len();
        self.map.iter().nth(index).map(|(_, v)| v)
    }
}

impl From<OrderedMap> for Collection {
    fn from(map: OrderedMap) -> Self {
        Self { map }
    }
}

impl FromIterator<Value> for Collection {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::from_values(iter)
    }
}

impl FromIterator<(Key, Value)> for Collection {
    fn from_iter<I: IntoIterator<Item = (Key, Value)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

impl IntoIterator for Collection {
    type Item = (Key, Value);
    type IntoIter = indexmap::map::IntoIter<Key, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.map.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ints(values: impl IntoIterator<Item = i64>) -> Collection {
        Collection::from_values(values.into_iter().map(Value::Integer))
    }

    #[test]
    fn test_map_preserves_keys() {
        let source = Collection::from_pairs([
            (Key::name("a"), Value::Integer(1)),
            (Key::Index(7), Value::Integer(2)),
        ]);
        let doubled = source.map(|v| Value::Integer(v.as_integer().unwrap() * 2));

        assert_eq!(doubled.get(&Key::name("a")), Some(&Value::Integer(2)));
        assert_eq!(doubled.get(&Key::Index(7)), Some(&Value::Integer(4)));
        assert_eq!(doubled.len(), source.len());
    }

    #[test]
    fn test_filter_leaves_positional_gaps() {
        let evens = ints(1..=5).filter(|v, _| v.as_integer().unwrap() % 2 == 0);
        assert_eq!(
            evens.all(),
            vec![
                (Key::Index(1), Value::Integer(2)),
                (Key::Index(3), Value::Integer(4)),
            ]
        );
    }

    #[test]
    fn test_slice_negative_offset() {
        let tail = ints(1..=10).slice(-3, None);
        assert_eq!(tail.values(), vec![8.into(), 9.into(), 10.into()]);

        let window = ints(1..=10).slice(3, Some(2));
        assert_eq!(window.values(), vec![4.into(), 5.into()]);
    }

    #[test]
    fn test_take_negative_returns_tail() {
        assert_eq!(ints(1..=5).take(-2).values(), vec![4.into(), 5.into()]);
        assert_eq!(ints(1..=5).take(10).len(), 5);
    }

    #[test]
    fn test_chunk_rejects_zero_size() {
        assert_eq!(
            ints(1..=3).chunk(0),
            Err(CollectionError::invalid_argument("chunk size must be at least 1"))
        );
    }

    #[test]
    fn test_sort_is_stable_and_keys_travel() {
        let source = Collection::from_pairs([
            (Key::name("b"), Value::Integer(2)),
            (Key::name("a1"), Value::Integer(1)),
            (Key::name("a2"), Value::Integer(1)),
        ]);
        let sorted = source.sort();
        assert_eq!(
            sorted.all(),
            vec![
                (Key::name("a1"), Value::Integer(1)),
                (Key::name("a2"), Value::Integer(1)),
                (Key::name("b"), Value::Integer(2)),
            ]
        );
    }

    #[test]
    fn test_aggregates_fail_on_empty() {
        let empty = Collection::new();
        assert_eq!(empty.sum(), Err(CollectionError::EmptyCollection));
        assert_eq!(empty.avg(), Err(CollectionError::EmptyCollection));
        assert_eq!(empty.min(), Err(CollectionError::EmptyCollection));
        assert_eq!(empty.max(), Err(CollectionError::EmptyCollection));
    }

    #[test]
    fn test_sum_rejects_non_numeric() {
        let mixed = Collection::from_values([Value::Integer(1), Value::from("two")]);
        assert!(matches!(mixed.sum(), Err(CollectionError::TypeError { .. })));
    }

    #[test]
    fn test_random_with_injected_source() {
        let source = ints(1..=9);
        assert_eq!(source.random_with(|_| 0), Some(&Value::Integer(1)));
        assert_eq!(source.random_with(|len| len - 1), Some(&Value::Integer(9)));
        // Out-of-range indices reduce modulo the length.
        assert_eq!(source.random_with(|len| len + 1), Some(&Value::Integer(2)));
        assert_eq!(Collection::new().random_with(|_| 0), None);
    }

    #[test]
    fn test_combine_rejects_unkeyable_values() {
        let keys = Collection::from_values([Value::Boolean(true)]);
        let values = ints([1]);
        assert!(matches!(
            keys.combine(&values),
            Err(CollectionError::InvalidArgument { .. })
        ));
    }
}
