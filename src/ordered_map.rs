//! Insertion-ordered, unique-key value store
//!
//! `OrderedMap` is the ownership structure underneath every eager
//! collection: an insertion-ordered mapping from [`Key`] to [`Value`] with
//! unique keys. Iteration order is insertion order unless an operator
//! explicitly re-sorts or re-indexes. Overwriting a key keeps its original
//! position; removing and re-inserting a key moves it to the end.

use indexmap::IndexMap;

use crate::error::{CollectionError, Result};
use crate::key::Key;
use crate::value::Value;

/// Insertion-ordered mapping from unique keys to values
#[derive(Debug, Clone, Default)]
pub struct OrderedMap {
    entries: IndexMap<Key, Value>,
}

/// Equality is sequence equality: same pairs in the same order.
impl PartialEq for OrderedMap {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl OrderedMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Create a map from values under fresh positional keys `0..n`
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        let mut map = Self::new();
        map.push(values);
        map
    }

    /// Create a map from explicit key/value pairs.
    ///
    /// A repeated key overwrites the earlier value in place.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Key, Value)>,
    {
        let mut map = Self::new();
        for (key, value) in pairs {
            map.set(key, value);
        }
        map
    }

    /// Ordered sequence of (key, value) pairs, as a defensive copy
    pub fn all(&self) -> Vec<(Key, Value)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Ordered values, without their keys
    pub fn values(&self) -> Vec<Value> {
        self.entries.values().cloned().collect()
    }

    /// Append values under fresh positional keys following the current
    /// maximum positional key. Mutates the receiver and returns it for
    /// chaining.
    pub fn push<I>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = Value>,
    {
        let mut next = self.next_index();
        for value in values {
            self.entries.insert(Key::Index(next), value);
            next += 1;
        }
        self
    }

    /// Remove and return the last value in iteration order
    pub fn pop(&mut self) -> Result<Value> {
        self.entries
            .pop()
            .map(|(_, value)| value)
            .ok_or(CollectionError::EmptyCollection)
    }

    /// Look up a value by key
    pub fn get(&self, key: &Key) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Insert or overwrite. Overwrite keeps the key's original position;
    /// insert appends.
    pub fn set(&mut self, key: impl Into<Key>, value: Value) {
        self.entries.insert(key.into(), value);
    }

    /// Remove a key, shifting later entries up so that re-inserting the key
    /// appends it at the end
    pub fn remove(&mut self, key: &Key) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the map holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in order without copying
    pub fn iter(&self) -> indexmap::map::Iter<'_, Key, Value> {
        self.entries.iter()
    }

    /// The last entry in iteration order
    pub fn last(&self) -> Option<(&Key, &Value)> {
        self.entries.last()
    }

    fn next_index(&self) -> usize {
        self.entries
            .keys()
            .filter_map(Key::as_index)
            .max()
            .map_or(0, |max| max + 1)
    }
}

impl FromIterator<(Key, Value)> for OrderedMap {
    fn from_iter<I: IntoIterator<Item = (Key, Value)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

impl<'a> IntoIterator for &'a OrderedMap {
    type Item = (&'a Key, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, Key, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for OrderedMap {
    type Item = (Key, Value);
    type IntoIter = indexmap::map::IntoIter<Key, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_assigns_fresh_positional_keys() {
        let mut map = OrderedMap::new();
        map.push([Value::Integer(1), Value::Integer(2)]);
        map.push([Value::Integer(3)]);

        assert_eq!(
            map.all(),
            vec![
                (Key::Index(0), Value::Integer(1)),
                (Key::Index(1), Value::Integer(2)),
                (Key::Index(2), Value::Integer(3)),
            ]
        );
    }

    #[test]
    fn test_push_follows_maximum_positional_key() {
        let mut map = OrderedMap::from_pairs([
            (Key::Index(5), Value::Integer(1)),
            (Key::name("label"), Value::Integer(2)),
        ]);
        map.push([Value::Integer(3)]);
        assert_eq!(map.get(&Key::Index(6)), Some(&Value::Integer(3)));
    }

    #[test]
    fn test_pop_returns_last_and_fails_when_empty() {
        let mut map = OrderedMap::from_values([Value::Integer(1), Value::Integer(2)]);
        assert_eq!(map.pop(), Ok(Value::Integer(2)));
        assert_eq!(map.pop(), Ok(Value::Integer(1)));
        assert_eq!(map.pop(), Err(CollectionError::EmptyCollection));
    }

    #[test]
    fn test_overwrite_keeps_position_insert_appends() {
        let mut map = OrderedMap::new();
        map.set(Key::name("a"), Value::Integer(1));
        map.set(Key::name("b"), Value::Integer(2));
        map.set(Key::name("a"), Value::Integer(10));
        map.set(Key::name("c"), Value::Integer(3));

        let keys: Vec<Key> = map.all().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![Key::name("a"), Key::name("b"), Key::name("c")]);
        assert_eq!(map.get(&Key::name("a")), Some(&Value::Integer(10)));
    }

    #[test]
    fn test_remove_then_reinsert_moves_to_end() {
        let mut map = OrderedMap::new();
        map.set(Key::name("a"), Value::Integer(1));
        map.set(Key::name("b"), Value::Integer(2));
        map.remove(&Key::name("a"));
        map.set(Key::name("a"), Value::Integer(1));

        let keys: Vec<Key> = map.all().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![Key::name("b"), Key::name("a")]);
    }

    #[test]
    fn test_named_key_never_coerces_to_positional() {
        let mut map = OrderedMap::new();
        map.set(Key::name("3"), Value::Integer(1));
        assert_eq!(map.get(&Key::Index(3)), None);
        assert_eq!(map.get(&Key::name("3")), Some(&Value::Integer(1)));
    }
}
