//! Lazy collections over pull-based producers
//!
//! A [`LazyCollection`] wraps a [`Source`]: a resumable producer of
//! key/value pairs advanced one step per [`pull`](Source::pull). Evaluation
//! is single-threaded, synchronous and pull-driven — the producer computes
//! the next element only when explicitly asked, and control returns to it
//! exactly once per requested element. Between pulls the producer is simply
//! suspended; ceasing to pull is cancellation, no explicit signal exists.
//!
//! Adapters (`map`, `filter`, the take/skip families) compose a new source
//! wrapping the previous one and never force evaluation. Terminal operators
//! (`first`, `all`, `collect`) drive the pull loop. Draining an unbounded
//! producer with `all` or `collect` does not terminate; the engine cannot
//! detect this, so bound the source with [`take`](LazyCollection::take)
//! first. Re-invoking an already-consumed producer is likewise caller
//! responsibility — the engine never restarts a source.

use log::trace;

use crate::eager::Collection;
use crate::key::Key;
use crate::value::Value;

/// A resumable producer of key/value pairs, advanced one step per pull
pub trait Source {
    /// Produce the next element, or `None` once exhausted
    fn pull(&mut self) -> Option<(Key, Value)>;
}

/// Any `FnMut` closure yielding key/value pairs is a source
impl<F> Source for F
where
    F: FnMut() -> Option<(Key, Value)>,
{
    fn pull(&mut self) -> Option<(Key, Value)> {
        self()
    }
}

/// Lazy collection: a chain of pending transformations over one producer
pub struct LazyCollection {
    source: Box<dyn Source>,
}

impl LazyCollection {
    /// Wrap an existing source
    pub fn new(source: impl Source + 'static) -> Self {
        Self {
            source: Box::new(source),
        }
    }

    /// Wrap a value producer, assigning fresh positional keys `0, 1, 2, ...`
    /// to whatever it yields
    pub fn from_fn<F>(mut f: F) -> Self
    where
        F: FnMut() -> Option<Value> + 'static,
    {
        let mut next = 0usize;
        Self::new(move || {
            let value = f()?;
            let key = Key::Index(next);
            next += 1;
            Some((key, value))
        })
    }

    /// Finite lazy collection over a literal value sequence
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Value>,
        I::IntoIter: 'static,
    {
        let mut iter = values.into_iter().enumerate();
        Self::new(move || iter.next().map(|(i, v)| (Key::Index(i), v)))
    }

    /// Finite lazy collection over explicit key/value pairs
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Key, Value)>,
        I::IntoIter: 'static,
    {
        let mut iter = pairs.into_iter();
        Self::new(move || iter.next())
    }

    // ---- adapters (compose, never evaluate) ------------------------------

    /// Apply `f` to every pulled element. Preserves keys.
    pub fn map<F>(self, f: F) -> Self
    where
        F: FnMut(Value) -> Value + 'static,
    {
        Self::new(MapSource {
            inner: self.source,
            f,
        })
    }

    /// Keep pulled elements satisfying `pred`. Preserves keys; pulls the
    /// inner source until a survivor (or exhaustion) per requested element.
    pub fn filter<F>(self, pred: F) -> Self
    where
        F: FnMut(&Value, &Key) -> bool + 'static,
    {
        Self::new(FilterSource {
            inner: self.source,
            pred,
        })
    }

    /// Bound the source to its first `n` elements. After `n` elements the
    /// adapter stops issuing pulls entirely, so exactly `n` pulls (or fewer,
    /// on early exhaustion) ever reach the producer.
    pub fn take(self, n: usize) -> Self {
        Self::new(TakeSource {
            inner: self.source,
            remaining: n,
        })
    }

    /// Yield the longest prefix satisfying `pred`, then stop pulling
    pub fn take_while<F>(self, pred: F) -> Self
    where
        F: FnMut(&Value, &Key) -> bool + 'static,
    {
        Self::new(TakeWhileSource {
            inner: self.source,
            pred,
            done: false,
        })
    }

    /// Yield the prefix before the first element satisfying `pred`, which is
    /// excluded
    pub fn take_until<F>(self, mut pred: F) -> Self
    where
        F: FnMut(&Value, &Key) -> bool + 'static,
    {
        self.take_while(move |v, k| !pred(v, k))
    }

    /// Drop the first `n` elements
    pub fn skip(self, n: usize) -> Self {
        Self::new(SkipSource {
            inner: self.source,
            remaining: n,
        })
    }

    /// Drop the prefix while `pred` holds; yields from the first failing
    /// element on
    pub fn skip_while<F>(self, pred: F) -> Self
    where
        F: FnMut(&Value, &Key) -> bool + 'static,
    {
        Self::new(SkipWhileSource {
            inner: self.source,
            pred,
            skipping: true,
        })
    }

    /// Drop the prefix until `pred` first holds; yields from the first
    /// matching element on
    pub fn skip_until<F>(self, mut pred: F) -> Self
    where
        F: FnMut(&Value, &Key) -> bool + 'static,
    {
        self.skip_while(move |v, k| !pred(v, k))
    }

    // ---- terminals (drive the pull loop) ---------------------------------

    /// Pull one element and return its value
    pub fn first(mut self) -> Option<Value> {
        self.source.pull().map(|(_, v)| v)
    }

    /// Pull until an element satisfies `pred` and return its value.
    /// On an unbounded source with no matching element this never returns.
    pub fn first_where<F>(self, mut pred: F) -> Option<Value>
    where
        F: FnMut(&Value, &Key) -> bool,
    {
        for (key, value) in self {
            if pred(&value, &key) {
                return Some(value);
            }
        }
        None
    }

    /// Drain the producer and return every pair in pull order.
    /// Never returns on an unbounded source; bound with `take` first.
    pub fn all(self) -> Vec<(Key, Value)> {
        let pairs: Vec<(Key, Value)> = self.collect();
        trace!("lazy drain yielded {} entries", pairs.len());
        pairs
    }

    /// Drain the producer into an eager [`Collection`], preserving keys.
    /// Never returns on an unbounded source; bound with `take` first.
    pub fn collect_eager(self) -> Collection {
        Collection::from_pairs(self)
    }
}

/// Pulling a lazy collection directly is the iterator protocol
impl Iterator for LazyCollection {
    type Item = (Key, Value);

    fn next(&mut self) -> Option<Self::Item> {
        self.source.pull()
    }
}

struct MapSource<F> {
    inner: Box<dyn Source>,
    f: F,
}

impl<F> Source for MapSource<F>
where
    F: FnMut(Value) -> Value,
{
    fn pull(&mut self) -> Option<(Key, Value)> {
        self.inner.pull().map(|(k, v)| (k, (self.f)(v)))
    }
}

struct FilterSource<F> {
    inner: Box<dyn Source>,
    pred: F,
}

impl<F> Source for FilterSource<F>
where
    F: FnMut(&Value, &Key) -> bool,
{
    fn pull(&mut self) -> Option<(Key, Value)> {
        loop {
            let (key, value) = self.inner.pull()?;
            if (self.pred)(&value, &key) {
                return Some((key, value));
            }
        }
    }
}

struct TakeSource {
    inner: Box<dyn Source>,
    remaining: usize,
}

impl Source for TakeSource {
    fn pull(&mut self) -> Option<(Key, Value)> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.inner.pull()
    }
}

struct TakeWhileSource<F> {
    inner: Box<dyn Source>,
    pred: F,
    done: bool,
}

impl<F> Source for TakeWhileSource<F>
where
    F: FnMut(&Value, &Key) -> bool,
{
    fn pull(&mut self) -> Option<(Key, Value)> {
        if self.done {
            return None;
        }
        match self.inner.pull() {
            Some((key, value)) if (self.pred)(&value, &key) => Some((key, value)),
            _ => {
                self.done = true;
                None
            }
        }
    }
}

struct SkipSource {
    inner: Box<dyn Source>,
    remaining: usize,
}

impl Source for SkipSource {
    fn pull(&mut self) -> Option<(Key, Value)> {
        while self.remaining > 0 {
            self.remaining -= 1;
            self.inner.pull()?;
        }
        self.inner.pull()
    }
}

struct SkipWhileSource<F> {
    inner: Box<dyn Source>,
    pred: F,
    skipping: bool,
}

impl<F> Source for SkipWhileSource<F>
where
    F: FnMut(&Value, &Key) -> bool,
{
    fn pull(&mut self) -> Option<(Key, Value)> {
        if self.skipping {
            self.skipping = false;
            loop {
                let (key, value) = self.inner.pull()?;
                if !(self.pred)(&value, &key) {
                    return Some((key, value));
                }
            }
        }
        self.inner.pull()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Unbounded incrementing-integer producer that counts how many times it
    /// is pulled.
    fn counting_integers(pulls: Rc<Cell<usize>>) -> LazyCollection {
        let mut value = 0i64;
        LazyCollection::from_fn(move || {
            pulls.set(pulls.get() + 1);
            let current = value;
            value += 1;
            Some(Value::Integer(current))
        })
    }

    #[test]
    fn test_take_pulls_exactly_n_times() {
        let pulls = Rc::new(Cell::new(0));
        let result = counting_integers(pulls.clone()).take(10).all();

        let values: Vec<Value> = result.iter().map(|(_, v)| v.clone()).collect();
        assert_eq!(values, (0..10).map(Value::Integer).collect::<Vec<_>>());
        assert_eq!(pulls.get(), 10);
    }

    #[test]
    fn test_adapters_compose_without_pulling() {
        let pulls = Rc::new(Cell::new(0));
        let composed = counting_integers(pulls.clone())
            .map(|v| Value::Integer(v.as_integer().unwrap() * 2))
            .filter(|v, _| v.as_integer().unwrap() % 4 == 0);

        assert_eq!(pulls.get(), 0);

        let values: Vec<Value> = composed.take(3).all().into_iter().map(|(_, v)| v).collect();
        assert_eq!(values, vec![0.into(), 4.into(), 8.into()]);
    }

    #[test]
    fn test_first_pulls_once() {
        let pulls = Rc::new(Cell::new(0));
        assert_eq!(
            counting_integers(pulls.clone()).first(),
            Some(Value::Integer(0))
        );
        assert_eq!(pulls.get(), 1);
    }

    #[test]
    fn test_skip_until_includes_first_match() {
        let values: Vec<Value> = LazyCollection::from_values((1..=9).map(Value::Integer))
            .skip_until(|v, _| v.as_integer() == Some(3))
            .all()
            .into_iter()
            .map(|(_, v)| v)
            .collect();
        assert_eq!(values, (3..=9).map(Value::Integer).collect::<Vec<_>>());
    }

    #[test]
    fn test_take_while_stops_and_fuses() {
        let lazy = LazyCollection::from_values((1..=9).map(Value::Integer))
            .take_while(|v, _| v.as_integer().unwrap() < 3);
        let values: Vec<Value> = lazy.all().into_iter().map(|(_, v)| v).collect();
        assert_eq!(values, vec![1.into(), 2.into()]);
    }

    #[test]
    fn test_collect_eager_preserves_keys() {
        let eager = LazyCollection::from_pairs([
            (Key::name("a"), Value::Integer(1)),
            (Key::name("b"), Value::Integer(2)),
        ])
        .filter(|v, _| v.as_integer() == Some(2))
        .collect_eager();

        assert_eq!(eager.all(), vec![(Key::name("b"), Value::Integer(2))]);
    }

    #[test]
    fn test_finite_source_exhausts_under_larger_take() {
        let values = LazyCollection::from_values((1..=3).map(Value::Integer))
            .take(10)
            .all();
        assert_eq!(values.len(), 3);
    }
}
