//! seqmap: an ordered, optionally-keyed collection engine
//!
//! Two evaluation strategies over one operator algebra:
//!
//! - [`Collection`] — eager: wraps an [`OrderedMap`] (insertion-ordered,
//!   unique keys, positional or named) and materializes every operator
//!   result immediately.
//! - [`LazyCollection`] — lazy: wraps a pull-based [`Source`] producer and
//!   composes operators into adapter chains that only advance when a
//!   terminal operator (`first`, `all`, a bounded `take`) demands elements,
//!   which makes unbounded producers safe to consume.
//!
//! The engine is pure in-memory and single-threaded; it performs no I/O and
//! owns no shared mutable state across instances.
//!
//! ```
//! use seqmap::{Collection, LazyCollection, Value};
//!
//! let doubled = Collection::from_values((1..=3).map(Value::Integer))
//!     .map(|v| Value::Integer(v.as_integer().unwrap() * 2));
//! assert_eq!(doubled.values(), vec![2.into(), 4.into(), 6.into()]);
//!
//! let mut n = 0i64;
//! let first_ten = LazyCollection::from_fn(move || {
//!     let v = Value::Integer(n);
//!     n += 1;
//!     Some(v)
//! })
//! .take(10)
//! .collect_eager();
//! assert_eq!(first_ten.len(), 10);
//! ```

pub mod eager;
pub mod error;
pub mod key;
pub mod lazy;
pub mod ordered_map;
pub mod record;
pub mod value;

pub use eager::Collection;
pub use error::{CollectionError, Result};
pub use key::Key;
pub use lazy::{LazyCollection, Source};
pub use ordered_map::OrderedMap;
pub use record::{Label, Record};
pub use value::Value;
