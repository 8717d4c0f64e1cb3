//! # dualmap
//!
//! A map that maintains two independent total orderings over one set of
//! entries: ascending by key and ascending by value.
//!
//! ## Overview
//!
//! [`DualOrderedMap`] threads every entry through two red-black trees at
//! once, one sorted on keys and one sorted on values. That buys symmetric
//! O(log N) access from either side:
//!
//! - **Forward and reverse lookup**: `get(&key)` and `get_key_for_value(&value)`
//! - **Forward and reverse removal**: `remove(&key)` and `remove_value(&value)`
//! - **Two iteration orders** over the same entries: `iter()`/`keys()`/`values()`
//!   walk ascending by key, the `*_by_value` family walks ascending by value
//! - **Fail-fast cursors**: detached traversal that detects structural
//!   modification through a generation counter instead of borrowing the map
//!
//! Uniqueness holds on both sides: no duplicate keys, no duplicate values.
//! [`put`](DualOrderedMap::put) never overwrites; rejected pairs travel
//! back to the caller inside [`InsertError`].
//!
//! ## Feature Flags
//!
//! - `serde`: `Serialize` in key order and `Deserialize` with the same
//!   duplicate rejection as `put`
//!
//! ## Example
//!
//! ```rust
//! use dualmap::DualOrderedMap;
//!
//! let mut index = DualOrderedMap::new();
//! index.put("alice", 30).unwrap();
//! index.put("carol", 10).unwrap();
//! index.put("bob", 20).unwrap();
//!
//! // Alphabetical by name.
//! let names: Vec<&&str> = index.keys().collect();
//! assert_eq!(names, vec![&"alice", &"bob", &"carol"]);
//!
//! // The same three entries, ranked by score.
//! let ranked: Vec<&&str> = index.keys_by_value().collect();
//! assert_eq!(ranked, vec![&"carol", &"bob", &"alice"]);
//!
//! // Reverse lookup and reverse removal are O(log N).
//! assert_eq!(index.get_key_for_value(&20), Some(&"bob"));
//! assert_eq!(index.remove_value(&10), Some("carol"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod arena;
mod cursor;
mod error;
mod iter;
mod map;

pub use cursor::Cursor;
pub use error::{CursorError, InsertError, InsertErrorKind};
pub use iter::{IntoIter, Iter, IterByValue, Keys, KeysByValue, Values, ValuesByValue};
pub use map::DualOrderedMap;
