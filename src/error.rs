//! Error types for insertion and cursor traversal.
//!
//! Absence is never an error in this crate: lookups and removals signal a
//! missing key or value with `None`. The types here cover the conditions
//! that genuinely reject an operation, a duplicate entry on insertion and
//! an out-of-protocol or stale cursor step.

use std::fmt;

/// Why a [`put`](crate::DualOrderedMap::put) call was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsertErrorKind {
    /// The key is already present in the map.
    DuplicateKey,
    /// The value is already associated with a different key.
    DuplicateValue,
}

/// A rejected insertion.
///
/// The map never overwrites: inserting an existing key or an existing value
/// fails and leaves the map exactly as it was. The rejected pair travels
/// back inside the error so the caller keeps ownership of it.
///
/// # Examples
///
/// ```rust
/// use dualmap::{DualOrderedMap, InsertErrorKind};
///
/// let mut map = DualOrderedMap::new();
/// map.put(1, "one").unwrap();
///
/// let error = map.put(1, "uno").unwrap_err();
/// assert_eq!(error.kind(), InsertErrorKind::DuplicateKey);
///
/// // Ownership of the rejected pair comes back to the caller.
/// let (key, value) = error.into_entry();
/// assert_eq!((key, value), (1, "uno"));
/// ```
pub struct InsertError<K, V> {
    kind: InsertErrorKind,
    entry: (K, V),
}

impl<K, V> InsertError<K, V> {
    pub(crate) fn new(kind: InsertErrorKind, key: K, value: V) -> Self {
        Self {
            kind,
            entry: (key, value),
        }
    }

    /// Which uniqueness rule the insertion violated.
    #[must_use]
    pub fn kind(&self) -> InsertErrorKind {
        self.kind
    }

    /// Borrows the rejected key-value pair.
    #[must_use]
    pub fn entry(&self) -> (&K, &V) {
        (&self.entry.0, &self.entry.1)
    }

    /// Recovers ownership of the rejected key-value pair.
    #[must_use]
    pub fn into_entry(self) -> (K, V) {
        self.entry
    }
}

// Manual impls keep `K` and `V` free of `Debug`/`Display` bounds, the same
// way channel send errors print without exposing their payload.
impl<K, V> fmt::Debug for InsertError<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("InsertError")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl<K, V> fmt::Display for InsertError<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            InsertErrorKind::DuplicateKey => {
                write!(formatter, "key is already present in the map")
            }
            InsertErrorKind::DuplicateValue => {
                write!(formatter, "value is already associated with another key")
            }
        }
    }
}

impl<K, V> std::error::Error for InsertError<K, V> {}

/// A failed step of a [`Cursor`](crate::Cursor).
///
/// # Examples
///
/// ```rust
/// use dualmap::{CursorError, DualOrderedMap};
///
/// let mut map = DualOrderedMap::new();
/// map.put(1, "one").unwrap();
///
/// let mut cursor = map.cursor();
/// map.put(2, "two").unwrap();
///
/// // The map changed under the cursor, so the next step reports it.
/// assert_eq!(cursor.next(&map), Err(CursorError::StructuralChange));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CursorError {
    /// The map was structurally modified by something other than this
    /// cursor since the cursor was created or last removed an entry.
    StructuralChange,
    /// `remove` was called before any `next`, or twice for the same entry.
    InvalidState,
}

impl fmt::Display for CursorError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StructuralChange => {
                write!(formatter, "map was structurally modified outside the cursor")
            }
            Self::InvalidState => {
                write!(formatter, "cursor remove called without a preceding next")
            }
        }
    }
}

impl std::error::Error for CursorError {}
