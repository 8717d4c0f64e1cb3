//! Fail-fast traversal that tolerates interleaved map mutation.
//!
//! A [`Cursor`] is a detached position in one of the two orderings. It does
//! not borrow the map; every step takes the map as an explicit argument.
//! That makes it legal to mutate the map between steps, and it is exactly
//! that situation the cursor is built to detect: each step first compares
//! the generation counter it captured against the map's current one, and a
//! mismatch reports [`CursorError::StructuralChange`] instead of walking
//! stale structure.
//!
//! Removal through the cursor itself is the sanctioned exception. A
//! successful [`remove`](Cursor::remove) refreshes the captured counter, so
//! the same cursor keeps iterating afterwards.

use crate::arena::Handle;
use crate::error::CursorError;
use crate::map::{DualOrderedMap, Order};

/// A detached, fail-fast position in one ordering of a [`DualOrderedMap`].
///
/// Created by [`DualOrderedMap::cursor`] (key order) or
/// [`DualOrderedMap::cursor_by_value`] (value order). A cursor must only be
/// handed back to the map that created it.
///
/// # Examples
///
/// Walking while removing selected entries:
///
/// ```rust
/// use dualmap::DualOrderedMap;
///
/// let mut map = DualOrderedMap::try_from_iter((0..6).map(|n| (n, n * 10))).unwrap();
///
/// let mut cursor = map.cursor();
/// while let Some((&key, _)) = cursor.next(&map).unwrap() {
///     if key % 2 == 1 {
///         cursor.remove(&mut map).unwrap();
///     }
/// }
///
/// let keys: Vec<&i32> = map.keys().collect();
/// assert_eq!(keys, vec![&0, &2, &4]);
/// ```
///
/// Detecting foreign mutation:
///
/// ```rust
/// use dualmap::{CursorError, DualOrderedMap};
///
/// let mut map = DualOrderedMap::new();
/// map.put(1, "one").unwrap();
///
/// let mut cursor = map.cursor();
/// map.put(2, "two").unwrap();
/// assert_eq!(cursor.next(&map), Err(CursorError::StructuralChange));
/// ```
#[derive(Clone, Debug)]
pub struct Cursor {
    order: Order,
    expected_generation: u64,
    next: Option<Handle>,
    current: Option<Handle>,
}

impl Cursor {
    pub(crate) fn new<K, V>(map: &DualOrderedMap<K, V>, order: Order) -> Self {
        Self {
            order,
            expected_generation: map.generation(),
            next: map.first_handle(order),
            current: None,
        }
    }

    /// Returns `true` if another entry remains.
    ///
    /// # Errors
    ///
    /// [`CursorError::StructuralChange`] if the map was modified outside
    /// this cursor since its counter snapshot.
    pub fn has_next<K, V>(&self, map: &DualOrderedMap<K, V>) -> Result<bool, CursorError> {
        self.check_generation(map)?;
        Ok(self.next.is_some())
    }

    /// Advances to the next entry, or `Ok(None)` at the end.
    ///
    /// # Errors
    ///
    /// [`CursorError::StructuralChange`] if the map was modified outside
    /// this cursor since its counter snapshot.
    pub fn next<'a, K, V>(
        &mut self,
        map: &'a DualOrderedMap<K, V>,
    ) -> Result<Option<(&'a K, &'a V)>, CursorError> {
        self.check_generation(map)?;
        match self.next {
            None => Ok(None),
            Some(node) => {
                self.current = Some(node);
                self.next = map.successor_handle(self.order, node);
                Ok(Some(map.entry_at(node)))
            }
        }
    }

    /// Removes the entry most recently yielded by [`next`](Self::next) from
    /// both orderings and returns the owned pair.
    ///
    /// Valid only directly after a successful `next` that has not already
    /// been followed by a `remove`. On success the cursor resynchronizes
    /// its counter snapshot and continues to be usable.
    ///
    /// # Errors
    ///
    /// [`CursorError::InvalidState`] when there is no current entry,
    /// [`CursorError::StructuralChange`] when the map was modified outside
    /// this cursor. The state check comes first, mirroring the protocol's
    /// precedence for removal.
    pub fn remove<K, V>(&mut self, map: &mut DualOrderedMap<K, V>) -> Result<(K, V), CursorError> {
        let Some(node) = self.current else {
            return Err(CursorError::InvalidState);
        };
        self.check_generation(map)?;

        self.current = None;
        let entry = map.detach(node);
        self.expected_generation = map.generation();
        Ok(entry)
    }

    fn check_generation<K, V>(&self, map: &DualOrderedMap<K, V>) -> Result<(), CursorError> {
        if self.expected_generation == map.generation() {
            Ok(())
        } else {
            Err(CursorError::StructuralChange)
        }
    }
}
