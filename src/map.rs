//! Map maintaining two independent orderings over one entry set.
//!
//! This module provides [`DualOrderedMap`], a mutable ordered map whose
//! entries are kept sorted by key and, at the same time, sorted by value.
//!
//! # Overview
//!
//! Every entry is a node in two red-black trees at once. The node carries
//! two independent sets of linkage state, one per tree, so the trees can
//! rotate and recolor freely without disturbing each other. Membership is
//! always synchronized: inserting links a node into both trees, removing
//! unlinks it from both.
//!
//! - O(log N) get, by key or by value
//! - O(log N) put
//! - O(log N) remove, by key or by value
//! - O(N) iteration, in key order or in value order
//! - O(1) len and `is_empty`
//!
//! Uniqueness is enforced on both sides: no two entries share a key, and no
//! two entries share a value. `put` never overwrites; the caller removes
//! first if rebinding is intended.
//!
//! # Internal Structure
//!
//! Each of the two trees maintains the red-black invariants:
//! 1. Every node is either red or black
//! 2. The root is black
//! 3. All leaves (absent children) are black
//! 4. Red nodes have only black children
//! 5. Every path from root to leaf has the same number of black nodes
//!
//! These invariants keep both tree heights at O(log N). Nodes live in a
//! slot arena and refer to each other by handle, which is what makes the
//! shared-membership structure expressible without ownership cycles.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::arena::{Arena, Handle};
use crate::cursor::Cursor;
use crate::error::{InsertError, InsertErrorKind};
use crate::iter::{Iter, IterByValue, Keys, KeysByValue, Values, ValuesByValue};

// =============================================================================
// Tree Selector, Color, Linkage
// =============================================================================

/// Which of the two orderings a linkage operation addresses.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Order {
    Key,
    Value,
}

impl Order {
    #[inline]
    const fn index(self) -> usize {
        match self {
            Self::Key => 0,
            Self::Value => 1,
        }
    }
}

/// The color of a red-black tree node.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Color {
    Red,
    Black,
}

/// Per-tree linkage state of one node.
#[derive(Clone, Copy)]
struct Links {
    parent: Option<Handle>,
    left: Option<Handle>,
    right: Option<Handle>,
    color: Color,
}

impl Links {
    /// A freshly allocated node is red and attached to nothing.
    const DETACHED: Self = Self {
        parent: None,
        left: None,
        right: None,
        color: Color::Red,
    };
}

/// One entry, participating in both trees.
#[derive(Clone)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    links: [Links; 2],
}

impl<K, V> Node<K, V> {
    fn new(key: K, value: V) -> Self {
        Self {
            key,
            value,
            links: [Links::DETACHED; 2],
        }
    }
}

/// Marker for an insertion that found an equal element already in a tree.
struct Duplicate;

// =============================================================================
// DualOrderedMap Definition
// =============================================================================

/// A map sorted by key and by value at the same time.
///
/// `DualOrderedMap` keeps one set of entries reachable through two
/// orderings. [`iter`](Self::iter), [`keys`](Self::keys) and
/// [`values`](Self::values) traverse ascending by key;
/// [`iter_by_value`](Self::iter_by_value),
/// [`keys_by_value`](Self::keys_by_value) and
/// [`values_by_value`](Self::values_by_value) traverse the same entries
/// ascending by value. Lookup and removal are O(log N) from either side.
///
/// Both keys and values must implement a total order, and both are unique
/// across the map. [`put`](Self::put) rejects duplicates on either side
/// instead of overwriting.
///
/// # Time Complexity
///
/// | Operation            | Complexity   |
/// |----------------------|--------------|
/// | `new`                | O(1)         |
/// | `get`                | O(log N)     |
/// | `get_key_for_value`  | O(log N)     |
/// | `put`                | O(log N)     |
/// | `remove`             | O(log N)     |
/// | `remove_value`       | O(log N)     |
/// | `contains_key`       | O(log N)     |
/// | `contains_value`     | O(log N)     |
/// | `len` / `is_empty`   | O(1)         |
/// | `clear`              | O(1) amortized |
///
/// # Examples
///
/// ```rust
/// use dualmap::DualOrderedMap;
///
/// let mut map = DualOrderedMap::new();
/// map.put(2, "beta").unwrap();
/// map.put(1, "gamma").unwrap();
/// map.put(3, "alpha").unwrap();
///
/// // Ascending by key.
/// let keys: Vec<&i32> = map.keys().collect();
/// assert_eq!(keys, vec![&1, &2, &3]);
///
/// // The same entries, ascending by value.
/// let keys: Vec<&i32> = map.keys_by_value().collect();
/// assert_eq!(keys, vec![&3, &2, &1]);
///
/// // Lookup works from either side.
/// assert_eq!(map.get(&2), Some(&"beta"));
/// assert_eq!(map.get_key_for_value(&"beta"), Some(&2));
/// ```
pub struct DualOrderedMap<K, V> {
    arena: Arena<Node<K, V>>,
    roots: [Option<Handle>; 2],
    length: usize,
    generation: u64,
}

impl<K, V> DualOrderedMap<K, V> {
    /// Creates a new empty map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dualmap::DualOrderedMap;
    ///
    /// let map: DualOrderedMap<i32, String> = DualOrderedMap::new();
    /// assert!(map.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            arena: Arena::new(),
            roots: [None, None],
            length: 0,
            generation: 0,
        }
    }

    /// Returns the number of entries in the map.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the map contains no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Removes all entries.
    ///
    /// Counts as a single structural modification: every live
    /// [`Cursor`] observes it on its next step.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dualmap::DualOrderedMap;
    ///
    /// let mut map = DualOrderedMap::new();
    /// map.put(1, "one").unwrap();
    /// map.clear();
    /// assert!(map.is_empty());
    /// ```
    pub fn clear(&mut self) {
        self.arena.clear();
        self.roots = [None, None];
        self.length = 0;
        self.generation += 1;
    }

    /// Returns the entry with the smallest key.
    #[must_use]
    pub fn first(&self) -> Option<(&K, &V)> {
        self.first_handle(Order::Key).map(|node| self.entry_at(node))
    }

    /// Returns the entry with the largest key.
    #[must_use]
    pub fn last(&self) -> Option<(&K, &V)> {
        self.roots[Order::Key.index()]
            .map(|root| self.entry_at(self.maximum(Order::Key, root)))
    }

    /// Returns the entry with the smallest value.
    #[must_use]
    pub fn first_by_value(&self) -> Option<(&K, &V)> {
        self.first_handle(Order::Value).map(|node| self.entry_at(node))
    }

    /// Returns the entry with the largest value.
    #[must_use]
    pub fn last_by_value(&self) -> Option<(&K, &V)> {
        self.roots[Order::Value.index()]
            .map(|root| self.entry_at(self.maximum(Order::Value, root)))
    }

    /// Returns an iterator over entries in ascending key order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dualmap::DualOrderedMap;
    ///
    /// let mut map = DualOrderedMap::new();
    /// map.put(2, "two").unwrap();
    /// map.put(1, "one").unwrap();
    ///
    /// let entries: Vec<(&i32, &&str)> = map.iter().collect();
    /// assert_eq!(entries, vec![(&1, &"one"), (&2, &"two")]);
    /// ```
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self)
    }

    /// Returns an iterator over entries in ascending value order.
    #[must_use]
    pub fn iter_by_value(&self) -> IterByValue<'_, K, V> {
        IterByValue::new(self)
    }

    /// Returns an iterator over keys in ascending key order.
    #[must_use]
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys::new(self)
    }

    /// Returns an iterator over keys in ascending order of their values.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dualmap::DualOrderedMap;
    ///
    /// let mut map = DualOrderedMap::new();
    /// map.put(1, "z").unwrap();
    /// map.put(2, "a").unwrap();
    ///
    /// let keys: Vec<&i32> = map.keys_by_value().collect();
    /// assert_eq!(keys, vec![&2, &1]);
    /// ```
    #[must_use]
    pub fn keys_by_value(&self) -> KeysByValue<'_, K, V> {
        KeysByValue::new(self)
    }

    /// Returns an iterator over values in key order.
    #[must_use]
    pub fn values(&self) -> Values<'_, K, V> {
        Values::new(self)
    }

    /// Returns an iterator over values in ascending value order.
    #[must_use]
    pub fn values_by_value(&self) -> ValuesByValue<'_, K, V> {
        ValuesByValue::new(self)
    }

    /// Creates a fail-fast cursor positioned before the smallest key.
    ///
    /// Unlike the iterators, a cursor does not borrow the map. Every step
    /// takes the map as an argument and first verifies that no structural
    /// modification happened outside the cursor; see [`Cursor`].
    #[must_use]
    pub fn cursor(&self) -> Cursor {
        Cursor::new(self, Order::Key)
    }

    /// Creates a fail-fast cursor positioned before the smallest value.
    #[must_use]
    pub fn cursor_by_value(&self) -> Cursor {
        Cursor::new(self, Order::Value)
    }

    // =========================================================================
    // Crate-Internal Accessors
    // =========================================================================

    #[inline]
    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub(crate) fn entry_at(&self, node: Handle) -> (&K, &V) {
        let node = self.arena.get(node);
        (&node.key, &node.value)
    }

    /// Leftmost node of a tree, the start of its in-order walk.
    pub(crate) fn first_handle(&self, order: Order) -> Option<Handle> {
        self.roots[order.index()].map(|root| self.minimum(order, root))
    }

    /// In-order successor of a node within one tree.
    pub(crate) fn successor_handle(&self, order: Order, node: Handle) -> Option<Handle> {
        if let Some(right) = self.links(order, node).right {
            return Some(self.minimum(order, right));
        }
        let mut child = node;
        let mut parent = self.links(order, node).parent;
        while let Some(current) = parent {
            if self.links(order, current).left == Some(child) {
                return Some(current);
            }
            child = current;
            parent = self.links(order, current).parent;
        }
        None
    }

    /// Dissolves the map into its arena plus the key-ordered handle
    /// sequence, for the owning iterator.
    pub(crate) fn into_parts(self) -> (Arena<Node<K, V>>, Vec<Handle>) {
        let mut handles = Vec::with_capacity(self.length);
        let mut cursor = self.first_handle(Order::Key);
        while let Some(node) = cursor {
            handles.push(node);
            cursor = self.successor_handle(Order::Key, node);
        }
        (self.arena, handles)
    }

    /// Unlinks a node from both trees, frees its slot, and returns the
    /// owned pair. Counts as one structural modification.
    pub(crate) fn detach(&mut self, node: Handle) -> (K, V) {
        self.unlink(Order::Key, node);
        self.unlink(Order::Value, node);
        self.length -= 1;
        self.generation += 1;
        let entry = self.arena.take(node);
        (entry.key, entry.value)
    }

    // =========================================================================
    // Linkage Helpers
    // =========================================================================

    // The helpers below treat an absent node as a black leaf, which lets the
    // balancing code read like the classical formulation.

    #[inline]
    fn links(&self, order: Order, node: Handle) -> &Links {
        &self.arena.get(node).links[order.index()]
    }

    #[inline]
    fn links_mut(&mut self, order: Order, node: Handle) -> &mut Links {
        &mut self.arena.get_mut(node).links[order.index()]
    }

    fn left_of(&self, order: Order, node: Option<Handle>) -> Option<Handle> {
        node.and_then(|node| self.links(order, node).left)
    }

    fn right_of(&self, order: Order, node: Option<Handle>) -> Option<Handle> {
        node.and_then(|node| self.links(order, node).right)
    }

    fn color_of(&self, order: Order, node: Option<Handle>) -> Color {
        node.map_or(Color::Black, |node| self.links(order, node).color)
    }

    fn set_color(&mut self, order: Order, node: Option<Handle>, color: Color) {
        if let Some(node) = node {
            self.links_mut(order, node).color = color;
        }
    }

    fn minimum(&self, order: Order, mut node: Handle) -> Handle {
        while let Some(left) = self.links(order, node).left {
            node = left;
        }
        node
    }

    fn maximum(&self, order: Order, mut node: Handle) -> Handle {
        while let Some(right) = self.links(order, node).right {
            node = right;
        }
        node
    }

    // =========================================================================
    // Rotation and Rebalancing
    // =========================================================================

    fn rotate_left(&mut self, order: Order, node: Handle) {
        let Some(pivot) = self.links(order, node).right else {
            return;
        };
        let inner = self.links(order, pivot).left;
        self.links_mut(order, node).right = inner;
        if let Some(inner) = inner {
            self.links_mut(order, inner).parent = Some(node);
        }

        let parent = self.links(order, node).parent;
        self.links_mut(order, pivot).parent = parent;
        match parent {
            None => self.roots[order.index()] = Some(pivot),
            Some(parent) => {
                let links = self.links_mut(order, parent);
                if links.left == Some(node) {
                    links.left = Some(pivot);
                } else {
                    links.right = Some(pivot);
                }
            }
        }

        self.links_mut(order, pivot).left = Some(node);
        self.links_mut(order, node).parent = Some(pivot);
    }

    fn rotate_right(&mut self, order: Order, node: Handle) {
        let Some(pivot) = self.links(order, node).left else {
            return;
        };
        let inner = self.links(order, pivot).right;
        self.links_mut(order, node).left = inner;
        if let Some(inner) = inner {
            self.links_mut(order, inner).parent = Some(node);
        }

        let parent = self.links(order, node).parent;
        self.links_mut(order, pivot).parent = parent;
        match parent {
            None => self.roots[order.index()] = Some(pivot),
            Some(parent) => {
                let links = self.links_mut(order, parent);
                if links.right == Some(node) {
                    links.right = Some(pivot);
                } else {
                    links.left = Some(pivot);
                }
            }
        }

        self.links_mut(order, pivot).right = Some(node);
        self.links_mut(order, node).parent = Some(pivot);
    }

    /// Restores the red-black invariants after attaching a red leaf.
    fn insert_fixup(&mut self, order: Order, mut node: Handle) {
        loop {
            let Some(parent) = self.links(order, node).parent else {
                break;
            };
            if self.links(order, parent).color == Color::Black {
                break;
            }
            // A red parent is never the root, so the grandparent exists.
            let Some(grandparent) = self.links(order, parent).parent else {
                break;
            };

            if self.links(order, grandparent).left == Some(parent) {
                let uncle = self.links(order, grandparent).right;
                if self.color_of(order, uncle) == Color::Red {
                    self.set_color(order, Some(parent), Color::Black);
                    self.set_color(order, uncle, Color::Black);
                    self.set_color(order, Some(grandparent), Color::Red);
                    node = grandparent;
                } else {
                    if self.links(order, parent).right == Some(node) {
                        node = parent;
                        self.rotate_left(order, node);
                    }
                    if let Some(parent) = self.links(order, node).parent {
                        self.set_color(order, Some(parent), Color::Black);
                        if let Some(grandparent) = self.links(order, parent).parent {
                            self.set_color(order, Some(grandparent), Color::Red);
                            self.rotate_right(order, grandparent);
                        }
                    }
                }
            } else {
                let uncle = self.links(order, grandparent).left;
                if self.color_of(order, uncle) == Color::Red {
                    self.set_color(order, Some(parent), Color::Black);
                    self.set_color(order, uncle, Color::Black);
                    self.set_color(order, Some(grandparent), Color::Red);
                    node = grandparent;
                } else {
                    if self.links(order, parent).left == Some(node) {
                        node = parent;
                        self.rotate_right(order, node);
                    }
                    if let Some(parent) = self.links(order, node).parent {
                        self.set_color(order, Some(parent), Color::Black);
                        if let Some(grandparent) = self.links(order, parent).parent {
                            self.set_color(order, Some(grandparent), Color::Red);
                            self.rotate_left(order, grandparent);
                        }
                    }
                }
            }
        }
        let root = self.roots[order.index()];
        self.set_color(order, root, Color::Black);
    }

    /// Replaces the subtree rooted at `occupant` with `replacement` in the
    /// occupant's parent, or at the root.
    fn transplant(&mut self, order: Order, occupant: Handle, replacement: Option<Handle>) {
        let parent = self.links(order, occupant).parent;
        match parent {
            None => self.roots[order.index()] = replacement,
            Some(parent) => {
                let links = self.links_mut(order, parent);
                if links.left == Some(occupant) {
                    links.left = replacement;
                } else {
                    links.right = replacement;
                }
            }
        }
        if let Some(replacement) = replacement {
            self.links_mut(order, replacement).parent = parent;
        }
    }

    /// Unlinks a node from one tree, preserving node identity.
    ///
    /// An interior node is replaced by its in-order successor through
    /// pointer surgery; key and value never move between nodes, because the
    /// other tree still holds positions for them.
    fn unlink(&mut self, order: Order, node: Handle) {
        let left = self.links(order, node).left;
        let right = self.links(order, node).right;

        let (fixup_child, fixup_parent, removed_color) = match (left, right) {
            (Some(left), Some(right)) => {
                let successor = self.minimum(order, right);
                let successor_color = self.links(order, successor).color;
                let child = self.links(order, successor).right;

                let fixup_parent = if self.links(order, successor).parent == Some(node) {
                    Some(successor)
                } else {
                    let parent = self.links(order, successor).parent;
                    self.transplant(order, successor, child);
                    self.links_mut(order, successor).right = Some(right);
                    self.links_mut(order, right).parent = Some(successor);
                    parent
                };

                self.transplant(order, node, Some(successor));
                self.links_mut(order, successor).left = Some(left);
                self.links_mut(order, left).parent = Some(successor);
                let color = self.links(order, node).color;
                self.links_mut(order, successor).color = color;

                (child, fixup_parent, successor_color)
            }
            (left, right) => {
                let child = left.or(right);
                let parent = self.links(order, node).parent;
                let color = self.links(order, node).color;
                self.transplant(order, node, child);
                (child, parent, color)
            }
        };

        *self.links_mut(order, node) = Links::DETACHED;

        if removed_color == Color::Black {
            self.delete_fixup(order, fixup_child, fixup_parent);
        }
    }

    /// Restores the red-black invariants after removing a black node.
    ///
    /// `node` may be absent; `parent` tracks where the missing black height
    /// hangs. Absent siblings read as black leaves through the helpers.
    fn delete_fixup(&mut self, order: Order, mut node: Option<Handle>, mut parent: Option<Handle>) {
        while node != self.roots[order.index()] && self.color_of(order, node) == Color::Black {
            let Some(pivot) = parent else {
                break;
            };

            if node == self.links(order, pivot).left {
                let mut sibling = self.links(order, pivot).right;
                if self.color_of(order, sibling) == Color::Red {
                    self.set_color(order, sibling, Color::Black);
                    self.set_color(order, Some(pivot), Color::Red);
                    self.rotate_left(order, pivot);
                    sibling = self.links(order, pivot).right;
                }

                if self.color_of(order, self.left_of(order, sibling)) == Color::Black
                    && self.color_of(order, self.right_of(order, sibling)) == Color::Black
                {
                    self.set_color(order, sibling, Color::Red);
                    node = Some(pivot);
                    parent = self.links(order, pivot).parent;
                } else {
                    if self.color_of(order, self.right_of(order, sibling)) == Color::Black {
                        self.set_color(order, self.left_of(order, sibling), Color::Black);
                        self.set_color(order, sibling, Color::Red);
                        if let Some(sibling) = sibling {
                            self.rotate_right(order, sibling);
                        }
                        sibling = self.links(order, pivot).right;
                    }
                    let pivot_color = self.color_of(order, Some(pivot));
                    self.set_color(order, sibling, pivot_color);
                    self.set_color(order, Some(pivot), Color::Black);
                    self.set_color(order, self.right_of(order, sibling), Color::Black);
                    self.rotate_left(order, pivot);
                    node = self.roots[order.index()];
                    parent = None;
                }
            } else {
                let mut sibling = self.links(order, pivot).left;
                if self.color_of(order, sibling) == Color::Red {
                    self.set_color(order, sibling, Color::Black);
                    self.set_color(order, Some(pivot), Color::Red);
                    self.rotate_right(order, pivot);
                    sibling = self.links(order, pivot).left;
                }

                if self.color_of(order, self.right_of(order, sibling)) == Color::Black
                    && self.color_of(order, self.left_of(order, sibling)) == Color::Black
                {
                    self.set_color(order, sibling, Color::Red);
                    node = Some(pivot);
                    parent = self.links(order, pivot).parent;
                } else {
                    if self.color_of(order, self.left_of(order, sibling)) == Color::Black {
                        self.set_color(order, self.right_of(order, sibling), Color::Black);
                        self.set_color(order, sibling, Color::Red);
                        if let Some(sibling) = sibling {
                            self.rotate_left(order, sibling);
                        }
                        sibling = self.links(order, pivot).left;
                    }
                    let pivot_color = self.color_of(order, Some(pivot));
                    self.set_color(order, sibling, pivot_color);
                    self.set_color(order, Some(pivot), Color::Black);
                    self.set_color(order, self.left_of(order, sibling), Color::Black);
                    self.rotate_right(order, pivot);
                    node = self.roots[order.index()];
                    parent = None;
                }
            }
        }
        self.set_color(order, node, Color::Black);
    }
}

// =============================================================================
// Ordered Operations
// =============================================================================

impl<K: Ord, V: Ord> DualOrderedMap<K, V> {
    /// Builds a map from an iterator of pairs, applying [`put`](Self::put)
    /// semantics to each pair in iteration order.
    ///
    /// The first duplicate key or duplicate value aborts construction and
    /// is returned as the error.
    ///
    /// # Errors
    ///
    /// Returns the first [`InsertError`] encountered, carrying the rejected
    /// pair.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dualmap::DualOrderedMap;
    ///
    /// let map = DualOrderedMap::try_from_iter([(1, "one"), (2, "two")]).unwrap();
    /// assert_eq!(map.len(), 2);
    ///
    /// let error = DualOrderedMap::try_from_iter([(1, "dup"), (2, "dup")]);
    /// assert!(error.is_err());
    /// ```
    pub fn try_from_iter<I>(iter: I) -> Result<Self, InsertError<K, V>>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut map = Self::new();
        map.try_extend(iter)?;
        Ok(map)
    }

    /// Returns a reference to the value associated with the key.
    ///
    /// The key may be any borrowed form of the map's key type, with a
    /// matching ordering.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dualmap::DualOrderedMap;
    ///
    /// let mut map = DualOrderedMap::new();
    /// map.put("hello".to_string(), 42).unwrap();
    ///
    /// assert_eq!(map.get("hello"), Some(&42));
    /// assert_eq!(map.get("world"), None);
    /// ```
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.locate_key(key)
            .map(|node| &self.arena.get(node).value)
    }

    /// Returns a reference to the key associated with the value.
    ///
    /// The reverse lookup is a search of the value-ordered tree, O(log N)
    /// like [`get`](Self::get).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dualmap::DualOrderedMap;
    ///
    /// let mut map = DualOrderedMap::new();
    /// map.put(7, "seven").unwrap();
    ///
    /// assert_eq!(map.get_key_for_value(&"seven"), Some(&7));
    /// assert_eq!(map.get_key_for_value(&"eight"), None);
    /// ```
    #[must_use]
    pub fn get_key_for_value<Q>(&self, value: &Q) -> Option<&K>
    where
        V: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.locate_value(value)
            .map(|node| &self.arena.get(node).key)
    }

    /// Returns `true` if the map contains the key.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.locate_key(key).is_some()
    }

    /// Returns `true` if the map contains the value.
    ///
    /// Searches the value-ordered tree; this is O(log N), not a scan.
    #[must_use]
    pub fn contains_value<Q>(&self, value: &Q) -> bool
    where
        V: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.locate_value(value).is_some()
    }

    /// Inserts a key-value pair.
    ///
    /// The map never overwrites. A duplicate key or a duplicate value
    /// rejects the pair and leaves the map exactly as it was; to rebind a
    /// key or a value, remove the old entry first.
    ///
    /// A duplicate value is only discovered after the key-side insertion
    /// has succeeded, in which case the key-side insertion is undone by the
    /// exact inverse unlink before the error returns.
    ///
    /// # Errors
    ///
    /// [`InsertErrorKind::DuplicateKey`] if the key is present,
    /// [`InsertErrorKind::DuplicateValue`] if the value is bound to another
    /// key. The rejected pair rides in the error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dualmap::{DualOrderedMap, InsertErrorKind};
    ///
    /// let mut map = DualOrderedMap::new();
    /// map.put(5, "x").unwrap();
    ///
    /// // Same value under a different key: rejected, map unchanged.
    /// let error = map.put(6, "x").unwrap_err();
    /// assert_eq!(error.kind(), InsertErrorKind::DuplicateValue);
    /// assert_eq!(map.len(), 1);
    /// assert_eq!(map.get(&6), None);
    /// assert_eq!(map.get(&5), Some(&"x"));
    /// ```
    pub fn put(&mut self, key: K, value: V) -> Result<(), InsertError<K, V>> {
        let node = self.arena.alloc(Node::new(key, value));

        if self.insert_into(Order::Key, node).is_err() {
            let entry = self.arena.take(node);
            return Err(InsertError::new(
                InsertErrorKind::DuplicateKey,
                entry.key,
                entry.value,
            ));
        }

        if self.insert_into(Order::Value, node).is_err() {
            // Undo the key-side insertion so the map is left untouched.
            self.unlink(Order::Key, node);
            let entry = self.arena.take(node);
            return Err(InsertError::new(
                InsertErrorKind::DuplicateValue,
                entry.key,
                entry.value,
            ));
        }

        self.length += 1;
        self.generation += 1;
        Ok(())
    }

    /// Removes the entry with the given key, returning its value.
    ///
    /// Returns `None` if the key is absent; a failed removal is not a
    /// structural modification.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dualmap::DualOrderedMap;
    ///
    /// let mut map = DualOrderedMap::new();
    /// map.put(1, "one").unwrap();
    ///
    /// assert_eq!(map.remove(&1), Some("one"));
    /// assert_eq!(map.remove(&1), None);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node = self.locate_key(key)?;
        let (_, value) = self.detach(node);
        Some(value)
    }

    /// Removes the entry with the given key, returning the owned pair.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node = self.locate_key(key)?;
        Some(self.detach(node))
    }

    /// Removes the entry with the given value, returning its key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dualmap::DualOrderedMap;
    ///
    /// let mut map = DualOrderedMap::new();
    /// map.put(1, "one").unwrap();
    ///
    /// assert_eq!(map.remove_value(&"one"), Some(1));
    /// assert_eq!(map.remove_value(&"one"), None);
    /// ```
    pub fn remove_value<Q>(&mut self, value: &Q) -> Option<K>
    where
        V: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node = self.locate_value(value)?;
        let (key, _) = self.detach(node);
        Some(key)
    }

    /// Inserts every pair from the iterator, in iteration order, stopping
    /// at the first rejection.
    ///
    /// Pairs accepted before the rejection stay in the map; for a given
    /// source order the result is deterministic.
    ///
    /// # Errors
    ///
    /// The first [`InsertError`] encountered, carrying the rejected pair.
    pub fn try_extend<I>(&mut self, iter: I) -> Result<(), InsertError<K, V>>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in iter {
            self.put(key, value)?;
        }
        Ok(())
    }

    /// Keeps only the entries for which the predicate holds.
    ///
    /// Entries are visited in key order. Every removal counts as a
    /// structural modification.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dualmap::DualOrderedMap;
    ///
    /// let mut map = DualOrderedMap::try_from_iter((0..6).map(|n| (n, n * 10))).unwrap();
    /// map.retain(|key, _| key % 2 == 0);
    ///
    /// let keys: Vec<&i32> = map.keys().collect();
    /// assert_eq!(keys, vec![&0, &2, &4]);
    /// ```
    pub fn retain<F>(&mut self, mut predicate: F)
    where
        F: FnMut(&K, &V) -> bool,
    {
        let mut doomed = Vec::new();
        let mut cursor = self.first_handle(Order::Key);
        while let Some(node) = cursor {
            let entry = self.arena.get(node);
            if !predicate(&entry.key, &entry.value) {
                doomed.push(node);
            }
            cursor = self.successor_handle(Order::Key, node);
        }
        for node in doomed {
            self.detach(node);
        }
    }

    // =========================================================================
    // Search and Insertion Internals
    // =========================================================================

    fn locate_key<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut cursor = self.roots[Order::Key.index()];
        while let Some(node) = cursor {
            cursor = match key.cmp(self.arena.get(node).key.borrow()) {
                Ordering::Less => self.links(Order::Key, node).left,
                Ordering::Greater => self.links(Order::Key, node).right,
                Ordering::Equal => return Some(node),
            };
        }
        None
    }

    fn locate_value<Q>(&self, value: &Q) -> Option<Handle>
    where
        V: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut cursor = self.roots[Order::Value.index()];
        while let Some(node) = cursor {
            cursor = match value.cmp(self.arena.get(node).value.borrow()) {
                Ordering::Less => self.links(Order::Value, node).left,
                Ordering::Greater => self.links(Order::Value, node).right,
                Ordering::Equal => return Some(node),
            };
        }
        None
    }

    /// Compares two nodes by the projection the given tree orders on.
    fn compare(&self, order: Order, a: Handle, b: Handle) -> Ordering {
        let (a, b) = (self.arena.get(a), self.arena.get(b));
        match order {
            Order::Key => a.key.cmp(&b.key),
            Order::Value => a.value.cmp(&b.value),
        }
    }

    /// Attaches an allocated, detached node to one tree.
    ///
    /// On [`Duplicate`] the tree has not been touched, which is what makes
    /// the two-phase insertion in [`put`](Self::put) cheap to reason about.
    fn insert_into(&mut self, order: Order, node: Handle) -> Result<(), Duplicate> {
        let mut cursor = match self.roots[order.index()] {
            None => {
                self.links_mut(order, node).color = Color::Black;
                self.roots[order.index()] = Some(node);
                return Ok(());
            }
            Some(root) => root,
        };

        loop {
            match self.compare(order, node, cursor) {
                Ordering::Equal => return Err(Duplicate),
                Ordering::Less => match self.links(order, cursor).left {
                    Some(left) => cursor = left,
                    None => {
                        self.links_mut(order, cursor).left = Some(node);
                        break;
                    }
                },
                Ordering::Greater => match self.links(order, cursor).right {
                    Some(right) => cursor = right,
                    None => {
                        self.links_mut(order, cursor).right = Some(node);
                        break;
                    }
                },
            }
        }

        self.links_mut(order, node).parent = Some(cursor);
        self.insert_fixup(order, node);
        Ok(())
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V> Default for DualOrderedMap<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone, V: Clone> Clone for DualOrderedMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            arena: self.arena.clone(),
            roots: self.roots,
            length: self.length,
            generation: self.generation,
        }
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for DualOrderedMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.length == other.length && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<K: Eq, V: Eq> Eq for DualOrderedMap<K, V> {}

/// The hash covers the length and every entry in key order, so equal maps
/// hash equally regardless of insertion order.
impl<K: Hash, V: Hash> Hash for DualOrderedMap<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.length.hash(state);
        for (key, value) in self.iter() {
            key.hash(state);
            value.hash(state);
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for DualOrderedMap<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for DualOrderedMap<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        let mut first = true;
        for (key, value) in self.iter() {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{key}: {value}")?;
        }
        write!(formatter, "}}")
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<K, V> serde::Serialize for DualOrderedMap<K, V>
where
    K: serde::Serialize,
    V: serde::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(feature = "serde")]
struct DualOrderedMapVisitor<K, V> {
    key_marker: std::marker::PhantomData<K>,
    value_marker: std::marker::PhantomData<V>,
}

#[cfg(feature = "serde")]
impl<K, V> DualOrderedMapVisitor<K, V> {
    const fn new() -> Self {
        Self {
            key_marker: std::marker::PhantomData,
            value_marker: std::marker::PhantomData,
        }
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::de::Visitor<'de> for DualOrderedMapVisitor<K, V>
where
    K: serde::Deserialize<'de> + Ord,
    V: serde::Deserialize<'de> + Ord,
{
    type Value = DualOrderedMap<K, V>;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a map with unique keys and unique values")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        let mut map = DualOrderedMap::new();
        while let Some((key, value)) = access.next_entry()? {
            map.put(key, value).map_err(serde::de::Error::custom)?;
        }
        Ok(map)
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::Deserialize<'de> for DualOrderedMap<K, V>
where
    K: serde::Deserialize<'de> + Ord,
    V: serde::Deserialize<'de> + Ord,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_map(DualOrderedMapVisitor::new())
    }
}

// =============================================================================
// Tests
// =============================================================================
