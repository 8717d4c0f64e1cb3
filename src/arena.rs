//! Slot storage for tree nodes.
//!
//! All nodes of one map live in a single [`Arena`] and refer to each other
//! by [`Handle`] instead of references. Handles are plain indices, so the
//! doubly-linked tree structure involves no ownership cycles, and unlinking
//! a node from both trees is a matter of rewriting indices.

use std::num::NonZero;

/// Index of a live slot in an [`Arena`].
///
/// Stored with an offset of one so the niche of [`NonZero`] makes
/// `Option<Handle>` the same size as `Handle` itself.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(transparent)]
pub(crate) struct Handle(NonZero<u32>);

impl Handle {
    /// Largest representable slot index.
    pub(crate) const MAX: usize = (u32::MAX - 1) as usize;

    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) const fn from_index(index: usize) -> Self {
        assert!(index <= Self::MAX, "arena is at maximum capacity");
        // index + 1 is nonzero by construction and the assert keeps the
        // cast in range
        match NonZero::new((index + 1) as u32) {
            Some(raw) => Self(raw),
            None => unreachable!(),
        }
    }

    #[inline]
    pub(crate) const fn to_index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

/// Slab of optional slots with a free list.
///
/// Freed slots are recycled before the slot vector grows. A handle stays
/// valid exactly as long as its slot is occupied; the map's generation
/// counter is what keeps stale handles from ever being dereferenced.
#[derive(Clone)]
pub(crate) struct Arena<T> {
    slots: Vec<Option<T>>,
    free: Vec<Handle>,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Stores an element and returns the handle of its slot.
    pub(crate) fn alloc(&mut self, element: T) -> Handle {
        if let Some(handle) = self.free.pop() {
            self.slots[handle.to_index()] = Some(element);
            handle
        } else {
            let handle = Handle::from_index(self.slots.len());
            self.slots.push(Some(element));
            handle
        }
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> &T {
        self.slots[handle.to_index()]
            .as_ref()
            .expect("arena handle points at a freed slot")
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut T {
        self.slots[handle.to_index()]
            .as_mut()
            .expect("arena handle points at a freed slot")
    }

    /// Vacates a slot, returning its element and recycling the handle.
    pub(crate) fn take(&mut self, handle: Handle) -> T {
        let element = self.slots[handle.to_index()]
            .take()
            .expect("arena handle points at a freed slot");
        self.free.push(handle);
        element
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }
}
