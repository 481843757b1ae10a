//! # Slot Store
//!
//! Generational slot map with a dense value array.
//!
//! ```text
//!  handle ──> slots[index] ──dense_pos──> dense[pos] = (handle, value)
//!                 │
//!                 └─ next_free (only while on the free list)
//! ```
//!
//! - Values live contiguously in `dense`, compacted by swap-and-pop.
//! - `slots` is the indirection table. It grows one slot at a time and
//!   never shrinks.
//! - Freed slots are recycled FIFO through a linked list threaded through
//!   the table itself.

use std::iter::FusedIterator;
use std::slice;

use super::handle::Handle;
use crate::error::{StoreError, StoreResult};

/// `dense_pos` of a slot that holds no value.
const EMPTY: u32 = u32::MAX;

/// End-of-list marker for the free list cursors.
const NO_SLOT: u32 = u32::MAX;

/// Index `u32::MAX` is never handed out so that no issued handle can equal
/// [`Handle::NULL`].
const MAX_SLOTS: usize = u32::MAX as usize;

/// Indirection table entry.
#[derive(Clone, Copy, Debug)]
struct Slot {
    /// Handle last issued for this slot (generation included).
    full_id: Handle,
    /// Position in the dense array, or [`EMPTY`].
    dense_pos: u32,
    /// Next slot on the free list, or [`NO_SLOT`].
    next_free: u32,
}

impl Slot {
    #[inline]
    const fn is_live(&self) -> bool {
        self.dense_pos != EMPTY
    }
}

/// Live value together with the handle that owns it.
#[derive(Clone, Debug)]
struct DenseEntry<T> {
    handle: Handle,
    value: T,
}

/// Generational slot map.
///
/// Every [`add`](Self::add) returns a [`Handle`] that stays valid until the
/// value is [`remove`](Self::remove)d. Values are kept densely packed, so
/// iteration touches contiguous memory, but their physical order changes
/// on removal.
///
/// # Thread Safety
///
/// This store is NOT thread-safe. Use one store per thread or wrap in a mutex.
///
/// # Example
///
/// ```
/// use ces_core::SlotStore;
///
/// let mut store = SlotStore::new();
/// let a = store.add("a");
/// let b = store.add("b");
///
/// store.remove(a).unwrap();
/// assert!(!store.has(a));
/// assert_eq!(store.lookup(b), Ok(&"b"));
///
/// // The freed slot is recycled, but the old handle stays dead.
/// let c = store.add("c");
/// assert_eq!(c.index(), a.index());
/// assert!(!store.has(a));
/// ```
#[derive(Clone, Debug)]
pub struct SlotStore<T> {
    /// Live values, densely packed.
    dense: Vec<DenseEntry<T>>,
    /// Indirection table. High-water mark of slots ever needed.
    slots: Vec<Slot>,
    /// Free list head (next slot to reuse).
    free_head: u32,
    /// Free list tail (last freed slot).
    free_tail: u32,
}

impl<T> SlotStore<T> {
    /// Creates an empty store. Nothing is allocated until the first add.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            dense: Vec::new(),
            slots: Vec::new(),
            free_head: NO_SLOT,
            free_tail: NO_SLOT,
        }
    }

    /// Creates an empty store with room for `capacity` values.
    ///
    /// Only storage is reserved. The indirection table still gains slots
    /// one at a time as they are needed.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            dense: Vec::with_capacity(capacity),
            slots: Vec::with_capacity(capacity),
            free_head: NO_SLOT,
            free_tail: NO_SLOT,
        }
    }

    /// Returns the number of live values.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    /// Returns `true` if the store holds no values.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// Returns the size of the indirection table.
    ///
    /// This is the largest number of slots ever needed at once, not the
    /// current population.
    #[inline]
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Inserts a value and returns its handle.
    ///
    /// This is an **O(1)** amortized operation.
    ///
    /// # Panics
    ///
    /// Panics if storage cannot grow, either because the 32-bit slot index
    /// space is used up or because the allocator fails. Use
    /// [`try_add`](Self::try_add) to handle those cases.
    pub fn add(&mut self, value: T) -> Handle {
        match self.try_add(value) {
            Ok(handle) => handle,
            Err(err) => panic!("slot store cannot grow: {err}"),
        }
    }

    /// Inserts a value and returns its handle, reporting growth failures.
    ///
    /// Reuses the oldest freed slot if there is one, otherwise appends a
    /// single new slot to the indirection table. The value always goes to
    /// the end of the dense array.
    ///
    /// # Errors
    ///
    /// - [`StoreError::SlotsExhausted`] if a new slot is needed but the
    ///   table already spans the full index space.
    /// - [`StoreError::AllocationFailed`] if reserving memory fails.
    ///
    /// The store is unchanged when an error is returned.
    pub fn try_add(&mut self, value: T) -> StoreResult<Handle> {
        // Reserve first so a failure cannot leave a slot half-claimed.
        self.dense
            .try_reserve(1)
            .map_err(|_| StoreError::AllocationFailed { requested: 1 })?;

        let index = match self.pop_free() {
            Some(index) => {
                tracing::trace!(index, "recycling slot");
                index
            }
            None => self.push_slot()?,
        };

        let dense_pos = to_u32(self.dense.len());
        let slot = &mut self.slots[index as usize];
        slot.full_id = slot.full_id.next_generation();
        slot.dense_pos = dense_pos;
        let handle = slot.full_id;

        self.dense.push(DenseEntry { handle, value });
        Ok(handle)
    }

    /// Checks if `handle` refers to a live value of this store.
    ///
    /// Stale handles, handles from other stores and [`Handle::NULL`] all
    /// return `false`.
    #[inline]
    #[must_use]
    pub fn has(&self, handle: Handle) -> bool {
        self.dense_pos(handle).is_some()
    }

    /// Gets a reference to the value for `handle`, if it is live.
    #[inline]
    #[must_use]
    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.dense_pos(handle).map(|pos| &self.dense[pos].value)
    }

    /// Gets a mutable reference to the value for `handle`, if it is live.
    #[inline]
    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.dense_pos(handle).map(|pos| &mut self.dense[pos].value)
    }

    /// Looks up the value for a handle that is expected to be live.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidHandle`] if `handle` fails
    /// [`has`](Self::has).
    pub fn lookup(&self, handle: Handle) -> StoreResult<&T> {
        match self.dense_pos(handle) {
            Some(pos) => Ok(&self.dense[pos].value),
            None => Err(reject(handle, "lookup")),
        }
    }

    /// Mutable variant of [`lookup`](Self::lookup).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidHandle`] if `handle` fails
    /// [`has`](Self::has).
    pub fn lookup_mut(&mut self, handle: Handle) -> StoreResult<&mut T> {
        match self.dense_pos(handle) {
            Some(pos) => Ok(&mut self.dense[pos].value),
            None => Err(reject(handle, "lookup_mut")),
        }
    }

    /// Removes the value for `handle` and returns it.
    ///
    /// The last dense entry is moved into the hole and its slot is pointed
    /// at the new position. The freed slot goes to the tail of the free
    /// list. This is an **O(1)** operation.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidHandle`] if `handle` fails
    /// [`has`](Self::has). The store is unchanged in that case.
    pub fn remove(&mut self, handle: Handle) -> StoreResult<T> {
        match self.dense_pos(handle) {
            Some(pos) => Ok(self.remove_at(pos)),
            None => Err(reject(handle, "remove")),
        }
    }

    /// Removes every value for which `keep` returns `false`.
    ///
    /// Removal follows the same swap-and-pop path as [`remove`](Self::remove),
    /// so surviving values may change position.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(Handle, &mut T) -> bool,
    {
        let mut pos = 0;
        while pos < self.dense.len() {
            let entry = &mut self.dense[pos];
            if keep(entry.handle, &mut entry.value) {
                pos += 1;
            } else {
                // Entry at `pos` is replaced by the former last entry, which
                // still needs visiting, so `pos` does not advance.
                self.remove_at(pos);
            }
        }
    }

    /// Iterates over `(handle, &value)` pairs in dense order.
    ///
    /// The order is physical storage order. It is neither insertion order
    /// nor handle order, and changes across removals.
    #[inline]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.dense.iter(),
        }
    }

    /// Iterates over `(handle, &mut value)` pairs in dense order.
    #[inline]
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut {
            inner: self.dense.iter_mut(),
        }
    }

    /// Iterates over the handles of all live values.
    pub fn handles(&self) -> impl Iterator<Item = Handle> + '_ {
        self.dense.iter().map(|entry| entry.handle)
    }

    /// Iterates over all live values.
    pub fn values(&self) -> impl Iterator<Item = &T> + '_ {
        self.dense.iter().map(|entry| &entry.value)
    }

    /// Iterates mutably over all live values.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> + '_ {
        self.dense.iter_mut().map(|entry| &mut entry.value)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Dense position of a live handle.
    #[inline]
    fn dense_pos(&self, handle: Handle) -> Option<usize> {
        let slot = self.slots.get(handle.index() as usize)?;
        (slot.full_id == handle && slot.is_live()).then_some(slot.dense_pos as usize)
    }

    /// Removes the live entry at dense position `pos`.
    ///
    /// The last dense entry is moved into the hole and its slot is updated.
    fn remove_at(&mut self, pos: usize) -> T {
        let removed = self.dense.swap_remove(pos);
        if let Some(moved) = self.dense.get(pos) {
            self.slots[moved.handle.index() as usize].dense_pos = to_u32(pos);
        }

        let index = removed.handle.index();
        let slot = &mut self.slots[index as usize];
        slot.dense_pos = EMPTY;

        if slot.full_id.generation() == u32::MAX {
            // Another reuse would wrap the generation and revive old handles.
            tracing::warn!(index, "retiring slot with saturated generation");
        } else {
            self.push_free(index);
        }

        removed.value
    }

    /// Appends one fresh slot to the indirection table.
    fn push_slot(&mut self) -> StoreResult<u32> {
        let slots = self.slots.len();
        if slots >= MAX_SLOTS {
            return Err(StoreError::SlotsExhausted { slots });
        }
        self.slots
            .try_reserve(1)
            .map_err(|_| StoreError::AllocationFailed { requested: 1 })?;

        let index = to_u32(slots);
        self.slots.push(Slot {
            full_id: Handle::new(index, 0),
            dense_pos: EMPTY,
            next_free: NO_SLOT,
        });
        tracing::trace!(index, "grew indirection table");
        Ok(index)
    }

    /// Pops the oldest freed slot.
    fn pop_free(&mut self) -> Option<u32> {
        if self.free_head == NO_SLOT {
            return None;
        }
        let index = self.free_head;
        let slot = &mut self.slots[index as usize];
        self.free_head = slot.next_free;
        slot.next_free = NO_SLOT;
        if self.free_head == NO_SLOT {
            self.free_tail = NO_SLOT;
        }
        Some(index)
    }

    /// Appends a slot to the free list tail.
    fn push_free(&mut self, index: u32) {
        self.slots[index as usize].next_free = NO_SLOT;
        if self.free_tail == NO_SLOT {
            self.free_head = index;
        } else {
            self.slots[self.free_tail as usize].next_free = index;
        }
        self.free_tail = index;
    }
}

impl<T> Default for SlotStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Narrows a dense position or slot index.
///
/// Both are bounded by the slot table length, which `push_slot` caps at
/// [`MAX_SLOTS`], so the value always fits.
#[inline]
#[allow(clippy::cast_possible_truncation)]
const fn to_u32(value: usize) -> u32 {
    debug_assert!(value <= MAX_SLOTS);
    value as u32
}

/// Builds the invalid-handle error and records the misuse.
#[cold]
fn reject(handle: Handle, operation: &'static str) -> StoreError {
    tracing::warn!(?handle, operation, "rejected invalid handle");
    StoreError::InvalidHandle { handle }
}

// =============================================================================
// Iterators
// =============================================================================

/// Iterator over `(Handle, &T)` pairs, see [`SlotStore::iter`].
#[derive(Clone, Debug)]
pub struct Iter<'a, T> {
    inner: slice::Iter<'a, DenseEntry<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (Handle, &'a T);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|entry| (entry.handle, &entry.value))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

/// Iterator over `(Handle, &mut T)` pairs, see [`SlotStore::iter_mut`].
#[derive(Debug)]
pub struct IterMut<'a, T> {
    inner: slice::IterMut<'a, DenseEntry<T>>,
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = (Handle, &'a mut T);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|entry| (entry.handle, &mut entry.value))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}
impl<T> FusedIterator for IterMut<'_, T> {}

impl<'a, T> IntoIterator for &'a SlotStore<T> {
    type Item = (Handle, &'a T);
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut SlotStore<T> {
    type Item = (Handle, &'a mut T);
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
