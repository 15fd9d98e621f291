//! Slot allocator: a free-list-backed indirection table.
//!
//! [`SlotAllocator`] hands out stable integer slot identifiers and recycles
//! erased ones. Each live slot's indirection entry records the dense position
//! it was pointed at (set to the dense size at allocation time, rewritable
//! via [`put`](SlotAllocator::put) after a compensating swap); erased slots
//! are marked undirected and parked on a free list until
//! [`next`](SlotAllocator::next) reuses them.
//!
//! Invariant: `dense_size` equals the number of entries that are not
//! undirected; a freed slot is never handed out again until recycled by
//! `next`.

use crate::container::error::{InvalidSlotError, OutOfBoundsError, StorageResult};
use crate::container::types::{DensePosition, SlotId};


/// Free-list-backed indirection table handing out stable slot identifiers.
///
/// Not thread-safe; callers needing shared access must synchronize
/// externally.

#[derive(Debug, Default, Clone)]
pub struct SlotAllocator {
    entries: Vec<Option<DensePosition>>,
    free: Vec<SlotId>,
    dense_size: usize,
}

impl SlotAllocator {
    /// Creates an empty allocator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands out a slot, recycling the free list before minting new ids.
    ///
    /// The slot's indirection entry is set to the current dense size. Always
    /// succeeds; amortized O(1).
    pub fn next(&mut self) -> SlotId {
        let position = self.dense_size;
        self.dense_size += 1;
        if let Some(slot) = self.free.pop() {
            self.entries[slot] = Some(position);
            slot
        } else {
            self.entries.push(Some(position));
            self.entries.len() - 1
        }
    }

    /// Erases a live slot, marking it undirected and parking it for reuse.
    ///
    /// # Errors
    /// [`StorageError::InvalidSlot`](crate::StorageError) if the slot was
    /// never returned by [`next`](Self::next) or was already erased —
    /// a programming-contract violation, not a recoverable case.
    pub fn erase(&mut self, slot: SlotId) -> StorageResult<()> {
        match self.entries.get_mut(slot) {
            Some(entry @ Some(_)) => {
                *entry = None;
                self.free.push(slot);
                self.dense_size -= 1;
                Ok(())
            }
            _ => Err(InvalidSlotError { slot }.into()),
        }
    }

    /// Overwrites the indirection entry for an allocated slot.
    ///
    /// Used after a compensating swap relocates the dense element a slot
    /// points at.
    ///
    /// # Errors
    /// [`StorageError::OutOfBounds`](crate::StorageError) if the slot is
    /// outside the allocated range, and
    /// [`StorageError::InvalidSlot`](crate::StorageError) if it is erased —
    /// only live slots take part in compensating swaps.
    pub fn put(&mut self, slot: SlotId, dense: DensePosition) -> StorageResult<()> {
        if slot >= self.entries.len() {
            return Err(self.out_of_bounds(slot).into());
        }
        match &mut self.entries[slot] {
            Some(entry) => {
                *entry = dense;
                Ok(())
            }
            None => Err(InvalidSlotError { slot }.into()),
        }
    }

    /// Reads a slot's indirection entry without mutation.
    ///
    /// Returns `Ok(None)` for an erased slot.
    ///
    /// # Errors
    /// [`StorageError::OutOfBounds`](crate::StorageError) if the slot was
    /// never allocated.
    pub fn at(&self, slot: SlotId) -> StorageResult<Option<DensePosition>> {
        self.entries
            .get(slot)
            .copied()
            .ok_or_else(|| self.out_of_bounds(slot).into())
    }

    /// Resets to the empty state, discarding entries and the free list.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.free.clear();
        self.dense_size = 0;
    }

    /// Total slots ever allocated and not cleared (live + erased).
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no slots have been allocated.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of live (directed) slots.
    #[inline]
    pub fn dense_size(&self) -> usize {
        self.dense_size
    }

    /// Current entry capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    fn out_of_bounds(&self, slot: SlotId) -> OutOfBoundsError {
        OutOfBoundsError {
            index: slot,
            max_valid_index: self.entries.len().checked_sub(1),
        }
    }
}
