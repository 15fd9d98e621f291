//! Packed record store: a gap-free dense array with key bookkeeping.
//!
//! [`PackedRecordStore<T>`] stores records contiguously and keeps two pieces
//! of bookkeeping alongside: a parallel array mapping each dense position
//! back to the key stored there, and a key → position map. The reverse array
//! is what makes swap-remove repairable — when the last record is swapped
//! into a vacated slot, the store knows which key just moved and rewrites its
//! mapping.
//!
//! # Invariants
//!
//! - `records.len() == keys.len()`; live records occupy exactly positions
//!   `[0, len)` with no gaps.
//! - For every live key `k`: `positions[k] == i` iff `keys[i] == k`.
//! - The store exclusively owns all record storage.
//!
//! # Failure semantics
//!
//! Adding a present key and removing an absent key are benign no-ops. `get`
//! on an absent key is a hard precondition violation reported as
//! [`StorageError::KeyNotFound`](crate::StorageError) — never a shared
//! placeholder record, which would mask caller bugs. Position-addressed
//! access past the dense prefix is
//! [`StorageError::OutOfBounds`](crate::StorageError).

use std::collections::HashMap;

use crate::container::error::{
    AllocationError,
    KeyNotFoundError,
    OutOfBoundsError,
    StorageResult,
};
use crate::container::types::{DensePosition, EntityId};


/// Dense, swap-remove packed storage for records keyed by entity.
///
/// Iteration walks the contiguous record array directly: no holes, no
/// indirection. Removal is O(1) by swapping the last record into the vacated
/// slot and repairing the moved key's bookkeeping. Record order is therefore
/// not stable across removals.
///
/// Not thread-safe; callers needing shared access must synchronize
/// externally.

#[derive(Debug, Clone)]
pub struct PackedRecordStore<T> {
    records: Vec<T>,
    keys: Vec<EntityId>,
    positions: HashMap<EntityId, DensePosition>,
}

impl<T> Default for PackedRecordStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PackedRecordStore<T> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            keys: Vec::new(),
            positions: HashMap::new(),
        }
    }

    /// Number of live records.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` when no records are stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns `true` if a record is stored under `key`.
    #[inline]
    pub fn contains(&self, key: EntityId) -> bool {
        self.positions.contains_key(&key)
    }

    /// Appends a record under `key`.
    ///
    /// Never overwrites: if the key is already present the store is unchanged
    /// and `Ok(false)` is returned (the new record is dropped). On success
    /// the record lands at position `len() - 1` and `Ok(true)` is returned.
    ///
    /// # Errors
    /// [`StorageError::AllocationFailed`](crate::StorageError) when backing
    /// storage cannot grow; the store is unchanged in that case.
    pub fn add(&mut self, key: EntityId, record: T) -> StorageResult<bool> {
        if self.contains(key) {
            return Ok(false);
        }
        self.reserve_one()?;
        let position = self.records.len();
        self.records.push(record);
        self.keys.push(key);
        self.positions.insert(key, position);
        Ok(true)
    }

    /// Removes the record under `key`, returning it.
    ///
    /// Absent keys are a benign no-op (`None`). If the vacated position was
    /// not the last, the last record is swapped into it and the moved key's
    /// bookkeeping rewritten, so the dense prefix stays gap-free.
    pub fn remove(&mut self, key: EntityId) -> Option<T> {
        let position = self.positions.get(&key).copied()?;
        match self.swap_remove_at(position) {
            Ok((_, record)) => Some(record),
            Err(_) => None,
        }
    }

    /// Removes the record at `position`, returning the key and record.
    ///
    /// Position-addressed variant for composition paths that have already
    /// translated the key through an index.
    ///
    /// # Errors
    /// [`StorageError::OutOfBounds`](crate::StorageError) if `position` is
    /// outside the dense prefix.
    pub fn swap_remove_at(&mut self, position: DensePosition) -> StorageResult<(EntityId, T)> {
        self.check_position(position)?;
        let removed_key = self.keys[position];

        let last = self.records.len() - 1;
        if position != last {
            let moved_key = self.keys[last];
            self.keys.swap(position, last);
            self.records.swap(position, last);
            self.positions.insert(moved_key, position);
        }
        self.keys.truncate(last);
        self.positions.remove(&removed_key);
        match self.records.pop() {
            Some(record) => Ok((removed_key, record)),
            // Unreachable: check_position guarantees a non-empty store.
            None => Err(OutOfBoundsError { index: position, max_valid_index: None }.into()),
        }
    }

    /// Shared reference to the record under `key`.
    ///
    /// # Errors
    /// [`StorageError::KeyNotFound`](crate::StorageError) if absent; absence
    /// here is a caller bug, not a recoverable lookup miss.
    pub fn get(&self, key: EntityId) -> StorageResult<&T> {
        let position = self.position_of(key)?;
        Ok(&self.records[position])
    }

    /// Mutable reference to the record under `key`.
    ///
    /// # Errors
    /// [`StorageError::KeyNotFound`](crate::StorageError) if absent.
    pub fn get_mut(&mut self, key: EntityId) -> StorageResult<&mut T> {
        let position = self.position_of(key)?;
        Ok(&mut self.records[position])
    }

    /// Dense position of `key`, or `None` if absent.
    #[inline]
    pub fn position(&self, key: EntityId) -> Option<DensePosition> {
        self.positions.get(&key).copied()
    }

    /// Shared reference to the record at `position`.
    ///
    /// # Errors
    /// [`StorageError::OutOfBounds`](crate::StorageError) if `position` is
    /// outside the dense prefix.
    pub fn get_by_index(&self, position: DensePosition) -> StorageResult<&T> {
        self.check_position(position)?;
        Ok(&self.records[position])
    }

    /// Mutable reference to the record at `position`.
    ///
    /// # Errors
    /// [`StorageError::OutOfBounds`](crate::StorageError) if `position` is
    /// outside the dense prefix.
    pub fn get_by_index_mut(&mut self, position: DensePosition) -> StorageResult<&mut T> {
        self.check_position(position)?;
        Ok(&mut self.records[position])
    }

    /// Key occupying `position`.
    ///
    /// # Errors
    /// [`StorageError::OutOfBounds`](crate::StorageError) if `position` is
    /// outside the dense prefix.
    pub fn key_at(&self, position: DensePosition) -> StorageResult<EntityId> {
        self.check_position(position)?;
        Ok(self.keys[position])
    }

    /// All records in dense order.
    #[inline]
    pub fn records(&self) -> &[T] {
        &self.records
    }

    /// Iterates `(key, record)` pairs in dense order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (EntityId, &T)> + ExactSizeIterator {
        self.keys.iter().copied().zip(self.records.iter())
    }

    /// Drops every record and all bookkeeping. Capacity is retained.
    pub fn clear(&mut self) {
        self.records.clear();
        self.keys.clear();
        self.positions.clear();
    }

    // ── internal helpers ────────────────────────────────────────────────────

    fn position_of(&self, key: EntityId) -> StorageResult<DensePosition> {
        self.positions
            .get(&key)
            .copied()
            .ok_or_else(|| KeyNotFoundError { key }.into())
    }

    fn check_position(&self, position: DensePosition) -> StorageResult<()> {
        if position < self.records.len() {
            Ok(())
        } else {
            Err(OutOfBoundsError {
                index: position,
                max_valid_index: self.records.len().checked_sub(1),
            }
            .into())
        }
    }

    /// Reserves room for one more record across all three structures.
    fn reserve_one(&mut self) -> StorageResult<()> {
        self.records
            .try_reserve(1)
            .map_err(|_| AllocationError { context: "record array", additional: 1 })?;
        self.keys
            .try_reserve(1)
            .map_err(|_| AllocationError { context: "position-to-key array", additional: 1 })?;
        self.positions
            .try_reserve(1)
            .map_err(|_| AllocationError { context: "key-to-position map", additional: 1 })?;
        Ok(())
    }
}
