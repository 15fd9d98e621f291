//! Keyed packed storage: the sparse-index / packed-store composition.
//!
//! [`KeyedPackedStorage<T>`] gives callers key → record access while keeping
//! the backing storage dense. Every operation translates the key to a dense
//! position through a [`SparseIndex`], then operates on a
//! [`PackedRecordStore`] at that position. Removals swap the last record
//! into the vacated slot; the index's own swap repair keeps both sides'
//! dense orders identical at all times.
//!
//! Invariant: a key is logically present iff the index maps it to a position
//! below the store's length — and under this composition the index and store
//! agree exactly on the set of live keys and their positions.

use crate::container::error::{KeyNotFoundError, StorageResult};
use crate::container::packed::PackedRecordStore;
use crate::container::sparse_index::{SparseIndex, SparseIndexConfig};
use crate::container::types::{DensePosition, EntityId};


/// Dense record storage addressed by sparse entity keys.
///
/// Composition of one [`SparseIndex`] (key → dense position) and one
/// [`PackedRecordStore`] (dense position → record, and back to key).
/// Iteration is over the store's contiguous record array; per-key operations
/// are O(1) amortized.
///
/// Not thread-safe; callers needing shared access must synchronize
/// externally.

#[derive(Debug)]
pub struct KeyedPackedStorage<T> {
    index: SparseIndex,
    store: PackedRecordStore<T>,
}

impl<T> Default for KeyedPackedStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> KeyedPackedStorage<T> {
    /// Creates empty storage with the default index configuration.
    pub fn new() -> Self {
        Self {
            index: SparseIndex::new(),
            store: PackedRecordStore::new(),
        }
    }

    /// Creates empty storage with an explicit index configuration.
    ///
    /// # Panics
    /// Propagates [`SparseIndex::with_config`] contract violations.
    pub fn with_config(config: SparseIndexConfig) -> Self {
        Self {
            index: SparseIndex::with_config(config),
            store: PackedRecordStore::new(),
        }
    }

    /// Number of live records.
    #[inline]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` when no records are stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Returns `true` if `key` maps to a live record.
    pub fn contains(&self, key: EntityId) -> bool {
        self.position(key).is_some()
    }

    /// Dense position of `key`, or `None` if absent.
    pub fn position(&self, key: EntityId) -> Option<DensePosition> {
        self.index
            .get(key)
            .filter(|position| *position < self.store.len())
    }

    /// Adds a record under `key`.
    ///
    /// Never overwrites: a present key leaves the storage unchanged and
    /// returns `Ok(false)`. Otherwise the record is appended to the dense
    /// store and the key registered in the index at the same position.
    ///
    /// # Errors
    /// [`StorageError::AllocationFailed`](crate::StorageError) when either
    /// side cannot grow; the index insertion is rolled back so no key mapping
    /// changes on failure.
    pub fn add(&mut self, key: EntityId, record: T) -> StorageResult<bool> {
        if self.contains(key) {
            return Ok(false);
        }
        let position = self.index.insert(key)?;
        debug_assert_eq!(position, self.store.len());
        match self.store.add(key, record) {
            Ok(added) => {
                debug_assert!(added, "index and store disagreed on key presence");
                Ok(added)
            }
            Err(e) => {
                self.index.remove(key);
                Err(e)
            }
        }
    }

    /// Removes the record under `key`, returning it.
    ///
    /// Absent keys are a benign no-op (`None`). A non-last removal relocates
    /// exactly one other record (the previously-last one) on both sides of
    /// the composition.
    pub fn remove(&mut self, key: EntityId) -> Option<T> {
        let position = self.index.remove(key)?;
        match self.store.swap_remove_at(position) {
            Ok((removed_key, record)) => {
                debug_assert_eq!(removed_key, key);
                Some(record)
            }
            Err(_) => {
                debug_assert!(false, "index mapped a key beyond the dense prefix");
                None
            }
        }
    }

    /// Shared reference to the record under `key`.
    ///
    /// # Errors
    /// [`StorageError::KeyNotFound`](crate::StorageError) if absent; absence
    /// here is a caller bug, not a recoverable lookup miss.
    pub fn get(&self, key: EntityId) -> StorageResult<&T> {
        let position = self.position(key).ok_or(KeyNotFoundError { key })?;
        self.store.get_by_index(position)
    }

    /// Mutable reference to the record under `key`.
    ///
    /// # Errors
    /// [`StorageError::KeyNotFound`](crate::StorageError) if absent.
    pub fn get_mut(&mut self, key: EntityId) -> StorageResult<&mut T> {
        let position = self.position(key).ok_or(KeyNotFoundError { key })?;
        self.store.get_by_index_mut(position)
    }

    /// Iterates `(key, record)` pairs in dense order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (EntityId, &T)> + ExactSizeIterator {
        self.store.iter()
    }

    /// Read-only view of the sparse index (occupancy diagnostics).
    #[inline]
    pub fn index(&self) -> &SparseIndex {
        &self.index
    }

    /// Read-only view of the packed store.
    #[inline]
    pub fn store(&self) -> &PackedRecordStore<T> {
        &self.store
    }

    /// Drops every record and all index state. Capacity is retained.
    pub fn clear(&mut self) {
        self.index.clear();
        self.store.clear();
    }
}
