//! Paged sparse-to-dense index with dynamic bucket management.
//!
//! This module implements [`SparseIndex`], a mapping from sparse entity keys
//! to dense positions, backed by fixed-capacity buckets that each cover one
//! contiguous range of the key space, plus a dense key array that records
//! which key occupies each position.
//!
//! # What this module provides
//!
//! - **`SparseIndex`**: key → dense-position mapping with O(1) amortized
//!   insert/remove and O(log bucketCapacity) lookup inside the owning bucket.
//! - **`SparseIndexConfig`**: construction-time tuning (initial dense
//!   capacity, geometric growth factor, bucket capacity).
//! - **`SparseIter`**: double-ended iteration over `(key, position)` pairs in
//!   dense-array order.
//!
//! # Bucket model
//!
//! Buckets live in a `BTreeMap` keyed by the **lower bound** of the key range
//! each bucket covers; the bucket owning key `k` is the one with the greatest
//! lower bound `<= k`. A fresh bucket is created page-aligned
//! (`key - key % bucket_capacity`) on the first insert touching uncovered key
//! space. Within a bucket, entries are two parallel fixed-capacity arrays
//! (keys and values) kept sorted by key at all times; lookups binary-search
//! the key array.
//!
//! Range boundaries move as occupancy changes:
//!
//! - **Split (Distribute)**: inserting into a full bucket first moves the
//!   upper half of its entries into a new bucket whose lower bound is the
//!   midpoint key.
//! - **Merge**: when a remove drops a bucket below half capacity and the
//!   combined size with the next bucket still fits, the next bucket is
//!   absorbed and its boundary disappears.
//! - **Rebalance**: when the combined size does not fit, the minimal prefix
//!   of the next bucket is pulled over to even out occupancy, and the next
//!   bucket's lower bound advances.
//!
//! # Invariants
//!
//! - A key is present iff its owning bucket exists and contains an entry for
//!   it; the entry's value is the key's position in the dense array.
//! - Bucket entries are sorted by key; `len <= bucket_capacity`.
//! - After any remove, every bucket except possibly the highest-range bucket
//!   holds at least `bucket_capacity / 2` entries.
//! - The dense array is a gap-free prefix `[0, len)`; entry values and dense
//!   slots form a bijection.
//! - A bucket that empties with no successor is destroyed.
//!
//! # Failure semantics
//!
//! Duplicate insert is an idempotent no-op returning the existing position;
//! removing an absent key is a no-op returning `None`. The only operation
//! failure is allocation: bucket creation and dense-array growth reserve
//! memory with `try_reserve` and surface failure as
//! [`StorageError::AllocationFailed`](crate::StorageError).

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Bound;

use crate::container::error::{AllocationError, StorageResult};
use crate::container::types::{DensePosition, EntityId};
use crate::log::{CallSite, LogLevel, Logger, NoopLogger};


/// Default bucket capacity (and default initial dense capacity).
pub const DEFAULT_BUCKET_CAPACITY: usize = 1024;

/// Construction-time configuration for [`SparseIndex`].
///
/// All knobs are fixed at construction and immutable afterward.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SparseIndexConfig {

    /// Dense-array capacity reserved on the first insert.
    pub initial_capacity: usize,

    /// Multiplicative dense-array growth factor; must be greater than 1.
    pub growth_factor: f64,

    /// Fixed entry capacity of every bucket; must be at least 2.
    pub bucket_capacity: usize,
}

impl Default for SparseIndexConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_BUCKET_CAPACITY,
            growth_factor: 2.0,
            bucket_capacity: DEFAULT_BUCKET_CAPACITY,
        }
    }
}

/// One fixed-capacity page of the sparse index.
///
/// Parallel key/value arrays sorted by key. Both vectors reserve the full
/// bucket capacity up front, so entry movement never reallocates after
/// construction.

struct Bucket {
    keys: Vec<EntityId>,
    values: Vec<DensePosition>,
}

impl Bucket {
    fn new(capacity: usize) -> Result<Self, AllocationError> {
        let mut keys = Vec::new();
        let mut values = Vec::new();
        keys.try_reserve_exact(capacity)
            .map_err(|_| AllocationError { context: "bucket key array", additional: capacity })?;
        values.try_reserve_exact(capacity)
            .map_err(|_| AllocationError { context: "bucket value array", additional: capacity })?;
        Ok(Self { keys, values })
    }

    #[inline]
    fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    fn value(&self, key: EntityId) -> Option<DensePosition> {
        self.keys
            .binary_search(&key)
            .ok()
            .map(|index| self.values[index])
    }

    /// Inserts a new entry, preserving sort order.
    ///
    /// Caller guarantees the key is absent and the bucket is below capacity.
    fn insert(&mut self, key: EntityId, value: DensePosition) {
        debug_assert!(self.keys.len() < self.keys.capacity());
        if let Err(index) = self.keys.binary_search(&key) {
            self.keys.insert(index, key);
            self.values.insert(index, value);
        } else {
            debug_assert!(false, "duplicate key inserted into bucket");
        }
    }

    /// Removes the entry for `key`, shifting later entries down.
    fn remove(&mut self, key: EntityId) -> Option<DensePosition> {
        let index = self.keys.binary_search(&key).ok()?;
        self.keys.remove(index);
        Some(self.values.remove(index))
    }

    /// Rewrites the value for an existing key. Returns `false` if absent.
    fn set(&mut self, key: EntityId, value: DensePosition) -> bool {
        match self.keys.binary_search(&key) {
            Ok(index) => {
                self.values[index] = value;
                true
            }
            Err(_) => false,
        }
    }

    /// Moves the upper half of this bucket's entries into a fresh bucket.
    ///
    /// Returns the first key of the moved half (the new bucket's range lower
    /// bound) together with the bucket itself. Caller guarantees at least two
    /// entries are present.
    fn split_upper_half(&mut self, capacity: usize) -> Result<(EntityId, Bucket), AllocationError> {
        debug_assert!(self.keys.len() >= 2);
        let mid = self.keys.len() / 2;
        let mut upper = Bucket::new(capacity)?;
        upper.keys.extend(self.keys.drain(mid..));
        upper.values.extend(self.values.drain(mid..));
        let split_key = upper.keys[0];
        Ok((split_key, upper))
    }

    /// Appends all entries of `other`, whose keys are all greater than ours.
    ///
    /// Caller guarantees the combined size fits one bucket.
    fn merge_from(&mut self, other: Bucket) {
        debug_assert!(self.keys.len() + other.keys.len() <= self.keys.capacity());
        debug_assert!(match (self.keys.last(), other.keys.first()) {
            (Some(last), Some(first)) => last < first,
            _ => true,
        });
        self.keys.extend(other.keys);
        self.values.extend(other.values);
    }

    /// Pulls the minimal prefix of `other` needed to even out occupancy.
    fn pull_from(&mut self, other: &mut Bucket) {
        let total = self.keys.len() + other.keys.len();
        let target = total / 2;
        let moved = target.saturating_sub(self.keys.len());
        self.keys.extend(other.keys.drain(..moved));
        self.values.extend(other.values.drain(..moved));
    }

    #[inline]
    fn first_key(&self) -> Option<EntityId> {
        self.keys.first().copied()
    }
}

/// Paged sparse-to-dense index.
///
/// Maps entity keys to positions in a gap-free dense array. The sparse side
/// is a collection of fixed-capacity buckets covering contiguous key ranges,
/// created lazily and kept at least half full (except the highest range) by
/// split/merge/rebalance at structural-change points. The dense side is a
/// key array in insertion order whose slots are exactly the mapped positions,
/// repaired by swap on removal so iteration never sees a hole.
///
/// Not thread-safe; callers needing shared access must synchronize
/// externally.

pub struct SparseIndex {
    dense: Vec<EntityId>,
    buckets: BTreeMap<EntityId, Bucket>,
    initial_capacity: usize,
    growth_factor: f64,
    bucket_capacity: usize,
    logger: Box<dyn Logger>,
}

impl Default for SparseIndex {
    fn default() -> Self {
        Self::new()
    }
}

// Manual Debug: the injected logger is not Debug.
impl fmt::Debug for SparseIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SparseIndex")
            .field("len", &self.dense.len())
            .field("bucket_count", &self.buckets.len())
            .field("bucket_capacity", &self.bucket_capacity)
            .finish()
    }
}

impl SparseIndex {
    /// Creates an index with the default configuration.
    pub fn new() -> Self {
        Self::with_config(SparseIndexConfig::default())
    }

    /// Creates an index with an explicit configuration.
    ///
    /// # Panics
    /// Misconfiguration is a construction-time contract violation:
    /// `growth_factor` must exceed 1 and `bucket_capacity` must be at least 2
    /// and representable as a key.
    pub fn with_config(config: SparseIndexConfig) -> Self {
        assert!(
            config.growth_factor > 1.0,
            "SparseIndex growth factor must be greater than 1"
        );
        assert!(
            config.bucket_capacity >= 2 && config.bucket_capacity <= EntityId::MAX as usize,
            "SparseIndex bucket capacity must be in 2..=EntityId::MAX"
        );
        Self {
            dense: Vec::new(),
            buckets: BTreeMap::new(),
            initial_capacity: config.initial_capacity,
            growth_factor: config.growth_factor,
            bucket_capacity: config.bucket_capacity,
            logger: Box::new(NoopLogger),
        }
    }

    /// Replaces the injected logging capability (default: no-op).
    pub fn with_logger(mut self, logger: Box<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Number of live keys.
    #[inline]
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    /// Returns `true` when no keys are present.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// Current dense-array capacity. Never shrinks automatically.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.dense.capacity()
    }

    /// Fixed per-bucket entry capacity.
    #[inline]
    pub fn bucket_capacity(&self) -> usize {
        self.bucket_capacity
    }

    /// Number of live buckets.
    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Per-bucket occupancy in ascending key-range order.
    ///
    /// Diagnostic accessor for hosts and tests checking the occupancy bound.
    pub fn bucket_sizes(&self) -> Vec<usize> {
        self.buckets.values().map(Bucket::len).collect()
    }

    /// Returns `true` if `key` is present.
    pub fn contains(&self, key: EntityId) -> bool {
        self.get(key).is_some()
    }

    /// Dense position of `key`, or `None` if absent.
    pub fn get(&self, key: EntityId) -> Option<DensePosition> {
        let (_, bucket) = self.buckets.range(..=key).next_back()?;
        bucket.value(key)
    }

    /// Inserts `key` and returns its dense position.
    ///
    /// Idempotent: a key already present keeps its mapping and its existing
    /// position is returned. Otherwise the key is appended to the dense array
    /// (growing it geometrically when full) and registered in its owning
    /// bucket, splitting that bucket first if it is at capacity.
    ///
    /// # Errors
    /// [`StorageError::AllocationFailed`](crate::StorageError) when bucket
    /// creation or dense-array growth cannot reserve memory; no key mapping
    /// is changed in that case.
    pub fn insert(&mut self, key: EntityId) -> StorageResult<DensePosition> {
        if let Some(existing) = self.get(key) {
            return Ok(existing);
        }

        let start = match self.owning_start(key) {
            Some(start) if self.bucket_len(start) == self.bucket_capacity => {
                let split_key = self.split_bucket(start)?;
                if key >= split_key { split_key } else { start }
            }
            Some(start) => start,
            None => self.create_bucket(self.page_start(key))?,
        };

        self.ensure_dense_capacity()?;
        let position = self.dense.len();
        self.dense.push(key);
        if let Some(bucket) = self.buckets.get_mut(&start) {
            bucket.insert(key, position);
        } else {
            debug_assert!(false, "owning bucket vanished during insert");
        }
        Ok(position)
    }

    /// Removes `key`, returning the dense position it vacated.
    ///
    /// Absent keys are a benign no-op (`None`). When the vacated position is
    /// not the last, the last dense key is swapped into it and that key's
    /// bucket entry rewritten, keeping positions gap-free. A bucket dropping
    /// below half capacity merges with or rebalances against the next bucket;
    /// a bucket emptied with no successor is destroyed.
    pub fn remove(&mut self, key: EntityId) -> Option<DensePosition> {
        let start = self.owning_start(key)?;
        let position = self.buckets.get(&start)?.value(key)?;

        let last_position = self.dense.len() - 1;
        if position != last_position {
            let moved_key = self.dense[last_position];
            self.dense[position] = moved_key;
            self.redirect(moved_key, position);
        }
        self.dense.truncate(last_position);

        let occupancy = match self.buckets.get_mut(&start) {
            Some(bucket) => {
                bucket.remove(key);
                bucket.len()
            }
            None => return Some(position),
        };

        if occupancy < self.bucket_capacity / 2 {
            self.shrink_bucket(start);
        }
        Some(position)
    }

    /// Removes every key and destroys every bucket.
    ///
    /// Dense-array capacity is retained; the engine never shrinks it
    /// automatically.
    pub fn clear(&mut self) {
        let buckets = self.buckets.len();
        self.buckets.clear();
        self.dense.clear();
        if buckets > 0 {
            self.log(LogLevel::Trace, format_args!("cleared index, released {buckets} bucket(s)"));
        }
    }

    /// Double-ended iteration over `(key, position)` pairs in dense order.
    pub fn iter(&self) -> SparseIter<'_> {
        SparseIter { inner: self.dense.iter().enumerate() }
    }

    // ── internal helpers ────────────────────────────────────────────────────

    /// Range lower bound of the bucket owning `key`, if covered.
    #[inline]
    fn owning_start(&self, key: EntityId) -> Option<EntityId> {
        self.buckets.range(..=key).next_back().map(|(start, _)| *start)
    }

    /// Lower bound following `start`, if any.
    #[inline]
    fn next_start(&self, start: EntityId) -> Option<EntityId> {
        self.buckets
            .range((Bound::Excluded(start), Bound::Unbounded))
            .next()
            .map(|(next, _)| *next)
    }

    #[inline]
    fn bucket_len(&self, start: EntityId) -> usize {
        self.buckets.get(&start).map_or(0, Bucket::len)
    }

    /// Page-aligned lower bound for a key landing in uncovered key space.
    #[inline]
    fn page_start(&self, key: EntityId) -> EntityId {
        let span = self.bucket_capacity as EntityId;
        key - key % span
    }

    fn create_bucket(&mut self, start: EntityId) -> StorageResult<EntityId> {
        let bucket = Bucket::new(self.bucket_capacity)?;
        self.buckets.insert(start, bucket);
        self.log(LogLevel::Trace, format_args!("bucket created for range [{start}..)"));
        Ok(start)
    }

    /// Splits the full bucket at `start`, returning the new lower bound.
    fn split_bucket(&mut self, start: EntityId) -> StorageResult<EntityId> {
        let capacity = self.bucket_capacity;
        let Some(bucket) = self.buckets.get_mut(&start) else {
            debug_assert!(false, "split target bucket must exist");
            return Ok(start);
        };
        let (split_key, upper) = bucket.split_upper_half(capacity)?;
        let lower_len = bucket.len();
        let upper_len = upper.len();
        self.buckets.insert(split_key, upper);
        self.log(
            LogLevel::Debug,
            format_args!(
                "bucket [{start}..) split at key {split_key} ({lower_len} / {upper_len} entries)"
            ),
        );
        Ok(split_key)
    }

    /// Rewrites the bucket entry of a key relocated by a dense swap.
    fn redirect(&mut self, key: EntityId, position: DensePosition) {
        let redirected = self
            .owning_start(key)
            .and_then(|start| self.buckets.get_mut(&start))
            .is_some_and(|bucket| bucket.set(key, position));
        debug_assert!(redirected, "relocated key must have a bucket entry");
    }

    /// Restores the occupancy bound for an under-occupied bucket.
    fn shrink_bucket(&mut self, start: EntityId) {
        let Some(next) = self.next_start(start) else {
            // Highest-range bucket: exempt from the bound, destroyed if empty.
            if self.bucket_len(start) == 0 {
                self.buckets.remove(&start);
                self.log(LogLevel::Trace, format_args!("bucket [{start}..) destroyed (empty)"));
            }
            return;
        };

        let combined = self.bucket_len(start) + self.bucket_len(next);
        let Some(mut next_bucket) = self.buckets.remove(&next) else {
            return;
        };

        if combined <= self.bucket_capacity {
            if let Some(bucket) = self.buckets.get_mut(&start) {
                bucket.merge_from(next_bucket);
            }
            self.log(
                LogLevel::Debug,
                format_args!("bucket [{next}..) merged into [{start}..) ({combined} entries)"),
            );
        } else {
            if let Some(bucket) = self.buckets.get_mut(&start) {
                bucket.pull_from(&mut next_bucket);
            }
            match next_bucket.first_key() {
                Some(new_next) => {
                    self.log(
                        LogLevel::Debug,
                        format_args!(
                            "bucket [{start}..) rebalanced with [{next}..), boundary now {new_next}"
                        ),
                    );
                    self.buckets.insert(new_next, next_bucket);
                }
                None => debug_assert!(false, "rebalance must leave the next bucket non-empty"),
            }
        }
    }

    /// Grows the dense array geometrically when full.
    fn ensure_dense_capacity(&mut self) -> StorageResult<()> {
        if self.dense.len() < self.dense.capacity() {
            return Ok(());
        }
        let current = self.dense.capacity();
        let grown = (current as f64 * self.growth_factor).ceil() as usize;
        let target = grown.max(current + 1).max(self.initial_capacity).max(1);
        let additional = target - self.dense.len();
        self.dense
            .try_reserve_exact(additional)
            .map_err(|_| AllocationError { context: "dense key array", additional })?;
        if current > 0 {
            self.log(
                LogLevel::Debug,
                format_args!("dense key array grew from {current} to {target} slots"),
            );
        }
        Ok(())
    }

    #[track_caller]
    fn log(&self, level: LogLevel, message: fmt::Arguments<'_>) {
        self.logger.log(level, &message.to_string(), CallSite::here());
    }
}

impl<'a> IntoIterator for &'a SparseIndex {
    type Item = (EntityId, DensePosition);
    type IntoIter = SparseIter<'a>;

    fn into_iter(self) -> SparseIter<'a> {
        self.iter()
    }
}

/// Double-ended iterator over `(key, position)` pairs in dense-array order.
pub struct SparseIter<'a> {
    inner: std::iter::Enumerate<std::slice::Iter<'a, EntityId>>,
}

impl Iterator for SparseIter<'_> {
    type Item = (EntityId, DensePosition);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(position, key)| (*key, position))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for SparseIter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(position, key)| (*key, position))
    }
}

impl ExactSizeIterator for SparseIter<'_> {}
