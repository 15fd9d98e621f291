//! # Sparse Storage
//!
//! Storage engine associating compact, densely-packed records with sparse,
//! externally-chosen integer keys (entity identifiers).
//!
//! ## Design Goals
//! - O(1) amortized per-key insert/remove/lookup
//! - Gap-free dense storage for cache-friendly iteration
//! - Bounded sparse-side memory via bucket split/merge/rebalance
//! - Fail-fast contract errors, explicit results (no sentinel returns)
//!
//! The crate provides four building blocks:
//! - [`SlotAllocator`] — free-list-backed indirection table handing out
//!   stable slot identifiers.
//! - [`SparseIndex`] — paged sparse-to-dense index with dynamic bucket
//!   splitting, merging and rebalancing.
//! - [`PackedRecordStore`] — swap-remove packed record array with reverse
//!   key bookkeeping.
//! - [`KeyedPackedStorage`] — the composition giving callers key → record
//!   access over dense backing storage.
//!
//! All containers are single-threaded by design; wrap them in external
//! synchronization if shared across threads.

#![forbid(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]
#![deny(dead_code)]

pub mod container;
pub mod log;

// ─────────────────────────────────────────────────────────────────────────────
// Re-exports (Public API)
// ─────────────────────────────────────────────────────────────────────────────

// Core containers

pub use container::sparse_index::{
    SparseIndex,
    SparseIndexConfig,
    SparseIter,
};

pub use container::packed::PackedRecordStore;

pub use container::keyed::KeyedPackedStorage;

pub use container::indirection::SlotAllocator;

pub use container::error::{
    StorageResult,
    StorageError,
    OutOfBoundsError,
    KeyNotFoundError,
    InvalidSlotError,
    AllocationError,
};

pub use container::types::{
    EntityId,
    ComponentId,
    DensePosition,
    SlotId,
    NULL_ENTITY,
    NULL_COMPONENT,
};

pub use log::{
    LogLevel,
    CallSite,
    Logger,
    NoopLogger,
    StderrLogger,
    TracingLogger,
};

// ─────────────────────────────────────────────────────────────────────────────
// Prelude (Optional but recommended)
// ─────────────────────────────────────────────────────────────────────────────

/// Commonly used storage types.
///
/// Import with:
/// ```rust
/// use sparse_storage::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        SparseIndex,
        SparseIndexConfig,
        PackedRecordStore,
        KeyedPackedStorage,
        SlotAllocator,
        StorageResult,
        StorageError,
        EntityId,
        DensePosition,
        SlotId,
    };
}
