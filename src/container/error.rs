//! Error types for the sparse-to-dense storage engine.
//!
//! This module declares focused, composable error types used across the
//! index, store and allocator. Each error carries enough context to make
//! failures actionable while remaining small and cheap to pass around or
//! convert into the aggregate [`StorageError`].
//!
//! ## Taxonomy
//! The engine distinguishes three failure families (benign no-ops — duplicate
//! insert, remove of an absent key — are not errors at all and never appear
//! here):
//!
//! * **Contract violations** — operating on a key that must exist but does
//!   not ([`KeyNotFoundError`]), an index outside the allocated range
//!   ([`OutOfBoundsError`]), or a slot that was never handed out or already
//!   erased ([`InvalidSlotError`]). These indicate caller bugs and are
//!   surfaced immediately rather than masked with defaults.
//! * **Resource exhaustion** — [`AllocationError`], raised when bucket
//!   creation or dense-array growth cannot reserve memory. Kept distinct
//!   from not-found so callers can tell "you asked for something absent"
//!   apart from "the container cannot honor any request".
//!
//! ## Typical flow
//! Low-level container operations return the dedicated types; call sites use
//! `?` to bubble them into [`StorageError`], which hosts can match on for
//! control flow or log with user-readable messages.
//!
//! ## Display vs. Debug
//! * [`fmt::Display`] is optimized for operator logs (short, imperative
//!   phrasing).
//! * [`fmt::Debug`] (derived) retains full structure for diagnostics.

use std::fmt;

use crate::container::types::{EntityId, SlotId};


/// Returned when an index falls outside the allocated range of a container.
///
/// Carries both the offending index and the maximum valid index so callers
/// can distinguish this structural violation from a generic key-not-found
/// case.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfBoundsError {

    /// The index that was requested.
    pub index: usize,

    /// The maximum valid index (inclusive), or `None` if the container is
    /// empty and no index is valid.
    pub max_valid_index: Option<usize>,
}

impl fmt::Display for OutOfBoundsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max_valid_index {
            Some(max) => write!(
                f,
                "index {} out of bounds; max valid index is {}",
                self.index, max
            ),
            None => write!(f, "index {} out of bounds; container is empty", self.index),
        }
    }
}

impl std::error::Error for OutOfBoundsError {}

/// Returned when a lookup requires a key to be present and it is not.
///
/// Lookups that tolerate absence return `Option` instead; this error marks
/// the hard-precondition paths (`get` on store and composition) where a
/// missing key is a caller bug.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyNotFoundError {

    /// The key that was looked up.
    pub key: EntityId,
}

impl fmt::Display for KeyNotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "key {} not present in storage", self.key)
    }
}

impl std::error::Error for KeyNotFoundError {}

/// Returned when a slot operation violates the allocator contract.
///
/// Raised by `erase` when the slot was never returned by `next()` or was
/// already erased and not yet recycled.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidSlotError {

    /// The offending slot identifier.
    pub slot: SlotId,
}

impl fmt::Display for InvalidSlotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot {} is not live (never allocated or already erased)", self.slot)
    }
}

impl std::error::Error for InvalidSlotError {}

/// Returned when the container cannot reserve backing memory.
///
/// Produced at structural-change points: bucket creation and dense-array
/// growth. Indicates the container cannot honor the request at all, as
/// opposed to the request referring to something absent.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationError {

    /// The structure that failed to grow.
    pub context: &'static str,

    /// Number of additional elements the reservation asked for.
    pub additional: usize,
}

impl fmt::Display for AllocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to reserve {} additional element(s) for {}",
            self.additional, self.context
        )
    }
}

impl std::error::Error for AllocationError {}

/// Aggregate error for all storage-engine operations.
///
/// Container methods return the aggregate so call sites can use `?` freely;
/// the focused types convert in via `From`.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {

    /// An index fell outside the allocated range.
    OutOfBounds(OutOfBoundsError),

    /// A key that must exist was absent.
    KeyNotFound(KeyNotFoundError),

    /// A slot operation violated the allocator contract.
    InvalidSlot(InvalidSlotError),

    /// Backing memory could not be reserved.
    AllocationFailed(AllocationError),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::OutOfBounds(e) => write!(f, "{e}"),
            StorageError::KeyNotFound(e) => write!(f, "{e}"),
            StorageError::InvalidSlot(e) => write!(f, "{e}"),
            StorageError::AllocationFailed(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::OutOfBounds(e) => Some(e),
            StorageError::KeyNotFound(e) => Some(e),
            StorageError::InvalidSlot(e) => Some(e),
            StorageError::AllocationFailed(e) => Some(e),
        }
    }
}

impl From<OutOfBoundsError> for StorageError {
    fn from(e: OutOfBoundsError) -> Self { StorageError::OutOfBounds(e) }
}
impl From<KeyNotFoundError> for StorageError {
    fn from(e: KeyNotFoundError) -> Self { StorageError::KeyNotFound(e) }
}
impl From<InvalidSlotError> for StorageError {
    fn from(e: InvalidSlotError) -> Self { StorageError::InvalidSlot(e) }
}
impl From<AllocationError> for StorageError {
    fn from(e: AllocationError) -> Self { StorageError::AllocationFailed(e) }
}

/// Convenience alias for storage-engine results.
pub type StorageResult<T> = Result<T, StorageError>;
