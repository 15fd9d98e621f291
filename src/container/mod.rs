//! # Container Module
//!
//! Internal storage-engine implementation.
//!
//! This module contains the core building blocks:
//! - Paged sparse-to-dense index
//! - Packed record store
//! - Keyed packed storage composition
//! - Slot allocator
//!
//! Public API exposure is controlled by `lib.rs`.

pub mod types;
pub mod error;
pub mod sparse_index;
pub mod packed;
pub mod keyed;
pub mod indirection;
