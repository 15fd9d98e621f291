//! Core Identifier Types and Boundary Sentinels
//!
//! This module defines the **fundamental types and reserved values** shared by
//! every container in the crate. They form the semantic backbone of the
//! storage engine:
//!
//! - Keys are small, copyable, non-negative integers supplied by the caller
//!   (typically entity identifiers minted elsewhere).
//! - Dense positions index the packed, gap-free record storage.
//! - Slots are stable identifiers handed out by the slot allocator.
//!
//! ## Null sentinels
//!
//! Two all-ones values, [`NULL_ENTITY`] and [`NULL_COMPONENT`], are reserved
//! by convention at the system boundary to mean "no entity" / "no component
//! type". The storage engine performs **no special-casing** of these values:
//! they are ordinary (if conventionally unused) keys. Hosts that rely on the
//! convention must simply never store records under them.

/// Caller-supplied non-negative integer identifying a logical item.
pub type EntityId = u32;

/// Compact identifier for a component type at the host boundary.
pub type ComponentId = u32;

/// Index into packed, gap-free storage; the slot a live item occupies.
pub type DensePosition = usize;

/// Stable identifier handed out by [`SlotAllocator`](crate::SlotAllocator).
pub type SlotId = usize;

/// Reserved "no entity" sentinel (all-ones bit pattern).
///
/// A boundary convention only; the engine treats it as an ordinary key.
pub const NULL_ENTITY: EntityId = EntityId::MAX;

/// Reserved "no component type" sentinel (all-ones bit pattern).
///
/// A boundary convention only; the engine treats it as an ordinary value.
pub const NULL_COMPONENT: ComponentId = ComponentId::MAX;

const _: [(); 1] = [(); (NULL_ENTITY == !0u32) as usize];
const _: [(); 1] = [(); (NULL_COMPONENT == !0u32) as usize];
