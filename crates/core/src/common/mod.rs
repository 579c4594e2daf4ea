//! Common utilities shared across the front-end model.
//!
//! This module provides the fundamental building blocks used by every
//! component. It includes:
//! 1. **Address Types:** Strong types for virtual and physical addresses
//!    with Sv32 and fetch-geometry views.
//! 2. **Coding:** Priority encoding, popcount, and cacheline word-mask
//!    helpers.
//! 3. **LFSR:** The pseudo-random index generator used for replacement.
//! 4. **Latch:** The one-cycle bus register underlying the tick model.

/// Address type definitions (physical and virtual addresses).
pub mod addr;

/// Priority encoders, popcount, and word-mask helpers.
pub mod coding;

/// One-cycle bus registers.
pub mod latch;

/// Maximal-period linear feedback shift registers.
pub mod lfsr;

pub use addr::{PhysAddr, VirtAddr};
pub use coding::{limit2mask, offset2mask, popcount, priority_encode};
pub use latch::Latch;
pub use lfsr::Lfsr;
