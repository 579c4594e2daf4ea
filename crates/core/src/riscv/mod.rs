//! RISC-V architectural definitions used by the front-end.
//!
//! Only the slices of the architecture the fetch path touches live here:
//! encoding field extraction and immediates for predecode, and the Sv32
//! paging structures carried through the TLB.

/// RV32 encoding tables, field extraction, and immediates.
pub mod encoding;

/// Sv32 page numbers and page table entries.
pub mod paging;
