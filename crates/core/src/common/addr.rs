//! Physical and virtual address types.
//!
//! This module defines strong types for the two address spaces seen by the
//! front-end to prevent accidental mixing. It provides the following:
//! 1. **Type Safety:** Virtual (32-bit) and physical (34-bit) addresses are
//!    distinct types.
//! 2. **Sv32 Views:** Page offset, virtual page number, and physical page
//!    number field extraction.
//! 3. **Fetch Views:** Fetch-block alignment, intra-line offsets, word
//!    indices, and L1I set indexing.

/// Number of low-order bits covered by a 4 KiB page.
pub const PAGE_SHIFT: u32 = 12;

/// Width of an Sv32 virtual page number.
pub const VPN_BITS: u32 = 20;

/// Width of an Sv32 physical page number.
pub const PPN_BITS: u32 = 22;

/// Mask selecting the 34 valid bits of a physical address.
pub const PADDR_MASK: u64 = (1 << 34) - 1;

/// A virtual address in the RV32 address space.
///
/// Virtual addresses are produced by control-flow selection and must be
/// translated through the L1I TLB before tag comparison, unless the
/// originating request is marked passthru.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VirtAddr(pub u32);

/// A physical address.
///
/// Physical addresses are 34 bits wide under Sv32. Values are stored in a
/// `u64` and masked to 34 bits on construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PhysAddr(pub u64);

impl VirtAddr {
    /// Creates a new virtual address from a raw 32-bit value.
    #[inline(always)]
    pub const fn new(addr: u32) -> Self {
        Self(addr)
    }

    /// Returns the raw 32-bit address value.
    #[inline(always)]
    pub const fn val(self) -> u32 {
        self.0
    }

    /// Extracts the page offset (low 12 bits).
    #[inline]
    pub const fn page_offset(self) -> u32 {
        self.0 & ((1 << PAGE_SHIFT) - 1)
    }

    /// Extracts the full 20-bit virtual page number.
    #[inline]
    pub const fn vpn(self) -> u32 {
        self.0 >> PAGE_SHIFT
    }

    /// Byte offset of this address within its cacheline.
    #[inline]
    pub const fn fetch_off(self, line_bytes: u32) -> u32 {
        self.0 & (line_bytes - 1)
    }

    /// The containing fetch-block (cacheline-aligned) address.
    #[inline]
    pub const fn fetch_addr(self, line_bytes: u32) -> Self {
        Self(self.0 & !(line_bytes - 1))
    }

    /// Index of the word this address falls in within its cacheline.
    #[inline]
    pub const fn word_idx(self, line_bytes: u32) -> usize {
        (self.fetch_off(line_bytes) >> 2) as usize
    }

    /// L1I set index for this address.
    ///
    /// The set bits sit directly above the intra-line offset bits. The
    /// configuration validator guarantees that offset and set bits together
    /// fit inside the page offset, so set indexing is translation-invariant.
    #[inline]
    pub const fn set_idx(self, line_bytes: u32, num_sets: u32) -> usize {
        ((self.0 / line_bytes) % num_sets) as usize
    }

    /// Reinterprets the virtual address as a physical address.
    ///
    /// Used for passthru requests, where the program counter is already a
    /// physical location and translation is bypassed.
    #[inline]
    pub const fn as_phys(self) -> PhysAddr {
        PhysAddr(self.0 as u64)
    }

    /// Address of the next sequential instruction.
    #[inline]
    pub const fn next_inst(self) -> Self {
        Self(self.0.wrapping_add(4))
    }

    /// Address of the next sequential cacheline.
    #[inline]
    pub const fn next_line(self, line_bytes: u32) -> Self {
        Self(self.0.wrapping_add(line_bytes))
    }
}

impl PhysAddr {
    /// Creates a new physical address, masking to 34 bits.
    #[inline(always)]
    pub const fn new(addr: u64) -> Self {
        Self(addr & PADDR_MASK)
    }

    /// Builds a physical address from a physical page number and page offset.
    #[inline]
    pub const fn from_parts(ppn: u32, offset: u32) -> Self {
        Self((((ppn as u64) << PAGE_SHIFT) | (offset as u64)) & PADDR_MASK)
    }

    /// Returns the raw address value.
    #[inline(always)]
    pub const fn val(self) -> u64 {
        self.0
    }

    /// Extracts the page offset (low 12 bits).
    #[inline]
    pub const fn page_offset(self) -> u32 {
        (self.0 as u32) & ((1 << PAGE_SHIFT) - 1)
    }

    /// Extracts the 22-bit physical page number.
    #[inline]
    pub const fn ppn(self) -> u32 {
        (self.0 >> PAGE_SHIFT) as u32
    }

    /// L1I set index for this address.
    #[inline]
    pub const fn set_idx(self, line_bytes: u32, num_sets: u32) -> usize {
        (((self.0 as u32) / line_bytes) % num_sets) as usize
    }

    /// The containing cacheline-aligned address.
    #[inline]
    pub const fn line_addr(self, line_bytes: u32) -> Self {
        Self(self.0 & !((line_bytes as u64) - 1))
    }

    /// Address of the next sequential cacheline.
    #[inline]
    pub const fn next_line(self, line_bytes: u32) -> Self {
        Self((self.0.wrapping_add(line_bytes as u64)) & PADDR_MASK)
    }
}

impl core::fmt::LowerHex for VirtAddr {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::LowerHex::fmt(&self.0, f)
    }
}

impl core::fmt::LowerHex for PhysAddr {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::LowerHex::fmt(&self.0, f)
    }
}
