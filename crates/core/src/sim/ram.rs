//! Backing RAM model.
//!
//! A flat byte array standing in for everything behind the fill unit's
//! memory ports. Word accessors are little-endian; reads outside the
//! mapped range return zeros (the front-end itself never faults on an
//! address, per the error model).

use crate::common::PhysAddr;

/// A byte-addressed backing store for simulation.
#[derive(Clone, Debug)]
pub struct SimRam {
    base: u64,
    data: Vec<u8>,
}

impl SimRam {
    /// Creates a zero-filled RAM of `size` bytes starting at `base`.
    pub fn new(base: u64, size: usize) -> Self {
        Self {
            base,
            data: vec![0; size],
        }
    }

    /// Base physical address of the mapped range.
    pub const fn base(&self) -> u64 {
        self.base
    }

    /// Size of the mapped range in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    fn offset(&self, addr: u64) -> Option<usize> {
        addr.checked_sub(self.base)
            .map(|o| o as usize)
            .filter(|&o| o < self.data.len())
    }

    /// Reads a little-endian word; zeros outside the mapped range.
    pub fn read_word(&self, addr: PhysAddr) -> u32 {
        match self.offset(addr.val()) {
            Some(o) if o + 4 <= self.data.len() => u32::from_le_bytes([
                self.data[o],
                self.data[o + 1],
                self.data[o + 2],
                self.data[o + 3],
            ]),
            _ => 0,
        }
    }

    /// Writes a little-endian word; ignored outside the mapped range.
    pub fn write_word(&mut self, addr: PhysAddr, value: u32) {
        if let Some(o) = self.offset(addr.val()) {
            if o + 4 <= self.data.len() {
                self.data[o..o + 4].copy_from_slice(&value.to_le_bytes());
            }
        }
    }

    /// Reads `words` consecutive words starting at `addr`.
    pub fn read_line(&self, addr: PhysAddr, words: usize) -> Vec<u32> {
        (0..words)
            .map(|i| self.read_word(PhysAddr::new(addr.val() + (i * 4) as u64)))
            .collect()
    }

    /// Copies raw bytes into the RAM at `addr`, clipping to the range.
    pub fn write_bytes(&mut self, addr: u64, bytes: &[u8]) {
        if let Some(o) = self.offset(addr) {
            let end = (o + bytes.len()).min(self.data.len());
            self.data[o..end].copy_from_slice(&bytes[..end - o]);
        }
    }
}
