//! L0 branch target buffer and next-fetch prediction.
//!
//! The L0 BTB is a small direct-mapped cache from fetch-block addresses to
//! predicted next-fetch addresses, trained by resteers. The next-fetch
//! predictor consults it zero-cycle: on a hit it returns the recorded
//! target, otherwise it falls back to the next-sequential fetch block.
//!
//! This is the optional lowest-priority allocation source in the
//! control-flow controller; the front-end is fully functional without it.

use crate::common::VirtAddr;

/// An entry in the L0 branch target buffer.
#[derive(Clone, Copy, Debug, Default)]
struct BtbEntry {
    /// Fetch-block address this entry describes.
    tag: u32,
    /// Predicted next fetch address.
    target: VirtAddr,
    /// Entry holds valid data.
    valid: bool,
}

/// L0 branch target buffer.
#[derive(Clone, Debug)]
pub struct L0Btb {
    table: Vec<BtbEntry>,
    depth: usize,
    line_bytes: u32,
}

impl L0Btb {
    /// Creates a BTB with `depth` entries (power of two) for the given
    /// fetch-block size.
    pub fn new(depth: usize, line_bytes: u32) -> Self {
        Self {
            table: vec![BtbEntry::default(); depth],
            depth,
            line_bytes,
        }
    }

    fn index(&self, block: VirtAddr) -> usize {
        ((block.val() / self.line_bytes) as usize) & (self.depth - 1)
    }

    /// Looks up the predicted target for the fetch block containing `pc`.
    pub fn lookup(&self, pc: VirtAddr) -> Option<VirtAddr> {
        let block = pc.fetch_addr(self.line_bytes);
        let e = self.table[self.index(block)];
        if e.valid && e.tag == block.val() {
            Some(e.target)
        } else {
            None
        }
    }

    /// Records that the fetch block containing `src_pc` redirects to
    /// `target`.
    pub fn update(&mut self, src_pc: VirtAddr, target: VirtAddr) {
        let block = src_pc.fetch_addr(self.line_bytes);
        let idx = self.index(block);
        self.table[idx] = BtbEntry {
            tag: block.val(),
            target,
            valid: true,
        };
    }
}

/// Zero-cycle next-fetch predictor backed by the L0 BTB.
#[derive(Clone, Debug)]
pub struct NextFetchPredictor {
    btb: L0Btb,
    line_bytes: u32,
}

impl NextFetchPredictor {
    /// Creates a predictor over a BTB of the given depth.
    pub fn new(btb_depth: usize, line_bytes: u32) -> Self {
        Self {
            btb: L0Btb::new(btb_depth, line_bytes),
            line_bytes,
        }
    }

    /// Predicts the fetch address following the block containing `pc`.
    ///
    /// Falls back to the next-sequential fetch block when the BTB misses.
    pub fn predict(&self, pc: VirtAddr) -> VirtAddr {
        self.btb
            .lookup(pc)
            .unwrap_or_else(|| pc.fetch_addr(self.line_bytes).next_line(self.line_bytes))
    }

    /// Trains the underlying BTB from an observed redirect.
    pub fn train(&mut self, src_pc: VirtAddr, target: VirtAddr) {
        self.btb.update(src_pc, target);
    }
}
