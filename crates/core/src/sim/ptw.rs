//! Stub page-table walker.
//!
//! The front-end reports TLB misses outward and receives opaque fill
//! writes back; this stub closes the loop for simulation by satisfying
//! every reported miss with a fill on the following cycle. Mappings are
//! either registered explicitly or default to identity (the physical page
//! equals the virtual page), which is what bare-metal test images expect.

use std::collections::HashMap;

use crate::front::signals::TlbFill;
use crate::riscv::paging::{Ppn, Pte, Vpn};

/// A walker that satisfies TLB misses one cycle after observing them.
#[derive(Clone, Debug, Default)]
pub struct StubPtw {
    pending: Option<Vpn>,
    mappings: HashMap<u32, Pte>,
}

impl StubPtw {
    /// Creates a walker with identity mappings only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an explicit translation for `vpn`.
    pub fn map(&mut self, vpn: Vpn, pte: Pte) {
        let _ = self.mappings.insert(vpn.0, pte);
    }

    /// Records a miss reported by the front-end this cycle.
    pub fn observe(&mut self, miss: Option<Vpn>) {
        if self.pending.is_none() {
            self.pending = miss;
        }
    }

    /// The fill write to present this cycle, if a miss is outstanding.
    pub fn take_fill(&mut self) -> Option<TlbFill> {
        self.pending.take().map(|vpn| TlbFill {
            vpn,
            pte: self
                .mappings
                .get(&vpn.0)
                .copied()
                .unwrap_or_else(|| Pte::leaf_exec(Ppn(vpn.0))),
        })
    }
}
