//! L1 instruction cache TLB.
//!
//! A small fully-associative cache of page table entries keyed by virtual
//! page number. Lookups compare every entry in parallel and take the first
//! match. Fill requests come from an external page-table walker; the fill
//! slot is chosen by an LFSR (random replacement) and the write commits at
//! the end of the cycle, so a lookup never observes a same-cycle fill.
//!
//! Passthru requests bypass this structure entirely.

use crate::common::Lfsr;
use crate::front::signals::TlbFill;
use crate::riscv::paging::{Pte, Vpn};

/// A single TLB entry.
#[derive(Clone, Copy, Debug, Default)]
struct TlbEntry {
    /// Entry validity flag.
    valid: bool,
    /// Virtual page number (tag).
    vpn: Vpn,
    /// Cached page table entry (data).
    pte: Pte,
}

/// Fully-associative instruction TLB.
#[derive(Clone, Debug)]
pub struct ITlb {
    entries: Vec<TlbEntry>,
    lfsr: Lfsr,
    fill_q: Vec<TlbFill>,
}

impl ITlb {
    /// Creates an empty TLB with `depth` entries.
    pub fn new(depth: usize) -> Self {
        Self {
            entries: vec![TlbEntry::default(); depth],
            lfsr: Lfsr::for_slots(depth),
            fill_q: Vec::new(),
        }
    }

    /// Looks up a virtual page number.
    ///
    /// All entries are compared in parallel; the lowest-index match wins.
    /// Serves both the read port (demand pipe) and the probe port
    /// (prefetch pipe), which behave identically.
    pub fn lookup(&self, vpn: Vpn) -> Option<Pte> {
        self.entries
            .iter()
            .find(|e| e.valid && e.vpn == vpn)
            .map(|e| e.pte)
    }

    /// Queues a fill write; visible to lookups from the next cycle.
    pub fn push_fill(&mut self, fill: TlbFill) {
        self.fill_q.push(fill);
    }

    /// Applies queued fills at LFSR-chosen slots. Called once per cycle.
    pub fn commit(&mut self) {
        let fills = core::mem::take(&mut self.fill_q);
        for fill in fills {
            // Refills of a resident page update in place instead of
            // duplicating the mapping under two slots.
            let idx = self
                .entries
                .iter()
                .position(|e| e.valid && e.vpn == fill.vpn)
                .unwrap_or_else(|| self.lfsr.next_index(self.entries.len()));
            self.entries[idx] = TlbEntry {
                valid: true,
                vpn: fill.vpn,
                pte: fill.pte,
            };
        }
    }

    /// Invalidates every entry.
    pub fn flush(&mut self) {
        for e in &mut self.entries {
            e.valid = false;
        }
    }
}
