//! Fetch target queue.
//!
//! The central scoreboard of outstanding fetch transactions. Each entry
//! corresponds to one control-flow request bringing instruction bytes into
//! the pipeline, held in a circular buffer with three pointers:
//!
//! - `fptr` — the oldest entry, always the current demand fetch.
//! - `pptr` — the next prefetch candidate.
//! - `wptr` — the next slot to allocate.
//!
//! The fetch pointer advances only when a demand transaction completes
//! (the single `L1Hit` response per transaction). Per-line misses park the
//! entry in `Fill`/`Xlat` until the matching fill or TLB write is
//! observed, then the entry replays. Same-cycle writes to one entry are
//! resolved fill-response first, then demand response, then allocation.

use tracing::{debug, trace};

use crate::common::VirtAddr;
use crate::config::Config;
use crate::front::signals::{
    AllocRequest, DemandResponse, FetchRequest, FetchStatus, FillResponse, FillSource,
    FtqIndex, PrefetchRequest, ProbeResponse,
};
use crate::stats::FrontStats;

/// State of an FTQ entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FtqState {
    /// Empty, or waiting to be sent for demand fetch.
    #[default]
    None,
    /// Stalled for a prefetch probe.
    Probe,
    /// Sent to the demand fetch unit.
    Fetch,
    /// Stalled for an L1I fill.
    Fill,
    /// Stalled for address translation.
    Xlat,
}

/// One entry in the fetch target queue.
#[derive(Clone, Copy, Debug, Default)]
pub struct FtqEntry {
    /// Entry holds a live transaction.
    pub valid: bool,
    /// The address came from a speculative predictor.
    pub predicted: bool,
    /// Treat the address as physical.
    pub passthru: bool,
    /// A prefetch has (apparently) brought the line into the L1I.
    ///
    /// Advisory only: the line may have been evicted since, so a demand
    /// fetch can still miss.
    pub prefetched: bool,
    /// The transaction has been fetched and delivered.
    pub complete: bool,
    /// Scoreboard state.
    pub state: FtqState,
    /// Block-aligned program counter of the transaction.
    pub vaddr: VirtAddr,
    /// Sequential cachelines in the transaction.
    pub lines: u32,
    /// This entry's own index.
    pub id: FtqIndex,
}

/// Registered FTQ status, sampled by the control-flow controller.
#[derive(Clone, Copy, Debug)]
pub struct FtqStatus {
    /// An allocation can be accepted.
    pub ready: bool,
    /// Index the next allocation will occupy.
    pub next_idx: FtqIndex,
}

/// Outputs of one FTQ cycle.
#[derive(Clone, Copy, Debug, Default)]
pub struct FtqTickOut {
    /// Demand fetch request (new, replayed, or allocation short-circuit).
    pub fetch_req: Option<FetchRequest>,
    /// Prefetch probe request.
    pub prefetch_req: Option<PrefetchRequest>,
}

/// The fetch target queue.
#[derive(Clone, Debug)]
pub struct FetchTargetQueue {
    entries: Vec<FtqEntry>,
    depth: usize,
    fptr: usize,
    pptr: usize,
    wptr: usize,
    used: usize,
}

impl FetchTargetQueue {
    /// Creates an empty queue.
    pub fn new(cfg: &Config) -> Self {
        let depth = cfg.ftq_depth as usize;
        Self {
            entries: vec![FtqEntry::default(); depth],
            depth,
            fptr: 0,
            pptr: 1,
            wptr: 0,
            used: 0,
        }
    }

    /// Registered status for the control-flow controller.
    pub const fn status(&self) -> FtqStatus {
        FtqStatus {
            ready: self.used < self.depth,
            next_idx: self.wptr,
        }
    }

    /// Number of live entries.
    pub const fn used(&self) -> usize {
        self.used
    }

    /// The current fetch pointer.
    pub const fn fptr(&self) -> FtqIndex {
        self.fptr
    }

    /// Read access to an entry.
    pub fn entry(&self, idx: FtqIndex) -> &FtqEntry {
        &self.entries[idx]
    }

    /// All entries, for invariant checks.
    pub fn entries(&self) -> &[FtqEntry] {
        &self.entries
    }

    fn make_fetch_req(&self, idx: FtqIndex) -> FetchRequest {
        let e = &self.entries[idx];
        FetchRequest {
            vaddr: e.vaddr,
            passthru: e.passthru,
            lines: e.lines,
            ftq_idx: idx,
        }
    }

    /// Ring distance from the fetch pointer to `idx`.
    const fn dist_from_fptr(&self, idx: usize) -> usize {
        (idx + self.depth - self.fptr) % self.depth
    }

    /// Advances the queue one cycle.
    ///
    /// Inputs are the registered buses sampled this cycle: the allocation
    /// request from the CFC, the demand and probe responses, the fill
    /// responses, whether a TLB fill write was observed, and the prefetch
    /// unit's registered ready bit.
    pub fn tick(
        &mut self,
        alloc: Option<&AllocRequest>,
        demand_resp: Option<&DemandResponse>,
        probe_resp: Option<&ProbeResponse>,
        fill_resps: &[FillResponse],
        tlb_fill_seen: bool,
        pfu_ready: bool,
        stats: &mut FrontStats,
    ) -> FtqTickOut {
        let mut out = FtqTickOut::default();

        // Fill responses. Each carries its FTQ index and source, so
        // reordering across MSHRs is harmless.
        for r in fill_resps {
            let fptr = self.fptr;
            let e = &mut self.entries[r.ftq_idx];
            if !e.valid {
                continue;
            }
            match r.src {
                FillSource::Prefetch => {
                    // Late or spurious prefetch fills are absorbed here:
                    // the line is resident, remember that much.
                    e.prefetched = true;
                    if matches!(e.state, FtqState::Fill | FtqState::Probe) {
                        e.state = FtqState::None;
                    }
                }
                FillSource::Demand => {
                    // Replay the demand transaction. The demand pipe
                    // resumes from its own stall register; this request
                    // covers the case where it had to abandon ship.
                    if e.state == FtqState::Fill {
                        debug_assert_eq!(r.ftq_idx, fptr);
                        e.state = FtqState::Fetch;
                        trace!(ftq_idx = r.ftq_idx, "demand fill observed, replaying");
                        out.fetch_req = Some(self.make_fetch_req(r.ftq_idx));
                    }
                }
            }
        }

        // Demand response. The index always names the oldest entry.
        if let Some(d) = demand_resp {
            debug_assert_eq!(d.ftq_idx, self.fptr);
            let fptr = self.fptr;
            let e = &mut self.entries[fptr];
            if e.valid {
                match d.sts {
                    FetchStatus::L1Hit => {
                        trace!(ftq_idx = fptr, resteer = d.resteer, "transaction complete");
                        e.complete = true;
                        e.state = FtqState::None;
                        self.fptr = (fptr + 1) % self.depth;
                        self.used -= 1;
                    }
                    FetchStatus::L1Miss => e.state = FtqState::Fill,
                    FetchStatus::TlbMiss => e.state = FtqState::Xlat,
                    FetchStatus::None => {}
                }
            }
        }

        // Probe response.
        if let Some(p) = probe_resp {
            let e = &mut self.entries[p.ftq_idx];
            if e.valid && e.state == FtqState::Probe {
                match p.sts {
                    FetchStatus::L1Hit => {
                        e.prefetched = true;
                        e.state = FtqState::None;
                    }
                    FetchStatus::L1Miss => e.state = FtqState::Fill,
                    FetchStatus::TlbMiss => e.state = FtqState::Xlat,
                    FetchStatus::None => e.state = FtqState::None,
                }
            }
        }

        // A TLB write unblocks every translation-stalled entry; the oldest
        // replays through the normal fetch-pointer path below.
        if tlb_fill_seen {
            for e in &mut self.entries {
                if e.valid && e.state == FtqState::Xlat {
                    e.state = FtqState::None;
                }
            }
        }

        // Service the oldest entry.
        if self.used > 0 {
            let fptr = self.fptr;
            let e = &mut self.entries[fptr];
            if e.valid && !e.complete && e.state == FtqState::None {
                e.state = FtqState::Fetch;
                out.fetch_req = Some(self.make_fetch_req(fptr));
            }
        }

        // Pick a prefetch candidate behind the demand head.
        if pfu_ready && self.used > 1 {
            if self.dist_from_fptr(self.pptr) == 0 || self.dist_from_fptr(self.pptr) >= self.used
            {
                self.pptr = (self.fptr + 1) % self.depth;
            }
            let pptr = self.pptr;
            if self.dist_from_fptr(pptr) < self.used {
                let e = &mut self.entries[pptr];
                if e.valid && !e.complete && !e.prefetched && e.state == FtqState::None {
                    e.state = FtqState::Probe;
                    trace!("probe fire: ftq_idx={} vaddr={:#x}", pptr, e.vaddr.val());
                    out.prefetch_req = Some(PrefetchRequest {
                        vaddr: e.vaddr,
                        passthru: e.passthru,
                        ftq_idx: pptr,
                    });
                    self.pptr = (pptr + 1) % self.depth;
                } else if e.valid
                    && (e.prefetched
                        || e.complete
                        || matches!(e.state, FtqState::Probe | FtqState::Fill | FtqState::Fetch))
                {
                    // Already probed, resident, or owned by demand: move on.
                    self.pptr = (pptr + 1) % self.depth;
                }
            }
        }

        // Allocation, lowest priority for same-entry writes.
        if let Some(a) = alloc {
            if self.used < self.depth {
                stats.ftq_allocs += 1;
                let idx = self.wptr;
                debug!(
                    "ftq alloc: ftq_idx={} vaddr={:#x} lines={}",
                    idx,
                    a.vaddr.val(),
                    a.lines
                );
                self.entries[idx] = FtqEntry {
                    valid: true,
                    predicted: a.predicted,
                    passthru: a.passthru,
                    prefetched: false,
                    complete: false,
                    state: FtqState::None,
                    vaddr: a.vaddr,
                    lines: a.lines,
                    id: idx,
                };
                let was_empty = idx == self.fptr;
                self.wptr = (idx + 1) % self.depth;
                self.used += 1;
                // Allocating into the head of an empty queue sets up the
                // demand request immediately.
                if was_empty {
                    self.entries[idx].state = FtqState::Fetch;
                    out.fetch_req = Some(self.make_fetch_req(idx));
                }
            } else {
                stats.ftq_alloc_dropped += 1;
            }
        }

        out
    }
}
