//! L1I fill unit: miss-status holding registers and the fill arbiter.
//!
//! The fill unit moves cachelines from the backing store into the L1I.
//! Each miss-status holding register (MSHR) owns one in-flight line and one
//! backing-store port, and walks the sequence:
//!
//! - `None` — free, ready to accept a request.
//! - `Access` — the line request is outstanding at the backing store.
//! - `Writeback` — response data captured; the L1I write port is driven.
//! - `Complete` — waiting for a response slot back to the FTQ.
//!
//! The arbiter admits up to `num_fill_ports` requests per cycle onto free
//! MSHRs and matches completed MSHRs to response slots the same way, lowest
//! index first. A multi-line demand request is expanded into per-line
//! allocations; lines that cannot be admitted immediately wait in a pending
//! queue, so no accepted request is ever dropped. The victim way for every
//! fill is chosen by the unit's LFSR.

use std::collections::VecDeque;

use tracing::trace;

use crate::common::{Lfsr, PhysAddr};
use crate::config::Config;
use crate::front::l1i::{L1ICache, L1ITag, LineWrite};
use crate::front::signals::{FillRequest, FillResponse, FillSource, FtqIndex, MemRequest};
use crate::stats::FrontStats;

/// MSHR lifecycle states.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MshrState {
    /// No request is being serviced.
    #[default]
    None,
    /// The request is outstanding at the backing store.
    Access,
    /// Response data is being written to the L1I arrays.
    Writeback,
    /// The fill response is latched, awaiting acknowledgement.
    Complete,
}

/// One miss-status holding register.
#[derive(Clone, Debug, Default)]
pub struct Mshr {
    /// Lifecycle state.
    pub state: MshrState,
    /// Physical address of the line being filled.
    pub addr: PhysAddr,
    /// Victim way chosen at allocation.
    pub way: usize,
    /// FTQ entry whose miss this fill services.
    pub ftq_idx: FtqIndex,
    /// Origin of the request, preserved into the response.
    pub src: FillSource,
    /// Line data captured from the backing store.
    data: Vec<u32>,
}

/// Outputs of one fill-unit cycle.
#[derive(Clone, Debug, Default)]
pub struct FillTickOut {
    /// Completions emitted this cycle (at most `num_fill_ports`).
    pub responses: Vec<FillResponse>,
    /// Backing-store requests, one slot per MSHR.
    pub mem_reqs: Vec<Option<MemRequest>>,
}

/// The fill unit: MSHRs plus the request/response arbiter.
#[derive(Clone, Debug)]
pub struct FillUnit {
    mshrs: Vec<Mshr>,
    num_ports: usize,
    /// Admitted line requests waiting for a free MSHR.
    pending: VecDeque<FillRequest>,
    way_lfsr: Lfsr,
    line_bytes: u32,
    line_words: usize,
    num_sets: u32,
    num_ways: usize,
}

impl FillUnit {
    /// Creates a fill unit for the given configuration.
    pub fn new(cfg: &Config) -> Self {
        Self {
            mshrs: vec![Mshr::default(); cfg.num_mshr as usize],
            num_ports: cfg.num_fill_ports as usize,
            pending: VecDeque::new(),
            way_lfsr: Lfsr::new(4),
            line_bytes: cfg.l1i.line_bytes(),
            line_words: cfg.l1i.line_words as usize,
            num_sets: cfg.l1i.num_sets,
            num_ways: cfg.l1i.num_ways as usize,
        }
    }

    /// Whether the arbiter can accept a new request.
    ///
    /// Low while every MSHR is busy or earlier lines are still queued;
    /// upstream pipes stall on this bit and re-offer, so requests are
    /// never lost.
    pub fn ready(&self) -> bool {
        self.pending.is_empty() && self.mshrs.iter().any(|m| m.state == MshrState::None)
    }

    /// Read-only view of the MSHRs.
    pub fn mshrs(&self) -> &[Mshr] {
        &self.mshrs
    }

    /// Advances every MSHR one cycle and runs the arbiter.
    ///
    /// `reqs` are the request ports sampled this cycle (demand first, then
    /// prefetch); `mem_resps` carries one backing-store response slot per
    /// MSHR. L1I writes are queued on `l1i` and commit at the tick
    /// boundary.
    pub fn tick(
        &mut self,
        reqs: &[Option<FillRequest>],
        mem_resps: &[Option<Vec<u32>>],
        l1i: &mut L1ICache,
        stats: &mut FrontStats,
    ) -> FillTickOut {
        let mut out = FillTickOut {
            responses: Vec::new(),
            mem_reqs: vec![None; self.mshrs.len()],
        };

        // MSHR progression. Writeback drives the L1I write port; the write
        // commits at the end of this cycle.
        for (idx, mshr) in self.mshrs.iter_mut().enumerate() {
            match mshr.state {
                MshrState::Access => {
                    if let Some(data) = mem_resps.get(idx).and_then(Clone::clone) {
                        debug_assert_eq!(data.len(), self.line_words);
                        trace!("fill data captured: mshr={} addr={:#x}", idx, mshr.addr.val());
                        mshr.data = data;
                        mshr.state = MshrState::Writeback;
                    }
                }
                MshrState::Writeback => {
                    l1i.push_write(LineWrite {
                        set: mshr.addr.set_idx(self.line_bytes, self.num_sets),
                        way: mshr.way,
                        tag: L1ITag {
                            valid: true,
                            ppn: mshr.addr.ppn(),
                        },
                        data: core::mem::take(&mut mshr.data),
                    });
                    mshr.state = MshrState::Complete;
                }
                MshrState::None | MshrState::Complete => {}
            }
        }

        // Response arbitration: completed MSHRs claim up to num_ports
        // response slots, lowest index first.
        for (idx, mshr) in self.mshrs.iter_mut().enumerate() {
            if out.responses.len() == self.num_ports {
                break;
            }
            if mshr.state == MshrState::Complete {
                trace!(mshr = idx, ftq_idx = mshr.ftq_idx, src = ?mshr.src, "fill complete");
                match mshr.src {
                    FillSource::Demand => stats.fills_demand += 1,
                    FillSource::Prefetch => stats.fills_prefetch += 1,
                }
                out.responses.push(FillResponse {
                    ftq_idx: mshr.ftq_idx,
                    src: mshr.src,
                });
                mshr.state = MshrState::None;
            }
        }

        // Backing-store request drive. Sampled before allocation so an MSHR
        // allocated this cycle first requests on the next one.
        for (idx, mshr) in self.mshrs.iter().enumerate() {
            if mshr.state == MshrState::Access {
                out.mem_reqs[idx] = Some(MemRequest { addr: mshr.addr });
            }
        }

        // Request admission: expand multi-line requests into per-line
        // entries, then allocate free MSHRs in order.
        for req in reqs.iter().flatten().take(self.num_ports) {
            let mut addr = req.addr.line_addr(self.line_bytes);
            for _ in 0..req.lines.max(1) {
                self.pending.push_back(FillRequest {
                    addr,
                    lines: 1,
                    ftq_idx: req.ftq_idx,
                    src: req.src,
                });
                addr = addr.next_line(self.line_bytes);
            }
        }
        for mshr in &mut self.mshrs {
            if mshr.state != MshrState::None {
                continue;
            }
            let Some(line_req) = self.pending.pop_front() else {
                break;
            };
            mshr.state = MshrState::Access;
            mshr.addr = line_req.addr;
            mshr.way = self.way_lfsr.next_index(self.num_ways);
            mshr.ftq_idx = line_req.ftq_idx;
            mshr.src = line_req.src;
            trace!(
                "mshr allocated: addr={:#x} way={} ftq_idx={} src={:?}",
                mshr.addr.val(),
                mshr.way,
                mshr.ftq_idx,
                mshr.src
            );
        }

        out
    }
}
