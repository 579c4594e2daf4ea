//! Instruction prefetch unit.
//!
//! A two-stage, probe-only mirror of the demand fetch pipe: it checks
//! whether a single cacheline is resident (tags only, no data read, no
//! predecode) and converts misses into prefetch-sourced fill requests. A
//! probe hit is reported to the FTQ, which marks the entry prefetched.
//!
//! The unit stalls only when the fill arbiter is not ready; it never blocks
//! the demand pipe.

use tracing::trace;

use crate::common::PhysAddr;
use crate::config::Config;
use crate::front::itlb::ITlb;
use crate::front::l1i::{L1ICache, way_select};
use crate::front::signals::{
    FetchStatus, FillRequest, FillSource, PrefetchRequest, ProbeResponse,
};
use crate::riscv::paging::Vpn;
use crate::stats::FrontStats;

/// Outputs of one prefetch-unit cycle.
#[derive(Clone, Copy, Debug, Default)]
pub struct PrefetchTickOut {
    /// Probe outcome for the FTQ.
    pub resp: Option<ProbeResponse>,
    /// Fill request raised by a probe miss.
    pub fill_req: Option<FillRequest>,
}

/// The prefetch unit.
#[derive(Clone, Debug)]
pub struct PrefetchUnit {
    /// Request waiting to enter the probe stage.
    pending: Option<PrefetchRequest>,
    /// Probe stage register.
    s1: Option<PrefetchRequest>,
    line_bytes: u32,
    num_sets: u32,
}

impl PrefetchUnit {
    /// Creates an idle prefetch unit.
    pub fn new(cfg: &Config) -> Self {
        Self {
            pending: None,
            s1: None,
            line_bytes: cfg.l1i.line_bytes(),
            num_sets: cfg.l1i.num_sets,
        }
    }

    /// Whether a new probe request can be accepted.
    pub const fn ready(&self) -> bool {
        self.pending.is_none() && self.s1.is_none()
    }

    /// Advances the probe pipeline one cycle.
    ///
    /// `req` is the request port sampled this cycle; `fill_ready` is the
    /// fill arbiter's registered status. With the arbiter not ready the
    /// probe stage holds, since a miss discovered now would have nowhere
    /// to go.
    pub fn tick(
        &mut self,
        req: Option<&PrefetchRequest>,
        l1i: &L1ICache,
        tlb: &ITlb,
        fill_ready: bool,
        stats: &mut FrontStats,
    ) -> PrefetchTickOut {
        let mut out = PrefetchTickOut::default();

        // Probe stage.
        if fill_ready {
            if let Some(probe) = self.s1.take() {
                stats.prefetch_probes += 1;
                let tlb_pte = if probe.passthru {
                    None
                } else {
                    tlb.lookup(Vpn::from_vaddr(probe.vaddr.val()))
                };

                // Passthru reinterprets the address; otherwise the TLB
                // supplies the physical page for tag comparison.
                let resolved = if probe.passthru {
                    Some(probe.vaddr.as_phys())
                } else {
                    tlb_pte
                        .map(|pte| PhysAddr::from_parts(pte.ppn().0, probe.vaddr.page_offset()))
                };

                let (sts, paddr) = match resolved {
                    Some(paddr) => {
                        let set = probe.vaddr.set_idx(self.line_bytes, self.num_sets);
                        let sts = if way_select(l1i.tags(set), paddr.ppn()).is_some() {
                            FetchStatus::L1Hit
                        } else {
                            FetchStatus::L1Miss
                        };
                        (sts, paddr)
                    }
                    None => (FetchStatus::TlbMiss, PhysAddr::default()),
                };

                trace!(
                    "prefetch probe: vaddr={:#x} ftq_idx={} sts={:?}",
                    probe.vaddr.val(),
                    probe.ftq_idx,
                    sts
                );

                match sts {
                    FetchStatus::L1Hit => stats.prefetch_hits += 1,
                    FetchStatus::TlbMiss => stats.prefetch_tlb_misses += 1,
                    FetchStatus::L1Miss => {
                        out.fill_req = Some(FillRequest {
                            addr: paddr.line_addr(self.line_bytes),
                            lines: 1,
                            ftq_idx: probe.ftq_idx,
                            src: FillSource::Prefetch,
                        });
                    }
                    FetchStatus::None => {}
                }

                out.resp = Some(ProbeResponse {
                    ftq_idx: probe.ftq_idx,
                    vaddr: probe.vaddr,
                    sts,
                });
            }
        }

        // Issue stage: move a waiting request into the (now free) probe
        // stage. A request arriving while the probe stage is occupied sits
        // in the skid slot; the FTQ's ready gating keeps it to one.
        if let Some(incoming) = req {
            debug_assert!(self.pending.is_none(), "prefetch request overrun");
            self.pending = Some(*incoming);
        }
        if self.s1.is_none() {
            self.s1 = self.pending.take();
        }

        out
    }
}
