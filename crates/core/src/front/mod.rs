//! The instruction front-end: components and top-level wiring.
//!
//! [`FrontEnd`] owns every front-end structure and advances them together,
//! one call to [`FrontEnd::tick`] per clock cycle. All state is held in
//! fixed-capacity arrays indexed by small integers; cross-component
//! references are FTQ and MSHR indices.
//!
//! ## Tick discipline
//!
//! Inter-component buses are one-cycle [`Latch`]es; array writes queue
//! during the cycle and commit at its end, so reads never observe
//! same-cycle writes. Components step in a fixed order each cycle:
//!
//! 1. Demand fetch (stage 3 first, so its resteer is available below).
//! 2. Prefetch.
//! 3. Fill unit and MSHRs.
//! 4. Fetch target queue.
//! 5. Control-flow controller — the only consumer of a same-cycle
//!    combinational signal, the stage-3 resteer.
//! 6. Commit: latches swap, the L1I/TLB write queues drain.
//!
//! Registered statuses (FTQ ready, fill-arbiter ready, prefetch ready) are
//! snapshotted before anything mutates, so every component observes the
//! previous cycle's values, as the hardware registers would present them.

/// L0 branch target buffer and next-fetch prediction.
pub mod btb;
/// Control-flow controller.
pub mod cfc;
/// Demand fetch unit (three-stage pipeline).
pub mod demand;
/// Fetch target queue.
pub mod ftq;
/// Fill unit: MSHRs and the fill arbiter.
pub mod ifill;
/// L1 instruction cache TLB.
pub mod itlb;
/// L1 instruction cache storage and way selection.
pub mod l1i;
/// Cacheline predecode.
pub mod predecode;
/// Instruction prefetch unit.
pub mod prefetch;
/// Return-address predictor.
pub mod rap;
/// Inter-unit request/response bundles.
pub mod signals;

use crate::common::Latch;
use crate::config::Config;
use crate::stats::FrontStats;
use crate::riscv::paging::Vpn;

use cfc::ControlFlowController;
use demand::DemandFetchUnit;
use ftq::FetchTargetQueue;
use ifill::FillUnit;
use itlb::ITlb;
use l1i::L1ICache;
use prefetch::PrefetchUnit;
use rap::ReturnAddressPredictor;
use signals::{
    AllocRequest, ArchOverride, DemandResponse, FetchPacket, FetchRequest, FetchStatus,
    FillRequest, FillResponse, MemRequest, PrefetchRequest, ProbeResponse, TlbFill,
};

/// External inputs sampled at the start of a cycle.
#[derive(Clone, Debug, Default)]
pub struct FrontInputs {
    /// Architectural control-flow request (debug / mid-core redirect).
    pub arch_override: Option<ArchOverride>,
    /// TLB fill write from the external page-table walker.
    pub tlb_fill: Option<TlbFill>,
    /// Backing-store responses, one slot per MSHR.
    pub mem_resps: Vec<Option<Vec<u32>>>,
}

/// External outputs produced by a cycle.
#[derive(Clone, Debug, Default)]
pub struct FrontOutputs {
    /// Fetch packet published to the decode interface.
    pub packet: Option<FetchPacket>,
    /// Backing-store requests, one slot per MSHR.
    pub mem_reqs: Vec<Option<MemRequest>>,
    /// A TLB miss observed this cycle, for the external walker.
    pub tlb_miss: Option<Vpn>,
}

/// The complete front-end.
#[derive(Clone, Debug)]
pub struct FrontEnd {
    cfg: Config,

    /// L1I storage arrays.
    pub l1i: L1ICache,
    /// L1I TLB.
    pub tlb: ITlb,
    /// Fill unit.
    pub fill: FillUnit,
    /// Fetch target queue.
    pub ftq: FetchTargetQueue,
    /// Demand fetch unit.
    pub dfu: DemandFetchUnit,
    /// Prefetch unit.
    pub pfu: PrefetchUnit,
    /// Control-flow controller.
    pub cfc: ControlFlowController,
    /// Return-address predictor.
    pub rap: ReturnAddressPredictor,
    /// Event counters.
    pub stats: FrontStats,

    // Registered buses.
    fetch_req: Latch<Option<FetchRequest>>,
    prefetch_req: Latch<Option<PrefetchRequest>>,
    demand_resp: Latch<Option<DemandResponse>>,
    probe_resp: Latch<Option<ProbeResponse>>,
    fill_resps: Latch<Vec<FillResponse>>,
    dfu_fill_req: Latch<Option<FillRequest>>,
    pfu_fill_req: Latch<Option<FillRequest>>,
    alloc_req: Latch<Option<AllocRequest>>,
}

impl FrontEnd {
    /// Builds a front-end from a validated configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            l1i: L1ICache::new(&cfg.l1i),
            tlb: ITlb::new(cfg.tlb_depth as usize),
            fill: FillUnit::new(&cfg),
            ftq: FetchTargetQueue::new(&cfg),
            dfu: DemandFetchUnit::new(&cfg),
            pfu: PrefetchUnit::new(&cfg),
            cfc: ControlFlowController::new(&cfg),
            rap: ReturnAddressPredictor::new(cfg.rap_depth as usize),
            stats: FrontStats::default(),
            fetch_req: Latch::new(),
            prefetch_req: Latch::new(),
            demand_resp: Latch::new(),
            probe_resp: Latch::new(),
            fill_resps: Latch::new(),
            dfu_fill_req: Latch::new(),
            pfu_fill_req: Latch::new(),
            alloc_req: Latch::new(),
            cfg,
        }
    }

    /// The configuration this front-end was built with.
    pub const fn config(&self) -> &Config {
        &self.cfg
    }

    /// Number of backing-store ports (one per MSHR).
    pub fn num_mem_ports(&self) -> usize {
        self.cfg.num_mshr as usize
    }

    /// Advances the front-end one clock cycle.
    pub fn tick(&mut self, inputs: &FrontInputs) -> FrontOutputs {
        self.stats.cycles += 1;
        let mut outputs = FrontOutputs::default();

        // Registered statuses, sampled before anything mutates.
        let ftq_sts = self.ftq.status();
        let fill_ready = self.fill.ready();
        let pfu_ready = self.pfu.ready();

        // Demand pipe. Its resteer output is combinational into the CFC
        // below; everything else it drives is latched.
        let dfu_out = self.dfu.tick(
            self.fetch_req.out().as_ref(),
            self.fill_resps.out(),
            &self.l1i,
            &self.tlb,
            fill_ready,
            &mut self.stats,
        );
        self.demand_resp.drive(dfu_out.resp);
        self.dfu_fill_req.drive(dfu_out.fill_req);
        outputs.packet = dfu_out.packet;

        // Prefetch pipe.
        let pfu_out = self.pfu.tick(
            self.prefetch_req.out().as_ref(),
            &self.l1i,
            &self.tlb,
            fill_ready,
            &mut self.stats,
        );
        self.probe_resp.drive(pfu_out.resp);
        self.pfu_fill_req.drive(pfu_out.fill_req);

        // Surface TLB misses to the external walker. Demand wins a tie.
        outputs.tlb_miss = match (&dfu_out.resp, &pfu_out.resp) {
            (Some(r), _) if r.sts == FetchStatus::TlbMiss => {
                Some(Vpn::from_vaddr(r.vaddr.val()))
            }
            (_, Some(p)) if p.sts == FetchStatus::TlbMiss => {
                Some(Vpn::from_vaddr(p.vaddr.val()))
            }
            _ => None,
        };

        // Fill unit: demand port first, then prefetch.
        let fill_reqs = [*self.dfu_fill_req.out(), *self.pfu_fill_req.out()];
        let fill_out = self.fill.tick(
            &fill_reqs,
            &inputs.mem_resps,
            &mut self.l1i,
            &mut self.stats,
        );
        self.fill_resps.drive(fill_out.responses);
        outputs.mem_reqs = fill_out.mem_reqs;

        // Fetch target queue.
        let ftq_out = self.ftq.tick(
            self.alloc_req.out().as_ref(),
            self.demand_resp.out().as_ref(),
            self.probe_resp.out().as_ref(),
            self.fill_resps.out(),
            inputs.tlb_fill.is_some(),
            pfu_ready,
            &mut self.stats,
        );
        self.fetch_req.drive(ftq_out.fetch_req);
        self.prefetch_req.drive(ftq_out.prefetch_req);

        // Control-flow controller, last: it sees this cycle's resteer.
        let alloc = self.cfc.tick(
            dfu_out.resteer.as_ref(),
            inputs.arch_override.as_ref(),
            ftq_sts.ready,
            &mut self.rap,
            &mut self.stats,
        );
        self.alloc_req.drive(alloc);

        // External TLB fill write, committed with everything else.
        if let Some(fill) = inputs.tlb_fill {
            self.tlb.push_fill(fill);
        }

        self.commit();
        outputs
    }

    /// End-of-cycle commit: latch swap and array write drain.
    fn commit(&mut self) {
        self.fetch_req.tick();
        self.prefetch_req.tick();
        self.demand_resp.tick();
        self.probe_resp.tick();
        self.fill_resps.tick();
        self.dfu_fill_req.tick();
        self.pfu_fill_req.tick();
        self.alloc_req.tick();
        self.l1i.commit();
        self.tlb.commit();
    }
}
