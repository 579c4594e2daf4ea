//! Demand fetch unit.
//!
//! The three-stage pipeline that brings instruction cachelines out of the
//! L1I for decode. One transaction covers up to `fetch.max_lines`
//! sequential cachelines on behalf of a single FTQ entry:
//!
//! - **Stage 0 — issue:** Releases one line request per cycle while the
//!   transaction runs; holds and replays the failing request across stalls.
//! - **Stage 1 — array access:** Drives the L1I read port and (unless
//!   passthru) the TLB read port.
//! - **Stage 2 — way select:** Builds the physical tag, selects the hitting
//!   way, and converts misses into fill requests plus a stall.
//! - **Stage 3 — predecode:** Runs one predecoder per word, truncates the
//!   line at the first resteerable control-flow instruction, publishes the
//!   packet, and finishes the transaction on the terminal line.
//!
//! Within a transaction, lines are delivered in order at one per cycle in
//! steady state; a stall resumes at the exact line that failed, so the
//! delivered byte stream is unchanged by misses.
//!
//! A stage-3 resteer is combinationally visible to the control-flow
//! controller in the same cycle; everything else the unit says travels on
//! registered buses.

use tracing::{debug, trace};

use crate::common::{PhysAddr, VirtAddr, limit2mask, offset2mask};
use crate::config::Config;
use crate::front::itlb::ITlb;
use crate::front::l1i::{L1ICache, way_select};
use crate::front::predecode::{first_control_flow, predecode_line};
use crate::front::signals::{
    ControlFlowOp, DemandResponse, FetchPacket, FetchRequest, FetchStatus, FillRequest,
    FillResponse, FillSource, FtqIndex, ResteerRequest,
};
use crate::riscv::paging::Vpn;
use crate::stats::FrontStats;

/// Demand pipeline state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum DfuState {
    /// Waiting for a transaction.
    #[default]
    Idle,
    /// A transaction is in flight.
    Run,
    /// The transaction is suspended awaiting a fill.
    Stall,
}

/// A request for one L1I cacheline inside a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct LineRequest {
    /// Bypass virtual-to-physical translation.
    passthru: bool,
    /// Cacheline-aligned virtual address.
    vaddr: VirtAddr,
    /// Index of the first valid word in the line.
    start_idx: usize,
    /// Originating FTQ entry.
    ftq_idx: FtqIndex,
    /// 1-based position of this line in the transaction.
    line: u32,
    /// Valid-word mask.
    mask: u32,
    /// This is the last line of the transaction.
    terminal: bool,
}

/// Outputs of one demand-pipe cycle.
#[derive(Clone, Debug, Default)]
pub struct DfuTickOut {
    /// Response to the FTQ (per-line miss or transaction completion).
    pub resp: Option<DemandResponse>,
    /// Fill request raised by a stage-2 miss.
    pub fill_req: Option<FillRequest>,
    /// Packet published to the decode interface.
    pub packet: Option<FetchPacket>,
    /// Same-cycle redirect for the control-flow controller.
    pub resteer: Option<ResteerRequest>,
}

/// The demand fetch unit.
#[derive(Clone, Debug)]
pub struct DemandFetchUnit {
    state: DfuState,

    // Captured transaction.
    lines: u32,
    ftq_idx: FtqIndex,
    passthru: bool,

    /// Line number issued most recently.
    blk: u32,
    /// Line address issued most recently.
    addr: VirtAddr,

    /// The request that caused the current stall, replayed on unstall.
    stall_req: Option<LineRequest>,
    /// A fill request the arbiter has not yet accepted.
    pending_fill: Option<FillRequest>,

    // Stage registers.
    s1: Option<LineRequest>,
    s2: Option<LineRequest>,
    s3: Option<(LineRequest, Vec<u32>)>,

    line_bytes: u32,
    line_words: usize,
    num_sets: u32,
}

impl DemandFetchUnit {
    /// Creates an idle demand fetch unit.
    pub fn new(cfg: &Config) -> Self {
        Self {
            state: DfuState::Idle,
            lines: 0,
            ftq_idx: 0,
            passthru: false,
            blk: 0,
            addr: VirtAddr::default(),
            stall_req: None,
            pending_fill: None,
            s1: None,
            s2: None,
            s3: None,
            line_bytes: cfg.l1i.line_bytes(),
            line_words: cfg.l1i.line_words as usize,
            num_sets: cfg.l1i.num_sets,
        }
    }

    /// Whether the unit is between transactions.
    pub fn is_idle(&self) -> bool {
        self.state == DfuState::Idle
    }

    /// Whether the unit is suspended on a fill.
    pub fn is_stalled(&self) -> bool {
        self.state == DfuState::Stall
    }

    /// Flushes every stage and returns to idle.
    fn flush_to_idle(&mut self) {
        self.state = DfuState::Idle;
        self.s1 = None;
        self.s2 = None;
        self.stall_req = None;
        self.pending_fill = None;
        self.blk = 0;
        self.lines = 0;
    }

    /// Advances the pipeline one cycle.
    ///
    /// Stages run oldest-first so that the stage-3 resteer decision can
    /// squash the younger stages in the same cycle, matching the
    /// combinational cancellation in hardware.
    pub fn tick(
        &mut self,
        req: Option<&FetchRequest>,
        fill_resps: &[FillResponse],
        l1i: &L1ICache,
        tlb: &ITlb,
        fill_ready: bool,
        stats: &mut FrontStats,
    ) -> DfuTickOut {
        let mut out = DfuTickOut::default();

        // `squash` is set once the transaction ends (terminal, resteer, or
        // TLB abort) or a stall begins; the younger stages then idle for
        // the rest of the cycle.
        let mut squash = false;

        // ---------------- Stage 3: predecode, resteer, output ----------
        if let Some((req3, data)) = self.s3.take() {
            let infos = predecode_line(&data, req3.vaddr, req3.mask);
            let mut result_mask = req3.mask;
            let mut resteer = false;

            if let Some(idx) = first_control_flow(&infos, req3.mask) {
                let info = infos[idx];
                if info.cf_op.resteerable() {
                    resteer = true;
                    let src_pc = VirtAddr(req3.vaddr.val().wrapping_add((idx * 4) as u32));
                    result_mask &= limit2mask(self.line_words, idx + 1);
                    match info.cf_op {
                        ControlFlowOp::JumpDir => stats.resteer_jump += 1,
                        ControlFlowOp::CallDir => stats.resteer_call += 1,
                        ControlFlowOp::Ret => stats.resteer_ret += 1,
                        _ => {}
                    }
                    debug!(
                        "resteer {:?}: src_pc={:#x} tgt_pc={:#x}",
                        info.cf_op,
                        src_pc.val(),
                        info.tgt.val()
                    );
                    out.resteer = Some(ResteerRequest {
                        op: info.cf_op,
                        src_pc,
                        tgt_pc: info.tgt,
                        passthru: req3.passthru,
                        parent_ftq_idx: req3.ftq_idx,
                    });
                }
            }

            trace!(
                "packet out: vaddr={:#x} mask={:#010b} ftq_idx={}",
                req3.vaddr.val(),
                result_mask,
                req3.ftq_idx
            );
            stats.packets += 1;
            out.packet = Some(FetchPacket {
                ftq_idx: req3.ftq_idx,
                vaddr: req3.vaddr,
                mask: result_mask,
                data,
            });

            // The terminal line, or an early redirect, finishes the
            // transaction: tell the FTQ and flush the pipe.
            if resteer || req3.terminal {
                out.resp = Some(DemandResponse {
                    ftq_idx: req3.ftq_idx,
                    vaddr: req3.vaddr,
                    sts: FetchStatus::L1Hit,
                    resteer,
                });
                self.flush_to_idle();
                squash = true;
            }
        }

        // ---------------- Stage 2: way select, miss handling -----------
        if !squash {
            if let Some(req2) = self.s2.take() {
                let tlb_pte = if req2.passthru {
                    None
                } else {
                    tlb.lookup(Vpn::from_vaddr(req2.vaddr.val()))
                };
                let tag_ok = req2.passthru || tlb_pte.is_some();

                if !tag_ok {
                    // Translation is unavailable: report it and abort the
                    // transaction. The FTQ replays the entry once the
                    // external walker has written the mapping.
                    stats.demand_tlb_misses += 1;
                    debug!(
                        "demand tlb miss: vaddr={:#x} ftq_idx={}",
                        req2.vaddr.val(),
                        req2.ftq_idx
                    );
                    out.resp = Some(DemandResponse {
                        ftq_idx: req2.ftq_idx,
                        vaddr: req2.vaddr,
                        sts: FetchStatus::TlbMiss,
                        resteer: false,
                    });
                    self.flush_to_idle();
                    squash = true;
                } else {
                    let ppn = if req2.passthru {
                        req2.vaddr.as_phys().ppn()
                    } else {
                        tlb_pte.map(|pte| pte.ppn().0).unwrap_or_default()
                    };
                    let set = req2.vaddr.set_idx(self.line_bytes, self.num_sets);

                    if let Some(way) = way_select(l1i.tags(set), ppn) {
                        stats.demand_l1_hits += 1;
                        self.s3 = Some((req2, l1i.line(set, way).to_vec()));
                    } else {
                        // L1I miss: suspend the transaction at this line
                        // and ask the fill unit for everything that
                        // remains.
                        stats.demand_l1_misses += 1;
                        debug!(
                            "demand l1 miss: vaddr={:#x} ftq_idx={} line={}",
                            req2.vaddr.val(),
                            req2.ftq_idx,
                            req2.line
                        );
                        out.resp = Some(DemandResponse {
                            ftq_idx: req2.ftq_idx,
                            vaddr: req2.vaddr,
                            sts: FetchStatus::L1Miss,
                            resteer: false,
                        });
                        let paddr = if req2.passthru {
                            req2.vaddr.as_phys()
                        } else {
                            PhysAddr::from_parts(ppn, req2.vaddr.page_offset())
                        };
                        let fill = FillRequest {
                            addr: paddr.line_addr(self.line_bytes),
                            lines: self.lines - req2.line + 1,
                            ftq_idx: req2.ftq_idx,
                            src: FillSource::Demand,
                        };
                        if fill_ready {
                            out.fill_req = Some(fill);
                        } else {
                            self.pending_fill = Some(fill);
                        }
                        self.state = DfuState::Stall;
                        self.stall_req = Some(req2);
                        self.s1 = None;
                        squash = true;
                    }
                }
            }
        }

        // ---------------- Stage 1: array access ------------------------
        if !squash {
            if let Some(req1) = self.s1.take() {
                // The L1I and TLB read ports are driven here; their
                // synchronous responses line up with stage 2 next cycle.
                self.s2 = Some(req1);
            }
        }

        // ---------------- Stage 0: issue --------------------------------
        if !squash {
            match self.state {
                DfuState::Idle => {
                    if let Some(r) = req {
                        let lines = r.lines.max(1);
                        let block = r.vaddr.fetch_addr(self.line_bytes);
                        let start_idx = r.vaddr.word_idx(self.line_bytes);
                        debug!(
                            "transaction start: vaddr={:#x} lines={} ftq_idx={}",
                            r.vaddr.val(),
                            lines,
                            r.ftq_idx
                        );
                        self.lines = lines;
                        self.ftq_idx = r.ftq_idx;
                        self.passthru = r.passthru;
                        self.addr = block;
                        self.blk = 1;
                        self.state = DfuState::Run;
                        self.s1 = Some(LineRequest {
                            passthru: r.passthru,
                            vaddr: block,
                            start_idx,
                            ftq_idx: r.ftq_idx,
                            line: 1,
                            mask: offset2mask(self.line_words, start_idx),
                            terminal: lines == 1,
                        });
                    }
                }
                DfuState::Run => {
                    if self.blk < self.lines {
                        let next_addr = self.addr.next_line(self.line_bytes);
                        let next_blk = self.blk + 1;
                        self.addr = next_addr;
                        self.blk = next_blk;
                        self.s1 = Some(LineRequest {
                            passthru: self.passthru,
                            vaddr: next_addr,
                            start_idx: 0,
                            ftq_idx: self.ftq_idx,
                            line: next_blk,
                            mask: offset2mask(self.line_words, 0),
                            terminal: next_blk == self.lines,
                        });
                    }
                }
                DfuState::Stall => {
                    stats.demand_stall_cycles += 1;
                    // Keep offering an unaccepted fill request until the
                    // arbiter has room.
                    if fill_ready && out.fill_req.is_none() {
                        if let Some(fill) = self.pending_fill.take() {
                            out.fill_req = Some(fill);
                        }
                    }
                    // Replay the failing request once its fill completes.
                    let unstall = fill_resps
                        .iter()
                        .any(|r| r.ftq_idx == self.ftq_idx && r.src == FillSource::Demand);
                    if unstall {
                        if let Some(sr) = self.stall_req.take() {
                            debug!(
                                "unstall, replaying: vaddr={:#x} line={}",
                                sr.vaddr.val(),
                                sr.line
                            );
                            self.state = DfuState::Run;
                            self.addr = sr.vaddr;
                            self.blk = sr.line;
                            self.pending_fill = None;
                            self.s1 = Some(sr);
                        }
                    }
                }
            }
        }

        out
    }
}
