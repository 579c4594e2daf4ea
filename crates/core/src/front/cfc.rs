//! Control-flow controller.
//!
//! Each cycle the controller picks the next program counter to enter the
//! FTQ, from three sources in descending priority:
//!
//! 1. A **resteer** from the predecode stage — the front-end's reaction to
//!    a direct jump, direct call, or return discovered in the cacheline it
//!    just read. Calls push their fall-through address onto the RAP;
//!    returns predict from (and pop) the RAP head.
//! 2. An **architectural override** from outside the front-end (debug, or
//!    a mid-core mispredict redirect).
//! 3. Optionally, the registered output of the **next-fetch predictor**.
//!
//! The winning address becomes an FTQ allocation request, emitted only
//! while the FTQ signals ready; a request that finds the queue full is
//! dropped, and recovery is the mid-core's business.

use tracing::debug;

use crate::common::VirtAddr;
use crate::config::Config;
use crate::front::btb::NextFetchPredictor;
use crate::front::rap::ReturnAddressPredictor;
use crate::front::signals::{AllocRequest, ArchOverride, ControlFlowOp, ResteerRequest};
use crate::stats::FrontStats;

/// The control-flow controller.
#[derive(Clone, Debug)]
pub struct ControlFlowController {
    nfp: NextFetchPredictor,
    nfp_enabled: bool,
    /// Registered next-fetch prediction from the previous cycle.
    nfp_pending: Option<VirtAddr>,
    line_bytes: u32,
    default_lines: u32,
    max_lines: u32,
}

impl ControlFlowController {
    /// Creates a controller for the given configuration.
    pub fn new(cfg: &Config) -> Self {
        Self {
            nfp: NextFetchPredictor::new(cfg.btb.depth as usize, cfg.l1i.line_bytes()),
            nfp_enabled: cfg.btb.enabled,
            nfp_pending: None,
            line_bytes: cfg.l1i.line_bytes(),
            default_lines: cfg.fetch.default_lines,
            max_lines: cfg.fetch.max_lines,
        }
    }

    /// Sizes a transaction starting at `vaddr`.
    ///
    /// The block must not cross the 4 KiB page: translation is resolved
    /// once per line, but the sequential-run assumption holds only within
    /// a mapping.
    fn alloc_lines(&self, vaddr: VirtAddr) -> u32 {
        let block_off = vaddr.fetch_addr(self.line_bytes).val() & 0xFFF;
        let to_page_end = (4096 - block_off) / self.line_bytes;
        self.default_lines.min(self.max_lines).min(to_page_end.max(1))
    }

    /// Selects this cycle's fetch target and emits an allocation request.
    ///
    /// `resteer` is the same-cycle combinational input from the demand
    /// pipe's predecode stage; when it and an architectural override fire
    /// together, the resteer wins.
    pub fn tick(
        &mut self,
        resteer: Option<&ResteerRequest>,
        dbg: Option<&ArchOverride>,
        ftq_ready: bool,
        rap: &mut ReturnAddressPredictor,
        stats: &mut FrontStats,
    ) -> Option<AllocRequest> {
        let mut sel: Option<(VirtAddr, bool, bool)> = None;

        if let Some(r) = resteer {
            let tgt = match r.op {
                ControlFlowOp::JumpDir => Some(r.tgt_pc),
                ControlFlowOp::CallDir => {
                    let ev = rap.push(r.src_pc.next_inst());
                    stats.rap_pushes += 1;
                    if ev.wrapped {
                        stats.rap_overflows += 1;
                    }
                    Some(r.tgt_pc)
                }
                ControlFlowOp::Ret => {
                    let tgt = rap.head();
                    let ev = rap.pop();
                    stats.rap_pops += 1;
                    if ev.wrapped {
                        stats.rap_underflows += 1;
                    }
                    Some(tgt)
                }
                _ => None,
            };
            if let Some(tgt) = tgt {
                if self.nfp_enabled {
                    self.nfp.train(r.src_pc, tgt);
                }
                sel = Some((tgt, r.passthru, false));
            }
        }

        if sel.is_none() {
            if let Some(d) = dbg {
                sel = Some((d.pc, d.passthru, false));
            }
        }

        if sel.is_none() && self.nfp_enabled {
            if let Some(pc) = self.nfp_pending {
                sel = Some((pc, true, true));
            }
        }

        // Feed the predictor with this cycle's selection; its output is a
        // candidate next cycle.
        self.nfp_pending = if self.nfp_enabled {
            sel.map(|(pc, _, _)| self.nfp.predict(pc))
        } else {
            None
        };

        let (pc, passthru, predicted) = sel?;
        if !ftq_ready {
            stats.ftq_alloc_dropped += 1;
            debug!("allocation dropped, ftq full: pc={:#x}", pc.val());
            return None;
        }

        Some(AllocRequest {
            vaddr: pc,
            passthru,
            lines: self.alloc_lines(pc),
            predicted,
        })
    }
}
