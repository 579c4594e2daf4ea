//! Demand fetch pipeline tests.
//!
//! Drives the unit directly against prepared L1I/TLB contents to pin down
//! stage timing, miss handling, stall/replay byte-exactness, resteer
//! truncation, and the translation-abort path.

use rvfront_core::Config;
use rvfront_core::common::VirtAddr;
use rvfront_core::front::demand::{DemandFetchUnit, DfuTickOut};
use rvfront_core::front::itlb::ITlb;
use rvfront_core::front::l1i::{L1ICache, L1ITag, LineWrite};
use rvfront_core::front::signals::{
    ControlFlowOp, FetchRequest, FetchStatus, FillResponse, FillSource,
};
use rvfront_core::stats::FrontStats;

use crate::common::builder::instruction::{NOP, jal};

struct Bench {
    dfu: DemandFetchUnit,
    l1i: L1ICache,
    tlb: ITlb,
    stats: FrontStats,
}

fn bench() -> Bench {
    let cfg = Config::default();
    Bench {
        dfu: DemandFetchUnit::new(&cfg),
        l1i: L1ICache::new(&cfg.l1i),
        tlb: ITlb::new(cfg.tlb_depth as usize),
        stats: FrontStats::default(),
    }
}

impl Bench {
    /// Installs a line for a passthru address (ppn = address >> 12).
    fn install_line(&mut self, addr: u32, way: usize, data: &[u32]) {
        self.l1i.push_write(LineWrite {
            set: VirtAddr::new(addr).set_idx(32, 32),
            way,
            tag: L1ITag {
                valid: true,
                ppn: addr >> 12,
            },
            data: data.to_vec(),
        });
        self.l1i.commit();
    }

    fn tick(
        &mut self,
        req: Option<&FetchRequest>,
        fill_resps: &[FillResponse],
        fill_ready: bool,
    ) -> DfuTickOut {
        self.dfu.tick(
            req,
            fill_resps,
            &self.l1i,
            &self.tlb,
            fill_ready,
            &mut self.stats,
        )
    }
}

fn fetch_req(pc: u32, lines: u32) -> FetchRequest {
    FetchRequest {
        vaddr: VirtAddr::new(pc),
        passthru: true,
        lines,
        ftq_idx: 0,
    }
}

// ══════════════════════════════════════════════════════════
// 1. Hit path
// ══════════════════════════════════════════════════════════

#[test]
fn warm_hit_flows_in_four_cycles() {
    let mut b = bench();
    b.install_line(0x1000, 0, &[NOP; 8]);

    let req = fetch_req(0x1000, 1);
    assert!(b.tick(Some(&req), &[], true).packet.is_none()); // capture
    assert!(b.tick(None, &[], true).packet.is_none()); // array access
    assert!(b.tick(None, &[], true).packet.is_none()); // way select
    let out = b.tick(None, &[], true); // predecode + output

    let packet = out.packet.unwrap();
    assert_eq!(packet.vaddr, VirtAddr::new(0x1000));
    assert_eq!(packet.mask, 0xFF);
    assert_eq!(packet.data, vec![NOP; 8]);

    let resp = out.resp.unwrap();
    assert_eq!(resp.sts, FetchStatus::L1Hit);
    assert!(!resp.resteer);
    assert!(b.dfu.is_idle(), "terminal line returns the pipe to idle");
}

#[test]
fn entry_point_masks_the_low_words() {
    let mut b = bench();
    b.install_line(0x1000, 0, &[NOP; 8]);

    // Start mid-line: word index 3.
    let req = fetch_req(0x100C, 1);
    let _ = b.tick(Some(&req), &[], true);
    let _ = b.tick(None, &[], true);
    let _ = b.tick(None, &[], true);
    let out = b.tick(None, &[], true);

    let packet = out.packet.unwrap();
    assert_eq!(packet.vaddr, VirtAddr::new(0x1000), "packets are line-aligned");
    assert_eq!(packet.mask, 0b1111_1000);
}

#[test]
fn multi_line_transaction_streams_in_order() {
    let mut b = bench();
    b.install_line(0x1000, 0, &[0x11; 8]);
    b.install_line(0x1020, 0, &[0x22; 8]);

    let req = fetch_req(0x1000, 2);
    let _ = b.tick(Some(&req), &[], true);
    let _ = b.tick(None, &[], true);
    let _ = b.tick(None, &[], true);

    let first = b.tick(None, &[], true);
    let p1 = first.packet.unwrap();
    assert_eq!(p1.vaddr, VirtAddr::new(0x1000));
    assert!(first.resp.is_none(), "only the terminal line responds");

    let second = b.tick(None, &[], true);
    let p2 = second.packet.unwrap();
    assert_eq!(p2.vaddr, VirtAddr::new(0x1020));
    assert_eq!(p2.data, vec![0x22; 8]);
    assert_eq!(second.resp.unwrap().sts, FetchStatus::L1Hit);
    assert!(b.dfu.is_idle());
}

// ══════════════════════════════════════════════════════════
// 2. Miss, stall, replay
// ══════════════════════════════════════════════════════════

#[test]
fn cold_miss_stalls_and_requests_a_fill() {
    let mut b = bench();
    let req = fetch_req(0x1000, 1);
    let _ = b.tick(Some(&req), &[], true);
    let _ = b.tick(None, &[], true);
    let out = b.tick(None, &[], true);

    assert_eq!(out.resp.unwrap().sts, FetchStatus::L1Miss);
    let fill = out.fill_req.unwrap();
    assert_eq!(fill.addr.val(), 0x1000);
    assert_eq!(fill.lines, 1);
    assert_eq!(fill.src, FillSource::Demand);
    assert!(b.dfu.is_stalled());
    assert_eq!(b.stats.demand_l1_misses, 1);
}

#[test]
fn replay_resumes_at_the_failing_line() {
    let mut b = bench();
    let req = fetch_req(0x1000, 1);
    let _ = b.tick(Some(&req), &[], true);
    let _ = b.tick(None, &[], true);
    let _ = b.tick(None, &[], true); // miss, stall

    // The fill lands while stalled.
    b.install_line(0x1000, 1, &[0x77; 8]);
    let _ = b.tick(
        None,
        &[FillResponse {
            ftq_idx: 0,
            src: FillSource::Demand,
        }],
        true,
    );
    assert!(!b.dfu.is_stalled());

    // Replayed line flows through the remaining stages.
    let _ = b.tick(None, &[], true);
    let _ = b.tick(None, &[], true);
    let out = b.tick(None, &[], true);
    let packet = out.packet.unwrap();
    assert_eq!(packet.vaddr, VirtAddr::new(0x1000));
    assert_eq!(packet.data, vec![0x77; 8]);
    assert_eq!(packet.mask, 0xFF);
}

#[test]
fn unmatched_fill_responses_do_not_unstall() {
    let mut b = bench();
    let req = fetch_req(0x1000, 1);
    let _ = b.tick(Some(&req), &[], true);
    let _ = b.tick(None, &[], true);
    let _ = b.tick(None, &[], true); // stall

    let other = [FillResponse {
        ftq_idx: 5,
        src: FillSource::Demand,
    }];
    let _ = b.tick(None, &other, true);
    assert!(b.dfu.is_stalled(), "responses are matched by FTQ index");

    let prefetch = [FillResponse {
        ftq_idx: 0,
        src: FillSource::Prefetch,
    }];
    let _ = b.tick(None, &prefetch, true);
    assert!(b.dfu.is_stalled(), "prefetch fills do not resume demand");
}

#[test]
fn fill_request_is_held_across_arbiter_backpressure() {
    let mut b = bench();
    let req = fetch_req(0x1000, 1);
    let _ = b.tick(Some(&req), &[], false);
    let _ = b.tick(None, &[], false);

    // Miss with the arbiter busy: no request may be emitted yet.
    let out = b.tick(None, &[], false);
    assert_eq!(out.resp.unwrap().sts, FetchStatus::L1Miss);
    assert!(out.fill_req.is_none());
    assert!(b.dfu.is_stalled());

    // Still busy: nothing emitted, nothing lost.
    let out = b.tick(None, &[], false);
    assert!(out.fill_req.is_none());

    // Arbiter frees up: the held request goes out.
    let out = b.tick(None, &[], true);
    let fill = out.fill_req.unwrap();
    assert_eq!(fill.addr.val(), 0x1000);
}

// ══════════════════════════════════════════════════════════
// 3. Resteer
// ══════════════════════════════════════════════════════════

#[test]
fn resteer_truncates_and_finishes_early() {
    let mut b = bench();
    let mut line = [NOP; 8];
    line[2] = jal(0, 0x40);
    b.install_line(0x1000, 0, &line);

    // Three lines requested, but the jump at word 2 cuts the transaction.
    let req = fetch_req(0x1000, 3);
    let _ = b.tick(Some(&req), &[], true);
    let _ = b.tick(None, &[], true);
    let _ = b.tick(None, &[], true);
    let out = b.tick(None, &[], true);

    let packet = out.packet.unwrap();
    assert_eq!(packet.mask, 0b0000_0111, "jump word is kept inclusively");

    let resteer = out.resteer.unwrap();
    assert_eq!(resteer.op, ControlFlowOp::JumpDir);
    assert_eq!(resteer.src_pc, VirtAddr::new(0x1008));
    assert_eq!(resteer.tgt_pc, VirtAddr::new(0x1048));

    let resp = out.resp.unwrap();
    assert!(resp.resteer);
    assert_eq!(resp.sts, FetchStatus::L1Hit);
    assert!(b.dfu.is_idle(), "resteer flushes the pipe");
}

#[test]
fn single_word_resteer_on_word_zero() {
    let mut b = bench();
    let mut line = [NOP; 8];
    line[0] = jal(0, 0x20);
    b.install_line(0x1000, 0, &line);

    let req = fetch_req(0x1000, 1);
    let _ = b.tick(Some(&req), &[], true);
    let _ = b.tick(None, &[], true);
    let _ = b.tick(None, &[], true);
    let out = b.tick(None, &[], true);
    assert_eq!(out.packet.unwrap().mask, 0b0000_0001);
}

#[test]
fn branches_do_not_resteer() {
    let mut b = bench();
    let mut line = [NOP; 8];
    line[1] = crate::common::builder::instruction::beq(1, 2, 16);
    b.install_line(0x1000, 0, &line);

    let req = fetch_req(0x1000, 1);
    let _ = b.tick(Some(&req), &[], true);
    let _ = b.tick(None, &[], true);
    let _ = b.tick(None, &[], true);
    let out = b.tick(None, &[], true);
    assert!(out.resteer.is_none());
    assert_eq!(out.packet.unwrap().mask, 0xFF);
}

// ══════════════════════════════════════════════════════════
// 4. Translation aborts
// ══════════════════════════════════════════════════════════

#[test]
fn tlb_miss_aborts_to_idle() {
    let mut b = bench();
    let req = FetchRequest {
        vaddr: VirtAddr::new(0x1000),
        passthru: false,
        lines: 1,
        ftq_idx: 0,
    };
    let _ = b.tick(Some(&req), &[], true);
    let _ = b.tick(None, &[], true);
    let out = b.tick(None, &[], true);

    assert_eq!(out.resp.unwrap().sts, FetchStatus::TlbMiss);
    assert!(out.fill_req.is_none());
    assert!(b.dfu.is_idle(), "translation misses abort, not stall");
    assert_eq!(b.stats.demand_tlb_misses, 1);
}
