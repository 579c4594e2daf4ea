//! L0 BTB and next-fetch predictor tests.

use rvfront_core::common::VirtAddr;
use rvfront_core::front::btb::{L0Btb, NextFetchPredictor};

const LINE_BYTES: u32 = 32;

// ══════════════════════════════════════════════════════════
// 1. BTB lookup/update
// ══════════════════════════════════════════════════════════

#[test]
fn miss_on_empty() {
    let btb = L0Btb::new(16, LINE_BYTES);
    assert_eq!(btb.lookup(VirtAddr::new(0x1000)), None);
}

#[test]
fn update_then_hit() {
    let mut btb = L0Btb::new(16, LINE_BYTES);
    btb.update(VirtAddr::new(0x1000), VirtAddr::new(0x2000));
    assert_eq!(btb.lookup(VirtAddr::new(0x1000)), Some(VirtAddr::new(0x2000)));
}

#[test]
fn entries_are_per_fetch_block() {
    let mut btb = L0Btb::new(16, LINE_BYTES);
    btb.update(VirtAddr::new(0x1004), VirtAddr::new(0x2000));
    // Any pc within the same 32-byte block hits.
    assert_eq!(btb.lookup(VirtAddr::new(0x101C)), Some(VirtAddr::new(0x2000)));
    // The next block does not.
    assert_eq!(btb.lookup(VirtAddr::new(0x1020)), None);
}

#[test]
fn aliasing_blocks_evict() {
    let mut btb = L0Btb::new(16, LINE_BYTES);
    // Blocks 16 entries apart share a slot.
    let a = VirtAddr::new(0x1000);
    let b = VirtAddr::new(0x1000 + 16 * LINE_BYTES);
    btb.update(a, VirtAddr::new(0xAAAA_AAA0));
    btb.update(b, VirtAddr::new(0xBBBB_BBB0));
    assert_eq!(btb.lookup(a), None, "alias must evict the old entry");
    assert_eq!(btb.lookup(b), Some(VirtAddr::new(0xBBBB_BBB0)));
}

// ══════════════════════════════════════════════════════════
// 2. Next-fetch prediction
// ══════════════════════════════════════════════════════════

#[test]
fn falls_back_to_next_sequential_block() {
    let nfp = NextFetchPredictor::new(16, LINE_BYTES);
    assert_eq!(nfp.predict(VirtAddr::new(0x1000)), VirtAddr::new(0x1020));
    // Mid-block pcs still predict the block after this one.
    assert_eq!(nfp.predict(VirtAddr::new(0x1014)), VirtAddr::new(0x1020));
}

#[test]
fn trained_blocks_predict_their_target() {
    let mut nfp = NextFetchPredictor::new(16, LINE_BYTES);
    nfp.train(VirtAddr::new(0x1008), VirtAddr::new(0x4000));
    assert_eq!(nfp.predict(VirtAddr::new(0x1000)), VirtAddr::new(0x4000));
}
