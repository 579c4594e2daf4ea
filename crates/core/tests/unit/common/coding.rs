//! Priority encoding and mask LUT tests.

use proptest::prelude::*;
use rvfront_core::common::{limit2mask, offset2mask, popcount, priority_encode};

const WIDTH: usize = 8;

// ══════════════════════════════════════════════════════════
// 1. Priority encoding
// ══════════════════════════════════════════════════════════

#[test]
fn priority_encode_lowest_bit_wins() {
    assert_eq!(priority_encode(0), None);
    assert_eq!(priority_encode(0b1), Some(0));
    assert_eq!(priority_encode(0b1010_0000), Some(5));
    assert_eq!(priority_encode(u32::MAX), Some(0));
}

// ══════════════════════════════════════════════════════════
// 2. Mask LUT shapes
// ══════════════════════════════════════════════════════════

#[test]
fn offset2mask_examples() {
    assert_eq!(offset2mask(WIDTH, 0), 0b1111_1111);
    assert_eq!(offset2mask(WIDTH, 1), 0b1111_1110);
    assert_eq!(offset2mask(WIDTH, 3), 0b1111_1000);
    assert_eq!(offset2mask(WIDTH, 8), 0b0000_0000);
}

#[test]
fn limit2mask_examples() {
    assert_eq!(limit2mask(WIDTH, 0), 0b0000_0000);
    assert_eq!(limit2mask(WIDTH, 1), 0b0000_0001);
    assert_eq!(limit2mask(WIDTH, 4), 0b0000_1111);
    assert_eq!(limit2mask(WIDTH, 8), 0b1111_1111);
}

#[test]
fn masks_partition_the_line() {
    for k in 0..=WIDTH {
        assert_eq!(limit2mask(WIDTH, k) & offset2mask(WIDTH, k), 0);
        assert_eq!(
            limit2mask(WIDTH, k) | offset2mask(WIDTH, k),
            offset2mask(WIDTH, 0)
        );
    }
}

// ══════════════════════════════════════════════════════════
// 3. Quantified properties
// ══════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn limit2mask_sets_k_low_bits(k in 0usize..=WIDTH) {
        let mask = limit2mask(WIDTH, k);
        prop_assert_eq!(popcount(mask) as usize, k);
        // Low bits only: no bit at or above k.
        prop_assert_eq!(mask >> k, 0);
    }

    #[test]
    fn offset2mask_sets_high_bits(k in 0usize..=WIDTH) {
        let mask = offset2mask(WIDTH, k);
        prop_assert_eq!(popcount(mask) as usize, WIDTH - k);
        // High bits only: nothing below k.
        prop_assert_eq!(mask & limit2mask(WIDTH, k), 0);
    }
}
