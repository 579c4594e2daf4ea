//! LFSR tests.
//!
//! Verifies the maximal-period guarantee, the never-zero property, and
//! index-range behaviour.

use std::collections::HashSet;

use rvfront_core::common::Lfsr;

#[test]
fn degree_4_has_full_period() {
    let mut lfsr = Lfsr::new(4);
    let mut seen = HashSet::new();
    for _ in 0..15 {
        assert!(seen.insert(lfsr.next_value()), "value repeated early");
    }
    // After 2^4 - 1 steps, the sequence restarts.
    assert_eq!(lfsr.value(), 1);
}

#[test]
fn never_takes_zero() {
    let mut lfsr = Lfsr::new(5);
    for _ in 0..100 {
        assert_ne!(lfsr.next_value(), 0);
    }
}

#[test]
fn next_index_stays_in_range() {
    let mut lfsr = Lfsr::for_slots(8);
    for _ in 0..50 {
        assert!(lfsr.next_index(8) < 8);
    }
}

#[test]
fn small_slot_counts_are_clamped() {
    // Structures with fewer than 8 slots still get a valid sequence.
    let mut lfsr = Lfsr::for_slots(2);
    for _ in 0..10 {
        assert!(lfsr.next_index(2) < 2);
    }
}
