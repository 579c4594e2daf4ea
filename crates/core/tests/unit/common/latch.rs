//! Bus latch timing tests.

use rvfront_core::common::Latch;

#[test]
fn driven_value_visible_after_tick() {
    let mut latch: Latch<Option<u32>> = Latch::new();
    latch.drive(Some(7));
    assert_eq!(*latch.out(), None, "value must not be visible same cycle");
    latch.tick();
    assert_eq!(*latch.out(), Some(7));
}

#[test]
fn undriven_cycle_clears_the_bus() {
    let mut latch: Latch<Option<u32>> = Latch::new();
    latch.drive(Some(1));
    latch.tick();
    latch.tick();
    assert_eq!(*latch.out(), None, "valid must deassert when undriven");
}

#[test]
fn last_drive_wins_within_a_cycle() {
    let mut latch: Latch<Option<u32>> = Latch::new();
    latch.drive(Some(1));
    latch.drive(Some(2));
    latch.tick();
    assert_eq!(*latch.out(), Some(2));
}
