//! Sv32 paging structure tests.

use rvfront_core::riscv::paging::{Ppn, Pte, Vpn};

#[test]
fn vpn_field_split() {
    let vpn = Vpn::from_vaddr(0xFFC0_1000);
    assert_eq!(vpn.0, 0xFFC01);
    assert_eq!(vpn.vpn0(), 0x001);
    assert_eq!(vpn.vpn1(), 0x3FF);
}

#[test]
fn ppn_field_split() {
    let ppn = Ppn(0x3F_FC01);
    assert_eq!(ppn.ppn0(), 0x001);
    assert_eq!(ppn.ppn1(), 0xFFF);
}

#[test]
fn leaf_exec_pte_shape() {
    let pte = Pte::leaf_exec(Ppn(0x123));
    assert!(pte.v());
    assert!(pte.r());
    assert!(pte.x());
    assert!(pte.a());
    assert!(!pte.w());
    assert!(!pte.u());
    assert!(!pte.d());
    assert_eq!(pte.ppn().0, 0x123);
}

#[test]
fn pte_flag_bits_decode() {
    // V|R|W|X|U|G|A|D all set, ppn 0.
    let pte = Pte(0b1111_1111);
    assert!(pte.v() && pte.r() && pte.w() && pte.x());
    assert!(pte.u() && pte.g() && pte.a() && pte.d());
    assert_eq!(pte.ppn().0, 0);
}
