//! Configuration tests.
//!
//! Verifies the baseline defaults, JSON deserialization, and the geometry
//! validation rules.

use rvfront_core::Config;
use rvfront_core::config::ConfigError;

// ══════════════════════════════════════════════════════════
// 1. Defaults
// ══════════════════════════════════════════════════════════

#[test]
fn defaults_describe_the_baseline_machine() {
    let cfg = Config::default();
    assert_eq!(cfg.l1i.num_sets, 32);
    assert_eq!(cfg.l1i.num_ways, 2);
    assert_eq!(cfg.l1i.line_words, 8);
    assert_eq!(cfg.l1i.line_bytes(), 32);
    assert_eq!(cfg.tlb_depth, 32);
    assert_eq!(cfg.ftq_depth, 16);
    assert_eq!(cfg.num_mshr, 2);
    assert_eq!(cfg.num_fill_ports, 2);
    assert_eq!(cfg.fetch.max_lines, 16);
    assert_eq!(cfg.rap_depth, 8);
    assert!(!cfg.btb.enabled);
}

#[test]
fn defaults_validate() {
    Config::default().validate().unwrap();
}

// ══════════════════════════════════════════════════════════
// 2. JSON deserialization
// ══════════════════════════════════════════════════════════

#[test]
fn partial_json_overrides_defaults() {
    let cfg: Config =
        serde_json::from_str(r#"{"ftq_depth": 8, "l1i": {"num_ways": 4}}"#).unwrap();
    assert_eq!(cfg.ftq_depth, 8);
    assert_eq!(cfg.l1i.num_ways, 4);
    assert_eq!(cfg.l1i.num_sets, 32, "unset fields keep their defaults");
    cfg.validate().unwrap();
}

// ══════════════════════════════════════════════════════════
// 3. Validation rules
// ══════════════════════════════════════════════════════════

#[test]
fn rejects_non_power_of_two_sets() {
    let mut cfg = Config::default();
    cfg.l1i.num_sets = 24;
    assert_eq!(
        cfg.validate(),
        Err(ConfigError::NotPowerOfTwo {
            field: "l1i.num_sets",
            value: 24
        })
    );
}

#[test]
fn rejects_zero_mshrs() {
    let mut cfg = Config::default();
    cfg.num_mshr = 0;
    assert!(matches!(cfg.validate(), Err(ConfigError::Zero { .. })));
}

#[test]
fn rejects_geometry_wider_than_a_page() {
    // 64 sets x 32 B lines = 2 KiB of index span: fine.
    let mut cfg = Config::default();
    cfg.l1i.num_sets = 64;
    cfg.validate().unwrap();

    // 256 sets x 32 B lines = 8 KiB: set bits would leave the page offset.
    cfg.l1i.num_sets = 256;
    assert!(matches!(
        cfg.validate(),
        Err(ConfigError::GeometryExceedsPage { .. })
    ));
}

#[test]
fn rejects_default_lines_above_max() {
    let mut cfg = Config::default();
    cfg.fetch.default_lines = 32;
    assert!(matches!(cfg.validate(), Err(ConfigError::Relation { .. })));
}
