//! Configuration for the front-end model.
//!
//! This module defines the hierarchical configuration structures that
//! parameterize every front-end component. It provides:
//! 1. **Defaults:** Baseline hardware constants (cache geometry, queue
//!    depths, port counts).
//! 2. **Structures:** Per-component config for the L1I, TLB, FTQ, fill
//!    unit, fetch transactions, RAP, L0 BTB, and the simulation memory.
//! 3. **Validation:** Geometry checks that reject configurations the
//!    address layout cannot express.
//!
//! Configuration is supplied as JSON (CLI `--config`) or via
//! `Config::default()`.

use serde::Deserialize;
use thiserror::Error;

/// Default configuration constants.
///
/// These values define the baseline hardware configuration when not
/// explicitly overridden.
mod defaults {
    /// Number of sets in the L1I cache.
    pub const L1I_NUM_SETS: u32 = 32;

    /// Number of ways in the L1I cache.
    pub const L1I_NUM_WAYS: u32 = 2;

    /// Number of 32-bit words in an L1I cacheline.
    ///
    /// Also the superscalar fetch width: the decode interface consumes one
    /// cacheline-sized packet per cycle.
    pub const L1I_LINE_WORDS: u32 = 8;

    /// L1I TLB entry count (fully associative).
    pub const TLB_DEPTH: u32 = 32;

    /// Fetch target queue depth (power of two).
    pub const FTQ_DEPTH: u32 = 16;

    /// Number of fill-unit miss-status holding registers.
    pub const NUM_MSHR: u32 = 2;

    /// Fill request/response ports per cycle.
    pub const NUM_FILL_PORTS: u32 = 2;

    /// Maximum sequential cachelines in one fetch transaction.
    pub const MAX_FETCH_LINES: u32 = 16;

    /// Cachelines requested per fetch transaction when no prediction
    /// suggests otherwise.
    pub const DEFAULT_FETCH_LINES: u32 = 1;

    /// Return-address predictor stack depth.
    pub const RAP_DEPTH: u32 = 8;

    /// L0 branch target buffer entry count.
    pub const BTB_DEPTH: u32 = 16;

    /// Backing-store response latency in cycles (simulation only).
    pub const MEM_LATENCY: u32 = 1;
}

/// Errors produced by [`Config::validate`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A field that must be a power of two is not.
    #[error("{field} must be a power of two (got {value})")]
    NotPowerOfTwo {
        /// The offending field name.
        field: &'static str,
        /// The rejected value.
        value: u32,
    },

    /// A field that must be non-zero is zero.
    #[error("{field} must be non-zero")]
    Zero {
        /// The offending field name.
        field: &'static str,
    },

    /// The L1I set and offset bits do not fit inside the page offset, so
    /// virtual indexing would not be translation-invariant.
    #[error("L1I geometry exceeds the page offset: {line_bytes} B lines x {num_sets} sets")]
    GeometryExceedsPage {
        /// Configured line size in bytes.
        line_bytes: u32,
        /// Configured set count.
        num_sets: u32,
    },

    /// A bound relation between two fields is violated.
    #[error("{msg}")]
    Relation {
        /// Description of the violated relation.
        msg: &'static str,
    },
}

/// L1 instruction cache geometry.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct L1IConfig {
    /// Number of sets.
    pub num_sets: u32,
    /// Number of ways.
    pub num_ways: u32,
    /// Words per cacheline.
    pub line_words: u32,
}

impl Default for L1IConfig {
    fn default() -> Self {
        Self {
            num_sets: defaults::L1I_NUM_SETS,
            num_ways: defaults::L1I_NUM_WAYS,
            line_words: defaults::L1I_LINE_WORDS,
        }
    }
}

impl L1IConfig {
    /// Bytes per cacheline.
    #[inline]
    pub const fn line_bytes(&self) -> u32 {
        self.line_words * 4
    }
}

/// Fetch transaction sizing.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Upper bound on sequential cachelines per transaction.
    pub max_lines: u32,
    /// Cachelines per transaction absent any prediction.
    pub default_lines: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_lines: defaults::MAX_FETCH_LINES,
            default_lines: defaults::DEFAULT_FETCH_LINES,
        }
    }
}

/// L0 branch target buffer configuration.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct BtbConfig {
    /// Whether the next-fetch prediction source feeds the CFC.
    pub enabled: bool,
    /// Entry count (power of two).
    pub depth: u32,
}

impl Default for BtbConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            depth: defaults::BTB_DEPTH,
        }
    }
}

/// Top-level front-end configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// L1I cache geometry.
    pub l1i: L1IConfig,
    /// L1I TLB entry count.
    pub tlb_depth: u32,
    /// Fetch target queue depth (power of two).
    pub ftq_depth: u32,
    /// Fill-unit MSHR count.
    pub num_mshr: u32,
    /// Fill request/response ports per cycle.
    pub num_fill_ports: u32,
    /// Fetch transaction sizing.
    pub fetch: FetchConfig,
    /// Return-address predictor depth.
    pub rap_depth: u32,
    /// L0 BTB / next-fetch predictor.
    pub btb: BtbConfig,
    /// Backing-store response latency in cycles (simulation only).
    pub mem_latency: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            l1i: L1IConfig::default(),
            tlb_depth: defaults::TLB_DEPTH,
            ftq_depth: defaults::FTQ_DEPTH,
            num_mshr: defaults::NUM_MSHR,
            num_fill_ports: defaults::NUM_FILL_PORTS,
            fetch: FetchConfig::default(),
            rap_depth: defaults::RAP_DEPTH,
            btb: BtbConfig::default(),
            mem_latency: defaults::MEM_LATENCY,
        }
    }
}

impl Config {
    /// Checks that the configuration describes a realizable front-end.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] describing the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn pow2(field: &'static str, value: u32) -> Result<(), ConfigError> {
            if value == 0 {
                return Err(ConfigError::Zero { field });
            }
            if !value.is_power_of_two() {
                return Err(ConfigError::NotPowerOfTwo { field, value });
            }
            Ok(())
        }
        fn nonzero(field: &'static str, value: u32) -> Result<(), ConfigError> {
            if value == 0 {
                return Err(ConfigError::Zero { field });
            }
            Ok(())
        }

        pow2("l1i.num_sets", self.l1i.num_sets)?;
        pow2("l1i.num_ways", self.l1i.num_ways)?;
        pow2("l1i.line_words", self.l1i.line_words)?;
        pow2("ftq_depth", self.ftq_depth)?;
        nonzero("tlb_depth", self.tlb_depth)?;
        nonzero("num_mshr", self.num_mshr)?;
        nonzero("num_fill_ports", self.num_fill_ports)?;
        nonzero("fetch.max_lines", self.fetch.max_lines)?;
        nonzero("fetch.default_lines", self.fetch.default_lines)?;
        nonzero("rap_depth", self.rap_depth)?;
        nonzero("mem_latency", self.mem_latency)?;
        pow2("btb.depth", self.btb.depth)?;

        if self.l1i.line_words > 32 {
            return Err(ConfigError::Relation {
                msg: "l1i.line_words must not exceed 32 (word masks are 32 bits)",
            });
        }
        if self.fetch.default_lines > self.fetch.max_lines {
            return Err(ConfigError::Relation {
                msg: "fetch.default_lines must not exceed fetch.max_lines",
            });
        }

        // Virtual set indexing requires offset + set bits within the page
        // offset (VIPT).
        let line_bytes = self.l1i.line_bytes();
        let index_span = line_bytes * self.l1i.num_sets;
        if index_span > 4096 {
            return Err(ConfigError::GeometryExceedsPage {
                line_bytes,
                num_sets: self.l1i.num_sets,
            });
        }

        Ok(())
    }
}
