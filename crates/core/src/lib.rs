//! Cycle-accurate model of a superscalar RV32I instruction front-end.
//!
//! This crate implements the fetch side of a processor core as a
//! cycle-driven reference model:
//! 1. **Control flow:** A control-flow controller arbitrating resteers,
//!    architectural overrides, and optional next-fetch prediction, backed
//!    by a return-address predictor and an L0 BTB.
//! 2. **Scoreboarding:** A fetch target queue tracking every outstanding
//!    fetch transaction.
//! 3. **Fetch pipes:** A three-stage demand fetch unit and a probe-only
//!    prefetch unit over a set-associative L1I with a fully-associative
//!    TLB.
//! 4. **Fills:** MSHR-based fill tracking with a priority arbiter and
//!    per-MSHR backing-store ports.
//! 5. **Predecode:** Per-word RV32 predecoders that truncate fetched lines
//!    at the first resolvable control-flow instruction and redirect fetch
//!    in the same cycle.
//! 6. **Simulation:** A harness that closes the loop with a backing RAM,
//!    a stub page-table walker, and image loading.

/// Common types and utilities (addresses, coding, LFSR, latches).
pub mod common;
/// Front-end configuration (defaults, hierarchy, validation).
pub mod config;
/// The front-end components and top-level wiring.
pub mod front;
/// RISC-V architectural definitions (encodings, Sv32 paging).
pub mod riscv;
/// Simulation harness, backing RAM, stub walker, and loader.
pub mod sim;
/// Statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// The complete front-end; advance it with `FrontEnd::tick`.
pub use crate::front::FrontEnd;
/// Front-end plus external collaborators; advance it with `Simulator::step`.
pub use crate::sim::Simulator;
