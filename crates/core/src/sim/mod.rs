//! Simulation: harness, backing RAM, stub walker, and image loading.
//!
//! Everything in this module is an *external collaborator* of the
//! front-end: the cycle-accurate model itself lives under [`crate::front`],
//! and these pieces exist to drive it.

/// Image loading (flat binaries and ELF).
pub mod loader;

/// Stub page-table walker.
pub mod ptw;

/// Backing RAM model.
pub mod ram;

/// Top-level simulation harness.
pub mod simulator;

pub use ptw::StubPtw;
pub use ram::SimRam;
pub use simulator::Simulator;
