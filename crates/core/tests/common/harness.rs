//! Simulator construction and stepping helpers.

use rvfront_core::common::PhysAddr;
use rvfront_core::front::ftq::FtqState;
use rvfront_core::front::signals::FetchPacket;
use rvfront_core::sim::ram::SimRam;
use rvfront_core::{Config, Simulator};

/// RAM size used by every harness simulator.
pub const RAM_SIZE: usize = 1 << 20;

/// Builds a simulator over a zero-filled RAM based at physical 0.
pub fn sim_with(cfg: Config) -> Simulator {
    cfg.validate().unwrap();
    Simulator::new(cfg, SimRam::new(0, RAM_SIZE))
}

/// Builds a simulator with the default configuration.
pub fn default_sim() -> Simulator {
    sim_with(Config::default())
}

/// Writes consecutive words into the simulator's RAM.
pub fn write_words(sim: &mut Simulator, addr: u64, words: &[u32]) {
    for (i, &w) in words.iter().enumerate() {
        sim.ram.write_word(PhysAddr::new(addr + (i * 4) as u64), w);
    }
}

/// Fills a whole cacheline with copies of one word.
pub fn write_line(sim: &mut Simulator, addr: u64, word: u32) {
    let words = sim.front.config().l1i.line_words as usize;
    write_words(sim, addr, &vec![word; words]);
}

/// Steps once and checks the structural invariants that must hold at
/// every cycle boundary.
pub fn step_checked(sim: &mut Simulator) -> Option<FetchPacket> {
    let packet = sim.step();
    let ftq = &sim.front.ftq;
    let depth = sim.front.config().ftq_depth as usize;
    assert!(ftq.used() <= depth, "FTQ occupancy exceeded depth");
    let fetching = ftq
        .entries()
        .iter()
        .filter(|e| e.valid && !e.complete && e.state == FtqState::Fetch)
        .count();
    assert!(
        fetching <= 1,
        "more than one FTQ entry in the Fetch state: {fetching}"
    );
    packet
}

/// Runs up to `max_cycles` checked steps, returning the first packet.
pub fn run_until_packet_checked(sim: &mut Simulator, max_cycles: u64) -> Option<FetchPacket> {
    for _ in 0..max_cycles {
        if let Some(p) = step_checked(sim) {
            return Some(p);
        }
    }
    None
}
