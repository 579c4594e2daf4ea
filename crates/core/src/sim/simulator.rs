//! Top-level simulation harness.
//!
//! [`Simulator`] owns the front-end together with its external
//! collaborators — the backing RAM behind each MSHR port (with a
//! configurable response latency) and the stub page-table walker — and
//! steps the whole assembly one cycle at a time, collecting the fetch
//! packets the front-end publishes.

use crate::common::PhysAddr;
use crate::config::Config;
use crate::front::signals::{ArchOverride, FetchPacket};
use crate::front::{FrontEnd, FrontInputs};
use crate::riscv::paging::{Pte, Vpn};
use crate::sim::ptw::StubPtw;
use crate::sim::ram::SimRam;

/// The front-end plus everything it talks to.
#[derive(Clone, Debug)]
pub struct Simulator {
    /// The front-end under simulation.
    pub front: FrontEnd,
    /// Backing store behind the fill unit.
    pub ram: SimRam,
    /// Fetch packets collected so far, in delivery order.
    pub packets: Vec<FetchPacket>,
    ptw: StubPtw,
    /// Outstanding line reads: `(address, cycles remaining)` per port.
    mem_ports: Vec<Option<(PhysAddr, u32)>>,
    mem_latency: u32,
    line_words: usize,
    pending_override: Option<ArchOverride>,
}

impl Simulator {
    /// Builds a simulator around a front-end and a backing RAM.
    pub fn new(cfg: Config, ram: SimRam) -> Self {
        let mem_latency = cfg.mem_latency;
        let line_words = cfg.l1i.line_words as usize;
        let front = FrontEnd::new(cfg);
        let ports = front.num_mem_ports();
        Self {
            front,
            ram,
            packets: Vec::new(),
            ptw: StubPtw::new(),
            mem_ports: vec![None; ports],
            mem_latency,
            line_words,
            pending_override: None,
        }
    }

    /// Queues an architectural redirect, presented on the next cycle.
    pub fn redirect(&mut self, pc: u32, passthru: bool) {
        self.pending_override = Some(ArchOverride {
            pc: crate::common::VirtAddr(pc),
            passthru,
        });
    }

    /// Registers an explicit translation with the stub walker.
    pub fn map_page(&mut self, vpn: Vpn, pte: Pte) {
        self.ptw.map(vpn, pte);
    }

    /// Cycles simulated so far.
    pub const fn cycles(&self) -> u64 {
        self.front.stats.cycles
    }

    /// Advances one cycle; returns the packet published this cycle, if any.
    pub fn step(&mut self) -> Option<FetchPacket> {
        let mut inputs = FrontInputs {
            arch_override: self.pending_override.take(),
            tlb_fill: self.ptw.take_fill(),
            mem_resps: vec![None; self.mem_ports.len()],
        };

        // Deliver line reads whose latency has elapsed.
        for (i, port) in self.mem_ports.iter_mut().enumerate() {
            if let Some((addr, 0)) = *port {
                inputs.mem_resps[i] = Some(self.ram.read_line(addr, self.line_words));
                *port = None;
            }
        }

        let out = self.front.tick(&inputs);

        // Accept new line reads and age the outstanding ones.
        for (i, req) in out.mem_reqs.iter().enumerate() {
            if let Some(r) = req {
                if self.mem_ports[i].is_none() {
                    self.mem_ports[i] = Some((r.addr, self.mem_latency));
                }
            }
        }
        for port in &mut self.mem_ports {
            if let Some((_, remaining)) = port {
                *remaining = remaining.saturating_sub(1);
            }
        }

        self.ptw.observe(out.tlb_miss);

        if let Some(packet) = out.packet {
            self.packets.push(packet.clone());
            return Some(packet);
        }
        None
    }

    /// Runs `cycles` cycles.
    pub fn run(&mut self, cycles: u64) {
        for _ in 0..cycles {
            let _ = self.step();
        }
    }

    /// Runs until a packet is published or `max_cycles` elapse.
    pub fn run_until_packet(&mut self, max_cycles: u64) -> Option<FetchPacket> {
        for _ in 0..max_cycles {
            if let Some(p) = self.step() {
                return Some(p);
            }
        }
        None
    }
}
