//! Front-end statistics collection and reporting.
//!
//! Tracks per-event counters across the fetch path. It provides:
//! 1. **Throughput:** Cycles, FTQ allocations, and emitted fetch packets.
//! 2. **Demand path:** L1I hits/misses, TLB misses, and stall cycles.
//! 3. **Prefetch path:** Probes, probe hits, and prefetch-sourced fills.
//! 4. **Control flow:** Resteers by kind and RAP push/pop/overflow counts.

use std::fmt;

/// Counters for everything the front-end does.
#[derive(Clone, Debug, Default)]
pub struct FrontStats {
    /// Total cycles ticked.
    pub cycles: u64,

    /// FTQ entries allocated.
    pub ftq_allocs: u64,
    /// Allocation requests dropped because the FTQ was full.
    pub ftq_alloc_dropped: u64,
    /// Fetch packets delivered to the decode interface.
    pub packets: u64,

    /// Demand accesses that hit in the L1I.
    pub demand_l1_hits: u64,
    /// Demand accesses that missed in the L1I.
    pub demand_l1_misses: u64,
    /// Demand accesses that missed in the TLB.
    pub demand_tlb_misses: u64,
    /// Cycles the demand pipe spent stalled for a fill.
    pub demand_stall_cycles: u64,

    /// Prefetch probes issued.
    pub prefetch_probes: u64,
    /// Prefetch probes that hit in the L1I.
    pub prefetch_hits: u64,
    /// Prefetch probes that missed in the TLB.
    pub prefetch_tlb_misses: u64,

    /// Fills completed on behalf of demand fetch.
    pub fills_demand: u64,
    /// Fills completed on behalf of prefetch.
    pub fills_prefetch: u64,

    /// Resteers caused by direct jumps.
    pub resteer_jump: u64,
    /// Resteers caused by direct calls.
    pub resteer_call: u64,
    /// Resteers caused by returns.
    pub resteer_ret: u64,

    /// Addresses pushed onto the return-address stack.
    pub rap_pushes: u64,
    /// Addresses popped off the return-address stack.
    pub rap_pops: u64,
    /// Pushes that wrapped a full stack.
    pub rap_overflows: u64,
    /// Pops that wrapped an empty stack.
    pub rap_underflows: u64,
}

impl FrontStats {
    /// Total resteers of any kind.
    pub const fn resteers(&self) -> u64 {
        self.resteer_jump + self.resteer_call + self.resteer_ret
    }

    /// Demand L1I hit rate over all demand accesses, if any occurred.
    pub fn demand_hit_rate(&self) -> Option<f64> {
        let total = self.demand_l1_hits + self.demand_l1_misses;
        if total == 0 {
            None
        } else {
            Some(self.demand_l1_hits as f64 / total as f64)
        }
    }
}

impl fmt::Display for FrontStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "cycles:              {}", self.cycles)?;
        writeln!(f, "ftq allocations:     {}", self.ftq_allocs)?;
        writeln!(f, "ftq drops (full):    {}", self.ftq_alloc_dropped)?;
        writeln!(f, "fetch packets:       {}", self.packets)?;
        writeln!(f, "demand L1I hits:     {}", self.demand_l1_hits)?;
        writeln!(f, "demand L1I misses:   {}", self.demand_l1_misses)?;
        if let Some(rate) = self.demand_hit_rate() {
            writeln!(f, "demand hit rate:     {:.2}%", rate * 100.0)?;
        }
        writeln!(f, "demand TLB misses:   {}", self.demand_tlb_misses)?;
        writeln!(f, "demand stall cycles: {}", self.demand_stall_cycles)?;
        writeln!(f, "prefetch probes:     {}", self.prefetch_probes)?;
        writeln!(f, "prefetch hits:       {}", self.prefetch_hits)?;
        writeln!(f, "prefetch TLB misses: {}", self.prefetch_tlb_misses)?;
        writeln!(f, "fills (demand):      {}", self.fills_demand)?;
        writeln!(f, "fills (prefetch):    {}", self.fills_prefetch)?;
        writeln!(
            f,
            "resteers:            {} (jump {}, call {}, ret {})",
            self.resteers(),
            self.resteer_jump,
            self.resteer_call,
            self.resteer_ret
        )?;
        writeln!(
            f,
            "rap:                 {} pushes, {} pops, {} overflows, {} underflows",
            self.rap_pushes, self.rap_pops, self.rap_overflows, self.rap_underflows
        )
    }
}
