//! Simulation statistics collection and reporting.
//!
//! This module tracks execution metrics for the emulator. It provides:
//! 1. **Summary:** Steps, retired instructions and host throughput.
//! 2. **Instruction mix:** Halfword vs full-word, memory references, taken branches.
//! 3. **Dispatch:** Traps, interrupts and wait steps.
//! 4. **Mapping:** Context loads, lazy map loads, demand-page faults and translation hits.

use std::time::Instant;

use crate::core::units::mmu::MapCounters;

/// Simulation statistics structure tracking execution metrics.
#[derive(Clone, Debug)]
pub struct SimStats {
    start_time: Instant,
    /// Calls to `Cpu::step`.
    pub steps: u64,
    /// Number of instructions completed.
    pub instructions_retired: u64,

    /// Halfword instructions retired.
    pub inst_half: u64,
    /// Full-word instructions retired.
    pub inst_full: u64,
    /// Instructions that referenced a memory operand.
    pub inst_memory: u64,
    /// Privileged instructions retired.
    pub inst_privileged: u64,
    /// Branches that replaced the PC.
    pub branches_taken: u64,
    /// Halfword no-ops skipped after a left-half instruction.
    pub nops_dropped: u64,

    /// Traps delivered to a handler.
    pub traps_taken: u64,
    /// Arithmetic exception traps among `traps_taken`.
    pub arithmetic_traps: u64,
    /// Interrupts delivered to a handler.
    pub interrupts_taken: u64,
    /// Steps spent in the wait state.
    pub wait_steps: u64,

    /// Map loader invocations that established a context.
    pub context_loads: u64,
    /// Maps loaded one at a time on a translation miss.
    pub lazy_map_loads: u64,
    /// Demand-page faults reported.
    pub demand_page_faults: u64,
    /// Mapped translations that hit a loaded map.
    pub map_hits: u64,
    /// Mapped translations that missed.
    pub map_misses: u64,
}

impl Default for SimStats {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            steps: 0,
            instructions_retired: 0,
            inst_half: 0,
            inst_full: 0,
            inst_memory: 0,
            inst_privileged: 0,
            branches_taken: 0,
            nops_dropped: 0,
            traps_taken: 0,
            arithmetic_traps: 0,
            interrupts_taken: 0,
            wait_steps: 0,
            context_loads: 0,
            lazy_map_loads: 0,
            demand_page_faults: 0,
            map_hits: 0,
            map_misses: 0,
        }
    }
}

/// Section names for selective stats output.
///
/// Pass an empty slice to `print_sections` to print all sections.
pub const STATS_SECTIONS: &[&str] = &["summary", "instruction_mix", "dispatch", "mapping"];

impl SimStats {
    /// Copies the MMU translation counters into the report.
    pub fn sync_mapping(&mut self, counters: &MapCounters) {
        self.context_loads = counters.context_loads;
        self.lazy_map_loads = counters.lazy_loads;
        self.map_hits = counters.hits;
        self.map_misses = counters.misses;
    }

    /// Prints only the requested statistics sections to stdout.
    ///
    /// # Arguments
    ///
    /// * `sections` - Slice of section names to print, or empty for all.
    pub fn print_sections(&self, sections: &[String]) {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);
        let seconds = self.start_time.elapsed().as_secs_f64();
        let instr = self.instructions_retired.max(1) as f64;
        let pct = |n: u64| (n as f64 / instr) * 100.0;

        if want("summary") {
            let mips = if seconds > 0.0 {
                (self.instructions_retired as f64 / seconds) / 1_000_000.0
            } else {
                0.0
            };
            println!("\n==========================================================");
            println!("SEL32 CPU EMULATION STATISTICS");
            println!("==========================================================");
            println!("host_seconds             {seconds:.4} s");
            println!("sim_steps                {}", self.steps);
            println!("sim_insts                {}", self.instructions_retired);
            println!("sim_mips                 {mips:.2}");
            println!("----------------------------------------------------------");
        }
        if want("instruction_mix") {
            println!("INSTRUCTION MIX");
            println!("  op.half                {} ({:.2}%)", self.inst_half, pct(self.inst_half));
            println!("  op.full                {} ({:.2}%)", self.inst_full, pct(self.inst_full));
            println!(
                "  op.memory              {} ({:.2}%)",
                self.inst_memory,
                pct(self.inst_memory)
            );
            println!(
                "  op.privileged          {} ({:.2}%)",
                self.inst_privileged,
                pct(self.inst_privileged)
            );
            println!("  branch.taken           {}", self.branches_taken);
            println!("  nop.dropped            {}", self.nops_dropped);
            println!("----------------------------------------------------------");
        }
        if want("dispatch") {
            println!("DISPATCH");
            println!("  traps                  {}", self.traps_taken);
            println!("  traps.arithmetic       {}", self.arithmetic_traps);
            println!("  interrupts             {}", self.interrupts_taken);
            println!("  wait.steps             {}", self.wait_steps);
            println!("----------------------------------------------------------");
        }
        if want("mapping") {
            let lookups = self.map_hits + self.map_misses;
            let hit_rate = if lookups > 0 {
                (self.map_hits as f64 / lookups as f64) * 100.0
            } else {
                0.0
            };
            println!("MAPPING");
            println!("  maps.context_loads     {}", self.context_loads);
            println!("  maps.lazy_loads        {}", self.lazy_map_loads);
            println!("  maps.demand_faults     {}", self.demand_page_faults);
            println!(
                "  maps.lookups           {lookups:<10} | hits: {:<10} | hit_rate: {hit_rate:.2}%",
                self.map_hits
            );
        }
        println!("==========================================================");
    }

    /// Prints all statistics sections to stdout.
    ///
    /// Equivalent to `print_sections(&[])`.
    pub fn print(&self) {
        self.print_sections(&[]);
    }
}
