//! Simulation statistics collection and reporting.
//!
//! This module tracks the coherence metrics of one simulation run. It provides:
//! 1. **Counters:** Instructions, hits/misses, invalidations (charged and avoided), and stalls.
//! 2. **Detector activity:** Suspect lines and suspect events.
//! 3. **Derived metrics:** Invalidations per kilo-instruction and the IPC proxy.
//! 4. **Summary:** A serializable record whose field names are a stable interface.

use serde::{Deserialize, Serialize};

/// Additive counters accumulated while a trace is replayed.
///
/// One accumulator is owned by each run; nothing here is shared between runs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SimStats {
    /// Trace records executed.
    pub instructions: u64,
    /// Accesses that found a valid line.
    pub hits: u64,
    /// Accesses that had to install a line.
    pub misses: u64,
    /// Remote copies invalidated by coherence events.
    pub invalidations: u64,
    /// Invalidations suppressed by the false-sharing mitigation.
    pub avoided_invalidations: u64,
    /// Lines whose confidence crossed the threshold (at most once per line).
    pub suspect_lines: u64,
    /// Cross-core, cross-word conflicts observed by the detector.
    pub suspect_events: u64,
    /// Accumulated latency in cycles.
    pub stall_cycles: u64,
}

impl SimStats {
    /// Invalidations per thousand instructions.
    ///
    /// The instruction count is floored at 1 so an empty run yields 0.0.
    pub const fn ipki(&self) -> f64 {
        self.invalidations as f64 * 1000.0 / self.instructions_floor() as f64
    }

    /// Instructions per accumulated stall cycle, or 0.0 when no cycles were charged.
    pub const fn ipc_proxy(&self) -> f64 {
        if self.stall_cycles == 0 {
            return 0.0;
        }
        self.instructions_floor() as f64 / self.stall_cycles as f64
    }

    #[inline]
    const fn instructions_floor(&self) -> u64 {
        if self.instructions == 0 { 1 } else { self.instructions }
    }

    /// Freezes the counters and computes the derived metrics.
    pub const fn summarize(&self) -> Summary {
        Summary {
            instructions: self.instructions,
            hits: self.hits,
            misses: self.misses,
            invalidations: self.invalidations,
            avoided_invalidations: self.avoided_invalidations,
            suspect_lines: self.suspect_lines,
            suspect_events: self.suspect_events,
            stall_cycles: self.stall_cycles,
            ipki: self.ipki(),
            ipc_proxy: self.ipc_proxy(),
        }
    }
}

/// Final statistics of a run.
///
/// Serialized as a flat JSON object. The field names are consumed by
/// downstream comparison tooling and must not change; fields missing from an
/// older file deserialize as zero.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Summary {
    /// Trace records executed.
    pub instructions: u64,
    /// Accesses that found a valid line.
    pub hits: u64,
    /// Accesses that had to install a line.
    pub misses: u64,
    /// Remote copies invalidated by coherence events.
    pub invalidations: u64,
    /// Invalidations suppressed by the false-sharing mitigation.
    pub avoided_invalidations: u64,
    /// Lines latched as false-sharing suspects.
    pub suspect_lines: u64,
    /// Detector firings.
    pub suspect_events: u64,
    /// Accumulated latency in cycles.
    pub stall_cycles: u64,
    /// Invalidations per thousand instructions.
    pub ipki: f64,
    /// Instructions divided by stall cycles.
    pub ipc_proxy: f64,
}

impl Summary {
    /// Prints a human-readable statistics block to stderr.
    ///
    /// Stdout is reserved for the JSON summary, so the report goes to stderr.
    pub fn print(&self) {
        let instr = self.instructions.max(1) as f64;
        let conflicts = self.invalidations + self.avoided_invalidations;
        let avoided_pct = if conflicts > 0 {
            100.0 * (self.avoided_invalidations as f64 / conflicts as f64)
        } else {
            0.0
        };
        eprintln!("\n==========================================================");
        eprintln!("COHERENCE SIMULATION STATISTICS");
        eprintln!("==========================================================");
        eprintln!("sim_insts                {}", self.instructions);
        eprintln!("sim_stall_cycles         {}", self.stall_cycles);
        eprintln!("sim_ipc_proxy            {:.4}", self.ipc_proxy);
        eprintln!("----------------------------------------------------------");
        eprintln!("CACHE");
        eprintln!(
            "  hits                   {} ({:.2}%)",
            self.hits,
            (self.hits as f64 / instr) * 100.0
        );
        eprintln!(
            "  misses                 {} ({:.2}%)",
            self.misses,
            (self.misses as f64 / instr) * 100.0
        );
        eprintln!("----------------------------------------------------------");
        eprintln!("COHERENCE");
        eprintln!("  invalidations          {}", self.invalidations);
        eprintln!(
            "  avoided                {} ({:.2}% of conflicts)",
            self.avoided_invalidations, avoided_pct
        );
        eprintln!("  ipki                   {:.4}", self.ipki);
        eprintln!("----------------------------------------------------------");
        eprintln!("FALSE SHARING");
        eprintln!("  suspect.lines          {}", self.suspect_lines);
        eprintln!("  suspect.events         {}", self.suspect_events);
        eprintln!("==========================================================");
    }
}
