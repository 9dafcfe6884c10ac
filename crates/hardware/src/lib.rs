//! False-sharing aware coherence simulator library.
//!
//! This crate replays multi-core memory access traces through one shared,
//! set-associative cache under a simplified MESI protocol:
//! 1. **Cache:** Line arena, replacement policies, and coherence resolution.
//! 2. **Detector:** Confidence counters that flag lines suffering false sharing,
//!    with optional suppression of invalidations on flagged lines.
//! 3. **Simulation:** Trace parsing, replay, and the suspect-event log.
//! 4. **Statistics:** Per-run counters, derived metrics, and baseline/fix comparison.
//!
//! ```
//! use fsim_core::{Config, sim::run_trace_str};
//!
//! let summary = run_trace_str("0 W 0x0\n1 W 0x40\n", &Config::default()).unwrap();
//! assert_eq!(summary.misses, 2);
//! assert_eq!(summary.invalidations, 0);
//! ```

/// Shared cache, line state, detector, and replacement policies.
pub mod cache;
/// Common types (access types, core ids, errors).
pub mod common;
/// Simulator configuration (defaults and JSON loading).
pub mod config;
/// Suspect-event sinks.
pub mod events;
/// Baseline vs. mitigated comparison of run summaries.
pub mod report;
/// Trace parsing and replay.
pub mod sim;
/// Simulation statistics collection and reporting.
pub mod stats;

/// Shared cache; construct with `Cache::new`.
pub use crate::cache::Cache;
/// Error type and result alias.
pub use crate::common::{Result, SimError};
/// Root configuration type; use `Config::default()` or load from JSON.
pub use crate::config::Config;
/// Final per-run statistics.
pub use crate::stats::Summary;
