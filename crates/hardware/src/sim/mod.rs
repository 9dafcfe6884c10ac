//! Trace-driven simulation.
//!
//! Provides trace parsing and the runner that replays a trace through the
//! shared cache and produces the run's summary statistics.

/// Trace record parsing.
pub mod trace;

/// Trace replay and statistics finalization.
pub mod runner;

pub use runner::{TraceRunner, run_trace, run_trace_file, run_trace_str};
pub use trace::{TraceReader, TraceRecord};
