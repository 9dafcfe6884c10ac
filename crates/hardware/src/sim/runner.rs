//! Trace runner.
//!
//! Replays a trace through the shared cache in a single deterministic pass:
//! 1. **Dispatch:** Each record goes to [`Cache::access`].
//! 2. **Accounting:** Every record counts as one instruction and costs the hit latency,
//!    on top of whatever miss or invalidation cost the cache charged.
//! 3. **Finalization:** Derived metrics are computed once, after the last record.
//!
//! The event sink is closed exactly once when the run ends, whether the trace
//! was replayed completely or aborted on a malformed record.

use std::fs::File;
use std::io::{BufRead, BufReader, Cursor};
use std::path::Path;

use tracing::{info, warn};

use super::trace::{TraceReader, TraceRecord};
use crate::cache::{AccessOutcome, Cache};
use crate::common::{Result, SimError};
use crate::config::Config;
use crate::events::{self, EventSink, NullSink};
use crate::stats::{SimStats, Summary};

/// Cache plus the statistics accumulator of one run.
#[derive(Debug)]
pub struct TraceRunner {
    cache: Cache,
    stats: SimStats,
    hit_latency: u64,
}

impl TraceRunner {
    /// Builds an empty cache for `config`.
    ///
    /// # Errors
    ///
    /// [`SimError::Config`] if the geometry is invalid.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            cache: Cache::new(config)?,
            stats: SimStats::default(),
            hit_latency: config.hit_latency,
        })
    }

    /// Executes one record.
    ///
    /// # Errors
    ///
    /// Propagates a failure to write a detector event to `sink`.
    pub fn step(&mut self, record: &TraceRecord, sink: &mut dyn EventSink) -> Result<AccessOutcome> {
        let outcome = self
            .cache
            .access(record.core, record.op, record.addr, &mut self.stats, sink)?;
        self.stats.instructions += 1;
        self.stats.stall_cycles += self.hit_latency;
        Ok(outcome)
    }

    /// Executes every record of `trace`, stopping at the first error.
    ///
    /// # Errors
    ///
    /// The first [`SimError::TraceFormat`] or I/O failure encountered.
    pub fn replay<I>(&mut self, trace: I, sink: &mut dyn EventSink) -> Result<()>
    where
        I: IntoIterator<Item = Result<TraceRecord>>,
    {
        for record in trace {
            let _ = self.step(&record?, sink)?;
        }
        Ok(())
    }

    /// Counters accumulated so far.
    pub const fn stats(&self) -> &SimStats {
        &self.stats
    }

    /// The cache being driven.
    pub const fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Ends the run and computes the derived metrics.
    pub fn finish(self) -> Summary {
        self.stats.summarize()
    }
}

/// Replays a trace source and closes `sink` once on every path.
///
/// # Errors
///
/// Configuration, trace format, or I/O errors. When the replay fails, the
/// sink is still closed and the replay error is returned.
pub fn run_trace<R: BufRead>(source: R, config: &Config, sink: &mut dyn EventSink) -> Result<Summary> {
    let replayed = replay(source, config, sink);
    let closed = sink.close();
    let summary = replayed?;
    closed?;
    Ok(summary)
}

fn replay<R: BufRead>(source: R, config: &Config, sink: &mut dyn EventSink) -> Result<Summary> {
    let mut runner = TraceRunner::new(config)?;
    info!(
        sets = config.sets,
        ways = config.ways,
        line_bytes = config.line_bytes,
        word_bytes = config.word_bytes,
        fs_threshold = config.fs_threshold,
        mitigation = config.false_sharing_fix,
        "starting trace replay"
    );

    let mut reader = TraceReader::new(source);
    if let Err(e) = runner.replay(&mut reader, sink) {
        warn!(line = reader.line_no(), error = %e, "trace replay aborted");
        return Err(e);
    }

    let summary = runner.finish();
    info!(
        instructions = summary.instructions,
        invalidations = summary.invalidations,
        avoided = summary.avoided_invalidations,
        suspect_lines = summary.suspect_lines,
        "trace replay finished"
    );
    Ok(summary)
}

/// Replays an in-memory trace without an event log.
///
/// # Errors
///
/// As [`run_trace`].
pub fn run_trace_str(trace: &str, config: &Config) -> Result<Summary> {
    run_trace(Cursor::new(trace), config, &mut NullSink)
}

/// Replays the trace file at `trace`, logging detector events to `log` if given.
///
/// # Errors
///
/// [`SimError::Io`] if the trace cannot be opened or the log cannot be
/// created, otherwise as [`run_trace`].
pub fn run_trace_file(trace: &Path, config: &Config, log: Option<&Path>) -> Result<Summary> {
    config.validate()?;
    let file = File::open(trace)
        .map_err(|e| SimError::io(format!("opening trace {}", trace.display()), e))?;
    let mut sink = events::open_sink(log)?;
    run_trace(BufReader::new(file), config, sink.as_mut())
}
