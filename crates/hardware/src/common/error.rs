//! Simulator error definitions.
//!
//! Every failure in the simulator is fatal to the current run. This module
//! provides:
//! 1. **Configuration errors:** Invalid geometry or mismatched comparison inputs.
//! 2. **Trace format errors:** A malformed access record, with its line number.
//! 3. **I/O errors:** Trace, event log, summary, or config destinations that cannot be used.

use std::io;

use thiserror::Error;

/// Reason a single trace record could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraceFormatKind {
    /// Records need exactly `<core> <op> <address>`.
    #[error("expected 3 fields, found {0}")]
    WrongTokenCount(usize),

    /// Core id is not a non-negative integer.
    #[error("invalid core id `{0}`")]
    InvalidCore(String),

    /// Operation does not start with `R` or `W`.
    #[error("unrecognized operation `{0}`")]
    InvalidOperation(String),

    /// Address is neither decimal nor `0x`-prefixed hex.
    #[error("unparsable address `{0}`")]
    InvalidAddress(String),
}

/// Top-level simulator error.
#[derive(Debug, Error)]
pub enum SimError {
    /// Invalid or inconsistent configuration, reported before any processing.
    #[error("configuration error: {0}")]
    Config(String),

    /// Malformed trace record; aborts the run.
    #[error("trace line {line}: {kind} in `{text}`")]
    TraceFormat {
        /// 1-based line number in the trace source.
        line: usize,
        /// The offending line, trimmed.
        text: String,
        /// What was wrong with it.
        kind: TraceFormatKind,
    },

    /// A trace, log, summary, or config destination could not be used.
    #[error("{context}: {source}")]
    Io {
        /// What was being accessed when the error occurred.
        context: String,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// A JSON config or summary could not be encoded or decoded.
    #[error("{context}: {source}")]
    Json {
        /// What was being encoded or decoded.
        context: String,
        /// Underlying serde failure.
        #[source]
        source: serde_json::Error,
    },
}

impl SimError {
    /// Wraps an I/O error with a short description of the failed operation.
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Wraps a `serde_json` error with a short description of the failed operation.
    pub fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }

    /// Returns `true` for malformed trace records.
    pub const fn is_trace_format(&self) -> bool {
        matches!(self, Self::TraceFormat { .. })
    }
}

/// Result alias used throughout the simulator.
pub type Result<T> = std::result::Result<T, SimError>;
