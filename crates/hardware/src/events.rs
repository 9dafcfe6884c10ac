//! Suspect-event logging.
//!
//! The detector reports every cross-core, cross-word conflict to an [`EventSink`].
//! Two sinks are provided:
//! 1. [`CsvEventLog`]: writes a header once, then one row per event with ids from 1.
//! 2. [`NullSink`]: discards everything; used when no log destination is configured.
//!
//! The sink is chosen once when a run starts, so the access path never checks
//! whether logging is enabled.

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::common::{CoreId, Result, SimError};

/// Column names of the suspect-event CSV.
pub const CSV_HEADER: &str = "event_id,addr,core,word_idx,prev_core,prev_word,fs_conf,fs_suspect";

/// One detector firing, captured after the confidence update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SuspectEvent {
    /// Line address (the line's tag).
    pub addr: u64,
    /// Requesting core.
    pub core: CoreId,
    /// Word index accessed by the requester.
    pub word_idx: u64,
    /// Core recorded as the previous writer.
    pub prev_core: CoreId,
    /// Word index recorded for the previous writer.
    pub prev_word: u64,
    /// Confidence after this event.
    pub fs_conf: u8,
    /// Suspect latch after this event.
    pub fs_suspect: bool,
}

/// Destination for detector firings.
pub trait EventSink: fmt::Debug {
    /// Appends one event.
    ///
    /// # Errors
    ///
    /// [`SimError::Io`] if the destination cannot be written.
    fn record(&mut self, event: &SuspectEvent) -> Result<()>;

    /// Flushes and releases the destination. Called once at the end of a run.
    ///
    /// # Errors
    ///
    /// [`SimError::Io`] if buffered rows cannot be flushed.
    fn close(&mut self) -> Result<()>;
}

/// Sink used when no event log is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    #[inline(always)]
    fn record(&mut self, _event: &SuspectEvent) -> Result<()> {
        Ok(())
    }

    #[inline(always)]
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// CSV event writer.
#[derive(Debug)]
pub struct CsvEventLog<W: Write> {
    writer: W,
    next_id: u64,
    closed: bool,
}

impl CsvEventLog<BufWriter<File>> {
    /// Creates (or truncates) `path` and writes the header row.
    ///
    /// # Errors
    ///
    /// [`SimError::Io`] if the file cannot be created or written.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)
            .map_err(|e| SimError::io(format!("creating event log {}", path.display()), e))?;
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write + fmt::Debug> CsvEventLog<W> {
    /// Wraps `writer` and writes the header row.
    ///
    /// # Errors
    ///
    /// [`SimError::Io`] if the header cannot be written.
    pub fn new(mut writer: W) -> Result<Self> {
        writeln!(writer, "{CSV_HEADER}").map_err(|e| SimError::io("writing event log header", e))?;
        Ok(Self {
            writer,
            next_id: 1,
            closed: false,
        })
    }

    /// Number of rows written so far.
    pub const fn events_written(&self) -> u64 {
        self.next_id - 1
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + fmt::Debug> EventSink for CsvEventLog<W> {
    fn record(&mut self, event: &SuspectEvent) -> Result<()> {
        if self.closed {
            return Err(SimError::io(
                "writing event log",
                std::io::Error::other("event log already closed"),
            ));
        }
        writeln!(
            self.writer,
            "{},{},{},{},{},{},{},{}",
            self.next_id,
            event.addr,
            event.core,
            event.word_idx,
            event.prev_core,
            event.prev_word,
            event.fs_conf,
            u8::from(event.fs_suspect)
        )
        .map_err(|e| SimError::io("writing event log", e))?;
        self.next_id += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.writer
            .flush()
            .map_err(|e| SimError::io("flushing event log", e))
    }
}

/// Opens the sink for an optional log destination.
///
/// # Errors
///
/// [`SimError::Io`] if `path` is set and cannot be created.
pub fn open_sink(path: Option<&Path>) -> Result<Box<dyn EventSink>> {
    let Some(path) = path else {
        return Ok(Box::new(NullSink));
    };
    Ok(Box::new(CsvEventLog::create(path)?))
}
