//! False-sharing detector.
//!
//! A heuristic run on the cache access path before the coherence state changes.
//! A conflict is signalled when the line's recorded writer is a different core
//! that touched a different word than the requester. Each conflict raises a
//! saturating confidence counter; anything else lowers it. Crossing the
//! configured threshold latches the line as a suspect for the rest of the run.

use tracing::debug;

use super::line::CacheLine;
use crate::common::{CoreId, Result};
use crate::events::{EventSink, SuspectEvent};
use crate::stats::SimStats;

/// Outcome of one detector invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Detection {
    /// The line is Invalid; there is no history to compare against.
    Idle,
    /// Same core, same word, or no previous writer; confidence was lowered.
    Benign,
    /// Cross-core, cross-word conflict; confidence was raised and the event logged.
    Conflict {
        /// This conflict pushed the line over the threshold.
        newly_suspect: bool,
    },
}

/// Confidence-counter detector with a fixed suspect threshold.
#[derive(Clone, Copy, Debug)]
pub struct FalseSharingDetector {
    threshold: u8,
}

impl FalseSharingDetector {
    /// Creates a detector that marks lines suspect at `threshold` confidence.
    pub const fn new(threshold: u8) -> Self {
        Self { threshold }
    }

    /// Returns the configured threshold.
    pub const fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Compares the requester against the line's history and updates the
    /// confidence counter, suspect latch, statistics, and event log.
    ///
    /// # Errors
    ///
    /// Propagates a failure to write the event to `sink`.
    pub fn maybe_detect(
        &self,
        line: &mut CacheLine,
        core: CoreId,
        word: u64,
        stats: &mut SimStats,
        sink: &mut dyn EventSink,
    ) -> Result<Detection> {
        let Some(addr) = line.tag.filter(|_| line.state.is_valid()) else {
            return Ok(Detection::Idle);
        };

        let prev = line
            .last_writer_core
            .filter(|&prev| prev != core && line.last_word != word);
        let Some(prev_core) = prev else {
            line.lower_confidence();
            return Ok(Detection::Benign);
        };

        let conf = line.raise_confidence();
        let newly_suspect = conf >= self.threshold && !line.fs_suspect;
        if newly_suspect {
            line.fs_suspect = true;
            stats.suspect_lines += 1;
            debug!(
                addr,
                core,
                prev_core,
                conf,
                threshold = self.threshold(),
                "line marked false-sharing suspect"
            );
        }

        sink.record(&SuspectEvent {
            addr,
            core,
            word_idx: word,
            prev_core,
            prev_word: line.last_word,
            fs_conf: conf,
            fs_suspect: line.fs_suspect,
        })?;
        stats.suspect_events += 1;

        Ok(Detection::Conflict { newly_suspect })
    }
}
