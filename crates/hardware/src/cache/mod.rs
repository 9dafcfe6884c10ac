//! Shared Set-Associative Cache with MESI Coherence.
//!
//! This module implements the single shared cache level the simulator models.
//! Every line records which cores hold it and in which MESI state, so a write
//! by one core invalidates the copies of the others. A false-sharing detector
//! watches the conflicts, and when mitigation is enabled, invalidations of
//! cross-word conflicts on suspect lines are suppressed and counted as avoided.

/// Cache line state (coherence and detector history).
pub mod line;

/// False-sharing detector.
pub mod detector;

/// Replacement policy implementations (round-robin, FIFO).
pub mod policies;

use tracing::debug;

use self::detector::{Detection, FalseSharingDetector};
use self::line::{CacheLine, MesiState};
use self::policies::ReplacementPolicy;
use crate::common::{AccessType, CoreId, Result};
use crate::config::Config;
use crate::events::EventSink;
use crate::stats::SimStats;

/// Result of a tag lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Probe {
    /// Set the address maps to.
    pub set: usize,
    /// Way that hit, or the victim way that was reset on a miss.
    pub way: usize,
    /// Whether a valid matching line was found.
    pub hit: bool,
}

/// What one access did to the cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccessOutcome {
    /// Whether the access hit.
    pub hit: bool,
    /// Detector verdict, [`Detection::Idle`] when the detector was not consulted.
    pub detection: Detection,
    /// Remote copies invalidated by this access.
    pub invalidated: u64,
    /// Invalidations suppressed by the mitigation.
    pub avoided: u64,
    /// State of the line after the access.
    pub state: MesiState,
}

/// Shared cache: a fixed `sets * ways` arena of lines plus one replacement
/// cursor per set.
#[derive(Debug)]
pub struct Cache {
    lines: Vec<CacheLine>,
    num_sets: usize,
    ways: usize,
    line_bytes: u64,
    word_bytes: u64,
    words_per_line: u64,
    inv_latency: u64,
    miss_latency: u64,
    mitigation: bool,
    detector: FalseSharingDetector,
    policy: Box<dyn ReplacementPolicy>,
}

impl Cache {
    /// Creates an empty cache; every line starts Invalid.
    ///
    /// # Errors
    ///
    /// [`crate::common::SimError::Config`] if the geometry is invalid.
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            lines: vec![CacheLine::default(); config.sets * config.ways],
            num_sets: config.sets,
            ways: config.ways,
            line_bytes: config.line_bytes,
            word_bytes: config.word_bytes,
            words_per_line: config.words_per_line(),
            inv_latency: config.inv_latency,
            miss_latency: config.miss_latency,
            mitigation: config.false_sharing_fix,
            detector: FalseSharingDetector::new(config.fs_threshold),
            policy: policies::build(config.policy, config.sets, config.ways),
        })
    }

    /// Splits an address into its set index and tag.
    ///
    /// The tag is the full line address, so it is unique across sets.
    #[inline]
    pub const fn index_tag(&self, addr: u64) -> (usize, u64) {
        let line_addr = addr / self.line_bytes;
        ((line_addr % self.num_sets as u64) as usize, line_addr)
    }

    /// Word of the line that `addr` falls in.
    #[inline]
    pub const fn word_index(&self, addr: u64) -> u64 {
        (addr / self.word_bytes) % self.words_per_line
    }

    /// All lines of one set.
    pub fn set(&self, set: usize) -> &[CacheLine] {
        let base = set * self.ways;
        &self.lines[base..base + self.ways]
    }

    /// Every line in the cache, set-major.
    pub const fn lines(&self) -> &[CacheLine] {
        self.lines.as_slice()
    }

    /// Finds the valid line holding `addr` without touching replacement state.
    pub fn lookup(&self, addr: u64) -> Option<&CacheLine> {
        let (set, tag) = self.index_tag(addr);
        self.set(set).iter().find(|line| line.matches(tag))
    }

    /// Looks up `addr` and, on a miss, picks and resets a victim.
    ///
    /// The victim keeps its detector history; only its tag, state, owner and
    /// sharers are cleared. The replacement policy is notified on every probe.
    pub fn probe(&mut self, addr: u64) -> Probe {
        let (set, tag) = self.index_tag(addr);
        let base = set * self.ways;

        if let Some(way) = (0..self.ways).find(|&way| self.lines[base + way].matches(tag)) {
            self.policy.on_hit(set, way);
            return Probe {
                set,
                way,
                hit: true,
            };
        }

        let way = self.policy.get_victim(set);
        self.policy.on_fill(set, way);
        self.lines[base + way].evict();
        Probe {
            set,
            way,
            hit: false,
        }
    }

    /// Performs one access by `core`, resolving coherence and charging costs
    /// to `stats`. The per-instruction hit latency is charged by the caller.
    ///
    /// # Errors
    ///
    /// Propagates a failure to write a detector event to `sink`.
    pub fn access(
        &mut self,
        core: CoreId,
        op: AccessType,
        addr: u64,
        stats: &mut SimStats,
        sink: &mut dyn EventSink,
    ) -> Result<AccessOutcome> {
        let word = self.word_index(addr);
        let (_, tag) = self.index_tag(addr);
        let probe = self.probe(addr);

        let detector = self.detector;
        let mitigation = self.mitigation;
        let inv_latency = self.inv_latency;
        let line = &mut self.lines[probe.set * self.ways + probe.way];

        let mut outcome = AccessOutcome {
            hit: probe.hit,
            detection: Detection::Idle,
            invalidated: 0,
            avoided: 0,
            state: MesiState::Invalid,
        };

        if probe.hit {
            match op {
                AccessType::Write => {
                    if line.owned_by_other(core) || line.remote_sharers(core) > 0 {
                        outcome.detection =
                            detector.maybe_detect(line, core, word, stats, sink)?;
                        let count = line.remote_sharers(core);
                        if suppressed(line, mitigation, word) {
                            outcome.avoided = count;
                            let _ = line.sharers.insert(core);
                        } else {
                            outcome.invalidated = count;
                            stats.stall_cycles += inv_latency;
                            line.take_exclusive(core);
                        }
                    }
                    line.owner = Some(core);
                    line.state = MesiState::Modified;
                }
                AccessType::Read => {
                    let remote_owner = line.owner.filter(|&owner| owner != core);
                    if let (MesiState::Modified, Some(prev_owner)) = (line.state, remote_owner) {
                        outcome.detection =
                            detector.maybe_detect(line, core, word, stats, sink)?;
                        if suppressed(line, mitigation, word) {
                            outcome.avoided = 1;
                            let _ = line.sharers.insert(core);
                        } else {
                            outcome.invalidated = 1;
                            stats.stall_cycles += inv_latency;
                            line.take_exclusive(core);
                            let _ = line.sharers.insert(prev_owner);
                        }
                        line.state = MesiState::Shared;
                    } else {
                        let _ = line.sharers.insert(core);
                        if line.state == MesiState::Exclusive && line.sharers.len() > 1 {
                            line.state = MesiState::Shared;
                        }
                    }
                }
            }
            stats.hits += 1;
        } else {
            // The victim was reset by probe, so there is no remote holder to
            // invalidate and the detector sees an Invalid line.
            outcome.detection = detector.maybe_detect(line, core, word, stats, sink)?;
            line.tag = Some(tag);
            line.owner = Some(core);
            line.take_exclusive(core);
            line.state = match op {
                AccessType::Write => MesiState::Modified,
                AccessType::Read => MesiState::Exclusive,
            };
            stats.misses += 1;
            stats.stall_cycles += self.miss_latency;
        }

        if outcome.avoided > 0 {
            debug!(
                addr,
                core,
                %op,
                word,
                state = %line.state,
                avoided = outcome.avoided,
                "invalidation suppressed"
            );
        }
        stats.invalidations += outcome.invalidated;
        stats.avoided_invalidations += outcome.avoided;

        if op.is_write() || line.owner == Some(core) {
            line.record_writer(core, word);
        }
        outcome.state = line.state;
        Ok(outcome)
    }
}

/// Mitigation applies to suspect lines when the requester touches a different
/// word than the line's last writer.
#[inline]
const fn suppressed(line: &CacheLine, mitigation: bool, word: u64) -> bool {
    mitigation && line.fs_suspect && line.last_word != word
}
