//! Cache line state.
//!
//! A line carries two independent groups of state:
//! 1. **Coherence:** tag, MESI state, owner, and sharer set. Reset on eviction.
//! 2. **Detector history:** last writer, last word, confidence, and the suspect latch.
//!    Kept across eviction, so the slot remembers conflicts of earlier occupants.

use std::collections::BTreeSet;
use std::fmt;

use crate::common::CoreId;
use crate::config::FS_CONF_MAX;

/// MESI coherence state of a line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MesiState {
    /// Held by exactly one core and dirty.
    Modified,
    /// Held by exactly one core and clean.
    Exclusive,
    /// Possibly held by several cores, clean.
    Shared,
    /// Not present.
    #[default]
    Invalid,
}

impl MesiState {
    /// Returns `true` for every state except [`MesiState::Invalid`].
    #[inline(always)]
    pub const fn is_valid(self) -> bool {
        !matches!(self, Self::Invalid)
    }
}

impl fmt::Display for MesiState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Self::Modified => 'M',
            Self::Exclusive => 'E',
            Self::Shared => 'S',
            Self::Invalid => 'I',
        };
        write!(f, "{c}")
    }
}

/// One slot of the shared cache.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheLine {
    /// Line address of the resident line, `None` when the slot is empty.
    pub tag: Option<u64>,
    /// Coherence state.
    pub state: MesiState,
    /// Core holding exclusive or modified access.
    pub owner: Option<CoreId>,
    /// Cores holding a valid copy.
    pub sharers: BTreeSet<CoreId>,
    /// Core that last wrote or took ownership of this slot.
    pub last_writer_core: Option<CoreId>,
    /// Word index touched by `last_writer_core`.
    pub last_word: u64,
    /// Saturating false-sharing confidence in `0..=FS_CONF_MAX`.
    pub fs_conf: u8,
    /// Sticky suspect latch; never cleared within a run.
    pub fs_suspect: bool,
}

impl CacheLine {
    /// Returns `true` if the slot holds `tag` in a valid state.
    #[inline]
    pub const fn matches(&self, tag: u64) -> bool {
        self.state.is_valid() && matches!(self.tag, Some(t) if t == tag)
    }

    /// Clears the coherence state for a new occupant. Detector history is kept.
    pub fn evict(&mut self) {
        self.tag = None;
        self.state = MesiState::Invalid;
        self.owner = None;
        self.sharers.clear();
    }

    /// Returns `true` if a core other than `core` owns the line.
    #[inline]
    pub const fn owned_by_other(&self, core: CoreId) -> bool {
        matches!(self.owner, Some(owner) if owner != core)
    }

    /// Number of sharers other than `core`.
    pub fn remote_sharers(&self, core: CoreId) -> u64 {
        self.sharers.iter().filter(|&&c| c != core).count() as u64
    }

    /// Makes `core` the only holder of the line.
    pub fn take_exclusive(&mut self, core: CoreId) {
        self.sharers.clear();
        let _ = self.sharers.insert(core);
    }

    /// Saturating increment of the confidence counter; returns the new value.
    pub const fn raise_confidence(&mut self) -> u8 {
        if self.fs_conf < FS_CONF_MAX {
            self.fs_conf += 1;
        }
        self.fs_conf
    }

    /// Saturating decrement of the confidence counter.
    pub const fn lower_confidence(&mut self) {
        self.fs_conf = self.fs_conf.saturating_sub(1);
    }

    /// Records `core` touching `word` as the line's latest writer.
    pub const fn record_writer(&mut self, core: CoreId, word: u64) {
        self.last_writer_core = Some(core);
        self.last_word = word;
    }
}
