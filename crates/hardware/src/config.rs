//! Configuration system for the coherence simulator.
//!
//! This module defines the configuration structure and enums used to parameterize
//! the simulator. It provides:
//! 1. **Defaults:** Baseline geometry, latencies, and detector settings.
//! 2. **Structure:** A flat `Config` that is immutable for the duration of a run.
//! 3. **Enums:** Replacement policy selection.
//!
//! Configuration is built from `Config::default()` plus command-line overrides, or
//! deserialized from a (possibly partial) JSON document.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::common::{Result, SimError};

/// Default configuration constants for the simulator.
///
/// These values define the baseline cache when not explicitly overridden.
mod defaults {
    /// Cache line size in bytes.
    pub const LINE_BYTES: u64 = 64;

    /// Number of sets in the shared cache.
    pub const SETS: usize = 64;

    /// Associativity (lines per set).
    pub const WAYS: usize = 8;

    /// Word granularity used by the false-sharing detector.
    pub const WORD_BYTES: u64 = 4;

    /// Confidence a line must reach before it is marked suspect.
    pub const FS_THRESHOLD: u8 = 2;

    /// Cycles charged for every instruction.
    pub const HIT_LATENCY: u64 = 4;

    /// Additional cycles charged on a miss.
    pub const MISS_LATENCY: u64 = 40;

    /// Additional cycles charged when remote copies are invalidated.
    pub const INV_LATENCY: u64 = 10;
}

/// Highest value the per-line false-sharing confidence counter can hold.
pub const FS_CONF_MAX: u8 = 3;

/// Cache replacement cursor behaviour.
///
/// Both variants keep one cursor per set and evict the way it points at.
/// They differ only in whether a hit moves the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub enum ReplacementPolicy {
    /// The cursor advances on every probe, hit or miss.
    #[default]
    RoundRobin,
    /// The cursor advances only when a line is filled.
    #[serde(alias = "FIFO")]
    Fifo,
}

/// Root configuration structure containing all simulator settings.
///
/// # Examples
///
/// ```
/// use fsim_core::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.line_bytes, 64);
/// assert_eq!(config.words_per_line(), 16);
/// ```
///
/// Partial JSON keeps the defaults for omitted fields:
///
/// ```
/// use fsim_core::config::{Config, ReplacementPolicy};
///
/// let config = Config::from_json_str(r#"{ "sets": 4, "policy": "Fifo" }"#).unwrap();
/// assert_eq!(config.sets, 4);
/// assert_eq!(config.ways, 8);
/// assert_eq!(config.policy, ReplacementPolicy::Fifo);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Cache line size in bytes.
    #[serde(default = "Config::default_line_bytes")]
    pub line_bytes: u64,

    /// Number of sets.
    #[serde(default = "Config::default_sets")]
    pub sets: usize,

    /// Associativity (ways per set).
    #[serde(default = "Config::default_ways")]
    pub ways: usize,

    /// Word size in bytes; accesses are attributed to `(addr / word_bytes) % words_per_line`.
    #[serde(default = "Config::default_word_bytes")]
    pub word_bytes: u64,

    /// Confidence threshold at which a line is latched as a false-sharing suspect.
    #[serde(default = "Config::default_fs_threshold")]
    pub fs_threshold: u8,

    /// Suppress invalidations of cross-word conflicts on suspect lines.
    #[serde(default)]
    pub false_sharing_fix: bool,

    /// Cycles charged per instruction.
    #[serde(default = "Config::default_hit_latency")]
    pub hit_latency: u64,

    /// Cycles charged per miss, on top of `hit_latency`.
    #[serde(default = "Config::default_miss_latency")]
    pub miss_latency: u64,

    /// Cycles charged per invalidating coherence event.
    #[serde(default = "Config::default_inv_latency")]
    pub inv_latency: u64,

    /// Replacement cursor behaviour.
    #[serde(default)]
    pub policy: ReplacementPolicy,
}

impl Config {
    const fn default_line_bytes() -> u64 {
        defaults::LINE_BYTES
    }

    const fn default_sets() -> usize {
        defaults::SETS
    }

    const fn default_ways() -> usize {
        defaults::WAYS
    }

    const fn default_word_bytes() -> u64 {
        defaults::WORD_BYTES
    }

    const fn default_fs_threshold() -> u8 {
        defaults::FS_THRESHOLD
    }

    const fn default_hit_latency() -> u64 {
        defaults::HIT_LATENCY
    }

    const fn default_miss_latency() -> u64 {
        defaults::MISS_LATENCY
    }

    const fn default_inv_latency() -> u64 {
        defaults::INV_LATENCY
    }

    /// Number of detector words in one cache line.
    #[inline]
    pub const fn words_per_line(&self) -> u64 {
        self.line_bytes / self.word_bytes
    }

    /// Checks the geometry for values the cache cannot be built from.
    ///
    /// A threshold above [`FS_CONF_MAX`] is accepted but logged, since no line
    /// can ever become suspect under it.
    ///
    /// # Errors
    ///
    /// [`SimError::Config`] when any geometry field is zero, or when the word
    /// size does not evenly divide the line size.
    pub fn validate(&self) -> Result<()> {
        if self.line_bytes == 0 || self.sets == 0 || self.ways == 0 {
            return Err(SimError::Config(format!(
                "cache geometry must be non-zero (line_bytes={}, sets={}, ways={})",
                self.line_bytes, self.sets, self.ways
            )));
        }
        if self.word_bytes == 0 || self.word_bytes > self.line_bytes {
            return Err(SimError::Config(format!(
                "word_bytes must be in 1..={} (got {})",
                self.line_bytes, self.word_bytes
            )));
        }
        if !self.line_bytes.is_multiple_of(self.word_bytes) {
            return Err(SimError::Config(format!(
                "line_bytes ({}) is not a multiple of word_bytes ({})",
                self.line_bytes, self.word_bytes
            )));
        }
        if self.fs_threshold > FS_CONF_MAX {
            warn!(
                threshold = self.fs_threshold,
                max = FS_CONF_MAX,
                "fs_threshold exceeds the confidence ceiling; no line will become suspect"
            );
        }
        Ok(())
    }

    /// Parses a JSON configuration, filling omitted fields with defaults.
    ///
    /// # Errors
    ///
    /// [`SimError::Json`] on malformed JSON, [`SimError::Config`] if the
    /// resulting geometry fails [`Config::validate`].
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| SimError::json("parsing config", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a JSON configuration file.
    ///
    /// # Errors
    ///
    /// [`SimError::Io`] if the file cannot be read, otherwise as [`Config::from_json_str`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| SimError::io(format!("reading config {}", path.display()), e))?;
        Self::from_json_str(&text)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            line_bytes: defaults::LINE_BYTES,
            sets: defaults::SETS,
            ways: defaults::WAYS,
            word_bytes: defaults::WORD_BYTES,
            fs_threshold: defaults::FS_THRESHOLD,
            false_sharing_fix: false,
            hit_latency: defaults::HIT_LATENCY,
            miss_latency: defaults::MISS_LATENCY,
            inv_latency: defaults::INV_LATENCY,
            policy: ReplacementPolicy::default(),
        }
    }
}
