//! Cache Replacement Policies.
//!
//! Both policies keep one cursor per set and evict the way it points at; they
//! differ in which events advance the cursor.
//!
//! # Policies
//!
//! - `RoundRobin`: the cursor advances on every probe, hits included.
//! - `Fifo`: the cursor advances only when a line is filled.

/// First-In, First-Out replacement policy.
pub mod fifo;

/// Round-robin replacement policy.
pub mod round_robin;

use std::fmt;

pub use fifo::FifoPolicy;
pub use round_robin::RoundRobinPolicy;

use crate::config::ReplacementPolicy as PolicyType;

/// Trait for cache replacement policies.
///
/// Defines the interface for updating cursor state and selecting victim lines.
pub trait ReplacementPolicy: fmt::Debug + Send + Sync {
    /// Updates the policy state when a probe hits.
    ///
    /// # Arguments
    ///
    /// * `set` - The cache set index.
    /// * `way` - The way index within the set that was hit.
    fn on_hit(&mut self, set: usize, way: usize);

    /// Updates the policy state after `way` has been filled on a miss.
    fn on_fill(&mut self, set: usize, way: usize);

    /// Selects a victim line to evict from a specific set.
    ///
    /// # Returns
    ///
    /// The index of the way to evict.
    fn get_victim(&mut self, set: usize) -> usize;
}

/// Builds the policy selected in the configuration.
pub fn build(policy: PolicyType, sets: usize, ways: usize) -> Box<dyn ReplacementPolicy> {
    match policy {
        PolicyType::RoundRobin => Box::new(RoundRobinPolicy::new(sets, ways)),
        PolicyType::Fifo => Box::new(FifoPolicy::new(sets, ways)),
    }
}
