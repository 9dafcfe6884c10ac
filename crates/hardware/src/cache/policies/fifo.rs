//! First-In, First-Out (FIFO) Replacement Policy.
//!
//! This policy evicts the oldest fill in a set, regardless of how recently
//! it was accessed. Hits leave the cursor alone; each fill advances it.
//!
//! # Performance
//!
//! - **Time Complexity:** O(1) for every operation
//! - **Space Complexity:** O(S) where S is the number of sets

use super::ReplacementPolicy;

/// FIFO Policy state.
#[derive(Debug, Clone)]
pub struct FifoPolicy {
    /// Tracks the next way to be evicted for each set.
    next_way: Vec<usize>,
    /// Number of ways in the cache.
    ways: usize,
}

impl FifoPolicy {
    /// Creates a new FIFO policy instance.
    ///
    /// # Arguments
    ///
    /// * `sets` - The number of sets in the cache.
    /// * `ways` - The associativity (number of ways) of the cache.
    pub fn new(sets: usize, ways: usize) -> Self {
        Self {
            next_way: vec![0; sets],
            ways,
        }
    }
}

impl ReplacementPolicy for FifoPolicy {
    fn on_hit(&mut self, _set: usize, _way: usize) {}

    /// Advances the cursor past the way that was just filled.
    fn on_fill(&mut self, set: usize, way: usize) {
        if self.next_way[set] == way {
            self.next_way[set] = (way + 1) % self.ways;
        }
    }

    fn get_victim(&mut self, set: usize) -> usize {
        self.next_way[set]
    }
}
