//! Round-Robin Replacement Policy.
//!
//! One cursor per set that moves forward on every probe of the set, whether the
//! probe hits or misses. On a miss the victim is the way under the cursor
//! before it moves. Because hits also rotate the cursor, a frequently hit line
//! is not protected from eviction.

use super::ReplacementPolicy;

/// Round-robin policy state.
#[derive(Debug, Clone)]
pub struct RoundRobinPolicy {
    cursor: Vec<usize>,
    ways: usize,
}

impl RoundRobinPolicy {
    /// Creates a round-robin policy with every cursor at way 0.
    pub fn new(sets: usize, ways: usize) -> Self {
        Self {
            cursor: vec![0; sets],
            ways,
        }
    }

    #[inline]
    fn advance(&mut self, set: usize) {
        self.cursor[set] = (self.cursor[set] + 1) % self.ways;
    }
}

impl ReplacementPolicy for RoundRobinPolicy {
    fn on_hit(&mut self, set: usize, _way: usize) {
        self.advance(set);
    }

    fn on_fill(&mut self, set: usize, _way: usize) {
        self.advance(set);
    }

    fn get_victim(&mut self, set: usize) -> usize {
        self.cursor[set]
    }
}
