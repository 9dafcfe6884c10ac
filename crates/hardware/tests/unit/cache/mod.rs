//! Shared cache unit tests.

/// Probing, eviction, and coherence transitions.
pub mod cache_sim;
