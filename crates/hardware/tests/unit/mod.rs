//! # Unit Components
//!
//! Tests grouped by simulator component.

/// Shared cache: probing, replacement, coherence, and the detector.
pub mod cache;


/// Error display and classification.
pub mod error;


/// Baseline vs. fix-up comparison.
pub mod report;
