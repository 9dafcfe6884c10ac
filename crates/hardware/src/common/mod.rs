//! Common utilities and types used throughout the coherence simulator.
//!
//! This module provides fundamental building blocks that are shared across all components
//! of the simulator. It includes:
//! 1. **Access Types:** Read/write classification and core identifiers.
//! 2. **Error Handling:** The fatal error taxonomy and the crate-wide `Result` alias.

/// Memory access type definitions.
pub mod data;

/// Error types.
pub mod error;

pub use data::{AccessType, CoreId};
pub use error::{Result, SimError, TraceFormatKind};
