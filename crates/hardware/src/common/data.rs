//! Memory Access Types.
//!
//! This module defines the classification of trace accesses used throughout the simulator.
//! These types are used for the following:
//! 1. **Coherence Resolution:** Reads may share a line, writes take ownership of it.
//! 2. **Trace Parsing:** Mapping the `R`/`W` operation field onto a typed access.
//! 3. **Detector History:** Writes always refresh the line's last-writer record.

use std::fmt;

/// Identifier of a simulated core, as it appears in the trace.
pub type CoreId = u32;

/// Type of memory access operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessType {
    /// Data read access.
    ///
    /// Joins the sharer set of a valid line, or installs the line as Exclusive on a miss.
    Read,

    /// Data write access.
    ///
    /// Takes ownership of the line and leaves it Modified.
    Write,
}

impl AccessType {
    /// Parses a trace operation token.
    ///
    /// Only the first letter is significant and matching is case-insensitive,
    /// so `r`, `R`, `read` and `Rd` all yield [`AccessType::Read`].
    ///
    /// # Returns
    ///
    /// `None` when the token does not start with `R` or `W`.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.chars().next()?.to_ascii_uppercase() {
            'R' => Some(Self::Read),
            'W' => Some(Self::Write),
            _ => None,
        }
    }

    /// Returns `true` for [`AccessType::Write`].
    #[inline(always)]
    pub const fn is_write(self) -> bool {
        matches!(self, Self::Write)
    }
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "R"),
            Self::Write => write!(f, "W"),
        }
    }
}
