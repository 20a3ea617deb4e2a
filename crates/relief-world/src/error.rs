//! Error types for the `relief-world` crate.
//!
//! All fallible operations in this crate return [`WorldError`] through the
//! standard [`Result`] type alias.

use relief_types::{Coordinate, SupplyNeed};

/// Errors that can occur while recording completions against the
/// environment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// A rescue was recorded at a location with no outstanding victim.
    #[error("no outstanding victim at {0}")]
    NoVictimAt(Coordinate),

    /// A delivery was recorded for a need that is not outstanding.
    #[error("no outstanding supply need {0}")]
    NoSupplyNeed(SupplyNeed),
}
