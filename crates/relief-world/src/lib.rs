//! The disaster environment for the Relief simulation.
//!
//! This crate models the 2-D disaster grid: affected areas, blocked routes,
//! victims, and supply needs, evolving once per tick according to the
//! disaster type. Completions (rescues, deliveries) are recorded here and
//! validated against what is actually outstanding.
//!
//! # Modules
//!
//! - [`environment`] -- [`DisasterEnvironment`] with per-disaster evolution
//!   rules driven by a caller-supplied RNG.
//! - [`error`] -- Error types for completion bookkeeping.

pub mod environment;
pub mod error;

// Re-export primary types at crate root.
pub use environment::{DisasterEnvironment, random_cell};
pub use error::WorldError;
