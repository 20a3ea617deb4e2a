//! Error types for the relief-agents crate.
//!
//! Battery depletion and inactivity are ordinary state transitions and are
//! reported through [`TaskOutcome`](crate::agent::TaskOutcome), not here.
//! These errors cover roster construction and lookup.

use relief_types::AgentRole;

/// Errors that can occur while building or querying a roster.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AgentError {
    /// Two agents in one roster share a name.
    #[error("duplicate agent name: {0}")]
    DuplicateName(String),

    /// Two primaries were registered for the same role.
    #[error("duplicate role: {0}")]
    DuplicateRole(AgentRole),

    /// No agent fills the requested role.
    #[error("no agent for role: {0}")]
    UnknownRole(AgentRole),
}
