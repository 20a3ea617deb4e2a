//! Response agents and the standard roster for the Relief simulation.
//!
//! This crate contains the agent layer: state transitions on a single
//! agent (battery, status, location, history, standby queue) and the
//! roster that maps each role to its acting agent. It sits between
//! `relief-runner` (which generates text) and `relief-core` (which decides
//! what each agent is asked to do).
//!
//! # Modules
//!
//! - [`agent`] -- [`ResponseAgent`] and the [`TaskOutcome`] of one turn.
//! - [`config`] -- Task cost and history parameters ([`AgentConfig`]).
//! - [`error`] -- Roster errors ([`AgentError`]).
//! - [`history`] -- [`BoundedHistory`], the fixed-size conversation log.
//! - [`roster`] -- [`Roster`] and the standard seven-role cast.

pub mod agent;
pub mod config;
pub mod error;
pub mod history;
pub mod roster;

// Re-export primary types at crate root for convenience.
pub use agent::{AgentProfile, ResponseAgent, TaskOutcome};
pub use config::AgentConfig;
pub use error::AgentError;
pub use history::BoundedHistory;
pub use roster::{Promotion, Roster};
