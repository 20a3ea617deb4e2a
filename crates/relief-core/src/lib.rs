//! Simulation loop and orchestration for the Relief simulation.
//!
//! This crate owns the tick cycle that drives a disaster-response run:
//! environment evolution, fault injection, role dispatch, and battery
//! drain. Everything observable leaves the loop as a
//! [`SimEvent`](relief_types::SimEvent).
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `relief-config.yaml` into
//!   strongly-typed structs.
//! - [`dispatch`] -- The ordered role dispatch table and task builders.
//! - [`log`] -- [`EventLog`], the transcript, flowchart, and status table
//!   folded from the event stream.
//! - [`operator`] -- [`RunControl`], the one-run-at-a-time guard.
//! - [`runner`] -- [`SimulationCallback`] and [`RunnerError`].
//! - [`simulation`] -- [`Simulation`], the tick loop itself.

pub mod config;
pub mod dispatch;
pub mod log;
pub mod operator;
pub mod runner;
pub mod simulation;

pub use config::SimulationConfig;
pub use log::EventLog;
pub use operator::{RunControl, RunGuard};
pub use runner::{NoOpCallback, RecordingCallback, RunnerError, SimulationCallback};
pub use simulation::{COMPLETION_STATUS, Simulation, SimulationOutcome};
