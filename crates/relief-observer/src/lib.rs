//! Dashboard server for the Relief simulation.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **HTML dashboard** (`GET /`) with the agent status table, the
//!   dispatch flowchart, and the mission chat log
//! - **REST endpoints** for the same data as JSON, plus the persisted
//!   run history
//! - **Run control** (`POST /api/run/start`), idempotent while a run is in
//!   progress
//! - **`WebSocket` endpoint** (`/ws/events`) streaming every simulation
//!   event via [`tokio::sync::broadcast`]
//!
//! # Architecture
//!
//! The server reads from an in-memory [`EventLog`] snapshot that the
//! engine refreshes as events arrive. REST reads never block the
//! simulation loop: the engine only ever `try_write`s the snapshot.
//! Start requests are forwarded to the engine over an mpsc channel,
//! carrying the claimed run slot with them.
//!
//! [`EventLog`]: relief_core::EventLog

pub mod error;
pub mod handlers;
pub mod history;
pub mod operator;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use error::{HistoryError, ObserverError};
pub use history::RunHistory;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use startup::spawn_observer;
pub use state::{AppState, DEFAULT_STEPS, StartRequest};
