//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during engine startup and run execution.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Simulation configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: relief_core::config::ConfigError,
    },

    /// Backend environment configuration was invalid.
    #[error("backend config error: {source}")]
    BackendConfig {
        /// The underlying runner config error.
        #[from]
        source: relief_runner::ConfigError,
    },

    /// The backend client could not be built.
    #[error("backend error: {source}")]
    Backend {
        /// The underlying backend error.
        #[from]
        source: relief_runner::BackendError,
    },

    /// A simulation run failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: relief_core::RunnerError,
    },

    /// The run launcher channel closed.
    #[error("launcher error: {message}")]
    Launcher {
        /// Description of the launcher failure.
        message: String,
    },

    /// Dashboard server failed to start or stopped.
    #[error("observer error: {message}")]
    Observer {
        /// Description of the observer failure.
        message: String,
    },
}
