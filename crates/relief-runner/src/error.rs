//! Error types for the backend client.
//!
//! [`ConfigError`] is fatal and surfaces at startup. [`BackendError`] is
//! scoped to a single generation call: the caller decides whether it ends
//! one agent's turn or the whole run.

/// Errors raised while loading backend configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required variable was not set.
    #[error("missing required env var {0}")]
    MissingVar(&'static str),

    /// `LLM_BACKEND` named a backend this client does not speak.
    #[error("unknown backend type: {0}")]
    UnknownBackend(String),

    /// A numeric variable could not be parsed.
    #[error("invalid {name}: {value:?} ({reason})")]
    InvalidNumber {
        /// Variable name.
        name: &'static str,
        /// Raw value.
        value: String,
        /// Parser message.
        reason: String,
    },
}

/// Errors that can occur while generating a response.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The HTTP request could not be sent or the body could not be read.
    #[error("request failed: {0}")]
    Http(String),

    /// The backend answered with a non-success status.
    #[error("{backend} returned {status}: {body}")]
    Status {
        /// Backend name.
        backend: &'static str,
        /// HTTP status code.
        status: u16,
        /// Response body, as far as it could be read.
        body: String,
    },

    /// The response parsed but carried no text.
    #[error("response missing {0}")]
    MissingContent(&'static str),

    /// A single attempt exceeded its deadline.
    #[error("attempt timed out after {ms} ms")]
    Timeout {
        /// The per-attempt deadline.
        ms: u64,
    },

    /// The system prompt could not be rendered.
    #[error("template error: {0}")]
    Template(String),

    /// The offline scripted backend was told to fail.
    #[error("scripted backend unavailable")]
    Unavailable,

    /// Every attempt failed.
    #[error("gave up after {attempts} attempts: {last}")]
    RetriesExhausted {
        /// Attempts made.
        attempts: u32,
        /// Error from the final attempt.
        last: Box<Self>,
    },
}

impl BackendError {
    /// Whether another attempt could plausibly succeed.
    ///
    /// Transport failures, timeouts, rate limiting (429), and server errors
    /// are transient. Everything else fails the same way on every attempt.
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout { .. } | Self::Unavailable => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::MissingContent(_) | Self::Template(_) | Self::RetriesExhausted { .. } => false,
        }
    }
}
