//! Text-generation backend client for Relief agents.
//!
//! Agents treat generation as an opaque `generate(system, history, task)`
//! service. This crate provides that service: concrete HTTP backends, a
//! scripted offline backend, system prompt rendering, and the rate-limit,
//! timeout, and retry policies wrapped around every call.
//!
//! # Modules
//!
//! - [`client`] -- [`BackendClient`], the shared front end agents call.
//! - [`config`] -- Environment-variable configuration.
//! - [`error`] -- [`ConfigError`] and [`BackendError`].
//! - [`llm`] -- Backend enum dispatch and request/response mapping.
//! - [`prompt`] -- `minijinja` system prompt rendering.
//! - [`ratelimit`] -- Minimum-interval limiter.
//! - [`retry`] -- Exponential backoff policy.

pub mod client;
pub mod config;
pub mod error;
pub mod llm;
pub mod prompt;
pub mod ratelimit;
pub mod retry;

pub use client::BackendClient;
pub use config::{BackendType, LlmBackendConfig, RunnerConfig};
pub use error::{BackendError, ConfigError};
pub use llm::{GenerationRequest, LlmBackend, ScriptedBackend, ScriptedMode};
pub use prompt::{PromptEngine, SystemContext};
pub use ratelimit::{RateLimiter, RatePermit};
pub use retry::ExponentialBackoff;
