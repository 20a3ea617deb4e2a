//! Configuration types for the backend client.
//!
//! All configuration is loaded from environment variables: which backend
//! to talk to (with its URL, API key, and model), how hard to rate-limit,
//! and how long to wait and retry.

use std::time::Duration;

use crate::error::ConfigError;
use crate::retry::ExponentialBackoff;

/// Default model for the Groq deployment.
pub const DEFAULT_MODEL: &str = "deepseek-r1-distill-llama-70b";

/// Default Groq `OpenAI`-compatible endpoint.
pub const GROQ_API_URL: &str = "https://api.groq.com/openai/v1";

const OPENAI_API_URL: &str = "https://api.openai.com/v1";
const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1";

/// Complete backend client configuration.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Which backend to call and how to reach it.
    pub backend: LlmBackendConfig,
    /// Minimum spacing between consecutive calls through one client.
    pub min_interval: Duration,
    /// Deadline for a single attempt.
    pub timeout: Duration,
    /// Retry schedule for failed attempts.
    pub retry: ExponentialBackoff,
    /// Directory holding prompt template overrides, if any.
    pub templates_dir: Option<String>,
}

/// Configuration for a single LLM backend.
#[derive(Debug, Clone)]
pub struct LlmBackendConfig {
    /// The backend type.
    pub backend_type: BackendType,
    /// Base API URL (e.g. `https://api.groq.com/openai/v1`).
    pub api_url: String,
    /// API key for authentication. Empty for the scripted backend.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
}

/// Supported LLM backend types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// `OpenAI`-compatible chat completions (`OpenAI`, Groq, Ollama).
    OpenAi,
    /// Anthropic Messages API.
    Anthropic,
    /// Offline backend that echoes the task. Needs no credentials.
    Scripted,
}

impl RunnerConfig {
    /// Offline configuration: scripted backend, no spacing, no retries.
    pub fn scripted() -> Self {
        Self {
            backend: LlmBackendConfig {
                backend_type: BackendType::Scripted,
                api_url: String::new(),
                api_key: String::new(),
                model: String::from("scripted"),
            },
            min_interval: Duration::ZERO,
            timeout: Duration::from_secs(30),
            retry: ExponentialBackoff {
                max_attempts: 1,
                ..ExponentialBackoff::default()
            },
            templates_dir: None,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// - `LLM_BACKEND` -- `groq` (default), `openai`, `anthropic`, or `scripted`
    /// - `LLM_API_URL` -- base URL (defaults per backend)
    /// - `LLM_API_KEY` -- required unless scripted; `GROQ_API_KEY` is accepted
    /// - `LLM_MODEL` -- model name (default `deepseek-r1-distill-llama-70b`)
    /// - `LLM_MIN_INTERVAL_MS` -- call spacing (default 20000)
    /// - `LLM_TIMEOUT_MS` -- per-attempt deadline (default 30000)
    /// - `LLM_MAX_ATTEMPTS` -- attempts per call (default 3)
    /// - `LLM_BACKOFF_MS` -- base backoff (default 1000)
    /// - `TEMPLATES_DIR` -- prompt template override directory
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend_str = lookup("LLM_BACKEND").unwrap_or_else(|| "groq".to_owned());
        let (backend_type, default_url) = match backend_str.to_lowercase().as_str() {
            "groq" => (BackendType::OpenAi, GROQ_API_URL),
            "openai" | "ollama" => (BackendType::OpenAi, OPENAI_API_URL),
            "anthropic" => (BackendType::Anthropic, ANTHROPIC_API_URL),
            "scripted" => (BackendType::Scripted, ""),
            other => return Err(ConfigError::UnknownBackend(other.to_owned())),
        };

        let api_key = match backend_type {
            BackendType::Scripted => String::new(),
            BackendType::OpenAi | BackendType::Anthropic => lookup("LLM_API_KEY")
                .or_else(|| lookup("GROQ_API_KEY"))
                .ok_or(ConfigError::MissingVar("LLM_API_KEY"))?,
        };

        let backend = LlmBackendConfig {
            backend_type,
            api_url: lookup("LLM_API_URL").unwrap_or_else(|| default_url.to_owned()),
            api_key,
            model: lookup("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_owned()),
        };

        let min_interval_ms = parse_or(&lookup, "LLM_MIN_INTERVAL_MS", 20_000)?;
        let timeout_ms = parse_or(&lookup, "LLM_TIMEOUT_MS", 30_000)?;
        let max_attempts = parse_or(&lookup, "LLM_MAX_ATTEMPTS", 3)?;
        let base_backoff_ms = parse_or(&lookup, "LLM_BACKOFF_MS", 1_000)?;

        Ok(Self {
            backend,
            min_interval: Duration::from_millis(min_interval_ms),
            timeout: Duration::from_millis(timeout_ms),
            retry: ExponentialBackoff {
                max_attempts: u32::try_from(max_attempts.max(1)).unwrap_or(u32::MAX),
                base_backoff_ms,
                ..ExponentialBackoff::default()
            },
            templates_dir: lookup("TEMPLATES_DIR"),
        })
    }
}

/// Parse an optional numeric variable, falling back to `default`.
fn parse_or<F>(lookup: &F, name: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).map_or(Ok(default), |raw| {
        raw.trim().parse().map_err(|e: std::num::ParseIntError| {
            ConfigError::InvalidNumber {
                name,
                value: raw.clone(),
                reason: e.to_string(),
            }
        })
    })
}
