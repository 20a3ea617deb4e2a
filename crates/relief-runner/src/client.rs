//! The shared backend client agents call through.
//!
//! [`BackendClient`] wraps one [`LlmBackend`] with the policies every call
//! needs: minimum spacing between calls, a per-attempt deadline, and
//! bounded retry with exponential backoff. One client is shared (behind an
//! `Arc`) by the whole roster, so the rate limit applies roster-wide.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::config::RunnerConfig;
use crate::error::BackendError;
use crate::llm::{GenerationRequest, LlmBackend, ScriptedBackend, ScriptedMode, create_backend};
use crate::prompt::{PromptEngine, SystemContext};
use crate::ratelimit::RateLimiter;
use crate::retry::ExponentialBackoff;

/// Rate-limited, retrying front end to an [`LlmBackend`].
#[derive(Debug)]
pub struct BackendClient {
    backend: LlmBackend,
    prompts: PromptEngine,
    limiter: RateLimiter,
    retry: ExponentialBackoff,
    timeout: Duration,
    attempts: AtomicU64,
}

impl BackendClient {
    /// Build a client from configuration.
    pub fn from_config(config: &RunnerConfig) -> Result<Self, BackendError> {
        let prompts = PromptEngine::new(config.templates_dir.as_deref())?;
        Ok(Self::with_backend(
            create_backend(&config.backend),
            prompts,
            config,
        ))
    }

    /// Offline client around a scripted backend with no spacing or retries.
    pub fn scripted(mode: ScriptedMode) -> Result<Self, BackendError> {
        let config = RunnerConfig::scripted();
        Ok(Self::with_backend(
            LlmBackend::Scripted(ScriptedBackend::new(mode)),
            PromptEngine::new(None)?,
            &config,
        ))
    }

    /// Assemble a client from an explicit backend.
    pub fn with_backend(backend: LlmBackend, prompts: PromptEngine, config: &RunnerConfig) -> Self {
        Self {
            backend,
            prompts,
            limiter: RateLimiter::new(config.min_interval),
            retry: config.retry,
            timeout: config.timeout,
            attempts: AtomicU64::new(0),
        }
    }

    /// Render an agent's system preamble.
    pub fn render_system(&self, context: &SystemContext<'_>) -> Result<String, BackendError> {
        self.prompts.render_system(context)
    }

    /// Generate a response, honouring the rate limit, deadline, and retry
    /// policy.
    ///
    /// Non-retryable failures are returned as-is. Once the attempt budget is
    /// spent the last failure is wrapped in
    /// [`BackendError::RetriesExhausted`].
    pub async fn generate(&self, request: &GenerationRequest) -> Result<String, BackendError> {
        let mut attempt: u32 = 0;
        loop {
            attempt = attempt.saturating_add(1);
            let permit = self.limiter.acquire().await;
            self.attempts.fetch_add(1, Ordering::Relaxed);
            let outcome = tokio::time::timeout(self.timeout, self.backend.complete(request)).await;
            drop(permit);

            let error = match outcome {
                Ok(Ok(text)) => {
                    tracing::debug!(
                        backend = self.backend.name(),
                        attempt,
                        chars = text.len(),
                        "generation succeeded"
                    );
                    return Ok(text);
                }
                Ok(Err(e)) => e,
                Err(_elapsed) => BackendError::Timeout {
                    ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                },
            };

            if !error.is_retryable() {
                return Err(error);
            }
            if !self.retry.should_retry(attempt, &error) {
                return Err(BackendError::RetriesExhausted {
                    attempts: attempt,
                    last: Box::new(error),
                });
            }

            let delay = self.retry.backoff(attempt);
            tracing::warn!(
                backend = self.backend.name(),
                attempt,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %error,
                "generation failed, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Total backend attempts made through this client.
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }

    /// Name of the wrapped backend.
    pub const fn backend_name(&self) -> &'static str {
        self.backend.name()
    }
}
