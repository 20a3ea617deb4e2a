//! LLM backend abstraction and implementations.
//!
//! Defines an enum-based dispatch for LLM backends, avoiding the
//! dyn-compatibility issues with async trait methods. Concrete
//! implementations exist for OpenAI-compatible APIs (Groq is the reference
//! deployment), the Anthropic Messages API, and an offline scripted backend
//! that echoes the task.

use std::time::Duration;

use crate::config::{BackendType, LlmBackendConfig};
use crate::error::BackendError;

/// Sampling temperature for hosted backends.
pub const TEMPERATURE: f64 = 0.7;

/// Response length cap for hosted backends.
pub const MAX_TOKENS: u32 = 1024;

/// One generation call: system preamble, recent agent history, and the
/// task to respond to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// System preamble describing the agent.
    pub system: String,
    /// Most recent history entries, oldest first.
    pub history: Vec<String>,
    /// The task text.
    pub task: String,
}

// ---------------------------------------------------------------------------
// Unified backend enum (dyn-compatible alternative to async trait)
// ---------------------------------------------------------------------------

/// An LLM backend that can turn a [`GenerationRequest`] into text.
#[derive(Debug)]
pub enum LlmBackend {
    /// OpenAI-compatible chat completions API.
    OpenAi(OpenAiBackend),
    /// Anthropic Messages API.
    Anthropic(AnthropicBackend),
    /// Offline echo backend.
    Scripted(ScriptedBackend),
}

impl LlmBackend {
    /// Send a request to the backend and return the response text.
    pub async fn complete(&self, request: &GenerationRequest) -> Result<String, BackendError> {
        match self {
            Self::OpenAi(backend) => backend.complete(request).await,
            Self::Anthropic(backend) => backend.complete(request).await,
            Self::Scripted(backend) => backend.complete(request).await,
        }
    }

    /// Human-readable name for logging.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::OpenAi(_) => "openai-compatible",
            Self::Anthropic(_) => "anthropic",
            Self::Scripted(_) => "scripted",
        }
    }
}

// ---------------------------------------------------------------------------
// OpenAI-compatible backend
// ---------------------------------------------------------------------------

/// Backend for OpenAI-compatible chat completions APIs.
///
/// Sends requests to `{api_url}/chat/completions`. History entries are
/// replayed as assistant messages ahead of the task.
#[derive(Debug)]
pub struct OpenAiBackend {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl OpenAiBackend {
    /// Create a new `OpenAI`-compatible backend.
    pub fn new(config: &LlmBackendConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    async fn complete(&self, request: &GenerationRequest) -> Result<String, BackendError> {
        let url = format!("{}/chat/completions", self.api_url);
        let body = openai_body(&self.model, request);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::Http(format!("OpenAI request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_owned());
            return Err(BackendError::Status {
                backend: "openai-compatible",
                status: status.as_u16(),
                body: error_body,
            });
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| BackendError::Http(format!("OpenAI response parse failed: {e}")))?;

        extract_openai_content(&json)
    }
}

/// Build the chat completions request body.
fn openai_body(model: &str, request: &GenerationRequest) -> serde_json::Value {
    let mut messages = Vec::with_capacity(request.history.len().saturating_add(2));
    messages.push(serde_json::json!({"role": "system", "content": request.system}));
    for entry in &request.history {
        messages.push(serde_json::json!({"role": "assistant", "content": entry}));
    }
    messages.push(serde_json::json!({"role": "user", "content": request.task}));

    serde_json::json!({
        "model": model,
        "messages": messages,
        "temperature": TEMPERATURE,
        "max_tokens": MAX_TOKENS,
    })
}

/// Extract the text content from an `OpenAI` chat completions response.
fn extract_openai_content(json: &serde_json::Value) -> Result<String, BackendError> {
    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
        .ok_or(BackendError::MissingContent("choices[0].message.content"))
}

// ---------------------------------------------------------------------------
// Anthropic Messages API backend
// ---------------------------------------------------------------------------

/// Backend for the Anthropic Messages API.
///
/// The Messages API requires the conversation to open with a user turn, so
/// agent history is folded into the top-level `system` field instead of
/// being replayed as assistant messages.
#[derive(Debug)]
pub struct AnthropicBackend {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl AnthropicBackend {
    /// Create a new Anthropic Messages API backend.
    pub fn new(config: &LlmBackendConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    async fn complete(&self, request: &GenerationRequest) -> Result<String, BackendError> {
        let url = format!("{}/messages", self.api_url);
        let body = anthropic_body(&self.model, request);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::Http(format!("Anthropic request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_owned());
            return Err(BackendError::Status {
                backend: "anthropic",
                status: status.as_u16(),
                body: error_body,
            });
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| BackendError::Http(format!("Anthropic response parse failed: {e}")))?;

        extract_anthropic_content(&json)
    }
}

/// Build the Messages API request body.
fn anthropic_body(model: &str, request: &GenerationRequest) -> serde_json::Value {
    let mut system = request.system.clone();
    if !request.history.is_empty() {
        system.push_str("\n\nRecent log:");
        for entry in &request.history {
            system.push_str("\n- ");
            system.push_str(entry);
        }
    }

    serde_json::json!({
        "model": model,
        "max_tokens": MAX_TOKENS,
        "temperature": TEMPERATURE,
        "system": system,
        "messages": [
            {"role": "user", "content": request.task}
        ]
    })
}

/// Extract the text content from an Anthropic Messages API response.
fn extract_anthropic_content(json: &serde_json::Value) -> Result<String, BackendError> {
    json.get("content")
        .and_then(|c| c.get(0))
        .and_then(|b| b.get("text"))
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
        .ok_or(BackendError::MissingContent("content[0].text"))
}

// ---------------------------------------------------------------------------
// Scripted backend
// ---------------------------------------------------------------------------

/// How the scripted backend answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScriptedMode {
    /// Return the task text unchanged.
    #[default]
    Echo,
    /// Fail every call with [`BackendError::Unavailable`].
    Fail,
}

/// Offline backend for demos and tests.
///
/// An optional latency makes each call take that long, the way a hosted
/// model does.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    mode: ScriptedMode,
    latency: Duration,
}

impl ScriptedBackend {
    /// Create a scripted backend in the given mode.
    pub const fn new(mode: ScriptedMode) -> Self {
        Self {
            mode,
            latency: Duration::ZERO,
        }
    }

    /// Make every call take `latency` before answering.
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    async fn complete(&self, request: &GenerationRequest) -> Result<String, BackendError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        match self.mode {
            ScriptedMode::Echo => Ok(request.task.clone()),
            ScriptedMode::Fail => Err(BackendError::Unavailable),
        }
    }
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// Create an LLM backend from configuration.
pub fn create_backend(config: &LlmBackendConfig) -> LlmBackend {
    match config.backend_type {
        BackendType::OpenAi => LlmBackend::OpenAi(OpenAiBackend::new(config)),
        BackendType::Anthropic => LlmBackend::Anthropic(AnthropicBackend::new(config)),
        BackendType::Scripted => LlmBackend::Scripted(ScriptedBackend::default()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn request() -> GenerationRequest {
        GenerationRequest {
            system: String::from("You are Routes-1."),
            history: vec![String::from("Cleared (4, 4)"), String::from("From Controller: hold")],
            task: String::from("Clear routes: [(5, 0)]"),
        }
    }

    #[test]
    fn extract_openai_content_valid() {
        let json = serde_json::json!({
            "choices": [{
                "message": { "content": "Routes cleared on the east side." }
            }]
        });
        assert_eq!(
            extract_openai_content(&json).unwrap(),
            "Routes cleared on the east side."
        );
    }

    #[test]
    fn extract_openai_content_missing_choices() {
        let json = serde_json::json!({"error": "rate_limit"});
        assert!(matches!(
            extract_openai_content(&json),
            Err(BackendError::MissingContent(_))
        ));
    }

    #[test]
    fn extract_anthropic_content_valid() {
        let json = serde_json::json!({
            "content": [{ "type": "text", "text": "Drone launched." }]
        });
        assert_eq!(extract_anthropic_content(&json).unwrap(), "Drone launched.");
    }

    #[test]
    fn extract_anthropic_content_missing() {
        let json = serde_json::json!({"content": []});
        assert!(extract_anthropic_content(&json).is_err());
    }

    #[test]
    fn openai_body_replays_history_as_assistant() {
        let body = openai_body("deepseek-r1-distill-llama-70b", &request());
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[1]["role"], "assistant");
        assert_eq!(messages[2]["content"], "From Controller: hold");
        assert_eq!(messages[3]["role"], "user");
        assert_eq!(body["max_tokens"], 1024);
    }

    #[test]
    fn anthropic_body_folds_history_into_system() {
        let body = anthropic_body("model", &request());
        let system = body["system"].as_str().unwrap();
        assert!(system.starts_with("You are Routes-1."));
        assert!(system.contains("- Cleared (4, 4)"));
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn scripted_backend_echoes_or_fails() {
        let echo = LlmBackend::Scripted(ScriptedBackend::default());
        assert_eq!(echo.complete(&request()).await.unwrap(), "Clear routes: [(5, 0)]");

        let failing = LlmBackend::Scripted(ScriptedBackend::new(ScriptedMode::Fail));
        assert!(matches!(
            failing.complete(&request()).await,
            Err(BackendError::Unavailable)
        ));
    }

    #[test]
    fn create_backend_dispatches_correctly() {
        let mut config = LlmBackendConfig {
            backend_type: BackendType::OpenAi,
            api_url: "https://api.groq.com/openai/v1".to_owned(),
            api_key: "test".to_owned(),
            model: "test-model".to_owned(),
        };
        assert_eq!(create_backend(&config).name(), "openai-compatible");

        config.backend_type = BackendType::Anthropic;
        assert_eq!(create_backend(&config).name(), "anthropic");

        config.backend_type = BackendType::Scripted;
        assert_eq!(create_backend(&config).name(), "scripted");
    }
}
