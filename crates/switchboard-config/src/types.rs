//! Configuration struct definitions.
//!
//! Every section is `#[serde(default)]`, so a config file only needs to name
//! the fields it changes.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Reasoning backend selection and connection.
    pub model: ModelConfig,
    /// Decision loop behaviour.
    pub engine: EngineSection,
    /// Backoff for transient backend failures.
    pub retry: RetrySection,
    /// Handler selection strategy.
    pub routing: RoutingSection,
    /// Log level, format and per-crate directives.
    pub logging: LoggingSection,
}

// ---------------------------------------------------------------------------
// ModelConfig
// ---------------------------------------------------------------------------

/// Reasoning backend selection and endpoint.
#[derive(Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Provider identifier: `gemini`, `openai`, `lm-studio` or `openai-compat`.
    pub provider: String,
    /// Model name sent to the provider.
    pub model: String,
    /// API key. Prefer `GEMINI_API_KEY` or a `.env` file over storing it here.
    pub api_key: Option<String>,
    /// Full chat-completions URL, overriding the provider default.
    pub api_url: Option<String>,
    /// Maximum tokens per completion.
    pub max_tokens: usize,
    /// Sampling temperature.
    pub temperature: f64,
    /// Per-request HTTP timeout in seconds.
    pub request_timeout_secs: u64,
}

impl std::fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("has_api_key", &self.api_key.is_some())
            .field("api_url", &self.api_url)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl Serialize for ModelConfig {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ModelConfig", 6)?;
        state.serialize_field("provider", &self.provider)?;
        state.serialize_field("model", &self.model)?;
        // api_key is never written out.
        state.serialize_field("api_url", &self.api_url)?;
        state.serialize_field("max_tokens", &self.max_tokens)?;
        state.serialize_field("temperature", &self.temperature)?;
        state.serialize_field("request_timeout_secs", &self.request_timeout_secs)?;
        state.end()
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_owned(),
            model: "gemini-2.0-flash".to_owned(),
            api_key: None,
            api_url: None,
            max_tokens: 1024,
            temperature: 0.2,
            request_timeout_secs: 60,
        }
    }
}

// ---------------------------------------------------------------------------
// EngineSection
// ---------------------------------------------------------------------------

/// What the engine does when the backend answers in free text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectReplySetting {
    /// Use the text as the final output, logging a warning.
    #[default]
    Accept,
    /// Fail the session.
    Reject,
}

/// Decision loop settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    /// Maximum backend round trips per session.
    pub max_steps: usize,
    /// Handling of free-text replies.
    pub direct_reply: DirectReplySetting,
    /// Whole-session timeout in seconds. `0` disables it.
    pub session_timeout_secs: u64,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            max_steps: 10,
            direct_reply: DirectReplySetting::Accept,
            session_timeout_secs: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// RetrySection
// ---------------------------------------------------------------------------

/// Exponential backoff for transient backend failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySection {
    /// Retries after the first attempt.
    pub max_attempts: u32,
    /// Delay before the first retry, in milliseconds.
    pub initial_delay_ms: u64,
    /// Upper bound on any single delay, in milliseconds.
    pub max_delay_ms: u64,
    /// Multiplier applied per retry.
    pub backoff_factor: f64,
    /// Random jitter fraction (0.0 to 1.0).
    pub jitter: f64,
}

impl Default for RetrySection {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 1000,
            max_delay_ms: 30_000,
            backoff_factor: 2.0,
            jitter: 0.2,
        }
    }
}

// ---------------------------------------------------------------------------
// RoutingSection
// ---------------------------------------------------------------------------

/// How a handler is chosen for a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutingStrategy {
    /// Exact issue-type lookup.
    #[default]
    Table,
    /// Ask the backend to hand off, falling back to the table.
    Llm,
}

/// Handler selection settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingSection {
    /// Selection strategy.
    pub strategy: RoutingStrategy,
}

// ---------------------------------------------------------------------------
// LoggingSection
// ---------------------------------------------------------------------------

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Global level filter (`trace`, `debug`, `info`, `warn`, `error`).
    pub level: String,
    /// Output format: `pretty`, `compact`, `json` or `full`.
    pub format: String,
    /// Per-crate directives (e.g. `["switchboard_runtime=debug"]`).
    pub directives: Vec<String>,
    /// Write rolling log files here instead of stderr.
    pub file_dir: Option<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "warn".to_owned(),
            format: "compact".to_owned(),
            directives: Vec::new(),
            file_dir: None,
        }
    }
}
