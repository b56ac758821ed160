//! Reasoning backend trait.
//!
//! Defines the interface that every backend must implement. The engine and
//! the optional backend-driven router only ever see this trait; concrete
//! clients are injected at construction time.

use async_trait::async_trait;

use crate::error::LlmResult;
use crate::types::{LlmResponse, LlmToolDefinition, Message};

/// Reasoning backend trait.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get the provider name.
    fn name(&self) -> &str;

    /// Get the model being used.
    fn model(&self) -> &str;

    /// Complete without streaming.
    ///
    /// `tools` is the complete set of tools the backend may call for this
    /// request; `system` carries the instructions.
    async fn complete(
        &self,
        messages: &[Message],
        tools: &[LlmToolDefinition],
        system: &str,
    ) -> LlmResult<LlmResponse>;

    /// Simple text completion (no tools).
    async fn complete_simple(&self, prompt: &str) -> LlmResult<String> {
        let messages = vec![Message::user(prompt)];
        let response = self.complete(&messages, &[], "").await?;
        Ok(response.message.text().unwrap_or("").to_string())
    }
}

/// Blanket implementation allowing `Box<dyn LlmProvider>` to be used wherever
/// `P: LlmProvider` is required (e.g. `Engine<P>`).
#[async_trait]
impl LlmProvider for Box<dyn LlmProvider> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn model(&self) -> &str {
        (**self).model()
    }

    async fn complete(
        &self,
        messages: &[Message],
        tools: &[LlmToolDefinition],
        system: &str,
    ) -> LlmResult<LlmResponse> {
        (**self).complete(messages, tools, system).await
    }
}

/// Connection settings for a reasoning backend.
#[derive(Clone)]
pub struct ProviderConfig {
    /// Provider identifier (`gemini`, `openai`, `lm-studio`, `openai-compat`).
    pub provider: String,
    /// API key.
    pub api_key: String,
    /// Model name.
    pub model: String,
    /// Maximum tokens to generate.
    pub max_tokens: usize,
    /// Temperature (0.0 - 1.0).
    pub temperature: f64,
    /// API base URL (for custom endpoints).
    pub base_url: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("provider", &self.provider)
            .field("has_api_key", &!self.api_key.is_empty())
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("has_base_url", &self.base_url.is_some())
            .finish()
    }
}

impl ProviderConfig {
    /// Create a new config for the given provider, key, and model.
    #[must_use]
    pub fn new(
        provider: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            api_key: api_key.into(),
            model: model.into(),
            max_tokens: 1024,
            temperature: 0.2,
            base_url: None,
        }
    }

    /// Set max tokens.
    #[must_use]
    pub fn max_tokens(mut self, max: usize) -> Self {
        self.max_tokens = max;
        self
    }

    /// Set temperature.
    #[must_use]
    pub fn temperature(mut self, temp: f64) -> Self {
        self.temperature = temp.clamp(0.0, 1.0);
        self
    }

    /// Set base URL.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::new("gemini", "", "gemini-2.0-flash")
    }
}
