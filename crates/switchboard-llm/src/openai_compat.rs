//! OpenAI-compatible chat completions provider.
//!
//! Works with:
//! - Google Gemini (`OpenAI` compatibility endpoint)
//! - `OpenAI` API
//! - LM Studio (localhost:1234)
//! - Any `OpenAI`-compatible endpoint

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error};

use crate::error::{LlmError, LlmResult};
use crate::provider::{LlmProvider, ProviderConfig};
use crate::types::{
    LlmResponse, LlmToolDefinition, Message, MessageContent, MessageRole, StopReason, ToolCall,
    Usage,
};

const DEFAULT_GEMINI_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions";
const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_LM_STUDIO_URL: &str = "http://localhost:1234/v1/chat/completions";

/// Per-request timeout applied unless overridden.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// OpenAI-compatible reasoning backend.
pub struct OpenAiCompatProvider {
    client: Client,
    provider_name: String,
    model: String,
    max_tokens: usize,
    temperature: f64,
    base_url: String,
    api_key: Option<String>,
    request_timeout: Duration,
}

impl OpenAiCompatProvider {
    /// Create a provider for Gemini through its `OpenAI` compatibility layer.
    #[must_use]
    pub fn gemini(api_key: &str, model: &str) -> Self {
        Self::build("gemini", DEFAULT_GEMINI_URL, Some(api_key), model)
    }

    /// Create a provider for `OpenAI`.
    #[must_use]
    pub fn openai(api_key: &str, model: &str) -> Self {
        Self::build("openai", DEFAULT_OPENAI_URL, Some(api_key), model)
    }

    /// Create a provider for LM Studio with a specific model name.
    #[must_use]
    pub fn lm_studio(model: &str) -> Self {
        Self::build("lm-studio", DEFAULT_LM_STUDIO_URL, None, model)
    }

    /// Create a custom provider with full configuration.
    #[must_use]
    pub fn custom(base_url: &str, api_key: Option<&str>, model: &str) -> Self {
        Self::build("openai-compat", base_url, api_key, model)
    }

    /// Build a provider from a [`ProviderConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::ConfigError`] for an unknown provider identifier,
    /// or for `openai-compat` without a base URL.
    pub fn from_config(config: &ProviderConfig) -> LlmResult<Self> {
        let key = Some(config.api_key.as_str()).filter(|k| !k.is_empty());
        let provider = match config.provider.as_str() {
            "gemini" => Self::build(
                "gemini",
                config.base_url.as_deref().unwrap_or(DEFAULT_GEMINI_URL),
                key,
                &config.model,
            ),
            "openai" => Self::build(
                "openai",
                config.base_url.as_deref().unwrap_or(DEFAULT_OPENAI_URL),
                key,
                &config.model,
            ),
            "lm-studio" => Self::build(
                "lm-studio",
                config.base_url.as_deref().unwrap_or(DEFAULT_LM_STUDIO_URL),
                key,
                &config.model,
            ),
            "openai-compat" => {
                let url = config.base_url.as_deref().ok_or_else(|| {
                    LlmError::ConfigError("openai-compat provider requires a base URL".to_string())
                })?;
                Self::build("openai-compat", url, key, &config.model)
            },
            other => {
                return Err(LlmError::ConfigError(format!(
                    "unsupported provider '{other}'"
                )));
            },
        };

        Ok(provider
            .with_max_tokens(config.max_tokens)
            .with_temperature(config.temperature))
    }

    fn build(provider_name: &str, base_url: &str, api_key: Option<&str>, model: &str) -> Self {
        Self {
            client: Client::new(),
            provider_name: provider_name.to_string(),
            model: model.to_string(),
            max_tokens: 1024,
            temperature: 0.2,
            base_url: base_url.to_string(),
            api_key: api_key.map(ToString::to_string),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Set max tokens.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the per-request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Build the request body.
    fn build_request(&self, messages: &[Message], tools: &[LlmToolDefinition], system: &str) -> Value {
        let mut openai_messages = Vec::new();

        if !system.is_empty() {
            openai_messages.push(serde_json::json!({
                "role": "system",
                "content": system
            }));
        }

        for msg in messages {
            openai_messages.push(convert_message(msg));
        }

        let mut request = serde_json::json!({
            "model": self.model,
            "messages": openai_messages,
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
            "stream": false
        });

        if !tools.is_empty() {
            let openai_tools: Vec<Value> = tools
                .iter()
                .map(|t| {
                    // Strict endpoints reject a function schema without `properties`.
                    let mut parameters = t.input_schema.clone();
                    if let Some(obj) = parameters.as_object_mut() {
                        obj.entry("properties")
                            .or_insert_with(|| serde_json::json!({}));
                    }
                    serde_json::json!({
                        "type": "function",
                        "function": {
                            "name": t.name,
                            "description": t.description,
                            "parameters": parameters
                        }
                    })
                })
                .collect();
            request["tools"] = Value::Array(openai_tools);
        }

        request
    }
}

fn convert_message(msg: &Message) -> Value {
    let role = match msg.role {
        MessageRole::User => "user",
        MessageRole::Assistant => "assistant",
        MessageRole::System => "system",
        MessageRole::Tool => "tool",
    };

    match &msg.content {
        MessageContent::Text(text) => {
            serde_json::json!({
                "role": role,
                "content": text
            })
        },
        MessageContent::ToolCalls(tool_calls) => {
            let openai_tool_calls: Vec<Value> = tool_calls
                .iter()
                .map(|tc| {
                    serde_json::json!({
                        "id": tc.id,
                        "type": "function",
                        "function": {
                            "name": tc.name,
                            "arguments": serde_json::to_string(&tc.arguments).unwrap_or_default()
                        }
                    })
                })
                .collect();

            serde_json::json!({
                "role": "assistant",
                "content": Value::Null,
                "tool_calls": openai_tool_calls
            })
        },
        MessageContent::ToolResult(result) => {
            serde_json::json!({
                "role": "tool",
                "tool_call_id": result.call_id,
                "content": result.content
            })
        },
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.provider_name
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        messages: &[Message],
        tools: &[LlmToolDefinition],
        system: &str,
    ) -> LlmResult<LlmResponse> {
        // Remote endpoints require an API key; local ones typically do not.
        if self.api_key.as_ref().is_none_or(String::is_empty) && !is_local_url(&self.base_url) {
            return Err(LlmError::ApiKeyNotConfigured {
                provider: self.provider_name.clone(),
            });
        }

        let request_body = self.build_request(messages, tools, system);

        debug!(
            provider = %self.provider_name,
            model = %self.model,
            tools = tools.len(),
            "Making chat completion request"
        );

        let mut request = self
            .client
            .post(&self.base_url)
            .timeout(self.request_timeout)
            .header("Content-Type", "application/json");

        if let Some(ref api_key) = self.api_key {
            let mut auth_value = reqwest::header::HeaderValue::try_from(format!(
                "Bearer {api_key}"
            ))
            .map_err(|e| LlmError::ConfigError(format!("Invalid API key characters: {e}")))?;
            auth_value.set_sensitive(true);
            request = request.header("Authorization", auth_value);
        }

        let response = request
            .json(&request_body)
            .send()
            .await
            .map_err(|e| LlmError::ApiRequestFailed(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(1);
            return Err(LlmError::RateLimitExceeded { retry_after_secs });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, provider = %self.provider_name, "Chat completion error");
            return Err(LlmError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let response: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        parse_response(response)
    }
}

fn parse_response(response: OpenAiResponse) -> LlmResult<LlmResponse> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::InvalidResponse("No choices in response".to_string()))?;

    let (content, has_tool_calls) = match choice.message.tool_calls {
        Some(tool_calls) if !tool_calls.is_empty() => {
            let mut calls = Vec::with_capacity(tool_calls.len());
            for tc in tool_calls {
                // Some backends send "" for argument-less calls.
                let arguments: Value = if tc.function.arguments.trim().is_empty() {
                    Value::Object(serde_json::Map::new())
                } else {
                    serde_json::from_str(&tc.function.arguments).map_err(|e| {
                        LlmError::InvalidResponse(format!("Invalid tool arguments JSON: {e}"))
                    })?
                };
                calls.push(ToolCall {
                    id: tc.id,
                    name: tc.function.name,
                    arguments,
                });
            }
            (MessageContent::ToolCalls(calls), true)
        },
        _ => (
            MessageContent::Text(choice.message.content.unwrap_or_default()),
            false,
        ),
    };

    let stop_reason = match choice.finish_reason.as_deref() {
        Some("length") => StopReason::MaxTokens,
        Some("tool_calls") => StopReason::ToolUse,
        Some("content_filter") => StopReason::StopSequence,
        _ => StopReason::EndTurn,
    };

    let usage = response.usage.unwrap_or_default();

    Ok(LlmResponse {
        message: Message {
            role: MessageRole::Assistant,
            content,
        },
        has_tool_calls,
        stop_reason,
        usage: Usage {
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
        },
    })
}

impl std::fmt::Debug for OpenAiCompatProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatProvider")
            .field("provider", &self.provider_name)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("has_api_key", &self.api_key.is_some())
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish_non_exhaustive()
    }
}

// OpenAI API response types

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiMessage {
    content: Option<String>,
    tool_calls: Option<Vec<OpenAiToolCall>>,
}

#[derive(Debug, Deserialize)]
struct OpenAiToolCall {
    id: String,
    function: OpenAiFunctionCall,
}

#[derive(Debug, Deserialize)]
struct OpenAiFunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Default, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
}

/// Check whether a URL points to a local endpoint where an API key is
/// typically not required.
fn is_local_url(url: &str) -> bool {
    let lower = url.to_lowercase();
    lower.contains("localhost") || lower.contains("127.0.0.1") || lower.contains("[::1]")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ToolCallResult;

    #[test]
    fn test_gemini_creation() {
        let provider = OpenAiCompatProvider::gemini("key", "gemini-2.0-flash");
        assert_eq!(provider.name(), "gemini");
        assert_eq!(provider.model(), "gemini-2.0-flash");
        assert!(provider.base_url.contains("generativelanguage.googleapis.com"));
        assert!(provider.base_url.ends_with("/chat/completions"));
    }

    #[test]
    fn test_lm_studio_creation() {
        let provider = OpenAiCompatProvider::lm_studio("local-model");
        assert!(provider.api_key.is_none());
        assert!(provider.base_url.contains("localhost:1234"));
    }

    #[test]
    fn test_from_config_unknown_provider() {
        let config = ProviderConfig::new("carrier-pigeon", "key", "m");
        let err = OpenAiCompatProvider::from_config(&config).unwrap_err();
        assert!(matches!(err, LlmError::ConfigError(_)));
    }

    #[test]
    fn test_from_config_compat_requires_url() {
        let config = ProviderConfig::new("openai-compat", "key", "m");
        assert!(OpenAiCompatProvider::from_config(&config).is_err());

        let config = config.base_url("http://my-server:8080/v1/chat/completions");
        let provider = OpenAiCompatProvider::from_config(&config).unwrap();
        assert_eq!(provider.base_url, "http://my-server:8080/v1/chat/completions");
    }

    #[test]
    fn test_from_config_overrides_base_url() {
        let config = ProviderConfig::new("gemini", "key", "gemini-2.0-flash")
            .base_url("http://127.0.0.1:9999/v1/chat/completions")
            .max_tokens(64);
        let provider = OpenAiCompatProvider::from_config(&config).unwrap();
        assert_eq!(provider.base_url, "http://127.0.0.1:9999/v1/chat/completions");
        assert_eq!(provider.max_tokens, 64);
    }

    #[tokio::test]
    async fn test_missing_api_key_for_remote_endpoint() {
        let provider = OpenAiCompatProvider::gemini("", "gemini-2.0-flash");
        let err = provider.complete(&[], &[], "").await.unwrap_err();
        assert!(matches!(err, LlmError::ApiKeyNotConfigured { .. }));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_invalid_api_key_characters() {
        let provider = OpenAiCompatProvider::openai("invalid\nkey", "gpt-4o");
        let err = provider.complete(&[], &[], "").await.unwrap_err();
        assert!(
            matches!(err, LlmError::ConfigError(ref msg) if msg.contains("Invalid API key characters"))
        );
    }

    #[test]
    fn test_build_request_with_tools() {
        let provider = OpenAiCompatProvider::lm_studio("local-model");
        let messages = vec![Message::user("please refund me")];
        let tools = vec![LlmToolDefinition::new("refund").with_description("Issue a refund")];
        let request = provider.build_request(&messages, &tools, "You are the BillingAgent.");

        assert_eq!(request["model"], "local-model");
        assert_eq!(request["stream"], false);
        assert_eq!(request["messages"].as_array().unwrap().len(), 2);
        assert_eq!(request["tools"][0]["function"]["name"], "refund");
        assert!(request["tools"][0]["function"]["parameters"]["properties"].is_object());
    }

    #[test]
    fn test_build_request_omits_empty_tools() {
        let provider = OpenAiCompatProvider::lm_studio("local-model");
        let request = provider.build_request(&[Message::user("hi")], &[], "");
        assert!(request.get("tools").is_none());
        assert_eq!(request["messages"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_tool_result_conversion() {
        let msg = Message::tool_result(ToolCallResult::error("call_1", "not available"));
        let converted = convert_message(&msg);

        assert_eq!(converted["role"], "tool");
        assert_eq!(converted["tool_call_id"], "call_1");
        assert_eq!(converted["content"], "not available");
    }

    #[test]
    fn test_parse_tool_call_response() {
        let raw = serde_json::json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "refund", "arguments": ""}
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3}
        });
        let parsed: OpenAiResponse = serde_json::from_value(raw).unwrap();
        let response = parse_response(parsed).unwrap();

        assert!(response.has_tool_calls);
        assert_eq!(response.stop_reason, StopReason::ToolUse);
        let calls = response.message.tool_calls().unwrap();
        assert_eq!(calls[0].name, "refund");
        assert!(calls[0].arguments.is_object());
        assert_eq!(response.usage.total(), 15);
    }

    #[test]
    fn test_parse_text_response_without_usage() {
        let raw = serde_json::json!({
            "choices": [{
                "message": {"content": "Hello there"},
                "finish_reason": "stop"
            }]
        });
        let parsed: OpenAiResponse = serde_json::from_value(raw).unwrap();
        let response = parse_response(parsed).unwrap();

        assert!(!response.has_tool_calls);
        assert_eq!(response.message.text(), Some("Hello there"));
        assert_eq!(response.usage.total(), 0);
    }

    #[test]
    fn test_parse_empty_choices() {
        let parsed = OpenAiResponse {
            choices: Vec::new(),
            usage: None,
        };
        assert!(matches!(
            parse_response(parsed),
            Err(LlmError::InvalidResponse(_))
        ));
    }
}
