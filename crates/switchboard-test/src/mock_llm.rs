//! Mock reasoning backend for testing.
//!
//! [`MockLlmProvider`] replays a queue of scripted turns and records what the
//! caller sent on every call: messages, offered tool names and the system
//! prompt. That is enough to assert both what the engine did and what it
//! showed the backend.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use switchboard_llm::{
    LlmError, LlmProvider, LlmResponse, LlmResult, LlmToolDefinition, Message, StopReason,
    ToolCall, Usage,
};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A single scripted turn.
#[derive(Debug, Clone)]
pub enum MockLlmTurn {
    /// A free-text reply.
    Text(String),
    /// One or more tool calls.
    ToolCalls(Vec<MockToolCall>),
    /// A transient failure (connection reset, 5xx). The engine retries these.
    TransientError(String),
    /// A permanent failure (HTTP 401). Never retried.
    PermanentError(String),
    /// Wait before producing the inner turn.
    Delayed(Duration, Box<MockLlmTurn>),
    /// Never respond.
    Hang,
}

impl MockLlmTurn {
    /// Create a text turn.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Create a turn calling a single tool with empty arguments.
    #[must_use]
    pub fn call(name: impl Into<String>) -> Self {
        Self::ToolCalls(vec![MockToolCall::new(name, Value::Object(serde_json::Map::new()))])
    }

    /// Create a tool-calls turn.
    #[must_use]
    pub fn tool_calls(calls: Vec<MockToolCall>) -> Self {
        Self::ToolCalls(calls)
    }

    /// Create a transient error turn.
    #[must_use]
    pub fn transient(msg: impl Into<String>) -> Self {
        Self::TransientError(msg.into())
    }

    /// Create a permanent error turn.
    #[must_use]
    pub fn permanent(msg: impl Into<String>) -> Self {
        Self::PermanentError(msg.into())
    }

    /// Delay this turn.
    #[must_use]
    pub fn delayed(self, delay: Duration) -> Self {
        Self::Delayed(delay, Box::new(self))
    }
}

/// A tool call for [`MockLlmTurn::ToolCalls`].
#[derive(Debug, Clone)]
pub struct MockToolCall {
    /// Call ID.
    pub id: String,
    /// Tool name.
    pub name: String,
    /// JSON arguments.
    pub arguments: Value,
}

impl MockToolCall {
    /// Create a call with a generated ID.
    #[must_use]
    pub fn new(name: impl Into<String>, args: Value) -> Self {
        Self {
            id: format!("mock-call-{}", Uuid::new_v4()),
            name: name.into(),
            arguments: args,
        }
    }

    /// Create a call with an explicit ID.
    #[must_use]
    pub fn with_id(id: impl Into<String>, name: impl Into<String>, args: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: args,
        }
    }
}

// ---------------------------------------------------------------------------
// MockLlmProvider
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Captured {
    messages: Vec<Vec<Message>>,
    tools: Vec<Vec<String>>,
    systems: Vec<String>,
}

/// A deterministic, queue-based [`LlmProvider`].
///
/// Each `complete` pops the next turn. An exhausted queue yields a
/// non-transient [`LlmError::InvalidResponse`].
pub struct MockLlmProvider {
    turns: Mutex<VecDeque<MockLlmTurn>>,
    captured: Mutex<Captured>,
}

impl MockLlmProvider {
    /// Create a provider preloaded with `turns`.
    #[must_use]
    pub fn new(turns: Vec<MockLlmTurn>) -> Self {
        Self {
            turns: Mutex::new(VecDeque::from(turns)),
            captured: Mutex::new(Captured::default()),
        }
    }

    /// Create a provider that must never be called.
    #[must_use]
    pub fn silent() -> Self {
        Self::new(Vec::new())
    }

    /// Number of `complete` calls so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.lock_captured().messages.len()
    }

    /// Messages sent on each call.
    #[must_use]
    pub fn captured_messages(&self) -> Vec<Vec<Message>> {
        self.lock_captured().messages.clone()
    }

    /// Tool names offered on each call.
    #[must_use]
    pub fn captured_tool_names(&self) -> Vec<Vec<String>> {
        self.lock_captured().tools.clone()
    }

    /// System prompt sent on each call.
    #[must_use]
    pub fn captured_system_prompts(&self) -> Vec<String> {
        self.lock_captured().systems.clone()
    }

    /// Turns not yet consumed.
    #[must_use]
    pub fn remaining_turns(&self) -> usize {
        self.turns
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn lock_captured(&self) -> std::sync::MutexGuard<'_, Captured> {
        self.captured.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_turn(
        &self,
        messages: &[Message],
        tools: &[LlmToolDefinition],
        system: &str,
    ) -> Option<MockLlmTurn> {
        {
            let mut captured = self.lock_captured();
            captured.messages.push(messages.to_vec());
            captured
                .tools
                .push(tools.iter().map(|t| t.name.clone()).collect());
            captured.systems.push(system.to_owned());
        }
        self.turns
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }

    async fn play(turn: MockLlmTurn) -> LlmResult<LlmResponse> {
        let mut turn = turn;
        loop {
            match turn {
                MockLlmTurn::Delayed(delay, inner) => {
                    tokio::time::sleep(delay).await;
                    turn = *inner;
                },
                MockLlmTurn::Hang => return std::future::pending().await,
                MockLlmTurn::Text(text) => {
                    return Ok(LlmResponse {
                        message: Message::assistant(text),
                        has_tool_calls: false,
                        stop_reason: StopReason::EndTurn,
                        usage: Usage {
                            input_tokens: 100,
                            output_tokens: 20,
                        },
                    });
                },
                MockLlmTurn::ToolCalls(calls) => {
                    let tool_calls: Vec<ToolCall> = calls
                        .into_iter()
                        .map(|c| ToolCall::new(c.id, c.name).with_arguments(c.arguments))
                        .collect();
                    return Ok(LlmResponse {
                        message: Message::assistant_with_tools(tool_calls),
                        has_tool_calls: true,
                        stop_reason: StopReason::ToolUse,
                        usage: Usage {
                            input_tokens: 100,
                            output_tokens: 10,
                        },
                    });
                },
                MockLlmTurn::TransientError(msg) => return Err(LlmError::ApiRequestFailed(msg)),
                MockLlmTurn::PermanentError(msg) => {
                    return Err(LlmError::HttpStatus {
                        status: 401,
                        body: msg,
                    });
                },
            }
        }
    }
}

#[async_trait]
#[allow(clippy::unnecessary_literal_bound)]
impl LlmProvider for MockLlmProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn complete(
        &self,
        messages: &[Message],
        tools: &[LlmToolDefinition],
        system: &str,
    ) -> LlmResult<LlmResponse> {
        match self.next_turn(messages, tools, system) {
            Some(turn) => Self::play(turn).await,
            None => Err(LlmError::InvalidResponse(
                "MockLlmProvider: no more turns queued".to_string(),
            )),
        }
    }
}
