//! Shared harness for integration tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use switchboard_core::RetryConfig;
use switchboard_llm::{
    LlmProvider, LlmResponse, LlmResult, LlmToolDefinition, Message, StopReason, ToolCall, Usage,
};
use switchboard_runtime::{
    Dispatcher, Engine, EngineConfig, HandlerCatalog, LlmRouter, Router, TableRouter,
};
use switchboard_test::{MockLlmProvider, MockLlmTurn};

/// Engine settings with millisecond backoff.
#[allow(dead_code)]
pub fn fast_config() -> EngineConfig {
    EngineConfig::default().with_retry(RetryConfig::fast())
}

/// A dispatcher over a scripted mock, routed by table.
#[allow(dead_code)]
pub struct DispatchHarness {
    /// The dispatcher under test.
    pub dispatcher: Dispatcher<MockLlmProvider>,
    /// The scripted backend.
    pub llm: Arc<MockLlmProvider>,
}

#[allow(dead_code)]
impl DispatchHarness {
    /// Table routing with the default fast engine.
    pub fn new(turns: Vec<MockLlmTurn>) -> Self {
        Self::with_config(turns, fast_config())
    }

    /// Table routing with a custom engine config.
    pub fn with_config(turns: Vec<MockLlmTurn>, config: EngineConfig) -> Self {
        let llm = Arc::new(MockLlmProvider::new(turns));
        let router: Arc<dyn Router> =
            Arc::new(TableRouter::new(HandlerCatalog::standard().routing_table()));
        Self {
            dispatcher: Dispatcher::new(router, Engine::new(Arc::clone(&llm), config)),
            llm,
        }
    }

    /// Backend-driven routing. The triage call consumes the first turn.
    pub fn llm_routed(turns: Vec<MockLlmTurn>) -> Self {
        Self::llm_routed_with_config(turns, fast_config())
    }

    /// Backend-driven routing with a custom engine config.
    pub fn llm_routed_with_config(turns: Vec<MockLlmTurn>, config: EngineConfig) -> Self {
        let llm = Arc::new(MockLlmProvider::new(turns));
        let router: Arc<dyn Router> = Arc::new(
            LlmRouter::new(Arc::clone(&llm), HandlerCatalog::standard().routing_table())
                .with_retry(RetryConfig::fast()),
        );
        Self {
            dispatcher: Dispatcher::new(router, Engine::new(Arc::clone(&llm), config)),
            llm,
        }
    }
}

/// A well-behaved backend: always calls the first tool it is offered.
///
/// Stateless, so one instance can serve any number of concurrent sessions.
#[allow(dead_code)]
#[derive(Default)]
pub struct FirstToolProvider {
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl FirstToolProvider {
    /// Number of completions served.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
#[allow(clippy::unnecessary_literal_bound)]
impl LlmProvider for FirstToolProvider {
    fn name(&self) -> &str {
        "first-tool"
    }

    fn model(&self) -> &str {
        "first-tool"
    }

    async fn complete(
        &self,
        _messages: &[Message],
        tools: &[LlmToolDefinition],
        _system: &str,
    ) -> LlmResult<LlmResponse> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        // Yield so concurrent sessions interleave.
        tokio::task::yield_now().await;

        let message = match tools.first() {
            Some(tool) => Message::assistant_with_tools(vec![ToolCall::new(
                format!("call-{n}"),
                tool.name.clone(),
            )]),
            None => Message::assistant("nothing to do"),
        };
        Ok(LlmResponse {
            has_tool_calls: !tools.is_empty(),
            message,
            stop_reason: if tools.is_empty() {
                StopReason::EndTurn
            } else {
                StopReason::ToolUse
            },
            usage: Usage::default(),
        })
    }
}
