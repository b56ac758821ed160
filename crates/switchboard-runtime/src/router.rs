//! Handler selection.
//!
//! [`RoutingTable`] is the pure, total lookup. The [`Router`] trait is the
//! strategy seam: [`TableRouter`] wraps the table, [`LlmRouter`] lets the
//! backend choose through hand-off tools and falls back to the table.
//! Routing fails only when the session is cancelled.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use switchboard_core::retry::{RetryConfig, RetryOutcome, retry_with_cancel};
use switchboard_core::SessionContext;
use switchboard_llm::{LlmError, LlmProvider, LlmToolDefinition, Message};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{SessionError, SessionResult};
use crate::handler::Handler;

const TRIAGE_INSTRUCTIONS: &str = "You are a triage agent. Your only job is to decide which \
specialized agent should handle the user's request.

- billing (refunds, payments): hand off to the billing agent
- technical (errors, service issues): hand off to the technical agent
- general or unclear: hand off to the general agent

Do not answer the request yourself. Route it using the session's issue type and the request.";

/// Exact-match map from issue type to handler, with a default.
///
/// Every issue type maps to exactly one handler.
#[derive(Debug, Clone)]
pub struct RoutingTable {
    routes: HashMap<String, Arc<Handler>>,
    order: Vec<Arc<Handler>>,
    default: Arc<Handler>,
}

impl RoutingTable {
    /// Create a table that sends everything to `default`.
    #[must_use]
    pub fn new(default: Arc<Handler>) -> Self {
        Self {
            routes: HashMap::new(),
            order: Vec::new(),
            default,
        }
    }

    /// Route `issue_type` to `handler`, replacing any previous route.
    #[must_use]
    pub fn with_route(mut self, issue_type: impl Into<String>, handler: Arc<Handler>) -> Self {
        if !self.order.iter().any(|h| Arc::ptr_eq(h, &handler)) {
            self.order.push(Arc::clone(&handler));
        }
        self.routes.insert(issue_type.into(), handler);
        self
    }

    /// Select the handler for `ctx`. Never fails.
    #[must_use]
    pub fn select(&self, ctx: &SessionContext) -> &Arc<Handler> {
        self.routes.get(ctx.issue_type()).unwrap_or(&self.default)
    }

    /// The default handler.
    #[must_use]
    pub fn default_handler(&self) -> &Arc<Handler> {
        &self.default
    }

    /// Distinct handlers in route order, default last if it has no route.
    #[must_use]
    pub fn handlers(&self) -> Vec<Arc<Handler>> {
        let mut handlers = self.order.clone();
        if !handlers.iter().any(|h| Arc::ptr_eq(h, &self.default)) {
            handlers.push(Arc::clone(&self.default));
        }
        handlers
    }
}

/// Strategy for choosing a handler.
///
/// Implementations must be total: every context yields a handler unless
/// `cancel` fires while routing is suspended.
#[async_trait]
pub trait Router: Send + Sync {
    /// Choose a handler for the session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Aborted`] if `cancel` fires first.
    async fn route(
        &self,
        ctx: &SessionContext,
        request: &str,
        cancel: &CancellationToken,
    ) -> SessionResult<Arc<Handler>>;

    /// Short strategy name for logs.
    fn strategy(&self) -> &'static str;
}

/// Deterministic routing by issue type.
#[derive(Debug, Clone)]
pub struct TableRouter {
    table: RoutingTable,
}

impl TableRouter {
    /// Wrap a routing table.
    #[must_use]
    pub fn new(table: RoutingTable) -> Self {
        Self { table }
    }

    /// The underlying table.
    #[must_use]
    pub fn table(&self) -> &RoutingTable {
        &self.table
    }
}

#[async_trait]
impl Router for TableRouter {
    async fn route(
        &self,
        ctx: &SessionContext,
        _request: &str,
        _cancel: &CancellationToken,
    ) -> SessionResult<Arc<Handler>> {
        Ok(Arc::clone(self.table.select(ctx)))
    }

    fn strategy(&self) -> &'static str {
        "table"
    }
}

/// Backend-driven routing through `transfer_to_<handler>` tools.
///
/// Backend failures, text replies and unknown tool names all fall back to
/// the routing table. Cancellation does not.
pub struct LlmRouter<P: LlmProvider> {
    llm: Arc<P>,
    table: RoutingTable,
    retry: RetryConfig,
}

impl<P: LlmProvider> LlmRouter<P> {
    /// Create a router over `table`'s handlers.
    #[must_use]
    pub fn new(llm: Arc<P>, table: RoutingTable) -> Self {
        Self {
            llm,
            table,
            retry: RetryConfig::api(),
        }
    }

    /// Override retry behavior for the triage call.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    fn handoff_tools(handlers: &[Arc<Handler>]) -> Vec<LlmToolDefinition> {
        handlers
            .iter()
            .map(|h| {
                LlmToolDefinition::new(transfer_tool_name(h.name()))
                    .with_description(format!("Hand off to the {}.", h.name()))
            })
            .collect()
    }

    fn fallback(&self, ctx: &SessionContext) -> Arc<Handler> {
        Arc::clone(self.table.select(ctx))
    }
}

#[async_trait]
impl<P: LlmProvider> Router for LlmRouter<P> {
    async fn route(
        &self,
        ctx: &SessionContext,
        request: &str,
        cancel: &CancellationToken,
    ) -> SessionResult<Arc<Handler>> {
        let handlers = self.table.handlers();
        let tools = Self::handoff_tools(&handlers);
        let system = format!("{TRIAGE_INSTRUCTIONS}\n\nSession attributes:\n{}", ctx.describe());
        let messages = vec![Message::user(request)];

        let llm = self.llm.as_ref();
        let (messages, tools, system) = (&messages, &tools, system.as_str());
        let outcome = retry_with_cancel(
            &self.retry,
            cancel,
            move |_attempt| llm.complete(messages, tools, system),
            LlmError::is_transient,
        )
        .await;

        let response = match outcome {
            RetryOutcome::Success(response) => response,
            RetryOutcome::Exhausted { error, attempts } => {
                warn!(%error, attempts, "triage call failed, routing by table");
                return Ok(self.fallback(ctx));
            },
            RetryOutcome::Aborted => {
                info!("session cancelled during triage");
                return Err(SessionError::Aborted);
            },
        };

        let chosen = response.message.tool_calls().and_then(|calls| {
            calls.iter().find_map(|call| {
                handlers
                    .iter()
                    .find(|h| transfer_tool_name(h.name()) == call.name)
            })
        });

        if let Some(handler) = chosen {
            debug!(handler = handler.name(), "triage handed off");
            Ok(Arc::clone(handler))
        } else {
            warn!("triage produced no valid hand-off, routing by table");
            Ok(self.fallback(ctx))
        }
    }

    fn strategy(&self) -> &'static str {
        "llm"
    }
}

impl<P: LlmProvider> std::fmt::Debug for LlmRouter<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmRouter")
            .field("provider", &self.llm.name())
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

/// Hand-off tool name for a handler: `BillingAgent` becomes
/// `transfer_to_billing_agent`.
#[must_use]
pub fn transfer_tool_name(handler_name: &str) -> String {
    let mut out = String::from("transfer_to_");
    for (i, ch) in handler_name.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else if ch.is_alphanumeric() {
            out.push(ch);
        } else {
            out.push('_');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{BILLING_AGENT, GENERAL_AGENT, HandlerCatalog, TECHNICAL_AGENT};
    use std::time::Duration;
    use switchboard_test::{MockLlmProvider, MockLlmTurn, UNRECOGNIZED_ISSUE_TYPES};

    fn table() -> RoutingTable {
        HandlerCatalog::standard().routing_table()
    }

    #[test]
    fn test_exact_match_routes() {
        let table = table();
        let route = |issue: &str| {
            table
                .select(&SessionContext::new("Ava", false, issue))
                .name()
                .to_string()
        };
        assert_eq!(route("billing"), BILLING_AGENT);
        assert_eq!(route("technical"), TECHNICAL_AGENT);
        assert_eq!(route("general"), GENERAL_AGENT);
    }

    #[test]
    fn test_unrecognized_goes_to_default() {
        let table = table();
        for issue in UNRECOGNIZED_ISSUE_TYPES {
            let ctx = SessionContext::new("Sam", true, *issue);
            assert_eq!(table.select(&ctx).name(), GENERAL_AGENT, "issue {issue:?}");
        }
    }

    #[test]
    fn test_select_is_deterministic() {
        let table = table();
        let ctx = SessionContext::new("Sam", true, "BILLING");
        assert!(Arc::ptr_eq(table.select(&ctx), table.select(&ctx)));
    }

    #[test]
    fn test_handlers_distinct_in_route_order() {
        let names: Vec<String> = table()
            .handlers()
            .iter()
            .map(|h| h.name().to_string())
            .collect();
        assert_eq!(names, vec![BILLING_AGENT, TECHNICAL_AGENT, GENERAL_AGENT]);
    }

    #[test]
    fn test_transfer_tool_name() {
        assert_eq!(transfer_tool_name("BillingAgent"), "transfer_to_billing_agent");
        assert_eq!(transfer_tool_name("GeneralAgent"), "transfer_to_general_agent");
        assert_eq!(transfer_tool_name("web-agent"), "transfer_to_web_agent");
    }

    #[tokio::test]
    async fn test_table_router() {
        let router = TableRouter::new(table());
        let handler = router
            .route(
                &SessionContext::new("Ava", true, "technical"),
                "it is down",
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(handler.name(), TECHNICAL_AGENT);
        assert_eq!(router.strategy(), "table");
    }

    #[tokio::test]
    async fn test_llm_router_follows_handoff() {
        let llm = Arc::new(MockLlmProvider::new(vec![MockLlmTurn::call(
            "transfer_to_technical_agent",
        )]));
        let router = LlmRouter::new(Arc::clone(&llm), table());

        // Issue type says billing; the backend's choice wins.
        let handler = router
            .route(
                &SessionContext::new("Ava", true, "billing"),
                "my server crashed",
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(handler.name(), TECHNICAL_AGENT);
        assert_eq!(
            llm.captured_tool_names()[0],
            vec![
                "transfer_to_billing_agent",
                "transfer_to_technical_agent",
                "transfer_to_general_agent"
            ]
        );
        assert!(llm.captured_system_prompts()[0].contains("Issue type: billing"));
    }

    #[tokio::test]
    async fn test_llm_router_falls_back_on_text() {
        let llm = Arc::new(MockLlmProvider::new(vec![MockLlmTurn::text("I can help!")]));
        let router = LlmRouter::new(llm, table());
        let handler = router
            .route(
                &SessionContext::new("Ava", true, "billing"),
                "refund",
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(handler.name(), BILLING_AGENT);
    }

    #[tokio::test]
    async fn test_llm_router_falls_back_on_unknown_tool() {
        let llm = Arc::new(MockLlmProvider::new(vec![MockLlmTurn::call(
            "transfer_to_sales_agent",
        )]));
        let router = LlmRouter::new(llm, table());
        let handler = router
            .route(
                &SessionContext::new("Ava", true, "technical"),
                "help",
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(handler.name(), TECHNICAL_AGENT);
    }

    #[tokio::test]
    async fn test_llm_router_falls_back_on_backend_failure() {
        let llm = Arc::new(MockLlmProvider::new(vec![MockLlmTurn::permanent("bad key")]));
        let router = LlmRouter::new(Arc::clone(&llm), table()).with_retry(RetryConfig::fast());
        let handler = router
            .route(
                &SessionContext::new("Ava", true, "shipping"),
                "where is my parcel",
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(handler.name(), GENERAL_AGENT);
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_llm_router_cancelled_while_waiting() {
        let llm = Arc::new(MockLlmProvider::new(vec![MockLlmTurn::Hang]));
        let router = LlmRouter::new(llm, table()).with_retry(RetryConfig::fast());
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let result = router
            .route(&SessionContext::new("Ava", true, "billing"), "refund", &cancel)
            .await;

        assert!(matches!(result, Err(SessionError::Aborted)));
    }

    #[tokio::test]
    async fn test_table_router_ignores_cancel() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let handler = TableRouter::new(table())
            .route(&SessionContext::new("Ava", true, "billing"), "refund", &cancel)
            .await
            .unwrap();
        assert_eq!(handler.name(), BILLING_AGENT);
    }
}
