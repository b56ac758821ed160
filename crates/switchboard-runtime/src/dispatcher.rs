//! Session entry point: route, then run the engine.

use std::sync::Arc;

use serde::Serialize;
use switchboard_core::SessionContext;
use switchboard_llm::LlmProvider;
use switchboard_telemetry::SessionSpan;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, info, warn};
use uuid::Uuid;

use crate::engine::{Engine, EngineRun, SessionState};
use crate::error::{FailureKind, SessionError, SessionResult};
use crate::handler::Handler;
use crate::router::Router;

/// Everything observable about one finished session.
#[derive(Debug, Serialize)]
pub struct SessionReport {
    /// Session id, also on the tracing span.
    pub session_id: Uuid,
    /// Selected handler name; empty if the session ended while routing.
    pub handler: String,
    /// Capability ids offered to the backend.
    pub presented: Vec<String>,
    /// States visited.
    pub transitions: Vec<SessionState>,
    /// Backend round trips used.
    pub steps: usize,
    /// The capability invoked, if any.
    pub invoked: Option<String>,
    /// Wall-clock duration in milliseconds.
    pub elapsed_ms: i64,
    /// Final output or failure.
    #[serde(skip)]
    pub outcome: SessionResult<String>,
}

impl SessionReport {
    fn from_run(session: &SessionSpan, run: EngineRun) -> Self {
        Self {
            session_id: session.session_id,
            handler: session.handler.clone().unwrap_or_default(),
            presented: run.presented,
            transitions: run.transitions,
            steps: run.steps,
            invoked: run.invoked,
            elapsed_ms: session.elapsed_ms(),
            outcome: run.outcome,
        }
    }

    /// The single string returned to the user: the action's result or a
    /// failure message.
    #[must_use]
    pub fn final_text(&self) -> String {
        match &self.outcome {
            Ok(text) => text.clone(),
            Err(error) => error.user_message(),
        }
    }

    /// Whether the session ended in [`SessionState::Terminal`].
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Failure kind, if the session failed.
    #[must_use]
    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.outcome.as_ref().err().map(crate::SessionError::kind)
    }
}

/// Routes each session and drives it to a terminal state.
///
/// Immutable after construction; share it behind an [`Arc`] to serve
/// concurrent sessions.
pub struct Dispatcher<P: LlmProvider> {
    router: Arc<dyn Router>,
    engine: Engine<P>,
}

impl<P: LlmProvider> Dispatcher<P> {
    /// Compose a router and an engine.
    #[must_use]
    pub fn new(router: Arc<dyn Router>, engine: Engine<P>) -> Self {
        Self { router, engine }
    }

    /// The engine.
    #[must_use]
    pub fn engine(&self) -> &Engine<P> {
        &self.engine
    }

    /// The router strategy name.
    #[must_use]
    pub fn strategy(&self) -> &'static str {
        self.router.strategy()
    }

    /// Handle one request.
    pub async fn handle(&self, ctx: &SessionContext, request: &str) -> SessionReport {
        self.handle_with_cancel(ctx, request, &CancellationToken::new())
            .await
    }

    /// Handle one request, aborting at the next suspension point once
    /// `cancel` fires.
    ///
    /// The engine's `session_timeout` covers routing and the decision loop
    /// together.
    pub async fn handle_with_cancel(
        &self,
        ctx: &SessionContext,
        request: &str,
        cancel: &CancellationToken,
    ) -> SessionReport {
        let session = SessionSpan::new("dispatcher").with_issue_type(ctx.issue_type());
        let span = session.span();

        async {
            let deadline = self.engine.session_deadline();

            let handler = match self.route(ctx, request, cancel, deadline).await {
                Ok(handler) => handler,
                Err(error) => {
                    let report =
                        SessionReport::from_run(&session, EngineRun::failed_routing(error));
                    log_outcome(&report);
                    return report;
                },
            };
            let session = session.with_handler(handler.name());
            tracing::Span::current().record("handler", handler.name());
            info!(
                handler = handler.name(),
                strategy = self.router.strategy(),
                "session routed"
            );

            let run = self
                .engine
                .run_until(&handler, ctx, request, cancel, deadline)
                .await;
            let report = SessionReport::from_run(&session, run);
            log_outcome(&report);
            report
        }
        .instrument(span)
        .await
    }

    async fn route(
        &self,
        ctx: &SessionContext,
        request: &str,
        cancel: &CancellationToken,
        deadline: Option<Instant>,
    ) -> SessionResult<Arc<Handler>> {
        let routing = self.router.route(ctx, request, cancel);
        match deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, routing)
                .await
                .unwrap_or_else(|_| {
                    warn!("session deadline passed while routing");
                    Err(SessionError::Aborted)
                }),
            None => routing.await,
        }
    }
}

fn log_outcome(report: &SessionReport) {
    match &report.outcome {
        Ok(_) => info!(
            steps = report.steps,
            invoked = report.invoked.as_deref(),
            elapsed_ms = report.elapsed_ms,
            "session complete"
        ),
        Err(error) => warn!(
            kind = %error.kind(),
            %error,
            steps = report.steps,
            elapsed_ms = report.elapsed_ms,
            "session failed"
        ),
    }
}

impl<P: LlmProvider> std::fmt::Debug for Dispatcher<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("strategy", &self.router.strategy())
            .field("engine", &self.engine)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineConfig;
    use std::time::Duration;

    use crate::handler::{GENERAL_AGENT, HandlerCatalog};
    use crate::router::{LlmRouter, TableRouter};
    use switchboard_core::RetryConfig;
    use switchboard_test::prelude::*;

    fn dispatcher(turns: Vec<MockLlmTurn>) -> (Dispatcher<MockLlmProvider>, Arc<MockLlmProvider>) {
        let llm = Arc::new(MockLlmProvider::new(turns));
        let router = Arc::new(TableRouter::new(HandlerCatalog::standard().routing_table()));
        let engine = Engine::new(
            Arc::clone(&llm),
            EngineConfig::default().with_retry(RetryConfig::fast()),
        );
        (Dispatcher::new(router, engine), llm)
    }

    #[tokio::test]
    async fn test_report_for_success() {
        setup_test_logging_default();
        let (dispatcher, _llm) = dispatcher(vec![MockLlmTurn::call("refund")]);

        let report = dispatcher
            .handle(&premium_billing_context(), "please refund me")
            .await;

        assert!(report.is_success());
        assert_eq!(report.handler, "BillingAgent");
        assert_eq!(report.final_text(), "Ava, your refund has been initiated.");
        assert!(report.failure_kind().is_none());
    }

    #[tokio::test]
    async fn test_report_for_failure() {
        let (dispatcher, _llm) = dispatcher(vec![]);

        let report = dispatcher
            .handle(&basic_billing_context(), "please refund me")
            .await;

        assert_eq!(report.failure_kind(), Some(FailureKind::NoEligibleCapability));
        assert_eq!(report.final_text(), "No available action for this request.");
        assert!(!report.final_text().contains("refund has been initiated"));
    }

    #[tokio::test]
    async fn test_unrecognized_issue_uses_general() {
        let (dispatcher, _llm) = dispatcher(vec![MockLlmTurn::call("general_info")]);
        let ctx = SessionContext::new("Noor", false, "shipping");

        let report = dispatcher.handle(&ctx, "where is my parcel").await;

        assert_eq!(report.handler, GENERAL_AGENT);
        assert_eq!(
            report.final_text(),
            "Hi Noor, here's some general info about our services."
        );
    }

    #[tokio::test]
    async fn test_each_session_gets_an_id() {
        let (dispatcher, _llm) = dispatcher(vec![
            MockLlmTurn::call("general_info"),
            MockLlmTurn::call("general_info"),
        ]);
        let a = dispatcher.handle(&general_context("A"), "x").await;
        let b = dispatcher.handle(&general_context("B"), "y").await;
        assert_ne!(a.session_id, b.session_id);
    }

    #[tokio::test]
    async fn test_report_serializes_without_outcome() {
        let (dispatcher, _llm) = dispatcher(vec![MockLlmTurn::call("general_info")]);
        let report = dispatcher.handle(&general_context("A"), "x").await;
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["handler"], "GeneralAgent");
        assert_eq!(json["transitions"][3], "terminal");
        assert!(json.get("outcome").is_none());
    }

    fn llm_routed(turns: Vec<MockLlmTurn>, config: EngineConfig) -> Dispatcher<MockLlmProvider> {
        let llm = Arc::new(MockLlmProvider::new(turns));
        let router = Arc::new(
            LlmRouter::new(Arc::clone(&llm), HandlerCatalog::standard().routing_table())
                .with_retry(RetryConfig::fast()),
        );
        Dispatcher::new(router, Engine::new(llm, config))
    }

    #[tokio::test]
    async fn test_cancel_during_triage_aborts() {
        let dispatcher = llm_routed(
            vec![MockLlmTurn::Hang],
            EngineConfig::default().with_retry(RetryConfig::fast()),
        );
        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = tokio::time::timeout(
            Duration::from_secs(2),
            dispatcher.handle_with_cancel(&premium_billing_context(), "refund", &cancel),
        )
        .await
        .expect("routing must observe cancellation");

        assert_eq!(report.failure_kind(), Some(FailureKind::Aborted));
        assert!(report.handler.is_empty());
        assert_eq!(report.steps, 0);
        assert_eq!(
            report.transitions,
            vec![SessionState::Routing, SessionState::Failed]
        );
    }

    #[tokio::test]
    async fn test_deadline_covers_triage() {
        let dispatcher = llm_routed(
            vec![MockLlmTurn::Hang],
            EngineConfig::default()
                .with_retry(RetryConfig::fast())
                .with_session_timeout(Duration::from_millis(50)),
        );

        let report = tokio::time::timeout(
            Duration::from_secs(2),
            dispatcher.handle(&premium_billing_context(), "refund"),
        )
        .await
        .expect("routing must observe the session deadline");

        assert_eq!(report.failure_kind(), Some(FailureKind::Aborted));
        assert_eq!(report.final_text(), "The request was cancelled.");
    }

    #[tokio::test]
    async fn test_deadline_shared_by_triage_and_loop() {
        // Triage spends 50ms of a 200ms budget; the 300ms decision would
        // have fit a fresh budget but not what is left.
        let dispatcher = llm_routed(
            vec![
                MockLlmTurn::call("transfer_to_billing_agent").delayed(Duration::from_millis(50)),
                MockLlmTurn::call("refund").delayed(Duration::from_millis(300)),
            ],
            EngineConfig::default()
                .with_retry(RetryConfig::fast())
                .with_session_timeout(Duration::from_millis(200)),
        );

        let report = dispatcher
            .handle(&premium_billing_context(), "please refund me")
            .await;

        assert_eq!(report.handler, "BillingAgent");
        assert_eq!(report.failure_kind(), Some(FailureKind::Aborted));
        assert!(report.invoked.is_none());
    }
}
