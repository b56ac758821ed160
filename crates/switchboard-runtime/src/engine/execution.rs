//! Decision loop: `run`, `run_with_cancel`, `run_until`, and the backend call.

use switchboard_core::SessionContext;
use switchboard_core::retry::{RetryOutcome, retry_with_cancel};
use switchboard_llm::{
    LlmError, LlmProvider, LlmResponse, LlmToolDefinition, Message, ToolCallResult,
};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::SessionError;
use crate::gating::enabled_capabilities;
use crate::handler::Handler;

use super::{DirectReplyPolicy, Engine, EngineRun, SessionState};

impl<P: LlmProvider> Engine<P> {
    /// Run the decision loop for `handler`.
    ///
    /// Always returns a finished [`EngineRun`]; failures are in
    /// [`EngineRun::outcome`].
    pub async fn run(&self, handler: &Handler, ctx: &SessionContext, request: &str) -> EngineRun {
        self.run_with_cancel(handler, ctx, request, &CancellationToken::new())
            .await
    }

    /// Like [`Engine::run`], aborting at the next backend round trip or
    /// backoff once `cancel` fires. A capability already running is allowed
    /// to finish.
    pub async fn run_with_cancel(
        &self,
        handler: &Handler,
        ctx: &SessionContext,
        request: &str,
        cancel: &CancellationToken,
    ) -> EngineRun {
        self.run_until(handler, ctx, request, cancel, self.session_deadline())
            .await
    }

    /// The instant a session starting now must finish by, if
    /// `session_timeout` is set.
    #[must_use]
    pub fn session_deadline(&self) -> Option<Instant> {
        self.config
            .session_timeout
            .and_then(|t| Instant::now().checked_add(t))
    }

    /// Like [`Engine::run_with_cancel`], against a deadline fixed by the
    /// caller. A session that has already spent time routing passes the
    /// deadline it started with.
    pub async fn run_until(
        &self,
        handler: &Handler,
        ctx: &SessionContext,
        request: &str,
        cancel: &CancellationToken,
        deadline: Option<Instant>,
    ) -> EngineRun {
        let mut run = EngineRun::started();

        let enabled = enabled_capabilities(handler, ctx);
        run.presented = enabled.ids().into_iter().map(String::from).collect();
        run.enter(SessionState::AwaitingDecision);

        if enabled.is_empty() {
            warn!(handler = handler.name(), "no capability enabled for this session");
            return run.fail(SessionError::NoEligibleCapability {
                handler: handler.name().to_string(),
            });
        }

        let max_steps = self.config.step_budget();
        let tools = enabled.definitions();
        let system = handler.system_prompt(ctx);
        let mut messages = vec![Message::user(request)];

        debug!(
            handler = handler.name(),
            presented = ?run.presented,
            max_steps,
            "starting decision loop"
        );

        while run.steps < max_steps {
            run.steps = run.steps.saturating_add(1);
            let step = run.steps;

            let response = match self
                .call_backend(&messages, &tools, &system, cancel, deadline)
                .await
            {
                Ok(response) => response,
                Err(error) => return run.fail(error),
            };

            if let Some(calls) = response.message.tool_calls() {
                let chosen = calls
                    .iter()
                    .find_map(|call| enabled.get(&call.name).map(|cap| (call, cap)));

                if let Some((call, capability)) = chosen {
                    if calls.len() > 1 {
                        debug!(
                            requested = calls.len(),
                            chosen = %call.name,
                            "ignoring extra tool calls"
                        );
                    }
                    run.enter(SessionState::Invoking);
                    run.invoked = Some(call.name.clone());
                    info!(handler = handler.name(), capability = %call.name, step, "invoking capability");

                    return match capability.invoke(ctx).await {
                        Ok(output) => run.finish(output),
                        Err(source) => run.fail(SessionError::CapabilityFailed {
                            capability: call.name.clone(),
                            source,
                        }),
                    };
                }

                let available = enabled.ids().join(", ");
                warn!(
                    requested = ?calls.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
                    step,
                    "backend requested an unavailable capability"
                );
                let refusals: Vec<Message> = calls
                    .iter()
                    .map(|call| {
                        Message::tool_result(ToolCallResult::error(
                            call.id.clone(),
                            format!(
                                "Tool '{}' is not available. Available tools: {available}",
                                call.name
                            ),
                        ))
                    })
                    .collect();
                messages.push(response.message);
                messages.extend(refusals);
                continue;
            }

            match response.message.text().map(str::trim) {
                Some(text) if !text.is_empty() => {
                    return match self.config.direct_reply {
                        DirectReplyPolicy::Accept => {
                            warn!(handler = handler.name(), step, "backend replied directly without acting");
                            run.finish(text.to_string())
                        },
                        DirectReplyPolicy::Reject => {
                            warn!(handler = handler.name(), step, "direct reply rejected");
                            run.fail(SessionError::DirectReplyRejected {
                                text: text.to_string(),
                            })
                        },
                    };
                },
                _ => debug!(step, "empty backend reply"),
            }
        }

        warn!(
            handler = handler.name(),
            max_steps,
            "step budget exhausted"
        );
        run.fail(SessionError::StepBudgetExceeded { max_steps })
    }

    /// One step's backend call, with retries, cancellation and the session
    /// deadline applied.
    async fn call_backend(
        &self,
        messages: &[Message],
        tools: &[LlmToolDefinition],
        system: &str,
        cancel: &CancellationToken,
        deadline: Option<Instant>,
    ) -> Result<LlmResponse, SessionError> {
        let llm = self.llm.as_ref();
        let attempts = retry_with_cancel(
            &self.config.retry,
            cancel,
            move |attempt| {
                if attempt > 0 {
                    debug!(attempt, "retrying backend call");
                }
                llm.complete(messages, tools, system)
            },
            LlmError::is_transient,
        );

        let outcome = match deadline {
            Some(deadline) => {
                if let Ok(outcome) = tokio::time::timeout_at(deadline, attempts).await {
                    outcome
                } else {
                    warn!("session deadline passed");
                    return Err(SessionError::Aborted);
                }
            },
            None => attempts.await,
        };

        match outcome {
            RetryOutcome::Success(response) => Ok(response),
            RetryOutcome::Exhausted { error, attempts } => {
                warn!(%error, attempts, "backend unavailable");
                Err(SessionError::BackendUnavailable {
                    attempts,
                    source: error,
                })
            },
            RetryOutcome::Aborted => {
                info!("session cancelled");
                Err(SessionError::Aborted)
            },
        }
    }
}
