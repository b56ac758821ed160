//! Failure handling: retries, budgets, reply policy, cancellation.

mod common;

use std::time::Duration;

use common::{DispatchHarness, fast_config};
use switchboard_runtime::{DirectReplyPolicy, FailureKind, SessionError, SessionState};
use switchboard_test::prelude::*;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn transient_failures_recover() {
    let harness = DispatchHarness::new(vec![
        MockLlmTurn::transient("connection reset"),
        MockLlmTurn::call("refund"),
    ]);

    let report = harness
        .dispatcher
        .handle(&premium_billing_context(), "please refund me")
        .await;

    assert_eq!(report.final_text(), "Ava, your refund has been initiated.");
    assert_eq!(report.steps, 1);
    assert_eq!(harness.llm.call_count(), 2);
}

#[tokio::test]
async fn exhausted_retries_surface_backend_unavailable() {
    let harness = DispatchHarness::new(vec![
        MockLlmTurn::transient("1"),
        MockLlmTurn::transient("2"),
        MockLlmTurn::transient("3"),
        MockLlmTurn::transient("4"),
    ]);

    let report = harness
        .dispatcher
        .handle(&premium_billing_context(), "please refund me")
        .await;

    assert_eq!(report.failure_kind(), Some(FailureKind::BackendUnavailable));
    assert!(report.invoked.is_none());
    // Never a fabricated answer.
    assert!(!report.final_text().contains("refund has been initiated"));
    assert_eq!(report.transitions.last(), Some(&SessionState::Failed));
}

#[tokio::test]
async fn backend_unavailable_is_distinct_from_no_eligible_action() {
    let down = DispatchHarness::new(vec![MockLlmTurn::permanent("401")]);
    let report_down = down
        .dispatcher
        .handle(&general_context("Kim"), "hi")
        .await;

    let gated = DispatchHarness::new(vec![]);
    let report_gated = gated
        .dispatcher
        .handle(&basic_billing_context(), "refund")
        .await;

    assert_ne!(report_down.failure_kind(), report_gated.failure_kind());
    assert_ne!(report_down.final_text(), report_gated.final_text());
}

#[tokio::test]
async fn misbehaving_backend_hits_step_budget() {
    let turns = (0..20).map(|_| MockLlmTurn::call("delete_account")).collect();
    let harness = DispatchHarness::with_config(turns, fast_config().with_max_steps(5));

    let report = harness
        .dispatcher
        .handle(&general_context("Kim"), "hi")
        .await;

    assert!(matches!(
        report.outcome,
        Err(SessionError::StepBudgetExceeded { max_steps: 5 })
    ));
    assert_eq!(report.steps, 5);
    assert_eq!(harness.llm.remaining_turns(), 15);
    // Every later call saw the refusals for earlier ones.
    let last_call = harness.llm.captured_messages().pop().unwrap();
    assert_eq!(last_call.len(), 9);
}

#[tokio::test]
async fn direct_reply_policy_both_ways() {
    let accept = DispatchHarness::new(vec![MockLlmTurn::text("Here is some info.")]);
    let report = accept
        .dispatcher
        .handle(&general_context("Kim"), "hi")
        .await;
    assert!(report.is_success());
    assert_eq!(report.final_text(), "Here is some info.");
    assert!(report.invoked.is_none());

    let reject = DispatchHarness::with_config(
        vec![MockLlmTurn::text("Here is some info.")],
        fast_config().with_direct_reply(DirectReplyPolicy::Reject),
    );
    let report = reject
        .dispatcher
        .handle(&general_context("Kim"), "hi")
        .await;
    assert_eq!(report.failure_kind(), Some(FailureKind::DirectReplyRejected));
    assert_ne!(report.final_text(), "Here is some info.");
}

#[tokio::test]
async fn cancelled_session_aborts_without_acting() {
    let harness = DispatchHarness::new(vec![
        MockLlmTurn::call("refund").delayed(Duration::from_secs(30)),
    ]);
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let report = harness
        .dispatcher
        .handle_with_cancel(&premium_billing_context(), "please refund me", &cancel)
        .await;

    assert_eq!(report.failure_kind(), Some(FailureKind::Aborted));
    assert!(report.invoked.is_none());
}

#[tokio::test]
async fn cancelling_one_session_leaves_others_alone() {
    let harness = DispatchHarness::new(vec![MockLlmTurn::call("general_info")]);
    let cancelled = CancellationToken::new();
    cancelled.cancel();

    let aborted = harness
        .dispatcher
        .handle_with_cancel(&general_context("A"), "hi", &cancelled)
        .await;
    let fine = harness
        .dispatcher
        .handle(&general_context("B"), "hi")
        .await;

    assert_eq!(aborted.failure_kind(), Some(FailureKind::Aborted));
    assert_eq!(fine.final_text(), "Hi B, here's some general info about our services.");
}

#[tokio::test]
async fn session_timeout_aborts_hung_backend() {
    let harness = DispatchHarness::with_config(
        vec![MockLlmTurn::Hang],
        fast_config().with_session_timeout(Duration::from_millis(50)),
    );

    let report = harness
        .dispatcher
        .handle(&technical_context("Lee", true), "down")
        .await;

    assert_eq!(report.failure_kind(), Some(FailureKind::Aborted));
    assert_eq!(report.final_text(), "The request was cancelled.");
}

#[tokio::test]
async fn session_timeout_covers_llm_routing() {
    let harness = DispatchHarness::llm_routed_with_config(
        vec![MockLlmTurn::Hang],
        fast_config().with_session_timeout(Duration::from_millis(50)),
    );

    let report = tokio::time::timeout(
        Duration::from_secs(2),
        harness
            .dispatcher
            .handle(&technical_context("Lee", true), "down"),
    )
    .await
    .expect("hung triage call outlived the session timeout");

    assert_eq!(report.failure_kind(), Some(FailureKind::Aborted));
    assert_eq!(report.transitions, vec![SessionState::Routing, SessionState::Failed]);
    assert_eq!(harness.llm.call_count(), 1);
}

#[tokio::test]
async fn cancel_interrupts_llm_routing() {
    let harness = DispatchHarness::llm_routed(vec![MockLlmTurn::Hang]);
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let report = tokio::time::timeout(
        Duration::from_secs(2),
        harness
            .dispatcher
            .handle_with_cancel(&premium_billing_context(), "please refund me", &cancel),
    )
    .await
    .expect("hung triage call ignored cancellation");

    assert_eq!(report.failure_kind(), Some(FailureKind::Aborted));
    assert_eq!(report.final_text(), "The request was cancelled.");
    assert!(report.handler.is_empty());
    assert!(report.invoked.is_none());
}
