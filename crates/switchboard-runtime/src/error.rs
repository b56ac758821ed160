//! Session failure types.

use serde::{Deserialize, Serialize};
use switchboard_llm::LlmError;
use switchboard_tools::CapabilityError;
use thiserror::Error;

/// Discriminant of a [`SessionError`], for callers that branch on the kind
/// of failure without matching on payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// No handler could be selected.
    UnroutableContext,
    /// The selected handler has no enabled capability.
    NoEligibleCapability,
    /// The backend could not be reached.
    BackendUnavailable,
    /// The step bound ran out.
    StepBudgetExceeded,
    /// A free-text reply arrived under the reject policy.
    DirectReplyRejected,
    /// The invoked capability failed.
    CapabilityFailed,
    /// Cancelled or timed out.
    Aborted,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::UnroutableContext => "unroutable_context",
            Self::NoEligibleCapability => "no_eligible_capability",
            Self::BackendUnavailable => "backend_unavailable",
            Self::StepBudgetExceeded => "step_budget_exceeded",
            Self::DirectReplyRejected => "direct_reply_rejected",
            Self::CapabilityFailed => "capability_failed",
            Self::Aborted => "aborted",
        };
        f.write_str(s)
    }
}

/// Terminal failure of a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Routing produced no handler. Unreachable with a total routing table.
    #[error("internal error: no handler for issue type '{issue_type}'")]
    UnroutableContext {
        /// The issue type that failed to route.
        issue_type: String,
    },

    /// The handler has no capability enabled for this context.
    #[error("handler {handler} has no eligible capability for this session")]
    NoEligibleCapability {
        /// Handler name.
        handler: String,
    },

    /// Backend calls failed after retries, or failed permanently.
    #[error("reasoning backend unavailable after {attempts} attempt(s): {source}")]
    BackendUnavailable {
        /// Attempts made for the failing step.
        attempts: u32,
        /// Last backend error.
        #[source]
        source: LlmError,
    },

    /// The decision loop hit its bound without reaching a terminal state.
    #[error("no decision within {max_steps} step(s)")]
    StepBudgetExceeded {
        /// The configured bound.
        max_steps: usize,
    },

    /// The backend replied in free text and direct replies are rejected.
    #[error("backend replied directly instead of acting: {text}")]
    DirectReplyRejected {
        /// The rejected reply.
        text: String,
    },

    /// The invoked capability returned an error. Not retried.
    #[error("capability '{capability}' failed: {source}")]
    CapabilityFailed {
        /// Capability id.
        capability: String,
        /// Underlying error.
        #[source]
        source: CapabilityError,
    },

    /// Cancelled, or the session deadline passed.
    #[error("session aborted")]
    Aborted,
}

impl SessionError {
    /// The failure kind.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::UnroutableContext { .. } => FailureKind::UnroutableContext,
            Self::NoEligibleCapability { .. } => FailureKind::NoEligibleCapability,
            Self::BackendUnavailable { .. } => FailureKind::BackendUnavailable,
            Self::StepBudgetExceeded { .. } => FailureKind::StepBudgetExceeded,
            Self::DirectReplyRejected { .. } => FailureKind::DirectReplyRejected,
            Self::CapabilityFailed { .. } => FailureKind::CapabilityFailed,
            Self::Aborted => FailureKind::Aborted,
        }
    }

    /// Message shown to the user in place of a result.
    ///
    /// Never contains backend error details or rejected reply text.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::UnroutableContext { .. } => {
                "Internal error: this request could not be routed.".to_string()
            },
            Self::NoEligibleCapability { .. } => {
                "No available action for this request.".to_string()
            },
            Self::BackendUnavailable { .. } => {
                "The support service is temporarily unavailable. Please try again later."
                    .to_string()
            },
            Self::StepBudgetExceeded { .. } | Self::DirectReplyRejected { .. } => {
                "We could not complete your request.".to_string()
            },
            Self::CapabilityFailed { capability, .. } => {
                format!("The '{capability}' action failed. No changes were retried.")
            },
            Self::Aborted => "The request was cancelled.".to_string(),
        }
    }
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
