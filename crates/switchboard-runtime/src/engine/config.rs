//! Engine configuration types and defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use switchboard_core::RetryConfig;

/// Default maximum backend round trips per session.
pub const DEFAULT_MAX_STEPS: usize = 10;

/// What to do when the backend answers in free text instead of acting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectReplyPolicy {
    /// The text becomes the final output. Logged at `warn`.
    #[default]
    Accept,
    /// The session fails with `DirectReplyRejected`.
    Reject,
}

/// Configuration for the decision loop.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum backend round trips. Retries of one call count once. The
    /// loop always allows at least one; see [`EngineConfig::step_budget`].
    pub max_steps: usize,
    /// Retry policy for each backend call.
    pub retry: RetryConfig,
    /// Free-text reply policy.
    pub direct_reply: DirectReplyPolicy,
    /// Wall-clock limit for the whole session.
    pub session_timeout: Option<Duration>,
}

impl EngineConfig {
    /// Set the step bound. Zero is raised to one.
    #[must_use]
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    /// Steps the decision loop may use: `max_steps`, but never zero.
    #[must_use]
    pub fn step_budget(&self) -> usize {
        self.max_steps.max(1)
    }

    /// Set the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Set the direct reply policy.
    #[must_use]
    pub fn with_direct_reply(mut self, policy: DirectReplyPolicy) -> Self {
        self.direct_reply = policy;
        self
    }

    /// Set a session timeout.
    #[must_use]
    pub fn with_session_timeout(mut self, timeout: Duration) -> Self {
        self.session_timeout = Some(timeout);
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            retry: RetryConfig::api(),
            direct_reply: DirectReplyPolicy::default(),
            session_timeout: None,
        }
    }
}
