//! Execution engine - the bounded decision loop.
//!
//! The engine presents a handler's enabled capabilities to the backend,
//! invokes at most one of them, and always ends in a terminal state.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use switchboard_llm::LlmProvider;

use crate::error::{SessionError, SessionResult};

mod config;
mod execution;


pub use config::{DEFAULT_MAX_STEPS, DirectReplyPolicy, EngineConfig};

/// Session states, in the order a session can visit them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// A handler is being selected.
    Routing,
    /// Waiting on the backend to choose an action.
    AwaitingDecision,
    /// Running the chosen capability.
    Invoking,
    /// Finished with an output.
    Terminal,
    /// Finished with an error.
    Failed,
}

impl SessionState {
    /// Whether no further transition can happen.
    #[must_use]
    pub fn is_final(self) -> bool {
        matches!(self, Self::Terminal | Self::Failed)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Routing => "routing",
            Self::AwaitingDecision => "awaiting_decision",
            Self::Invoking => "invoking",
            Self::Terminal => "terminal",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Record of one engine run.
#[derive(Debug)]
pub struct EngineRun {
    /// Capability ids offered to the backend.
    pub presented: Vec<String>,
    /// States visited, starting at [`SessionState::Routing`].
    pub transitions: Vec<SessionState>,
    /// Backend round trips used.
    pub steps: usize,
    /// The capability invoked, if any.
    pub invoked: Option<String>,
    /// Final output or failure.
    pub outcome: SessionResult<String>,
}

impl EngineRun {
    fn started() -> Self {
        Self {
            presented: Vec::new(),
            transitions: vec![SessionState::Routing],
            steps: 0,
            invoked: None,
            outcome: Err(SessionError::Aborted),
        }
    }

    /// A run that never reached the decision loop.
    pub(crate) fn failed_routing(error: SessionError) -> Self {
        Self::started().fail(error)
    }

    fn enter(&mut self, state: SessionState) {
        self.transitions.push(state);
    }

    fn finish(mut self, output: String) -> Self {
        self.enter(SessionState::Terminal);
        self.outcome = Ok(output);
        self
    }

    fn fail(mut self, error: SessionError) -> Self {
        self.enter(SessionState::Failed);
        self.outcome = Err(error);
        self
    }

    /// The last state entered.
    #[must_use]
    pub fn final_state(&self) -> SessionState {
        self.transitions
            .last()
            .copied()
            .unwrap_or(SessionState::Routing)
    }
}

/// Runs the decision loop for a selected handler.
///
/// Holds only immutable configuration and a shared backend, so one engine
/// can serve concurrent sessions.
pub struct Engine<P: LlmProvider> {
    llm: Arc<P>,
    config: EngineConfig,
}

impl<P: LlmProvider> Engine<P> {
    /// Create an engine around an injected backend.
    #[must_use]
    pub fn new(llm: Arc<P>, config: EngineConfig) -> Self {
        Self { llm, config }
    }

    /// The backend.
    #[must_use]
    pub fn llm(&self) -> &Arc<P> {
        &self.llm
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl<P: LlmProvider> std::fmt::Debug for Engine<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("provider", &self.llm.name())
            .field("model", &self.llm.model())
            .field("config", &self.config)
            .finish()
    }
}
