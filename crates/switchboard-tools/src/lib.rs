#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! Gated support-desk capabilities for the Switchboard engine.
//!
//! A capability is a single side-effecting action with a fixed enablement
//! predicate over the [`SessionContext`]. Handlers bundle capabilities; the
//! engine only ever offers the backend those whose predicate holds.

mod general_info;
mod refund;
mod restart_service;

pub mod prelude;

pub use general_info::GeneralInfoCapability;
pub use refund::RefundCapability;
pub use restart_service::RestartServiceCapability;

use std::sync::Arc;

use switchboard_core::SessionContext;
use switchboard_llm::LlmToolDefinition;

/// A named action a handler may take on behalf of the user.
#[async_trait::async_trait]
pub trait Capability: Send + Sync {
    /// Identifier offered to the backend as the tool name.
    fn id(&self) -> &'static str;

    /// Human-readable description for the backend.
    fn description(&self) -> &'static str;

    /// Whether this capability may be invoked for `ctx`.
    fn is_enabled(&self, ctx: &SessionContext) -> bool;

    /// Perform the action and return the text shown to the user.
    async fn invoke(&self, ctx: &SessionContext) -> CapabilityResult<String>;
}

/// Capability execution errors.
#[derive(Debug, thiserror::Error)]
pub enum CapabilityError {
    /// The action itself failed.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),
}

/// Result type for capability execution.
pub type CapabilityResult<T> = Result<T, CapabilityError>;

/// Build the backend-facing definition for a capability.
///
/// Only the id and description are exposed; capabilities take no arguments.
#[must_use]
pub fn definition(capability: &dyn Capability) -> LlmToolDefinition {
    LlmToolDefinition::new(capability.id()).with_description(capability.description())
}

/// Ordered collection of capabilities, looked up by id.
#[derive(Clone, Default)]
pub struct CapabilitySet {
    capabilities: Vec<Arc<dyn Capability>>,
}

impl CapabilitySet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a capability, replacing any existing one with the same id.
    pub fn register(&mut self, capability: Arc<dyn Capability>) {
        if let Some(slot) = self
            .capabilities
            .iter_mut()
            .find(|c| c.id() == capability.id())
        {
            *slot = capability;
        } else {
            self.capabilities.push(capability);
        }
    }

    /// Get a capability by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Arc<dyn Capability>> {
        self.capabilities.iter().find(|c| c.id() == id).cloned()
    }

    /// Whether a capability with `id` is present.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.capabilities.iter().any(|c| c.id() == id)
    }

    /// Iterate in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Capability>> {
        self.capabilities.iter()
    }

    /// Ids in registration order.
    #[must_use]
    pub fn ids(&self) -> Vec<&'static str> {
        self.capabilities.iter().map(|c| c.id()).collect()
    }

    /// Number of registered capabilities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }

    /// Export all definitions for the backend.
    #[must_use]
    pub fn definitions(&self) -> Vec<LlmToolDefinition> {
        self.capabilities.iter().map(|c| definition(c.as_ref())).collect()
    }
}

impl FromIterator<Arc<dyn Capability>> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Arc<dyn Capability>>>(iter: I) -> Self {
        let mut set = Self::new();
        for capability in iter {
            set.register(capability);
        }
        set
    }
}

impl std::fmt::Debug for CapabilitySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilitySet")
            .field("ids", &self.ids())
            .finish()
    }
}
