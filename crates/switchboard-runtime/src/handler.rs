//! Handlers and the standard support-desk catalog.

use std::sync::Arc;

use switchboard_core::{ISSUE_BILLING, ISSUE_GENERAL, ISSUE_TECHNICAL, SessionContext};
use switchboard_tools::{
    Capability, CapabilitySet, GeneralInfoCapability, RefundCapability, RestartServiceCapability,
};

use crate::router::RoutingTable;

/// Billing handler name.
pub const BILLING_AGENT: &str = "BillingAgent";
/// Technical handler name.
pub const TECHNICAL_AGENT: &str = "TechnicalAgent";
/// General handler name.
pub const GENERAL_AGENT: &str = "GeneralAgent";

const BILLING_INSTRUCTIONS: &str = "You are the BillingAgent. You handle refunds and payments.

If the user asks for a refund and they are a premium user, call the refund tool.

Never answer with a message of your own. Your response must come from the refund tool.";

const TECHNICAL_INSTRUCTIONS: &str = "You are the TechnicalAgent. You handle errors and service issues.

If the user reports a technical problem, call the restart_service tool.

Never answer with a message of your own. Your response must come from the restart_service tool.";

const GENERAL_INSTRUCTIONS: &str = "You are the GeneralAgent. You handle general questions.

For any general question, call the general_info tool.

Never answer with a message of your own. Your response must come from the general_info tool.";

/// A named specialization: instructions plus the capabilities it may use.
///
/// Built once at startup and shared read-only behind an [`Arc`].
#[derive(Debug, Clone)]
pub struct Handler {
    name: String,
    instructions: String,
    capabilities: CapabilitySet,
}

impl Handler {
    /// Create a handler with no capabilities.
    pub fn new(name: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            capabilities: CapabilitySet::new(),
        }
    }

    /// Add a capability.
    #[must_use]
    pub fn with_capability(mut self, capability: Arc<dyn Capability>) -> Self {
        self.capabilities.register(capability);
        self
    }

    /// Handler name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Behavioral instructions.
    #[must_use]
    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    /// Every capability the handler owns, enabled or not.
    #[must_use]
    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    /// System prompt for a session: the instructions followed by the
    /// session attributes.
    #[must_use]
    pub fn system_prompt(&self, ctx: &SessionContext) -> String {
        format!(
            "{}\n\nSession attributes:\n{}",
            self.instructions,
            ctx.describe()
        )
    }
}

/// The three support-desk handlers.
#[derive(Debug, Clone)]
pub struct HandlerCatalog {
    billing: Arc<Handler>,
    technical: Arc<Handler>,
    general: Arc<Handler>,
}

impl HandlerCatalog {
    /// Build the standard catalog. Each capability is created once and
    /// shared by identity.
    #[must_use]
    pub fn standard() -> Self {
        let refund: Arc<dyn Capability> = Arc::new(RefundCapability);
        let restart: Arc<dyn Capability> = Arc::new(RestartServiceCapability);
        let info: Arc<dyn Capability> = Arc::new(GeneralInfoCapability);

        Self {
            billing: Arc::new(Handler::new(BILLING_AGENT, BILLING_INSTRUCTIONS).with_capability(refund)),
            technical: Arc::new(
                Handler::new(TECHNICAL_AGENT, TECHNICAL_INSTRUCTIONS).with_capability(restart),
            ),
            general: Arc::new(Handler::new(GENERAL_AGENT, GENERAL_INSTRUCTIONS).with_capability(info)),
        }
    }

    /// Billing handler.
    #[must_use]
    pub fn billing(&self) -> &Arc<Handler> {
        &self.billing
    }

    /// Technical handler.
    #[must_use]
    pub fn technical(&self) -> &Arc<Handler> {
        &self.technical
    }

    /// General handler, also the routing default.
    #[must_use]
    pub fn general(&self) -> &Arc<Handler> {
        &self.general
    }

    /// Look up a handler by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<Handler>> {
        self.all().into_iter().find(|h| h.name() == name)
    }

    /// All handlers.
    #[must_use]
    pub fn all(&self) -> [&Arc<Handler>; 3] {
        [&self.billing, &self.technical, &self.general]
    }

    /// Routing table keyed by issue type, defaulting to the general handler.
    #[must_use]
    pub fn routing_table(&self) -> RoutingTable {
        RoutingTable::new(Arc::clone(&self.general))
            .with_route(ISSUE_BILLING, Arc::clone(&self.billing))
            .with_route(ISSUE_TECHNICAL, Arc::clone(&self.technical))
            .with_route(ISSUE_GENERAL, Arc::clone(&self.general))
    }
}

impl Default for HandlerCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
