//! Capability gating.

use std::sync::Arc;

use switchboard_core::SessionContext;
use switchboard_tools::CapabilitySet;

use crate::handler::Handler;

/// The subset of `handler`'s capabilities enabled for `ctx`, in the
/// handler's order.
///
/// This is the only set the engine ever offers to the backend or invokes
/// from. An empty result means the handler has no legal action.
#[must_use]
pub fn enabled_capabilities(handler: &Handler, ctx: &SessionContext) -> CapabilitySet {
    handler
        .capabilities()
        .iter()
        .filter(|c| c.is_enabled(ctx))
        .map(Arc::clone)
        .collect()
}
