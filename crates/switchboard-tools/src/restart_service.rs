//! Service restart capability, available for technical issues.

use switchboard_core::{ISSUE_TECHNICAL, SessionContext};
use tracing::debug;

use crate::{Capability, CapabilityResult};

/// Restarts the user's service.
pub struct RestartServiceCapability;

#[async_trait::async_trait]
impl Capability for RestartServiceCapability {
    fn id(&self) -> &'static str {
        "restart_service"
    }

    fn description(&self) -> &'static str {
        "Restart the user's service."
    }

    fn is_enabled(&self, ctx: &SessionContext) -> bool {
        ctx.issue_type() == ISSUE_TECHNICAL
    }

    async fn invoke(&self, ctx: &SessionContext) -> CapabilityResult<String> {
        debug!(capability = "restart_service", "service restart requested");
        Ok(format!("{}, your service is now being restarted.", ctx.name()))
    }
}
