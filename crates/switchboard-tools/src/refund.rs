//! Refund capability, available to premium users only.

use switchboard_core::SessionContext;
use tracing::debug;

use crate::{Capability, CapabilityResult};

/// Initiates a refund for the current user.
pub struct RefundCapability;

#[async_trait::async_trait]
impl Capability for RefundCapability {
    fn id(&self) -> &'static str {
        "refund"
    }

    fn description(&self) -> &'static str {
        "Initiate a refund for the current user."
    }

    fn is_enabled(&self, ctx: &SessionContext) -> bool {
        ctx.is_premium_user()
    }

    async fn invoke(&self, ctx: &SessionContext) -> CapabilityResult<String> {
        debug!(capability = "refund", "refund initiated");
        Ok(format!("{}, your refund has been initiated.", ctx.name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_premium_gate() {
        let cap = RefundCapability;
        assert!(cap.is_enabled(&SessionContext::new("Ava", true, "billing")));
        assert!(!cap.is_enabled(&SessionContext::new("Sam", false, "billing")));
        // Gate looks at plan only, not issue type.
        assert!(cap.is_enabled(&SessionContext::new("Ava", true, "general")));
    }

    #[tokio::test]
    async fn test_invoke_message() {
        let out = RefundCapability
            .invoke(&SessionContext::new("Ava", true, "billing"))
            .await
            .unwrap();
        assert_eq!(out, "Ava, your refund has been initiated.");
    }
}
