//! General information capability. Always enabled.

use switchboard_core::SessionContext;

use crate::{Capability, CapabilityResult};

/// Shares general information about the services on offer.
pub struct GeneralInfoCapability;

#[async_trait::async_trait]
impl Capability for GeneralInfoCapability {
    fn id(&self) -> &'static str {
        "general_info"
    }

    fn description(&self) -> &'static str {
        "Share general information about our services."
    }

    fn is_enabled(&self, _ctx: &SessionContext) -> bool {
        true
    }

    async fn invoke(&self, ctx: &SessionContext) -> CapabilityResult<String> {
        Ok(format!(
            "Hi {}, here's some general info about our services.",
            ctx.name()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_always_enabled_and_greets() {
        let ctx = SessionContext::new("Kim", false, "shipping??");
        let cap = GeneralInfoCapability;
        assert!(cap.is_enabled(&ctx));
        assert_eq!(
            cap.invoke(&ctx).await.unwrap(),
            "Hi Kim, here's some general info about our services."
        );
    }
}
