//! Per-session attributes used for routing and capability gating.

use serde::{Deserialize, Serialize};

/// Issue type routed to the billing handler.
pub const ISSUE_BILLING: &str = "billing";
/// Issue type routed to the technical handler.
pub const ISSUE_TECHNICAL: &str = "technical";
/// Issue type routed to the general handler.
pub const ISSUE_GENERAL: &str = "general";

/// Immutable attribute record for a single support session.
///
/// Fields are private; once built, a context can only be read. Every
/// routing and gating decision for the session is made against the same
/// value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionContext {
    name: String,
    is_premium_user: bool,
    issue_type: String,
}

impl SessionContext {
    /// Create a new session context.
    ///
    /// `issue_type` is stored verbatim. Routing matches it exactly, so
    /// callers collecting it from a user should trim and lowercase it first.
    pub fn new(name: impl Into<String>, is_premium_user: bool, issue_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_premium_user,
            issue_type: issue_type.into(),
        }
    }

    /// The user's display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the user holds a premium plan.
    #[must_use]
    pub fn is_premium_user(&self) -> bool {
        self.is_premium_user
    }

    /// The declared issue category.
    #[must_use]
    pub fn issue_type(&self) -> &str {
        &self.issue_type
    }

    /// Render the attributes as a short block for inclusion in backend prompts.
    #[must_use]
    pub fn describe(&self) -> String {
        format!(
            "User name: {}\nPremium user: {}\nIssue type: {}",
            self.name,
            if self.is_premium_user { "yes" } else { "no" },
            self.issue_type
        )
    }
}
