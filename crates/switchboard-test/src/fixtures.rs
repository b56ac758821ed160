//! Session context fixtures.

use switchboard_core::{ISSUE_BILLING, ISSUE_GENERAL, ISSUE_TECHNICAL, SessionContext};

/// Premium billing customer "Ava".
#[must_use]
pub fn premium_billing_context() -> SessionContext {
    SessionContext::new("Ava", true, ISSUE_BILLING)
}

/// Non-premium billing customer "Sam".
#[must_use]
pub fn basic_billing_context() -> SessionContext {
    SessionContext::new("Sam", false, ISSUE_BILLING)
}

/// Technical issue for `name`.
#[must_use]
pub fn technical_context(name: &str, is_premium_user: bool) -> SessionContext {
    SessionContext::new(name, is_premium_user, ISSUE_TECHNICAL)
}

/// General question for `name`.
#[must_use]
pub fn general_context(name: &str) -> SessionContext {
    SessionContext::new(name, false, ISSUE_GENERAL)
}

/// Issue types that match no route.
pub const UNRECOGNIZED_ISSUE_TYPES: &[&str] = &[
    "",
    "shipping",
    "Billing",
    " technical",
    "billing\n",
    "ß∂ƒ",
    "general; DROP TABLE users",
];
