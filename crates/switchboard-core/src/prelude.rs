//! Prelude module - commonly used types for convenient import.
//!
//! Use `use switchboard_core::prelude::*;` to import all essential types.

// Session attributes
pub use crate::{ISSUE_BILLING, ISSUE_GENERAL, ISSUE_TECHNICAL, SessionContext};

// Retry
pub use crate::retry::{RetryConfig, RetryOutcome, retry_with_cancel};
