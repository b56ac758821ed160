//! Prelude module - commonly used test helpers.
//!
//! Use `use switchboard_test::prelude::*;` in test modules.

pub use crate::fixtures::{
    UNRECOGNIZED_ISSUE_TYPES, basic_billing_context, general_context, premium_billing_context,
    technical_context,
};
pub use crate::harness::{TestHome, setup_test_logging, setup_test_logging_default};
pub use crate::mock_llm::{MockLlmProvider, MockLlmTurn, MockToolCall};
