//! Switchboard Test - Shared test utilities.
//!
//! Mocks and fixtures used as a dev-dependency across the workspace.
//!
//! ```toml
//! [dev-dependencies]
//! switchboard-test.workspace = true
//! ```
//!
//! ```rust,ignore
//! use switchboard_test::{MockLlmProvider, MockLlmTurn, premium_billing_context};
//!
//! let llm = Arc::new(MockLlmProvider::new(vec![MockLlmTurn::call("refund")]));
//! let report = dispatcher.handle(&premium_billing_context(), "please refund me").await;
//! assert_eq!(report.final_text(), "Ava, your refund has been initiated.");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

pub mod fixtures;
pub mod harness;
pub mod mock_llm;

pub use fixtures::*;
pub use harness::*;
pub use mock_llm::*;
