//! Switchboard Core - Session types and retry primitives.
//!
//! This crate provides:
//! - [`SessionContext`], the immutable per-session attribute record used for
//!   routing and capability gating
//! - [`retry`] with bounded exponential backoff and cancellation, used when
//!   talking to the reasoning backend

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;
pub mod retry;

mod context;

pub use context::{ISSUE_BILLING, ISSUE_GENERAL, ISSUE_TECHNICAL, SessionContext};
pub use retry::{RetryConfig, RetryOutcome};
