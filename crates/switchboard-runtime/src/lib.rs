//! Switchboard Runtime - Routing, gating and the decision loop.
//!
//! This crate provides:
//! - [`Handler`] and the standard [`HandlerCatalog`]
//! - [`RoutingTable`] and the [`Router`] strategies ([`TableRouter`],
//!   [`LlmRouter`])
//! - [`enabled_capabilities`], the gating filter
//! - [`Engine`], the bounded decision loop against a reasoning backend
//! - [`Dispatcher`], which composes routing and the engine into one call
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use switchboard_core::SessionContext;
//! use switchboard_llm::OpenAiCompatProvider;
//! use switchboard_runtime::{Dispatcher, Engine, EngineConfig, HandlerCatalog, TableRouter};
//!
//! # async fn example() {
//! let llm = Arc::new(OpenAiCompatProvider::gemini("AIza...", "gemini-2.0-flash"));
//! let catalog = HandlerCatalog::standard();
//! let router = Arc::new(TableRouter::new(catalog.routing_table()));
//! let dispatcher = Dispatcher::new(router, Engine::new(llm, EngineConfig::default()));
//!
//! let ctx = SessionContext::new("Ava", true, "billing");
//! let report = dispatcher.handle(&ctx, "please refund me").await;
//! println!("{}", report.final_text());
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod config_bridge;
pub mod prelude;

mod dispatcher;
mod engine;
mod error;
mod gating;
mod handler;
mod router;

pub use dispatcher::{Dispatcher, SessionReport};
pub use engine::{
    DEFAULT_MAX_STEPS, DirectReplyPolicy, Engine, EngineConfig, EngineRun, SessionState,
};
pub use error::{FailureKind, SessionError, SessionResult};
pub use gating::enabled_capabilities;
pub use handler::{BILLING_AGENT, GENERAL_AGENT, Handler, HandlerCatalog, TECHNICAL_AGENT};
pub use router::{LlmRouter, Router, RoutingTable, TableRouter, transfer_tool_name};
