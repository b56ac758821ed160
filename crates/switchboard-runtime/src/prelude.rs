//! Prelude module - commonly used types for convenient import.
//!
//! Use `use switchboard_runtime::prelude::*;` to import all essential types.

// Handlers and routing
pub use crate::{Handler, HandlerCatalog, Router, RoutingTable, TableRouter};

// Engine
pub use crate::{DirectReplyPolicy, Engine, EngineConfig, SessionState, enabled_capabilities};

// Sessions
pub use crate::{Dispatcher, FailureKind, SessionError, SessionReport, SessionResult};
