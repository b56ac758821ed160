//! Common imports for working with capabilities.
//!
//! ```rust
//! use switchboard_tools::prelude::*;
//!
//! use std::sync::Arc;
//!
//! let set: CapabilitySet = [Arc::new(RefundCapability) as Arc<dyn Capability>]
//!     .into_iter()
//!     .collect();
//! assert!(set.get("refund").is_some());
//! ```

pub use crate::{
    Capability, CapabilityError, CapabilityResult, CapabilitySet, GeneralInfoCapability,
    RefundCapability, RestartServiceCapability, definition,
};
