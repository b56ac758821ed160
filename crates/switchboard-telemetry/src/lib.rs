//! Switchboard Telemetry - Logging and session tracing.
//!
//! This crate provides:
//! - [`setup_logging`] driven by a serializable [`LogConfig`]
//! - [`SessionSpan`], the correlation context opened for every dispatch
//!
//! # Example
//!
//! ```rust,no_run
//! use switchboard_telemetry::{LogConfig, LogFormat, SessionSpan, setup_logging};
//!
//! # fn main() -> Result<(), switchboard_telemetry::TelemetryError> {
//! let config = LogConfig::new("info")
//!     .with_format(LogFormat::Compact)
//!     .with_directive("switchboard_runtime=debug");
//! setup_logging(&config)?;
//!
//! let session = SessionSpan::new("cli").with_issue_type("billing");
//! let _guard = session.span().entered();
//! tracing::info!("Routing request");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

mod context;
mod error;
mod logging;

pub use context::SessionSpan;
pub use error::{TelemetryError, TelemetryResult};
pub use logging::{
    FileLogConfig, FileRotation, LogConfig, LogFormat, LogTarget, setup_default_logging,
    setup_logging,
};
