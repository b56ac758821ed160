#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! Layered configuration for Switchboard.
//!
//! # Usage
//!
//! ```rust,no_run
//! use switchboard_config::Config;
//!
//! let resolved = Config::load(None).unwrap();
//! println!("Using model: {}", resolved.config.model.model);
//! ```
//!
//! # Precedence
//!
//! From highest to lowest priority:
//!
//! 1. Explicit file (`--config path`)
//! 2. User file (`~/.switchboard/config.toml`)
//! 3. Environment variables (`SWITCHBOARD_*`, `GEMINI_API_KEY`,
//!    `OPENAI_API_KEY`), only for fields no file set
//! 4. Embedded defaults (`defaults.toml`)
//!
//! This crate depends on no other Switchboard crate. Conversion to the
//! runtime's types happens in `switchboard_runtime::config_bridge`.

/// Environment variable fallbacks.
pub mod env;
/// Configuration error types.
pub mod error;
/// File discovery and layered loading.
pub mod loader;
/// Deep merge with source tracking.
pub mod merge;
/// Configuration struct definitions.
pub mod types;
/// Validation rules.
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::ResolvedConfig;
pub use merge::ConfigLayer;
pub use types::*;

impl Config {
    /// Load with the full precedence chain.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any file is malformed or the result fails
    /// validation.
    pub fn load(explicit: Option<&std::path::Path>) -> ConfigResult<ResolvedConfig> {
        loader::load(explicit, None)
    }

    /// Load with an alternate `~/.switchboard` directory.
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    pub fn load_with_home(
        explicit: Option<&std::path::Path>,
        switchboard_home: &std::path::Path,
    ) -> ConfigResult<ResolvedConfig> {
        loader::load(explicit, Some(switchboard_home))
    }

    /// Load a single file over the defaults (no user layer, no env).
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read, parsed, or fails
    /// validation.
    pub fn load_file(path: &std::path::Path) -> ConfigResult<Self> {
        loader::load_file(path)
    }
}
