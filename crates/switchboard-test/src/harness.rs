//! Test harness helpers.

use std::path::PathBuf;

use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

/// Install a test-writer subscriber with `filter`. Safe to call from every
/// test; only the first call wins.
pub fn setup_test_logging(filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_test_writer()
        .try_init();
}

/// Install test logging at `warn`.
pub fn setup_test_logging_default() {
    setup_test_logging("warn");
}

/// A temporary `~/.switchboard` style directory for config tests.
#[derive(Debug)]
pub struct TestHome {
    /// Backing directory, removed on drop.
    pub dir: TempDir,
}

impl TestHome {
    /// Create an empty home.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dir: TempDir::with_prefix("switchboard-test").expect("Failed to create temp directory"),
        }
    }

    /// Path of the directory.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        self.dir.path()
    }

    /// Write `config.toml` into the home.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    #[must_use]
    pub fn with_user_config(self, content: &str) -> Self {
        std::fs::write(self.dir.path().join("config.toml"), content)
            .expect("Failed to write user config");
        self
    }

    /// Write a file with `name` next to the user config and return its path.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    #[must_use]
    pub fn create_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, content).expect("Failed to write file");
        path
    }
}

impl Default for TestHome {
    fn default() -> Self {
        Self::new()
    }
}
