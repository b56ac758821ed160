//! Logging configuration and subscriber setup.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::Subscriber;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::error::{TelemetryError, TelemetryResult};

fn init_err<E: std::fmt::Display>(e: E) -> TelemetryError {
    TelemetryError::InitError(e.to_string())
}

/// File rotation strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileRotation {
    /// Rotate daily.
    #[default]
    Daily,
    /// Rotate hourly.
    Hourly,
    /// Never rotate.
    Never,
}

impl From<FileRotation> for Rotation {
    fn from(rotation: FileRotation) -> Self {
        match rotation {
            FileRotation::Daily => Rotation::DAILY,
            FileRotation::Hourly => Rotation::HOURLY,
            FileRotation::Never => Rotation::NEVER,
        }
    }
}

/// Log format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-line, human-readable.
    Pretty,
    /// Single line per event (default).
    #[default]
    Compact,
    /// Newline-delimited JSON.
    Json,
    /// The default `tracing-subscriber` format.
    Full,
}

/// Log output target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogTarget {
    /// Log to stdout.
    Stdout,
    /// Log to stderr. Keeps the session transcript on stdout clean.
    #[default]
    Stderr,
    /// Log to rolling files in this directory.
    File(PathBuf),
}

/// Rolling file settings, used when the target is [`LogTarget::File`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLogConfig {
    /// File name prefix (`switchboard` produces `switchboard.2026-01-15.log`).
    pub prefix: String,
    /// Rotation strategy.
    pub rotation: FileRotation,
    /// Number of rotated files to keep (0 = unlimited).
    pub max_files: usize,
}

impl Default for FileLogConfig {
    fn default() -> Self {
        Self {
            prefix: "switchboard".to_string(),
            rotation: FileRotation::default(),
            max_files: 0,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Base level filter (e.g. "info", "debug", "warn").
    pub level: String,
    /// Output format.
    pub format: LogFormat,
    /// Output target.
    pub target: LogTarget,
    /// Rolling file settings.
    pub file: FileLogConfig,
    /// Include timestamps.
    pub timestamps: bool,
    /// Include source file and line.
    pub file_info: bool,
    /// Emit span open/close events.
    pub span_events: bool,
    /// Use ANSI colors. Ignored for file output.
    pub ansi: bool,
    /// Extra per-target directives (e.g. `switchboard_runtime=debug`).
    pub directives: Vec<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::default(),
            target: LogTarget::default(),
            file: FileLogConfig::default(),
            timestamps: true,
            file_info: false,
            span_events: false,
            ansi: true,
            directives: Vec::new(),
        }
    }
}

impl LogConfig {
    /// Create a log config with the given base level.
    #[must_use]
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            ..Default::default()
        }
    }

    /// Set the output format.
    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the output target.
    #[must_use]
    pub fn with_target(mut self, target: LogTarget) -> Self {
        self.target = target;
        self
    }

    /// Log to rolling files under `directory`.
    #[must_use]
    pub fn with_file_logging(mut self, directory: impl Into<PathBuf>, rotation: FileRotation) -> Self {
        self.target = LogTarget::File(directory.into());
        self.file.rotation = rotation;
        self.ansi = false;
        self
    }

    /// Add a directive override.
    #[must_use]
    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    /// Disable timestamps.
    #[must_use]
    pub fn without_timestamps(mut self) -> Self {
        self.timestamps = false;
        self
    }

    /// Disable ANSI colors.
    #[must_use]
    pub fn without_ansi(mut self) -> Self {
        self.ansi = false;
        self
    }

    /// Build the env filter from the base level and directives.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::ConfigError`] if the level or any directive
    /// fails to parse.
    pub fn build_filter(&self) -> TelemetryResult<EnvFilter> {
        let mut filter = EnvFilter::try_new(&self.level)
            .map_err(|e| TelemetryError::ConfigError(e.to_string()))?;

        for directive in &self.directives {
            let parsed = directive
                .parse()
                .map_err(|e: tracing_subscriber::filter::ParseError| {
                    TelemetryError::ConfigError(format!("invalid directive '{directive}': {e}"))
                })?;
            filter = filter.add_directive(parsed);
        }

        Ok(filter)
    }

    fn fmt_span(&self) -> FmtSpan {
        if self.span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }

    fn make_writer(&self) -> TelemetryResult<BoxMakeWriter> {
        match &self.target {
            LogTarget::Stdout => Ok(BoxMakeWriter::new(std::io::stdout)),
            LogTarget::Stderr => Ok(BoxMakeWriter::new(std::io::stderr)),
            LogTarget::File(dir) => {
                std::fs::create_dir_all(dir).map_err(|e| {
                    TelemetryError::ConfigError(format!(
                        "failed to create log directory {}: {e}",
                        dir.display()
                    ))
                })?;

                let mut builder = RollingFileAppender::builder()
                    .rotation(self.file.rotation.into())
                    .filename_prefix(&self.file.prefix)
                    .filename_suffix("log");
                if self.file.max_files > 0 {
                    builder = builder.max_log_files(self.file.max_files);
                }
                let appender = builder.build(dir).map_err(init_err)?;
                Ok(BoxMakeWriter::new(appender))
            },
        }
    }
}

/// Build the formatting layer for `config`, writing to `writer`.
fn fmt_layer<S>(config: &LogConfig, writer: BoxMakeWriter) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let ansi = config.ansi && !matches!(config.target, LogTarget::File(_));
    let base = fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_file(config.file_info)
        .with_line_number(config.file_info)
        .with_span_events(config.fmt_span());

    match (config.format, config.timestamps) {
        (LogFormat::Json, true) => base.json().boxed(),
        (LogFormat::Json, false) => base.json().without_time().boxed(),
        (LogFormat::Pretty, true) => base.pretty().boxed(),
        (LogFormat::Pretty, false) => base.pretty().without_time().boxed(),
        (LogFormat::Compact, true) => base.compact().boxed(),
        (LogFormat::Compact, false) => base.compact().without_time().boxed(),
        (LogFormat::Full, true) => base.boxed(),
        (LogFormat::Full, false) => base.without_time().boxed(),
    }
}

/// Install the global subscriber described by `config`.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the log directory
/// cannot be created, or a global subscriber is already set.
pub fn setup_logging(config: &LogConfig) -> TelemetryResult<()> {
    let filter = config.build_filter()?;
    let writer = config.make_writer()?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer(config, writer))
        .try_init()
        .map_err(init_err)
}

/// Install the default subscriber (warn level, stderr, compact).
///
/// # Errors
///
/// Returns an error if a global subscriber is already set.
pub fn setup_default_logging() -> TelemetryResult<()> {
    setup_logging(&LogConfig::default())
}
