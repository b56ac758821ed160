//! Per-session correlation context.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Correlation data for one dispatched session.
///
/// Every log line emitted while a session runs is recorded inside the
/// span returned by [`SessionSpan::span`], so it can be filtered by
/// `session_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSpan {
    /// Unique session identifier.
    pub session_id: Uuid,
    /// When the session started.
    pub started_at: DateTime<Utc>,
    /// Component that opened the session.
    pub source: String,
    /// Declared issue type, if known.
    pub issue_type: Option<String>,
    /// Selected handler, once routing is done.
    pub handler: Option<String>,
}

impl SessionSpan {
    /// Open a new session context.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            started_at: Utc::now(),
            source: source.into(),
            issue_type: None,
            handler: None,
        }
    }

    /// Set the issue type.
    #[must_use]
    pub fn with_issue_type(mut self, issue_type: impl Into<String>) -> Self {
        self.issue_type = Some(issue_type.into());
        self
    }

    /// Set the handler name.
    #[must_use]
    pub fn with_handler(mut self, handler: impl Into<String>) -> Self {
        self.handler = Some(handler.into());
        self
    }

    /// Time since the session started.
    #[must_use]
    pub fn elapsed(&self) -> chrono::Duration {
        Utc::now().signed_duration_since(self.started_at)
    }

    /// Elapsed time in milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> i64 {
        self.elapsed().num_milliseconds()
    }

    /// First eight hex digits of the session id.
    #[must_use]
    pub fn short_id(&self) -> String {
        let mut id = self.session_id.simple().to_string();
        id.truncate(8);
        id
    }

    /// Create the tracing span for this session.
    ///
    /// `handler` is declared empty when unknown and can be filled in later
    /// with `Span::record`.
    #[must_use]
    pub fn span(&self) -> tracing::Span {
        tracing::info_span!(
            "session",
            session_id = %self.short_id(),
            source = %self.source,
            issue_type = self.issue_type.as_deref(),
            handler = self.handler.as_deref(),
        )
    }
}

impl Default for SessionSpan {
    fn default() -> Self {
        Self::new("unknown")
    }
}
