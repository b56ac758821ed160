//! Bridge from `switchboard_config::Config` to domain types.
//!
//! The config crate depends on no other Switchboard crate. These functions
//! translate its types into the engine, provider, router and logging
//! types, so the conversion happens in exactly one place.

use std::sync::Arc;
use std::time::Duration;

use switchboard_config::{Config, DirectReplySetting, RoutingStrategy};
use switchboard_core::RetryConfig;
use switchboard_llm::{LlmProvider, LlmResult, OpenAiCompatProvider, ProviderConfig};
use switchboard_telemetry::{FileRotation, LogConfig, LogFormat};

use crate::engine::{DirectReplyPolicy, EngineConfig};
use crate::handler::HandlerCatalog;
use crate::router::{LlmRouter, Router, TableRouter};

/// Convert config to [`RetryConfig`].
#[must_use]
pub fn to_retry_config(cfg: &Config) -> RetryConfig {
    RetryConfig::new(
        cfg.retry.max_attempts,
        Duration::from_millis(cfg.retry.initial_delay_ms),
        Duration::from_millis(cfg.retry.max_delay_ms),
        cfg.retry.backoff_factor,
    )
    .with_jitter(cfg.retry.jitter)
}

/// Convert config to [`EngineConfig`].
///
/// A `session_timeout_secs` of zero means no timeout.
#[must_use]
pub fn to_engine_config(cfg: &Config) -> EngineConfig {
    let direct_reply = match cfg.engine.direct_reply {
        DirectReplySetting::Accept => DirectReplyPolicy::Accept,
        DirectReplySetting::Reject => DirectReplyPolicy::Reject,
    };

    EngineConfig {
        max_steps: cfg.engine.max_steps,
        retry: to_retry_config(cfg),
        direct_reply,
        session_timeout: (cfg.engine.session_timeout_secs > 0)
            .then(|| Duration::from_secs(cfg.engine.session_timeout_secs)),
    }
}

/// Convert config to [`ProviderConfig`].
///
/// The API key already includes env var fallbacks applied at load time. A
/// missing key becomes an empty string; the provider reports
/// `ApiKeyNotConfigured` on the first call to a remote endpoint.
#[must_use]
pub fn to_provider_config(cfg: &Config) -> ProviderConfig {
    let api_key = cfg.model.api_key.clone().unwrap_or_default();

    let mut provider = ProviderConfig::new(&cfg.model.provider, api_key, &cfg.model.model)
        .max_tokens(cfg.model.max_tokens)
        .temperature(cfg.model.temperature);

    if let Some(url) = cfg.model.api_url.as_deref().filter(|u| !u.is_empty()) {
        provider = provider.base_url(url);
    }

    provider
}

/// Build the HTTP provider described by the `[model]` section.
///
/// # Errors
///
/// Returns an error if the provider identifier is unknown or lacks a
/// required URL.
pub fn build_provider(cfg: &Config) -> LlmResult<OpenAiCompatProvider> {
    Ok(OpenAiCompatProvider::from_config(&to_provider_config(cfg))?
        .with_request_timeout(Duration::from_secs(cfg.model.request_timeout_secs)))
}

/// Convert config to [`LogConfig`].
#[must_use]
pub fn to_log_config(cfg: &Config) -> LogConfig {
    let format = match cfg.logging.format.as_str() {
        "pretty" => LogFormat::Pretty,
        "json" => LogFormat::Json,
        "full" => LogFormat::Full,
        _ => LogFormat::Compact,
    };

    let mut log = LogConfig::new(&cfg.logging.level).with_format(format);
    for directive in &cfg.logging.directives {
        log = log.with_directive(directive);
    }
    if let Some(dir) = cfg.logging.file_dir.as_deref().filter(|d| !d.is_empty()) {
        log = log.with_file_logging(dir, FileRotation::Daily);
    }
    log
}

/// Build the router selected by `[routing] strategy`.
pub fn build_router<P: LlmProvider + 'static>(
    cfg: &Config,
    catalog: &HandlerCatalog,
    llm: Arc<P>,
) -> Arc<dyn Router> {
    let table = catalog.routing_table();
    match cfg.routing.strategy {
        RoutingStrategy::Table => Arc::new(TableRouter::new(table)),
        RoutingStrategy::Llm => {
            Arc::new(LlmRouter::new(llm, table).with_retry(to_retry_config(cfg)))
        },
    }
}
