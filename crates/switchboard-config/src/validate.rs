//! Post-merge configuration validation.

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

/// Providers the OpenAI-compatible client knows how to reach.
pub const SUPPORTED_PROVIDERS: &[&str] = &["gemini", "openai", "lm-studio", "openai-compat"];

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];
const LOG_FORMATS: &[&str] = &["pretty", "compact", "json", "full"];

/// Upper bound for `engine.max_steps`.
const MAX_STEPS_UPPER_BOUND: usize = 100;
/// Upper bound for `retry.max_attempts`.
const MAX_RETRY_ATTEMPTS: u32 = 10;

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_owned(),
        message: message.into(),
    }
}

/// Validate a merged and deserialized configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_model(config)?;
    validate_engine(config)?;
    validate_retry(config)?;
    validate_logging(config)?;
    Ok(())
}

fn validate_model(config: &Config) -> ConfigResult<()> {
    let m = &config.model;

    if !SUPPORTED_PROVIDERS.contains(&m.provider.as_str()) {
        return Err(invalid(
            "model.provider",
            format!(
                "unsupported provider '{}'; expected one of: {}",
                m.provider,
                SUPPORTED_PROVIDERS.join(", ")
            ),
        ));
    }

    if m.provider == "openai-compat" && m.api_url.as_deref().is_none_or(str::is_empty) {
        return Err(invalid(
            "model.api_url",
            "openai-compat provider requires an api_url",
        ));
    }

    if m.model.trim().is_empty() {
        return Err(invalid("model.model", "model name must not be empty"));
    }

    if !m.temperature.is_finite() || !(0.0..=1.0).contains(&m.temperature) {
        return Err(invalid(
            "model.temperature",
            format!("temperature {} must be between 0.0 and 1.0", m.temperature),
        ));
    }

    if m.max_tokens == 0 {
        return Err(invalid("model.max_tokens", "max_tokens must be at least 1"));
    }

    if m.request_timeout_secs == 0 {
        return Err(invalid(
            "model.request_timeout_secs",
            "request timeout must be at least 1 second",
        ));
    }

    Ok(())
}

fn validate_engine(config: &Config) -> ConfigResult<()> {
    let steps = config.engine.max_steps;
    if steps == 0 || steps > MAX_STEPS_UPPER_BOUND {
        return Err(invalid(
            "engine.max_steps",
            format!("max_steps must be between 1 and {MAX_STEPS_UPPER_BOUND}"),
        ));
    }
    Ok(())
}

fn validate_retry(config: &Config) -> ConfigResult<()> {
    let r = &config.retry;

    if r.max_attempts > MAX_RETRY_ATTEMPTS {
        return Err(invalid(
            "retry.max_attempts",
            format!("max_attempts must be at most {MAX_RETRY_ATTEMPTS}"),
        ));
    }

    if !r.backoff_factor.is_finite() || r.backoff_factor < 1.0 {
        return Err(invalid(
            "retry.backoff_factor",
            "backoff_factor must be a finite number >= 1.0",
        ));
    }

    if !r.jitter.is_finite() || !(0.0..=1.0).contains(&r.jitter) {
        return Err(invalid("retry.jitter", "jitter must be between 0.0 and 1.0"));
    }

    if r.initial_delay_ms > r.max_delay_ms {
        return Err(invalid(
            "retry.initial_delay_ms",
            format!(
                "initial_delay_ms ({}) exceeds max_delay_ms ({})",
                r.initial_delay_ms, r.max_delay_ms
            ),
        ));
    }

    Ok(())
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let l = &config.logging;

    if !LOG_LEVELS.contains(&l.level.to_lowercase().as_str()) {
        return Err(invalid(
            "logging.level",
            format!(
                "unknown level '{}'; expected one of: {}",
                l.level,
                LOG_LEVELS.join(", ")
            ),
        ));
    }

    if !LOG_FORMATS.contains(&l.format.as_str()) {
        return Err(invalid(
            "logging.format",
            format!(
                "unknown format '{}'; expected one of: {}",
                l.format,
                LOG_FORMATS.join(", ")
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(result: ConfigResult<()>) -> String {
        match result {
            Err(ConfigError::ValidationError { field, .. }) => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_unknown_provider() {
        let mut config = Config::default();
        config.model.provider = "claude".to_owned();
        assert_eq!(field_of(validate(&config)), "model.provider");
    }

    #[test]
    fn test_compat_requires_url() {
        let mut config = Config::default();
        config.model.provider = "openai-compat".to_owned();
        assert_eq!(field_of(validate(&config)), "model.api_url");

        config.model.api_url = Some("http://localhost:8080/v1/chat/completions".to_owned());
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_temperature_range() {
        let mut config = Config::default();
        config.model.temperature = 1.5;
        assert_eq!(field_of(validate(&config)), "model.temperature");
    }

    #[test]
    fn test_zero_steps_rejected() {
        let mut config = Config::default();
        config.engine.max_steps = 0;
        assert_eq!(field_of(validate(&config)), "engine.max_steps");
    }

    #[test]
    fn test_retry_delays_ordered() {
        let mut config = Config::default();
        config.retry.initial_delay_ms = 60_000;
        assert_eq!(field_of(validate(&config)), "retry.initial_delay_ms");
    }

    #[test]
    fn test_backoff_below_one_rejected() {
        let mut config = Config::default();
        config.retry.backoff_factor = 0.5;
        assert_eq!(field_of(validate(&config)), "retry.backoff_factor");
    }

    #[test]
    fn test_unknown_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_owned();
        assert_eq!(field_of(validate(&config)), "logging.format");
    }
}
