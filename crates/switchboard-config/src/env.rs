//! Environment variable fallbacks.
//!
//! Env vars are a fallback, not an override: they only fill fields that no
//! config file set. Values coming from `defaults.toml` may be replaced.

use std::collections::HashMap;

use tracing::debug;

use crate::merge::{ConfigLayer, FieldSources};

struct EnvMapping {
    var_name: &'static str,
    field_path: &'static str,
}

/// Supported variables. When several map to the same field, the first one
/// present wins.
const ENV_MAPPINGS: &[EnvMapping] = &[
    EnvMapping {
        var_name: "SWITCHBOARD_MODEL_PROVIDER",
        field_path: "model.provider",
    },
    EnvMapping {
        var_name: "SWITCHBOARD_MODEL",
        field_path: "model.model",
    },
    EnvMapping {
        var_name: "SWITCHBOARD_API_KEY",
        field_path: "model.api_key",
    },
    EnvMapping {
        var_name: "SWITCHBOARD_API_URL",
        field_path: "model.api_url",
    },
    EnvMapping {
        var_name: "SWITCHBOARD_MAX_STEPS",
        field_path: "engine.max_steps",
    },
    EnvMapping {
        var_name: "SWITCHBOARD_DIRECT_REPLY",
        field_path: "engine.direct_reply",
    },
    EnvMapping {
        var_name: "SWITCHBOARD_SESSION_TIMEOUT_SECS",
        field_path: "engine.session_timeout_secs",
    },
    EnvMapping {
        var_name: "SWITCHBOARD_RETRY_MAX_ATTEMPTS",
        field_path: "retry.max_attempts",
    },
    EnvMapping {
        var_name: "SWITCHBOARD_ROUTING",
        field_path: "routing.strategy",
    },
    EnvMapping {
        var_name: "SWITCHBOARD_LOG_LEVEL",
        field_path: "logging.level",
    },
    EnvMapping {
        var_name: "SWITCHBOARD_LOG_FORMAT",
        field_path: "logging.format",
    },
    // Provider SDK conventions.
    EnvMapping {
        var_name: "GEMINI_API_KEY",
        field_path: "model.api_key",
    },
    EnvMapping {
        var_name: "OPENAI_API_KEY",
        field_path: "model.api_key",
    },
];

/// Apply env var fallbacks to fields not set by a config file.
///
/// Returns the number of variables applied.
pub fn apply_env_fallbacks<S: ::std::hash::BuildHasher>(
    merged: &mut toml::Value,
    sources: &mut FieldSources,
    env_vars: &HashMap<String, String, S>,
) -> usize {
    let mut count: usize = 0;

    for mapping in ENV_MAPPINGS {
        if matches!(
            sources.get(mapping.field_path),
            Some(ConfigLayer::User | ConfigLayer::Explicit | ConfigLayer::Environment)
        ) {
            continue;
        }

        let Some(val) = env_vars.get(mapping.var_name).filter(|v| !v.is_empty()) else {
            continue;
        };

        debug!(
            var = mapping.var_name,
            field = mapping.field_path,
            "applying env var fallback"
        );
        set_field_from_string(merged, mapping.field_path, val);
        sources.insert(mapping.field_path.to_owned(), ConfigLayer::Environment);
        count = count.saturating_add(1);
    }

    count
}

/// Set a dotted field in the tree, creating intermediate tables.
fn set_field_from_string(root: &mut toml::Value, path: &str, val: &str) {
    let value = coerce_to_toml_value(path, val);
    let (parents, leaf) = path.rsplit_once('.').unwrap_or(("", path));

    let mut current = root;
    for segment in parents.split('.').filter(|s| !s.is_empty()) {
        let Some(table) = current.as_table_mut() else {
            return;
        };
        current = table
            .entry(segment.to_owned())
            .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
    }

    if let Some(table) = current.as_table_mut() {
        table.insert(leaf.to_owned(), value);
    }
}

/// Coerce a string to the TOML type the field expects. Falls back to a
/// string, letting deserialization report a type mismatch.
fn coerce_to_toml_value(path: &str, val: &str) -> toml::Value {
    if matches!(
        path,
        "engine.max_steps" | "engine.session_timeout_secs" | "retry.max_attempts"
    ) && let Ok(i) = val.trim().parse::<i64>()
    {
        return toml::Value::Integer(i);
    }

    toml::Value::String(val.to_owned())
}

/// Snapshot the process environment.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars().collect()
}
