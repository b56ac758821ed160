//! Deep merge of TOML trees with per-field source tracking.
//!
//! Merging works on raw [`toml::Value`] trees rather than deserialized
//! structs, so a key missing from a layer never overrides the layer below.

use std::collections::HashMap;

/// Which configuration layer a value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLayer {
    /// Compiled-in `defaults.toml`.
    Defaults,
    /// `~/.switchboard/config.toml`.
    User,
    /// File passed with `--config`.
    Explicit,
    /// Environment variable fallback.
    Environment,
}

impl std::fmt::Display for ConfigLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Defaults => write!(f, "defaults"),
            Self::User => write!(f, "user (~/.switchboard/config.toml)"),
            Self::Explicit => write!(f, "explicit config file"),
            Self::Environment => write!(f, "environment variable"),
        }
    }
}

/// Which layer set each dotted field path.
pub type FieldSources = HashMap<String, ConfigLayer>;

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_owned()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Deep-merge `overlay` into `base`, recording the layer for every leaf the
/// overlay sets.
///
/// Tables merge per key. Scalars and arrays replace.
pub fn deep_merge_tracking(
    base: &mut toml::Value,
    overlay: &toml::Value,
    prefix: &str,
    layer: ConfigLayer,
    sources: &mut FieldSources,
) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let path = join_path(prefix, key);
                match base_table.get_mut(key) {
                    Some(base_val) if base_val.is_table() && overlay_val.is_table() => {
                        deep_merge_tracking(base_val, overlay_val, &path, layer, sources);
                    },
                    Some(base_val) => {
                        *base_val = overlay_val.clone();
                        record_leaves(overlay_val, &path, layer, sources);
                    },
                    None => {
                        base_table.insert(key.clone(), overlay_val.clone());
                        record_leaves(overlay_val, &path, layer, sources);
                    },
                }
            }
        },
        (base, overlay) => {
            *base = overlay.clone();
            record_leaves(overlay, prefix, layer, sources);
        },
    }
}

/// Record every leaf under `val` as coming from `layer`.
pub fn record_leaves(val: &toml::Value, prefix: &str, layer: ConfigLayer, sources: &mut FieldSources) {
    if let toml::Value::Table(table) = val {
        for (key, child) in table {
            record_leaves(child, &join_path(prefix, key), layer, sources);
        }
    } else {
        sources.insert(prefix.to_owned(), layer);
    }
}
