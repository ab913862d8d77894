//! # Controller Configuration
//!
//! Runtime settings loaded from environment variables.

use std::time::Duration;

/// Runtime configuration shared by the store adapter, the finalizer and logging
///
/// All settings have sensible defaults and can be overridden via environment variables.
/// Environment variables are populated from a ConfigMap using `envFrom` in the deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Field manager recorded by the API server for every write
    pub field_manager: String,
    /// Finalizer token added to managed resources
    pub finalizer: String,
    /// Per-request timeout against the API server (seconds)
    /// A request exceeding it fails as a transport error
    pub request_timeout_secs: u64,
    /// Global log level (ERROR, WARN, INFO, DEBUG, TRACE)
    pub log_level: String,
    /// Log format (json, text)
    pub log_format: String,
    /// Enable color in text format logs
    pub log_enable_color: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        use crate::constants::{
            DEFAULT_FIELD_MANAGER, DEFAULT_FINALIZER, DEFAULT_STORE_REQUEST_TIMEOUT_SECS,
        };
        Self {
            field_manager: DEFAULT_FIELD_MANAGER.to_string(),
            finalizer: DEFAULT_FINALIZER.to_string(),
            request_timeout_secs: DEFAULT_STORE_REQUEST_TIMEOUT_SECS,
            log_level: "INFO".to_string(),
            log_format: "json".to_string(),
            log_enable_color: false,
        }
    }
}

impl ControllerConfig {
    /// Load configuration from environment variables with defaults
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    ///
    /// `from_env` delegates here; tests pass a map instead of mutating the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        use crate::constants::{
            DEFAULT_FIELD_MANAGER, DEFAULT_FINALIZER, DEFAULT_STORE_REQUEST_TIMEOUT_SECS,
        };
        Self {
            field_manager: var_or_default_str(&lookup, "FIELD_MANAGER", DEFAULT_FIELD_MANAGER),
            finalizer: var_or_default_str(&lookup, "MANAGED_FINALIZER", DEFAULT_FINALIZER),
            request_timeout_secs: var_or_default(
                &lookup,
                "STORE_REQUEST_TIMEOUT_SECS",
                DEFAULT_STORE_REQUEST_TIMEOUT_SECS,
            ),
            log_level: var_or_default_str(&lookup, "LOG_LEVEL", "INFO"),
            log_format: var_or_default_str(&lookup, "LOG_FORMAT", "json"),
            log_enable_color: var_or_default_bool(&lookup, "LOG_ENABLE_COLOR", false),
        }
    }

    /// Get the per-request timeout duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Read a variable or return default value
fn var_or_default<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Read a variable as boolean or return default
fn var_or_default_bool<F>(lookup: &F, key: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).map_or(default, |v| {
        let v_lower = v.to_lowercase();
        v_lower == "true" || v_lower == "1" || v_lower == "yes" || v_lower == "on"
    })
}

/// Read a variable as string or return default
fn var_or_default_str<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = ControllerConfig::from_lookup(|_| None);
        assert_eq!(config, ControllerConfig::default());
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.finalizer, "finalizer.managed.octopilot.io");
    }

    #[test]
    fn test_overrides_are_read() {
        let config = ControllerConfig::from_lookup(lookup_from(&[
            ("FIELD_MANAGER", "db-controller"),
            ("MANAGED_FINALIZER", "finalizer.db.example.org"),
            ("STORE_REQUEST_TIMEOUT_SECS", "5"),
            ("LOG_FORMAT", "text"),
            ("LOG_ENABLE_COLOR", "Yes"),
        ]));
        assert_eq!(config.field_manager, "db-controller");
        assert_eq!(config.finalizer, "finalizer.db.example.org");
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.log_format, "text");
        assert!(config.log_enable_color);
    }

    #[test]
    fn test_unparseable_values_fall_back_to_defaults() {
        let config = ControllerConfig::from_lookup(lookup_from(&[
            ("STORE_REQUEST_TIMEOUT_SECS", "soon"),
            ("FIELD_MANAGER", ""),
        ]));
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.field_manager, "managed-runtime");
    }
}
