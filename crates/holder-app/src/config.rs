//! Application configuration
//!
//! Loaded from TOML, overlaid with `HOLDER_*` environment variables, then
//! validated. Every field has a default so an empty file is a valid config.

use holder_core::HolderError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix of configuration environment variables
pub const ENV_PREFIX: &str = "HOLDER_";

const DAY_MS: u64 = 24 * 60 * 60 * 1000;

/// Expiration engine settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpirationConfig {
    /// Width of the "expires soon" window
    pub safety_window_ms: u64,
    /// Unsellable deadline offset before expiration, when the snapshot has none
    pub unsellable_margin_ms: u64,
    /// Expiration monitor tick
    pub tick_interval_ms: u64,
}

impl Default for ExpirationConfig {
    fn default() -> Self {
        Self {
            safety_window_ms: 7 * DAY_MS,
            unsellable_margin_ms: DAY_MS,
            tick_interval_ms: 1_000,
        }
    }
}

/// Action dispatch settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Refetch the snapshot after each successful action
    pub refetch_after_action: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            refetch_after_action: true,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Expiration engine
    pub expiration: ExpirationConfig,
    /// Action dispatch
    pub dispatch: DispatchConfig,
    /// Append context strings to generic transport messages
    pub debug_error_context: bool,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, HolderError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            HolderError::internal(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, HolderError> {
        toml::from_str(content).map_err(|e| HolderError::invalid(format!("Invalid TOML: {e}")))
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> Result<String, HolderError> {
        toml::to_string_pretty(self).map_err(|e| HolderError::serialization(e.to_string()))
    }

    /// Overlay `HOLDER_*` variables from the process environment.
    pub fn merge_with_env(&mut self) -> Result<(), HolderError> {
        self.merge_env_from(std::env::vars())
    }

    /// Overlay `HOLDER_*` variables from `vars`; other names are ignored.
    ///
    /// `HOLDER_EXPIRATION_SAFETY_WINDOW_MS` maps to `expiration.safety_window_ms`.
    /// `HOLDER_*` names that match no key are skipped with a warning; a known
    /// key with an unparsable value is an error.
    pub fn merge_env_from<I>(&mut self, vars: I) -> Result<(), HolderError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (name, value) in vars {
            let Some(rest) = name.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let key = env_key(&rest.to_ascii_lowercase());
            if !KEYS.contains(&key.as_str()) {
                tracing::warn!(variable = %name, "ignoring unknown configuration variable");
                continue;
            }
            self.set_from_string(&key, &value)?;
        }
        Ok(())
    }

    /// Set one dotted key from its string form.
    pub fn set_from_string(&mut self, key: &str, value: &str) -> Result<(), HolderError> {
        match key {
            "expiration.safety_window_ms" => {
                self.expiration.safety_window_ms = parse_u64(key, value)?;
            }
            "expiration.unsellable_margin_ms" => {
                self.expiration.unsellable_margin_ms = parse_u64(key, value)?;
            }
            "expiration.tick_interval_ms" => {
                self.expiration.tick_interval_ms = parse_u64(key, value)?;
            }
            "dispatch.refetch_after_action" => {
                self.dispatch.refetch_after_action = parse_bool(key, value)?;
            }
            "debug_error_context" => {
                self.debug_error_context = parse_bool(key, value)?;
            }
            other => {
                return Err(HolderError::invalid(format!(
                    "Unknown configuration key: {other}"
                )))
            }
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), HolderError> {
        if self.expiration.tick_interval_ms == 0 {
            return Err(HolderError::invalid(
                "expiration.tick_interval_ms must be greater than zero",
            ));
        }
        if self.expiration.safety_window_ms == 0 {
            return Err(HolderError::invalid(
                "expiration.safety_window_ms must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// Every key accepted by [`AppConfig::set_from_string`]
const KEYS: [&str; 5] = [
    "expiration.safety_window_ms",
    "expiration.unsellable_margin_ms",
    "expiration.tick_interval_ms",
    "dispatch.refetch_after_action",
    "debug_error_context",
];

/// Turn `expiration_safety_window_ms` into `expiration.safety_window_ms`.
fn env_key(lower: &str) -> String {
    for section in ["expiration_", "dispatch_"] {
        if let Some(field) = lower.strip_prefix(section) {
            return format!("{}.{field}", section.trim_end_matches('_'));
        }
    }
    lower.to_string()
}

fn parse_u64(key: &str, value: &str) -> Result<u64, HolderError> {
    value.trim().parse().map_err(|e| {
        HolderError::invalid(format!(
            "{key}: expected an integer, got {value:?} ({e})"
        ))
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, HolderError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(HolderError::invalid(format!(
            "{key}: expected a boolean, got {value:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.expiration.safety_window_ms, 604_800_000);
        assert_eq!(config.expiration.unsellable_margin_ms, 86_400_000);
        assert_eq!(config.expiration.tick_interval_ms, 1_000);
        assert!(config.dispatch.refetch_after_action);
        assert!(!config.debug_error_context);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            debug_error_context = true

            [expiration]
            safety_window_ms = 1000
            "#,
        )
        .unwrap();
        assert_eq!(config.expiration.safety_window_ms, 1_000);
        assert_eq!(config.expiration.tick_interval_ms, 1_000);
        assert!(config.debug_error_context);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[dispatch]\nrefetch_after_action = false").unwrap();

        let config = AppConfig::load_from_file(file.path()).unwrap();
        assert!(!config.dispatch.refetch_after_action);
    }

    #[test]
    fn test_missing_file_is_error() {
        let result = AppConfig::load_from_file(Path::new("/nonexistent/holder.toml"));
        assert_matches!(result, Err(HolderError::Internal { .. }));
    }

    #[test]
    fn test_env_overlay() {
        let mut config = AppConfig::default();
        config
            .merge_env_from(vec![
                ("HOLDER_EXPIRATION_TICK_INTERVAL_MS".to_string(), "250".to_string()),
                ("HOLDER_DISPATCH_REFETCH_AFTER_ACTION".to_string(), "off".to_string()),
                ("HOLDER_DEBUG_ERROR_CONTEXT".to_string(), "1".to_string()),
                ("PATH".to_string(), "/usr/bin".to_string()),
            ])
            .unwrap();
        assert_eq!(config.expiration.tick_interval_ms, 250);
        assert!(!config.dispatch.refetch_after_action);
        assert!(config.debug_error_context);
    }

    #[test]
    fn test_env_overlay_rejects_bad_values() {
        let mut config = AppConfig::default();
        let result = config.merge_env_from(vec![(
            "HOLDER_EXPIRATION_SAFETY_WINDOW_MS".to_string(),
            "soon".to_string(),
        )]);
        assert_matches!(result, Err(HolderError::Invalid { .. }));
    }

    #[test]
    fn test_env_overlay_skips_unrelated_holder_variables() {
        let mut config = AppConfig::default();
        config
            .merge_env_from(vec![
                ("HOLDER_LOG".to_string(), "debug".to_string()),
                ("HOLDER_HOME".to_string(), "/var/lib/holder".to_string()),
                ("HOLDER_EXPIRATION_TICK_INTERVAL_MS".to_string(), "500".to_string()),
            ])
            .unwrap();
        assert_eq!(config.expiration.tick_interval_ms, 500);
        assert_eq!(
            config.expiration.safety_window_ms,
            AppConfig::default().expiration.safety_window_ms
        );
    }

    #[test]
    fn test_set_rejects_unknown_key() {
        let mut config = AppConfig::default();
        let result = config.set_from_string("color", "blue");
        assert_matches!(result, Err(HolderError::Invalid { .. }));
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let mut config = AppConfig::default();
        config.expiration.tick_interval_ms = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.expiration.safety_window_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_output_parses_back() {
        let mut config = AppConfig::default();
        config.debug_error_context = true;
        let text = config.to_toml_string().unwrap();
        assert_eq!(AppConfig::from_toml_str(&text).unwrap(), config);
    }
}
