//! Configuration file parsing for `weave.toml`.
//!
//! ```toml
//! [fetch]
//! max_depth = 16
//! batch_size = 500
//!
//! [debug]
//! log_values = false
//!
//! [environments.development.debug]
//! log_values = true
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{FetchError, FetchResult};

/// Main configuration structure for `weave.toml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WeaveConfig {
    /// Traversal settings.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Debug/logging settings.
    #[serde(default)]
    pub debug: DebugConfig,

    /// Environment-specific overrides.
    #[serde(default)]
    pub environments: HashMap<String, EnvironmentOverride>,
}

impl WeaveConfig {
    /// Load configuration from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> FetchResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            FetchError::invalid_configuration(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))
            .with_source(e)
        })?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> FetchResult<Self> {
        let expanded = expand_env_vars(content)?;

        let config: Self = toml::from_str(&expanded).map_err(|e| {
            FetchError::invalid_configuration(format!("Invalid configuration: {}", e))
                .with_source(e)
        })?;
        config.fetch.validate()?;
        Ok(config)
    }

    /// Apply environment-specific overrides.
    pub fn with_environment(mut self, env: &str) -> FetchResult<Self> {
        if let Some(overrides) = self.environments.remove(env) {
            if let Some(fetch) = overrides.fetch {
                if let Some(max_depth) = fetch.max_depth {
                    self.fetch.max_depth = max_depth;
                }
                if let Some(batch_size) = fetch.batch_size {
                    self.fetch.batch_size = Some(batch_size);
                }
            }
            if let Some(debug) = overrides.debug {
                if let Some(log_values) = debug.log_values {
                    self.debug.log_values = log_values;
                }
            }
            self.fetch.validate()?;
        }
        Ok(self)
    }
}

/// Traversal settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FetchConfig {
    /// Deepest selection level resolved before failing. The root values are
    /// level 0.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Most ids passed to one host call. Unset means every id of a level goes
    /// into a single call.
    #[serde(default)]
    pub batch_size: Option<usize>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            batch_size: None,
        }
    }
}

impl FetchConfig {
    /// Check the settings are usable.
    pub fn validate(&self) -> FetchResult<()> {
        if self.batch_size == Some(0) {
            return Err(FetchError::invalid_configuration(
                "fetch.batch_size must be at least 1",
            )
            .with_help("Remove batch_size to send every id of a level in one call"));
        }
        Ok(())
    }
}

fn default_max_depth() -> usize {
    32
}

/// Debug settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DebugConfig {
    /// Include the `Debug` form of each value in trace events.
    #[serde(default)]
    pub log_values: bool,
}

/// Environment-specific overrides.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentOverride {
    /// Fetch overrides.
    pub fetch: Option<FetchOverride>,

    /// Debug overrides.
    pub debug: Option<DebugOverride>,
}

/// Fetch configuration overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FetchOverride {
    /// Override max_depth.
    pub max_depth: Option<usize>,

    /// Override batch_size.
    pub batch_size: Option<usize>,
}

/// Debug configuration overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DebugOverride {
    /// Override log_values.
    pub log_values: Option<bool>,
}

/// Expand `${VAR}` references from the environment. Unset variables are left
/// as written.
fn expand_env_vars(content: &str) -> FetchResult<String> {
    let re = regex_lite::Regex::new(r"\$\{([^}]+)\}")
        .map_err(|e| FetchError::internal(format!("invalid env var pattern: {}", e)))?;

    let mut result = content.to_string();
    for cap in re.captures_iter(content) {
        let var_name = &cap[1];
        let full_match = &cap[0];

        if let Ok(value) = std::env::var(var_name) {
            result = result.replace(full_match, &value);
        }
    }

    Ok(result)
}
