//! Configuration file parsing for `ferrule.toml`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{SchemaError, SchemaResult};

/// Main configuration structure for `ferrule.toml`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FerruleConfig {
    /// Localization settings.
    #[serde(default)]
    pub localization: LocalizationConfig,

    /// Query compilation settings.
    #[serde(default)]
    pub query: QueryConfig,

    /// Debug/logging settings.
    #[serde(default)]
    pub debug: DebugConfig,

    /// Environment-specific overrides.
    #[serde(default)]
    pub environments: HashMap<String, EnvironmentOverride>,
}

impl FerruleConfig {
    /// Load configuration from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> SchemaResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| SchemaError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> SchemaResult<Self> {
        let expanded = expand_env_vars(content);

        let config: Self =
            toml::from_str(&expanded).map_err(|e| SchemaError::TomlError { source: e })?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field invariants serde cannot express.
    pub fn validate(&self) -> SchemaResult<()> {
        let loc = &self.localization;
        if loc.locales.iter().any(|l| l.is_empty() || l.contains('.') || l == ALL_LOCALES) {
            return Err(SchemaError::config(
                "locale codes must be non-empty, contain no dots and not be `all`",
            ));
        }
        if self.query.max_depth == 0 {
            return Err(SchemaError::config("query.max_depth must be at least 1"));
        }
        Ok(())
    }

    /// Apply environment-specific overrides.
    pub fn with_environment(mut self, env: &str) -> Self {
        if let Some(overrides) = self.environments.remove(env) {
            if let Some(query) = overrides.query {
                if let Some(max_depth) = query.max_depth {
                    self.query.max_depth = max_depth;
                }
            }
            if let Some(debug) = overrides.debug {
                if let Some(log_queries) = debug.log_queries {
                    self.debug.log_queries = log_queries;
                }
            }
        }
        self
    }
}

/// Locale token meaning "match in any locale".
pub const ALL_LOCALES: &str = "all";

/// Localization configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LocalizationConfig {
    /// Locale codes documents are stored in. Empty disables localization.
    #[serde(default)]
    pub locales: Vec<String>,
}

impl LocalizationConfig {
    /// Create a config with the given locales.
    pub fn new<I, S>(locales: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            locales: locales.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether localized fields are stored per locale.
    pub fn is_enabled(&self) -> bool {
        !self.locales.is_empty()
    }
}

/// Query compilation settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QueryConfig {
    /// Deepest `and`/`or` nesting that is compiled.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

fn default_max_depth() -> usize {
    32
}

/// Debug/logging configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DebugConfig {
    /// Log every compiled filter at info level.
    #[serde(default)]
    pub log_queries: bool,
}

/// Environment-specific configuration overrides.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentOverride {
    /// Query overrides.
    pub query: Option<QueryOverride>,

    /// Debug overrides.
    pub debug: Option<DebugOverride>,
}

/// Query configuration overrides.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QueryOverride {
    /// Override max_depth.
    pub max_depth: Option<usize>,
}

/// Debug configuration overrides.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DebugOverride {
    /// Override log_queries.
    pub log_queries: Option<bool>,
}

/// Expand environment variables in the format `${VAR_NAME}`.
fn expand_env_vars(content: &str) -> String {
    let re = regex_lite::Regex::new(r"\$\{([^}]+)\}").expect("static pattern");

    re.replace_all(content, |caps: &regex_lite::Captures<'_>| {
        std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
    })
    .into_owned()
}
