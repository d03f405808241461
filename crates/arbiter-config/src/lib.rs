//! Configuration management for Arbiter
//!
//! Provides hierarchical configuration loading from multiple sources:
//! 1. Environment variables (ARBITER_* prefix, `__` between sections)
//! 2. arbiter.local.toml (gitignored, local overrides)
//! 3. arbiter.toml (git-tracked, project config)
//! 4. ~/.config/arbiter/config.toml (user defaults)
//! 5. Built-in defaults (lowest precedence)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

mod error;
mod loader;
mod paths;

pub use error::ConfigError;
pub use loader::{ConfigLoader, DEFAULT_ENV_PREFIX};
pub use paths::{LOCAL_CONFIG_FILE, PROJECT_CONFIG_FILE, Paths};

/// Default tolerance for the `mod` operator's remainder check.
pub const DEFAULT_MOD_TOLERANCE: f64 = 1e-9;

/// Default compiled-size limit for `matches` patterns (1 MiB).
pub const DEFAULT_REGEX_SIZE_LIMIT: usize = 1 << 20;

/// Default maximum nesting depth accepted by the validator.
pub const DEFAULT_MAX_CONDITION_DEPTH: usize = 64;

/// Main Arbiter configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArbiterConfig {
    pub engine: EngineConfig,
}

/// Tunables for the condition evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// `mod` holds when `|attribute % value|` is below this tolerance.
    pub mod_tolerance: f64,
    /// Upper bound on the compiled size of a `matches` regular expression.
    pub regex_size_limit: usize,
    /// Deepest condition tree the validator accepts.
    pub max_condition_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mod_tolerance: DEFAULT_MOD_TOLERANCE,
            regex_size_limit: DEFAULT_REGEX_SIZE_LIMIT,
            max_condition_depth: DEFAULT_MAX_CONDITION_DEPTH,
        }
    }
}

impl EngineConfig {
    /// Checks that every tunable is usable.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if !self.mod_tolerance.is_finite() || self.mod_tolerance < 0.0 {
            return Err(ConfigError::invalid(
                "engine.mod_tolerance",
                format!("expected a finite non-negative number, got {}", self.mod_tolerance),
            ));
        }
        if self.regex_size_limit == 0 {
            return Err(ConfigError::invalid("engine.regex_size_limit", "must be positive"));
        }
        if self.max_condition_depth == 0 {
            return Err(ConfigError::invalid("engine.max_condition_depth", "must be positive"));
        }
        Ok(())
    }
}

impl ArbiterConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        ConfigLoader::new().load()
    }

    /// Load configuration from specific project directory
    pub fn load_from_dir(project_dir: impl AsRef<Path>) -> Result<Self> {
        ConfigLoader::new().with_project_dir(project_dir).load()
    }

    /// Read a single TOML file without layering.
    pub fn from_file(path: impl AsRef<Path>) -> std::result::Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse a configuration document, filling unspecified keys with defaults.
    pub fn from_toml_str(content: &str) -> std::result::Result<Self, ConfigError> {
        let config: ArbiterConfig = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Render the configuration as TOML.
    pub fn to_toml_string(&self) -> std::result::Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Render)
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        self.engine.validate()
    }
}
