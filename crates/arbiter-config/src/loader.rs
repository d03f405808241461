//! Layered configuration loading

use crate::{ArbiterConfig, Paths};
use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default prefix for environment overrides.
pub const DEFAULT_ENV_PREFIX: &str = "ARBITER";

/// Merges defaults, config files and the environment into an [`ArbiterConfig`].
///
/// Later layers win: built-in defaults, then the user file, `arbiter.toml`,
/// `arbiter.local.toml`, and finally `ARBITER_*` variables with `__` between
/// sections (`ARBITER_ENGINE__MOD_TOLERANCE=0.001`).
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    project_dir: PathBuf,
    env_prefix: String,
    include_user_config: bool,
}

impl ConfigLoader {
    /// Loader rooted at the current directory.
    pub fn new() -> Self {
        Self {
            project_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
            include_user_config: true,
        }
    }

    pub fn with_project_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.project_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Ignores the per-user config file.
    pub fn without_user_config(mut self) -> Self {
        self.include_user_config = false;
        self
    }

    pub fn load(self) -> Result<ArbiterConfig> {
        let mut builder =
            Config::builder().add_source(Config::try_from(&ArbiterConfig::default())?);

        for layer in Paths::new(&self.project_dir).layers(self.include_user_config) {
            debug!(path = %layer.display(), "Merging config layer");
            builder = builder.add_source(File::from(layer).format(FileFormat::Toml));
        }

        builder = builder.add_source(
            Environment::with_prefix(&self.env_prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let merged: ArbiterConfig = builder
            .build()
            .and_then(Config::try_deserialize::<ArbiterConfig>)
            .context("Failed to merge configuration layers")?;

        merged
            .validate()
            .context("Configuration failed validation")?;

        Ok(merged)
    }

    /// Like [`load`](Self::load), falling back to defaults on any failure.
    pub fn load_or_default(self) -> ArbiterConfig {
        self.load().unwrap_or_else(|err| {
            debug!(error = %err, "Using default configuration");
            ArbiterConfig::default()
        })
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
