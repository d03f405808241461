//! Where configuration layers live on disk

use crate::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Project file, checked into version control.
pub const PROJECT_CONFIG_FILE: &str = "arbiter.toml";

/// Machine-local overrides, kept out of version control.
pub const LOCAL_CONFIG_FILE: &str = "arbiter.local.toml";

/// Config file locations for one project directory plus the user's XDG dir.
#[derive(Debug, Clone)]
pub struct Paths {
    project_dir: PathBuf,
    user_dirs: Option<ProjectDirs>,
}

impl Paths {
    pub fn new(project_dir: impl AsRef<Path>) -> Self {
        Self {
            project_dir: project_dir.as_ref().to_path_buf(),
            user_dirs: ProjectDirs::from("rs", "Arbiter", "arbiter"),
        }
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// `<XDG config>/arbiter/config.toml`
    pub fn user_config_file(&self) -> Result<PathBuf, ConfigError> {
        self.user_dirs
            .as_ref()
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .ok_or(ConfigError::NoHomeDirectory)
    }

    pub fn project_config_file(&self) -> PathBuf {
        self.project_dir.join(PROJECT_CONFIG_FILE)
    }

    pub fn local_config_file(&self) -> PathBuf {
        self.project_dir.join(LOCAL_CONFIG_FILE)
    }

    /// Existing config files, lowest precedence first.
    pub fn layers(&self, include_user: bool) -> Vec<PathBuf> {
        let user = include_user
            .then(|| self.user_config_file().ok())
            .flatten();

        user.into_iter()
            .chain([self.project_config_file(), self.local_config_file()])
            .filter(|path| path.is_file())
            .collect()
    }
}
