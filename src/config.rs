use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::StateStore;

/// Get the config directory path
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("skein"))
}

/// Operator settings from ~/.config/skein/config.toml
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkeinConfig {
    /// Where applied state is kept (`~` is expanded)
    pub state_dir: Option<String>,

    /// Parallel jobs for multi-file validation
    pub jobs: usize,

    /// Skip the apply confirmation prompt
    pub auto_approve: bool,

    /// Colored output
    pub color: bool,
}

impl Default for SkeinConfig {
    fn default() -> Self {
        Self {
            state_dir: None,
            jobs: 4,
            auto_approve: false,
            color: true,
        }
    }
}

impl SkeinConfig {
    /// Load the config file, falling back to defaults when there is none
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => config_dir()?.join("config.toml"),
        };

        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Get expanded state directory path
    pub fn state_path(&self) -> Result<PathBuf> {
        match &self.state_dir {
            Some(dir) => Ok(PathBuf::from(shellexpand::tilde(dir).as_ref())),
            None => StateStore::default_dir(),
        }
    }

    pub fn state_store(&self) -> Result<StateStore> {
        Ok(StateStore::new(self.state_path()?))
    }
}
