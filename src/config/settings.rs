//! User configuration settings
//!
//! Layered configuration: defaults → config file → environment variables (`WT_*`)

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Error, Result};
use crate::session::default_base_dir;

/// Shell used when neither the config nor `$SHELL` names one
pub const FALLBACK_SHELL: &str = "/bin/bash";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Coding assistant launched inside sessions
    pub program: String,

    /// Interactive shell used to launch the assistant and for `wt cd`
    pub shell: Option<String>,

    /// Directory holding session worktrees (default `~/.wt`)
    pub worktrees_dir: Option<PathBuf>,

    /// Enable debug logging
    pub debug: bool,

    /// Log file path (if set, logs are appended there instead of stderr)
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            program: "claude".to_string(),
            shell: None,
            worktrees_dir: None,
            debug: false,
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from the default config file and the environment
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Load configuration from `config_path` and the environment
    ///
    /// A missing file is not an error; defaults apply.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let config: Config = Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Config::default()))
            // Layer config file if it exists
            .merge(Toml::file(config_path))
            // Layer environment variables (WT_PROGRAM, WT_WORKTREES_DIR, etc.)
            .merge(Env::prefixed("WT_"))
            .extract()
            .map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        Ok(config)
    }

    /// Get the configuration file path
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Get the worktrees directory path
    pub fn worktrees_dir(&self) -> Result<PathBuf> {
        match &self.worktrees_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(default_base_dir()?),
        }
    }

    /// Resolve the shell: config → $SHELL → /bin/bash
    pub fn resolve_shell(&self) -> String {
        self.shell
            .clone()
            .filter(|s| !s.is_empty())
            .or_else(|| std::env::var("SHELL").ok().filter(|s| !s.is_empty()))
            .unwrap_or_else(|| FALLBACK_SHELL.to_string())
    }

    /// Save current configuration to the default config file
    pub fn save(&self) -> Result<PathBuf> {
        let config_path = Self::config_file_path()?;
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    /// Save current configuration to `config_path`
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|_e| {
                Error::Config(ConfigError::DirectoryCreationFailed(parent.to_path_buf()))
            })?;
        }

        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SaveFailed(e.to_string()))?;

        std::fs::write(config_path, toml).map_err(|e| ConfigError::SaveFailed(e.to_string()))?;

        Ok(())
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "wt").ok_or_else(|| {
            Error::Config(ConfigError::LoadFailed(
                "Could not determine home directory".to_string(),
            ))
        })
    }
}
