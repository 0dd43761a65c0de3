//! Configuration file support for gemlock
//!
//! Reads configuration from `~/.config/gemlock/config.toml`:
//!
//! ```toml
//! lockfile_names = ["Gemfile.lock", "gems.locked"]
//! watch = ["/srv/app/Gemfile.lock"]
//! log_level = "debug"
//! ```
//!
//! Every key is optional; a missing file means defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Lockfile name searched for when none is configured
const DEFAULT_LOCKFILE_NAME: &str = "Gemfile.lock";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot determine config directory. HOME environment variable not set.")]
    NoConfigDir,

    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Top-level configuration structure
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// File names tried, in order, when searching upward for a lockfile
    #[serde(default = "default_lockfile_names")]
    pub lockfile_names: Vec<String>,

    /// Lockfiles checked by `gemlock check` when no paths are given
    #[serde(default)]
    pub watch: Vec<PathBuf>,

    /// Default tracing filter when RUST_LOG is unset (e.g. "debug")
    #[serde(default)]
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lockfile_names: default_lockfile_names(),
            watch: Vec::new(),
            log_level: None,
        }
    }
}

fn default_lockfile_names() -> Vec<String> {
    vec![DEFAULT_LOCKFILE_NAME.to_string()]
}

impl Config {
    /// Load configuration from the default path or return defaults if not found
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path()?;

        if !path.exists() {
            return Ok(Config::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from an explicit path; the file must exist
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Returns the config file path: `~/.config/gemlock/config.toml`
pub fn config_path() -> Result<PathBuf, ConfigError> {
    // Use XDG_CONFIG_HOME if set, otherwise fall back to ~/.config
    let config_base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".config"))
                .unwrap_or_default()
        });

    if config_base.as_os_str().is_empty() {
        return Err(ConfigError::NoConfigDir);
    }

    Ok(config_base.join("gemlock").join("config.toml"))
}
