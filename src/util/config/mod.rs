//! User configuration
//!
//! Settings that are not worth a command-line option live in a small
//! TOML file under the user config directory. A missing file is not an
//! error; every field has a default.
//!
//! ```text
//! # ~/.config/rill/config.toml
//! [repl]
//! history_size = 1000
//! history_file = "~/.rill_history"
//! vi_mode = false
//! ```

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// User-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    #[serde(default)]
    pub repl: ReplSettings,
}

/// Line-editor settings, all overridable from the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplSettings {
    #[serde(default = "default_history_size")]
    pub history_size: usize,
    /// Where history is persisted; `RILL_HISTORY` overrides it, and the
    /// default is `history` in the config directory.
    #[serde(default)]
    pub history_file: Option<PathBuf>,
    #[serde(default)]
    pub vi_mode: bool,
}

fn default_history_size() -> usize {
    1000
}

impl Default for ReplSettings {
    fn default() -> Self {
        Self {
            history_size: 1000,
            history_file: None,
            vi_mode: false,
        }
    }
}

impl ReplSettings {
    /// The history file for this session, or `None` when no location can
    /// be determined (history is then kept in memory only).
    pub fn resolved_history_file(&self) -> Option<PathBuf> {
        if let Ok(path) = std::env::var("RILL_HISTORY") {
            if !path.is_empty() {
                return Some(PathBuf::from(path));
            }
        }
        if let Some(path) = &self.history_file {
            return Some(path.clone());
        }
        config_dir().map(|dir| dir.join("history"))
    }
}

/// The user config directory: `RILL_CONFIG_DIR`, then
/// `$XDG_CONFIG_HOME/rill`, then `~/.config/rill`.
pub fn config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("RILL_CONFIG_DIR") {
        if !dir.is_empty() {
            return Some(PathBuf::from(dir));
        }
    }
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg.is_empty() {
            return Some(PathBuf::from(xdg).join("rill"));
        }
    }
    if let Ok(home) = std::env::var("HOME") {
        return Some(PathBuf::from(home).join(".config").join("rill"));
    }
    None
}

pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Load the user configuration, falling back to defaults when there is
/// no config file.
pub fn load_user_config() -> Result<UserConfig, ConfigError> {
    let Some(path) = config_path() else {
        return Ok(UserConfig::default());
    };
    if !path.exists() {
        return Ok(UserConfig::default());
    }
    let content = fs::read_to_string(&path)?;
    Ok(toml::from_str(&content)?)
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}
