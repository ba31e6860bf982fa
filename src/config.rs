//! Configuration handling.
//!
//! Configuration lives in `kpad.toml`, either passed explicitly or found in the user's
//! configuration directory (`~/.config/kpad/kpad.toml` on Linux). A missing file means
//! defaults; a malformed one is an error naming the file.

use crate::error::ConfigError;
use crate::types::Indentation;
use directories::ProjectDirs;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the configuration file.
pub const CONFIG_FILE: &str = "kpad.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Extensions to load, in order. Order decides handler chain order.
    pub extensions: Vec<String>,
    pub document: DocumentConfig,
    pub log: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extensions: vec![
                "pairs.rhai".to_string(),
                "autoindent.rhai".to_string(),
                "quickcomment.rhai".to_string(),
            ],
            document: DocumentConfig::default(),
            log: LogConfig::default(),
        }
    }
}

/// Per-document editing settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DocumentConfig {
    pub tab_width: usize,
    pub indentation: Indentation,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            tab_width: 4,
            indentation: Indentation::Tabs,
        }
    }
}

/// Logging settings. `RUST_LOG` takes precedence when set.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML text. `origin` is only used in error messages.
    pub fn from_toml(s: &str, origin: &Path) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(s).map_err(|e| ConfigError::Parse {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })?;
        // A zero tab width would make every space-indented line infinitely deep.
        config.document.tab_width = config.document.tab_width.max(1);
        Ok(config)
    }

    /// Read configuration from `path`.
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let s = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&s, path)
    }

    /// Load configuration: the explicit path if given (which must exist), otherwise the
    /// user-level file if present, otherwise defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::read(path);
        }
        match user_config_path() {
            Some(path) if path.exists() => Self::read(&path),
            _ => Ok(Self::default()),
        }
    }
}

/// Location of the user-level configuration file, if a home directory is known.
pub fn user_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "kpad").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}
