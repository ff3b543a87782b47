//! Configuration file loading and setting resolution
//!
//! Priority order for every setting:
//! 1. Command-line argument or `KITOBOY_*` environment variable (clap)
//! 2. TOML config file
//! 3. Compiled default

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 3052;

/// Optional settings read from `config.toml`
///
/// Every field may be omitted; an empty file is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub port: Option<u16>,
    pub database_path: Option<PathBuf>,
    /// Token signing secret; generated and stored in the database when unset
    pub auth_key: Option<String>,
    /// CORS allow-list; empty allows any origin
    pub allowed_origins: Option<Vec<String>>,
    /// Base URL of the post classifier service
    pub classifier_url: Option<String>,
    /// Operator account created at startup when absent
    pub ui_user: Option<String>,
    pub ui_password: Option<String>,
}

/// Where a resolved setting came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    CommandLine,
    ConfigFile,
    Default,
}

/// Platform config file location: `~/.config/kitoboy/config.toml` on Linux
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("kitoboy").join("config.toml"))
}

/// Platform database location: `~/.local/share/kitoboy/kitoboy.db` on Linux
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("kitoboy"))
        .unwrap_or_else(|| PathBuf::from("./kitoboy_data"))
        .join("kitoboy.db")
}

/// Parse a config file
///
/// Returns an error for unreadable files or invalid TOML. A missing file is
/// an error too; use [`load_optional_toml_config`] to treat it as empty.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Parse a config file if it exists
///
/// A missing file yields the default (all-empty) config. An explicitly
/// requested path that is missing is still reported with a warning.
pub fn load_optional_toml_config(path: Option<&Path>) -> Result<TomlConfig> {
    let explicit = path.is_some();
    let Some(path) = path.map(Path::to_path_buf).or_else(default_config_path) else {
        return Ok(TomlConfig::default());
    };

    if !path.exists() {
        if explicit {
            warn!("Config file {} not found, using defaults", path.display());
        } else {
            debug!("No config file at {}", path.display());
        }
        return Ok(TomlConfig::default());
    }

    debug!("Loading config file {}", path.display());
    load_toml_config(&path)
}

/// Pick the highest-priority value for one setting
///
/// Logs a warning when both the command line and the config file supply it.
/// Values are not logged since some settings are secrets.
pub fn resolve_setting<T>(
    key: &str,
    command_line: Option<T>,
    config_file: Option<T>,
    default: T,
) -> (T, ConfigSource) {
    match (command_line, config_file) {
        (Some(value), Some(_)) => {
            warn!(
                "{} set on command line/environment and in config file; config file value ignored",
                key
            );
            (value, ConfigSource::CommandLine)
        }
        (Some(value), None) => (value, ConfigSource::CommandLine),
        (None, Some(value)) => (value, ConfigSource::ConfigFile),
        (None, None) => (default, ConfigSource::Default),
    }
}

/// [`resolve_setting`] for settings without a compiled default
pub fn resolve_optional<T>(key: &str, command_line: Option<T>, config_file: Option<T>) -> Option<T> {
    resolve_setting(key, command_line.map(Some), config_file.map(Some), None).0
}
