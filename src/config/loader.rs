// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{RawSwellConfig, SwellConfig};
use crate::errors::{Result, SwellError};

/// Load a configuration file from a given path and return the raw
/// `RawSwellConfig`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawSwellConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawSwellConfig = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and run validation.
///
/// Relative paths in `[build]` are later resolved against the directory
/// containing `path`.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<SwellConfig> {
    let path = path.as_ref();
    let raw_config = load_from_path(path)?;
    let config = SwellConfig::try_from(raw_config)?;
    Ok(config.with_root_dir(config_root_dir(path)))
}

/// Like [`load_and_validate`], but a missing file at the *default* location
/// yields the built-in defaults.
///
/// An explicitly requested path that does not exist is a configuration error.
pub fn load_or_default(path: impl AsRef<Path>, explicit: bool) -> Result<SwellConfig> {
    let path = path.as_ref();
    if path.exists() {
        return load_and_validate(path);
    }
    if explicit {
        return Err(SwellError::ConfigError(format!(
            "config file {:?} does not exist",
            path
        )));
    }
    debug!(config = ?path, "no config file found; using built-in defaults");
    Ok(SwellConfig::default().with_root_dir(config_root_dir(path)))
}

/// Default config path: `Swell.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Swell.toml")
}

/// Directory that relative config paths are resolved against.
///
/// A bare filename like "Swell.toml" (parent = "") falls back to the current
/// working directory.
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}
