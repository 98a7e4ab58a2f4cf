// src/build/pinned.rs

//! Pinned component versions for reproducible builds.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde_yaml::Value;
use tracing::debug;

use crate::config::SwellConfig;
use crate::errors::{Result, SwellError};
use crate::fs::FileSystem;

/// Environment variable overriding the pinned-version document location.
pub const PINNED_VERSIONS_ENV: &str = "SWELL_PINNED_VERSIONS";

/// Location relative to the config directory when nothing else is set.
pub const DEFAULT_PINNED_VERSIONS_PATH: &str = "pinned_versions/pinned_versions.yaml";

/// Where the pinned-version document lives.
///
/// Priority:
/// 1. `SWELL_PINNED_VERSIONS`
/// 2. `[build].pinned_versions` (relative to the config directory)
/// 3. `<config dir>/pinned_versions/pinned_versions.yaml`
pub fn get_pinned_vers_path(config: &SwellConfig) -> PathBuf {
    pinned_vers_path_from(std::env::var_os(PINNED_VERSIONS_ENV), config)
}

/// [`get_pinned_vers_path`] with the environment value passed in.
pub fn pinned_vers_path_from(env_value: Option<OsString>, config: &SwellConfig) -> PathBuf {
    if let Some(value) = env_value.filter(|v| !v.is_empty()) {
        return PathBuf::from(value);
    }
    match &config.build.pinned_versions {
        Some(path) => config.resolve(path),
        None => config.resolve(Path::new(DEFAULT_PINNED_VERSIONS_PATH)),
    }
}

/// Load the pinned-version document.
///
/// Its contents are opaque here beyond being a YAML mapping; the result is
/// attached to the bundle configuration unchanged.
pub fn load_pinned_versions(fs: &dyn FileSystem, path: &Path) -> Result<Value> {
    let contents = fs.read_to_string(path).map_err(|e| {
        SwellError::ConfigError(format!(
            "cannot read pinned versions {:?}: {e:#}",
            path
        ))
    })?;

    let value: Value = serde_yaml::from_str(&contents).map_err(|e| {
        SwellError::ConfigError(format!("malformed pinned versions {:?}: {e}", path))
    })?;

    match value {
        Value::Mapping(ref m) => {
            debug!(path = ?path, entries = m.len(), "loaded pinned versions");
            Ok(value)
        }
        _ => Err(SwellError::ConfigError(format!(
            "pinned versions {:?} must be a key/value mapping",
            path
        ))),
    }
}
