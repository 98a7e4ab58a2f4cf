// src/build/engine.rs

//! What this crate needs to know about the external bundling engine: its
//! stock configuration and the platform identifiers it accepts.

use std::path::Path;

use serde::Deserialize;
use serde_yaml::Mapping;

use crate::errors::{Result, SwellError};
use crate::fs::FileSystem;

/// Interface to the bundling engine's defaults.
pub trait BundleEngine {
    /// A fresh copy of the engine's default configuration.
    fn default_config(&self) -> Result<Mapping>;

    /// Whether `platform` is a platform identifier the engine knows.
    fn check_platform(&self, platform: &str) -> bool;
}

/// Stock configuration shipped with the engine. Composition overwrites the
/// path, bundle and core-count fields; everything else passes through.
const BUILTIN_DEFAULTS: &str = r#"
default_config:
  clone_options:
    bundles:
      - fv3-jedi
    path_to_source: ./jedi_bundle
    extra_repos: []
    github_user: null
    github_token: null
    crtm_coeffs: false
  configure_options:
    path_to_build: ./jedi_bundle/build
    platform: null
    cmake_build_type: RelWithDebInfo
    external_modules: false
    configure_options_extra: ''
  make_options:
    cores_to_use_for_make: 6
    make_verbose: false
platforms:
  - aws
  - generic
  - nccs_discover
  - nccs_discover_cascade
  - nccs_discover_sles15
"#;

/// On-disk form of engine defaults.
#[derive(Debug, Deserialize)]
struct EngineDefaultsFile {
    default_config: Mapping,
    #[serde(default)]
    platforms: Vec<String>,
}

/// Engine defaults held in memory, either built in or read from YAML
/// (`default_config:` mapping plus `platforms:` list).
#[derive(Debug, Clone, PartialEq)]
pub struct EngineDefaults {
    config: Mapping,
    platforms: Vec<String>,
}

impl EngineDefaults {
    pub fn new(config: Mapping, platforms: Vec<String>) -> Self {
        Self { config, platforms }
    }

    pub fn builtin() -> Result<Self> {
        Self::from_yaml_str(BUILTIN_DEFAULTS)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let file: EngineDefaultsFile = serde_yaml::from_str(contents).map_err(|e| {
            SwellError::EngineConfigError(format!("invalid engine defaults: {e}"))
        })?;
        Ok(Self::new(file.default_config, file.platforms))
    }

    pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Self> {
        let contents = fs.read_to_string(path).map_err(|e| {
            SwellError::EngineConfigError(format!(
                "cannot read engine defaults {:?}: {e:#}",
                path
            ))
        })?;
        Self::from_yaml_str(&contents).map_err(|e| match e {
            SwellError::EngineConfigError(msg) => {
                SwellError::EngineConfigError(format!("{msg} (in {:?})", path))
            }
            other => other,
        })
    }

    pub fn platforms(&self) -> &[String] {
        &self.platforms
    }
}

impl BundleEngine for EngineDefaults {
    fn default_config(&self) -> Result<Mapping> {
        Ok(self.config.clone())
    }

    fn check_platform(&self, platform: &str) -> bool {
        self.platforms.iter().any(|p| p == platform)
    }
}
