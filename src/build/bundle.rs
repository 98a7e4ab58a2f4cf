// src/build/bundle.rs

use std::path::PathBuf;

use serde_yaml::{Mapping, Value};
use tracing::{debug, info, warn};

use crate::errors::{Result, SwellError};
use crate::fs::FileSystem;

use super::engine::BundleEngine;
use super::pinned::{load_pinned_versions, DEFAULT_PINNED_VERSIONS_PATH};

/// Always built, whatever the caller asks for.
pub const MANDATORY_BUNDLE: &str = "iodaconv";

/// Requesting this bundle pulls in [`EXTRA_REPO`].
pub const EXTRA_REPO_TRIGGER: &str = "fv3-jedi";

pub const EXTRA_REPO: &str = "gsibec";

pub const DEFAULT_CORES_TO_USE_FOR_MAKE: u32 = 6;

/// Inputs to [`set_jedi_bundle_config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleRequest {
    pub bundles: Vec<String>,
    pub path_to_source: PathBuf,
    pub path_to_build: PathBuf,
    pub platform: String,
    pub use_pinned: bool,
    pub cores_to_use_for_make: u32,
    /// Read only when `use_pinned` is set.
    pub pinned_versions_path: PathBuf,
}

impl BundleRequest {
    pub fn new(
        bundles: impl IntoIterator<Item = impl Into<String>>,
        path_to_source: impl Into<PathBuf>,
        path_to_build: impl Into<PathBuf>,
        platform: impl Into<String>,
    ) -> Self {
        Self {
            bundles: bundles.into_iter().map(Into::into).collect(),
            path_to_source: path_to_source.into(),
            path_to_build: path_to_build.into(),
            platform: platform.into(),
            use_pinned: false,
            cores_to_use_for_make: DEFAULT_CORES_TO_USE_FOR_MAKE,
            pinned_versions_path: PathBuf::from(DEFAULT_PINNED_VERSIONS_PATH),
        }
    }

    /// Attach the pinned-version document at `path`.
    pub fn pinned(mut self, path: impl Into<PathBuf>) -> Self {
        self.use_pinned = true;
        self.pinned_versions_path = path.into();
        self
    }

    pub fn cores(mut self, cores: u32) -> Self {
        self.cores_to_use_for_make = cores;
        self
    }
}

/// Configuration handed to the bundling engine.
#[derive(Debug, Clone, PartialEq)]
pub struct BundleConfiguration(Mapping);

impl BundleConfiguration {
    pub fn as_mapping(&self) -> &Mapping {
        &self.0
    }

    fn field(&self, section: &str, key: &str) -> Option<&Value> {
        self.0.get(section).and_then(|s| s.get(key))
    }

    pub fn bundles(&self) -> Vec<String> {
        string_list(self.field("clone_options", "bundles"))
    }

    /// Empty when the engine default was left in place.
    pub fn extra_repos(&self) -> Vec<String> {
        string_list(self.field("clone_options", "extra_repos"))
    }

    pub fn path_to_source(&self) -> Option<&str> {
        self.field("clone_options", "path_to_source")
            .and_then(Value::as_str)
    }

    pub fn path_to_build(&self) -> Option<&str> {
        self.field("configure_options", "path_to_build")
            .and_then(Value::as_str)
    }

    pub fn platform(&self) -> Option<&str> {
        self.field("configure_options", "platform")
            .and_then(Value::as_str)
    }

    pub fn external_modules(&self) -> Option<bool> {
        self.field("configure_options", "external_modules")
            .and_then(Value::as_bool)
    }

    pub fn cores_to_use_for_make(&self) -> Option<u64> {
        self.field("make_options", "cores_to_use_for_make")
            .and_then(Value::as_u64)
    }

    pub fn pinned_versions(&self) -> Option<&Value> {
        self.0.get("pinned_versions")
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.0)?)
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_sequence)
        .map(|seq| {
            seq.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Compose the bundling-engine configuration for a build.
///
/// Starts from `engine`'s defaults on every call and never mutates the
/// caller's bundle list, so repeated calls with the same request produce
/// identical results.
///
/// - `iodaconv` is appended to the bundles unless already present.
/// - `fv3-jedi` in the bundles adds `gsibec` to `extra_repos`.
/// - The platform is applied only if the engine recognises it; otherwise the
///   engine's own choice stays and a warning is logged.
/// - `external_modules` is always forced on.
/// - With `use_pinned`, the pinned-version document is attached verbatim as
///   `pinned_versions`; a missing or malformed document is an error.
pub fn set_jedi_bundle_config(
    engine: &dyn BundleEngine,
    fs: &dyn FileSystem,
    request: &BundleRequest,
) -> Result<BundleConfiguration> {
    let mut config = engine.default_config()?;

    let mut bundles = request.bundles.clone();
    if !bundles.iter().any(|b| b == MANDATORY_BUNDLE) {
        bundles.push(MANDATORY_BUNDLE.to_string());
    }
    let wants_extra_repo = bundles.iter().any(|b| b == EXTRA_REPO_TRIGGER);

    {
        let clone = section_mut(&mut config, "clone_options")?;
        set(clone, "bundles", string_seq(&bundles));
        set(
            clone,
            "path_to_source",
            Value::String(request.path_to_source.display().to_string()),
        );
        if wants_extra_repo {
            set(clone, "extra_repos", string_seq(&[EXTRA_REPO.to_string()]));
        }
    }

    {
        let configure = section_mut(&mut config, "configure_options")?;
        set(
            configure,
            "path_to_build",
            Value::String(request.path_to_build.display().to_string()),
        );
    }

    {
        let make = section_mut(&mut config, "make_options")?;
        set(
            make,
            "cores_to_use_for_make",
            Value::Number(request.cores_to_use_for_make.into()),
        );
    }

    {
        let platform_known = engine.check_platform(&request.platform);
        let configure = section_mut(&mut config, "configure_options")?;
        if platform_known {
            set(configure, "platform", Value::String(request.platform.clone()));
        } else {
            warn!(
                platform = %request.platform,
                "platform not recognised by the bundling engine; keeping engine default"
            );
        }
        set(configure, "external_modules", Value::Bool(true));
    }

    if request.use_pinned {
        let pinned = load_pinned_versions(fs, &request.pinned_versions_path)?;
        config.insert(Value::String("pinned_versions".to_string()), pinned);
    } else if config.remove("pinned_versions").is_some() {
        debug!("dropping pinned_versions carried by engine defaults");
    }

    info!(
        bundles = ?bundles,
        platform = %request.platform,
        pinned = request.use_pinned,
        "composed bundle configuration"
    );
    Ok(BundleConfiguration(config))
}

fn section_mut<'a>(config: &'a mut Mapping, name: &str) -> Result<&'a mut Mapping> {
    match config.get_mut(name) {
        Some(Value::Mapping(section)) => Ok(section),
        Some(_) => Err(SwellError::EngineConfigError(format!(
            "default configuration section '{name}' is not a mapping"
        ))),
        None => Err(SwellError::EngineConfigError(format!(
            "default configuration has no '{name}' section"
        ))),
    }
}

fn set(section: &mut Mapping, key: &str, value: Value) {
    section.insert(Value::String(key.to_string()), value);
}

fn string_seq(items: &[String]) -> Value {
    Value::Sequence(items.iter().cloned().map(Value::String).collect())
}
