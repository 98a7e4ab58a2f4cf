// src/config/model.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [model]
/// dir = "GEOSgcm"
/// executable = "GEOSgcm.x"
/// preload_libs = ["libmom6", "libcice6"]
///
/// [run]
/// timeout = "12h"
///
/// [build]
/// cores_to_use_for_make = 6
/// ```
///
/// All sections are optional; the defaults reproduce the standard GEOS
/// experiment layout.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSwellConfig {
    #[serde(default)]
    pub model: ModelSection,

    #[serde(default)]
    pub run: RunSection,

    #[serde(default)]
    pub build: BuildSection,
}

/// Validated configuration.
///
/// Only constructed through `TryFrom<RawSwellConfig>` (see `validate.rs`)
/// or [`SwellConfig::new_unchecked`].
#[derive(Debug, Clone)]
pub struct SwellConfig {
    pub model: ModelSection,
    pub run: RunSection,
    pub build: BuildSection,
    run_timeout: Option<Duration>,
    root_dir: PathBuf,
}

impl SwellConfig {
    /// Assemble a config without running validation.
    ///
    /// `run_timeout` is the already-parsed form of `run.timeout`.
    pub fn new_unchecked(
        model: ModelSection,
        run: RunSection,
        build: BuildSection,
        run_timeout: Option<Duration>,
    ) -> Self {
        Self {
            model,
            run,
            build,
            run_timeout,
            root_dir: PathBuf::from("."),
        }
    }

    /// Directory relative paths in `[build]` are resolved against.
    pub fn with_root_dir(mut self, root_dir: impl Into<PathBuf>) -> Self {
        self.root_dir = root_dir.into();
        self
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn run_timeout(&self) -> Option<Duration> {
        self.run_timeout
    }

    /// Resolve an optional `[build]` path against the config directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root_dir.join(path)
        }
    }
}

impl Default for SwellConfig {
    fn default() -> Self {
        Self::new_unchecked(
            ModelSection::default(),
            RunSection::default(),
            BuildSection::default(),
            None,
        )
    }
}

/// `[model]` section: where the model lives inside an experiment and how it
/// is launched.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelSection {
    /// Model directory under the experiment root.
    #[serde(default = "default_model_dir")]
    pub dir: String,

    /// Executable name under `<dir>/build/bin`.
    #[serde(default = "default_executable")]
    pub executable: String,

    /// Environment script under `<dir>/source/@env`, sourced before launch.
    #[serde(default = "default_env_script")]
    pub env_script: String,

    /// Shared objects (without `.so`) from `<dir>/build/lib` placed in
    /// `LD_PRELOAD`, in this order.
    #[serde(default = "default_preload_libs")]
    pub preload_libs: Vec<String>,

    /// Parallel launcher program.
    #[serde(default = "default_launcher")]
    pub launcher: String,

    /// Value passed to the executable's `--logging_config` flag.
    #[serde(default = "default_logging_config")]
    pub logging_config: String,
}

fn default_model_dir() -> String {
    "GEOSgcm".to_string()
}

fn default_executable() -> String {
    "GEOSgcm.x".to_string()
}

fn default_env_script() -> String {
    "g5_modules.sh".to_string()
}

fn default_preload_libs() -> Vec<String> {
    vec!["libmom6".to_string(), "libcice6".to_string()]
}

fn default_launcher() -> String {
    "mpirun".to_string()
}

fn default_logging_config() -> String {
    "logging.yaml".to_string()
}

impl Default for ModelSection {
    fn default() -> Self {
        Self {
            dir: default_model_dir(),
            executable: default_executable(),
            env_script: default_env_script(),
            preload_libs: default_preload_libs(),
            launcher: default_launcher(),
            logging_config: default_logging_config(),
        }
    }
}

/// `[run]` section: per-invocation paths inside the forecast directory and
/// supervision behaviour.
#[derive(Debug, Clone, Deserialize)]
pub struct RunSection {
    /// Shell used to run the launch script (`<shell> -c <script>`).
    #[serde(default = "default_shell")]
    pub shell: String,

    /// Run-control document, relative to the forecast directory.
    #[serde(default = "default_run_control")]
    pub run_control: String,

    /// Combined output log, relative to the forecast directory.
    #[serde(default = "default_log_file")]
    pub log_file: String,

    /// Restart output directory, relative to the forecast directory.
    #[serde(default = "default_restart_dir")]
    pub restart_dir: String,

    /// Duration string (e.g. `"12h"`, `"90m"`). When unset the run is
    /// waited on indefinitely.
    #[serde(default)]
    pub timeout: Option<String>,

    /// Echo every captured output line through `tracing`.
    #[serde(default)]
    pub echo_output: bool,
}

fn default_shell() -> String {
    "/bin/bash".to_string()
}

fn default_run_control() -> String {
    "AGCM.rc".to_string()
}

fn default_log_file() -> String {
    "geos_out.log".to_string()
}

fn default_restart_dir() -> String {
    "RESTART".to_string()
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            shell: default_shell(),
            run_control: default_run_control(),
            log_file: default_log_file(),
            restart_dir: default_restart_dir(),
            timeout: None,
            echo_output: false,
        }
    }
}

/// `[build]` section: inputs to bundle configuration composition.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildSection {
    #[serde(default = "default_cores_to_use_for_make")]
    pub cores_to_use_for_make: u32,

    /// Pinned-version document. Relative paths are resolved against the
    /// config file's directory.
    #[serde(default)]
    pub pinned_versions: Option<PathBuf>,

    /// YAML file replacing the built-in bundling-engine defaults.
    #[serde(default)]
    pub engine_defaults: Option<PathBuf>,
}

fn default_cores_to_use_for_make() -> u32 {
    6
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            cores_to_use_for_make: default_cores_to_use_for_make(),
            pinned_versions: None,
            engine_defaults: None,
        }
    }
}
