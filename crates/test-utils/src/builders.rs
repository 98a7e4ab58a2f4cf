#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use swell_core::config::{RawSwellConfig, SwellConfig};
use swell_core::runner::TaskContext;
use tempfile::TempDir;

/// Builder for `SwellConfig` to simplify test setup.
pub struct SwellConfigBuilder {
    config: RawSwellConfig,
}

impl SwellConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: RawSwellConfig::default(),
        }
    }

    pub fn with_launcher(mut self, launcher: &str) -> Self {
        self.config.model.launcher = launcher.to_string();
        self
    }

    pub fn with_preload_libs(mut self, libs: &[&str]) -> Self {
        self.config.model.preload_libs = libs.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_timeout(mut self, timeout: &str) -> Self {
        self.config.run.timeout = Some(timeout.to_string());
        self
    }

    pub fn with_echo_output(mut self, echo: bool) -> Self {
        self.config.run.echo_output = echo;
        self
    }

    pub fn with_pinned_versions(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.build.pinned_versions = Some(path.into());
        self
    }

    pub fn raw(self) -> RawSwellConfig {
        self.config
    }

    pub fn build(self) -> SwellConfig {
        SwellConfig::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for SwellConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A throwaway experiment tree laid out like a real one:
///
/// ```text
/// <tmp>/forecast/AGCM.rc
/// <tmp>/experiment/GEOSgcm/build/bin/GEOSgcm.x
/// <tmp>/experiment/GEOSgcm/build/lib/
/// <tmp>/experiment/GEOSgcm/source/@env/g5_modules.sh
/// ```
pub struct ExperimentFixture {
    // Keeps the directory alive for the fixture's lifetime.
    _dir: TempDir,
    pub forecast_dir: PathBuf,
    pub experiment_root: PathBuf,
}

impl ExperimentFixture {
    /// Standard tree with `NX: '4'` / `NY: '6'`, an executable that prints
    /// its arguments, and an empty environment script.
    pub fn new() -> Self {
        Self::with_rc("NX: '4'\nNY: '6'\n")
    }

    pub fn with_rc(rc_contents: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let forecast_dir = dir.path().join("forecast");
        let experiment_root = dir.path().join("experiment");
        let model = experiment_root.join("GEOSgcm");

        fs::create_dir_all(&forecast_dir).unwrap();
        fs::create_dir_all(model.join("build").join("bin")).unwrap();
        fs::create_dir_all(model.join("build").join("lib")).unwrap();
        fs::create_dir_all(model.join("source").join("@env")).unwrap();

        fs::write(forecast_dir.join("AGCM.rc"), rc_contents).unwrap();

        let fixture = Self {
            _dir: dir,
            forecast_dir,
            experiment_root,
        };
        fixture.write_executable("#!/bin/sh\necho \"GEOSgcm.x $@\"\n");
        fixture.write_env_script("# environment\n");
        fixture
    }

    pub fn context(&self) -> TaskContext {
        TaskContext::new(&self.forecast_dir, &self.experiment_root)
    }

    pub fn model_dir(&self) -> PathBuf {
        self.experiment_root.join("GEOSgcm")
    }

    pub fn executable_path(&self) -> PathBuf {
        self.model_dir().join("build").join("bin").join("GEOSgcm.x")
    }

    pub fn env_script_path(&self) -> PathBuf {
        self.model_dir()
            .join("source")
            .join("@env")
            .join("g5_modules.sh")
    }

    pub fn lib_dir(&self) -> PathBuf {
        self.model_dir().join("build").join("lib")
    }

    pub fn log_path(&self) -> PathBuf {
        self.forecast_dir.join("geos_out.log")
    }

    pub fn write_rc(&self, contents: &str) {
        fs::write(self.forecast_dir.join("AGCM.rc"), contents).unwrap();
    }

    pub fn write_executable(&self, body: &str) {
        write_script(&self.executable_path(), body);
    }

    pub fn write_env_script(&self, body: &str) {
        fs::write(self.env_script_path(), body).unwrap();
    }

    /// Drop an executable script into the fixture root (e.g. a fake
    /// `mpirun`) and return its path.
    pub fn write_tool(&self, name: &str, body: &str) -> PathBuf {
        let path = self.experiment_root.parent().unwrap().join(name);
        write_script(&path, body);
        path
    }
}

impl Default for ExperimentFixture {
    fn default() -> Self {
        Self::new()
    }
}

fn write_script(path: &Path, body: &str) {
    fs::write(path, body).unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    }
}
