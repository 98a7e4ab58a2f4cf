// src/runner/layout.rs

use std::path::{Path, PathBuf};

use crate::config::ModelSection;

/// Where a model's build products live inside an experiment:
///
/// - executable: `<root>/<model>/build/bin/<executable>`
/// - environment script: `<root>/<model>/source/@env/<script>`
/// - preload library directory: `<root>/<model>/build/lib`
#[derive(Debug, Clone)]
pub struct ModelLayout {
    model_dir: PathBuf,
    executable: String,
    env_script: String,
}

impl ModelLayout {
    pub fn new(experiment_root: &Path, model: &ModelSection) -> Self {
        Self {
            model_dir: experiment_root.join(&model.dir),
            executable: model.executable.clone(),
            env_script: model.env_script.clone(),
        }
    }

    pub fn executable_path(&self) -> PathBuf {
        self.model_dir.join("build").join("bin").join(&self.executable)
    }

    pub fn env_script_path(&self) -> PathBuf {
        self.model_dir
            .join("source")
            .join("@env")
            .join(&self.env_script)
    }

    pub fn lib_dir(&self) -> PathBuf {
        self.model_dir.join("build").join("lib")
    }
}
