// src/runner/context.rs

use std::path::{Path, PathBuf};

/// Paths a task is invoked with by the surrounding workflow.
///
/// The workflow gives every task instance its own forecast directory; this
/// crate assumes exclusive use of it for the duration of one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskContext {
    forecast_dir: PathBuf,
    experiment_root: PathBuf,
}

impl TaskContext {
    pub fn new(forecast_dir: impl Into<PathBuf>, experiment_root: impl Into<PathBuf>) -> Self {
        Self {
            forecast_dir: forecast_dir.into(),
            experiment_root: experiment_root.into(),
        }
    }

    /// `<forecast_dir>/<rel>`; an empty `rel` yields the directory itself.
    pub fn forecast_dir(&self, rel: impl AsRef<Path>) -> PathBuf {
        let rel = rel.as_ref();
        if rel.as_os_str().is_empty() {
            self.forecast_dir.clone()
        } else {
            self.forecast_dir.join(rel)
        }
    }

    pub fn experiment_path(&self) -> &Path {
        &self.experiment_root
    }
}
