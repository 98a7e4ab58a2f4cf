// src/errors.rs

//! Crate-wide error type and helpers.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::types::ProcessOutcome;

#[derive(Error, Debug)]
pub enum SwellError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Filesystem error while {action} {path:?}: {source}")]
    FilesystemError {
        action: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Execution failed ({outcome}); see log file {log:?}")]
    ExecutionFailed { outcome: ProcessOutcome, log: PathBuf },

    #[error("Failed to start '{program}': {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Bundle engine configuration error: {0}")]
    EngineConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SwellError {
    /// Wrap an `io::Error` raised while touching `path`.
    pub fn fs(action: impl Into<String>, path: impl AsRef<Path>, source: io::Error) -> Self {
        SwellError::FilesystemError {
            action: action.into(),
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, SwellError>;
