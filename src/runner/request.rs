// src/runner/request.rs

use std::path::{Path, PathBuf};

use crate::errors::{Result, SwellError};
use crate::fs::FileSystem;

/// Everything needed for one parallel launch of a model executable.
///
/// Built per invocation and consumed by the launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    pub process_count: u32,
    pub executable: PathBuf,
    /// Sourced before the launcher runs.
    pub env_script: PathBuf,
    /// Truncated and rewritten on every run.
    pub output_log: PathBuf,
    /// Directory holding the preload libraries. `None` disables `LD_PRELOAD`.
    pub lib_path: Option<PathBuf>,
    /// Library names without `.so`, in preload order.
    pub preload_libs: Vec<String>,
    pub launcher: String,
    pub logging_config: String,
}

impl ExecutionRequest {
    /// Colon-joined `LD_PRELOAD` value, or `None` when nothing is preloaded.
    pub fn ld_preload(&self) -> Option<String> {
        let lib_path = self.lib_path.as_ref()?;
        if self.preload_libs.is_empty() {
            return None;
        }
        let joined = self
            .preload_libs
            .iter()
            .map(|lib| lib_path.join(format!("{lib}.so")).display().to_string())
            .collect::<Vec<_>>()
            .join(":");
        Some(joined)
    }

    /// The launch script handed to `<shell> -c`:
    ///
    /// ```text
    /// source <env-script>
    /// env LD_PRELOAD=<lib1>:<lib2> <launcher> -np <N> <executable> --logging_config <cfg>
    /// ```
    pub fn shell_command(&self) -> Result<String> {
        let env_script = path_word(&self.env_script, "environment script")?;
        let executable = path_word(&self.executable, "executable")?;

        let mut launch = String::new();
        if let Some(preload) = self.ld_preload() {
            reject_newlines(&preload, "LD_PRELOAD")?;
            launch.push_str(&format!("env LD_PRELOAD={} ", shell_escape(&preload)));
        }
        reject_newlines(&self.launcher, "launcher")?;
        reject_newlines(&self.logging_config, "logging config")?;
        launch.push_str(&format!(
            "{} -np {} {} --logging_config {}",
            self.launcher,
            self.process_count,
            executable,
            shell_escape(&self.logging_config)
        ));

        Ok(format!("source {env_script}\n{launch}"))
    }

    /// The executable must exist and carry an execute bit.
    pub fn ensure_launchable(&self, fs: &dyn FileSystem) -> Result<()> {
        if !fs.is_file(&self.executable) {
            return Err(SwellError::ConfigError(format!(
                "executable {:?} does not exist",
                self.executable
            )));
        }
        if !fs.is_executable(&self.executable) {
            return Err(SwellError::ConfigError(format!(
                "executable {:?} is not executable",
                self.executable
            )));
        }
        Ok(())
    }
}

fn path_word(path: &Path, what: &str) -> Result<String> {
    let s = path.display().to_string();
    reject_newlines(&s, what)?;
    Ok(shell_escape(&s))
}

fn reject_newlines(s: &str, what: &str) -> Result<()> {
    if s.contains('\n') || s.contains('\r') || s.contains('\0') {
        Err(SwellError::ConfigError(format!(
            "refusing to launch: {what} contains a newline"
        )))
    } else {
        Ok(())
    }
}

/// Quote `s` for a POSIX shell unless it only contains characters that need
/// no quoting. Typical experiment paths are left untouched.
pub fn shell_escape(s: &str) -> String {
    if s.is_empty() {
        "''".to_string()
    } else if s
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "-_=./:@+,".contains(c))
    {
        s.to_string()
    } else {
        let escaped = s.replace('\'', "'\"'\"'");
        format!("'{}'", escaped)
    }
}
