// src/runner/geos.rs

use std::fs;

use tracing::{debug, info};

use crate::config::SwellConfig;
use crate::errors::{Result, SwellError};
use crate::exec::{ProcessLauncher, TrackedCommand};
use crate::fs::{FileSystem, RealFileSystem};
use crate::rc::{ProcessGrid, RunControlDocument};

use super::context::TaskContext;
use super::layout::ModelLayout;
use super::request::ExecutionRequest;

/// Launch the GEOS executable for one forecast directory.
///
/// Generic over the launcher so tests can observe the resolved command
/// without spawning MPI.
pub struct RunGeosExecutable<L: ProcessLauncher> {
    ctx: TaskContext,
    config: SwellConfig,
    fs: Box<dyn FileSystem>,
    launcher: L,
}

impl<L: ProcessLauncher> RunGeosExecutable<L> {
    pub fn new(ctx: TaskContext, config: SwellConfig, launcher: L) -> Self {
        Self {
            ctx,
            config,
            fs: Box::new(RealFileSystem),
            launcher,
        }
    }

    /// Replace the filesystem used to read the run-control document and
    /// check the executable.
    pub fn with_filesystem(mut self, fs: impl FileSystem + 'static) -> Self {
        self.fs = Box::new(fs);
        self
    }

    pub fn context(&self) -> &TaskContext {
        &self.ctx
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Read the run-control document and derive the process grid.
    ///
    /// Re-read on every call; the file may have been rewritten since the
    /// last run.
    pub fn process_grid(&self) -> Result<ProcessGrid> {
        let rc_path = self.ctx.forecast_dir(&self.config.run.run_control);
        let doc = RunControlDocument::load(self.fs.as_ref(), &rc_path)?;
        ProcessGrid::from_document(&doc)
    }

    /// Create `<forecast_dir>/RESTART` if it is missing.
    pub fn ensure_restart_dir(&self) -> Result<()> {
        let restart = self.ctx.forecast_dir(&self.config.run.restart_dir);
        fs::create_dir_all(&restart)
            .map_err(|e| SwellError::fs("creating restart directory", &restart, e))?;
        debug!(path = ?restart, "restart directory ready");
        Ok(())
    }

    /// Resolve executable, environment script, libraries and log path.
    pub fn execution_request(&self, grid: ProcessGrid) -> ExecutionRequest {
        let model = &self.config.model;
        let layout = ModelLayout::new(self.ctx.experiment_path(), model);

        ExecutionRequest {
            process_count: grid.process_count(),
            executable: layout.executable_path(),
            env_script: layout.env_script_path(),
            output_log: self.ctx.forecast_dir(&self.config.run.log_file),
            lib_path: Some(layout.lib_dir()),
            preload_libs: model.preload_libs.clone(),
            launcher: model.launcher.clone(),
            logging_config: model.logging_config.clone(),
        }
    }

    /// The tracked command for `request`: the launch script under
    /// `<shell> -c`, run from the forecast directory.
    pub fn tracked_command(&self, request: &ExecutionRequest) -> Result<TrackedCommand> {
        let script = request.shell_command()?;
        Ok(
            TrackedCommand::shell(&self.config.run.shell, script, &request.output_log)
                .cwd(self.ctx.forecast_dir(""))
                .echo_output(self.config.run.echo_output)
                .timeout(self.config.run_timeout()),
        )
    }

    /// Run the executable to completion.
    ///
    /// Configuration problems (bad `NX`/`NY`, missing executable) are
    /// reported before anything is spawned. The launch entry is logged
    /// before the executable pre-check, so it is present even when that
    /// check fails. A failing run surfaces as
    /// [`SwellError::ExecutionFailed`]; its log file is left in place.
    pub async fn execute(&mut self) -> Result<()> {
        let grid = self.process_grid()?;

        self.ensure_restart_dir()?;

        let request = self.execution_request(grid);
        info!(
            executable = ?request.executable,
            np = request.process_count,
            "Running {} with {} processors.",
            request.executable.display(),
            request.process_count
        );

        request.ensure_launchable(self.fs.as_ref())?;

        let cmd = self.tracked_command(&request)?;
        self.launcher.launch(cmd).await
    }
}
