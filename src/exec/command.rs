// src/exec/command.rs

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// A command to run under the tracked-subprocess primitive.
///
/// Owns everything needed for one launch: argument vector, working
/// directory, extra environment, the log file that receives combined
/// stdout/stderr, and supervision options.
#[derive(Debug, Clone)]
pub struct TrackedCommand {
    program: OsString,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
    env: Vec<(OsString, OsString)>,
    log_file: PathBuf,
    echo_output: bool,
    timeout: Option<Duration>,
}

impl TrackedCommand {
    pub fn new(program: impl Into<OsString>, log_file: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: Vec::new(),
            log_file: log_file.into(),
            echo_output: false,
            timeout: None,
        }
    }

    /// `<shell> -c <script>`.
    pub fn shell(
        shell: impl Into<OsString>,
        script: impl Into<OsString>,
        log_file: impl Into<PathBuf>,
    ) -> Self {
        Self::new(shell, log_file).arg("-c").arg(script)
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn echo_output(mut self, echo: bool) -> Self {
        self.echo_output = echo;
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    pub fn get_cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    pub fn get_env(&self) -> &[(OsString, OsString)] {
        &self.env
    }

    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    pub fn echoes_output(&self) -> bool {
        self.echo_output
    }

    pub fn get_timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Program followed by its arguments, lossily converted for display.
    pub fn argv_lossy(&self) -> Vec<String> {
        std::iter::once(self.program.as_os_str())
            .chain(self.args.iter().map(OsString::as_os_str))
            .map(|s| s.to_string_lossy().into_owned())
            .collect()
    }
}
