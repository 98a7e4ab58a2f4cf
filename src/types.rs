use std::fmt;
use std::process::ExitStatus;
use std::time::Duration;

/// How a tracked child process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    Success,
    /// Exited on its own with a non-zero code.
    Exited(i32),
    /// Terminated by the given signal number.
    Signalled(i32),
    /// Killed after exceeding the configured `[run].timeout`.
    TimedOut(Duration),
}

impl ProcessOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ProcessOutcome::Success)
    }
}

impl From<ExitStatus> for ProcessOutcome {
    fn from(status: ExitStatus) -> Self {
        if status.success() {
            return ProcessOutcome::Success;
        }
        if let Some(code) = status.code() {
            return ProcessOutcome::Exited(code);
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return ProcessOutcome::Signalled(signal);
            }
        }

        ProcessOutcome::Exited(-1)
    }
}

impl fmt::Display for ProcessOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessOutcome::Success => write!(f, "exit status 0"),
            ProcessOutcome::Exited(code) => write!(f, "exit status {code}"),
            ProcessOutcome::Signalled(sig) => write!(f, "terminated by signal {sig}"),
            ProcessOutcome::TimedOut(after) => write!(f, "timed out after {after:?}"),
        }
    }
}

/// Which child stream a captured line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

impl OutputStream {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputStream::Stdout => "stdout",
            OutputStream::Stderr => "stderr",
        }
    }
}
