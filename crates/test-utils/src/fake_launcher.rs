use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use swell_core::errors::{Result, SwellError};
use swell_core::exec::{ProcessLauncher, TrackedCommand};
use swell_core::types::ProcessOutcome;

/// A fake launcher that:
/// - records every command it is asked to launch
/// - immediately reports the configured outcome without spawning anything.
#[derive(Clone)]
pub struct FakeLauncher {
    launched: Arc<Mutex<Vec<TrackedCommand>>>,
    outcome: ProcessOutcome,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self {
            launched: Arc::new(Mutex::new(Vec::new())),
            outcome: ProcessOutcome::Success,
        }
    }

    /// Report `outcome` for every launch.
    pub fn with_outcome(mut self, outcome: ProcessOutcome) -> Self {
        self.outcome = outcome;
        self
    }

    /// Shared handle to the recorded commands.
    pub fn launched(&self) -> Arc<Mutex<Vec<TrackedCommand>>> {
        Arc::clone(&self.launched)
    }

    pub fn launch_count(&self) -> usize {
        self.launched.lock().unwrap().len()
    }
}

impl Default for FakeLauncher {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessLauncher for FakeLauncher {
    fn launch(
        &mut self,
        cmd: TrackedCommand,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let launched = Arc::clone(&self.launched);
        let outcome = self.outcome;

        Box::pin(async move {
            let log = cmd.log_file().to_path_buf();
            {
                let mut guard = launched.lock().unwrap();
                guard.push(cmd);
            }

            if outcome.is_success() {
                Ok(())
            } else {
                Err(SwellError::ExecutionFailed { outcome, log })
            }
        })
    }
}
