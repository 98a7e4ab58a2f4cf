// src/exec/backend.rs

//! Pluggable launcher abstraction.
//!
//! The process runner talks to a `ProcessLauncher` instead of calling the
//! tracked-subprocess primitive directly. This makes it easy to swap in a
//! fake launcher in tests while keeping the production implementation in
//! [`tracked`](super::tracked).
//!
//! - `TrackedLauncher` is the default implementation. It runs the command
//!   with [`run_track_log_subprocess`].
//! - Tests can provide their own `ProcessLauncher` that, for example, records
//!   which commands were launched and returns a canned result.

use std::future::Future;
use std::pin::Pin;

use crate::errors::Result;

use super::command::TrackedCommand;
use super::tracked::run_track_log_subprocess;

/// Trait abstracting how a fully resolved command is executed.
pub trait ProcessLauncher: Send {
    /// Run `cmd` to completion.
    ///
    /// The implementation is free to:
    /// - spawn an OS process and log its output (production)
    /// - record the command and simulate an outcome (tests)
    fn launch(
        &mut self,
        cmd: TrackedCommand,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Real launcher used in production.
#[derive(Debug, Clone, Default)]
pub struct TrackedLauncher;

impl TrackedLauncher {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessLauncher for TrackedLauncher {
    fn launch(
        &mut self,
        cmd: TrackedCommand,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move { run_track_log_subprocess(&cmd).await })
    }
}
