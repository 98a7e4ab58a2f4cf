// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running commands, using
//! `tokio::process::Command`, and recording everything they print.
//!
//! - [`command`] defines `TrackedCommand`, the fully resolved launch request.
//! - [`tracked`] is the tracked-subprocess primitive: spawn, drain stdout and
//!   stderr concurrently into a log file, wait, and report the outcome.
//! - [`backend`] provides the `ProcessLauncher` trait and the concrete
//!   `TrackedLauncher` used in production, which tests can replace with a
//!   fake implementation.

pub mod backend;
pub mod command;
pub mod tracked;

pub use backend::{ProcessLauncher, TrackedLauncher};
pub use command::TrackedCommand;
pub use tracked::run_track_log_subprocess;
