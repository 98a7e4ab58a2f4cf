// src/runner/mod.rs

//! Process runner for MPI-parallel model executables.
//!
//! - [`context`] holds the per-task paths supplied by the workflow.
//! - [`layout`] maps an experiment root onto the model's build tree.
//! - [`request`] is the resolved launch request and its shell script.
//! - [`geos`] ties them together: read the run-control document, prepare
//!   the forecast directory, and hand the command to a `ProcessLauncher`.

pub mod context;
pub mod geos;
pub mod layout;
pub mod request;

pub use context::TaskContext;
pub use geos::RunGeosExecutable;
pub use layout::ModelLayout;
pub use request::ExecutionRequest;
