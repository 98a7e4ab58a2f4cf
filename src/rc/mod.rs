// src/rc/mod.rs

//! Run-control documents.
//!
//! A run-control file (e.g. GEOS `AGCM.rc`) is a flat list of `KEY: value`
//! or `KEY = value` entries. The process runner reads it fresh on every
//! launch, because earlier workflow steps may rewrite it between runs.
//!
//! - [`document`] parses the file into a key/value map.
//! - [`process_grid`] derives the parallel process count from `NX` and `NY`.

pub mod document;
pub mod process_grid;

pub use document::RunControlDocument;
pub use process_grid::ProcessGrid;
