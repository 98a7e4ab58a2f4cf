// src/config/mod.rs

//! Configuration loading and validation for swell-core.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate field contents before they reach a shell command (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_or_default};
pub use model::{BuildSection, ModelSection, RawSwellConfig, RunSection, SwellConfig};
pub use validate::parse_duration;
