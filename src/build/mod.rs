// src/build/mod.rs

//! Build configuration composer.
//!
//! Prepares what the external bundling engine consumes:
//!
//! - [`layout`]: `build_and_source_dirs`, the canonical build/source split
//!   under a package root.
//! - [`link`]: `link_path`, replace whatever sits at a target with a symlink.
//! - [`engine`]: the engine's default configuration and known platforms.
//! - [`pinned`]: locating and loading the pinned-version document.
//! - [`bundle`]: `set_jedi_bundle_config`, the merged configuration object.

pub mod bundle;
pub mod engine;
pub mod layout;
pub mod link;
pub mod pinned;

pub use bundle::{set_jedi_bundle_config, BundleConfiguration, BundleRequest};
pub use engine::{BundleEngine, EngineDefaults};
pub use layout::build_and_source_dirs;
pub use link::{link_path, PreviousTarget};
pub use pinned::{get_pinned_vers_path, load_pinned_versions};
