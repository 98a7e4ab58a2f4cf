// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `swell-core`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "swell-core",
    version,
    about = "Launch model executables and compose bundle build configurations.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Swell.toml` in the current working directory; built-in
    /// defaults are used when that file does not exist.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SWELL_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run the GEOS executable for a forecast directory.
    RunGeos {
        /// Forecast working directory (holds AGCM.rc, receives the log).
        #[arg(long, value_name = "DIR")]
        forecast_dir: PathBuf,

        /// Experiment root containing the model build tree.
        #[arg(long, value_name = "DIR")]
        experiment_root: PathBuf,

        /// Resolve and print the launch command without running it.
        #[arg(long)]
        dry_run: bool,
    },

    /// Create a package directory and print its build/source paths.
    BuildDirs {
        #[arg(value_name = "PACKAGE_PATH")]
        package_path: PathBuf,
    },

    /// Replace TARGET with a symlink to SOURCE.
    Link {
        #[arg(value_name = "SOURCE")]
        source: PathBuf,
        #[arg(value_name = "TARGET")]
        target: PathBuf,
    },

    /// Print the bundling-engine configuration as YAML.
    BundleConfig {
        /// Bundles to build (comma separated or repeated).
        #[arg(long, value_delimiter = ',', required = true)]
        bundles: Vec<String>,

        #[arg(long = "source", value_name = "DIR")]
        path_to_source: PathBuf,

        #[arg(long = "build", value_name = "DIR")]
        path_to_build: PathBuf,

        #[arg(long)]
        platform: String,

        /// Attach the pinned-version document.
        #[arg(long)]
        use_pinned: bool,

        /// Overrides `[build].cores_to_use_for_make`.
        #[arg(long, value_name = "N")]
        cores: Option<u32>,
    },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
