// src/lib.rs

pub mod build;
pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod rc;
pub mod runner;
pub mod types;

use std::path::PathBuf;

use anyhow::Result;
use tracing::debug;

use crate::build::{
    build_and_source_dirs, get_pinned_vers_path, link_path, set_jedi_bundle_config,
    BundleRequest, EngineDefaults,
};
use crate::cli::{CliArgs, Command};
use crate::config::{default_config_path, load_or_default, SwellConfig};
use crate::exec::TrackedLauncher;
use crate::fs::RealFileSystem;
use crate::runner::{RunGeosExecutable, TaskContext};

/// High-level entry point used by `main.rs`.
///
/// Loads `Swell.toml` (or the built-in defaults) and dispatches the
/// subcommand to the matching leaf operation.
pub async fn run(args: CliArgs) -> Result<()> {
    let config = load_config(&args)?;

    match args.command {
        Command::RunGeos {
            forecast_dir,
            experiment_root,
            dry_run,
        } => {
            let ctx = TaskContext::new(forecast_dir, experiment_root);
            let mut task = RunGeosExecutable::new(ctx, config, TrackedLauncher::new());
            if dry_run {
                print_dry_run(&task)?;
                return Ok(());
            }
            task.execute().await?;
        }

        Command::BuildDirs { package_path } => {
            let (build_dir, source_dir) = build_and_source_dirs(&package_path)?;
            println!("{}", build_dir.display());
            println!("{}", source_dir.display());
        }

        Command::Link { source, target } => {
            link_path(&source, &target)?;
        }

        Command::BundleConfig {
            bundles,
            path_to_source,
            path_to_build,
            platform,
            use_pinned,
            cores,
        } => {
            let fs = RealFileSystem;
            let engine = match &config.build.engine_defaults {
                Some(path) => EngineDefaults::load(&fs, &config.resolve(path))?,
                None => EngineDefaults::builtin()?,
            };

            let mut request = BundleRequest::new(bundles, path_to_source, path_to_build, platform)
                .cores(cores.unwrap_or(config.build.cores_to_use_for_make));
            if use_pinned {
                request = request.pinned(get_pinned_vers_path(&config));
            }

            let bundle_config = set_jedi_bundle_config(&engine, &fs, &request)?;
            print!("{}", bundle_config.to_yaml()?);
        }
    }

    Ok(())
}

fn load_config(args: &CliArgs) -> Result<SwellConfig> {
    let (path, explicit): (PathBuf, bool) = match &args.config {
        Some(p) => (p.clone(), true),
        None => (default_config_path(), false),
    };
    let config = load_or_default(&path, explicit)?;
    debug!(config = ?path, root = ?config.root_dir(), "configuration loaded");
    Ok(config)
}

/// Dry-run output: the resolved launch without spawning anything.
fn print_dry_run(task: &RunGeosExecutable<TrackedLauncher>) -> Result<()> {
    let grid = task.process_grid()?;
    let request = task.execution_request(grid);
    let cmd = task.tracked_command(&request)?;

    println!("swell-core dry-run");
    println!(
        "  process grid: NX={} NY={} -> np={}",
        grid.nx(),
        grid.ny(),
        request.process_count
    );
    println!("  executable: {}", request.executable.display());
    println!("  log file: {}", request.output_log.display());
    if let Some(cwd) = cmd.get_cwd() {
        println!("  cwd: {}", cwd.display());
    }
    println!("  argv: {:?}", cmd.argv_lossy());
    println!();
    println!("{}", request.shell_command()?);

    debug!("dry-run complete (no execution)");
    Ok(())
}
