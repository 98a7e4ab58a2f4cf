// tests/run_geos_executable.rs
mod common;
use crate::common::{init_tracing, read_log_lines};

use swell_core::errors::SwellError;
use swell_core::exec::TrackedLauncher;
use swell_core::fs::mock::MockFileSystem;
use swell_core::runner::RunGeosExecutable;
use swell_core::types::ProcessOutcome;
use swell_test_utils::builders::{ExperimentFixture, SwellConfigBuilder};
use swell_test_utils::fake_launcher::FakeLauncher;
use swell_test_utils::{capture_logs, with_timeout};

#[tokio::test]
async fn launches_expected_shell_script_from_forecast_dir() {
    init_tracing();
    let fixture = ExperimentFixture::new();
    let config = SwellConfigBuilder::new().build();

    let mut task = RunGeosExecutable::new(fixture.context(), config, FakeLauncher::new());
    task.execute().await.unwrap();

    let launched = task.launcher().launched();
    let launched = launched.lock().unwrap();
    assert_eq!(launched.len(), 1);
    let cmd = &launched[0];

    let lib = fixture.lib_dir();
    let expected_script = format!(
        "source {}\nenv LD_PRELOAD={}:{} mpirun -np 24 {} --logging_config logging.yaml",
        fixture.env_script_path().display(),
        lib.join("libmom6.so").display(),
        lib.join("libcice6.so").display(),
        fixture.executable_path().display(),
    );

    assert_eq!(
        cmd.argv_lossy(),
        vec!["/bin/bash".to_string(), "-c".to_string(), expected_script]
    );
    assert_eq!(cmd.get_cwd(), Some(fixture.forecast_dir.as_path()));
    assert_eq!(cmd.log_file(), fixture.log_path().as_path());
    assert_eq!(cmd.get_timeout(), None);

    assert!(fixture.forecast_dir.join("RESTART").is_dir());
}

#[tokio::test]
async fn existing_restart_dir_is_left_alone() {
    init_tracing();
    let fixture = ExperimentFixture::new();
    let restart = fixture.forecast_dir.join("RESTART");
    std::fs::create_dir(&restart).unwrap();
    std::fs::write(restart.join("fvcore_internal_rst"), "keep").unwrap();

    let mut task = RunGeosExecutable::new(
        fixture.context(),
        SwellConfigBuilder::new().build(),
        FakeLauncher::new(),
    );
    task.execute().await.unwrap();

    assert_eq!(
        std::fs::read_to_string(restart.join("fvcore_internal_rst")).unwrap(),
        "keep"
    );
}

#[tokio::test]
async fn configured_timeout_and_launcher_reach_the_command() {
    init_tracing();
    let fixture = ExperimentFixture::new();
    let config = SwellConfigBuilder::new()
        .with_launcher("srun")
        .with_preload_libs(&[])
        .with_timeout("90m")
        .build();

    let mut task = RunGeosExecutable::new(fixture.context(), config, FakeLauncher::new());
    task.execute().await.unwrap();

    let launched = task.launcher().launched();
    let launched = launched.lock().unwrap();
    let cmd = &launched[0];
    let script = cmd.argv_lossy().pop().unwrap();

    assert!(!script.contains("LD_PRELOAD"), "{script}");
    assert!(script.contains("\nsrun -np 24 "), "{script}");
    assert_eq!(
        cmd.get_timeout(),
        Some(std::time::Duration::from_secs(90 * 60))
    );
}

#[tokio::test]
async fn rewritten_run_control_changes_process_count() {
    init_tracing();
    let fixture = ExperimentFixture::new();
    let mut task = RunGeosExecutable::new(
        fixture.context(),
        SwellConfigBuilder::new().build(),
        FakeLauncher::new(),
    );

    task.execute().await.unwrap();
    fixture.write_rc("NX: '2'\nNY: '3'\n");
    task.execute().await.unwrap();

    let launched = task.launcher().launched();
    let launched = launched.lock().unwrap();
    assert_eq!(launched.len(), 2);
    assert!(launched[0].argv_lossy()[2].contains(" -np 24 "));
    assert!(launched[1].argv_lossy()[2].contains(" -np 6 "));
}

#[tokio::test]
async fn missing_dimension_fails_before_any_side_effect() {
    init_tracing();
    let fixture = ExperimentFixture::with_rc("NX: '4'\n");
    let mut task = RunGeosExecutable::new(
        fixture.context(),
        SwellConfigBuilder::new().build(),
        FakeLauncher::new(),
    );

    match task.execute().await {
        Err(SwellError::ConfigError(msg)) => assert!(msg.contains("'NY'"), "{msg}"),
        other => panic!("expected ConfigError, got {other:?}"),
    }
    assert_eq!(task.launcher().launch_count(), 0);
    assert!(!fixture.forecast_dir.join("RESTART").exists());
}

#[tokio::test]
async fn missing_run_control_file_is_config_error() {
    init_tracing();
    let fixture = ExperimentFixture::new();
    std::fs::remove_file(fixture.forecast_dir.join("AGCM.rc")).unwrap();

    let mut task = RunGeosExecutable::new(
        fixture.context(),
        SwellConfigBuilder::new().build(),
        FakeLauncher::new(),
    );

    assert!(matches!(
        task.execute().await,
        Err(SwellError::ConfigError(_))
    ));
    assert_eq!(task.launcher().launch_count(), 0);
}

#[tokio::test]
async fn missing_executable_is_config_error() {
    init_tracing();
    let fixture = ExperimentFixture::new();
    std::fs::remove_file(fixture.executable_path()).unwrap();

    let mut task = RunGeosExecutable::new(
        fixture.context(),
        SwellConfigBuilder::new().build(),
        FakeLauncher::new(),
    );

    match task.execute().await {
        Err(SwellError::ConfigError(msg)) => assert!(msg.contains("GEOSgcm.x"), "{msg}"),
        other => panic!("expected ConfigError, got {other:?}"),
    }
    assert_eq!(task.launcher().launch_count(), 0);
}

#[tokio::test]
async fn launch_entry_is_logged_before_executable_check_fails() {
    let fixture = ExperimentFixture::new();
    std::fs::remove_file(fixture.executable_path()).unwrap();
    let (logs, _guard) = capture_logs();

    let mut task = RunGeosExecutable::new(
        fixture.context(),
        SwellConfigBuilder::new().build(),
        FakeLauncher::new(),
    );

    assert!(matches!(
        task.execute().await,
        Err(SwellError::ConfigError(_))
    ));
    let expected = format!(
        "Running {} with 24 processors.",
        fixture.executable_path().display()
    );
    let logged = logs.contents();
    assert!(logged.contains(&expected), "{logged}");
    assert_eq!(task.launcher().launch_count(), 0);
}

#[cfg(unix)]
#[tokio::test]
async fn non_executable_binary_is_config_error() {
    use std::os::unix::fs::PermissionsExt;

    init_tracing();
    let fixture = ExperimentFixture::new();
    std::fs::set_permissions(
        fixture.executable_path(),
        std::fs::Permissions::from_mode(0o644),
    )
    .unwrap();

    let mut task = RunGeosExecutable::new(
        fixture.context(),
        SwellConfigBuilder::new().build(),
        FakeLauncher::new(),
    );

    match task.execute().await {
        Err(SwellError::ConfigError(msg)) => assert!(msg.contains("not executable"), "{msg}"),
        other => panic!("expected ConfigError, got {other:?}"),
    }
    assert_eq!(task.launcher().launch_count(), 0);
}

#[tokio::test]
async fn run_control_can_come_from_injected_filesystem() {
    init_tracing();
    let fixture = ExperimentFixture::new();
    let mock = MockFileSystem::new();
    mock.add_file(fixture.forecast_dir.join("AGCM.rc"), "NX = 8\nNY = 12\n");
    mock.add_executable(fixture.executable_path(), "binary");

    let mut task = RunGeosExecutable::new(
        fixture.context(),
        SwellConfigBuilder::new().build(),
        FakeLauncher::new(),
    )
    .with_filesystem(mock);

    assert_eq!(task.process_grid().unwrap().process_count(), 96);
    task.execute().await.unwrap();

    let launched = task.launcher().launched();
    assert!(launched.lock().unwrap()[0].argv_lossy()[2].contains(" -np 96 "));
}

#[tokio::test]
async fn injected_non_executable_is_config_error() {
    init_tracing();
    let fixture = ExperimentFixture::new();
    let mock = MockFileSystem::new();
    mock.add_file(fixture.forecast_dir.join("AGCM.rc"), "NX: 1\nNY: 1\n");
    mock.add_file(fixture.executable_path(), "not a program");

    let mut task = RunGeosExecutable::new(
        fixture.context(),
        SwellConfigBuilder::new().build(),
        FakeLauncher::new(),
    )
    .with_filesystem(mock);

    match task.execute().await {
        Err(SwellError::ConfigError(msg)) => assert!(msg.contains("not executable"), "{msg}"),
        other => panic!("expected ConfigError, got {other:?}"),
    }
    assert_eq!(task.launcher().launch_count(), 0);
}

#[tokio::test]
async fn launch_failure_propagates_with_log_path() {
    init_tracing();
    let fixture = ExperimentFixture::new();
    let mut task = RunGeosExecutable::new(
        fixture.context(),
        SwellConfigBuilder::new().build(),
        FakeLauncher::new().with_outcome(ProcessOutcome::Exited(134)),
    );

    match task.execute().await {
        Err(SwellError::ExecutionFailed { outcome, log }) => {
            assert_eq!(outcome, ProcessOutcome::Exited(134));
            assert_eq!(log, fixture.log_path());
        }
        other => panic!("expected ExecutionFailed, got {other:?}"),
    }
}

/// A stand-in for `mpirun`: reports what it was given, then runs the
/// executable without the bogus preload libraries.
const FAKE_MPIRUN: &str = r#"#!/bin/sh
echo "launcher-args: $*"
echo "launcher-preload: $LD_PRELOAD"
echo "launcher-env: $SWELL_TEST_MODEL_ENV"
shift 2
unset LD_PRELOAD
exec "$@"
"#;

#[cfg(unix)]
#[tokio::test]
async fn end_to_end_run_writes_everything_to_log() {
    init_tracing();
    let fixture = ExperimentFixture::new();
    let mpirun = fixture.write_tool("mpirun", FAKE_MPIRUN);
    fixture.write_env_script("export SWELL_TEST_MODEL_ENV=loaded\n");

    let config = SwellConfigBuilder::new()
        .with_launcher(&mpirun.display().to_string())
        .build();
    let mut task = RunGeosExecutable::new(fixture.context(), config, TrackedLauncher::new());

    with_timeout(task.execute()).await.unwrap();

    let lines = read_log_lines(&fixture.log_path());
    let find = |prefix: &str| {
        lines
            .iter()
            .find(|l| l.starts_with(prefix))
            .cloned()
            .unwrap_or_else(|| panic!("no line starting with {prefix:?} in {lines:?}"))
    };

    assert_eq!(
        find("launcher-args: "),
        format!(
            "launcher-args: -np 24 {} --logging_config logging.yaml",
            fixture.executable_path().display()
        )
    );
    assert_eq!(
        find("launcher-preload: "),
        format!(
            "launcher-preload: {}:{}",
            fixture.lib_dir().join("libmom6.so").display(),
            fixture.lib_dir().join("libcice6.so").display()
        )
    );
    assert_eq!(find("launcher-env: "), "launcher-env: loaded");
    assert_eq!(
        find("GEOSgcm.x "),
        "GEOSgcm.x --logging_config logging.yaml"
    );
}

#[cfg(unix)]
#[tokio::test]
async fn end_to_end_failure_reports_exit_status() {
    init_tracing();
    let fixture = ExperimentFixture::new();
    let mpirun = fixture.write_tool("mpirun", FAKE_MPIRUN);
    fixture.write_executable("#!/bin/sh\necho \"model crashed\"\nexit 3\n");

    let config = SwellConfigBuilder::new()
        .with_launcher(&mpirun.display().to_string())
        .build();
    let mut task = RunGeosExecutable::new(fixture.context(), config, TrackedLauncher::new());

    match with_timeout(task.execute()).await {
        Err(SwellError::ExecutionFailed { outcome, log }) => {
            assert_eq!(outcome, ProcessOutcome::Exited(3));
            assert_eq!(log, fixture.log_path());
        }
        other => panic!("expected ExecutionFailed, got {other:?}"),
    }

    assert!(read_log_lines(&fixture.log_path())
        .iter()
        .any(|l| l == "model crashed"));
}
