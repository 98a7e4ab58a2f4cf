//! Shared fixtures for the `swell-core` integration tests.

pub mod builders;
pub mod fake_launcher;

use std::future::Future;
use std::io;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::SubscriberInitExt;

static INIT: Once = Once::new();

/// Upper bound for any single async test step. Real subprocess tests
/// (10k-line output, timeout kills) finish well inside it.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Install a test-writer subscriber once per test binary.
///
/// Output is captured by the harness and shown only for failing tests
/// (or with `--nocapture`). The filter follows `SWELL_LOG`, e.g.
/// `SWELL_LOG=swell_core::exec=debug`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = swell_core::logging::filter_from_env(
            std::env::var(swell_core::logging::LOG_ENV).ok().as_deref(),
        );

        // Another harness may already have installed one.
        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}

/// Await `f`, panicking if it takes longer than [`TEST_TIMEOUT`].
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(TEST_TIMEOUT, f).await {
        Ok(out) => out,
        Err(_) => panic!("test step did not finish within {TEST_TIMEOUT:?}"),
    }
}

/// Formatted log output collected by [`capture_logs`].
#[derive(Clone, Default)]
pub struct LogCapture {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.lock().unwrap().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Record `info` and above into memory for as long as the guard lives.
///
/// The subscriber is installed for the current thread only, which covers a
/// `#[tokio::test]` on its default single-threaded runtime.
pub fn capture_logs() -> (LogCapture, tracing::subscriber::DefaultGuard) {
    let capture = LogCapture::default();
    let guard = fmt()
        .with_writer(capture.clone())
        .with_ansi(false)
        .with_max_level(LevelFilter::INFO)
        .finish()
        .set_default();
    (capture, guard)
}
