// src/exec/tracked.rs

//! Run a child process while streaming its combined output to a log file.

use std::process::Stdio;
use std::time::Duration;

use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::errors::{Result, SwellError};
use crate::exec::command::TrackedCommand;
use crate::types::{OutputStream, ProcessOutcome};

/// How long stream drains may keep running after a timed-out child was
/// killed. Only reached when something outside the child's process group
/// inherited the pipes.
const DRAIN_GRACE_AFTER_KILL: Duration = Duration::from_secs(5);

/// Size of one read from a child pipe.
const READ_CHUNK: usize = 8192;

/// Longest partial line held back for echoing before it is emitted as is.
const ECHO_LINE_LIMIT: usize = 64 * 1024;

/// Bytes read from one child stream, exactly as the child wrote them.
#[derive(Debug)]
struct CapturedChunk {
    stream: OutputStream,
    bytes: Vec<u8>,
}

/// Spawn `cmd`, stream its stdout and stderr into `cmd.log_file()` as they
/// arrive, and block until the child exits.
///
/// Output is forwarded in chunks as soon as the child writes it, newline or
/// not, and the log is flushed after every batch, so a crash of either side
/// leaves everything read so far on disk. Both streams are fully drained
/// before the exit status is reported.
///
/// On Unix the child leads its own process group. A timeout kills the whole
/// group, so launchers and the ranks they started go down together.
///
/// Returns `Ok(())` on exit status 0, otherwise
/// [`SwellError::ExecutionFailed`] carrying the outcome and log path.
pub async fn run_track_log_subprocess(cmd: &TrackedCommand) -> Result<()> {
    let log_path = cmd.log_file();
    let log = File::create(log_path)
        .await
        .map_err(|e| SwellError::fs("creating log file", log_path, e))?;

    let program = cmd.program().to_string_lossy().into_owned();

    let mut command = Command::new(cmd.program());
    command
        .args(cmd.get_args())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(unix)]
    command.process_group(0);
    if let Some(cwd) = cmd.get_cwd() {
        command.current_dir(cwd);
    }
    for (key, value) in cmd.get_env() {
        command.env(key, value);
    }

    let mut child = command.spawn().map_err(|source| SwellError::SpawnFailed {
        program: program.clone(),
        source,
    })?;

    info!(
        program = %program,
        pid = ?child.id(),
        cwd = ?cmd.get_cwd(),
        log = ?log_path,
        "started tracked process"
    );

    let (chunk_tx, chunk_rx) = mpsc::channel::<CapturedChunk>(256);
    let mut drains: Vec<JoinHandle<std::io::Result<()>>> = Vec::new();
    if let Some(stdout) = child.stdout.take() {
        drains.push(tokio::spawn(drain_stream(
            stdout,
            OutputStream::Stdout,
            chunk_tx.clone(),
        )));
    }
    if let Some(stderr) = child.stderr.take() {
        drains.push(tokio::spawn(drain_stream(
            stderr,
            OutputStream::Stderr,
            chunk_tx.clone(),
        )));
    }
    // The writer finishes once every drain has dropped its sender.
    drop(chunk_tx);

    let writer = tokio::spawn(write_log(log, chunk_rx, cmd.echoes_output()));

    let outcome = wait_for_exit(&mut child, cmd.get_timeout(), &program).await?;

    finish_drains(drains, &outcome).await?;

    let bytes = writer
        .await
        .map_err(anyhow::Error::from)?
        .map_err(|e| SwellError::fs("writing log file", log_path, e))?;

    info!(
        program = %program,
        outcome = %outcome,
        bytes,
        log = ?log_path,
        "tracked process exited"
    );

    if outcome.is_success() {
        Ok(())
    } else {
        Err(SwellError::ExecutionFailed {
            outcome,
            log: log_path.to_path_buf(),
        })
    }
}

async fn wait_for_exit(
    child: &mut Child,
    timeout: Option<Duration>,
    program: &str,
) -> Result<ProcessOutcome> {
    let Some(limit) = timeout else {
        let status = child.wait().await?;
        return Ok(ProcessOutcome::from(status));
    };

    match tokio::time::timeout(limit, child.wait()).await {
        Ok(status) => Ok(ProcessOutcome::from(status?)),
        Err(_) => {
            warn!(
                program = %program,
                timeout = ?limit,
                "tracked process exceeded timeout; killing its process group"
            );
            kill_process_group(child, program);
            if let Err(e) = child.kill().await {
                warn!(program = %program, error = %e, "failed to kill timed-out process");
            }
            Ok(ProcessOutcome::TimedOut(limit))
        }
    }
}

/// SIGKILL every process in the child's group (the child is its leader).
#[cfg(unix)]
fn kill_process_group(child: &Child, program: &str) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let Some(pid) = child.id() else {
        // Already reaped; its group may still hold stragglers but has no
        // leader id left to address.
        return;
    };
    let Ok(pgid) = i32::try_from(pid) else {
        return;
    };
    if let Err(errno) = killpg(Pid::from_raw(pgid), Signal::SIGKILL) {
        debug!(program = %program, pgid, error = %errno, "killpg failed");
    }
}

#[cfg(not(unix))]
fn kill_process_group(_child: &Child, _program: &str) {}

/// Wait for both stream drains. After a timeout kill they get a bounded
/// grace period; otherwise they run until the pipes close.
async fn finish_drains(
    drains: Vec<JoinHandle<std::io::Result<()>>>,
    outcome: &ProcessOutcome,
) -> Result<()> {
    for handle in drains {
        let joined = if matches!(outcome, ProcessOutcome::TimedOut(_)) {
            let abort = handle.abort_handle();
            match tokio::time::timeout(DRAIN_GRACE_AFTER_KILL, handle).await {
                Ok(joined) => joined,
                Err(_) => {
                    warn!("output pipe still open after kill; abandoning drain");
                    abort.abort();
                    continue;
                }
            }
        } else {
            handle.await
        };

        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "error reading child output"),
            Err(e) if e.is_cancelled() => {}
            Err(e) => return Err(anyhow::Error::from(e).into()),
        }
    }
    Ok(())
}

/// Forward everything read from `stream` to the writer, one read at a time.
///
/// Nothing is held back waiting for a newline; an aborted drain loses at
/// most the read in flight.
async fn drain_stream<R>(
    mut stream: R,
    which: OutputStream,
    tx: mpsc::Sender<CapturedChunk>,
) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; READ_CHUNK];
    loop {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            debug!(stream = which.as_str(), "child stream closed");
            return Ok(());
        }
        let chunk = CapturedChunk {
            stream: which,
            bytes: buf[..n].to_vec(),
        };
        if tx.send(chunk).await.is_err() {
            // Writer is gone; nothing left to record into.
            return Ok(());
        }
    }
}

/// Append captured chunks to the log until every sender is dropped.
///
/// Whatever is queued is written as one batch and then flushed, so the file
/// never lags the child by more than one batch. Returns the number of bytes
/// written.
async fn write_log(
    mut log: File,
    mut rx: mpsc::Receiver<CapturedChunk>,
    echo: bool,
) -> std::io::Result<u64> {
    let mut written: u64 = 0;
    let mut batch: Vec<u8> = Vec::with_capacity(READ_CHUNK * 4);
    let mut echo_lines = EchoLines::default();

    while let Some(first) = rx.recv().await {
        batch.clear();
        batch.extend_from_slice(&first.bytes);
        if echo {
            echo_lines.push(&first);
        }

        while let Ok(next) = rx.try_recv() {
            batch.extend_from_slice(&next.bytes);
            if echo {
                echo_lines.push(&next);
            }
            if batch.len() >= 64 * 1024 {
                break;
            }
        }

        log.write_all(&batch).await?;
        log.flush().await?;
        written += batch.len() as u64;
    }

    if echo {
        echo_lines.finish();
    }
    log.sync_all().await?;
    Ok(written)
}

/// Reassembles per-stream lines for `tracing` echo. The log itself is
/// written from the raw chunks.
#[derive(Default)]
struct EchoLines {
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

impl EchoLines {
    fn push(&mut self, chunk: &CapturedChunk) {
        let pending = match chunk.stream {
            OutputStream::Stdout => &mut self.stdout,
            OutputStream::Stderr => &mut self.stderr,
        };
        pending.extend_from_slice(&chunk.bytes);

        while let Some(pos) = pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = pending.drain(..=pos).collect();
            emit(chunk.stream, &line);
        }
        if pending.len() >= ECHO_LINE_LIMIT {
            emit(chunk.stream, pending);
            pending.clear();
        }
    }

    fn finish(&mut self) {
        for (stream, pending) in [
            (OutputStream::Stdout, &mut self.stdout),
            (OutputStream::Stderr, &mut self.stderr),
        ] {
            if !pending.is_empty() {
                emit(stream, pending);
                pending.clear();
            }
        }
    }
}

fn emit(stream: OutputStream, bytes: &[u8]) {
    let text = String::from_utf8_lossy(bytes);
    info!(stream = stream.as_str(), "{}", text.trim_end());
}
