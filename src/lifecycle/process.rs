//! Running external tools with a timeout and cancellation.
//!
//! std::process has no native timeout, so the child is polled every 100ms.
//! stdout and stderr are drained on reader threads while it runs, which
//! keeps a chatty child from blocking on a full pipe. stdin is fed from its
//! own thread, so a child that never reads it cannot stall the poll loop.
//! On timeout or cancellation the child is killed and reaped.

use std::io::{Read, Write};
use std::process::{Child, ChildStdin, Command, Output, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::debug;

use super::CancelToken;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Failure running an external tool.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("{0} not found in PATH")]
    NotFound(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("cancelled")]
    Cancelled,

    #[error("exit code {code}: {}", truncate_stderr(stderr))]
    ExitCode { code: i32, stderr: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Keep error messages to a readable size.
pub(crate) fn truncate_stderr(stderr: &str) -> String {
    const MAX_LEN: usize = 500;
    let trimmed = stderr.trim();
    if trimmed.chars().count() <= MAX_LEN {
        trimmed.to_string()
    } else {
        let head: String = trimmed.chars().take(MAX_LEN).collect();
        format!("{}...", head)
    }
}

/// Check if a command exists in PATH.
pub fn command_exists(cmd: &str) -> bool {
    #[cfg(windows)]
    let probe = "where";
    #[cfg(not(windows))]
    let probe = "which";

    Command::new(probe)
        .arg(cmd)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Spawn `cmd`, optionally feed `stdin`, and wait for it to finish.
///
/// A non-zero exit is returned as [`ProcessError::ExitCode`] with the
/// child's stderr.
pub fn run_command(
    cmd: &mut Command,
    stdin: Option<&[u8]>,
    timeout: Duration,
    cancel: &CancelToken,
) -> Result<Output, ProcessError> {
    if cancel.is_cancelled() {
        return Err(ProcessError::Cancelled);
    }

    let program = cmd.get_program().to_string_lossy().to_string();
    debug!("Running {} {:?}", program, cmd.get_args().collect::<Vec<_>>());

    cmd.stdin(if stdin.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    })
    .stdout(Stdio::piped())
    .stderr(Stdio::piped());

    let mut child = cmd.spawn().map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ProcessError::NotFound(program.clone()),
        _ => ProcessError::Io(e),
    })?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let writer = match (stdin, child.stdin.take()) {
        (Some(input), Some(pipe)) => Some(feed(pipe, input.to_vec(), program.clone())),
        _ => None,
    };

    // On the error paths the killed child closes its end and the writer exits on EPIPE.
    let status = wait_with_timeout(&mut child, timeout, cancel)?;
    if let Some(handle) = writer {
        let _ = handle.join();
    }
    let output = Output {
        status,
        stdout: join(stdout),
        stderr: join(stderr),
    };

    if output.status.success() {
        Ok(output)
    } else {
        Err(ProcessError::ExitCode {
            code: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

fn wait_with_timeout(
    child: &mut Child,
    timeout: Duration,
    cancel: &CancelToken,
) -> Result<std::process::ExitStatus, ProcessError> {
    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if cancel.is_cancelled() {
            kill_and_reap(child);
            return Err(ProcessError::Cancelled);
        }
        if start.elapsed() >= timeout {
            kill_and_reap(child);
            return Err(ProcessError::Timeout(timeout));
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn kill_and_reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait(); // Reap the zombie
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>> {
    pipe.map(|mut p| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            p.read_to_end(&mut buf).ok();
            buf
        })
    })
}

fn feed(mut pipe: ChildStdin, input: Vec<u8>, program: String) -> JoinHandle<()> {
    thread::spawn(move || {
        if let Err(e) = pipe.write_all(&input) {
            // A child that exits early closes its stdin; its status tells the story.
            debug!("Writing stdin to {} failed: {}", program, e);
        }
        // pipe is dropped here, closing stdin
    })
}

fn join(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}
