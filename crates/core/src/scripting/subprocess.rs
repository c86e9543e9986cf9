//! Subprocess management shared by executors.
//!
//! Provides [`run_command`]: spawn, capture stdout/stderr under a combined
//! byte cap, and enforce the wall-clock timeout. Executors build the
//! [`tokio::process::Command`] for their runtime and delegate here.

use std::process::Stdio;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::executor::{ExecutionError, ScriptInput, ScriptOutput};

/// How long to keep draining pipes once the interpreter is gone.
///
/// Background children of the script can hold the pipes open indefinitely.
const DRAIN_GRACE: Duration = Duration::from_secs(2);

const READ_CHUNK: usize = 8 * 1024;

/// Byte sinks for both streams plus the shared budget.
struct Capture {
    stdout: Mutex<Vec<u8>>,
    stderr: Mutex<Vec<u8>>,
    total: AtomicUsize,
    limit: usize,
    overflow: CancellationToken,
}

impl Capture {
    fn new(limit: usize) -> Self {
        Self {
            stdout: Mutex::new(Vec::new()),
            stderr: Mutex::new(Vec::new()),
            total: AtomicUsize::new(0),
            limit,
            overflow: CancellationToken::new(),
        }
    }

    fn snapshot(&self, exit_code: Option<i32>, elapsed: Duration) -> ScriptOutput {
        let stdout = lock_bytes(&self.stdout);
        let stderr = lock_bytes(&self.stderr);
        ScriptOutput {
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
            exit_code,
            elapsed,
        }
    }
}

fn lock_bytes(sink: &Mutex<Vec<u8>>) -> Vec<u8> {
    match sink.lock() {
        Ok(buf) => buf.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

#[derive(Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

enum Ending {
    Exited(std::io::Result<std::process::ExitStatus>),
    TimedOut,
    Overflowed,
}

/// Spawn `cmd`, capture its output, and enforce the bounds in `input`.
///
/// The caller sets the program and arguments. Environment variables from
/// [`ScriptInput`] are applied here; stdin is closed.
pub async fn run_command(
    cmd: &mut Command,
    input: ScriptInput,
) -> Result<ScriptOutput, ExecutionError> {
    // `kill_on_drop(true)` ensures the child is killed if this future is dropped.
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    for (key, value) in &input.env_vars {
        cmd.env(key, value);
    }

    let start = Instant::now();
    let mut child = cmd.spawn().map_err(ExecutionError::Spawn)?;

    let capture = Arc::new(Capture::new(input.max_output_bytes));
    let readers = [
        spawn_reader(child.stdout.take(), Stream::Stdout, Arc::clone(&capture)),
        spawn_reader(child.stderr.take(), Stream::Stderr, Arc::clone(&capture)),
    ];

    let ending = tokio::select! {
        status = child.wait() => Ending::Exited(status),
        () = tokio::time::sleep(input.timeout) => Ending::TimedOut,
        () = capture.overflow.cancelled() => Ending::Overflowed,
    };

    match ending {
        Ending::Exited(Ok(status)) => {
            let elapsed = start.elapsed();
            drain(readers).await;
            let output = capture.snapshot(status.code(), elapsed);
            // The cap may have been hit by the final writes before exit.
            if capture.overflow.is_cancelled() {
                return Err(ExecutionError::OutputOverflow {
                    limit: input.max_output_bytes,
                    output,
                });
            }
            Ok(output)
        }
        Ending::Exited(Err(source)) => {
            let elapsed = start.elapsed();
            drain(readers).await;
            Err(ExecutionError::Io {
                source,
                output: capture.snapshot(None, elapsed),
            })
        }
        Ending::TimedOut => {
            kill(&mut child).await;
            let elapsed = start.elapsed();
            drain(readers).await;
            Err(ExecutionError::Timeout {
                limit: input.timeout,
                output: capture.snapshot(None, elapsed),
            })
        }
        Ending::Overflowed => {
            kill(&mut child).await;
            let elapsed = start.elapsed();
            drain(readers).await;
            Err(ExecutionError::OutputOverflow {
                limit: input.max_output_bytes,
                output: capture.snapshot(None, elapsed),
            })
        }
    }
}

async fn kill(child: &mut tokio::process::Child) {
    if let Err(e) = child.kill().await {
        tracing::warn!(error = %e, "Failed to kill script process");
    }
}

/// Wait for the readers to hit EOF, giving up after [`DRAIN_GRACE`].
async fn drain(readers: [JoinHandle<()>; 2]) {
    let deadline = tokio::time::Instant::now() + DRAIN_GRACE;
    for reader in readers {
        let abort = reader.abort_handle();
        if tokio::time::timeout_at(deadline, reader).await.is_err() {
            abort.abort();
        }
    }
}

fn spawn_reader<R>(handle: Option<R>, stream: Stream, capture: Arc<Capture>) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        if let Some(reader) = handle {
            pump(reader, stream, &capture).await;
        }
    })
}

/// Copy `reader` into its sink until EOF or until the shared budget runs out.
async fn pump<R: AsyncRead + Unpin>(mut reader: R, stream: Stream, capture: &Capture) {
    let sink = match stream {
        Stream::Stdout => &capture.stdout,
        Stream::Stderr => &capture.stderr,
    };
    let mut chunk = vec![0u8; READ_CHUNK];

    loop {
        let n = match reader.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };

        let used = capture.total.fetch_add(n, Ordering::SeqCst);
        let keep = n.min(capture.limit.saturating_sub(used));
        if keep > 0 {
            match sink.lock() {
                Ok(mut buf) => buf.extend_from_slice(&chunk[..keep]),
                Err(poisoned) => poisoned.into_inner().extend_from_slice(&chunk[..keep]),
            }
        }
        if keep < n {
            capture.overflow.cancel();
            break;
        }
    }
}
