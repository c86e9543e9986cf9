//! Script execution interface and shared types.
//!
//! Defines [`ScriptExecutor`], the seam between the gateway and process
//! spawning, along with [`ScriptInput`], [`ScriptOutput`], and
//! [`ExecutionError`].

use std::path::Path;
use std::time::Duration;

/// Default wall-clock limit for one script run.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

/// Default cap on combined stdout + stderr bytes (10 MiB).
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 10 * 1024 * 1024;

/// Bounds and environment for a single run.
#[derive(Debug, Clone)]
pub struct ScriptInput {
    /// Additional environment variables set for the child process.
    pub env_vars: Vec<(String, String)>,
    /// Maximum wall-clock time before the process is killed.
    pub timeout: Duration,
    /// Maximum combined stdout + stderr bytes before the process is killed.
    pub max_output_bytes: usize,
}

impl Default for ScriptInput {
    fn default() -> Self {
        Self {
            env_vars: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
        }
    }
}

/// Output captured from a script, whether or not it finished cleanly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptOutput {
    /// Captured stdout (lossy UTF-8, capped by `max_output_bytes`).
    pub stdout: String,
    /// Captured stderr (lossy UTF-8, capped by `max_output_bytes`).
    pub stderr: String,
    /// Exit code, `None` when the process was killed or never started.
    pub exit_code: Option<i32>,
    /// Wall-clock duration.
    pub elapsed: Duration,
}

/// Ways a run can end without a normal exit.
///
/// The kill-based variants keep whatever output was captured before the
/// interpreter was killed.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    /// The interpreter could not be started.
    #[error("Failed to start script: {0}")]
    Spawn(#[source] std::io::Error),

    /// The script exceeded its wall-clock limit and was killed.
    #[error("Script timed out after {}s", .limit.as_secs_f64())]
    Timeout { limit: Duration, output: ScriptOutput },

    /// The script wrote more than the output cap and was killed.
    #[error("Script output exceeded {limit} bytes")]
    OutputOverflow { limit: usize, output: ScriptOutput },

    /// Waiting on the child process failed.
    #[error("I/O error while running script: {source}")]
    Io {
        #[source]
        source: std::io::Error,
        output: ScriptOutput,
    },
}

impl ExecutionError {
    /// Output captured before the failure (empty for spawn failures).
    pub fn into_output(self) -> ScriptOutput {
        match self {
            Self::Spawn(_) => ScriptOutput::default(),
            Self::Timeout { output, .. }
            | Self::OutputOverflow { output, .. }
            | Self::Io { output, .. } => output,
        }
    }
}

/// Trait implemented by script runtime executors.
///
/// Implementations spawn the script at `script_path` and return its output.
/// A non-zero exit is reported through [`ScriptOutput::exit_code`], not as
/// an error.
pub trait ScriptExecutor: Send + Sync {
    /// Execute the script at `script_path` with the given `input`.
    fn execute(
        &self,
        script_path: &Path,
        input: ScriptInput,
    ) -> impl std::future::Future<Output = Result<ScriptOutput, ExecutionError>> + Send;

    /// The command line [`execute`](Self::execute) would run, for dry runs.
    fn describe(&self, script_path: &Path) -> String;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
