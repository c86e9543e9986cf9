//! The script gateway: catalog listing and validated script runs.
//!
//! [`ScriptGateway`] ties the registry, confinement and an executor together.
//! Every validation and resolution failure is returned before the executor
//! is touched.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::CoreError;
use crate::types::Timestamp;

use super::catalog::{self, ScriptListing};
use super::executor::{ExecutionError, ScriptExecutor, ScriptInput, ScriptOutput};
use super::resolve::{resolve_script, ResolvedScript};

/// Characters of stdout kept in an execution report.
pub const STDOUT_TAIL_CHARS: usize = 5000;

/// Characters of stderr kept in an execution report.
pub const STDERR_TAIL_CHARS: usize = 2000;

/// Keep the last `max` characters of `s`.
pub fn tail_chars(s: &str, max: usize) -> &str {
    if max == 0 {
        return "";
    }
    match s.char_indices().rev().nth(max - 1) {
        Some((idx, _)) => &s[idx..],
        None => s,
    }
}

/// Why an executed script is reported as failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecutionFailure {
    #[error("Script exited with code {0}")]
    NonZeroExit(i32),

    #[error("Script was terminated by a signal")]
    Terminated,

    #[error("Script timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    #[error("Script output exceeded {0} bytes")]
    OutputOverflow(usize),

    #[error("Failed to start script: {0}")]
    Spawn(String),

    #[error("I/O error while running script: {0}")]
    Io(String),
}

/// Result of a dry run: nothing was spawned.
#[derive(Debug, Clone)]
pub struct DryRun {
    pub script: ResolvedScript,
    /// Exact command line a real run would execute.
    pub command: String,
}

/// Result of an actual run, successful or not.
#[derive(Debug, Clone)]
pub struct ExecutionReport {
    pub script: ResolvedScript,
    /// Last [`STDOUT_TAIL_CHARS`] characters of stdout.
    pub stdout: String,
    /// Last [`STDERR_TAIL_CHARS`] characters of stderr.
    pub stderr: String,
    pub exit_code: Option<i32>,
    pub elapsed: Duration,
    pub finished_at: Timestamp,
    pub failure: Option<ExecutionFailure>,
}

impl ExecutionReport {
    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }

    /// Elapsed time as shown to callers, e.g. `"1.25s"`.
    pub fn execution_time(&self) -> String {
        format!("{:.2}s", self.elapsed.as_secs_f64())
    }

    fn new(script: ResolvedScript, output: ScriptOutput, failure: Option<ExecutionFailure>) -> Self {
        Self {
            script,
            stdout: tail_chars(&output.stdout, STDOUT_TAIL_CHARS).to_string(),
            stderr: tail_chars(&output.stderr, STDERR_TAIL_CHARS).to_string(),
            exit_code: output.exit_code,
            elapsed: output.elapsed,
            finished_at: chrono::Utc::now(),
            failure,
        }
    }
}

/// What a run request produced.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    DryRun(DryRun),
    Executed(ExecutionReport),
}

/// Lists and runs registered scripts from one scripts directory.
#[derive(Debug, Clone)]
pub struct ScriptGateway<E> {
    scripts_dir: PathBuf,
    executor: E,
    limits: ScriptInput,
}

impl<E: ScriptExecutor> ScriptGateway<E> {
    /// Create a gateway with the default bounds (600 s, 10 MiB).
    pub fn new(scripts_dir: impl Into<PathBuf>, executor: E) -> Self {
        Self {
            scripts_dir: scripts_dir.into(),
            executor,
            limits: ScriptInput::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.limits.timeout = timeout;
        self
    }

    pub fn with_max_output_bytes(mut self, max_output_bytes: usize) -> Self {
        self.limits.max_output_bytes = max_output_bytes;
        self
    }

    pub fn scripts_dir(&self) -> &Path {
        &self.scripts_dir
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// List every registered script with its on-disk status.
    pub async fn list(&self) -> Result<Vec<ScriptListing>, CoreError> {
        catalog::list_scripts(&self.scripts_dir).await
    }

    /// Validate and confine `raw_id` without running anything.
    pub async fn resolve(&self, raw_id: &str) -> Result<ResolvedScript, CoreError> {
        resolve_script(&self.scripts_dir, raw_id).await
    }

    /// Resolve `raw_id`, then either describe or execute it.
    pub async fn run(&self, raw_id: &str, dry_run: bool) -> Result<RunOutcome, CoreError> {
        let script = self.resolve(raw_id).await?;

        if dry_run {
            let command = self.executor.describe(&script.path);
            tracing::info!(script_id = script.descriptor.id, %command, "Dry run");
            return Ok(RunOutcome::DryRun(DryRun { script, command }));
        }

        Ok(RunOutcome::Executed(self.execute(script).await))
    }

    /// Execute an already resolved script.
    pub async fn execute(&self, script: ResolvedScript) -> ExecutionReport {
        let descriptor = script.descriptor;
        tracing::info!(
            script_id = descriptor.id,
            path = %script.path.display(),
            critical = descriptor.critical,
            "Executing script",
        );

        let mut input = self.limits.clone();
        input.env_vars.push(("SCRIPT_ID".to_string(), descriptor.id.to_string()));
        input
            .env_vars
            .push(("SCRIPT_FILENAME".to_string(), descriptor.filename.to_string()));

        let report = match self.executor.execute(&script.path, input).await {
            Ok(output) => {
                let failure = match output.exit_code {
                    Some(0) => None,
                    Some(code) => Some(ExecutionFailure::NonZeroExit(code)),
                    None => Some(ExecutionFailure::Terminated),
                };
                ExecutionReport::new(script, output, failure)
            }
            Err(err) => {
                let failure = match &err {
                    ExecutionError::Spawn(e) => ExecutionFailure::Spawn(e.to_string()),
                    ExecutionError::Timeout { limit, .. } => ExecutionFailure::Timeout(*limit),
                    ExecutionError::OutputOverflow { limit, .. } => {
                        ExecutionFailure::OutputOverflow(*limit)
                    }
                    ExecutionError::Io { source, .. } => ExecutionFailure::Io(source.to_string()),
                };
                ExecutionReport::new(script, err.into_output(), Some(failure))
            }
        };

        let elapsed_ms = report.elapsed.as_millis() as u64;
        match &report.failure {
            None => tracing::info!(script_id = descriptor.id, elapsed_ms, "Script completed"),
            Some(failure) => tracing::warn!(
                script_id = descriptor.id,
                exit_code = ?report.exit_code,
                elapsed_ms,
                error = %failure,
                "Script failed",
            ),
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use assert_matches::assert_matches;

    use super::*;
    use crate::scripting::shell::ShellExecutor;

    /// Shell executor that counts how often it was asked to spawn.
    #[derive(Default)]
    struct CountingExecutor {
        calls: AtomicUsize,
        inner: ShellExecutor,
    }

    impl ScriptExecutor for CountingExecutor {
        async fn execute(
            &self,
            script_path: &Path,
            input: ScriptInput,
        ) -> Result<ScriptOutput, ExecutionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.execute(script_path, input).await
        }

        fn describe(&self, script_path: &Path) -> String {
            self.inner.describe(script_path)
        }
    }

    fn gateway_with(scripts: &[(&str, &str)]) -> (tempfile::TempDir, ScriptGateway<CountingExecutor>) {
        let dir = tempfile::tempdir().expect("create temp dir");
        for (name, body) in scripts {
            std::fs::write(dir.path().join(name), body).expect("write script");
        }
        let gateway = ScriptGateway::new(dir.path(), CountingExecutor::default());
        (dir, gateway)
    }

    fn calls(gateway: &ScriptGateway<CountingExecutor>) -> usize {
        gateway.executor().calls.load(Ordering::SeqCst)
    }

    #[test]
    fn tail_keeps_last_characters() {
        assert_eq!(tail_chars("abcdef", 3), "def");
        assert_eq!(tail_chars("abc", 10), "abc");
        assert_eq!(tail_chars("abc", 0), "");
        assert_eq!(tail_chars("añb€c", 3), "b€c");
    }

    #[tokio::test]
    async fn runs_registered_script() {
        let (_dir, gateway) = gateway_with(&[("health-check.sh", "echo checking\necho OK\n")]);
        let outcome = gateway.run("health-check", false).await.expect("run");
        let report = assert_matches!(outcome, RunOutcome::Executed(r) => r);

        assert!(report.succeeded());
        assert_eq!(report.script.descriptor.id, "health-check");
        assert!(report.stdout.trim_end().ends_with("OK"));
        assert_eq!(report.exit_code, Some(0));
        assert!(report.execution_time().ends_with('s'));
        assert_eq!(calls(&gateway), 1);
    }

    #[tokio::test]
    async fn passes_script_identity_in_environment() {
        let (_dir, gateway) = gateway_with(&[("env-check.sh", "echo \"$SCRIPT_ID $SCRIPT_FILENAME\"\n")]);
        let outcome = gateway.run("env-check.sh", false).await.unwrap();
        let report = assert_matches!(outcome, RunOutcome::Executed(r) => r);
        assert_eq!(report.stdout.trim(), "env-check env-check.sh");
    }

    #[tokio::test]
    async fn dry_run_never_spawns() {
        let (dir, gateway) = gateway_with(&[("master.sh", "exit 1\n")]);
        let outcome = gateway.run("master", true).await.expect("dry run");
        let dry = assert_matches!(outcome, RunOutcome::DryRun(d) => d);

        let expected = dir.path().canonicalize().unwrap().join("master.sh");
        assert_eq!(dry.command, format!("bash {}", expected.display()));
        assert_eq!(calls(&gateway), 0);
    }

    #[tokio::test]
    async fn rejections_never_spawn() {
        let (_dir, gateway) = gateway_with(&[("rogue.sh", "echo no\n")]);

        assert_matches!(gateway.run("", false).await, Err(CoreError::InvalidInput));
        assert_matches!(
            gateway.run("../../etc/passwd", false).await,
            Err(CoreError::InvalidFormat)
        );
        assert_matches!(
            gateway.run("rogue", false).await,
            Err(CoreError::ScriptNotFound(_))
        );
        assert_matches!(
            gateway.run("auto-fix", false).await,
            Err(CoreError::ScriptFileMissing(_))
        );
        assert_eq!(calls(&gateway), 0);
    }

    #[tokio::test]
    async fn non_zero_exit_keeps_output_and_code() {
        let (_dir, gateway) = gateway_with(&[("db-migrate.sh", "echo step1\necho bad >&2\nexit 7\n")]);
        let outcome = gateway.run("db-migrate", false).await.unwrap();
        let report = assert_matches!(outcome, RunOutcome::Executed(r) => r);

        assert!(!report.succeeded());
        assert_eq!(report.failure, Some(ExecutionFailure::NonZeroExit(7)));
        assert_eq!(report.exit_code, Some(7));
        assert_eq!(report.stdout, "step1\n");
        assert_eq!(report.stderr, "bad\n");
    }

    #[tokio::test]
    async fn timeout_is_reported_with_partial_output() {
        let (_dir, gateway) = gateway_with(&[("gxq-selfheal.sh", "echo healing\nsleep 30\n")]);
        let gateway = gateway.with_timeout(Duration::from_millis(300));
        let outcome = gateway.run("gxq-selfheal", false).await.unwrap();
        let report = assert_matches!(outcome, RunOutcome::Executed(r) => r);

        assert_matches!(report.failure, Some(ExecutionFailure::Timeout(_)));
        assert_eq!(report.exit_code, None);
        assert!(report.stdout.contains("healing"));
    }

    #[tokio::test]
    async fn overflow_is_reported() {
        let (_dir, gateway) = gateway_with(&[("auto-fix.sh", "yes overflow | head -c 100000\n")]);
        let gateway = gateway.with_max_output_bytes(1024);
        let outcome = gateway.run("auto-fix", false).await.unwrap();
        let report = assert_matches!(outcome, RunOutcome::Executed(r) => r);

        assert_eq!(report.failure, Some(ExecutionFailure::OutputOverflow(1024)));
        assert!(report.stdout.len() <= 1024);
    }

    #[tokio::test]
    async fn output_is_truncated_to_tails() {
        let script = "for i in $(seq 1 2000); do echo \"line $i\"; done\n\
                      for i in $(seq 1 1000); do echo \"err $i\" >&2; done\n";
        let (_dir, gateway) = gateway_with(&[("env-sync-check.sh", script)]);
        let outcome = gateway.run("env-sync-check", false).await.unwrap();
        let report = assert_matches!(outcome, RunOutcome::Executed(r) => r);

        assert!(report.succeeded());
        assert_eq!(report.stdout.chars().count(), STDOUT_TAIL_CHARS);
        assert_eq!(report.stderr.chars().count(), STDERR_TAIL_CHARS);
        assert!(report.stdout.ends_with("line 2000\n"));
        assert!(report.stderr.ends_with("err 1000\n"));
    }

    #[tokio::test]
    async fn list_delegates_to_catalog() {
        let (_dir, gateway) = gateway_with(&[("deploy-vercel.sh", "true\n")]);
        let listings = gateway.list().await.unwrap();
        let deploy = listings
            .iter()
            .find(|l| l.descriptor.id == "deploy-vercel")
            .unwrap();
        assert!(deploy.exists);
    }
}
