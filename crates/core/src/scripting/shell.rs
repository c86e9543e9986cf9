//! Shell script executor.
//!
//! Spawns the interpreter (`bash` by default) with the script path as its
//! only argument. The path is never spliced into a command string.

use std::path::Path;

use super::executor::{ExecutionError, ScriptExecutor, ScriptInput, ScriptOutput};
use super::subprocess;

/// Default interpreter for registered scripts.
pub const DEFAULT_INTERPRETER: &str = "bash";

/// Executor for shell scripts.
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    interpreter: String,
}

impl ShellExecutor {
    pub fn new(interpreter: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
        }
    }

    pub fn interpreter(&self) -> &str {
        &self.interpreter
    }
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_INTERPRETER)
    }
}

impl ScriptExecutor for ShellExecutor {
    async fn execute(
        &self,
        script_path: &Path,
        input: ScriptInput,
    ) -> Result<ScriptOutput, ExecutionError> {
        let mut cmd = tokio::process::Command::new(&self.interpreter);
        cmd.arg(script_path);
        subprocess::run_command(&mut cmd, input).await
    }

    fn describe(&self, script_path: &Path) -> String {
        format!("{} {}", self.interpreter, script_path.display())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
