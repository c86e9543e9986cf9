use std::path::PathBuf;

use gxq_core::scripting::executor::{DEFAULT_MAX_OUTPUT_BYTES, DEFAULT_TIMEOUT};
use gxq_core::scripting::shell::DEFAULT_INTERPRETER;

/// Headroom between the script timeout and the HTTP request timeout, so a
/// timed-out script still gets its structured failure response out.
const REQUEST_TIMEOUT_HEADROOM_SECS: u64 = 60;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: script timeout + 60).
    pub request_timeout_secs: u64,
    /// Directory holding the registered scripts (default: `../scripts`).
    pub scripts_dir: PathBuf,
    /// Interpreter used to run scripts (default: `bash`).
    pub script_interpreter: String,
    /// Wall-clock limit per script run in seconds (default: `600`).
    pub script_timeout_secs: u64,
    /// Combined stdout + stderr cap per script run (default: 10 MiB).
    pub script_max_output_bytes: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                 |
    /// |---------------------------|-------------------------|
    /// | `HOST`                    | `0.0.0.0`               |
    /// | `PORT`                    | `3000`                  |
    /// | `CORS_ORIGINS`            | `http://localhost:3000` |
    /// | `SCRIPTS_DIR`             | `../scripts`            |
    /// | `SCRIPT_INTERPRETER`      | `bash`                  |
    /// | `SCRIPT_TIMEOUT_SECS`     | `600`                   |
    /// | `SCRIPT_MAX_OUTPUT_BYTES` | `10485760`              |
    /// | `REQUEST_TIMEOUT_SECS`    | script timeout + 60     |
    ///
    /// Panics on unparseable numbers; misconfiguration should fail at startup.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".into());

        let port: u16 = var("PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = var("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let scripts_dir = var("SCRIPTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("..").join("scripts"));

        let script_interpreter = var("SCRIPT_INTERPRETER")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_INTERPRETER.into());

        let script_timeout_secs: u64 = var("SCRIPT_TIMEOUT_SECS")
            .map(|s| s.parse().expect("SCRIPT_TIMEOUT_SECS must be a valid u64"))
            .unwrap_or(DEFAULT_TIMEOUT.as_secs());

        let script_max_output_bytes: usize = var("SCRIPT_MAX_OUTPUT_BYTES")
            .map(|s| {
                s.parse()
                    .expect("SCRIPT_MAX_OUTPUT_BYTES must be a valid usize")
            })
            .unwrap_or(DEFAULT_MAX_OUTPUT_BYTES);

        let min_request_timeout = script_timeout_secs + REQUEST_TIMEOUT_HEADROOM_SECS;
        let request_timeout_secs = match var("REQUEST_TIMEOUT_SECS") {
            Some(s) => {
                let secs: u64 = s.parse().expect("REQUEST_TIMEOUT_SECS must be a valid u64");
                if secs <= script_timeout_secs {
                    tracing::warn!(
                        configured = secs,
                        using = min_request_timeout,
                        "REQUEST_TIMEOUT_SECS must exceed SCRIPT_TIMEOUT_SECS, raising it",
                    );
                    min_request_timeout
                } else {
                    secs
                }
            }
            None => min_request_timeout,
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            scripts_dir,
            script_interpreter,
            script_timeout_secs,
            script_max_output_bytes,
        }
    }
}
