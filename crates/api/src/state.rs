use std::sync::Arc;
use std::time::Duration;

use gxq_core::scripting::shell::ShellExecutor;
use gxq_core::scripting::ScriptGateway;

use crate::config::ServerConfig;

/// Gateway type used by the HTTP handlers.
pub type Gateway = ScriptGateway<ShellExecutor>;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`). Nothing in here is
/// mutable: concurrent requests share only the configuration and the gateway.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Script catalog and runner.
    pub gateway: Arc<Gateway>,
}

impl AppState {
    /// Build state from configuration.
    pub fn new(config: ServerConfig) -> Self {
        let gateway = ScriptGateway::new(
            config.scripts_dir.clone(),
            ShellExecutor::new(config.script_interpreter.clone()),
        )
        .with_timeout(Duration::from_secs(config.script_timeout_secs))
        .with_max_output_bytes(config.script_max_output_bytes);

        Self {
            config: Arc::new(config),
            gateway: Arc::new(gateway),
        }
    }
}
