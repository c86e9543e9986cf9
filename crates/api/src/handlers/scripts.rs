//! Admin handlers for listing and executing maintenance scripts.

use std::path::PathBuf;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use gxq_core::error::CoreError;
use gxq_core::scripting::catalog::ScriptListing;
use gxq_core::scripting::registry::ScriptDescriptor;
use gxq_core::scripting::runner::{ExecutionReport, RunOutcome};
use gxq_core::types::to_iso_millis;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::response::SuccessResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for the execute endpoint.
///
/// `script_id` is kept as raw JSON so a missing value and a value of the
/// wrong type can be told apart.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteScriptRequest {
    #[serde(default)]
    pub script_id: Option<Value>,
    #[serde(default)]
    pub dry_run: Option<bool>,
}

impl ExecuteScriptRequest {
    /// The identifier as a non-empty string.
    ///
    /// Absent, `null`, `false` and `""` count as missing; any other
    /// non-string value is malformed.
    /// Parse a raw request body.
    ///
    /// Only a JSON object is a request; any other JSON value (array, string,
    /// number) carries no `scriptId` and counts as missing input. A `dryRun`
    /// that is present but not a boolean is rejected.
    pub fn from_body(body: &[u8]) -> AppResult<Self> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {e}")))?;
        if !value.is_object() {
            return Err(CoreError::InvalidInput.into());
        }
        serde_json::from_value(value)
            .map_err(|e| AppError::BadRequest(format!("Invalid request body: {e}")))
    }

    pub fn script_id(&self) -> Result<&str, CoreError> {
        match &self.script_id {
            None | Some(Value::Null) | Some(Value::Bool(false)) => Err(CoreError::InvalidInput),
            Some(Value::String(s)) if s.is_empty() => Err(CoreError::InvalidInput),
            Some(Value::String(s)) => Ok(s),
            Some(_) => Err(CoreError::InvalidFormat),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListScriptsBody {
    pub scripts: Vec<ScriptListing>,
    pub timestamp: String,
}

/// Descriptor echoed back with run results.
#[derive(Debug, Serialize)]
pub struct ScriptSummary {
    #[serde(flatten)]
    pub descriptor: &'static ScriptDescriptor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DryRunBody {
    pub message: String,
    pub script: ScriptSummary,
    pub would_execute: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionBody {
    pub stdout: String,
    pub stderr: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    pub execution_time: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct ExecutedBody {
    pub script: ScriptSummary,
    pub execution: ExecutionBody,
}

/// 500 body for a script that was started (or attempted) and failed.
#[derive(Debug, Serialize)]
pub struct ExecutionFailedResponse {
    success: bool,
    pub script: ScriptSummary,
    pub error: String,
    pub execution: ExecutionBody,
}

impl ExecutionBody {
    fn from_report(report: &ExecutionReport) -> Self {
        Self {
            stdout: report.stdout.clone(),
            stderr: report.stderr.clone(),
            // Only failures report the exit code.
            exit_code: if report.succeeded() {
                None
            } else {
                report.exit_code
            },
            execution_time: report.execution_time(),
            timestamp: to_iso_millis(&report.finished_at),
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /admin/scripts
///
/// List every registered script with its on-disk status.
pub async fn list_scripts(
    State(state): State<AppState>,
) -> AppResult<Json<SuccessResponse<ListScriptsBody>>> {
    let scripts = state
        .gateway
        .list()
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to list scripts: {e}")))?;

    Ok(Json(SuccessResponse::new(ListScriptsBody {
        scripts,
        timestamp: to_iso_millis(&chrono::Utc::now()),
    })))
}

/// POST /admin/scripts
///
/// Validate, resolve and either dry-run or execute a registered script.
/// Blocks until the script finishes, times out, or overflows its output cap.
pub async fn execute_script(State(state): State<AppState>, body: Bytes) -> AppResult<Response> {
    let request = ExecuteScriptRequest::from_body(&body)?;
    let script_id = request.script_id()?;
    let dry_run = request.dry_run.unwrap_or(false);

    let outcome = state.gateway.run(script_id, dry_run).await?;

    let response = match outcome {
        RunOutcome::DryRun(dry) => Json(SuccessResponse::new(DryRunBody {
            message: format!("Dry run for {}", dry.script.descriptor.filename),
            script: ScriptSummary {
                descriptor: dry.script.descriptor,
                path: Some(dry.script.path.clone()),
            },
            would_execute: dry.command,
        }))
        .into_response(),

        RunOutcome::Executed(report) => {
            let script = ScriptSummary {
                descriptor: report.script.descriptor,
                path: None,
            };
            let execution = ExecutionBody::from_report(&report);

            match &report.failure {
                None => Json(SuccessResponse::new(ExecutedBody { script, execution }))
                    .into_response(),
                Some(failure) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ExecutionFailedResponse {
                        success: false,
                        script,
                        error: failure.to_string(),
                        execution,
                    }),
                )
                    .into_response(),
            }
        }
    };

    Ok(response)
}
