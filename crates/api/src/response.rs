//! Shared response envelope types for API handlers.
//!
//! Every response carries an explicit `success` boolean next to its payload,
//! e.g. `{ "success": true, "scripts": [...] }`. Use these instead of ad-hoc
//! `serde_json::json!` bodies.

use serde::Serialize;

/// `{ "success": true, ...T }` response envelope.
///
/// `T` must serialize as a struct or map; its fields are flattened next to
/// `success`.
///
/// # Example
///
/// ```ignore
/// Ok(Json(SuccessResponse::new(ListScriptsBody { scripts, timestamp })))
/// ```
#[derive(Debug, Serialize)]
pub struct SuccessResponse<T: Serialize> {
    success: bool,
    #[serde(flatten)]
    pub body: T,
}

impl<T: Serialize> SuccessResponse<T> {
    pub fn new(body: T) -> Self {
        Self {
            success: true,
            body,
        }
    }
}

/// `{ "success": false, "error": "..." }` response body.
#[derive(Debug, Serialize)]
pub struct FailureResponse {
    success: bool,
    pub error: String,
}

impl FailureResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}
