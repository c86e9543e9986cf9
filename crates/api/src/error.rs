use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gxq_core::error::{CoreError, ErrorKind};

use crate::response::FailureResponse;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for validation and resolution failures and adds
/// HTTP-specific variants. Implements [`IntoResponse`] to produce the
/// `{ "success": false, "error": ... }` body callers branch on.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `gxq_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error; the message is returned to the caller as is.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Core(core) => match core.kind() {
                ErrorKind::InvalidInput | ErrorKind::InvalidFormat | ErrorKind::PathEscape => {
                    StatusCode::BAD_REQUEST
                }
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::InternalFault => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Core(CoreError::Internal(msg)) => {
                tracing::error!(error = %msg, "Internal core error");
                "An internal error occurred".to_string()
            }
            AppError::Core(core) => {
                tracing::warn!(error = %core, "Rejected script request");
                core.to_string()
            }
            AppError::BadRequest(msg) => msg.clone(),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                msg.clone()
            }
        };

        (status, axum::Json(FailureResponse::new(message))).into_response()
    }
}
