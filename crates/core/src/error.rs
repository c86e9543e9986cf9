use std::path::PathBuf;

/// Failures detected before a script is ever spawned.
///
/// Every variant is raised during validation or resolution, so a request that
/// produces one of these has had no side effects.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// No identifier was supplied (absent, `null`, empty or `false`).
    #[error("Script ID is required")]
    InvalidInput,

    /// The identifier is not a string or fails the allow-list.
    #[error("Invalid scriptId format")]
    InvalidFormat,

    /// The identifier is valid but not in the registry.
    #[error("Script not found: {0}")]
    ScriptNotFound(String),

    /// The identifier is registered but nothing usable exists on disk.
    #[error("Script file not found: {}", .0.display())]
    ScriptFileMissing(PathBuf),

    /// The canonical script path does not sit directly in the scripts directory.
    #[error("Resolved script path is outside of scripts directory")]
    PathEscape,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Client-visible classification of a [`CoreError`].
///
/// Registry misses and file misses collapse into [`ErrorKind::NotFound`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    InvalidFormat,
    NotFound,
    PathEscape,
    InternalFault,
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput => ErrorKind::InvalidInput,
            Self::InvalidFormat => ErrorKind::InvalidFormat,
            Self::ScriptNotFound(_) | Self::ScriptFileMissing(_) => ErrorKind::NotFound,
            Self::PathEscape => ErrorKind::PathEscape,
            Self::Internal(_) => ErrorKind::InternalFault,
        }
    }
}
