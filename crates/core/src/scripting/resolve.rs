//! Resolution of validated identifiers to confined on-disk paths.
//!
//! Confinement is checked after canonicalization: the canonical script path
//! must have the canonical scripts directory as its exact parent. This holds
//! even for symlinks planted inside the scripts directory.

use std::io;
use std::path::{Path, PathBuf};

use crate::error::CoreError;

use super::identifier::normalize_script_id;
use super::registry::{self, ScriptDescriptor};

/// A registered script whose file was found inside the scripts directory.
#[derive(Debug, Clone)]
pub struct ResolvedScript {
    pub descriptor: &'static ScriptDescriptor,
    /// Canonical absolute path of the script file.
    pub path: PathBuf,
}

/// Make `dir` absolute, canonicalizing it when it exists.
///
/// Used for reporting paths; a missing directory is not an error here.
pub async fn absolute_dir(dir: &Path) -> io::Result<PathBuf> {
    match tokio::fs::canonicalize(dir).await {
        Ok(canonical) => Ok(canonical),
        Err(_) => std::path::absolute(dir),
    }
}

/// Validate `raw_id`, look it up in the registry and confine it to `scripts_dir`.
///
/// Fails before touching the filesystem when the identifier is malformed or
/// unregistered.
pub async fn resolve_script(scripts_dir: &Path, raw_id: &str) -> Result<ResolvedScript, CoreError> {
    let filename = normalize_script_id(raw_id)?;
    let descriptor = registry::by_filename(&filename)
        .ok_or_else(|| CoreError::ScriptNotFound(raw_id.to_string()))?;

    let canonical_dir = match tokio::fs::canonicalize(scripts_dir).await {
        Ok(dir) => dir,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            let dir = std::path::absolute(scripts_dir).unwrap_or_else(|_| scripts_dir.to_path_buf());
            return Err(CoreError::ScriptFileMissing(dir.join(descriptor.filename)));
        }
        Err(e) => {
            return Err(CoreError::Internal(format!(
                "Cannot resolve scripts directory {}: {e}",
                scripts_dir.display()
            )))
        }
    };

    let candidate = canonical_dir.join(descriptor.filename);
    let canonical = match tokio::fs::canonicalize(&candidate).await {
        Ok(path) => path,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(CoreError::ScriptFileMissing(candidate));
        }
        Err(e) => {
            return Err(CoreError::Internal(format!(
                "Cannot resolve {}: {e}",
                candidate.display()
            )))
        }
    };

    if canonical.parent() != Some(canonical_dir.as_path()) {
        tracing::warn!(
            filename = descriptor.filename,
            resolved = %canonical.display(),
            "Script path escapes scripts directory",
        );
        return Err(CoreError::PathEscape);
    }

    let is_file = tokio::fs::metadata(&canonical)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false);
    if !is_file {
        return Err(CoreError::ScriptFileMissing(canonical));
    }

    Ok(ResolvedScript {
        descriptor,
        path: canonical,
    })
}
