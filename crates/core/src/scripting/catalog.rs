//! Catalog listing: registry entries annotated with what is on disk.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::CoreError;
use crate::types::Timestamp;

use super::registry::{self, ScriptDescriptor};
use super::resolve::absolute_dir;

/// One registry entry plus its filesystem probe.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptListing {
    #[serde(flatten)]
    pub descriptor: &'static ScriptDescriptor,
    pub exists: bool,
    #[serde(serialize_with = "serialize_optional_iso")]
    pub last_modified: Option<Timestamp>,
    pub path: PathBuf,
}

fn serialize_optional_iso<S: serde::Serializer>(
    ts: &Option<Timestamp>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match ts {
        Some(ts) => serializer.serialize_some(&crate::types::to_iso_millis(ts)),
        None => serializer.serialize_none(),
    }
}

/// List every registered script against `scripts_dir`, in registry order.
///
/// A failed probe only degrades its own entry. The call fails only if the
/// directory itself cannot be turned into an absolute path.
pub async fn list_scripts(scripts_dir: &Path) -> Result<Vec<ScriptListing>, CoreError> {
    let dir = absolute_dir(scripts_dir).await.map_err(|e| {
        CoreError::Internal(format!(
            "Cannot resolve scripts directory {}: {e}",
            scripts_dir.display()
        ))
    })?;

    let mut listings = Vec::new();
    for descriptor in registry::all() {
        let path = dir.join(descriptor.filename);
        let (exists, last_modified) = probe(&path).await;
        listings.push(ScriptListing {
            descriptor,
            exists,
            last_modified,
            path,
        });
    }
    Ok(listings)
}

async fn probe(path: &Path) -> (bool, Option<Timestamp>) {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => {
            let modified = meta.modified().ok().map(Timestamp::from);
            (true, modified)
        }
        Ok(_) => (false, None),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Script probe failed");
            (false, None)
        }
    }
}
