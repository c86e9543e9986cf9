//! Script identifier validation.
//!
//! Identifiers come straight from HTTP request bodies. They are checked
//! against a strict allow-list before being used to build any path, so
//! traversal sequences, shell metacharacters and NUL bytes never get further
//! than this module.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

use super::registry::SCRIPT_SUFFIX;

static SCRIPT_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9_\-]+(\.sh)?$").expect("script id pattern is valid")
});

/// Validate a raw identifier and normalize it to a registry filename.
///
/// `health-check` and `health-check.sh` both normalize to `health-check.sh`.
pub fn normalize_script_id(raw: &str) -> Result<String, CoreError> {
    if raw.is_empty() {
        return Err(CoreError::InvalidInput);
    }
    if !SCRIPT_ID_RE.is_match(raw) {
        return Err(CoreError::InvalidFormat);
    }

    if raw.ends_with(SCRIPT_SUFFIX) {
        Ok(raw.to_string())
    } else {
        Ok(format!("{raw}{SCRIPT_SUFFIX}"))
    }
}
