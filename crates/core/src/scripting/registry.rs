//! The static script registry.
//!
//! This table is the exhaustive allow-list of what remote callers can run:
//! adding or removing an entry here directly changes the attack surface.
//! Files in the scripts directory that are not listed can never be executed.

use std::sync::LazyLock;

use indexmap::IndexMap;
use serde::Serialize;

/// Suffix every registered filename carries.
pub const SCRIPT_SUFFIX: &str = ".sh";

/// Script grouping shown in the admin panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptCategory {
    Deployment,
    Monitoring,
    Configuration,
    Database,
    Maintenance,
}

impl ScriptCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deployment => "deployment",
            Self::Monitoring => "monitoring",
            Self::Configuration => "configuration",
            Self::Database => "database",
            Self::Maintenance => "maintenance",
        }
    }
}

/// Immutable metadata for one registered script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptDescriptor {
    pub id: &'static str,
    pub filename: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: ScriptCategory,
    /// Advisory only.
    pub estimated_time: &'static str,
    /// Surfaced to callers; does not gate execution.
    pub critical: bool,
}

const fn entry(
    id: &'static str,
    filename: &'static str,
    name: &'static str,
    description: &'static str,
    category: ScriptCategory,
    estimated_time: &'static str,
    critical: bool,
) -> ScriptDescriptor {
    ScriptDescriptor {
        id,
        filename,
        name,
        description,
        category,
        estimated_time,
        critical,
    }
}

const ENTRIES: &[ScriptDescriptor] = &[
    entry(
        "master",
        "master.sh",
        "Master Orchestration",
        "Full production readiness validation (11 steps)",
        ScriptCategory::Deployment,
        "5-10 min",
        true,
    ),
    entry(
        "health-check",
        "health-check.sh",
        "Health Check",
        "System health monitoring and diagnostics",
        ScriptCategory::Monitoring,
        "30 sec",
        false,
    ),
    entry(
        "env-check",
        "env-check.sh",
        "Environment Validation",
        "Validate all required environment variables",
        ScriptCategory::Configuration,
        "10 sec",
        true,
    ),
    entry(
        "env-sync-check",
        "env-sync-check.sh",
        "Environment Sync",
        "Check .env template synchronization",
        ScriptCategory::Configuration,
        "10 sec",
        false,
    ),
    entry(
        "db-migrate",
        "db-migrate.sh",
        "Database Migration",
        "Run database schema migrations",
        ScriptCategory::Database,
        "30 sec",
        true,
    ),
    entry(
        "gxq-selfheal",
        "gxq-selfheal.sh",
        "Self-Healing",
        "Automated system recovery and fixes",
        ScriptCategory::Maintenance,
        "1-2 min",
        false,
    ),
    entry(
        "auto-fix",
        "auto-fix.sh",
        "Auto-Fix",
        "Automatic code fixes and linting",
        ScriptCategory::Maintenance,
        "30 sec",
        false,
    ),
    entry(
        "deploy-vercel",
        "deploy-vercel.sh",
        "Vercel Deployment",
        "Deploy webapp to Vercel",
        ScriptCategory::Deployment,
        "2-3 min",
        true,
    ),
];

static REGISTRY: LazyLock<IndexMap<&'static str, &'static ScriptDescriptor>> =
    LazyLock::new(|| ENTRIES.iter().map(|d| (d.filename, d)).collect());

/// Iterate every registered script in registry order.
pub fn all() -> impl Iterator<Item = &'static ScriptDescriptor> {
    REGISTRY.values().copied()
}

/// Look up a script by its on-disk filename (e.g. `health-check.sh`).
pub fn by_filename(filename: &str) -> Option<&'static ScriptDescriptor> {
    REGISTRY.get(filename).copied()
}
