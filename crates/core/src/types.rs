/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Render a timestamp the way the admin panel expects it
/// (`2026-01-31T12:00:00.000Z`).
pub fn to_iso_millis(ts: &Timestamp) -> String {
    ts.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
