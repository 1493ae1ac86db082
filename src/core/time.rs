//! Shared timestamp helpers for stage records.

use chrono::{SecondsFormat, Utc};

/// Returns an RFC 3339 UTC timestamp with second precision
/// (e.g. `2026-01-01T00:00:00Z`), the format stage records carry in
/// `started_at`.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
