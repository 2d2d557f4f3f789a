// mcpgate-evidence/src/timestamp.rs
// ============================================================================
// Module: Timestamp
// Description: Produces the RFC3339-with-nanoseconds strings used for
//              `generated_at`, `ts_start`, and `ts_end` fields.
// ============================================================================

use time::OffsetDateTime;
use time::format_description::FormatItem;
use time::macros::format_description;

/// `generated_at`/`ts_start`/`ts_end` all use this shape, matching the
/// lockfile and receipt fixtures' `"...000000000Z"` format.
const TS_FORMAT: &[FormatItem<'_>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:9]Z");

/// Formats the current wall-clock time as `YYYY-MM-DDTHH:MM:SS.NNNNNNNNNZ`.
///
/// Falls back to a fixed epoch string on the (unreachable in practice)
/// formatting error path, rather than panicking inside a logging helper.
#[must_use]
pub fn now() -> String {
    OffsetDateTime::now_utc()
        .format(TS_FORMAT)
        .unwrap_or_else(|_| "1970-01-01T00:00:00.000000000Z".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_nanosecond_precision_utc() {
        let ts = now();
        assert!(ts.ends_with('Z'));
        assert_eq!(ts.len(), "2026-01-01T00:00:00.000000000Z".len());
    }
}
