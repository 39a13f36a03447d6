use std::path::Path;

use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, UtcOffset};

use crate::discard::discard_model::DiscardMap;
use crate::error::ReportError;
use crate::input::script::DISCARD_GLOBAL;

// ============================================================================
// Discard snapshot export. Always the whole map, never a diff
// ============================================================================

/// Render the complete discard-status script.
///
/// ```text
/// // Discard status - saved 2026-02-10T15:08:31.001Z
/// // Replace the existing discard_status.js file with this one to persist your changes
/// window.DISCARD_STATUS = { ... };
/// ```
pub fn export_snapshot(map: &DiscardMap, saved_at: OffsetDateTime) -> Result<String, ReportError> {
    let json = serde_json::to_string_pretty(map).map_err(|source| ReportError::JsonParse {
        context: "serializing discard snapshot".to_string(),
        source,
    })?;

    let stamp = header_timestamp(saved_at);

    Ok(format!(
        "// Discard status - saved {}\n\
         // Replace the existing discard_status.js file with this one to persist your changes\n\
         window.{} = {};\n",
        stamp, DISCARD_GLOBAL, json
    ))
}

/// UTC timestamp with exactly three fractional digits,
/// e.g. `2026-02-10T15:08:31.001Z`.
fn header_timestamp(saved_at: OffsetDateTime) -> String {
    let utc = saved_at.to_offset(UtcOffset::UTC);
    time::format_description::parse(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z",
    )
    .ok()
    .and_then(|format| utc.format(&format).ok())
    .or_else(|| utc.format(&Rfc3339).ok())
    .unwrap_or_else(|| utc.unix_timestamp().to_string())
}

/// Replace `path` with `contents` in one step.
///
/// The text goes to a sibling temp file first and is then renamed over the
/// target, so readers never observe a half-written snapshot.
pub fn write_snapshot(path: &Path, contents: &str) -> Result<(), ReportError> {
    let io_error = |source: std::io::Error| ReportError::Io {
        path: path.display().to_string(),
        source,
    };

    let mut tmp_name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "discard_status.js".into());
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    std::fs::write(&tmp_path, contents).map_err(io_error)?;
    std::fs::rename(&tmp_path, path).map_err(io_error)
}
