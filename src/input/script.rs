use crate::error::ReportError;

// ============================================================================
// `window.NAME = {...};` payload extraction
// ============================================================================

/// Global the manifest script assigns to.
pub const MANIFEST_GLOBAL: &str = "MANIFEST_DATA";

/// Global the discard-status script assigns to.
pub const DISCARD_GLOBAL: &str = "DISCARD_STATUS";

/// Extract the JSON payload from a data script.
///
/// Accepts either bare JSON or a script of the form
///
/// ```text
/// // Auto-generated manifest - run update_manifest.py to refresh
/// window.MANIFEST_DATA = { ... };
/// ```
///
/// Lines starting with `//` before the payload are skipped. The trailing
/// `;` is optional.
pub fn script_payload<'a>(text: &'a str, global: &str) -> Result<&'a str, ReportError> {
    let body = skip_line_comments(text);

    if body.starts_with('{') || body.starts_with('[') {
        return Ok(body.trim_end());
    }

    let rhs = find_assignment(body, global).ok_or_else(|| ReportError::MissingAssignment {
        global: global.to_string(),
    })?;

    let rhs = rhs.trim();
    Ok(rhs.strip_suffix(';').unwrap_or(rhs).trim_end())
}

fn skip_line_comments(text: &str) -> &str {
    let mut rest = text.trim_start_matches('\u{feff}').trim_start();
    while rest.starts_with("//") {
        rest = match rest.find('\n') {
            Some(idx) => rest[idx + 1..].trim_start(),
            None => "",
        };
    }
    rest
}

/// Locate `<global> =` and return everything after the `=`.
fn find_assignment<'a>(body: &'a str, global: &str) -> Option<&'a str> {
    let mut search_from = 0;
    while let Some(found) = body[search_from..].find(global) {
        let end = search_from + found + global.len();
        let after = body[end..].trim_start();
        if let Some(rhs) = after.strip_prefix('=') {
            if !rhs.starts_with('=') {
                return Some(rhs);
            }
        }
        search_from = end;
    }
    None
}
