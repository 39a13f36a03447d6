// ============================================================================
// Scenario / feature key normalization
// ============================================================================

/// Separator between key segments.
pub const KEY_SEPARATOR: &str = "::";

/// Normalize one key segment.
///
/// Every maximal run of characters outside `[A-Za-z0-9]` collapses to a
/// single `_`, and leading/trailing `_` are trimmed. The result is stable
/// under re-normalization:
///
/// ```text
/// "Add already excluded directory (duplicate error)"
///     -> "Add_already_excluded_directory_duplicate_error"
/// ```
pub fn normalize_segment(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_run = false;

    for c in raw.chars() {
        if c.is_ascii_alphanumeric() {
            if in_run && !out.is_empty() {
                out.push('_');
            }
            out.push(c);
            in_run = false;
        } else {
            in_run = true;
        }
    }

    out
}

/// Key for a scenario, or for a whole feature when `scenario` is `None`.
pub fn scenario_key(ext: &str, feature: &str, scenario: Option<&str>) -> String {
    let mut key = feature_key(ext, feature);
    if let Some(name) = scenario {
        key.push_str(KEY_SEPARATOR);
        key.push_str(&normalize_segment(name));
    }
    key
}

/// Key for a feature: `Ext::Feature`.
pub fn feature_key(ext: &str, feature: &str) -> String {
    format!(
        "{}{}{}",
        normalize_segment(ext),
        KEY_SEPARATOR,
        normalize_segment(feature)
    )
}

/// Split a key back into its segments, normalizing each one.
///
/// Returns `None` unless the key has exactly two or three segments.
pub fn parse_key(key: &str) -> Option<(String, String, Option<String>)> {
    let parts: Vec<&str> = key.split(KEY_SEPARATOR).collect();
    match parts.as_slice() {
        [ext, feature] => Some((normalize_segment(ext), normalize_segment(feature), None)),
        [ext, feature, scenario] => Some((
            normalize_segment(ext),
            normalize_segment(feature),
            Some(normalize_segment(scenario)),
        )),
        _ => None,
    }
}

/// Two names refer to the same logical entity when their segments match.
pub fn same_name(a: &str, b: &str) -> bool {
    a == b || normalize_segment(a) == normalize_segment(b)
}
