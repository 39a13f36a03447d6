use serde_json::{Map, Value};

use crate::discard::discard_model::{DiscardEntry, DiscardMap};
use crate::error::ReportError;
use crate::input::fetch::read_optional_source;
use crate::input::script::{script_payload, DISCARD_GLOBAL};

/// Load the discard map from a file or URL. A missing local file is an
/// empty map: nothing has been discarded yet.
pub fn load_discards(location: &str) -> Result<DiscardMap, ReportError> {
    match read_optional_source(location)? {
        Some(text) => parse_discards(&text),
        None => Ok(DiscardMap::new()),
    }
}

/// Parse discard-status text (bare JSON or `window.DISCARD_STATUS = ...;`).
pub fn parse_discards(text: &str) -> Result<DiscardMap, ReportError> {
    let payload = script_payload(text, DISCARD_GLOBAL)?;
    if payload.trim().is_empty() {
        return Ok(DiscardMap::new());
    }

    let raw: Map<String, Value> =
        serde_json::from_str(payload).map_err(|source| ReportError::JsonParse {
            context: "discard status".to_string(),
            source,
        })?;

    let mut map = DiscardMap::new();
    for (key, value) in raw {
        let entry: DiscardEntry =
            serde_json::from_value(value).map_err(|source| ReportError::JsonParse {
                context: format!("discard entry '{}'", key),
                source,
            })?;
        map.insert(key, entry);
    }
    Ok(map)
}
