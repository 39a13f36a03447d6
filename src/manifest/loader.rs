use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::ReportError;
use crate::input::fetch::read_source;
use crate::input::script::{script_payload, MANIFEST_GLOBAL};
use crate::manifest::manifest_model::{
    Extension, ExtensionTotals, Feature, Manifest, ManifestStats,
};

// ============================================================================
// Manifest loading
// ============================================================================

#[derive(Deserialize)]
struct RawManifest {
    #[serde(rename = "outputFolder", default)]
    output_folder: String,

    #[serde(default)]
    results: Map<String, Value>,

    #[serde(default)]
    stats: ManifestStats,
}

#[derive(Deserialize)]
struct RawExtension {
    #[serde(default)]
    folder: String,

    #[serde(default)]
    features: Map<String, Value>,

    #[serde(flatten)]
    totals: ExtensionTotals,
}

/// Load a manifest from a local file or an `http(s)://` URL.
pub fn load_manifest(location: &str) -> Result<Manifest, ReportError> {
    let text = read_source(location)?;
    parse_manifest(&text)
}

/// Parse manifest text (bare JSON or a `window.MANIFEST_DATA = ...;` script).
///
/// Extension and feature order follows the document. Each feature is
/// decoded on its own so an error names the feature it came from.
pub fn parse_manifest(text: &str) -> Result<Manifest, ReportError> {
    let payload = script_payload(text, MANIFEST_GLOBAL)?;
    let raw: RawManifest = serde_json::from_str(payload).map_err(|source| ReportError::JsonParse {
        context: "manifest".to_string(),
        source,
    })?;

    let mut extensions = Vec::with_capacity(raw.results.len());
    for (ext_name, ext_value) in raw.results {
        extensions.push(build_extension(ext_name, ext_value)?);
    }

    Ok(Manifest {
        output_folder: raw.output_folder,
        extensions,
        stats: raw.stats,
    })
}

fn build_extension(name: String, value: Value) -> Result<Extension, ReportError> {
    let raw: RawExtension =
        serde_json::from_value(value).map_err(|source| ReportError::JsonParse {
            context: format!("extension '{}'", name),
            source,
        })?;

    let mut features = Vec::with_capacity(raw.features.len());
    for (feature_name, feature_value) in raw.features {
        let mut feature: Feature =
            serde_json::from_value(feature_value).map_err(|source| ReportError::JsonParse {
                context: format!("feature '{}' of extension '{}'", feature_name, name),
                source,
            })?;
        feature.name = feature_name;
        features.push(feature);
    }

    Ok(Extension {
        name,
        folder: raw.folder,
        features,
        totals: raw.totals,
    })
}
