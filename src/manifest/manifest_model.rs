use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::ReportError;
use crate::key::normalize::{same_name, scenario_key};

// ============================================================================
// Manifest: extensions → features → scenarios → steps
// ============================================================================

/// The full nested record of test results.
///
/// Extensions and features keep the order they had in the source document.
/// Serializes back to the `{outputFolder, results, stats}` shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manifest {
    /// Folder the generator scanned for results
    pub output_folder: String,

    /// Extensions in manifest order
    pub extensions: Vec<Extension>,

    /// Global stats as stored by the generator (may be stale)
    pub stats: ManifestStats,
}

impl Manifest {
    pub fn extension(&self, name: &str) -> Option<&Extension> {
        self.extensions
            .iter()
            .find(|e| e.name == name)
            .or_else(|| self.extensions.iter().find(|e| same_name(&e.name, name)))
    }

    pub fn scenario_count(&self) -> usize {
        self.extensions.iter().map(Extension::scenario_count).sum()
    }

    /// Normalized key of every scenario, in manifest order.
    pub fn scenario_keys(&self) -> Vec<String> {
        let mut keys = Vec::with_capacity(self.scenario_count());
        for ext in &self.extensions {
            for feature in &ext.features {
                for scenario in &feature.scenarios {
                    keys.push(scenario_key(&ext.name, &feature.name, Some(&scenario.name)));
                }
            }
        }
        keys
    }
}

impl Serialize for Manifest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut results = Map::new();
        for ext in &self.extensions {
            let value = serde_json::to_value(ext).map_err(serde::ser::Error::custom)?;
            results.insert(ext.name.clone(), value);
        }

        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("outputFolder", &self.output_folder)?;
        map.serialize_entry("results", &results)?;
        map.serialize_entry("stats", &self.stats)?;
        map.end()
    }
}

/// One extension (top-level aggregate) and its features.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extension {
    /// Key under `results`
    pub name: String,

    /// Result folder, e.g. `DNN_HTML_result`
    pub folder: String,

    /// Features in manifest order
    pub features: Vec<Feature>,

    /// Stored per-extension totals (may be stale)
    pub totals: ExtensionTotals,
}

impl Extension {
    pub fn feature(&self, name: &str) -> Option<&Feature> {
        self.features
            .iter()
            .find(|f| f.name == name)
            .or_else(|| self.features.iter().find(|f| same_name(&f.name, name)))
    }

    pub fn scenario_count(&self) -> usize {
        self.features.iter().map(|f| f.scenarios.len()).sum()
    }
}

impl Serialize for Extension {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut features = Map::new();
        for feature in &self.features {
            let value = serde_json::to_value(feature).map_err(serde::ser::Error::custom)?;
            features.insert(feature.name.clone(), value);
        }

        let totals = serde_json::to_value(&self.totals).map_err(serde::ser::Error::custom)?;

        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("folder", &self.folder)?;
        map.serialize_entry("features", &features)?;
        if let Value::Object(fields) = totals {
            for (k, v) in fields {
                map.serialize_entry(&k, &v)?;
            }
        }
        map.end()
    }
}

/// Totals the generator stores next to each extension's features.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtensionTotals {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_screenshots: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_features: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_passed: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_failed: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass_rate: Option<Value>,
}

/// Global stats block stored at the top of the manifest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManifestStats {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenarios: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reports: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshots: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passed: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass_rate: Option<Value>,
}

/// One tested feature of an extension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Key under `features` (filled in by the loader)
    #[serde(skip)]
    pub name: String,

    #[serde(default)]
    pub json_file: String,

    /// Screenshot filenames; may contain duplicates across test runs
    #[serde(default, deserialize_with = "lenient_strings")]
    pub screenshots: Vec<String>,

    #[serde(default)]
    pub scenarios: Vec<Scenario>,

    #[serde(default, deserialize_with = "lenient_strings")]
    pub observations: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<FeatureSummary>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<FeatureMetadata>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_data: Option<FullData>,

    /// Fields this model does not interpret, kept for re-serialization
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Feature {
    pub fn scenario(&self, name: &str) -> Option<&Scenario> {
        self.scenarios
            .iter()
            .find(|s| s.name == name)
            .or_else(|| self.scenarios.iter().find(|s| same_name(&s.name, name)))
    }

    /// Ordered steps recorded for a scenario in `full_data`.
    ///
    /// Empty when the feature carries no detailed data for that scenario.
    pub fn steps(&self, scenario: &str) -> &[Step] {
        let Some(full) = &self.full_data else {
            return &[];
        };
        full.test_scenarios
            .iter()
            .find(|d| d.scenario_name == scenario)
            .or_else(|| {
                full.test_scenarios
                    .iter()
                    .find(|d| same_name(&d.scenario_name, scenario))
            })
            .map(|d| d.steps.as_slice())
            .unwrap_or(&[])
    }

    /// Feature description from the metadata, if any was recorded.
    pub fn description(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.feature_description.as_deref())
    }
}

/// Summary block as written by the generator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureSummary {
    #[serde(default)]
    pub total_scenarios: u64,

    #[serde(default)]
    pub passed: u64,

    #[serde(default)]
    pub failed: u64,

    /// Free-form: "58%", "N/A - Feature not implemented", ...
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass_rate: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_priority: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tester: Option<String>,
}

/// Verbatim content of the feature's `*_test_result.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FullData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<FeatureMetadata>,

    #[serde(default)]
    pub test_scenarios: Vec<ScenarioDetail>,

    #[serde(default, deserialize_with = "lenient_strings")]
    pub observations: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<FeatureSummary>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Per-scenario detail inside `full_data`, carrying the steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioDetail {
    #[serde(default)]
    pub scenario_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default)]
    pub steps: Vec<Step>,

    #[serde(default, deserialize_with = "lenient_strings")]
    pub issues: Vec<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One named test case with its outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,

    pub status: ScenarioStatus,

    #[serde(default, deserialize_with = "lenient_strings")]
    pub issues: Vec<String>,

    #[serde(default)]
    pub step_count: u32,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Scenario {
    pub fn new(name: &str, status: ScenarioStatus) -> Self {
        Self {
            name: name.to_string(),
            status,
            issues: vec![],
            step_count: 0,
            extra: Map::new(),
        }
    }
}

/// One executed step; order within a scenario is execution order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Step {
    #[serde(default)]
    pub step_number: u32,

    #[serde(default)]
    pub action: String,

    #[serde(default)]
    pub expected: String,

    #[serde(default)]
    pub actual: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Stored outcome of a scenario. There is no partial or pending state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ScenarioStatus {
    Pass,
    Fail,
}

impl ScenarioStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioStatus::Pass => "PASS",
            ScenarioStatus::Fail => "FAIL",
        }
    }
}

impl fmt::Display for ScenarioStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for ScenarioStatus {
    type Error = ReportError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "PASS" | "PASSED" => Ok(ScenarioStatus::Pass),
            "FAIL" | "FAILED" => Ok(ScenarioStatus::Fail),
            _ => Err(ReportError::InvalidStatus {
                context: "scenario status".to_string(),
                value,
            }),
        }
    }
}

impl From<ScenarioStatus> for String {
    fn from(status: ScenarioStatus) -> Self {
        status.as_str().to_string()
    }
}

// ============================================================================
// Serde helpers
// ============================================================================

/// Read a list of strings, treating a missing, null or mistyped value as empty.
///
/// Non-string items inside an array are dropped.
fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => vec![],
    })
}
