use std::collections::HashSet;

use serde::Serialize;

use crate::aggregate::resolve::{DanglingRef, DiscardScope, EffectiveStatus};
use crate::aggregate::rollup::{compute_rollup, Counts, PassRate, ScenarioOutcome};
use crate::discard::discard_model::DiscardMap;
use crate::error::ReportError;
use crate::manifest::manifest_model::{Feature, Manifest, ScenarioStatus, Step};

// ============================================================================
// Report view model: rollup joined with screenshots, observations and steps
// ============================================================================

/// Presentation-ready report. Consumed by the console, HTML and JUnit
/// renderers and serialized as-is for JSON output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportView {
    /// Results folder the manifest was generated from
    pub output_folder: String,

    pub extensions: Vec<ExtensionView>,

    #[serde(flatten)]
    pub totals: Counts,

    pub total: usize,
    pub pass_rate: PassRate,

    pub dangling: Vec<DanglingRef>,

    /// Digest of the underlying rollup
    pub fingerprint: String,
}

impl ReportView {
    pub fn all_passed(&self) -> bool {
        self.totals.failed == 0
    }

    pub fn feature_count(&self) -> usize {
        self.extensions.iter().map(|e| e.features.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtensionView {
    pub name: String,
    pub key: String,
    pub folder: String,

    #[serde(flatten)]
    pub counts: Counts,

    pub total: usize,
    pub pass_rate: PassRate,
    pub features: Vec<FeatureView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureView {
    pub name: String,
    pub key: String,
    pub json_file: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,

    #[serde(flatten)]
    pub counts: Counts,

    pub total: usize,
    pub pass_rate: PassRate,

    /// Screenshot filenames, duplicates removed, first-seen order
    pub screenshots: Vec<String>,

    pub observations: Vec<String>,
    pub scenarios: Vec<ScenarioView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioView {
    pub name: String,
    pub key: String,
    pub stored: ScenarioStatus,
    pub effective: EffectiveStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub discarded_by: Option<DiscardScope>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub decided_at: Option<u64>,

    pub issues: Vec<String>,
    pub steps: Vec<Step>,
}

/// Build the report view. Pure: no I/O, same inputs give the same view.
pub fn build_view(manifest: &Manifest, discards: &DiscardMap) -> Result<ReportView, ReportError> {
    let rollup = compute_rollup(manifest, discards);
    let fingerprint = rollup.fingerprint()?;

    let extensions = manifest
        .extensions
        .iter()
        .zip(rollup.extensions)
        .map(|(ext, ext_rollup)| ExtensionView {
            name: ext_rollup.name,
            key: ext_rollup.key,
            folder: ext.folder.clone(),
            counts: ext_rollup.counts,
            total: ext_rollup.counts.total(),
            pass_rate: ext_rollup.pass_rate,
            features: ext
                .features
                .iter()
                .zip(ext_rollup.features)
                .map(|(feature, feature_rollup)| FeatureView {
                    name: feature_rollup.name,
                    key: feature_rollup.key,
                    json_file: feature.json_file.clone(),
                    description: feature.description().map(str::to_string),
                    priority: feature
                        .metadata
                        .as_ref()
                        .and_then(|m| m.feature_priority.clone()),
                    counts: feature_rollup.counts,
                    total: feature_rollup.counts.total(),
                    pass_rate: feature_rollup.pass_rate,
                    screenshots: dedup_screenshots(&feature.screenshots),
                    observations: feature_observations(feature),
                    scenarios: scenario_views(feature, feature_rollup.scenarios),
                })
                .collect(),
        })
        .collect();

    Ok(ReportView {
        output_folder: manifest.output_folder.clone(),
        extensions,
        totals: rollup.totals,
        total: rollup.totals.total(),
        pass_rate: rollup.pass_rate,
        dangling: rollup.dangling,
        fingerprint,
    })
}

/// Drop repeated filenames, keeping the first occurrence of each.
pub fn dedup_screenshots(screenshots: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    screenshots
        .iter()
        .filter(|s| seen.insert(s.as_str()))
        .cloned()
        .collect()
}

/// Observations from the manifest entry, or from `full_data` when the
/// top-level list is empty.
fn feature_observations(feature: &Feature) -> Vec<String> {
    if !feature.observations.is_empty() {
        return feature.observations.clone();
    }
    feature
        .full_data
        .as_ref()
        .map(|d| d.observations.clone())
        .unwrap_or_default()
}

fn scenario_views(feature: &Feature, outcomes: Vec<ScenarioOutcome>) -> Vec<ScenarioView> {
    feature
        .scenarios
        .iter()
        .zip(outcomes)
        .map(|(scenario, outcome)| ScenarioView {
            name: outcome.name,
            key: outcome.key,
            stored: outcome.stored,
            effective: outcome.effective,
            discarded_by: outcome.discarded_by,
            decided_at: outcome.decided_at,
            issues: scenario.issues.clone(),
            steps: feature.steps(&scenario.name).to_vec(),
        })
        .collect()
}
