use std::fmt;
use std::ops::AddAssign;

use serde::{Serialize, Serializer};

use crate::aggregate::resolve::{
    find_dangling, DanglingRef, DiscardIndex, DiscardScope, EffectiveStatus,
};
use crate::discard::discard_model::DiscardMap;
use crate::error::ReportError;
use crate::key::normalize::{feature_key, normalize_segment, scenario_key};
use crate::manifest::manifest_model::{Manifest, ScenarioStatus};

// ============================================================================
// Counters and pass rate
// ============================================================================

/// Pass / fail / discarded counters for one level of the rollup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub passed: usize,
    pub failed: usize,
    pub discarded: usize,
}

impl Counts {
    pub fn record(&mut self, status: EffectiveStatus) {
        match status {
            EffectiveStatus::Passed => self.passed += 1,
            EffectiveStatus::Failed => self.failed += 1,
            EffectiveStatus::Discarded => self.discarded += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed + self.discarded
    }

    /// `passed / (passed + failed)`; discarded scenarios are not counted.
    pub fn pass_rate(&self) -> PassRate {
        let judged = self.passed + self.failed;
        if judged == 0 {
            PassRate::NotApplicable
        } else {
            PassRate::Ratio(self.passed as f64 / judged as f64)
        }
    }
}

impl AddAssign for Counts {
    fn add_assign(&mut self, other: Self) {
        self.passed += other.passed;
        self.failed += other.failed;
        self.discarded += other.discarded;
    }
}

/// Pass rate, or `N/A` when nothing was judged pass or fail.
///
/// Serializes as a number in `[0, 1]` or the string `"N/A"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PassRate {
    Ratio(f64),
    NotApplicable,
}

impl PassRate {
    pub fn ratio(&self) -> Option<f64> {
        match self {
            PassRate::Ratio(r) => Some(*r),
            PassRate::NotApplicable => None,
        }
    }
}

impl fmt::Display for PassRate {
    /// `"58.3%"`, `"100%"`, or `"N/A"`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassRate::NotApplicable => f.write_str("N/A"),
            PassRate::Ratio(r) => {
                let pct = (r * 1000.0).round() / 10.0;
                if pct.fract() == 0.0 {
                    write!(f, "{:.0}%", pct)
                } else {
                    write!(f, "{:.1}%", pct)
                }
            }
        }
    }
}

impl Serialize for PassRate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PassRate::Ratio(r) => serializer.serialize_f64(*r),
            PassRate::NotApplicable => serializer.serialize_str("N/A"),
        }
    }
}

// ============================================================================
// Rollup report
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioOutcome {
    pub name: String,
    pub key: String,
    pub stored: ScenarioStatus,
    pub effective: EffectiveStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub discarded_by: Option<DiscardScope>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub decided_at: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRollup {
    pub name: String,
    pub key: String,

    #[serde(flatten)]
    pub counts: Counts,

    pub pass_rate: PassRate,
    pub scenarios: Vec<ScenarioOutcome>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtensionRollup {
    pub name: String,
    pub key: String,

    #[serde(flatten)]
    pub counts: Counts,

    pub pass_rate: PassRate,
    pub features: Vec<FeatureRollup>,
}

impl ExtensionRollup {
    pub fn feature(&self, name: &str) -> Option<&FeatureRollup> {
        self.features
            .iter()
            .find(|f| f.name == name)
            .or_else(|| {
                let key = feature_key(&self.name, name);
                self.features.iter().find(|f| f.key == key)
            })
    }
}

/// Discard-aware rollup of the whole manifest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollupReport {
    pub extensions: Vec<ExtensionRollup>,

    #[serde(flatten)]
    pub totals: Counts,

    pub pass_rate: PassRate,

    /// Discard entries that matched nothing
    pub dangling: Vec<DanglingRef>,
}

impl RollupReport {
    pub fn extension(&self, name: &str) -> Option<&ExtensionRollup> {
        self.extensions
            .iter()
            .find(|e| e.name == name)
            .or_else(|| self.extensions.iter().find(|e| e.key == normalize_segment(name)))
    }

    pub fn feature(&self, ext: &str, feature: &str) -> Option<&FeatureRollup> {
        self.extension(ext)?.feature(feature)
    }

    /// Canonical JSON form; identical inputs give identical bytes.
    pub fn to_canonical_json(&self) -> Result<String, ReportError> {
        serde_json::to_string(self).map_err(|source| ReportError::JsonParse {
            context: "serializing rollup".to_string(),
            source,
        })
    }

    /// SHA-1 hex digest of the canonical JSON.
    pub fn fingerprint(&self) -> Result<String, ReportError> {
        use sha1::{Digest, Sha1};

        let mut hasher = Sha1::new();
        hasher.update(self.to_canonical_json()?.as_bytes());
        Ok(format!("{:x}", hasher.finalize()))
    }
}

/// Roll scenario statuses up to features, extensions and the whole manifest.
///
/// Stored summaries in the manifest are ignored; every count comes from
/// the scenarios themselves. Order follows the manifest.
pub fn compute_rollup(manifest: &Manifest, discards: &DiscardMap) -> RollupReport {
    let index = DiscardIndex::build(discards);
    let mut totals = Counts::default();
    let mut extensions = Vec::with_capacity(manifest.extensions.len());

    for ext in &manifest.extensions {
        let mut ext_counts = Counts::default();
        let mut features = Vec::with_capacity(ext.features.len());

        for feature in &ext.features {
            let mut counts = Counts::default();
            let mut scenarios = Vec::with_capacity(feature.scenarios.len());

            for scenario in &feature.scenarios {
                let resolution =
                    index.resolve(&ext.name, &feature.name, &scenario.name, scenario.status);
                counts.record(resolution.status);
                scenarios.push(ScenarioOutcome {
                    name: scenario.name.clone(),
                    key: scenario_key(&ext.name, &feature.name, Some(&scenario.name)),
                    stored: scenario.status,
                    effective: resolution.status,
                    discarded_by: resolution.discarded_by,
                    decided_at: resolution.decided_at,
                });
            }

            ext_counts += counts;
            features.push(FeatureRollup {
                name: feature.name.clone(),
                key: feature_key(&ext.name, &feature.name),
                counts,
                pass_rate: counts.pass_rate(),
                scenarios,
            });
        }

        totals += ext_counts;
        extensions.push(ExtensionRollup {
            name: ext.name.clone(),
            key: normalize_segment(&ext.name),
            counts: ext_counts,
            pass_rate: ext_counts.pass_rate(),
            features,
        });
    }

    RollupReport {
        extensions,
        totals,
        pass_rate: totals.pass_rate(),
        dangling: find_dangling(manifest, discards),
    }
}
