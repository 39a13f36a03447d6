use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::discard::discard_model::{DiscardEntry, DiscardMap, DiscardTarget};
use crate::key::normalize::normalize_segment;
use crate::manifest::manifest_model::{Manifest, ScenarioStatus};

// ============================================================================
// Effective status resolution
// ============================================================================

/// Status of a scenario after reviewer decisions are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectiveStatus {
    Passed,
    Failed,
    Discarded,
}

impl From<ScenarioStatus> for EffectiveStatus {
    fn from(status: ScenarioStatus) -> Self {
        match status {
            ScenarioStatus::Pass => EffectiveStatus::Passed,
            ScenarioStatus::Fail => EffectiveStatus::Failed,
        }
    }
}

/// Granularity of the entry that discarded a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscardScope {
    Scenario,
    Feature,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub status: EffectiveStatus,
    pub discarded_by: Option<DiscardScope>,
    /// Timestamp of the deciding discard entry
    pub decided_at: Option<u64>,
}

/// Discard entries indexed by their normalized target.
///
/// When several keys point at the same target, the newest decision wins.
pub struct DiscardIndex<'a> {
    by_target: HashMap<DiscardTarget, &'a DiscardEntry>,
}

impl<'a> DiscardIndex<'a> {
    pub fn build(discards: &'a DiscardMap) -> Self {
        let mut by_target: HashMap<DiscardTarget, &'a DiscardEntry> = HashMap::new();
        for (key, entry) in discards.iter() {
            let Some(target) = DiscardTarget::of(key, entry) else {
                continue;
            };
            match by_target.get(&target) {
                Some(existing) if existing.timestamp > entry.timestamp => {}
                _ => {
                    by_target.insert(target, entry);
                }
            }
        }
        Self { by_target }
    }

    /// Effective status of one scenario.
    ///
    /// A scenario-level `discarded` entry wins, then a feature-level one,
    /// then the stored status. An `active` entry never un-discards a
    /// scenario whose feature is discarded.
    pub fn resolve(
        &self,
        ext: &str,
        feature: &str,
        scenario: &str,
        stored: ScenarioStatus,
    ) -> Resolution {
        let ext = normalize_segment(ext);
        let feature = normalize_segment(feature);

        let scenario_target = DiscardTarget {
            ext: ext.clone(),
            feature: feature.clone(),
            scenario: Some(normalize_segment(scenario)),
        };
        if let Some(entry) = self.discarded(&scenario_target) {
            return Resolution {
                status: EffectiveStatus::Discarded,
                discarded_by: Some(DiscardScope::Scenario),
                decided_at: Some(entry.timestamp),
            };
        }

        let feature_target = DiscardTarget {
            ext,
            feature,
            scenario: None,
        };
        if let Some(entry) = self.discarded(&feature_target) {
            return Resolution {
                status: EffectiveStatus::Discarded,
                discarded_by: Some(DiscardScope::Feature),
                decided_at: Some(entry.timestamp),
            };
        }

        Resolution {
            status: stored.into(),
            discarded_by: None,
            decided_at: None,
        }
    }

    fn discarded(&self, target: &DiscardTarget) -> Option<&'a DiscardEntry> {
        self.by_target
            .get(target)
            .copied()
            .filter(|e| e.is_discarded())
    }
}

// ============================================================================
// Dangling references
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DanglingReason {
    UnparseableKey,
    UnknownExtension,
    UnknownFeature,
    UnknownScenario,
}

/// A discard entry whose target no longer exists in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingRef {
    pub key: String,
    pub reason: DanglingReason,
}

/// Discard entries that match nothing in the manifest, in discard-map order.
pub fn find_dangling(manifest: &Manifest, discards: &DiscardMap) -> Vec<DanglingRef> {
    let mut extensions = HashSet::new();
    let mut features = HashSet::new();
    let mut scenarios = HashSet::new();

    for ext in &manifest.extensions {
        let ext_seg = normalize_segment(&ext.name);
        for feature in &ext.features {
            let feature_seg = normalize_segment(&feature.name);
            for scenario in &feature.scenarios {
                scenarios.insert((
                    ext_seg.clone(),
                    feature_seg.clone(),
                    normalize_segment(&scenario.name),
                ));
            }
            features.insert((ext_seg.clone(), feature_seg));
        }
        extensions.insert(ext_seg);
    }

    discards
        .iter()
        .filter_map(|(key, entry)| {
            let reason = match DiscardTarget::of(key, entry) {
                None => Some(DanglingReason::UnparseableKey),
                Some(t) if !extensions.contains(&t.ext) => Some(DanglingReason::UnknownExtension),
                Some(t) if !features.contains(&(t.ext.clone(), t.feature.clone())) => {
                    Some(DanglingReason::UnknownFeature)
                }
                Some(t)
                    if t.scenario.as_ref().is_some_and(|s| {
                        !scenarios.contains(&(t.ext.clone(), t.feature.clone(), s.clone()))
                    }) =>
                {
                    Some(DanglingReason::UnknownScenario)
                }
                Some(_) => None,
            };
            reason.map(|reason| DanglingRef {
                key: key.to_string(),
                reason,
            })
        })
        .collect()
}
