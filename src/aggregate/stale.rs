use serde::Serialize;

use crate::key::normalize::{feature_key, normalize_segment};
use crate::manifest::manifest_model::{Manifest, ScenarioStatus};

/// A stored count that disagrees with the count recomputed from scenarios.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaleSummary {
    /// Feature key, extension key, or `*` for the global stats block
    pub scope: String,
    pub field: &'static str,
    pub stored: u64,
    pub recomputed: u64,
}

/// Compare the generator's stored summaries with the scenarios they describe.
///
/// Discards are not applied here: stored summaries never account for them.
/// Counts absent from the manifest are not checked.
pub fn find_stale_summaries(manifest: &Manifest) -> Vec<StaleSummary> {
    let mut stale = Vec::new();
    let (mut all_features, mut all_scenarios, mut all_passed, mut all_failed) = (0, 0, 0, 0);

    for ext in &manifest.extensions {
        let (mut ext_passed, mut ext_failed) = (0u64, 0u64);

        for feature in &ext.features {
            let passed = count(feature.scenarios.iter().map(|s| s.status), ScenarioStatus::Pass);
            let failed = feature.scenarios.len() as u64 - passed;
            ext_passed += passed;
            ext_failed += failed;

            if let Some(summary) = &feature.summary {
                let scope = feature_key(&ext.name, &feature.name);
                let total = feature.scenarios.len() as u64;
                check(&mut stale, &scope, "total_scenarios", Some(summary.total_scenarios), total);
                check(&mut stale, &scope, "passed", Some(summary.passed), passed);
                check(&mut stale, &scope, "failed", Some(summary.failed), failed);
            }
        }

        let scope = normalize_segment(&ext.name);
        check(&mut stale, &scope, "total_features", ext.totals.total_features, ext.features.len() as u64);
        check(&mut stale, &scope, "total_passed", ext.totals.total_passed, ext_passed);
        check(&mut stale, &scope, "total_failed", ext.totals.total_failed, ext_failed);

        all_features += ext.features.len() as u64;
        all_scenarios += ext.scenario_count() as u64;
        all_passed += ext_passed;
        all_failed += ext_failed;
    }

    let stats = &manifest.stats;
    check(&mut stale, "*", "extensions", stats.extensions, manifest.extensions.len() as u64);
    check(&mut stale, "*", "features", stats.features, all_features);
    check(&mut stale, "*", "scenarios", stats.scenarios, all_scenarios);
    check(&mut stale, "*", "passed", stats.passed, all_passed);
    check(&mut stale, "*", "failed", stats.failed, all_failed);

    stale
}

fn count(statuses: impl Iterator<Item = ScenarioStatus>, wanted: ScenarioStatus) -> u64 {
    statuses.filter(|s| *s == wanted).count() as u64
}

fn check(
    out: &mut Vec<StaleSummary>,
    scope: &str,
    field: &'static str,
    stored: Option<u64>,
    recomputed: u64,
) {
    if let Some(stored) = stored {
        if stored != recomputed {
            out.push(StaleSummary {
                scope: scope.to_string(),
                field,
                stored,
                recomputed,
            });
        }
    }
}
