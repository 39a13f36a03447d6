use crate::discard::discard_model::DiscardMap;
use crate::error::{RecordKind, ReportError};
use crate::key::normalize::{feature_key, scenario_key};
use crate::manifest::manifest_model::{Extension, Feature, Manifest, Scenario, Step};

// ============================================================================
// Record store: immutable snapshot of one report generation's inputs
// ============================================================================

/// Read-only view over a loaded manifest and discard map.
///
/// Both inputs are injected at construction and never change afterwards;
/// independent report generations each hold their own store.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    manifest: Manifest,
    discards: DiscardMap,
}

impl RecordStore {
    pub fn new(manifest: Manifest, discards: DiscardMap) -> Self {
        Self { manifest, discards }
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn discards(&self) -> &DiscardMap {
        &self.discards
    }

    /// Look up an extension by exact name, falling back to its normalized key.
    pub fn get_extension(&self, name: &str) -> Result<&Extension, ReportError> {
        self.manifest
            .extension(name)
            .ok_or_else(|| ReportError::not_found(RecordKind::Extension, name))
    }

    pub fn get_feature(&self, ext: &str, feature: &str) -> Result<&Feature, ReportError> {
        self.get_extension(ext)?
            .feature(feature)
            .ok_or_else(|| ReportError::not_found(RecordKind::Feature, feature_key(ext, feature)))
    }

    pub fn list_scenarios(&self, ext: &str, feature: &str) -> Result<&[Scenario], ReportError> {
        Ok(self.get_feature(ext, feature)?.scenarios.as_slice())
    }

    /// Ordered steps for one scenario.
    pub fn steps(&self, ext: &str, feature: &str, scenario: &str) -> Result<&[Step], ReportError> {
        let found = self.get_feature(ext, feature)?;
        let scenario_name = &found
            .scenario(scenario)
            .ok_or_else(|| {
                ReportError::not_found(
                    RecordKind::Scenario,
                    scenario_key(ext, feature, Some(scenario)),
                )
            })?
            .name;
        Ok(found.steps(scenario_name))
    }
}
