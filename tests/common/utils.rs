#![allow(dead_code)]

use std::path::PathBuf;

use qa_report::discard::discard_model::{DiscardEntry, DiscardMap, DiscardStatus};
use qa_report::discard::loader::load_discards;
use qa_report::manifest::loader::load_manifest;
use qa_report::manifest::manifest_model::{Extension, Feature, Manifest, Scenario, ScenarioStatus};
use qa_report::store::record_store::RecordStore;

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn fixture_manifest() -> Manifest {
    load_manifest(fixture("manifest.js").to_str().unwrap()).expect("fixture manifest loads")
}

pub fn fixture_discards() -> DiscardMap {
    load_discards(fixture("discard_status.js").to_str().unwrap()).expect("fixture discards load")
}

pub fn fixture_store() -> RecordStore {
    RecordStore::new(fixture_manifest(), fixture_discards())
}

pub fn pass(name: &str) -> Scenario {
    Scenario::new(name, ScenarioStatus::Pass)
}

pub fn fail(name: &str) -> Scenario {
    Scenario::new(name, ScenarioStatus::Fail)
}

pub fn feature(name: &str, scenarios: Vec<Scenario>) -> Feature {
    Feature {
        name: name.to_string(),
        json_file: format!("{}_test_result.json", name),
        scenarios,
        ..Feature::default()
    }
}

pub fn manifest_of(extensions: Vec<(&str, Vec<Feature>)>) -> Manifest {
    Manifest {
        output_folder: "repos".to_string(),
        extensions: extensions
            .into_iter()
            .map(|(name, features)| Extension {
                name: name.to_string(),
                folder: format!("{}_result", name),
                features,
                ..Extension::default()
            })
            .collect(),
        ..Manifest::default()
    }
}

pub fn discard(ext: &str, feature: &str, scenario: Option<&str>) -> DiscardEntry {
    DiscardEntry {
        status: DiscardStatus::Discarded,
        ext_name: ext.to_string(),
        feature_name: feature.to_string(),
        scenario_name: scenario.map(str::to_string),
        timestamp: 1_767_954_951_457,
    }
}
