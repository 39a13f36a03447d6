use qa_report::aggregate::resolve::find_dangling;
use qa_report::discard::discard_model::{now_millis, DiscardMap, DiscardStatus, DiscardTarget};
use qa_report::discard::loader::{load_discards, parse_discards};
use qa_report::discard::snapshot::{export_snapshot, write_snapshot};
use qa_report::error::ReportError;
use qa_report::trace::logger::TraceLogger;
use qa_report::trace::trace::TraceEvent;
use time::OffsetDateTime;

mod common;
use crate::common::utils::{discard, fixture_discards, fixture_manifest};

fn saved_at() -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(1_770_736_111).unwrap()
}

// ============================================================================
// Parsing
// ============================================================================

#[test]
fn fixture_discards_in_file_order() {
    let map = fixture_discards();
    assert_eq!(map.len(), 7);

    let keys: Vec<&str> = map.iter().map(|(k, _)| k).collect();
    assert_eq!(keys[0], "DNN_HTML::AutoSave_Functionality");
    assert_eq!(keys[5], "DNN_HTML::Content_Preview::Preview_mobile_view");

    let feature_level = map.get("DNN_HTML::AutoSave_Functionality").unwrap();
    assert!(feature_level.is_feature_level());
    assert!(feature_level.is_discarded());
    assert_eq!(feature_level.timestamp, 1_767_954_951_457);

    let active = map.get("DNN_HTML::Content_Preview::Preview_mobile_view").unwrap();
    assert_eq!(active.status, DiscardStatus::Active);
    assert_eq!(active.scenario_name.as_deref(), Some("Preview mobile view"));
}

#[test]
fn empty_and_bare_discard_payloads() {
    assert!(parse_discards("window.DISCARD_STATUS = {};").unwrap().is_empty());
    assert!(parse_discards("// nothing yet\n{}").unwrap().is_empty());

    let map = parse_discards(
        r#"{"A::B": {"status": "discarded", "extName": "A", "featureName": "B"}}"#,
    )
    .unwrap();
    let entry = map.get("A::B").unwrap();
    assert_eq!(entry.timestamp, 0);
    assert!(entry.scenario_name.is_none());
}

#[test]
fn bad_entry_names_its_key() {
    let err = parse_discards(r#"{"A::B::C": {"status": "maybe"}}"#).unwrap_err();
    assert!(matches!(err, ReportError::JsonParse { .. }));
    assert!(err.to_string().contains("A::B::C"), "{}", err);
}

#[test]
fn missing_discard_file_is_empty_map() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("discard_status.js");
    let map = load_discards(path.to_str().unwrap()).unwrap();
    assert!(map.is_empty());
}

// ============================================================================
// Targets and legacy keys
// ============================================================================

#[test]
fn target_prefers_entry_names_over_key() {
    let entry = discard(
        "Evoq.PersonaBar.SiteSettings",
        "Search Crawling",
        Some("Add already excluded directory (duplicate error)"),
    );
    let target = DiscardTarget::of(
        "Evoq_PersonaBar_SiteSettings::Search_Crawling::Add_already_excluded_directory__duplicate_error_",
        &entry,
    )
    .unwrap();

    assert_eq!(target.ext, "Evoq_PersonaBar_SiteSettings");
    assert_eq!(target.feature, "Search_Crawling");
    assert_eq!(
        target.scenario.as_deref(),
        Some("Add_already_excluded_directory_duplicate_error")
    );
}

#[test]
fn fixture_dangling_entry_is_reported_once() {
    let dangling = find_dangling(&fixture_manifest(), &fixture_discards());
    assert_eq!(dangling.len(), 1);
    assert!(dangling[0].key.contains("Add_already_excluded_directory"));
}

// ============================================================================
// Decisions
// ============================================================================

#[test]
fn with_decision_leaves_original_untouched() {
    let original = fixture_discards();
    let next = original.with_decision(
        "DNN_HTML",
        "Content Preview",
        Some("Compare preview with live"),
        DiscardStatus::Discarded,
        1_770_000_000_000,
    );

    assert_eq!(original.len(), 7);
    assert_eq!(next.len(), 8);
    assert!(original
        .get("DNN_HTML::Content_Preview::Compare_preview_with_live")
        .is_none());

    let added = next
        .get("DNN_HTML::Content_Preview::Compare_preview_with_live")
        .unwrap();
    assert_eq!(added.ext_name, "DNN_HTML");
    assert_eq!(added.feature_name, "Content Preview");
    assert_eq!(added.scenario_name.as_deref(), Some("Compare preview with live"));
    assert_eq!(added.timestamp, 1_770_000_000_000);

    let last_key = next.iter().last().map(|(k, _)| k.to_string());
    assert_eq!(
        last_key.as_deref(),
        Some("DNN_HTML::Content_Preview::Compare_preview_with_live")
    );
}

#[test]
fn restoring_replaces_entry_in_place() {
    let original = fixture_discards();
    let next = original.with_decision(
        "DNN_HTML",
        "AutoSave Functionality",
        None,
        DiscardStatus::Active,
        1_770_000_000_000,
    );

    assert_eq!(next.len(), original.len());
    let (first_key, first) = next.iter().next().unwrap();
    assert_eq!(first_key, "DNN_HTML::AutoSave_Functionality");
    assert_eq!(first.status, DiscardStatus::Active);
    assert!(original.get(first_key).unwrap().is_discarded());
}

const LEGACY_KEY: &str =
    "Evoq_PersonaBar_SiteSettings::Search_Crawling::Add_already_excluded_directory__duplicate_error_";

fn legacy_map() -> DiscardMap {
    let mut map = DiscardMap::new();
    map.insert("Ext::F", discard("Ext", "F", None));
    map.insert(
        LEGACY_KEY,
        discard(
            "Evoq.PersonaBar.SiteSettings",
            "Search Crawling",
            Some("Add already excluded directory (duplicate error)"),
        ),
    );
    map
}

#[test]
fn restoring_under_legacy_key_keeps_one_entry() {
    let original = legacy_map();
    let next = original.with_decision(
        "Evoq.PersonaBar.SiteSettings",
        "Search Crawling",
        Some("Add already excluded directory (duplicate error)"),
        DiscardStatus::Active,
        1_770_000_000_000,
    );

    assert_eq!(next.len(), 2);
    let target = DiscardTarget::of(LEGACY_KEY, original.get(LEGACY_KEY).unwrap()).unwrap();
    assert_eq!(next.keys_for(&target), vec![LEGACY_KEY]);

    let restored = next.get(LEGACY_KEY).unwrap();
    assert_eq!(restored.status, DiscardStatus::Active);
    assert_eq!(restored.timestamp, 1_770_000_000_000);
    assert!(original.get(LEGACY_KEY).unwrap().is_discarded());

    // The exported file carries the single, restored decision
    let reloaded = parse_discards(&export_snapshot(&next, saved_at()).unwrap()).unwrap();
    let keys: Vec<&str> = reloaded.keys_for(&target);
    assert_eq!(keys, vec![LEGACY_KEY]);
    assert_eq!(reloaded.get(LEGACY_KEY).unwrap().status, DiscardStatus::Active);
}

#[test]
fn decision_collapses_duplicate_entries_for_one_target() {
    let mut map = legacy_map();
    map.insert(
        "Evoq_PersonaBar_SiteSettings::Search_Crawling::Add_already_excluded_directory_duplicate_error",
        discard(
            "Evoq.PersonaBar.SiteSettings",
            "Search Crawling",
            Some("Add already excluded directory (duplicate error)"),
        ),
    );
    assert_eq!(map.len(), 3);

    let next = map.with_decision(
        "Evoq PersonaBar SiteSettings",
        "Search Crawling",
        Some("Add already excluded directory (duplicate error)"),
        DiscardStatus::Active,
        1_770_000_000_000,
    );

    let keys: Vec<&str> = next.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["Ext::F", LEGACY_KEY]);
    assert_eq!(next.get(LEGACY_KEY).unwrap().status, DiscardStatus::Active);
}

#[test]
fn now_millis_is_epoch_milliseconds() {
    // 2023-11-14 in epoch milliseconds
    assert!(now_millis() > 1_700_000_000_000);
}

// ============================================================================
// Snapshot export
// ============================================================================

#[test]
fn snapshot_header_and_assignment() {
    let mut map = DiscardMap::new();
    map.insert("Ext::F", discard("Ext", "F", None));

    let snapshot = export_snapshot(&map, saved_at()).unwrap();
    let lines: Vec<&str> = snapshot.lines().collect();

    assert_eq!(lines[0], "// Discard status - saved 2026-02-10T15:08:31.000Z");
    assert_eq!(
        lines[1],
        "// Replace the existing discard_status.js file with this one to persist your changes"
    );
    assert_eq!(lines[2], "window.DISCARD_STATUS = {");
    assert!(snapshot.ends_with("};\n"));
    assert!(snapshot.contains("\"extName\": \"Ext\""));
    assert!(!snapshot.contains("scenarioName"));
}

#[test]
fn snapshot_header_truncates_to_milliseconds() {
    let at = OffsetDateTime::from_unix_timestamp_nanos(1_770_736_111_001_999_999).unwrap();
    let snapshot = export_snapshot(&DiscardMap::new(), at).unwrap();
    assert!(snapshot.starts_with("// Discard status - saved 2026-02-10T15:08:31.001Z\n"));
}

#[test]
fn snapshot_of_empty_map() {
    let snapshot = export_snapshot(&DiscardMap::new(), saved_at()).unwrap();
    assert!(snapshot.ends_with("window.DISCARD_STATUS = {};\n"));
    assert!(parse_discards(&snapshot).unwrap().is_empty());
}

#[test]
fn snapshot_reloads_to_same_map() {
    let map = fixture_discards().with_decision(
        "Evoq.PersonaBar.UrlManagement",
        "Custom URL Listing and Sorting",
        Some("Filter by site alias"),
        DiscardStatus::Discarded,
        1_770_000_000_000,
    );

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("discard_status.js");
    write_snapshot(&path, &export_snapshot(&map, saved_at()).unwrap()).unwrap();

    let reloaded = load_discards(path.to_str().unwrap()).unwrap();
    assert_eq!(reloaded, map);
    assert!(!dir.path().join("discard_status.js.tmp").exists());
}

#[test]
fn write_snapshot_replaces_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("discard_status.js");
    std::fs::write(&path, "window.DISCARD_STATUS = {\"old\": 1};").unwrap();

    let snapshot = export_snapshot(&DiscardMap::new(), saved_at()).unwrap();
    write_snapshot(&path, &snapshot).unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), snapshot);
}

#[test]
fn write_snapshot_into_missing_dir_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no-such-dir").join("discard_status.js");
    let err = write_snapshot(&path, "{}").unwrap_err();
    assert!(matches!(err, ReportError::Io { .. }));
}

// ============================================================================
// Trace log
// ============================================================================

#[test]
fn trace_logger_writes_jsonl() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.jsonl");
    let tracer = TraceLogger::open(path.to_str());
    assert!(tracer.is_enabled());

    let dangling = find_dangling(&fixture_manifest(), &fixture_discards());
    tracer.log_all(dangling.iter().map(TraceEvent::dangling));
    tracer.log(&TraceEvent::decision("Ext::F", DiscardStatus::Active));

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<serde_json::Value> = text
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["event"], "dangling_discard");
    assert_eq!(lines[0]["detail"], "UnknownExtension");
    assert_eq!(lines[1]["event"], "discard_decision");
    assert_eq!(lines[1]["key"], "Ext::F");
    assert_eq!(lines[1]["detail"], "active");
}

#[test]
fn disabled_trace_logger_is_a_no_op() {
    let tracer = TraceLogger::open(None);
    assert!(!tracer.is_enabled());
    tracer.log(&TraceEvent::now("ignored"));
}
