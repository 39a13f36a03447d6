use qa_report::aggregate::resolve::{DiscardScope, EffectiveStatus};
use qa_report::cli::commands::render;
use qa_report::discard::discard_model::DiscardMap;
use qa_report::report::console::format_console_report;
use qa_report::report::html::generate_html_report;
use qa_report::report::junit::{escape_xml, generate_junit_xml};
use qa_report::report::view_model::{build_view, dedup_screenshots, ReportView};
use qa_report::report_view;

mod common;
use crate::common::utils::{
    discard, fail, feature, fixture_discards, fixture_manifest, fixture_store, manifest_of, pass,
};

// ============================================================================
// Helper builders
// ============================================================================

fn fixture_view() -> ReportView {
    build_view(&fixture_manifest(), &fixture_discards()).unwrap()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ============================================================================
// View model
// ============================================================================

#[test]
fn dedup_keeps_first_occurrence() {
    let deduped = dedup_screenshots(&strings(&["a.png", "b.png", "a.png", "c.png"]));
    assert_eq!(deduped, strings(&["a.png", "b.png", "c.png"]));
    assert!(dedup_screenshots(&[]).is_empty());
}

#[test]
fn autosave_screenshots_deduplicated_in_first_seen_order() {
    let view = fixture_view();
    let autosave = &view.extensions[0].features[0];
    assert_eq!(autosave.name, "AutoSave Functionality");
    assert_eq!(
        autosave.screenshots,
        strings(&[
            "AutoSave_Functionality_step03_advanced_editor_opened.png",
            "AutoSave_Functionality_step04_content_typed.png",
            "AutoSave_Functionality_step05_before_close.png",
            "AutoSave_Functionality_step06_after_close.png",
            "AutoSave_Functionality_step07_recovery_failed.png",
            "AutoSave_Functionality_step00_login_confirmation.png",
            "AutoSave_Functionality_step01_edit_mode.png",
            "AutoSave_Functionality_step02_inline_editor_opened.png",
        ])
    );
}

#[test]
fn view_totals_match_rollup() {
    let view = fixture_view();
    assert_eq!(view.output_folder, "repos");
    assert_eq!(view.total, 21);
    assert_eq!(view.totals.passed, 12);
    assert_eq!(view.totals.failed, 4);
    assert_eq!(view.totals.discarded, 5);
    assert_eq!(view.feature_count(), 5);
    assert!(!view.all_passed());
    assert_eq!(view.dangling.len(), 1);
    assert_eq!(view.fingerprint.len(), 40);
}

#[test]
fn view_carries_feature_details() {
    let view = fixture_view();
    let autosave = &view.extensions[0].features[0];

    assert_eq!(
        autosave.description.as_deref(),
        Some("Automatically save content drafts while editing to prevent data loss")
    );
    assert_eq!(autosave.priority.as_deref(), Some("Medium"));
    assert_eq!(autosave.observations.len(), 9);

    let recover = autosave
        .scenarios
        .iter()
        .find(|s| s.name == "Recover Autosaved Content")
        .unwrap();
    assert_eq!(recover.effective, EffectiveStatus::Discarded);
    assert_eq!(recover.discarded_by, Some(DiscardScope::Scenario));
    assert_eq!(recover.issues.len(), 3);
    assert_eq!(recover.steps.len(), 5);

    let enable = &autosave.scenarios[0];
    assert_eq!(enable.discarded_by, Some(DiscardScope::Feature));
}

#[test]
fn null_observations_fall_back_to_full_data() {
    let view = fixture_view();
    let url_feature = &view.extensions[1].features[0];
    assert_eq!(url_feature.name, "Custom URL Listing and Sorting");
    assert_eq!(
        url_feature.observations,
        strings(&["Sorting is implemented client-side only for the Status column"])
    );
    assert_eq!(url_feature.screenshots.len(), 2);
}

#[test]
fn build_view_is_deterministic() {
    let store = fixture_store();
    assert_eq!(report_view(&store).unwrap(), report_view(&store).unwrap());
    assert_eq!(report_view(&store).unwrap(), fixture_view());
}

#[test]
fn all_passed_ignores_discarded_failures() {
    let manifest = manifest_of(vec![("Ext", vec![feature("F", vec![pass("A"), fail("B")])])]);
    let mut discards = DiscardMap::new();
    discards.insert("Ext::F::B", discard("Ext", "F", Some("B")));

    assert!(!build_view(&manifest, &DiscardMap::new()).unwrap().all_passed());
    assert!(build_view(&manifest, &discards).unwrap().all_passed());
}

// ============================================================================
// Console reporter
// ============================================================================

#[test]
fn console_report_fixture() {
    let output = format_console_report(&fixture_view());

    assert!(output.contains(
        "=== Extension: DNN_HTML (10 passed, 4 failed, 4 discarded \u{2014} 71.4%) ==="
    ));
    assert!(output.contains("AutoSave Functionality \u{2014} 0 passed, 0 failed, 4 discarded (N/A)"));
    assert!(output.contains("\u{2013} DISC  Enable/Disable AutoSave Setting [feature discarded]"));
    assert!(output.contains("\u{2013} DISC  Set AutoSave Interval\n"));
    assert!(output.contains("Content Locking \u{2014} 0 passed, 0 failed, 0 discarded (N/A)\n  (no scenarios)"));
    assert!(output.contains("\u{2713} PASS  Preview mobile view"));
    assert!(output.contains("\u{2717} FAIL  Preview with tokens replaced"));
    assert!(output.contains("1 discard entry matched nothing:"));
    assert!(output.contains("Evoq_PersonaBar_SiteSettings::"));
    assert!(output.contains(
        "=== Results: 12 passed, 4 failed, 5 discarded (21 total) \u{2014} 75% ==="
    ));
}

#[test]
fn console_report_hides_issues_of_discarded_scenarios() {
    let output = format_console_report(&fixture_view());

    // Discarded at scenario level in the fixture
    assert!(!output.contains("[ISSUE] Clicking the URL column header"));
    // Active failure
    assert!(output.contains("[ISSUE] CKEditor Preview is client-side only"));
}

// ============================================================================
// HTML reporter
// ============================================================================

#[test]
fn html_report_fixture() {
    let html = generate_html_report(&fixture_view());

    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("SOME SCENARIOS FAILED"));
    assert!(html.contains("#f44336"));
    assert!(html.contains("12 passed, 4 failed, 5 discarded (21 total)"));
    assert!(html.contains("<div class=\"scenario discarded\">"));
    assert!(html.contains("<div class=\"scenario failed\">"));
    assert!(html.contains("<div class=\"scenario passed\">"));
    assert!(html.contains("<ul class=\"screenshots\">"));
    assert!(html.contains("AutoSave_Functionality_step07_recovery_failed.png"));
}

#[test]
fn html_report_all_passed_and_escaped() {
    let manifest = manifest_of(vec![(
        "Ext",
        vec![feature("F", vec![pass("<script>alert('x')</script>")])],
    )]);
    let html = generate_html_report(&build_view(&manifest, &DiscardMap::new()).unwrap());

    assert!(html.contains("ALL ACTIVE SCENARIOS PASSED"));
    assert!(html.contains("#4CAF50"));
    assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
    assert!(!html.contains("<script>"));
}

// ============================================================================
// JUnit XML reporter
// ============================================================================

#[test]
fn junit_fixture_structure() {
    let xml = generate_junit_xml(&fixture_view());

    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(xml.contains("<testsuites name=\"repos\" tests=\"21\" failures=\"4\" skipped=\"5\">"));
    assert!(xml.contains(
        "<testsuite name=\"DNN_HTML::AutoSave_Functionality\" tests=\"4\" failures=\"0\" skipped=\"4\">"
    ));
    assert!(xml.contains(
        "<testsuite name=\"DNN_HTML::Content_Locking\" tests=\"0\" failures=\"0\" skipped=\"0\">"
    ));
    assert!(xml.contains("<skipped message=\"discarded\" />"));
    assert!(xml.contains(
        "<testcase name=\"Preview current draft\" classname=\"DNN_HTML.Content_Preview\" />"
    ));
    assert!(xml.contains("<failure message=\"1 issue(s) found\" type=\"ScenarioFailure\">"));
    assert_eq!(xml.matches("<testsuite ").count(), 5);
    assert_eq!(xml.matches("<testcase ").count(), 21);
    assert!(xml.ends_with("</testsuites>\n"));
}

#[test]
fn junit_failure_without_issues() {
    let manifest = manifest_of(vec![("Ext", vec![feature("F", vec![fail("Broken & bad")])])]);
    let xml = generate_junit_xml(&build_view(&manifest, &DiscardMap::new()).unwrap());

    assert!(xml.contains("<testcase name=\"Broken &amp; bad\" classname=\"Ext.F\">"));
    assert!(xml.contains("<failure message=\"scenario failed\" type=\"ScenarioFailure\"></failure>"));
}

#[test]
fn xml_escaping() {
    assert_eq!(
        escape_xml(r#"<a href="x">Tom & 'Jerry'</a>"#),
        "&lt;a href=&quot;x&quot;&gt;Tom &amp; &apos;Jerry&apos;&lt;/a&gt;"
    );
}

// ============================================================================
// JSON output
// ============================================================================

#[test]
fn json_output_shape() {
    let json = render(&fixture_view(), "json").unwrap();
    assert!(json.ends_with("}\n"));

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["output_folder"], "repos");
    assert_eq!(value["passed"], 12);
    assert_eq!(value["total"], 21);
    assert_eq!(value["pass_rate"], 0.75);

    let autosave = &value["extensions"][0]["features"][0];
    assert_eq!(autosave["pass_rate"], "N/A");
    assert_eq!(autosave["screenshots"].as_array().unwrap().len(), 8);
    assert_eq!(autosave["scenarios"][0]["discarded_by"], "feature");

    let preview = &value["extensions"][0]["features"][3];
    assert!(preview["scenarios"][0].get("discarded_by").is_none());
    assert_eq!(value["dangling"][0]["reason"], "unknown_extension");
}

#[test]
fn unknown_format_falls_back_to_console() {
    let view = fixture_view();
    assert_eq!(
        render(&view, "markdown").unwrap(),
        format_console_report(&view)
    );
}
