use std::path::PathBuf;

use time::OffsetDateTime;

use crate::aggregate::resolve::find_dangling;
use crate::aggregate::rollup::compute_rollup;
use crate::aggregate::stale::find_stale_summaries;
use crate::cli::config::Inputs;
use crate::discard::discard_model::{now_millis, DiscardStatus};
use crate::discard::loader::load_discards;
use crate::discard::snapshot::{export_snapshot, write_snapshot};
use crate::error::{RecordKind, ReportError};
use crate::input::fetch::is_remote;
use crate::key::normalize::scenario_key;
use crate::manifest::loader::load_manifest;
use crate::report::console::format_console_report;
use crate::report::html::generate_html_report;
use crate::report::junit::generate_junit_xml;
use crate::report::view_model::{build_view, ReportView};
use crate::store::record_store::RecordStore;
use crate::trace::logger::TraceLogger;
use crate::trace::trace::TraceEvent;

// ============================================================================
// Input loading
// ============================================================================

/// Load both inputs into a fresh record store.
pub fn load_store(inputs: &Inputs, verbose: u8) -> Result<RecordStore, Box<dyn std::error::Error>> {
    if verbose > 0 {
        eprintln!("Loading manifest from {}...", inputs.manifest);
    }
    let manifest = load_manifest(&inputs.manifest)?;

    if verbose > 0 {
        eprintln!("Loading discard status from {}...", inputs.discards);
    }
    let discards = load_discards(&inputs.discards)?;

    if verbose > 1 {
        eprintln!(
            "  {} extensions, {} scenarios, {} discard entries",
            manifest.extensions.len(),
            manifest.scenario_count(),
            discards.len()
        );
    }

    Ok(RecordStore::new(manifest, discards))
}

// ============================================================================
// report subcommand
// ============================================================================

/// Render the report and return whether no active scenario failed.
pub fn cmd_report(
    store: &RecordStore,
    format: &str,
    output: Option<&str>,
    verbose: u8,
    tracer: &TraceLogger,
) -> Result<bool, Box<dyn std::error::Error>> {
    let view = build_view(store.manifest(), store.discards())?;
    tracer.log_all(view.dangling.iter().map(TraceEvent::dangling));

    if verbose > 0 {
        if !view.dangling.is_empty() {
            eprintln!("{} discard entries matched nothing", view.dangling.len());
        }
        eprintln!("Report fingerprint: {}", view.fingerprint);
    }

    let content = render(&view, format)?;

    match output {
        Some(path) => std::fs::write(path, &content)?,
        None => print!("{}", content),
    }

    Ok(view.all_passed())
}

/// Render a view in one of the supported output formats.
///
/// Unknown formats fall back to console output.
pub fn render(view: &ReportView, format: &str) -> Result<String, Box<dyn std::error::Error>> {
    Ok(match format {
        "html" => generate_html_report(view),
        "junit" => generate_junit_xml(view),
        "json" => {
            let mut json = serde_json::to_string_pretty(view)?;
            json.push('\n');
            json
        }
        _ => format_console_report(view),
    })
}

// ============================================================================
// show subcommand
// ============================================================================

/// Print one extension or feature. A lookup miss prints "No data" and is
/// not an error.
pub fn cmd_show(
    store: &RecordStore,
    extension: &str,
    feature: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    match describe(store, extension, feature) {
        Ok(text) => print!("{}", text),
        Err(e) if e.is_not_found() => println!("No data: {}", e),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

/// Text shown by `show`.
pub fn describe(
    store: &RecordStore,
    extension: &str,
    feature: Option<&str>,
) -> Result<String, ReportError> {
    let ext = store.get_extension(extension)?;
    let rollup = compute_rollup(store.manifest(), store.discards());
    let ext_rollup = rollup
        .extension(&ext.name)
        .ok_or_else(|| ReportError::not_found(RecordKind::Extension, extension))?;

    let mut out = String::new();

    let Some(feature_name) = feature else {
        out.push_str(&format!(
            "{} ({}): {} passed, {} failed, {} discarded, pass rate {}\n",
            ext.name,
            ext.folder,
            ext_rollup.counts.passed,
            ext_rollup.counts.failed,
            ext_rollup.counts.discarded,
            ext_rollup.pass_rate
        ));
        for f in &ext_rollup.features {
            out.push_str(&format!(
                "  {} \u{2014} {}/{}/{} ({})\n",
                f.name, f.counts.passed, f.counts.failed, f.counts.discarded, f.pass_rate
            ));
        }
        return Ok(out);
    };

    let found = store.get_feature(&ext.name, feature_name)?;
    let feature_rollup = ext_rollup
        .feature(&found.name)
        .ok_or_else(|| ReportError::not_found(RecordKind::Feature, feature_name))?;

    out.push_str(&format!(
        "{} :: {} \u{2014} {} passed, {} failed, {} discarded ({})\n",
        ext.name,
        found.name,
        feature_rollup.counts.passed,
        feature_rollup.counts.failed,
        feature_rollup.counts.discarded,
        feature_rollup.pass_rate
    ));
    if let Some(description) = found.description() {
        out.push_str(&format!("  {}\n", description));
    }

    for (scenario, outcome) in found.scenarios.iter().zip(&feature_rollup.scenarios) {
        out.push_str(&format!(
            "  [{:?}] {} (stored {})\n",
            outcome.effective, scenario.name, scenario.status
        ));
        for step in store.steps(&ext.name, &found.name, &scenario.name)? {
            out.push_str(&format!("      {}. {}\n", step.step_number, step.action));
        }
        for issue in &scenario.issues {
            out.push_str(&format!("      ! {}\n", issue));
        }
    }

    Ok(out)
}

// ============================================================================
// keys subcommand
// ============================================================================

pub fn cmd_keys(store: &RecordStore) {
    for key in store.manifest().scenario_keys() {
        println!("{}", key);
    }
}

// ============================================================================
// check subcommand
// ============================================================================

/// Print stale summaries and dangling discards; returns true when clean.
pub fn cmd_check(store: &RecordStore, tracer: &TraceLogger) -> bool {
    let stale = find_stale_summaries(store.manifest());
    let dangling = find_dangling(store.manifest(), store.discards());

    tracer.log_all(stale.iter().map(TraceEvent::stale));
    tracer.log_all(dangling.iter().map(TraceEvent::dangling));

    for s in &stale {
        println!(
            "stale   {} {}: stored {}, recomputed {}",
            s.scope, s.field, s.stored, s.recomputed
        );
    }
    for d in &dangling {
        println!("dangling {} ({:?})", d.key, d.reason);
    }

    if stale.is_empty() && dangling.is_empty() {
        println!("Manifest summaries and discard entries are consistent");
    }

    stale.is_empty() && dangling.is_empty()
}

// ============================================================================
// discard subcommand
// ============================================================================

/// A reviewer decision about one feature or scenario.
#[derive(Debug, Clone)]
pub struct Decision<'a> {
    pub extension: &'a str,
    pub feature: &'a str,
    pub scenario: Option<&'a str>,
    pub status: DiscardStatus,
}

/// Apply a decision and write the whole discard map as a new snapshot.
///
/// The target must exist in the manifest; names are stored the way the
/// manifest spells them. Returns the path written.
pub fn cmd_discard(
    store: &RecordStore,
    inputs: &Inputs,
    decision: &Decision<'_>,
    output: Option<&str>,
    verbose: u8,
    tracer: &TraceLogger,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let ext = store.get_extension(decision.extension)?;
    let feature = store.get_feature(&ext.name, decision.feature)?;
    let scenario = match decision.scenario {
        Some(name) => Some(
            feature
                .scenario(name)
                .ok_or_else(|| {
                    ReportError::not_found(
                        RecordKind::Scenario,
                        scenario_key(&ext.name, &feature.name, Some(name)),
                    )
                })?
                .name
                .as_str(),
        ),
        None => None,
    };

    let target = match output {
        Some(path) => PathBuf::from(path),
        None if is_remote(&inputs.discards) => {
            return Err("discard input is a URL; pass --output to choose where the snapshot goes".into());
        }
        None => PathBuf::from(&inputs.discards),
    };

    let next = store.discards().with_decision(
        &ext.name,
        &feature.name,
        scenario,
        decision.status,
        now_millis(),
    );
    let key = scenario_key(&ext.name, &feature.name, scenario);
    tracer.log(&TraceEvent::decision(&key, decision.status));

    let snapshot = export_snapshot(&next, OffsetDateTime::now_utc())?;
    write_snapshot(&target, &snapshot)?;

    if verbose > 0 {
        eprintln!("Wrote {} discard entries to {}", next.len(), target.display());
    }
    println!("{} -> {:?}", key, decision.status);

    Ok(target)
}
