use crate::aggregate::resolve::{DiscardScope, EffectiveStatus};
use crate::report::view_model::{FeatureView, ReportView};

// ============================================================================
// Console reporter: formatted terminal output
// ============================================================================

/// Format a report view for terminal output.
///
/// Produces output like:
/// ```text
/// === Extension: DNN_HTML (8 passed, 0 failed, 4 discarded — 100%) ===
///
/// AutoSave Functionality — 0 passed, 0 failed, 4 discarded (N/A)
///   – DISC  Enable/Disable AutoSave Setting [feature discarded]
///
/// Content Creation and Editing — 8 passed, 0 failed, 0 discarded (100%)
///   ✓ PASS  Create new HTML content
///
/// === Results: 8 passed, 0 failed, 4 discarded (12 total) — 100% ===
/// ```
pub fn format_console_report(view: &ReportView) -> String {
    let mut out = String::new();

    for ext in &view.extensions {
        out.push_str(&format!(
            "=== Extension: {} ({} passed, {} failed, {} discarded \u{2014} {}) ===\n\n",
            ext.name, ext.counts.passed, ext.counts.failed, ext.counts.discarded, ext.pass_rate
        ));

        for feature in &ext.features {
            format_feature(&mut out, feature);
        }
    }

    if !view.dangling.is_empty() {
        out.push_str(&format!(
            "{} discard entr{} matched nothing:\n",
            view.dangling.len(),
            if view.dangling.len() == 1 { "y" } else { "ies" }
        ));
        for dangling in &view.dangling {
            out.push_str(&format!("  ? {} ({:?})\n", dangling.key, dangling.reason));
        }
        out.push('\n');
    }

    out.push_str(&format!(
        "=== Results: {} passed, {} failed, {} discarded ({} total) \u{2014} {} ===\n",
        view.totals.passed, view.totals.failed, view.totals.discarded, view.total, view.pass_rate
    ));

    out
}

fn format_feature(out: &mut String, feature: &FeatureView) {
    out.push_str(&format!(
        "{} \u{2014} {} passed, {} failed, {} discarded ({})\n",
        feature.name,
        feature.counts.passed,
        feature.counts.failed,
        feature.counts.discarded,
        feature.pass_rate
    ));

    if feature.scenarios.is_empty() {
        out.push_str("  (no scenarios)\n");
    }

    for scenario in &feature.scenarios {
        let marker = match scenario.effective {
            EffectiveStatus::Passed => "\u{2713} PASS",
            EffectiveStatus::Failed => "\u{2717} FAIL",
            EffectiveStatus::Discarded => "\u{2013} DISC",
        };
        let scope = match scenario.discarded_by {
            Some(DiscardScope::Feature) => " [feature discarded]",
            _ => "",
        };
        out.push_str(&format!("  {}  {}{}\n", marker, scenario.name, scope));

        // Issues are only interesting while the failure still counts
        if scenario.effective == EffectiveStatus::Failed {
            for issue in &scenario.issues {
                out.push_str(&format!("      [ISSUE] {}\n", issue));
            }
        }
    }

    out.push('\n');
}
