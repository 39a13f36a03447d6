use crate::aggregate::resolve::EffectiveStatus;
use crate::report::view_model::{FeatureView, ReportView};

// ============================================================================
// HTML reporter: self-contained HTML report
// ============================================================================

/// Generate a self-contained HTML report.
///
/// Features:
/// - Green/red header based on whether any active scenario failed
/// - Summary bar with pass/fail/discarded counts
/// - One section per feature with scenarios, issues and steps
/// - Discarded scenarios greyed out
/// - Deduplicated screenshot list and observations per feature
/// - Inline CSS (no external dependencies)
pub fn generate_html_report(view: &ReportView) -> String {
    let header_color = if view.all_passed() {
        "#4CAF50"
    } else {
        "#f44336"
    };

    let status_text = if view.all_passed() {
        "ALL ACTIVE SCENARIOS PASSED"
    } else {
        "SOME SCENARIOS FAILED"
    };

    let mut sections = String::new();
    for ext in &view.extensions {
        sections.push_str(&format!(
            "<h2>{name} <small>{passed} passed, {failed} failed, {discarded} discarded \u{2014} {rate}</small></h2>\n",
            name = escape_html(&ext.name),
            passed = ext.counts.passed,
            failed = ext.counts.failed,
            discarded = ext.counts.discarded,
            rate = ext.pass_rate,
        ));
        for feature in &ext.features {
            sections.push_str(&feature_section(feature));
        }
    }

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{folder} — QA Report</title>
<style>
body {{ font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif; margin: 0; padding: 0; background: #f5f5f5; }}
.header {{ background: {header_color}; color: white; padding: 20px 30px; }}
.header h1 {{ margin: 0 0 8px 0; font-size: 24px; }}
.header p {{ margin: 0; font-size: 16px; opacity: 0.9; }}
.content {{ max-width: 900px; margin: 20px auto; padding: 0 20px; }}
h2 small {{ font-weight: normal; color: #666; font-size: 14px; }}
.feature {{ background: white; border-radius: 6px; padding: 16px 20px; margin-bottom: 12px; }}
.feature h3 {{ margin: 0 0 8px 0; font-size: 16px; }}
.feature p {{ margin: 4px 0; color: #666; font-size: 14px; }}
.scenario {{ border-left: 4px solid #ccc; padding: 4px 10px; margin: 8px 0; }}
.scenario.passed {{ border-left-color: #4CAF50; }}
.scenario.failed {{ border-left-color: #f44336; }}
.scenario.discarded {{ border-left-color: #9e9e9e; opacity: 0.6; }}
.issues li {{ color: #c62828; font-size: 13px; }}
.steps li, .observations li, .screenshots li {{ font-size: 13px; color: #444; }}
</style>
</head>
<body>
<div class="header">
<h1>{status_text}</h1>
<p>{folder}: {passed} passed, {failed} failed, {discarded} discarded ({total} total) — {rate}</p>
</div>
<div class="content">
{sections}
</div>
</body>
</html>"##,
        folder = escape_html(&view.output_folder),
        header_color = header_color,
        status_text = status_text,
        passed = view.totals.passed,
        failed = view.totals.failed,
        discarded = view.totals.discarded,
        total = view.total,
        rate = view.pass_rate,
        sections = sections,
    )
}

fn feature_section(feature: &FeatureView) -> String {
    let mut out = format!(
        "<div class=\"feature\">\n<h3>{}</h3>\n<p>{} passed | {} failed | {} discarded | {}</p>\n",
        escape_html(&feature.name),
        feature.counts.passed,
        feature.counts.failed,
        feature.counts.discarded,
        feature.pass_rate,
    );

    if let Some(description) = &feature.description {
        out.push_str(&format!("<p>{}</p>\n", escape_html(description)));
    }

    for scenario in &feature.scenarios {
        let class = match scenario.effective {
            EffectiveStatus::Passed => "passed",
            EffectiveStatus::Failed => "failed",
            EffectiveStatus::Discarded => "discarded",
        };
        out.push_str(&format!(
            "<div class=\"scenario {}\">\n<strong>{}</strong> <em>{}</em>\n",
            class,
            escape_html(&scenario.name),
            scenario.stored
        ));

        if !scenario.issues.is_empty() {
            out.push_str("<ul class=\"issues\">\n");
            for issue in &scenario.issues {
                out.push_str(&format!("<li>{}</li>\n", escape_html(issue)));
            }
            out.push_str("</ul>\n");
        }

        if !scenario.steps.is_empty() {
            out.push_str("<ol class=\"steps\">\n");
            for step in &scenario.steps {
                out.push_str(&format!(
                    "<li>{} \u{2192} {}</li>\n",
                    escape_html(&step.action),
                    escape_html(&step.actual)
                ));
            }
            out.push_str("</ol>\n");
        }

        out.push_str("</div>\n");
    }

    push_list(&mut out, "observations", &feature.observations);
    push_list(&mut out, "screenshots", &feature.screenshots);

    out.push_str("</div>\n");
    out
}

fn push_list(out: &mut String, class: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    out.push_str(&format!("<ul class=\"{}\">\n", class));
    for item in items {
        out.push_str(&format!("<li>{}</li>\n", escape_html(item)));
    }
    out.push_str("</ul>\n");
}

/// Escape HTML special characters.
fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
