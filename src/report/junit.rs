use crate::aggregate::resolve::EffectiveStatus;
use crate::report::view_model::ReportView;

// ============================================================================
// JUnit XML reporter: standard CI integration format
// ============================================================================

/// Generate JUnit XML with one `<testsuite>` per feature.
///
/// Discarded scenarios are reported as skipped:
/// ```xml
/// <?xml version="1.0" encoding="UTF-8"?>
/// <testsuites name="repos" tests="12" failures="0" skipped="4">
///   <testsuite name="DNN_HTML::AutoSave_Functionality" tests="4" failures="0" skipped="4">
///     <testcase name="Set AutoSave Interval" classname="DNN_HTML.AutoSave_Functionality">
///       <skipped message="discarded" />
///     </testcase>
///   </testsuite>
/// </testsuites>
/// ```
pub fn generate_junit_xml(view: &ReportView) -> String {
    let mut suites = String::new();

    for ext in &view.extensions {
        for feature in &ext.features {
            let classname = feature.key.replace("::", ".");
            let mut cases = String::new();

            for scenario in &feature.scenarios {
                let name = escape_xml(&scenario.name);
                match scenario.effective {
                    EffectiveStatus::Passed => {
                        cases.push_str(&format!(
                            "    <testcase name=\"{}\" classname=\"{}\" />\n",
                            name,
                            escape_xml(&classname)
                        ));
                    }
                    EffectiveStatus::Discarded => {
                        cases.push_str(&format!(
                            "    <testcase name=\"{}\" classname=\"{}\">\n      <skipped message=\"discarded\" />\n    </testcase>\n",
                            name,
                            escape_xml(&classname)
                        ));
                    }
                    EffectiveStatus::Failed => {
                        let message = if scenario.issues.is_empty() {
                            "scenario failed".to_string()
                        } else {
                            format!("{} issue(s) found", scenario.issues.len())
                        };
                        cases.push_str(&format!(
                            "    <testcase name=\"{name}\" classname=\"{classname}\">\n      <failure message=\"{message}\" type=\"ScenarioFailure\">{body}</failure>\n    </testcase>\n",
                            name = name,
                            classname = escape_xml(&classname),
                            message = escape_xml(&message),
                            body = escape_xml(&scenario.issues.join("\n")),
                        ));
                    }
                }
            }

            suites.push_str(&format!(
                "  <testsuite name=\"{name}\" tests=\"{tests}\" failures=\"{failures}\" skipped=\"{skipped}\">\n{cases}  </testsuite>\n",
                name = escape_xml(&feature.key),
                tests = feature.total,
                failures = feature.counts.failed,
                skipped = feature.counts.discarded,
                cases = cases,
            ));
        }
    }

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<testsuites name=\"{name}\" tests=\"{tests}\" failures=\"{failures}\" skipped=\"{skipped}\">\n{suites}</testsuites>\n",
        name = escape_xml(&view.output_folder),
        tests = view.total,
        failures = view.totals.failed,
        skipped = view.totals.discarded,
        suites = suites,
    )
}

/// Escape XML special characters.
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
