//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use anyhow::{Context, Result};
use std::path::Path;

use clinscore_core::catalogue::info;
use clinscore_core::report::ScoreReport;
use clinscore_core::statistics::SummaryStats;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn rank_class(rank: u8) -> &'static str {
    match rank {
        0 => "low",
        1 => "mid",
        _ => "high",
    }
}

/// Generate an HTML report from a score report.
pub fn generate_html(report: &ScoreReport) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>clinscore report: {}</title>\n",
        html_escape(&report.case_set.name)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str("<h1>clinscore report</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">Case set: <strong>{}</strong> | {} cases | {} failed | {} policy | {}</p>\n",
        html_escape(&report.case_set.name),
        report.case_set.case_count,
        report.failures.len(),
        report.policy,
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("<p class=\"notice\">Decision support only. Results do not replace clinical judgement.</p>\n");
    html.push_str("</header>\n");

    // Summary
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Summary</h2>\n");
    html.push_str("<table class=\"summary\">\n");
    html.push_str("<thead><tr><th>Calculator</th><th>Evaluated</th><th>Failed</th><th>Bands</th><th>Mean</th><th>Max</th><th>Warnings</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for stats in &report.summary {
        let bands = stats
            .bands
            .iter()
            .map(|(label, count)| format!("{}: {count}", html_escape(label)))
            .collect::<Vec<_>>()
            .join(", ");
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{:.1}</td><td>{:.1}</td><td>{}</td></tr>\n",
            html_escape(info(stats.calculator).name),
            stats.evaluated,
            stats.failed,
            bands,
            stats.mean_points,
            stats.max_points,
            stats.warnings,
        ));
    }
    html.push_str("</tbody></table>\n");

    if !report.summary.is_empty() {
        html.push_str(&generate_bar_chart(&report.summary));
    }

    html.push_str("</section>\n");

    // Per-case outcomes
    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Cases</h2>\n");
    html.push_str("<table class=\"results-table\" id=\"results\">\n");
    html.push_str("<thead><tr><th onclick=\"sortTable(0)\">Case</th><th onclick=\"sortTable(1)\">Calculator</th><th onclick=\"sortTable(2)\">Score</th><th onclick=\"sortTable(3)\">Band</th><th>Recommendation</th><th>Warnings</th></tr></thead>\n");
    html.push_str("<tbody>\n");

    for case in &report.outcomes {
        let o = &case.outcome;
        let warnings = o
            .warnings
            .iter()
            .map(|w| html_escape(w))
            .collect::<Vec<_>>()
            .join("<br>");
        html.push_str(&format!(
            "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            rank_class(o.rank),
            html_escape(&case.case_id),
            o.calculator,
            o.points,
            html_escape(&o.label),
            html_escape(&o.recommendation),
            warnings
        ));
    }

    for failure in &report.failures {
        html.push_str(&format!(
            "<tr class=\"fail\"><td>{}</td><td>{}</td><td>-</td><td>FAILED</td><td>{}</td><td></td></tr>\n",
            html_escape(&failure.case_id),
            failure.calculator,
            html_escape(&failure.error)
        ));
    }

    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(report).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    // JavaScript for sorting
    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &ScoreReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
    Ok(())
}

/// Horizontal bars of evaluated share per calculator.
fn generate_bar_chart(summary: &[SummaryStats]) -> String {
    let bar_height = 30;
    let max_width = 400;
    let padding = 10;
    let label_width = 260;

    let total_height = summary.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    for (i, stats) in summary.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let rate = stats.success_rate();
        let width = (rate * max_width as f64) as usize;

        let color = if rate >= 0.9 {
            "#22c55e"
        } else if rate >= 0.5 {
            "#eab308"
        } else {
            "#ef4444"
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(info(stats.calculator).name)
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{:.0}% evaluated</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            rate * 100.0
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --low: #dcfce7; --mid: #fef9c3; --high: #fde2e2; --fail: #e5e7eb; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --low: #064e3b; --mid: #713f12; --high: #7f1d1d; --fail: #1f2937; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta, .notice { color: #6b7280; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; vertical-align: top; }
th { background: var(--border); cursor: pointer; }
.low { background: var(--low); }
.mid { background: var(--mid); }
.high { background: var(--high); }
.fail { background: var(--fail); font-style: italic; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('results');
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    const na = parseFloat(va), nb = parseFloat(vb);
    const cmp = !isNaN(na) && !isNaN(nb) ? na - nb : va.localeCompare(vb);
    return asc ? cmp : -cmp;
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use clinscore_core::engine::{NoopReporter, ScoreEngine};
    use clinscore_core::model::{CaseSet, InputPolicy, ScoreCase, ScoreKind};
    use serde_json::json;

    fn make_test_report() -> ScoreReport {
        let case = |id: &str, calculator, input| ScoreCase {
            id: id.into(),
            name: id.into(),
            description: String::new(),
            calculator,
            input,
            tags: vec![],
        };
        let set = CaseSet {
            id: "test-set".into(),
            name: "Test <Set>".into(),
            description: String::new(),
            cases: vec![
                case(
                    "case-1",
                    ScoreKind::Alvarado,
                    json!({ "rlq_tenderness": true, "leukocytosis": true, "migratory_pain": true }),
                ),
                case("case-2", ScoreKind::Asa, json!({ "classification": "IV" })),
                case("broken", ScoreKind::Anthropometry, json!({ "weight_kg": 70.0 })),
            ],
        };
        ScoreEngine::new(InputPolicy::Strict).run(&set, &NoopReporter)
    }

    #[test]
    fn html_report_contains_required_elements() {
        let report = make_test_report();
        let html = generate_html(&report);

        assert!(html.contains("<html"));
        assert!(html.contains("</html>"));
        assert!(html.contains("Alvarado Score"));
        assert!(html.contains("case-1"));
        assert!(html.contains("Test &lt;Set&gt;"));
        assert!(html.contains("<details>"));
    }

    #[test]
    fn failures_are_listed() {
        let html = generate_html(&make_test_report());
        assert!(html.contains("<tr class=\"fail\"><td>broken</td>"));
        assert!(html.contains("missing required input: height_cm"));
    }

    #[test]
    fn escape_covers_markup() {
        assert_eq!(
            html_escape("<b>\"a\" & 'b'</b>"),
            "&lt;b&gt;&quot;a&quot; &amp; &#x27;b&#x27;&lt;/b&gt;"
        );
        assert_eq!(rank_class(0), "low");
        assert_eq!(rank_class(4), "high");
    }

    #[test]
    fn html_report_write_to_file() {
        let report = make_test_report();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("report.html");

        write_html_report(&report, &path).unwrap();
        assert!(path.exists());

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<html"));
    }
}
