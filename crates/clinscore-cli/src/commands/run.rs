//! The `clinscore run` command.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

use clinscore_core::catalogue::info;
use clinscore_core::config::load_config_from;
use clinscore_core::engine::{ProgressReporter, ScoreEngine};
use clinscore_core::error::ScoreError;
use clinscore_core::model::ScoreKind;
use clinscore_core::parser;
use clinscore_core::report::{CaseOutcome, ScoreReport};
use clinscore_report::html::write_html_report;

use super::resolve_policy;

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_case_start(&self, case_id: &str, calculator: ScoreKind) {
        tracing::debug!("starting {calculator} :: {case_id}");
    }

    fn on_case_complete(&self, case: &CaseOutcome) {
        let o = &case.outcome;
        let warn_info = if o.warnings.is_empty() {
            String::new()
        } else {
            format!(" ({} warning(s))", o.warnings.len())
        };
        eprintln!(
            "  Done: {} :: {} score {} [{}]{}",
            o.calculator, case.case_id, o.points, o.label, warn_info
        );
    }

    fn on_case_error(&self, case_id: &str, calculator: ScoreKind, error: &ScoreError) {
        eprintln!("  ERROR: {calculator} :: {case_id}: {error}");
    }

    fn on_set_complete(&self, total: usize, completed: usize, failed: usize, elapsed: Duration) {
        eprintln!(
            "\nComplete: {completed}/{total} scored, {failed} failed ({:.3}s)",
            elapsed.as_secs_f64()
        );
    }
}

const FORMATS: [&str; 2] = ["json", "html"];

pub fn execute(
    cases_path: PathBuf,
    output: Option<PathBuf>,
    format: Option<String>,
    filter: Option<String>,
    policy: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let policy = resolve_policy(policy.as_deref(), config.input_policy)?;
    let output = output.unwrap_or_else(|| config.output_dir.clone());
    let format = format.unwrap_or_else(|| config.default_format.clone());

    let formats: Vec<&str> = if format == "all" {
        FORMATS.to_vec()
    } else {
        format.split(',').map(str::trim).collect()
    };
    if let Some(bad) = formats.iter().find(|f| !FORMATS.contains(*f)) {
        anyhow::bail!("unknown format '{bad}' (expected json, html or all)");
    }

    let mut case_sets = parser::load_case_sets(&cases_path)?;
    anyhow::ensure!(
        !case_sets.is_empty(),
        "no case sets found in {}",
        cases_path.display()
    );

    // Apply tag filter
    if let Some(filter_tags) = &filter {
        let tags: Vec<String> = filter_tags
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        for set in &mut case_sets {
            set.filter_by_tags(&tags);
        }
    }

    let engine = ScoreEngine::new(policy);
    let reporter = ConsoleReporter;

    for case_set in &case_sets {
        eprintln!(
            "clinscore v{}: scoring {} cases from {} ({} policy)",
            env!("CARGO_PKG_VERSION"),
            case_set.cases.len(),
            case_set.name,
            policy
        );
        eprintln!();

        let report = engine.run(case_set, &reporter);

        print_summary(&report);

        // Save outputs
        std::fs::create_dir_all(&output)?;
        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");
        let stem = format!("report-{}-{timestamp}", case_set.id);

        for fmt in &formats {
            match *fmt {
                "json" => {
                    let path = output.join(format!("{stem}.json"));
                    report.save_json(&path)?;
                    eprintln!("Results saved to: {}", path.display());
                }
                "html" => {
                    let path = output.join(format!("{stem}.html"));
                    write_html_report(&report, &path)?;
                    eprintln!("HTML report: {}", path.display());
                }
                _ => {}
            }
        }
    }

    Ok(())
}

fn print_summary(report: &ScoreReport) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec![
        "Calculator",
        "Evaluated",
        "Failed",
        "Bands",
        "Mean",
        "Max",
        "Warnings",
    ]);

    for stats in &report.summary {
        let bands = stats
            .bands
            .iter()
            .map(|(label, count)| format!("{label}: {count}"))
            .collect::<Vec<_>>()
            .join("\n");
        table.add_row(vec![
            Cell::new(info(stats.calculator).name),
            Cell::new(stats.evaluated),
            Cell::new(stats.failed),
            Cell::new(bands),
            Cell::new(format!("{:.1}", stats.mean_points)),
            Cell::new(format!("{:.1}", stats.max_points)),
            Cell::new(stats.warnings),
        ]);
    }

    println!("\n{table}");
}
