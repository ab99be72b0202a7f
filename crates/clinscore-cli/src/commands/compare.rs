//! The `clinscore compare` command.

use std::path::PathBuf;

use anyhow::Result;

use clinscore_core::config::load_config_from;
use clinscore_core::report::{BandChange, ScoreReport};

pub fn execute(
    baseline_path: PathBuf,
    current_path: PathBuf,
    threshold: Option<u8>,
    fail_on_escalation: bool,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let threshold = match threshold {
        Some(t) => t,
        None => load_config_from(config_path.as_deref())?.escalation_threshold,
    };
    let baseline = ScoreReport::load_json(&baseline_path)?;
    let current = ScoreReport::load_json(&current_path)?;

    let report = current.compare(&baseline, threshold);

    match format.as_str() {
        "markdown" | "md" => {
            println!("{}", report.to_markdown());
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            // text format
            println!(
                "Comparison: {} escalation(s), {} de-escalation(s), {} unchanged",
                report.escalations.len(),
                report.de_escalations.len(),
                report.unchanged
            );

            print_changes("Escalations", &report.escalations);
            print_changes("De-escalations", &report.de_escalations);

            if report.has_new_failures() {
                println!("\nNewly failing:");
                for f in &report.new_failures {
                    println!(
                        "  {} ({}) was {}: {}",
                        f.case_id, f.calculator, f.baseline_band, f.error
                    );
                }
            }

            if report.new_cases > 0 {
                println!("\n{} new case(s)", report.new_cases);
            }
            if report.removed_cases > 0 {
                println!("{} removed case(s)", report.removed_cases);
            }
        }
    }

    if fail_on_escalation && report.has_regressions() {
        std::process::exit(1);
    }

    Ok(())
}

fn print_changes(title: &str, changes: &[BandChange]) {
    if changes.is_empty() {
        return;
    }
    println!("\n{title}:");
    for c in changes {
        println!(
            "  {} ({}) {} -> {} (points {} -> {}, rank {:+})",
            c.case_id,
            c.calculator,
            c.baseline_band,
            c.current_band,
            c.baseline_points,
            c.current_points,
            c.rank_delta
        );
    }
}
