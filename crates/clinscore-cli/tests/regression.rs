//! Reassessment integration tests.
//!
//! Tests the report comparison workflow end-to-end: scoring a case set twice
//! with changed findings, JSON persistence, and escalation detection.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;

use clinscore_core::engine::{NoopReporter, ScoreEngine};
use clinscore_core::model::{CaseSet, InputPolicy, ScoreKind};
use clinscore_core::parser::parse_case_set;
use clinscore_core::report::ScoreReport;

fn clinscore() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("clinscore").unwrap()
}

fn baseline_set() -> CaseSet {
    parse_case_set(Path::new("../../case-sets/appendicitis.toml")).unwrap()
}

/// The same patients a few hours later.
fn reassessed_set() -> CaseSet {
    let mut set = baseline_set();
    for case in &mut set.cases {
        match case.id.as_str() {
            // Guarding progressed: AAS 10 -> 12.
            "adult-aas" => case.input["guarding"] = json!("moderate_or_severe"),
            // Leukocytosis resolved: Alvarado 5 -> 3.
            "adult-rlq" => case.input["leukocytosis"] = json!(false),
            _ => {}
        }
    }
    set.cases.retain(|c| c.id != "child-pathway");
    set
}

fn score(set: &CaseSet) -> ScoreReport {
    ScoreEngine::new(InputPolicy::Strict).run(set, &NoopReporter)
}

#[test]
fn reassessment_detects_escalation_and_de_escalation() {
    let baseline = score(&baseline_set());
    let current = score(&reassessed_set());

    let report = current.compare(&baseline, 1);

    assert_eq!(report.escalations.len(), 1);
    let up = &report.escalations[0];
    assert_eq!(up.case_id, "adult-aas");
    assert_eq!(up.calculator, ScoreKind::Aas);
    assert_eq!(up.baseline_points, 10.0);
    assert_eq!(up.current_points, 12.0);
    assert_eq!(up.rank_delta, 1);

    assert_eq!(report.de_escalations.len(), 1);
    assert_eq!(report.de_escalations[0].case_id, "adult-rlq");
    assert_eq!(report.de_escalations[0].rank_delta, -1);

    assert_eq!(report.unchanged, 2);
    assert_eq!(report.new_cases, 0);
    assert_eq!(report.removed_cases, 1);
    assert!(report.has_escalations());
}

#[test]
fn identical_runs_have_no_changes() {
    let a = score(&baseline_set());
    let b = score(&baseline_set());

    let report = b.compare(&a, 1);
    assert!(report.escalations.is_empty());
    assert!(report.de_escalations.is_empty());
    assert_eq!(report.unchanged, 5);
}

#[test]
fn threshold_two_ignores_single_band_moves() {
    let baseline = score(&baseline_set());
    let current = score(&reassessed_set());

    let report = current.compare(&baseline, 2);
    assert!(report.escalations.is_empty());
    assert!(report.de_escalations.is_empty());
    assert_eq!(report.unchanged, 4);
}

#[test]
fn compare_survives_json_persistence() {
    let dir = TempDir::new().unwrap();
    let baseline_path = dir.path().join("baseline.json");
    let current_path = dir.path().join("current.json");

    score(&baseline_set()).save_json(&baseline_path).unwrap();
    score(&reassessed_set()).save_json(&current_path).unwrap();

    let baseline = ScoreReport::load_json(&baseline_path).unwrap();
    let current = ScoreReport::load_json(&current_path).unwrap();
    let report = current.compare(&baseline, 1);
    assert_eq!(report.escalations.len(), 1);

    let md = report.to_markdown();
    assert!(md.contains("**Summary:** 1 escalations, 1 de-escalations, 2 unchanged, 0 new, 1 removed"));
    assert!(md.contains(
        "| adult-aas | aas | Low probability | Intermediate probability | 10 → 12 |"
    ));
    assert!(md.contains("### De-escalations"));
}

#[test]
fn cli_compare_formats_and_exit_code() {
    let dir = TempDir::new().unwrap();
    let baseline_path = dir.path().join("baseline.json");
    let current_path = dir.path().join("current.json");
    score(&baseline_set()).save_json(&baseline_path).unwrap();
    score(&reassessed_set()).save_json(&current_path).unwrap();

    clinscore()
        .arg("compare")
        .arg("--baseline")
        .arg(&baseline_path)
        .arg("--current")
        .arg(&current_path)
        .arg("--format")
        .arg("markdown")
        .assert()
        .success()
        .stdout(predicate::str::contains("### Escalations"));

    let output = clinscore()
        .arg("compare")
        .arg("--baseline")
        .arg(&baseline_path)
        .arg("--current")
        .arg(&current_path)
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["escalations"][0]["case_id"], "adult-aas");
    assert_eq!(parsed["removed_cases"], 1);

    clinscore()
        .arg("compare")
        .arg("--baseline")
        .arg(&baseline_path)
        .arg("--current")
        .arg(&current_path)
        .arg("--fail-on-escalation")
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("adult-aas (aas)"));

    // Swapped, the Alvarado recovery reads as an escalation.
    clinscore()
        .arg("compare")
        .arg("--baseline")
        .arg(&current_path)
        .arg("--current")
        .arg(&baseline_path)
        .arg("--fail-on-escalation")
        .assert()
        .failure()
        .code(1);
}

/// The AIR record loses its temperature, so strict scoring fails it.
fn incomplete_set() -> CaseSet {
    let mut set = baseline_set();
    for case in &mut set.cases {
        if case.id == "adult-air" {
            if let Some(input) = case.input.as_object_mut() {
                input.remove("temperature_c");
            }
        }
    }
    set
}

#[test]
fn case_that_stops_scoring_is_a_new_failure() {
    let baseline = score(&baseline_set());
    let current = score(&incomplete_set());
    assert_eq!(current.failures.len(), 1);

    let report = current.compare(&baseline, 1);
    assert!(report.escalations.is_empty());
    assert_eq!(report.removed_cases, 0);
    assert_eq!(report.new_failures.len(), 1);
    assert_eq!(report.new_failures[0].case_id, "adult-air");
    assert_eq!(report.new_failures[0].calculator, ScoreKind::Air);
    assert!(report.new_failures[0].error.contains("temperature_c"));
    assert!(report.to_markdown().contains("0 removed, 1 newly failing"));

    let dir = TempDir::new().unwrap();
    let baseline_path = dir.path().join("baseline.json");
    let current_path = dir.path().join("current.json");
    baseline.save_json(&baseline_path).unwrap();
    current.save_json(&current_path).unwrap();

    clinscore()
        .arg("compare")
        .arg("--baseline")
        .arg(&baseline_path)
        .arg("--current")
        .arg(&current_path)
        .arg("--fail-on-escalation")
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("Newly failing:"))
        .stdout(predicate::str::contains("adult-air (air)"));
}
