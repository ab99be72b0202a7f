//! Score report types with JSON persistence and reassessment comparison.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{InputPolicy, ScoreKind, ScoreOutcome};
use crate::statistics::SummaryStats;

/// A complete report for one case-set run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Summary of the case set.
    pub case_set: CaseSetSummary,
    /// Input policy the run used.
    #[serde(default)]
    pub policy: InputPolicy,
    /// Successfully evaluated cases.
    pub outcomes: Vec<CaseOutcome>,
    /// Cases that could not be evaluated.
    #[serde(default)]
    pub failures: Vec<CaseFailure>,
    /// Per-calculator statistics.
    pub summary: Vec<SummaryStats>,
    /// Total wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

/// Summary of a case set (without the case definitions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseSetSummary {
    pub id: String,
    pub name: String,
    pub case_count: usize,
}

/// One evaluated case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseOutcome {
    pub case_id: String,
    pub case_name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub outcome: ScoreOutcome,
}

/// One case that failed to evaluate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseFailure {
    pub case_id: String,
    pub calculator: ScoreKind,
    pub error: String,
    /// `false` when supplying the missing fields would let the case succeed.
    pub permanent: bool,
}

impl ScoreReport {
    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: ScoreReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Compare this report against an earlier one.
    ///
    /// Outcomes are matched on (case id, calculator). A band rank that rose by
    /// at least `threshold` is an escalation, one that fell by at least
    /// `threshold` a de-escalation. A baseline outcome that shows up among
    /// this report's failures is a new failure rather than a removal.
    pub fn compare(&self, baseline: &ScoreReport, threshold: u8) -> ReassessmentReport {
        let threshold = i16::from(threshold.max(1));

        let index = |report: &ScoreReport| -> HashMap<(String, ScoreKind), ScoreOutcome> {
            report
                .outcomes
                .iter()
                .map(|c| ((c.case_id.clone(), c.outcome.calculator), c.outcome.clone()))
                .collect()
        };

        let baseline_outcomes = index(baseline);
        let current_outcomes = index(self);

        let mut escalations = Vec::new();
        let mut de_escalations = Vec::new();
        let mut unchanged = 0usize;
        let mut new_cases = 0usize;

        for (key, current) in &current_outcomes {
            let Some(previous) = baseline_outcomes.get(key) else {
                new_cases += 1;
                continue;
            };
            let delta = i16::from(current.rank) - i16::from(previous.rank);
            let change = BandChange {
                case_id: key.0.clone(),
                calculator: key.1,
                baseline_band: previous.label.clone(),
                current_band: current.label.clone(),
                baseline_points: previous.points,
                current_points: current.points,
                rank_delta: delta,
            };
            if delta >= threshold {
                escalations.push(change);
            } else if delta <= -threshold {
                de_escalations.push(change);
            } else {
                unchanged += 1;
            }
        }

        let current_failures: HashMap<(&str, ScoreKind), &CaseFailure> = self
            .failures
            .iter()
            .map(|f| ((f.case_id.as_str(), f.calculator), f))
            .collect();

        let mut new_failures = Vec::new();
        let mut removed_cases = 0usize;
        for (key, previous) in &baseline_outcomes {
            if current_outcomes.contains_key(key) {
                continue;
            }
            match current_failures.get(&(key.0.as_str(), key.1)) {
                Some(failure) => new_failures.push(NewFailure {
                    case_id: key.0.clone(),
                    calculator: key.1,
                    baseline_band: previous.label.clone(),
                    error: failure.error.clone(),
                }),
                None => removed_cases += 1,
            }
        }

        let order = |a: &BandChange, b: &BandChange| {
            (a.case_id.as_str(), a.calculator).cmp(&(b.case_id.as_str(), b.calculator))
        };
        escalations.sort_by(order);
        de_escalations.sort_by(order);
        new_failures.sort_by(|a, b| {
            (a.case_id.as_str(), a.calculator).cmp(&(b.case_id.as_str(), b.calculator))
        });

        ReassessmentReport {
            escalations,
            de_escalations,
            new_failures,
            unchanged,
            new_cases,
            removed_cases,
        }
    }
}

/// Result of comparing two reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReassessmentReport {
    /// Cases whose band moved to a higher risk.
    pub escalations: Vec<BandChange>,
    /// Cases whose band moved to a lower risk.
    pub de_escalations: Vec<BandChange>,
    /// Cases scored in baseline that fail to evaluate in current.
    #[serde(default)]
    pub new_failures: Vec<NewFailure>,
    /// Cases whose band did not move enough to count.
    pub unchanged: usize,
    /// Cases in current but not baseline.
    pub new_cases: usize,
    /// Cases in baseline but absent from current.
    pub removed_cases: usize,
}

/// A case that scored in the baseline and now fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFailure {
    pub case_id: String,
    pub calculator: ScoreKind,
    pub baseline_band: String,
    pub error: String,
}

/// A band change for one case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BandChange {
    pub case_id: String,
    pub calculator: ScoreKind,
    pub baseline_band: String,
    pub current_band: String,
    pub baseline_points: f64,
    pub current_points: f64,
    pub rank_delta: i16,
}

impl ReassessmentReport {
    /// Format the reassessment as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Summary:** {} escalations, {} de-escalations, {} unchanged, {} new, {} removed, {} newly failing\n\n",
            self.escalations.len(),
            self.de_escalations.len(),
            self.unchanged,
            self.new_cases,
            self.removed_cases,
            self.new_failures.len()
        ));

        let mut table = |title: &str, changes: &[BandChange]| {
            if changes.is_empty() {
                return;
            }
            md.push_str(&format!("### {title}\n\n"));
            md.push_str("| Case | Calculator | Baseline | Current | Points |\n");
            md.push_str("|------|------------|----------|---------|--------|\n");
            for c in changes {
                md.push_str(&format!(
                    "| {} | {} | {} | {} | {} → {} |\n",
                    c.case_id,
                    c.calculator,
                    c.baseline_band,
                    c.current_band,
                    c.baseline_points,
                    c.current_points
                ));
            }
            md.push('\n');
        };

        table("Escalations", &self.escalations);
        table("De-escalations", &self.de_escalations);

        if !self.new_failures.is_empty() {
            md.push_str("### Newly failing\n\n");
            md.push_str("| Case | Calculator | Baseline | Error |\n");
            md.push_str("|------|------------|----------|-------|\n");
            for f in &self.new_failures {
                md.push_str(&format!(
                    "| {} | {} | {} | {} |\n",
                    f.case_id,
                    f.calculator,
                    f.baseline_band,
                    f.error.replace('|', "\\|")
                ));
            }
            md.push('\n');
        }

        md
    }

    /// Returns true if any case escalated.
    pub fn has_escalations(&self) -> bool {
        !self.escalations.is_empty()
    }

    /// Returns true if any previously scored case now fails.
    pub fn has_new_failures(&self) -> bool {
        !self.new_failures.is_empty()
    }

    /// Escalations or new failures: anything a reassessment gate should stop on.
    pub fn has_regressions(&self) -> bool {
        self.has_escalations() || self.has_new_failures()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(calculator: ScoreKind, points: f64, rank: u8, label: &str) -> ScoreOutcome {
        ScoreOutcome {
            calculator,
            points,
            band: label.to_lowercase(),
            label: label.into(),
            rank,
            description: String::new(),
            recommendation: String::new(),
            details: serde_json::Value::Null,
            warnings: vec![],
        }
    }

    fn case(id: &str, outcome: ScoreOutcome) -> CaseOutcome {
        CaseOutcome {
            case_id: id.into(),
            case_name: id.into(),
            tags: vec![],
            outcome,
        }
    }

    fn make_report(outcomes: Vec<CaseOutcome>) -> ScoreReport {
        ScoreReport {
            id: Uuid::nil(),
            created_at: Utc::now(),
            case_set: CaseSetSummary {
                id: "test".into(),
                name: "Test".into(),
                case_count: outcomes.len(),
            },
            policy: InputPolicy::Strict,
            outcomes,
            failures: vec![],
            summary: vec![],
            duration_ms: 0,
        }
    }

    #[test]
    fn compare_identical_reports() {
        let c = case("p1", outcome(ScoreKind::Alvarado, 3.0, 0, "Low"));
        let baseline = make_report(vec![c.clone()]);
        let current = make_report(vec![c]);

        let report = current.compare(&baseline, 1);
        assert!(report.escalations.is_empty());
        assert!(report.de_escalations.is_empty());
        assert_eq!(report.unchanged, 1);
    }

    #[test]
    fn compare_with_escalation() {
        let baseline = make_report(vec![case("p1", outcome(ScoreKind::Air, 4.0, 0, "Low"))]);
        let current = make_report(vec![case("p1", outcome(ScoreKind::Air, 9.0, 2, "High"))]);

        let report = current.compare(&baseline, 1);
        assert_eq!(report.escalations.len(), 1);
        assert_eq!(report.escalations[0].rank_delta, 2);
        assert!(report.has_escalations());
    }

    #[test]
    fn threshold_suppresses_small_moves() {
        let baseline = make_report(vec![case("p1", outcome(ScoreKind::ApacheII, 10.0, 1, "Moderate"))]);
        let current = make_report(vec![case("p1", outcome(ScoreKind::ApacheII, 16.0, 2, "High"))]);

        assert_eq!(current.compare(&baseline, 2).unchanged, 1);
        assert_eq!(baseline.compare(&current, 1).de_escalations.len(), 1);
    }

    #[test]
    fn same_case_id_with_different_calculators_is_distinct() {
        let baseline = make_report(vec![case("p1", outcome(ScoreKind::Alvarado, 3.0, 0, "Low"))]);
        let current = make_report(vec![
            case("p1", outcome(ScoreKind::Alvarado, 3.0, 0, "Low")),
            case("p1", outcome(ScoreKind::Air, 2.0, 0, "Low")),
        ]);

        let report = current.compare(&baseline, 1);
        assert_eq!(report.unchanged, 1);
        assert_eq!(report.new_cases, 1);
        assert_eq!(report.removed_cases, 0);
    }

    #[test]
    fn compare_with_new_and_removed() {
        let baseline = make_report(vec![case("old", outcome(ScoreKind::Pas, 1.0, 0, "Low"))]);
        let current = make_report(vec![case("new", outcome(ScoreKind::Pas, 1.0, 0, "Low"))]);

        let report = current.compare(&baseline, 1);
        assert_eq!(report.new_cases, 1);
        assert_eq!(report.removed_cases, 1);
    }

    #[test]
    fn case_failing_in_current_is_newly_failing_not_removed() {
        let baseline = make_report(vec![
            case("p1", outcome(ScoreKind::Aas, 8.0, 0, "Low")),
            case("p2", outcome(ScoreKind::Aas, 4.0, 0, "Low")),
        ]);
        let mut current = make_report(vec![]);
        current.failures.push(CaseFailure {
            case_id: "p1".into(),
            calculator: ScoreKind::Aas,
            error: "missing required input for aas: crp_mg_l".into(),
            permanent: false,
        });

        let report = current.compare(&baseline, 1);
        assert_eq!(report.removed_cases, 1);
        assert_eq!(report.new_failures.len(), 1);
        assert_eq!(report.new_failures[0].case_id, "p1");
        assert_eq!(report.new_failures[0].baseline_band, "Low");
        assert!(!report.has_escalations());
        assert!(report.has_regressions());

        let md = report.to_markdown();
        assert!(md.contains("1 removed, 1 newly failing"));
        assert!(md.contains("### Newly failing"));
        assert!(md.contains("| p1 | aas | Low | missing required input for aas: crp_mg_l |"));
    }

    #[test]
    fn failure_for_other_calculator_does_not_count() {
        let baseline = make_report(vec![case("p1", outcome(ScoreKind::Aas, 8.0, 0, "Low"))]);
        let mut current = make_report(vec![]);
        current.failures.push(CaseFailure {
            case_id: "p1".into(),
            calculator: ScoreKind::Air,
            error: "boom".into(),
            permanent: true,
        });

        let report = current.compare(&baseline, 1);
        assert!(report.new_failures.is_empty());
        assert_eq!(report.removed_cases, 1);
        assert!(!report.has_regressions());
    }

    #[test]
    fn json_save_and_load() {
        let report = make_report(vec![case("p1", outcome(ScoreKind::Tokyo, 2.0, 1, "Mild"))]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.json");

        report.save_json(&path).unwrap();
        let loaded = ScoreReport::load_json(&path).unwrap();

        assert_eq!(loaded.case_set.id, "test");
        assert_eq!(loaded.outcomes, report.outcomes);
    }

    #[test]
    fn markdown_output() {
        let baseline = make_report(vec![case("p1", outcome(ScoreKind::Aas, 8.0, 0, "Low"))]);
        let current = make_report(vec![case("p1", outcome(ScoreKind::Aas, 12.0, 1, "Intermediate"))]);

        let md = current.compare(&baseline, 1).to_markdown();
        assert!(md.contains("### Escalations"));
        assert!(md.contains("| p1 | aas | Low | Intermediate | 8 → 12 |"));
        assert!(!md.contains("De-escalations\n"));
    }
}
