//! Per-calculator summary statistics for a report.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::ScoreKind;
use crate::report::{CaseFailure, CaseOutcome};

/// Statistics for one calculator across a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub calculator: ScoreKind,
    /// Cases evaluated successfully.
    pub evaluated: usize,
    /// Cases that failed.
    pub failed: usize,
    /// Number of outcomes per band label.
    pub bands: BTreeMap<String, usize>,
    /// Mean headline points over evaluated cases.
    pub mean_points: f64,
    /// Highest headline points.
    pub max_points: f64,
    /// Total warnings over evaluated cases.
    pub warnings: usize,
}

impl SummaryStats {
    fn empty(calculator: ScoreKind) -> Self {
        Self {
            calculator,
            evaluated: 0,
            failed: 0,
            bands: BTreeMap::new(),
            mean_points: 0.0,
            max_points: 0.0,
            warnings: 0,
        }
    }

    /// Share of cases that evaluated, 0.0 to 1.0.
    pub fn success_rate(&self) -> f64 {
        let total = self.evaluated + self.failed;
        if total == 0 {
            return 0.0;
        }
        self.evaluated as f64 / total as f64
    }
}

/// Compute statistics for every calculator that appears in the run, in
/// catalogue order.
pub fn compute_summary(outcomes: &[CaseOutcome], failures: &[CaseFailure]) -> Vec<SummaryStats> {
    let mut per_kind: BTreeMap<usize, SummaryStats> = BTreeMap::new();
    let position = |kind: ScoreKind| {
        ScoreKind::ALL
            .iter()
            .position(|k| *k == kind)
            .unwrap_or(usize::MAX)
    };

    let mut point_sums: BTreeMap<usize, f64> = BTreeMap::new();
    for case in outcomes {
        let kind = case.outcome.calculator;
        let key = position(kind);
        let stats = per_kind
            .entry(key)
            .or_insert_with(|| SummaryStats::empty(kind));
        stats.evaluated += 1;
        *stats.bands.entry(case.outcome.label.clone()).or_default() += 1;
        stats.warnings += case.outcome.warnings.len();
        if stats.evaluated == 1 || case.outcome.points > stats.max_points {
            stats.max_points = case.outcome.points;
        }
        *point_sums.entry(key).or_default() += case.outcome.points;
    }

    for failure in failures {
        let kind = failure.calculator;
        per_kind
            .entry(position(kind))
            .or_insert_with(|| SummaryStats::empty(kind))
            .failed += 1;
    }

    for (key, stats) in per_kind.iter_mut() {
        if stats.evaluated > 0 {
            let sum = point_sums.get(key).copied().unwrap_or(0.0);
            stats.mean_points = sum / stats.evaluated as f64;
        }
    }

    per_kind.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ScoreOutcome;

    fn case(id: &str, calculator: ScoreKind, points: f64, label: &str, warnings: usize) -> CaseOutcome {
        CaseOutcome {
            case_id: id.into(),
            case_name: id.into(),
            tags: vec![],
            outcome: ScoreOutcome {
                calculator,
                points,
                band: label.to_lowercase(),
                label: label.into(),
                rank: 0,
                description: String::new(),
                recommendation: String::new(),
                details: serde_json::Value::Null,
                warnings: vec!["w".to_string(); warnings],
            },
        }
    }

    #[test]
    fn summary_counts_bands_and_points() {
        let outcomes = vec![
            case("a", ScoreKind::Alvarado, 2.0, "Low probability", 0),
            case("b", ScoreKind::Alvarado, 8.0, "High probability", 1),
            case("c", ScoreKind::Alvarado, 3.0, "Low probability", 0),
        ];
        let summary = compute_summary(&outcomes, &[]);
        assert_eq!(summary.len(), 1);
        let stats = &summary[0];
        assert_eq!(stats.evaluated, 3);
        assert_eq!(stats.bands["Low probability"], 2);
        assert_eq!(stats.bands["High probability"], 1);
        assert!((stats.mean_points - 13.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.max_points, 8.0);
        assert_eq!(stats.warnings, 1);
        assert_eq!(stats.success_rate(), 1.0);
    }

    #[test]
    fn failures_are_counted_per_calculator() {
        let outcomes = vec![case("a", ScoreKind::Air, 4.0, "Low probability", 0)];
        let failures = vec![
            CaseFailure {
                case_id: "b".into(),
                calculator: ScoreKind::Air,
                error: "missing".into(),
                permanent: false,
            },
            CaseFailure {
                case_id: "c".into(),
                calculator: ScoreKind::ApacheII,
                error: "invalid".into(),
                permanent: true,
            },
        ];
        let summary = compute_summary(&outcomes, &failures);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].calculator, ScoreKind::Air);
        assert_eq!(summary[0].failed, 1);
        assert_eq!(summary[0].success_rate(), 0.5);
        assert_eq!(summary[1].calculator, ScoreKind::ApacheII);
        assert_eq!(summary[1].evaluated, 0);
        assert_eq!(summary[1].mean_points, 0.0);
    }

    #[test]
    fn summary_follows_catalogue_order() {
        let outcomes = vec![
            case("a", ScoreKind::Anthropometry, 24.2, "Normal weight", 0),
            case("b", ScoreKind::Alvarado, 1.0, "Low probability", 0),
        ];
        let summary = compute_summary(&outcomes, &[]);
        assert_eq!(summary[0].calculator, ScoreKind::Alvarado);
        assert_eq!(summary[1].calculator, ScoreKind::Anthropometry);
    }
}
