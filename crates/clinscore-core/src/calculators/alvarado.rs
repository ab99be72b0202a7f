//! Alvarado score for acute appendicitis.

use serde::{Deserialize, Serialize};

use crate::error::ScoreError;
use crate::model::{RiskBand, ScoreKind, ScoreResult};
use crate::traits::ScoreCalculator;

/// Findings for the Alvarado score. Every field defaults to absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlvaradoInput {
    /// Pain migrating to the right iliac fossa.
    pub migratory_pain: bool,
    pub anorexia: bool,
    pub nausea_vomiting: bool,
    /// Right lower quadrant tenderness.
    pub rlq_tenderness: bool,
    pub rebound_pain: bool,
    /// Temperature of 37.3 °C or more.
    pub fever: bool,
    /// Leukocytes above 10 000/mm³.
    pub leukocytosis: bool,
    /// Neutrophils above 75%.
    pub left_shift: bool,
}

/// Sum the Alvarado criteria and map to a band.
///
/// Bands: 0-4 low, 5-6 intermediate, 7-10 high.
pub fn compute_alvarado(input: &AlvaradoInput) -> ScoreResult<RiskBand> {
    let criteria: [(bool, u32); 8] = [
        (input.migratory_pain, 1),
        (input.anorexia, 1),
        (input.nausea_vomiting, 1),
        (input.rlq_tenderness, 2),
        (input.rebound_pain, 1),
        (input.fever, 1),
        (input.leukocytosis, 2),
        (input.left_shift, 1),
    ];
    let total: u32 = criteria
        .iter()
        .filter(|(present, _)| *present)
        .map(|(_, points)| points)
        .sum();

    match alvarado_band(total) {
        RiskBand::Low => ScoreResult::new(
            total,
            RiskBand::Low,
            "Appendicitis unlikely. Consider other diagnoses.",
            "Clinical observation and reassessment. Consider discharge with return instructions.",
        ),
        RiskBand::Intermediate => ScoreResult::new(
            total,
            RiskBand::Intermediate,
            "Appendicitis suspected. Further investigation required.",
            "Complementary imaging (CT, ultrasound) and serial reassessment. Consider admission for observation.",
        ),
        RiskBand::High => ScoreResult::new(
            total,
            RiskBand::High,
            "Appendicitis highly probable.",
            "Surgical indication. Prepare for urgent appendectomy.",
        ),
    }
}

/// Band for an Alvarado total: 0-4 low, 5-6 intermediate, 7 and above high.
pub fn alvarado_band(total: u32) -> RiskBand {
    match total {
        0..=4 => RiskBand::Low,
        5..=6 => RiskBand::Intermediate,
        _ => RiskBand::High,
    }
}

/// [`ScoreCalculator`] wrapper for [`compute_alvarado`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Alvarado;

impl ScoreCalculator for Alvarado {
    type Input = AlvaradoInput;
    type Output = ScoreResult<RiskBand>;

    fn kind(&self) -> ScoreKind {
        ScoreKind::Alvarado
    }

    fn compute(&self, input: &AlvaradoInput) -> Result<Self::Output, ScoreError> {
        Ok(compute_alvarado(input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_absent_is_zero_and_low() {
        let result = compute_alvarado(&AlvaradoInput::default());
        assert_eq!(result.total_points, 0);
        assert_eq!(result.band, RiskBand::Low);
    }

    #[test]
    fn rlq_and_leukocytosis_stay_low() {
        let input = AlvaradoInput {
            rlq_tenderness: true,
            leukocytosis: true,
            ..Default::default()
        };
        let result = compute_alvarado(&input);
        assert_eq!(result.total_points, 4);
        assert_eq!(result.band, RiskBand::Low);
    }

    #[test]
    fn migratory_pain_crosses_into_intermediate() {
        let input = AlvaradoInput {
            rlq_tenderness: true,
            leukocytosis: true,
            migratory_pain: true,
            ..Default::default()
        };
        let result = compute_alvarado(&input);
        assert_eq!(result.total_points, 5);
        assert_eq!(result.band, RiskBand::Intermediate);
    }

    #[test]
    fn seven_points_is_high() {
        let input = AlvaradoInput {
            rlq_tenderness: true,
            leukocytosis: true,
            migratory_pain: true,
            fever: true,
            anorexia: true,
            ..Default::default()
        };
        let result = compute_alvarado(&input);
        assert_eq!(result.total_points, 7);
        assert_eq!(result.band, RiskBand::High);
        assert!(result.recommendation.contains("appendectomy"));
    }

    #[test]
    fn every_finding_gives_ten() {
        let input = AlvaradoInput {
            migratory_pain: true,
            anorexia: true,
            nausea_vomiting: true,
            rlq_tenderness: true,
            rebound_pain: true,
            fever: true,
            leukocytosis: true,
            left_shift: true,
        };
        assert_eq!(compute_alvarado(&input).total_points, 10);
    }

    #[test]
    fn identical_input_gives_identical_output() {
        let input = AlvaradoInput {
            fever: true,
            rebound_pain: true,
            ..Default::default()
        };
        assert_eq!(compute_alvarado(&input), compute_alvarado(&input));
    }
}
