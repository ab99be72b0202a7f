//! Pediatric Appendicitis Score (PAS).

use serde::{Deserialize, Serialize};

use crate::error::ScoreError;
use crate::model::{RiskBand, ScoreKind, ScoreResult};
use crate::traits::ScoreCalculator;

/// Findings for the PAS. Every field defaults to absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasInput {
    /// Temperature of 38 °C or more.
    pub fever: bool,
    pub anorexia: bool,
    pub nausea_vomiting: bool,
    pub migratory_pain: bool,
    pub rlq_tenderness: bool,
    /// Pain on coughing, percussion or hopping.
    pub cough_percussion_hop_pain: bool,
    /// Leukocytes above 10 000/mm³.
    pub leukocytosis: bool,
    /// Neutrophils above 75%.
    pub neutrophilia: bool,
}

/// Compute the PAS.
///
/// Bands: 0-3 low, 4-6 intermediate, 7-10 high.
pub fn compute_pas(input: &PasInput) -> ScoreResult<RiskBand> {
    let criteria: [(bool, u32); 8] = [
        (input.fever, 1),
        (input.anorexia, 1),
        (input.nausea_vomiting, 1),
        (input.migratory_pain, 1),
        (input.rlq_tenderness, 2),
        (input.cough_percussion_hop_pain, 2),
        (input.leukocytosis, 1),
        (input.neutrophilia, 1),
    ];
    let total: u32 = criteria
        .iter()
        .filter(|(present, _)| *present)
        .map(|(_, points)| points)
        .sum();

    match pas_band(total) {
        RiskBand::Low => ScoreResult::new(
            total,
            RiskBand::Low,
            "Low risk of appendicitis.",
            "Observation or discharge with safety-net advice.",
        ),
        RiskBand::Intermediate => ScoreResult::new(
            total,
            RiskBand::Intermediate,
            "Intermediate risk of appendicitis.",
            "Imaging recommended, ultrasound first.",
        ),
        RiskBand::High => ScoreResult::new(
            total,
            RiskBand::High,
            "High risk of appendicitis.",
            "Surgical indication. Request pediatric surgical review.",
        ),
    }
}

/// Band for a PAS total.
pub fn pas_band(total: u32) -> RiskBand {
    match total {
        0..=3 => RiskBand::Low,
        4..=6 => RiskBand::Intermediate,
        _ => RiskBand::High,
    }
}

/// [`ScoreCalculator`] wrapper for [`compute_pas`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Pas;

impl ScoreCalculator for Pas {
    type Input = PasInput;
    type Output = ScoreResult<RiskBand>;

    fn kind(&self) -> ScoreKind {
        ScoreKind::Pas
    }

    fn compute(&self, input: &PasInput) -> Result<Self::Output, ScoreError> {
        Ok(compute_pas(input))
    }
}
