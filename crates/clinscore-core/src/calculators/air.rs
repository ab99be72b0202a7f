//! Appendicitis Inflammatory Response (AIR) score.

use serde::{Deserialize, Serialize};

use crate::error::ScoreError;
use crate::model::{RiskBand, ScoreKind, ScoreResult};
use crate::traits::ScoreCalculator;
use crate::validation::{check_range, require_non_negative, require_percentage, require_positive};

/// Rebound tenderness or muscular defence. Only one tier can apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReboundTier {
    #[default]
    None,
    Mild,
    Moderate,
    Severe,
}

impl ReboundTier {
    fn points(self) -> u32 {
        match self {
            ReboundTier::None => 0,
            ReboundTier::Mild => 1,
            ReboundTier::Moderate => 2,
            ReboundTier::Severe => 3,
        }
    }
}

/// Findings and laboratory values for the AIR score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirInput {
    pub vomiting: bool,
    /// Pain in the right iliac fossa.
    pub rlq_pain: bool,
    pub rebound: ReboundTier,
    /// Body temperature in °C.
    pub temperature_c: f64,
    /// Leukocyte count, ×10⁹/L.
    pub leukocytes: f64,
    /// Neutrophil proportion, %.
    pub neutrophils_pct: f64,
    /// C-reactive protein, mg/L.
    pub crp_mg_l: f64,
}

impl Default for AirInput {
    fn default() -> Self {
        Self {
            vomiting: false,
            rlq_pain: false,
            rebound: ReboundTier::None,
            temperature_c: 36.5,
            leukocytes: 7.0,
            neutrophils_pct: 60.0,
            crp_mg_l: 0.0,
        }
    }
}

/// Compute the AIR score.
///
/// Leukocyte and CRP tiers are half-open (`[10, 15)` and `[10, 50)`), so every
/// value lands in exactly one tier. Bands: 0-4 low, 5-8 intermediate, 9-12 high.
pub fn compute_air(input: &AirInput) -> Result<ScoreResult<RiskBand>, ScoreError> {
    let temperature = require_positive("temperature_c", input.temperature_c)?;
    let leukocytes = require_non_negative("leukocytes", input.leukocytes)?;
    let neutrophils = require_percentage("neutrophils_pct", input.neutrophils_pct)?;
    let crp = require_non_negative("crp_mg_l", input.crp_mg_l)?;

    let mut warnings = Vec::new();
    check_range("temperature_c", temperature, 25.0, 45.0, "°C", &mut warnings);
    check_range("leukocytes", leukocytes, 0.5, 100.0, "×10⁹/L", &mut warnings);
    check_range("crp_mg_l", crp, 0.0, 500.0, "mg/L", &mut warnings);

    let mut total = 0;
    if input.vomiting {
        total += 1;
    }
    if input.rlq_pain {
        total += 1;
    }
    total += input.rebound.points();
    if temperature >= 38.5 {
        total += 1;
    }
    total += match leukocytes {
        l if l >= 15.0 => 2,
        l if l >= 10.0 => 1,
        _ => 0,
    };
    if neutrophils >= 85.0 {
        total += 2;
    }
    total += match crp {
        c if c >= 50.0 => 2,
        c if c >= 10.0 => 1,
        _ => 0,
    };

    let result = match air_band(total) {
        RiskBand::Low => ScoreResult::new(
            total,
            RiskBand::Low,
            "Appendicitis unlikely. Consider alternative diagnoses.",
            "Clinical observation or discharge with return instructions.",
        ),
        RiskBand::Intermediate => ScoreResult::new(
            total,
            RiskBand::Intermediate,
            "Appendicitis possible. Imaging recommended.",
            "Request ultrasound or computed tomography.",
        ),
        RiskBand::High => ScoreResult::new(
            total,
            RiskBand::High,
            "Appendicitis very likely. Surgical indication.",
            "Urgent surgical assessment.",
        ),
    };
    Ok(result.with_warnings(warnings))
}

/// Band for an AIR total: 0-4 low, 5-8 intermediate, 9 and above high.
pub fn air_band(total: u32) -> RiskBand {
    match total {
        0..=4 => RiskBand::Low,
        5..=8 => RiskBand::Intermediate,
        _ => RiskBand::High,
    }
}

/// [`ScoreCalculator`] wrapper for [`compute_air`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Air;

impl ScoreCalculator for Air {
    type Input = AirInput;
    type Output = ScoreResult<RiskBand>;

    fn kind(&self) -> ScoreKind {
        ScoreKind::Air
    }

    fn compute(&self, input: &AirInput) -> Result<Self::Output, ScoreError> {
        compute_air(input)
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &["temperature_c", "leukocytes", "neutrophils_pct", "crp_mg_l"]
    }
}
