//! Adult Appendicitis Score (AAS).

use serde::{Deserialize, Serialize};

use crate::error::ScoreError;
use crate::model::{RiskBand, ScoreKind, ScoreResult, Sex};
use crate::traits::ScoreCalculator;
use crate::validation::{check_range, require_non_negative, require_percentage};

/// Abdominal guarding. Only one tier can apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardingTier {
    #[default]
    None,
    Mild,
    ModerateOrSevere,
}

/// Symptom duration at the time CRP was drawn; selects the CRP table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymptomOnset {
    Under24h,
    Over24h,
}

/// Findings and laboratory values for the AAS.
///
/// `crp_under_24h` and `crp_over_24h` mirror the two checkboxes of the entry
/// form; exactly one of them must be set whenever a CRP value is given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AasInput {
    /// Pain in the right lower quadrant.
    pub rlq_pain: bool,
    /// Relocation of pain to the right lower quadrant.
    pub pain_relocation: bool,
    pub guarding: GuardingTier,
    pub sex: Option<Sex>,
    pub age_years: f64,
    /// Leukocyte count, ×10⁹/L.
    pub leukocytes: f64,
    /// Neutrophil proportion, %.
    pub neutrophils_pct: f64,
    /// C-reactive protein, mg/L.
    pub crp_mg_l: f64,
    pub crp_under_24h: bool,
    pub crp_over_24h: bool,
}

impl Default for AasInput {
    fn default() -> Self {
        Self {
            rlq_pain: false,
            pain_relocation: false,
            guarding: GuardingTier::None,
            sex: None,
            age_years: 0.0,
            leukocytes: 7.0,
            neutrophils_pct: 60.0,
            crp_mg_l: 0.0,
            crp_under_24h: false,
            crp_over_24h: false,
        }
    }
}

impl AasInput {
    /// Resolve the CRP timing flags.
    ///
    /// Returns `None` when neither flag is set and CRP is at its zero baseline.
    pub fn symptom_onset(&self) -> Result<Option<SymptomOnset>, ScoreError> {
        match (self.crp_under_24h, self.crp_over_24h) {
            (true, true) => Err(ScoreError::AmbiguousCriteria(
                "both crp_under_24h and crp_over_24h are set".into(),
            )),
            (true, false) => Ok(Some(SymptomOnset::Under24h)),
            (false, true) => Ok(Some(SymptomOnset::Over24h)),
            (false, false) if self.crp_mg_l > 0.0 => Err(ScoreError::AmbiguousCriteria(
                "CRP given without crp_under_24h or crp_over_24h".into(),
            )),
            (false, false) => Ok(None),
        }
    }
}

/// Points contributed by sex and age.
///
/// Male always scores 3. Female scores 1 from 16 to 49 years, 3 from 50, and
/// 0 below 16. Unknown sex scores 0.
pub fn sex_age_points(sex: Option<Sex>, age_years: f64) -> u32 {
    match sex {
        Some(Sex::Male) => 3,
        Some(Sex::Female) if age_years >= 50.0 => 3,
        Some(Sex::Female) if age_years >= 16.0 => 1,
        _ => 0,
    }
}

fn crp_points(onset: Option<SymptomOnset>, crp: f64) -> u32 {
    match onset {
        Some(SymptomOnset::Under24h) => match crp {
            c if c >= 50.0 => 2,
            c if c >= 10.0 => 1,
            _ => 0,
        },
        Some(SymptomOnset::Over24h) => match crp {
            c if c >= 100.0 => 2,
            c if c >= 50.0 => 1,
            _ => 0,
        },
        None => 0,
    }
}

/// Compute the AAS.
///
/// Bands: 0-10 low, 11-15 intermediate, 16 and above high.
pub fn compute_aas(input: &AasInput) -> Result<ScoreResult<RiskBand>, ScoreError> {
    let age = require_non_negative("age_years", input.age_years)?;
    let leukocytes = require_non_negative("leukocytes", input.leukocytes)?;
    let neutrophils = require_percentage("neutrophils_pct", input.neutrophils_pct)?;
    let crp = require_non_negative("crp_mg_l", input.crp_mg_l)?;
    let onset = input.symptom_onset()?;

    let mut warnings = Vec::new();
    check_range("age_years", age, 0.0, 120.0, "years", &mut warnings);
    check_range("leukocytes", leukocytes, 0.5, 100.0, "×10⁹/L", &mut warnings);
    check_range("crp_mg_l", crp, 0.0, 500.0, "mg/L", &mut warnings);

    let mut total = 0;
    if input.rlq_pain {
        total += 2;
    }
    if input.pain_relocation {
        total += 2;
    }
    total += match input.guarding {
        GuardingTier::None => 0,
        GuardingTier::Mild => 2,
        GuardingTier::ModerateOrSevere => 4,
    };
    total += sex_age_points(input.sex, age);
    total += match leukocytes {
        l if l > 15.0 => 2,
        l if l >= 11.0 => 1,
        _ => 0,
    };
    total += match neutrophils {
        n if n >= 85.0 => 2,
        n if n >= 70.0 => 1,
        _ => 0,
    };
    total += crp_points(onset, crp);

    let result = match aas_band(total) {
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

/// Band for an AAS total: 0-10 low, 11-15 intermediate, 16 and above high.
pub fn aas_band(total: u32) -> RiskBand {
    match total {
        0..=10 => RiskBand::Low,
        11..=15 => RiskBand::Intermediate,
        _ => RiskBand::High,
    }
}

/// [`ScoreCalculator`] wrapper for [`compute_aas`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Aas;

impl ScoreCalculator for Aas {
    type Input = AasInput;
    type Output = ScoreResult<RiskBand>;

    fn kind(&self) -> ScoreKind {
        ScoreKind::Aas
    }

    fn compute(&self, input: &AasInput) -> Result<Self::Output, ScoreError> {
        compute_aas(input)
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &["age_years", "leukocytes", "neutrophils_pct", "crp_mg_l"]
    }
}
