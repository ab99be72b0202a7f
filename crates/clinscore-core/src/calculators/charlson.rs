//! Charlson Comorbidity Index with age adjustment.
//!
//! Nineteen weighted conditions plus one point per decade from 50 (capped at
//! four). Where a condition has a mild and a severe form only the severe one
//! counts: complicated diabetes, severe liver disease and metastatic tumour
//! replace their milder counterparts.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ScoreError;
use crate::model::{Band, RangeWarning, ScoreKind};
use crate::traits::{Assessment, ScoreCalculator};
use crate::validation::{check_range, require_non_negative};

/// Comorbidity burden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharlsonBand {
    None,
    Mild,
    Moderate,
    Severe,
}

impl CharlsonBand {
    pub fn from_points(points: u32) -> Self {
        match points {
            0 => CharlsonBand::None,
            1..=2 => CharlsonBand::Mild,
            3..=4 => CharlsonBand::Moderate,
            _ => CharlsonBand::Severe,
        }
    }
}

impl Band for CharlsonBand {
    fn id(self) -> &'static str {
        match self {
            CharlsonBand::None => "none",
            CharlsonBand::Mild => "mild",
            CharlsonBand::Moderate => "moderate",
            CharlsonBand::Severe => "severe",
        }
    }

    fn rank(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for CharlsonBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CharlsonBand::None => write!(f, "No comorbidity"),
            CharlsonBand::Mild => write!(f, "Mild comorbidity"),
            CharlsonBand::Moderate => write!(f, "Moderate comorbidity"),
            CharlsonBand::Severe => write!(f, "Severe comorbidity"),
        }
    }
}

/// Age and comorbidities. Defaults describe a 40-year-old without any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharlsonInput {
    pub age_years: f64,
    // 1 point
    pub myocardial_infarction: bool,
    pub congestive_heart_failure: bool,
    pub peripheral_vascular_disease: bool,
    pub cerebrovascular_disease: bool,
    pub dementia: bool,
    pub chronic_pulmonary_disease: bool,
    pub connective_tissue_disease: bool,
    pub peptic_ulcer_disease: bool,
    pub mild_liver_disease: bool,
    pub diabetes_uncomplicated: bool,
    // 2 points
    pub diabetes_with_end_organ_damage: bool,
    pub hemiplegia: bool,
    pub moderate_severe_renal_disease: bool,
    /// Solid tumour without metastasis.
    pub solid_tumor: bool,
    pub leukemia: bool,
    pub lymphoma: bool,
    // 3 points
    pub moderate_severe_liver_disease: bool,
    // 6 points
    pub metastatic_solid_tumor: bool,
    pub aids: bool,
}

impl Default for CharlsonInput {
    fn default() -> Self {
        Self {
            age_years: 40.0,
            myocardial_infarction: false,
            congestive_heart_failure: false,
            peripheral_vascular_disease: false,
            cerebrovascular_disease: false,
            dementia: false,
            chronic_pulmonary_disease: false,
            connective_tissue_disease: false,
            peptic_ulcer_disease: false,
            mild_liver_disease: false,
            diabetes_uncomplicated: false,
            diabetes_with_end_organ_damage: false,
            hemiplegia: false,
            moderate_severe_renal_disease: false,
            solid_tumor: false,
            leukemia: false,
            lymphoma: false,
            moderate_severe_liver_disease: false,
            metastatic_solid_tumor: false,
            aids: false,
        }
    }
}

impl CharlsonInput {
    /// Conditions that score, with their weights, after the severity
    /// hierarchy is applied.
    pub fn weighted_conditions(&self) -> Vec<(&'static str, u32)> {
        let table = [
            (self.myocardial_infarction, "myocardial_infarction", 1),
            (self.congestive_heart_failure, "congestive_heart_failure", 1),
            (self.peripheral_vascular_disease, "peripheral_vascular_disease", 1),
            (self.cerebrovascular_disease, "cerebrovascular_disease", 1),
            (self.dementia, "dementia", 1),
            (self.chronic_pulmonary_disease, "chronic_pulmonary_disease", 1),
            (self.connective_tissue_disease, "connective_tissue_disease", 1),
            (self.peptic_ulcer_disease, "peptic_ulcer_disease", 1),
            (
                self.mild_liver_disease && !self.moderate_severe_liver_disease,
                "mild_liver_disease",
                1,
            ),
            (
                self.diabetes_uncomplicated && !self.diabetes_with_end_organ_damage,
                "diabetes_uncomplicated",
                1,
            ),
            (self.diabetes_with_end_organ_damage, "diabetes_with_end_organ_damage", 2),
            (self.hemiplegia, "hemiplegia", 2),
            (self.moderate_severe_renal_disease, "moderate_severe_renal_disease", 2),
            (
                self.solid_tumor && !self.metastatic_solid_tumor,
                "solid_tumor",
                2,
            ),
            (self.leukemia, "leukemia", 2),
            (self.lymphoma, "lymphoma", 2),
            (self.moderate_severe_liver_disease, "moderate_severe_liver_disease", 3),
            (self.metastatic_solid_tumor, "metastatic_solid_tumor", 6),
            (self.aids, "aids", 6),
        ];
        table
            .into_iter()
            .filter(|(present, _, _)| *present)
            .map(|(_, name, weight)| (name, weight))
            .collect()
    }
}

/// Age points: one per decade from 50, at most four.
pub fn age_points(age_years: f64) -> u32 {
    match age_years {
        a if a >= 80.0 => 4,
        a if a >= 70.0 => 3,
        a if a >= 60.0 => 2,
        a if a >= 50.0 => 1,
        _ => 0,
    }
}

/// Estimated 10-year survival in percent, `0.983^(e^(0.9 * index))`.
pub fn ten_year_survival_pct(index: u32) -> f64 {
    let survival = 0.983f64.powf((0.9 * f64::from(index)).exp()) * 100.0;
    (survival * 10.0).round() / 10.0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CharlsonResult {
    /// Comorbidity plus age points.
    pub total_points: u32,
    pub comorbidity_points: u32,
    pub age_points: u32,
    pub band: CharlsonBand,
    pub ten_year_survival_pct: f64,
    /// Conditions that contributed points.
    pub conditions: Vec<String>,
    pub description: String,
    pub recommendation: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<RangeWarning>,
}

pub fn compute_charlson(input: &CharlsonInput) -> Result<CharlsonResult, ScoreError> {
    let age = require_non_negative("age_years", input.age_years)?;
    let mut warnings = Vec::new();
    check_range("age_years", age, 0.0, 120.0, "years", &mut warnings);

    let weighted = input.weighted_conditions();
    let comorbidity_points: u32 = weighted.iter().map(|(_, w)| w).sum();
    let age_points = age_points(age);
    let total_points = comorbidity_points + age_points;
    let band = CharlsonBand::from_points(total_points);

    let (description, recommendation) = match band {
        CharlsonBand::None => (
            "No comorbidity burden.",
            "Comorbidity does not limit treatment options.",
        ),
        CharlsonBand::Mild => (
            "Mild comorbidity burden.",
            "Standard perioperative assessment.",
        ),
        CharlsonBand::Moderate => (
            "Moderate comorbidity burden.",
            "Optimise comorbidities before elective surgery.",
        ),
        CharlsonBand::Severe => (
            "Severe comorbidity burden with reduced long-term survival.",
            "Weigh less invasive options and discuss goals of care.",
        ),
    };

    Ok(CharlsonResult {
        total_points,
        comorbidity_points,
        age_points,
        band,
        ten_year_survival_pct: ten_year_survival_pct(total_points),
        conditions: weighted.into_iter().map(|(n, _)| n.to_string()).collect(),
        description: description.to_string(),
        recommendation: recommendation.to_string(),
        warnings,
    })
}

impl Assessment for CharlsonResult {
    fn points(&self) -> f64 {
        f64::from(self.total_points)
    }

    fn band_id(&self) -> &str {
        self.band.id()
    }

    fn label(&self) -> String {
        self.band.to_string()
    }

    fn rank(&self) -> u8 {
        self.band.rank()
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn recommendation(&self) -> &str {
        &self.recommendation
    }

    fn warnings(&self) -> Vec<String> {
        self.warnings.iter().map(|w| w.to_string()).collect()
    }

    fn details(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// [`ScoreCalculator`] wrapper for [`compute_charlson`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Charlson;

impl ScoreCalculator for Charlson {
    type Input = CharlsonInput;
    type Output = CharlsonResult;

    fn kind(&self) -> ScoreKind {
        ScoreKind::Charlson
    }

    fn compute(&self, input: &CharlsonInput) -> Result<CharlsonResult, ScoreError> {
        compute_charlson(input)
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &["age_years"]
    }
}
