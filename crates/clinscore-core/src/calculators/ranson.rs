//! Ranson criteria for acute pancreatitis.
//!
//! Five criteria are assessed on admission and six more at 48 hours. Either
//! stage may be given as boolean criteria, as raw laboratory values
//! ([`AdmissionMeasurements`], [`FortyEightHourMeasurements`]), or both.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ScoreError;
use crate::model::{Band, ScoreKind, ScoreResult};
use crate::traits::{field_paths, nested_required, ScoreCalculator};
use crate::validation::{require_finite, require_non_negative};

/// Pancreatitis severity band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PancreatitisSeverity {
    Mild,
    Moderate,
    Severe,
}

impl PancreatitisSeverity {
    /// Indicative mortality for the band.
    pub fn mortality(self) -> &'static str {
        match self {
            PancreatitisSeverity::Mild => "< 1%",
            PancreatitisSeverity::Moderate => "10-20%",
            PancreatitisSeverity::Severe => "> 50%",
        }
    }
}

impl Band for PancreatitisSeverity {
    fn id(self) -> &'static str {
        match self {
            PancreatitisSeverity::Mild => "mild",
            PancreatitisSeverity::Moderate => "moderate",
            PancreatitisSeverity::Severe => "severe",
        }
    }

    fn rank(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for PancreatitisSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PancreatitisSeverity::Mild => write!(f, "Mild pancreatitis"),
            PancreatitisSeverity::Moderate => write!(f, "Moderate pancreatitis"),
            PancreatitisSeverity::Severe => write!(f, "Severe pancreatitis"),
        }
    }
}

/// Criteria assessed on admission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdmissionCriteria {
    /// Age above 55 years.
    pub age_over_55: bool,
    /// WBC above 16 000/mm³.
    pub wbc_over_16k: bool,
    /// Glucose above 200 mg/dL.
    pub glucose_over_200: bool,
    /// LDH above 350 U/L.
    pub ldh_over_350: bool,
    /// AST above 250 U/L.
    pub ast_over_250: bool,
}

impl AdmissionCriteria {
    /// Criteria met in either `self` or `other`.
    pub fn union(&self, other: &AdmissionCriteria) -> AdmissionCriteria {
        AdmissionCriteria {
            age_over_55: self.age_over_55 || other.age_over_55,
            wbc_over_16k: self.wbc_over_16k || other.wbc_over_16k,
            glucose_over_200: self.glucose_over_200 || other.glucose_over_200,
            ldh_over_350: self.ldh_over_350 || other.ldh_over_350,
            ast_over_250: self.ast_over_250 || other.ast_over_250,
        }
    }

    pub fn count(&self) -> u32 {
        [
            self.age_over_55,
            self.wbc_over_16k,
            self.glucose_over_200,
            self.ldh_over_350,
            self.ast_over_250,
        ]
        .into_iter()
        .filter(|met| *met)
        .count() as u32
    }
}

/// Criteria assessed during the first 48 hours.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FortyEightHourCriteria {
    /// Hematocrit fall above 10 percentage points.
    pub hematocrit_drop: bool,
    /// BUN rise above 5 mg/dL.
    pub bun_increase: bool,
    /// Calcium below 8 mg/dL.
    pub calcium_under_8: bool,
    /// PaO₂ below 60 mmHg.
    pub pao2_under_60: bool,
    /// Base deficit above 4 mEq/L.
    pub base_deficit_over_4: bool,
    /// Fluid sequestration above 6 L.
    pub fluid_sequestration_over_6l: bool,
}

impl FortyEightHourCriteria {
    /// Criteria met in either `self` or `other`.
    pub fn union(&self, other: &FortyEightHourCriteria) -> FortyEightHourCriteria {
        FortyEightHourCriteria {
            hematocrit_drop: self.hematocrit_drop || other.hematocrit_drop,
            bun_increase: self.bun_increase || other.bun_increase,
            calcium_under_8: self.calcium_under_8 || other.calcium_under_8,
            pao2_under_60: self.pao2_under_60 || other.pao2_under_60,
            base_deficit_over_4: self.base_deficit_over_4 || other.base_deficit_over_4,
            fluid_sequestration_over_6l: self.fluid_sequestration_over_6l
                || other.fluid_sequestration_over_6l,
        }
    }

    pub fn count(&self) -> u32 {
        [
            self.hematocrit_drop,
            self.bun_increase,
            self.calcium_under_8,
            self.pao2_under_60,
            self.base_deficit_over_4,
            self.fluid_sequestration_over_6l,
        ]
        .into_iter()
        .filter(|met| *met)
        .count() as u32
    }
}

/// Raw admission values. Defaults meet no criterion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdmissionMeasurements {
    pub age_years: f64,
    /// Per mm³.
    pub wbc_per_mm3: f64,
    /// mg/dL.
    pub glucose_mg_dl: f64,
    /// U/L.
    pub ldh_u_l: f64,
    /// U/L.
    pub ast_u_l: f64,
}

impl AdmissionMeasurements {
    const FIELDS: &'static [&'static str] =
        &["age_years", "wbc_per_mm3", "glucose_mg_dl", "ldh_u_l", "ast_u_l"];

    /// Convert the measurements into criteria. Thresholds are strict.
    pub fn criteria(&self) -> Result<AdmissionCriteria, ScoreError> {
        Ok(AdmissionCriteria {
            age_over_55: require_non_negative("age_years", self.age_years)? > 55.0,
            wbc_over_16k: require_non_negative("wbc_per_mm3", self.wbc_per_mm3)? > 16_000.0,
            glucose_over_200: require_non_negative("glucose_mg_dl", self.glucose_mg_dl)? > 200.0,
            ldh_over_350: require_non_negative("ldh_u_l", self.ldh_u_l)? > 350.0,
            ast_over_250: require_non_negative("ast_u_l", self.ast_u_l)? > 250.0,
        })
    }
}

impl Default for AdmissionMeasurements {
    fn default() -> Self {
        Self {
            age_years: 40.0,
            wbc_per_mm3: 8_000.0,
            glucose_mg_dl: 100.0,
            ldh_u_l: 200.0,
            ast_u_l: 30.0,
        }
    }
}

/// Raw values at 48 hours. Defaults meet no criterion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FortyEightHourMeasurements {
    /// Percentage points lost since admission.
    pub hematocrit_drop_pct: f64,
    /// mg/dL gained since admission.
    pub bun_increase_mg_dl: f64,
    pub calcium_mg_dl: f64,
    pub pao2_mmhg: f64,
    /// mEq/L.
    pub base_deficit_meq_l: f64,
    /// Litres.
    pub fluid_sequestration_l: f64,
}

impl FortyEightHourMeasurements {
    const FIELDS: &'static [&'static str] = &[
        "hematocrit_drop_pct",
        "bun_increase_mg_dl",
        "calcium_mg_dl",
        "pao2_mmhg",
        "base_deficit_meq_l",
        "fluid_sequestration_l",
    ];

    /// Convert the measurements into criteria. Thresholds are strict.
    pub fn criteria(&self) -> Result<FortyEightHourCriteria, ScoreError> {
        Ok(FortyEightHourCriteria {
            hematocrit_drop: require_finite("hematocrit_drop_pct", self.hematocrit_drop_pct)?
                > 10.0,
            bun_increase: require_finite("bun_increase_mg_dl", self.bun_increase_mg_dl)? > 5.0,
            calcium_under_8: require_non_negative("calcium_mg_dl", self.calcium_mg_dl)? < 8.0,
            pao2_under_60: require_non_negative("pao2_mmhg", self.pao2_mmhg)? < 60.0,
            base_deficit_over_4: require_finite("base_deficit_meq_l", self.base_deficit_meq_l)?
                > 4.0,
            fluid_sequestration_over_6l: require_non_negative(
                "fluid_sequestration_l",
                self.fluid_sequestration_l,
            )? > 6.0,
        })
    }
}

impl Default for FortyEightHourMeasurements {
    fn default() -> Self {
        Self {
            hematocrit_drop_pct: 0.0,
            bun_increase_mg_dl: 0.0,
            calcium_mg_dl: 9.0,
            pao2_mmhg: 95.0,
            base_deficit_meq_l: 0.0,
            fluid_sequestration_l: 0.0,
        }
    }
}

/// Count the Ranson criteria.
///
/// Bands: 0-2 mild, 3-5 moderate, 6 and above severe.
pub fn compute_ranson(
    admission: &AdmissionCriteria,
    forty_eight_hour: &FortyEightHourCriteria,
) -> ScoreResult<PancreatitisSeverity> {
    let total = admission.count() + forty_eight_hour.count();
    match total {
        0..=2 => ScoreResult::new(
            total,
            PancreatitisSeverity::Mild,
            "Low risk of severe complications. Mortality < 1%.",
            "Conservative treatment with standard monitoring.",
        ),
        3..=5 => ScoreResult::new(
            total,
            PancreatitisSeverity::Moderate,
            "Moderate risk of complications. Mortality 10-20%.",
            "Close monitoring. Consider ICU admission if the patient deteriorates.",
        ),
        _ => ScoreResult::new(
            total,
            PancreatitisSeverity::Severe,
            "High risk of severe complications and death. Mortality > 50%.",
            "Immediate ICU admission with intensive support.",
        ),
    }
}

/// Both criteria groups.
///
/// A criterion counts when its flag is set or its raw value, if given,
/// crosses the threshold.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RansonInput {
    pub admission: AdmissionCriteria,
    pub forty_eight_hour: FortyEightHourCriteria,
    pub admission_values: Option<AdmissionMeasurements>,
    pub forty_eight_hour_values: Option<FortyEightHourMeasurements>,
}

impl RansonInput {
    /// Admission criteria after folding in the raw values.
    pub fn admission_criteria(&self) -> Result<AdmissionCriteria, ScoreError> {
        match &self.admission_values {
            Some(values) => Ok(self.admission.union(&values.criteria()?)),
            None => Ok(self.admission.clone()),
        }
    }

    /// 48-hour criteria after folding in the raw values.
    pub fn forty_eight_hour_criteria(&self) -> Result<FortyEightHourCriteria, ScoreError> {
        match &self.forty_eight_hour_values {
            Some(values) => Ok(self.forty_eight_hour.union(&values.criteria()?)),
            None => Ok(self.forty_eight_hour.clone()),
        }
    }
}

/// [`ScoreCalculator`] wrapper for [`compute_ranson`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Ranson;

impl ScoreCalculator for Ranson {
    type Input = RansonInput;
    type Output = ScoreResult<PancreatitisSeverity>;

    fn kind(&self) -> ScoreKind {
        ScoreKind::Ranson
    }

    fn compute(&self, input: &RansonInput) -> Result<Self::Output, ScoreError> {
        Ok(compute_ranson(
            &input.admission_criteria()?,
            &input.forty_eight_hour_criteria()?,
        ))
    }

    fn required_paths(&self, raw: &serde_json::Value) -> Vec<String> {
        nested_required(
            raw,
            &[
                ("admission_values", AdmissionMeasurements::FIELDS),
                ("forty_eight_hour_values", FortyEightHourMeasurements::FIELDS),
            ],
        )
    }

    fn known_fields(&self) -> Vec<String> {
        let mut fields = field_paths(&AdmissionCriteria::default(), "admission");
        fields.extend(field_paths(&FortyEightHourCriteria::default(), "forty_eight_hour"));
        fields.extend(field_paths(&AdmissionMeasurements::default(), "admission_values"));
        fields.extend(field_paths(
            &FortyEightHourMeasurements::default(),
            "forty_eight_hour_values",
        ));
        fields
    }
}
