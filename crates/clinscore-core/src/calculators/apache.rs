//! APACHE II severity-of-illness score with predicted hospital mortality.
//!
//! Each physiologic variable maps through a U-shaped step table to 0-4
//! points; the tables are evaluated top-down with lower-inclusive thresholds.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ScoreError;
use crate::model::{Band, RangeWarning, ScoreKind};
use crate::traits::{Assessment, ScoreCalculator};
use crate::validation::{check_range, require_non_negative, require_positive};

/// How the patient was admitted; selects the chronic-health weight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdmissionType {
    /// Non-operative or emergency post-operative admission.
    Emergency,
    /// Elective post-operative admission.
    #[default]
    Elective,
}

/// APACHE II risk band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApacheBand {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl ApacheBand {
    pub fn from_total(total: u32) -> Self {
        match total {
            0..=4 => ApacheBand::Low,
            5..=14 => ApacheBand::Moderate,
            15..=24 => ApacheBand::High,
            _ => ApacheBand::VeryHigh,
        }
    }
}

impl Band for ApacheBand {
    fn id(self) -> &'static str {
        match self {
            ApacheBand::Low => "low",
            ApacheBand::Moderate => "moderate",
            ApacheBand::High => "high",
            ApacheBand::VeryHigh => "very_high",
        }
    }

    fn rank(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for ApacheBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApacheBand::Low => write!(f, "Low risk"),
            ApacheBand::Moderate => write!(f, "Moderate risk"),
            ApacheBand::High => write!(f, "High risk"),
            ApacheBand::VeryHigh => write!(f, "Very high risk"),
        }
    }
}

/// Worst values of the first 24 hours. Defaults are mid-normal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApacheInput {
    /// Core temperature, °C.
    pub temperature_c: f64,
    /// Mean arterial pressure, mmHg.
    pub mean_arterial_pressure: f64,
    /// Beats per minute.
    pub heart_rate: f64,
    /// Breaths per minute.
    pub respiratory_rate: f64,
    /// mmHg.
    pub pao2_mmhg: f64,
    pub arterial_ph: f64,
    /// mEq/L.
    pub sodium: f64,
    /// mEq/L.
    pub potassium: f64,
    /// mg/dL.
    pub creatinine: f64,
    /// Doubles creatinine points from 1.5 mg/dL upwards.
    pub acute_renal_failure: bool,
    /// %.
    pub hematocrit: f64,
    /// ×10³/mm³.
    pub wbc: f64,
    /// Glasgow Coma Scale, 3-15.
    pub gcs: u8,
    pub age_years: f64,
    /// History of severe organ insufficiency or immunocompromise.
    pub chronic_health: bool,
    pub admission_type: AdmissionType,
}

impl Default for ApacheInput {
    fn default() -> Self {
        Self {
            temperature_c: 37.0,
            mean_arterial_pressure: 90.0,
            heart_rate: 80.0,
            respiratory_rate: 16.0,
            pao2_mmhg: 90.0,
            arterial_ph: 7.4,
            sodium: 140.0,
            potassium: 4.0,
            creatinine: 1.0,
            acute_renal_failure: false,
            hematocrit: 40.0,
            wbc: 8.0,
            gcs: 15,
            age_years: 0.0,
            chronic_health: false,
            admission_type: AdmissionType::Elective,
        }
    }
}

/// APACHE II total with its components and predicted mortality.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApacheResult {
    pub total_points: u32,
    /// Acute physiology score including the GCS term.
    pub physiology_points: u32,
    pub age_points: u32,
    pub chronic_health_points: u32,
    /// Percent.
    pub predicted_mortality_pct: f64,
    pub band: ApacheBand,
    pub description: String,
    pub recommendation: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<RangeWarning>,
}

/// Walk a descending step table; `fallback` applies below the last step.
fn step_points(value: f64, steps: &[(f64, u32)], fallback: u32) -> u32 {
    steps
        .iter()
        .find(|(threshold, _)| value >= *threshold)
        .map_or(fallback, |(_, points)| *points)
}

pub fn temperature_points(celsius: f64) -> u32 {
    step_points(
        celsius,
        &[(41.0, 4), (39.0, 3), (38.5, 1), (36.0, 0), (34.0, 1), (32.0, 2), (30.0, 3)],
        4,
    )
}

pub fn mean_arterial_pressure_points(mmhg: f64) -> u32 {
    step_points(mmhg, &[(160.0, 4), (130.0, 3), (110.0, 2), (70.0, 0), (50.0, 2)], 4)
}

pub fn heart_rate_points(bpm: f64) -> u32 {
    step_points(
        bpm,
        &[(180.0, 4), (140.0, 3), (110.0, 2), (70.0, 0), (55.0, 2), (40.0, 3)],
        4,
    )
}

pub fn respiratory_rate_points(rate: f64) -> u32 {
    step_points(
        rate,
        &[(50.0, 4), (35.0, 3), (25.0, 1), (12.0, 0), (10.0, 1), (6.0, 2)],
        4,
    )
}

pub fn oxygenation_points(pao2: f64) -> u32 {
    step_points(pao2, &[(70.0, 0), (61.0, 1), (55.0, 3)], 4)
}

pub fn ph_points(ph: f64) -> u32 {
    step_points(
        ph,
        &[(7.7, 4), (7.6, 3), (7.5, 1), (7.33, 0), (7.25, 2), (7.15, 3)],
        4,
    )
}

pub fn sodium_points(sodium: f64) -> u32 {
    step_points(
        sodium,
        &[
            (180.0, 4),
            (160.0, 3),
            (155.0, 2),
            (150.0, 1),
            (130.0, 0),
            (120.0, 2),
            (111.0, 3),
        ],
        4,
    )
}

pub fn potassium_points(potassium: f64) -> u32 {
    step_points(
        potassium,
        &[(7.0, 4), (6.0, 3), (5.5, 1), (3.5, 0), (3.0, 1), (2.5, 2)],
        4,
    )
}

pub fn creatinine_points(creatinine: f64, acute_renal_failure: bool) -> u32 {
    let base = step_points(creatinine, &[(3.5, 4), (2.0, 3), (1.5, 2), (0.6, 0)], 2);
    if acute_renal_failure && creatinine >= 1.5 {
        base * 2
    } else {
        base
    }
}

pub fn hematocrit_points(hematocrit: f64) -> u32 {
    step_points(
        hematocrit,
        &[(60.0, 4), (50.0, 2), (46.0, 1), (30.0, 0), (20.0, 2)],
        4,
    )
}

pub fn wbc_points(wbc: f64) -> u32 {
    step_points(wbc, &[(40.0, 4), (20.0, 2), (15.0, 1), (3.0, 0), (1.0, 2)], 4)
}

pub fn age_points(age_years: f64) -> u32 {
    step_points(age_years, &[(75.0, 6), (65.0, 5), (55.0, 3), (45.0, 2)], 0)
}

pub fn chronic_health_points(chronic_health: bool, admission: AdmissionType) -> u32 {
    match (chronic_health, admission) {
        (false, _) => 0,
        (true, AdmissionType::Emergency) => 5,
        (true, AdmissionType::Elective) => 2,
    }
}

/// Predicted hospital mortality in percent for an APACHE II total.
pub fn predicted_mortality(total: u32) -> f64 {
    let logit = -3.517 + 0.146 * f64::from(total);
    100.0 * logit.exp() / (1.0 + logit.exp())
}

fn validate(input: &ApacheInput) -> Result<Vec<RangeWarning>, ScoreError> {
    require_positive("temperature_c", input.temperature_c)?;
    require_non_negative("mean_arterial_pressure", input.mean_arterial_pressure)?;
    require_non_negative("heart_rate", input.heart_rate)?;
    require_non_negative("respiratory_rate", input.respiratory_rate)?;
    require_non_negative("pao2_mmhg", input.pao2_mmhg)?;
    require_positive("arterial_ph", input.arterial_ph)?;
    require_positive("sodium", input.sodium)?;
    require_positive("potassium", input.potassium)?;
    require_non_negative("creatinine", input.creatinine)?;
    require_non_negative("hematocrit", input.hematocrit)?;
    require_non_negative("wbc", input.wbc)?;
    require_non_negative("age_years", input.age_years)?;
    if !(3..=15).contains(&input.gcs) {
        return Err(ScoreError::invalid(
            "gcs",
            format!("must be between 3 and 15 (got {})", input.gcs),
        ));
    }

    let mut warnings = Vec::new();
    let ranges: [(&str, f64, f64, f64, &str); 12] = [
        ("temperature_c", input.temperature_c, 25.0, 45.0, "°C"),
        ("mean_arterial_pressure", input.mean_arterial_pressure, 20.0, 250.0, "mmHg"),
        ("heart_rate", input.heart_rate, 20.0, 250.0, "bpm"),
        ("respiratory_rate", input.respiratory_rate, 0.0, 80.0, "/min"),
        ("pao2_mmhg", input.pao2_mmhg, 20.0, 600.0, "mmHg"),
        ("arterial_ph", input.arterial_ph, 6.5, 8.0, ""),
        ("sodium", input.sodium, 100.0, 200.0, "mEq/L"),
        ("potassium", input.potassium, 1.5, 10.0, "mEq/L"),
        ("creatinine", input.creatinine, 0.1, 20.0, "mg/dL"),
        ("hematocrit", input.hematocrit, 10.0, 75.0, "%"),
        ("wbc", input.wbc, 0.1, 200.0, "×10³/mm³"),
        ("age_years", input.age_years, 0.0, 120.0, "years"),
    ];
    for (field, value, low, high, unit) in ranges {
        check_range(field, value, low, high, unit, &mut warnings);
    }
    Ok(warnings)
}

/// Compute the APACHE II score.
///
/// Bands: 0-4 low, 5-14 moderate, 15-24 high, 25 and above very high.
pub fn compute_apache_ii(input: &ApacheInput) -> Result<ApacheResult, ScoreError> {
    let warnings = validate(input)?;

    let physiology_points = temperature_points(input.temperature_c)
        + mean_arterial_pressure_points(input.mean_arterial_pressure)
        + heart_rate_points(input.heart_rate)
        + respiratory_rate_points(input.respiratory_rate)
        + oxygenation_points(input.pao2_mmhg)
        + ph_points(input.arterial_ph)
        + sodium_points(input.sodium)
        + potassium_points(input.potassium)
        + creatinine_points(input.creatinine, input.acute_renal_failure)
        + hematocrit_points(input.hematocrit)
        + wbc_points(input.wbc)
        + u32::from(15 - input.gcs);
    let age_points = age_points(input.age_years);
    let chronic_health_points = chronic_health_points(input.chronic_health, input.admission_type);
    let total_points = physiology_points + age_points + chronic_health_points;

    let band = ApacheBand::from_total(total_points);
    let (description, recommendation) = match band {
        ApacheBand::Low => (
            "Very low hospital mortality.",
            "Standard monitoring. Favourable prognosis.",
        ),
        ApacheBand::Moderate => (
            "Low to moderate hospital mortality.",
            "Close monitoring. Consider intermediate care.",
        ),
        ApacheBand::High => (
            "High hospital mortality.",
            "Intensive care with continuous monitoring.",
        ),
        ApacheBand::VeryHigh => (
            "Very high hospital mortality.",
            "Maximal intensive care. Guarded prognosis.",
        ),
    };

    Ok(ApacheResult {
        total_points,
        physiology_points,
        age_points,
        chronic_health_points,
        predicted_mortality_pct: predicted_mortality(total_points),
        band,
        description: description.to_string(),
        recommendation: recommendation.to_string(),
        warnings,
    })
}

impl Assessment for ApacheResult {
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

/// [`ScoreCalculator`] wrapper for [`compute_apache_ii`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ApacheII;

impl ScoreCalculator for ApacheII {
    type Input = ApacheInput;
    type Output = ApacheResult;

    fn kind(&self) -> ScoreKind {
        ScoreKind::ApacheII
    }

    fn compute(&self, input: &ApacheInput) -> Result<ApacheResult, ScoreError> {
        compute_apache_ii(input)
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &[
            "temperature_c",
            "mean_arterial_pressure",
            "heart_rate",
            "respiratory_rate",
            "pao2_mmhg",
            "arterial_ph",
            "sodium",
            "potassium",
            "creatinine",
            "hematocrit",
            "wbc",
            "gcs",
            "age_years",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_midpoint_scores_zero() {
        let input = ApacheInput {
            age_years: 30.0,
            ..Default::default()
        };
        let result = compute_apache_ii(&input).unwrap();
        assert_eq!(result.total_points, 0);
        assert_eq!(result.band, ApacheBand::Low);
        assert!((result.predicted_mortality_pct - 2.88).abs() < 0.01);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn step_tables_are_u_shaped() {
        assert_eq!(temperature_points(41.0), 4);
        assert_eq!(temperature_points(37.0), 0);
        assert_eq!(temperature_points(35.0), 1);
        assert_eq!(temperature_points(29.0), 4);
        assert_eq!(heart_rate_points(45.0), 3);
        assert_eq!(heart_rate_points(30.0), 4);
        assert_eq!(ph_points(7.33), 0);
        assert_eq!(ph_points(7.32), 2);
        assert_eq!(sodium_points(112.0), 3);
        assert_eq!(potassium_points(2.4), 4);
        assert_eq!(wbc_points(0.5), 4);
        assert_eq!(oxygenation_points(56.0), 3);
    }

    #[test]
    fn age_bands() {
        assert_eq!(age_points(44.0), 0);
        assert_eq!(age_points(45.0), 2);
        assert_eq!(age_points(60.0), 3);
        assert_eq!(age_points(70.0), 5);
        assert_eq!(age_points(80.0), 6);
    }

    #[test]
    fn acute_renal_failure_doubles_high_creatinine() {
        assert_eq!(creatinine_points(2.5, false), 3);
        assert_eq!(creatinine_points(2.5, true), 6);
        assert_eq!(creatinine_points(1.0, true), 0);
        assert_eq!(creatinine_points(0.4, true), 2);
    }

    #[test]
    fn chronic_health_depends_on_admission() {
        assert_eq!(chronic_health_points(false, AdmissionType::Emergency), 0);
        assert_eq!(chronic_health_points(true, AdmissionType::Emergency), 5);
        assert_eq!(chronic_health_points(true, AdmissionType::Elective), 2);
    }

    #[test]
    fn gcs_contributes_fifteen_minus_gcs() {
        let input = ApacheInput {
            gcs: 9,
            age_years: 30.0,
            ..Default::default()
        };
        let result = compute_apache_ii(&input).unwrap();
        assert_eq!(result.physiology_points, 6);
        assert_eq!(result.band, ApacheBand::Moderate);
    }

    #[test]
    fn gcs_out_of_range_is_rejected() {
        let input = ApacheInput {
            gcs: 2,
            ..Default::default()
        };
        assert_eq!(compute_apache_ii(&input).unwrap_err().field(), Some("gcs"));

        let input = ApacheInput {
            gcs: 16,
            ..Default::default()
        };
        assert!(compute_apache_ii(&input).is_err());
    }

    #[test]
    fn negative_age_is_rejected() {
        let input = ApacheInput {
            age_years: -1.0,
            ..Default::default()
        };
        assert_eq!(
            compute_apache_ii(&input).unwrap_err().field(),
            Some("age_years")
        );
    }

    #[test]
    fn critically_ill_patient_is_very_high() {
        let input = ApacheInput {
            temperature_c: 39.5,
            mean_arterial_pressure: 45.0,
            heart_rate: 150.0,
            respiratory_rate: 38.0,
            pao2_mmhg: 58.0,
            arterial_ph: 7.2,
            creatinine: 2.2,
            acute_renal_failure: true,
            wbc: 22.0,
            gcs: 10,
            age_years: 70.0,
            chronic_health: true,
            admission_type: AdmissionType::Emergency,
            ..Default::default()
        };
        let result = compute_apache_ii(&input).unwrap();
        // 3 + 4 + 3 + 3 + 3 + 3 + 6 + 2 + 5 physiology, 5 age, 5 chronic
        assert_eq!(result.physiology_points, 32);
        assert_eq!(result.total_points, 42);
        assert_eq!(result.band, ApacheBand::VeryHigh);
        assert!(result.predicted_mortality_pct > 90.0);
    }

    #[test]
    fn mortality_is_monotonic() {
        let mut previous = predicted_mortality(0);
        for total in 1..=71 {
            let current = predicted_mortality(total);
            assert!(current > previous);
            previous = current;
        }
    }
}
