//! Anthropometry: body-mass index, Du Bois body surface area and Robinson
//! ideal body weight.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ScoreError;
use crate::model::{Band, RangeWarning, ScoreKind, Sex};
use crate::traits::{Assessment, ScoreCalculator};
use crate::validation::{check_range, require_positive};

/// WHO body-mass-index category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    ObesityI,
    ObesityII,
    ObesityIII,
}

impl BmiCategory {
    /// Category for a BMI value. Thresholds are lower-inclusive.
    pub fn from_bmi(bmi: f64) -> Self {
        match bmi {
            b if b < 18.5 => BmiCategory::Underweight,
            b if b < 25.0 => BmiCategory::Normal,
            b if b < 30.0 => BmiCategory::Overweight,
            b if b < 35.0 => BmiCategory::ObesityI,
            b if b < 40.0 => BmiCategory::ObesityII,
            _ => BmiCategory::ObesityIII,
        }
    }
}

impl Band for BmiCategory {
    fn id(self) -> &'static str {
        match self {
            BmiCategory::Underweight => "underweight",
            BmiCategory::Normal => "normal",
            BmiCategory::Overweight => "overweight",
            BmiCategory::ObesityI => "obesity_i",
            BmiCategory::ObesityII => "obesity_ii",
            BmiCategory::ObesityIII => "obesity_iii",
        }
    }

    /// Risk order: normal weight is the lowest; underweight ranks with
    /// overweight.
    fn rank(self) -> u8 {
        match self {
            BmiCategory::Normal => 0,
            BmiCategory::Underweight | BmiCategory::Overweight => 1,
            BmiCategory::ObesityI => 2,
            BmiCategory::ObesityII => 3,
            BmiCategory::ObesityIII => 4,
        }
    }
}

impl fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BmiCategory::Underweight => write!(f, "Underweight"),
            BmiCategory::Normal => write!(f, "Normal weight"),
            BmiCategory::Overweight => write!(f, "Overweight"),
            BmiCategory::ObesityI => write!(f, "Obesity class I"),
            BmiCategory::ObesityII => write!(f, "Obesity class II"),
            BmiCategory::ObesityIII => write!(f, "Obesity class III"),
        }
    }
}

/// BMI with its interpretation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BmiResult {
    /// kg/m².
    pub bmi: f64,
    pub category: BmiCategory,
    pub description: String,
    pub comorbidity_risk: String,
    pub recommendations: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<RangeWarning>,
}

fn validate_body(weight_kg: f64, height_cm: f64) -> Result<Vec<RangeWarning>, ScoreError> {
    require_positive("weight_kg", weight_kg)?;
    require_positive("height_cm", height_cm)?;
    let mut warnings = Vec::new();
    check_range("weight_kg", weight_kg, 2.0, 400.0, "kg", &mut warnings);
    check_range("height_cm", height_cm, 40.0, 250.0, "cm", &mut warnings);
    Ok(warnings)
}

/// Body-mass index, `weight / height_m²`.
pub fn compute_bmi(weight_kg: f64, height_cm: f64) -> Result<BmiResult, ScoreError> {
    let warnings = validate_body(weight_kg, height_cm)?;
    let height_m = height_cm / 100.0;
    let bmi = weight_kg / (height_m * height_m);
    let category = BmiCategory::from_bmi(bmi);

    let (description, comorbidity_risk) = match category {
        BmiCategory::Underweight => (
            "Below normal weight",
            "Risk of malnutrition and related health problems",
        ),
        BmiCategory::Normal => ("Adequate weight for height", "Low risk of comorbidities"),
        BmiCategory::Overweight => ("Above normal weight", "Increased risk of comorbidities"),
        BmiCategory::ObesityI => ("Mild obesity", "Moderate risk of comorbidities"),
        BmiCategory::ObesityII => ("Moderate obesity", "High risk of comorbidities"),
        BmiCategory::ObesityIII => ("Morbid obesity", "Very high risk of comorbidities"),
    };

    let mut recommendations: Vec<&str> = match category {
        BmiCategory::Underweight => vec![
            "Refer to a nutritionist for healthy weight gain",
            "Investigate causes of low weight",
            "Consider nutritional supplementation",
        ],
        BmiCategory::Normal => vec![
            "Maintain current weight with a balanced diet",
            "Keep up regular physical activity",
            "Monitor weight periodically",
        ],
        BmiCategory::Overweight => vec![
            "Adopt a balanced, calorie-reduced diet",
            "Increase regular physical activity",
            "Monitor cardiovascular risk factors",
        ],
        BmiCategory::ObesityI | BmiCategory::ObesityII | BmiCategory::ObesityIII => vec![
            "Specialist medical follow-up",
            "Structured weight-loss programme",
            "Assess associated comorbidities",
        ],
    };
    if category == BmiCategory::ObesityIII {
        recommendations.push("Consider bariatric surgery referral if indicated");
    }

    Ok(BmiResult {
        bmi,
        category,
        description: description.to_string(),
        comorbidity_risk: comorbidity_risk.to_string(),
        recommendations: recommendations.into_iter().map(String::from).collect(),
        warnings,
    })
}

/// Du Bois body surface area in m².
pub fn compute_bsa(weight_kg: f64, height_cm: f64) -> Result<f64, ScoreError> {
    validate_body(weight_kg, height_cm)?;
    Ok(0.007184 * weight_kg.powf(0.425) * height_cm.powf(0.725))
}

/// Shortest height, in cm (five feet), the Robinson formula covers.
pub const ROBINSON_MIN_HEIGHT_CM: f64 = 152.4;

/// Robinson ideal body weight in kg.
///
/// The formula adds weight per inch over five feet, so heights below
/// [`ROBINSON_MIN_HEIGHT_CM`] are rejected.
pub fn compute_ideal_weight(height_cm: f64, sex: Sex) -> Result<f64, ScoreError> {
    require_positive("height_cm", height_cm)?;
    if height_cm < ROBINSON_MIN_HEIGHT_CM {
        return Err(ScoreError::invalid(
            "height_cm",
            format!("Robinson ideal weight needs at least {ROBINSON_MIN_HEIGHT_CM} cm (got {height_cm})"),
        ));
    }
    let inches_over_five_feet = (height_cm - 152.4) / 2.54;
    Ok(match sex {
        Sex::Male => 52.0 + 1.9 * inches_over_five_feet,
        Sex::Female => 49.0 + 1.7 * inches_over_five_feet,
    })
}

/// Body measurements. Defaults describe a 70 kg, 170 cm adult.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnthropometryInput {
    pub weight_kg: f64,
    pub height_cm: f64,
    /// Needed only for the ideal weight.
    pub sex: Option<Sex>,
}

impl Default for AnthropometryInput {
    fn default() -> Self {
        Self {
            weight_kg: 70.0,
            height_cm: 170.0,
            sex: None,
        }
    }
}

/// BMI, BSA and, when sex is known and the height is in range, ideal weight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnthropometryResult {
    pub bmi: BmiResult,
    /// m².
    pub bsa_m2: f64,
    /// kg.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ideal_weight_kg: Option<f64>,
    /// Why a requested ideal weight was left out.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<RangeWarning>,
}

pub fn compute_anthropometry(
    input: &AnthropometryInput,
) -> Result<AnthropometryResult, ScoreError> {
    let bmi = compute_bmi(input.weight_kg, input.height_cm)?;
    let bsa_m2 = compute_bsa(input.weight_kg, input.height_cm)?;
    let mut warnings = Vec::new();
    let ideal_weight_kg = match input.sex {
        Some(_) if input.height_cm < ROBINSON_MIN_HEIGHT_CM => {
            warnings.push(RangeWarning {
                field: "height_cm".to_string(),
                value: input.height_cm,
                expected: format!("{ROBINSON_MIN_HEIGHT_CM}-250 cm for the Robinson ideal weight"),
            });
            None
        }
        Some(sex) => Some(compute_ideal_weight(input.height_cm, sex)?),
        None => None,
    };

    Ok(AnthropometryResult {
        bmi,
        bsa_m2,
        ideal_weight_kg,
        warnings,
    })
}

impl Assessment for AnthropometryResult {
    /// BMI rounded to one decimal.
    fn points(&self) -> f64 {
        (self.bmi.bmi * 10.0).round() / 10.0
    }

    fn band_id(&self) -> &str {
        self.bmi.category.id()
    }

    fn label(&self) -> String {
        self.bmi.category.to_string()
    }

    fn rank(&self) -> u8 {
        self.bmi.category.rank()
    }

    fn description(&self) -> &str {
        &self.bmi.description
    }

    fn recommendation(&self) -> &str {
        self.bmi
            .recommendations
            .first()
            .map(String::as_str)
            .unwrap_or_default()
    }

    fn warnings(&self) -> Vec<String> {
        self.bmi
            .warnings
            .iter()
            .chain(&self.warnings)
            .map(|w| w.to_string())
            .collect()
    }

    fn details(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// [`ScoreCalculator`] wrapper for [`compute_anthropometry`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Anthropometry;

impl ScoreCalculator for Anthropometry {
    type Input = AnthropometryInput;
    type Output = AnthropometryResult;

    fn kind(&self) -> ScoreKind {
        ScoreKind::Anthropometry
    }

    fn compute(&self, input: &AnthropometryInput) -> Result<AnthropometryResult, ScoreError> {
        compute_anthropometry(input)
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &["weight_kg", "height_cm"]
    }
}
