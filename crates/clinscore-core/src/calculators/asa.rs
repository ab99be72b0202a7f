//! ASA physical status classification.
//!
//! A lookup rather than a score: each class carries a fixed description,
//! examples and an indicative perioperative mortality.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ScoreError;
use crate::model::ScoreKind;
use crate::traits::{Assessment, ScoreCalculator};

/// ASA class I to VI.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum AsaClass {
    #[default]
    #[serde(rename = "I")]
    I,
    #[serde(rename = "II")]
    II,
    #[serde(rename = "III")]
    III,
    #[serde(rename = "IV")]
    IV,
    #[serde(rename = "V")]
    V,
    #[serde(rename = "VI")]
    VI,
}

impl AsaClass {
    /// Class number, 1 to 6.
    pub fn number(self) -> u8 {
        self as u8 + 1
    }

    fn roman(self) -> &'static str {
        match self {
            AsaClass::I => "I",
            AsaClass::II => "II",
            AsaClass::III => "III",
            AsaClass::IV => "IV",
            AsaClass::V => "V",
            AsaClass::VI => "VI",
        }
    }
}

impl fmt::Display for AsaClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ASA {}", self.roman())
    }
}

impl FromStr for AsaClass {
    type Err = String;

    /// Accepts `"III"`, `"ASA III"`, `"ASA3"`, `"asa-3"` and `"3"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        let stripped = upper
            .strip_prefix("ASA")
            .unwrap_or(&upper)
            .trim_start_matches([' ', '-', '_']);
        match stripped {
            "I" | "1" => Ok(AsaClass::I),
            "II" | "2" => Ok(AsaClass::II),
            "III" | "3" => Ok(AsaClass::III),
            "IV" | "4" => Ok(AsaClass::IV),
            "V" | "5" => Ok(AsaClass::V),
            "VI" | "6" => Ok(AsaClass::VI),
            _ => Err(format!("unknown ASA class: {s}")),
        }
    }
}

/// Input for the ASA lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AsaInput {
    pub classification: AsaClass,
    /// Emergency surgery; adds the `E` suffix.
    pub emergency: bool,
}

/// Result of the ASA lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AsaResult {
    pub classification: AsaClass,
    pub emergency: bool,
    /// `"ASA III"` or `"ASA IIIE"`.
    pub label: String,
    pub description: String,
    pub details: String,
    /// Indicative perioperative mortality, e.g. `"1.8%"`.
    pub mortality: String,
    pub recommendation: String,
}

struct AsaEntry {
    description: &'static str,
    details: &'static str,
    mortality: &'static str,
}

fn entry(class: AsaClass) -> AsaEntry {
    match class {
        AsaClass::I => AsaEntry {
            description: "Normal healthy patient",
            details: "No organic, physiological, biochemical or psychiatric disturbance. Excludes extremes of age.",
            mortality: "< 0.1%",
        },
        AsaClass::II => AsaEntry {
            description: "Patient with mild systemic disease",
            details: "Mild to moderate systemic disease without substantive functional limitation. E.g. controlled hypertension, uncomplicated diabetes, smoking.",
            mortality: "0.2%",
        },
        AsaClass::III => AsaEntry {
            description: "Patient with severe systemic disease",
            details: "Severe systemic disease with definite functional limitation. E.g. diabetes with complications, poorly controlled hypertension, moderate COPD.",
            mortality: "1.8%",
        },
        AsaClass::IV => AsaEntry {
            description: "Patient with severe systemic disease that is a constant threat to life",
            details: "E.g. severe heart failure, sepsis, decompensated diabetes.",
            mortality: "7.8%",
        },
        AsaClass::V => AsaEntry {
            description: "Moribund patient not expected to survive without the operation",
            details: "E.g. ruptured aortic aneurysm, massive trauma.",
            mortality: "9.4%",
        },
        AsaClass::VI => AsaEntry {
            description: "Declared brain-dead patient whose organs are being removed for donor purposes",
            details: "Organ procurement only.",
            mortality: "N/A",
        },
    }
}

/// Look up an ASA class.
pub fn compute_asa(classification: AsaClass, emergency: bool) -> AsaResult {
    let e = entry(classification);
    let label = if emergency {
        format!("{classification}E")
    } else {
        classification.to_string()
    };
    let recommendation = if emergency {
        "Emergency surgery: perioperative risk is increased by the urgency of the procedure."
    } else {
        "Use alongside procedure-specific risk to plan anaesthesia and postoperative care."
    };

    AsaResult {
        classification,
        emergency,
        label,
        description: e.description.to_string(),
        details: e.details.to_string(),
        mortality: e.mortality.to_string(),
        recommendation: recommendation.to_string(),
    }
}

impl Assessment for AsaResult {
    fn points(&self) -> f64 {
        f64::from(self.classification.number())
    }

    fn band_id(&self) -> &str {
        match self.classification {
            AsaClass::I => "asa_i",
            AsaClass::II => "asa_ii",
            AsaClass::III => "asa_iii",
            AsaClass::IV => "asa_iv",
            AsaClass::V => "asa_v",
            AsaClass::VI => "asa_vi",
        }
    }

    fn label(&self) -> String {
        self.label.clone()
    }

    fn rank(&self) -> u8 {
        self.classification as u8
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn recommendation(&self) -> &str {
        &self.recommendation
    }

    fn details(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// [`ScoreCalculator`] wrapper for [`compute_asa`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Asa;

impl ScoreCalculator for Asa {
    type Input = AsaInput;
    type Output = AsaResult;

    fn kind(&self) -> ScoreKind {
        ScoreKind::Asa
    }

    fn compute(&self, input: &AsaInput) -> Result<AsaResult, ScoreError> {
        Ok(compute_asa(input.classification, input.emergency))
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &["classification"]
    }
}
