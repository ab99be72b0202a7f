//! Tokyo Guidelines diagnostic criteria for acute cholecystitis.
//!
//! Suspected diagnosis requires one local sign and one systemic sign, or
//! positive imaging. This calculator reports every suspected case as grade I
//! with a notice; grading against the grade II and III criteria is done by
//! [`Tg18Severity`](crate::calculators::tg18::Tg18Severity).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ScoreError;
use crate::model::{Band, ScoreKind};
use crate::traits::{Assessment, ScoreCalculator};

/// Notice attached to every suspected result.
pub const SEVERITY_NOTICE: &str =
    "Severity reported as grade I (mild); grade II and III criteria are evaluated by tg18-severity";

/// Local signs of inflammation (criterion A).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalSigns {
    pub murphy_sign: bool,
    /// Mass, pain or tenderness in the right upper quadrant.
    pub ruq_mass: bool,
}

impl LocalSigns {
    pub fn any(&self) -> bool {
        self.murphy_sign || self.ruq_mass
    }
}

/// Systemic signs of inflammation (criterion B).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemicSigns {
    pub fever: bool,
    pub elevated_crp: bool,
    pub elevated_wbc: bool,
}

impl SystemicSigns {
    pub fn any(&self) -> bool {
        self.fever || self.elevated_crp || self.elevated_wbc
    }
}

/// Diagnostic outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokyoDiagnosis {
    NotSuspected,
    /// Suspected cholecystitis, grade I.
    Mild,
}

impl Band for TokyoDiagnosis {
    fn id(self) -> &'static str {
        match self {
            TokyoDiagnosis::NotSuspected => "not_suspected",
            TokyoDiagnosis::Mild => "mild",
        }
    }

    fn rank(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for TokyoDiagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokyoDiagnosis::NotSuspected => write!(f, "Cholecystitis unlikely"),
            TokyoDiagnosis::Mild => write!(f, "Mild acute cholecystitis"),
        }
    }
}

/// Flat input record; the entry form shows the six findings together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokyoInput {
    pub murphy_sign: bool,
    pub ruq_mass: bool,
    pub fever: bool,
    pub elevated_crp: bool,
    pub elevated_wbc: bool,
    /// Imaging findings characteristic of acute cholecystitis (criterion C).
    pub imaging_findings: bool,
}

impl TokyoInput {
    pub fn local(&self) -> LocalSigns {
        LocalSigns {
            murphy_sign: self.murphy_sign,
            ruq_mass: self.ruq_mass,
        }
    }

    pub fn systemic(&self) -> SystemicSigns {
        SystemicSigns {
            fever: self.fever,
            elevated_crp: self.elevated_crp,
            elevated_wbc: self.elevated_wbc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokyoResult {
    pub suspected: bool,
    pub diagnosis: TokyoDiagnosis,
    pub local_criteria: bool,
    pub systemic_criteria: bool,
    pub imaging_criteria: bool,
    pub description: String,
    pub recommendation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

impl TokyoResult {
    /// Number of criteria groups (A, B, C) met.
    pub fn criteria_met(&self) -> u32 {
        [self.local_criteria, self.systemic_criteria, self.imaging_criteria]
            .into_iter()
            .filter(|met| *met)
            .count() as u32
    }
}

/// Apply the diagnostic rule `(A and B) or C`.
pub fn compute_tokyo(
    local: &LocalSigns,
    systemic: &SystemicSigns,
    imaging_positive: bool,
) -> TokyoResult {
    let local_criteria = local.any();
    let systemic_criteria = systemic.any();
    let suspected = (local_criteria && systemic_criteria) || imaging_positive;

    let (diagnosis, description, recommendation, notice) = if suspected {
        (
            TokyoDiagnosis::Mild,
            "Diagnostic criteria met without signs of severity.",
            "Initial conservative treatment. Early laparoscopic cholecystectomy (24-72h) when feasible.",
            Some(SEVERITY_NOTICE.to_string()),
        )
    } else {
        (
            TokyoDiagnosis::NotSuspected,
            "Insufficient criteria for acute cholecystitis.",
            "Consider other diagnoses. Clinical reassessment and further workup if needed.",
            None,
        )
    };

    TokyoResult {
        suspected,
        diagnosis,
        local_criteria,
        systemic_criteria,
        imaging_criteria: imaging_positive,
        description: description.to_string(),
        recommendation: recommendation.to_string(),
        notice,
    }
}

impl Assessment for TokyoResult {
    fn points(&self) -> f64 {
        f64::from(self.criteria_met())
    }

    fn band_id(&self) -> &str {
        self.diagnosis.id()
    }

    fn label(&self) -> String {
        self.diagnosis.to_string()
    }

    fn rank(&self) -> u8 {
        self.diagnosis.rank()
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn recommendation(&self) -> &str {
        &self.recommendation
    }

    fn warnings(&self) -> Vec<String> {
        self.notice.iter().cloned().collect()
    }

    fn details(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// [`ScoreCalculator`] wrapper for [`compute_tokyo`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Tokyo;

impl ScoreCalculator for Tokyo {
    type Input = TokyoInput;
    type Output = TokyoResult;

    fn kind(&self) -> ScoreKind {
        ScoreKind::Tokyo
    }

    fn compute(&self, input: &TokyoInput) -> Result<TokyoResult, ScoreError> {
        Ok(compute_tokyo(
            &input.local(),
            &input.systemic(),
            input.imaging_findings,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_present_is_not_suspected() {
        let result = compute_tokyo(&LocalSigns::default(), &SystemicSigns::default(), false);
        assert!(!result.suspected);
        assert_eq!(result.diagnosis, TokyoDiagnosis::NotSuspected);
        assert!(result.notice.is_none());
        assert!(result.warnings().is_empty());
    }

    #[test]
    fn local_without_systemic_is_not_enough() {
        let local = LocalSigns {
            murphy_sign: true,
            ruq_mass: true,
        };
        let result = compute_tokyo(&local, &SystemicSigns::default(), false);
        assert!(!result.suspected);
        assert_eq!(result.criteria_met(), 1);
    }

    #[test]
    fn local_and_systemic_is_suspected_mild() {
        let local = LocalSigns {
            murphy_sign: true,
            ..Default::default()
        };
        let systemic = SystemicSigns {
            elevated_crp: true,
            ..Default::default()
        };
        let result = compute_tokyo(&local, &systemic, false);
        assert!(result.suspected);
        assert_eq!(result.diagnosis, TokyoDiagnosis::Mild);
        assert_eq!(result.notice.as_deref(), Some(SEVERITY_NOTICE));
    }

    #[test]
    fn imaging_alone_is_suspected() {
        let result = compute_tokyo(&LocalSigns::default(), &SystemicSigns::default(), true);
        assert!(result.suspected);
        assert_eq!(result.warnings(), vec![SEVERITY_NOTICE.to_string()]);
    }

    #[test]
    fn severe_presentation_still_reports_mild() {
        let input = TokyoInput {
            murphy_sign: true,
            ruq_mass: true,
            fever: true,
            elevated_crp: true,
            elevated_wbc: true,
            imaging_findings: true,
        };
        let result = Tokyo.compute(&input).unwrap();
        assert_eq!(result.diagnosis, TokyoDiagnosis::Mild);
        assert_eq!(result.criteria_met(), 3);
        assert!(result.notice.is_some());
    }
}
