//! Review of an appendicitis management plan against the WSES recommendations.
//!
//! Each check returns a [`ManagementReview`] of errors (practice the
//! guideline recommends against) and warnings (deviations that need a
//! documented reason). [`review_management`] runs all of them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ScoreError;
use crate::model::{Band, RangeWarning, ScoreKind};
use crate::traits::{Assessment, ScoreCalculator};
use crate::validation::{check_range, require_non_negative};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppendicitisClass {
    #[default]
    Uncomplicated,
    Complicated,
}

/// The planned or recorded management of one episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagementPlan {
    pub classification: AppendicitisClass,
    pub age_years: f64,
    pub surgical_treatment: bool,
    /// Single preoperative dose without postoperative continuation.
    pub single_dose_antibiotic: bool,
    pub routine_drainage: bool,
    /// Drain placed for a specific intraoperative finding.
    pub exceptional_drainage: bool,
    pub drainage_reason: Option<String>,
    pub interval_appendectomy: bool,
    pub appendicolith: bool,
    pub suspected_neoplasm: bool,
    pub recurrence_after_conservative: bool,
    pub patient_preference: bool,
    pub periappendiceal_abscess: bool,
    pub phlegmon: bool,
    pub colonoscopy_planned: bool,
}

impl Default for ManagementPlan {
    fn default() -> Self {
        Self {
            classification: AppendicitisClass::Uncomplicated,
            age_years: 30.0,
            surgical_treatment: false,
            single_dose_antibiotic: false,
            routine_drainage: false,
            exceptional_drainage: false,
            drainage_reason: None,
            interval_appendectomy: false,
            appendicolith: false,
            suspected_neoplasm: false,
            recurrence_after_conservative: false,
            patient_preference: false,
            periappendiceal_abscess: false,
            phlegmon: false,
            colonoscopy_planned: false,
        }
    }
}

impl ManagementPlan {
    fn over_40(&self) -> bool {
        self.age_years > 40.0
    }
}

/// Findings of one or more checks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagementReview {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ManagementReview {
    /// No errors. Warnings alone do not make a plan non-concordant.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn merge(&mut self, other: ManagementReview) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

/// Routine drains are contraindicated; an exceptional drain needs a reason.
pub fn check_drainage(plan: &ManagementPlan) -> ManagementReview {
    let mut review = ManagementReview::default();
    if plan.routine_drainage {
        review.errors.push(
            "Routine abdominal drainage is not recommended: it does not reduce abscess or \
             wound infection and prolongs the stay"
                .to_string(),
        );
    }
    let has_reason = plan
        .drainage_reason
        .as_deref()
        .is_some_and(|r| !r.trim().is_empty());
    if plan.exceptional_drainage && !has_reason {
        review.warnings.push(
            "Drain placed without a documented reason; reserve for residual abscess, \
             inadequate haemostasis or gross faecal contamination"
                .to_string(),
        );
    }
    review
}

/// Uncomplicated appendicitis treated surgically gets one preoperative dose.
pub fn check_antibiotic(plan: &ManagementPlan) -> ManagementReview {
    let mut review = ManagementReview::default();
    if plan.classification == AppendicitisClass::Uncomplicated
        && plan.surgical_treatment
        && !plan.single_dose_antibiotic
    {
        review.warnings.push(
            "Give a single preoperative dose (cefazolin 2 g IV + metronidazole 500 mg IV, \
             30-60 min before incision) with no postoperative continuation"
                .to_string(),
        );
    }
    review
}

/// Interval appendectomy only with an indication.
pub fn check_interval_appendectomy(plan: &ManagementPlan) -> ManagementReview {
    let mut review = ManagementReview::default();
    let indicated = plan.appendicolith
        || plan.suspected_neoplasm
        || plan.recurrence_after_conservative
        || plan.patient_preference
        || plan.over_40();
    if plan.interval_appendectomy && !indicated {
        review.warnings.push(
            "Routine interval appendectomy is not recommended (recurrence 7-38%); \
             consider it only for age over 40, suspected neoplasm, appendicolith, \
             recurrence or patient preference"
                .to_string(),
        );
    }
    review
}

/// Colonic evaluation after an abscess or phlegmon in patients over 40.
pub fn check_colonoscopy(plan: &ManagementPlan) -> ManagementReview {
    let mut review = ManagementReview::default();
    if plan.over_40()
        && (plan.periappendiceal_abscess || plan.phlegmon)
        && !plan.colonoscopy_planned
    {
        review.warnings.push(
            "Plan colonoscopy or CT colonography 6-8 weeks after resolution \
             (neoplasia risk 10-30% over age 40)"
                .to_string(),
        );
    }
    review
}

/// Every check, errors and warnings in check order.
pub fn review_management(plan: &ManagementPlan) -> ManagementReview {
    let mut review = ManagementReview::default();
    for check in [
        check_drainage,
        check_antibiotic,
        check_interval_appendectomy,
        check_colonoscopy,
    ] {
        review.merge(check(plan));
    }
    review
}

/// Overall verdict on a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Concordance {
    Concordant,
    Advisory,
    Contraindicated,
}

impl Band for Concordance {
    fn id(self) -> &'static str {
        match self {
            Concordance::Concordant => "concordant",
            Concordance::Advisory => "advisory",
            Concordance::Contraindicated => "contraindicated",
        }
    }

    fn rank(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Concordance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Concordance::Concordant => write!(f, "Concordant with WSES"),
            Concordance::Advisory => write!(f, "Concordant with advisories"),
            Concordance::Contraindicated => write!(f, "Contraindicated practice"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManagementReviewResult {
    pub verdict: Concordance,
    pub review: ManagementReview,
    pub description: String,
    pub recommendation: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub range_warnings: Vec<RangeWarning>,
}

pub fn compute_management_review(
    plan: &ManagementPlan,
) -> Result<ManagementReviewResult, ScoreError> {
    let age = require_non_negative("age_years", plan.age_years)?;
    let mut range_warnings = Vec::new();
    check_range("age_years", age, 0.0, 120.0, "years", &mut range_warnings);

    let review = review_management(plan);
    let verdict = if !review.is_valid() {
        Concordance::Contraindicated
    } else if !review.warnings.is_empty() {
        Concordance::Advisory
    } else {
        Concordance::Concordant
    };
    let (description, recommendation) = match verdict {
        Concordance::Concordant => (
            "The plan follows the WSES recommendations checked.",
            "No change needed.",
        ),
        Concordance::Advisory => (
            "The plan departs from a WSES recommendation without a recorded indication.",
            "Document the indication or adjust the plan.",
        ),
        Concordance::Contraindicated => (
            "The plan includes practice WSES recommends against.",
            "Revise the plan before proceeding.",
        ),
    };

    Ok(ManagementReviewResult {
        verdict,
        review,
        description: description.to_string(),
        recommendation: recommendation.to_string(),
        range_warnings,
    })
}

impl Assessment for ManagementReviewResult {
    /// Number of errors.
    fn points(&self) -> f64 {
        self.review.errors.len() as f64
    }

    fn band_id(&self) -> &str {
        self.verdict.id()
    }

    fn label(&self) -> String {
        self.verdict.to_string()
    }

    fn rank(&self) -> u8 {
        self.verdict.rank()
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn recommendation(&self) -> &str {
        &self.recommendation
    }

    fn warnings(&self) -> Vec<String> {
        self.review
            .errors
            .iter()
            .map(|e| format!("error: {e}"))
            .chain(self.review.warnings.iter().cloned())
            .chain(self.range_warnings.iter().map(|w| w.to_string()))
            .collect()
    }

    fn details(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// [`ScoreCalculator`] wrapper for [`compute_management_review`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AppendicitisManagement;

impl ScoreCalculator for AppendicitisManagement {
    type Input = ManagementPlan;
    type Output = ManagementReviewResult;

    fn kind(&self) -> ScoreKind {
        ScoreKind::AppendicitisManagement
    }

    fn compute(&self, input: &ManagementPlan) -> Result<ManagementReviewResult, ScoreError> {
        compute_management_review(input)
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &["age_years"]
    }
}
