//! Tokyo Guidelines 2018 severity grading, surgical risk and management for
//! acute cholecystitis.
//!
//! Grade III requires dysfunction of at least one organ system. Grade II
//! covers marked local inflammation without organ dysfunction. Everything
//! else is grade I. Surgical risk combines the grade with the Charlson index,
//! ASA class, age and jaundice, and the management plan follows from grade
//! and risk.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::calculators::asa::AsaClass;
use crate::calculators::charlson::{compute_charlson, CharlsonInput};
use crate::error::ScoreError;
use crate::model::{Band, RangeWarning, ScoreKind};
use crate::traits::{Assessment, ScoreCalculator};
use crate::validation::{check_range, require_finite, require_non_negative, require_positive};

// ---------------------------------------------------------------------------
// Severity grade
// ---------------------------------------------------------------------------

/// TG18 severity grade.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Tg18Grade {
    #[default]
    #[serde(rename = "I", alias = "grade_i")]
    I,
    #[serde(rename = "II", alias = "grade_ii")]
    II,
    #[serde(rename = "III", alias = "grade_iii")]
    III,
}

impl Tg18Grade {
    /// Grade number, 1 to 3.
    pub fn number(self) -> u8 {
        self as u8 + 1
    }
}

impl Band for Tg18Grade {
    fn id(self) -> &'static str {
        match self {
            Tg18Grade::I => "grade_i",
            Tg18Grade::II => "grade_ii",
            Tg18Grade::III => "grade_iii",
        }
    }

    fn rank(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Tg18Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tg18Grade::I => write!(f, "Grade I (mild)"),
            Tg18Grade::II => write!(f, "Grade II (moderate)"),
            Tg18Grade::III => write!(f, "Grade III (severe)"),
        }
    }
}

/// Organ systems found dysfunctional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganDysfunction {
    pub cardiovascular: bool,
    pub neurological: bool,
    pub respiratory: bool,
    pub renal: bool,
    pub hepatic: bool,
    pub hematological: bool,
}

impl OrganDysfunction {
    pub fn any(&self) -> bool {
        self.systems().next().is_some()
    }

    /// Names of the dysfunctional systems.
    pub fn systems(&self) -> impl Iterator<Item = &'static str> + '_ {
        [
            (self.cardiovascular, "cardiovascular"),
            (self.neurological, "neurological"),
            (self.respiratory, "respiratory"),
            (self.renal, "renal"),
            (self.hepatic, "hepatic"),
            (self.hematological, "hematological"),
        ]
        .into_iter()
        .filter(|(present, _)| *present)
        .map(|(_, name)| name)
    }
}

/// Findings for severity grading. Defaults are physiologically normal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tg18SeverityInput {
    pub systolic_bp_mmhg: f64,
    /// Dopamine >= 5 µg/kg/min or any norepinephrine.
    pub vasopressors: bool,
    pub altered_consciousness: bool,
    pub gcs: u8,
    pub pao2_fio2: f64,
    pub mechanical_ventilation: bool,
    pub creatinine_mg_dl: f64,
    /// Not assessed when absent.
    pub urine_output_ml_24h: Option<f64>,
    pub bilirubin_mg_dl: f64,
    pub platelets_per_mm3: f64,
    pub wbc_per_mm3: f64,
    /// Palpable tender mass in the right upper quadrant.
    pub palpable_mass: bool,
    pub symptoms_over_72h: bool,
    /// Gangrenous or emphysematous cholecystitis, pericholecystic or hepatic
    /// abscess, or biliary peritonitis.
    pub marked_local_inflammation: bool,
}

impl Default for Tg18SeverityInput {
    fn default() -> Self {
        Self {
            systolic_bp_mmhg: 120.0,
            vasopressors: false,
            altered_consciousness: false,
            gcs: 15,
            pao2_fio2: 400.0,
            mechanical_ventilation: false,
            creatinine_mg_dl: 1.0,
            urine_output_ml_24h: None,
            bilirubin_mg_dl: 1.0,
            platelets_per_mm3: 250_000.0,
            wbc_per_mm3: 8_000.0,
            palpable_mass: false,
            symptoms_over_72h: false,
            marked_local_inflammation: false,
        }
    }
}

/// Numeric severity fields the strict policy requires.
const SEVERITY_FIELDS: &[&str] = &[
    "systolic_bp_mmhg",
    "gcs",
    "pao2_fio2",
    "creatinine_mg_dl",
    "bilirubin_mg_dl",
    "platelets_per_mm3",
    "wbc_per_mm3",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tg18SeverityResult {
    pub grade: Tg18Grade,
    pub organ_dysfunction: OrganDysfunction,
    /// Grade II criteria met, also listed for grade III.
    pub local_criteria: Vec<String>,
    pub description: String,
    pub recommendation: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<RangeWarning>,
}

/// Grade the severity of acute cholecystitis.
pub fn compute_tg18_severity(input: &Tg18SeverityInput) -> Result<Tg18SeverityResult, ScoreError> {
    let sbp = require_positive("systolic_bp_mmhg", input.systolic_bp_mmhg)?;
    if !(3..=15).contains(&input.gcs) {
        return Err(ScoreError::invalid(
            "gcs",
            format!("must be between 3 and 15 (got {})", input.gcs),
        ));
    }
    let pf = require_positive("pao2_fio2", input.pao2_fio2)?;
    let creatinine = require_positive("creatinine_mg_dl", input.creatinine_mg_dl)?;
    let urine = input
        .urine_output_ml_24h
        .map(|v| require_non_negative("urine_output_ml_24h", v))
        .transpose()?;
    let bilirubin = require_non_negative("bilirubin_mg_dl", input.bilirubin_mg_dl)?;
    let platelets = require_non_negative("platelets_per_mm3", input.platelets_per_mm3)?;
    let wbc = require_finite("wbc_per_mm3", input.wbc_per_mm3)?;

    let mut warnings = Vec::new();
    check_range("systolic_bp_mmhg", sbp, 30.0, 300.0, "mmHg", &mut warnings);
    check_range("pao2_fio2", pf, 20.0, 700.0, "", &mut warnings);
    check_range("creatinine_mg_dl", creatinine, 0.1, 20.0, "mg/dL", &mut warnings);
    check_range("bilirubin_mg_dl", bilirubin, 0.0, 50.0, "mg/dL", &mut warnings);
    check_range("wbc_per_mm3", wbc, 0.0, 200_000.0, "/mm³", &mut warnings);

    let organ_dysfunction = OrganDysfunction {
        cardiovascular: sbp < 90.0 || input.vasopressors,
        neurological: input.altered_consciousness || input.gcs < 13,
        respiratory: pf < 300.0 || input.mechanical_ventilation,
        renal: creatinine > 2.0 || urine.is_some_and(|ml| ml < 400.0),
        hepatic: bilirubin > 2.0,
        hematological: platelets < 100_000.0,
    };

    let local_criteria: Vec<String> = [
        (wbc > 18_000.0, "wbc_over_18000"),
        (input.palpable_mass, "palpable_mass"),
        (input.symptoms_over_72h, "symptoms_over_72h"),
        (input.marked_local_inflammation, "marked_local_inflammation"),
    ]
    .into_iter()
    .filter(|(met, _)| *met)
    .map(|(_, name)| name.to_string())
    .collect();

    let grade = if organ_dysfunction.any() {
        Tg18Grade::III
    } else if !local_criteria.is_empty() {
        Tg18Grade::II
    } else {
        Tg18Grade::I
    };

    let (description, recommendation) = match grade {
        Tg18Grade::I => (
            "Mild acute cholecystitis without organ dysfunction or marked local inflammation.",
            "Early laparoscopic cholecystectomy when surgical risk allows.",
        ),
        Tg18Grade::II => (
            "Moderate acute cholecystitis with marked local inflammation.",
            "Early cholecystectomy within 72 h in an experienced centre; otherwise antibiotics and drainage as needed.",
        ),
        Tg18Grade::III => (
            "Severe acute cholecystitis with organ dysfunction.",
            "Organ support and urgent gallbladder drainage. Cholecystectomy after stabilisation.",
        ),
    };

    Ok(Tg18SeverityResult {
        grade,
        organ_dysfunction,
        local_criteria,
        description: description.to_string(),
        recommendation: recommendation.to_string(),
        warnings,
    })
}

impl Assessment for Tg18SeverityResult {
    fn points(&self) -> f64 {
        f64::from(self.grade.number())
    }

    fn band_id(&self) -> &str {
        self.grade.id()
    }

    fn label(&self) -> String {
        self.grade.to_string()
    }

    fn rank(&self) -> u8 {
        self.grade.rank()
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

/// [`ScoreCalculator`] wrapper for [`compute_tg18_severity`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Tg18Severity;

impl ScoreCalculator for Tg18Severity {
    type Input = Tg18SeverityInput;
    type Output = Tg18SeverityResult;

    fn kind(&self) -> ScoreKind {
        ScoreKind::Tg18Severity
    }

    fn compute(&self, input: &Tg18SeverityInput) -> Result<Tg18SeverityResult, ScoreError> {
        compute_tg18_severity(input)
    }

    fn required_fields(&self) -> &'static [&'static str] {
        SEVERITY_FIELDS
    }
}

// ---------------------------------------------------------------------------
// Surgical risk
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurgicalRisk {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl SurgicalRisk {
    pub fn is_high(self) -> bool {
        self >= SurgicalRisk::High
    }
}

impl Band for SurgicalRisk {
    fn id(self) -> &'static str {
        match self {
            SurgicalRisk::Low => "low",
            SurgicalRisk::Moderate => "moderate",
            SurgicalRisk::High => "high",
            SurgicalRisk::VeryHigh => "very_high",
        }
    }

    fn rank(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for SurgicalRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurgicalRisk::Low => write!(f, "Low surgical risk"),
            SurgicalRisk::Moderate => write!(f, "Moderate surgical risk"),
            SurgicalRisk::High => write!(f, "High surgical risk"),
            SurgicalRisk::VeryHigh => write!(f, "Very high surgical risk"),
        }
    }
}

/// First matching tier wins, from very high down.
pub fn classify_surgical_risk(
    charlson_index: u32,
    asa: AsaClass,
    age_years: f64,
    jaundice: bool,
    grade: Tg18Grade,
) -> SurgicalRisk {
    let asa_iii_plus = asa >= AsaClass::III;
    if charlson_index >= 6 && asa_iii_plus && grade == Tg18Grade::III {
        SurgicalRisk::VeryHigh
    } else if charlson_index >= 6 || (asa_iii_plus && age_years > 75.0) || jaundice {
        SurgicalRisk::High
    } else if asa_iii_plus || age_years > 70.0 || charlson_index >= 4 {
        SurgicalRisk::Moderate
    } else {
        SurgicalRisk::Low
    }
}

/// Patient factors for the surgical risk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CholecystitisRiskInput {
    pub charlson: CharlsonInput,
    pub asa_class: AsaClass,
    pub jaundice: bool,
    pub grade: Tg18Grade,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CholecystitisRiskResult {
    pub risk: SurgicalRisk,
    pub charlson_index: u32,
    pub asa_class: AsaClass,
    pub grade: Tg18Grade,
    pub description: String,
    pub recommendation: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

fn risk_text(risk: SurgicalRisk) -> (&'static str, &'static str) {
    match risk {
        SurgicalRisk::Low => (
            "Fit for early surgery.",
            "Early laparoscopic cholecystectomy.",
        ),
        SurgicalRisk::Moderate => (
            "Surgery tolerable with perioperative optimisation.",
            "Early cholecystectomy after anaesthetic review.",
        ),
        SurgicalRisk::High => (
            "Comorbidity, age or jaundice make early surgery hazardous.",
            "Consider antibiotics and gallbladder drainage before any surgery.",
        ),
        SurgicalRisk::VeryHigh => (
            "Severe cholecystitis in a patient with major comorbidity.",
            "Gallbladder drainage. Avoid early cholecystectomy.",
        ),
    }
}

pub fn compute_cholecystitis_risk(
    input: &CholecystitisRiskInput,
) -> Result<CholecystitisRiskResult, ScoreError> {
    let charlson = compute_charlson(&input.charlson)?;
    let risk = classify_surgical_risk(
        charlson.total_points,
        input.asa_class,
        input.charlson.age_years,
        input.jaundice,
        input.grade,
    );
    let (description, recommendation) = risk_text(risk);
    Ok(CholecystitisRiskResult {
        risk,
        charlson_index: charlson.total_points,
        asa_class: input.asa_class,
        grade: input.grade,
        description: description.to_string(),
        recommendation: recommendation.to_string(),
        warnings: charlson.warnings(),
    })
}

impl Assessment for CholecystitisRiskResult {
    /// The Charlson index.
    fn points(&self) -> f64 {
        f64::from(self.charlson_index)
    }

    fn band_id(&self) -> &str {
        self.risk.id()
    }

    fn label(&self) -> String {
        self.risk.to_string()
    }

    fn rank(&self) -> u8 {
        self.risk.rank()
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn recommendation(&self) -> &str {
        &self.recommendation
    }

    fn warnings(&self) -> Vec<String> {
        self.warnings.clone()
    }

    fn details(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// [`ScoreCalculator`] wrapper for [`compute_cholecystitis_risk`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CholecystitisRisk;

impl ScoreCalculator for CholecystitisRisk {
    type Input = CholecystitisRiskInput;
    type Output = CholecystitisRiskResult;

    fn kind(&self) -> ScoreKind {
        ScoreKind::CholecystitisRisk
    }

    fn compute(&self, input: &CholecystitisRiskInput) -> Result<Self::Output, ScoreError> {
        compute_cholecystitis_risk(input)
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &["charlson.age_years", "asa_class"]
    }
}

// ---------------------------------------------------------------------------
// Management
// ---------------------------------------------------------------------------

/// Treatment plan, ordered by intensity of care.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CholecystitisPlan {
    EarlyLaparoscopicCholecystectomy,
    InitialConservativeTreatment,
    EarlyCholecystectomyWithin72h,
    AntibioticsDrainageIfNeeded,
    IntensiveCareThenSurgery,
    UrgentPercutaneousDrainage,
}

impl CholecystitisPlan {
    fn recommendation(self) -> &'static str {
        match self {
            CholecystitisPlan::EarlyLaparoscopicCholecystectomy => {
                "Early laparoscopic cholecystectomy, ideally within 72 h of onset."
            }
            CholecystitisPlan::InitialConservativeTreatment => {
                "Antibiotics and supportive care. Reassess for delayed cholecystectomy."
            }
            CholecystitisPlan::EarlyCholecystectomyWithin72h => {
                "Early cholecystectomy within 72 h by an experienced surgeon."
            }
            CholecystitisPlan::AntibioticsDrainageIfNeeded => {
                "Antibiotics, with percutaneous drainage if there is no response in 24-48 h."
            }
            CholecystitisPlan::IntensiveCareThenSurgery => {
                "Intensive care and organ support. Cholecystectomy once stabilised."
            }
            CholecystitisPlan::UrgentPercutaneousDrainage => {
                "Urgent percutaneous gallbladder drainage with organ support."
            }
        }
    }
}

impl Band for CholecystitisPlan {
    fn id(self) -> &'static str {
        match self {
            CholecystitisPlan::EarlyLaparoscopicCholecystectomy => {
                "early_laparoscopic_cholecystectomy"
            }
            CholecystitisPlan::InitialConservativeTreatment => "initial_conservative_treatment",
            CholecystitisPlan::EarlyCholecystectomyWithin72h => "early_cholecystectomy_within_72h",
            CholecystitisPlan::AntibioticsDrainageIfNeeded => "antibiotics_drainage_if_needed",
            CholecystitisPlan::IntensiveCareThenSurgery => "intensive_care_then_surgery",
            CholecystitisPlan::UrgentPercutaneousDrainage => "urgent_percutaneous_drainage",
        }
    }

    fn rank(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for CholecystitisPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CholecystitisPlan::EarlyLaparoscopicCholecystectomy => {
                write!(f, "Early laparoscopic cholecystectomy")
            }
            CholecystitisPlan::InitialConservativeTreatment => {
                write!(f, "Initial conservative treatment")
            }
            CholecystitisPlan::EarlyCholecystectomyWithin72h => {
                write!(f, "Early cholecystectomy (< 72 h)")
            }
            CholecystitisPlan::AntibioticsDrainageIfNeeded => {
                write!(f, "Antibiotics, drainage if needed")
            }
            CholecystitisPlan::IntensiveCareThenSurgery => {
                write!(f, "Intensive care, surgery after stabilisation")
            }
            CholecystitisPlan::UrgentPercutaneousDrainage => {
                write!(f, "Urgent percutaneous drainage")
            }
        }
    }
}

/// Plan for a grade and risk.
///
/// Grade III goes to drainage when an organ system is failing or the risk is
/// high. Grade II and I hinge on whether the risk is high.
pub fn recommend_management(
    grade: Tg18Grade,
    organ_dysfunction: bool,
    risk: SurgicalRisk,
) -> CholecystitisPlan {
    match grade {
        Tg18Grade::III if organ_dysfunction || risk.is_high() => {
            CholecystitisPlan::UrgentPercutaneousDrainage
        }
        Tg18Grade::III => CholecystitisPlan::IntensiveCareThenSurgery,
        Tg18Grade::II if risk.is_high() => CholecystitisPlan::AntibioticsDrainageIfNeeded,
        Tg18Grade::II => CholecystitisPlan::EarlyCholecystectomyWithin72h,
        Tg18Grade::I if risk.is_high() => CholecystitisPlan::InitialConservativeTreatment,
        Tg18Grade::I => CholecystitisPlan::EarlyLaparoscopicCholecystectomy,
    }
}

/// Severity findings and patient factors together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CholecystitisManagementInput {
    pub severity: Tg18SeverityInput,
    pub charlson: CharlsonInput,
    pub asa_class: AsaClass,
    pub jaundice: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CholecystitisManagementResult {
    pub plan: CholecystitisPlan,
    pub grade: Tg18Grade,
    pub risk: SurgicalRisk,
    pub charlson_index: u32,
    pub organ_dysfunction: Vec<String>,
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

pub fn compute_cholecystitis_management(
    input: &CholecystitisManagementInput,
) -> Result<CholecystitisManagementResult, ScoreError> {
    let severity = compute_tg18_severity(&input.severity)?;
    let risk = compute_cholecystitis_risk(&CholecystitisRiskInput {
        charlson: input.charlson.clone(),
        asa_class: input.asa_class,
        jaundice: input.jaundice,
        grade: severity.grade,
    })?;
    let plan = recommend_management(
        severity.grade,
        severity.organ_dysfunction.any(),
        risk.risk,
    );

    let mut warnings = severity.warnings();
    warnings.extend(risk.warnings.iter().cloned());

    Ok(CholecystitisManagementResult {
        plan,
        grade: severity.grade,
        risk: risk.risk,
        charlson_index: risk.charlson_index,
        organ_dysfunction: severity
            .organ_dysfunction
            .systems()
            .map(String::from)
            .collect(),
        description: format!("{}; {}.", severity.grade, risk.risk.to_string().to_lowercase()),
        warnings,
    })
}

impl Assessment for CholecystitisManagementResult {
    /// The TG18 grade number.
    fn points(&self) -> f64 {
        f64::from(self.grade.number())
    }

    fn band_id(&self) -> &str {
        self.plan.id()
    }

    fn label(&self) -> String {
        self.plan.to_string()
    }

    fn rank(&self) -> u8 {
        self.plan.rank()
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn recommendation(&self) -> &str {
        self.plan.recommendation()
    }

    fn warnings(&self) -> Vec<String> {
        self.warnings.clone()
    }

    fn details(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// [`ScoreCalculator`] wrapper for [`compute_cholecystitis_management`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CholecystitisManagement;

impl ScoreCalculator for CholecystitisManagement {
    type Input = CholecystitisManagementInput;
    type Output = CholecystitisManagementResult;

    fn kind(&self) -> ScoreKind {
        ScoreKind::CholecystitisManagement
    }

    fn compute(&self, input: &CholecystitisManagementInput) -> Result<Self::Output, ScoreError> {
        compute_cholecystitis_management(input)
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &[
            "severity.systolic_bp_mmhg",
            "severity.gcs",
            "severity.pao2_fio2",
            "severity.creatinine_mg_dl",
            "severity.bilirubin_mg_dl",
            "severity.platelets_per_mm3",
            "severity.wbc_per_mm3",
            "charlson.age_years",
            "asa_class",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn severity(f: impl FnOnce(&mut Tg18SeverityInput)) -> Tg18SeverityResult {
        let mut input = Tg18SeverityInput::default();
        f(&mut input);
        compute_tg18_severity(&input).unwrap()
    }

    #[test]
    fn normal_findings_are_grade_one() {
        let result = severity(|_| {});
        assert_eq!(result.grade, Tg18Grade::I);
        assert!(!result.organ_dysfunction.any());
        assert_eq!(result.points(), 1.0);
        assert_eq!(result.rank(), 0);
    }

    #[test]
    fn local_findings_make_grade_two() {
        let result = severity(|i| i.wbc_per_mm3 = 19_500.0);
        assert_eq!(result.grade, Tg18Grade::II);
        assert_eq!(result.local_criteria, vec!["wbc_over_18000"]);

        assert_eq!(severity(|i| i.wbc_per_mm3 = 18_000.0).grade, Tg18Grade::I);
        assert_eq!(severity(|i| i.symptoms_over_72h = true).grade, Tg18Grade::II);
        assert_eq!(
            severity(|i| i.marked_local_inflammation = true).grade,
            Tg18Grade::II
        );
    }

    #[test]
    fn each_organ_system_makes_grade_three() {
        let cases: [(&str, fn(&mut Tg18SeverityInput)); 7] = [
            ("cardiovascular", |i| i.systolic_bp_mmhg = 85.0),
            ("neurological", |i| i.gcs = 12),
            ("respiratory", |i| i.pao2_fio2 = 250.0),
            ("renal", |i| i.creatinine_mg_dl = 2.4),
            ("renal", |i| i.urine_output_ml_24h = Some(300.0)),
            ("hepatic", |i| i.bilirubin_mg_dl = 2.5),
            ("hematological", |i| i.platelets_per_mm3 = 90_000.0),
        ];
        for (system, apply) in cases {
            let result = severity(apply);
            assert_eq!(result.grade, Tg18Grade::III, "{system}");
            assert_eq!(result.organ_dysfunction.systems().collect::<Vec<_>>(), vec![system]);
        }
    }

    #[test]
    fn thresholds_are_strict() {
        let result = severity(|i| {
            i.systolic_bp_mmhg = 90.0;
            i.gcs = 13;
            i.pao2_fio2 = 300.0;
            i.creatinine_mg_dl = 2.0;
            i.urine_output_ml_24h = Some(400.0);
            i.bilirubin_mg_dl = 2.0;
            i.platelets_per_mm3 = 100_000.0;
        });
        assert_eq!(result.grade, Tg18Grade::I);
    }

    #[test]
    fn rejects_out_of_scale_gcs() {
        let input = Tg18SeverityInput {
            gcs: 2,
            ..Default::default()
        };
        assert_eq!(compute_tg18_severity(&input).unwrap_err().field(), Some("gcs"));
    }

    #[test]
    fn surgical_risk_tiers() {
        use AsaClass::*;
        assert_eq!(
            classify_surgical_risk(6, III, 60.0, false, Tg18Grade::III),
            SurgicalRisk::VeryHigh
        );
        assert_eq!(
            classify_surgical_risk(6, III, 60.0, false, Tg18Grade::II),
            SurgicalRisk::High
        );
        assert_eq!(classify_surgical_risk(0, III, 76.0, false, Tg18Grade::I), SurgicalRisk::High);
        assert_eq!(classify_surgical_risk(0, I, 30.0, true, Tg18Grade::I), SurgicalRisk::High);
        assert_eq!(classify_surgical_risk(0, III, 40.0, false, Tg18Grade::I), SurgicalRisk::Moderate);
        assert_eq!(classify_surgical_risk(0, II, 71.0, false, Tg18Grade::I), SurgicalRisk::Moderate);
        assert_eq!(classify_surgical_risk(4, I, 40.0, false, Tg18Grade::I), SurgicalRisk::Moderate);
        assert_eq!(classify_surgical_risk(3, II, 70.0, false, Tg18Grade::III), SurgicalRisk::Low);
    }

    #[test]
    fn risk_uses_age_adjusted_charlson() {
        let input = CholecystitisRiskInput {
            charlson: CharlsonInput {
                age_years: 68.0,
                congestive_heart_failure: true,
                diabetes_uncomplicated: true,
                ..Default::default()
            },
            ..Default::default()
        };
        let result = compute_cholecystitis_risk(&input).unwrap();
        assert_eq!(result.charlson_index, 4);
        assert_eq!(result.risk, SurgicalRisk::Moderate);
        assert_eq!(result.points(), 4.0);
    }

    #[test]
    fn management_matrix() {
        use CholecystitisPlan::*;
        use SurgicalRisk::*;
        assert_eq!(recommend_management(Tg18Grade::III, true, Low), UrgentPercutaneousDrainage);
        assert_eq!(recommend_management(Tg18Grade::III, false, High), UrgentPercutaneousDrainage);
        assert_eq!(recommend_management(Tg18Grade::III, false, Moderate), IntensiveCareThenSurgery);
        assert_eq!(recommend_management(Tg18Grade::II, false, VeryHigh), AntibioticsDrainageIfNeeded);
        assert_eq!(recommend_management(Tg18Grade::II, false, Moderate), EarlyCholecystectomyWithin72h);
        assert_eq!(recommend_management(Tg18Grade::I, false, High), InitialConservativeTreatment);
        assert_eq!(recommend_management(Tg18Grade::I, false, Moderate), EarlyLaparoscopicCholecystectomy);
    }

    #[test]
    fn management_combines_severity_and_risk() {
        let input = CholecystitisManagementInput {
            severity: Tg18SeverityInput {
                platelets_per_mm3: 80_000.0,
                ..Default::default()
            },
            charlson: CharlsonInput {
                age_years: 82.0,
                moderate_severe_renal_disease: true,
                ..Default::default()
            },
            asa_class: AsaClass::IV,
            jaundice: false,
        };
        let result = compute_cholecystitis_management(&input).unwrap();
        assert_eq!(result.grade, Tg18Grade::III);
        assert_eq!(result.charlson_index, 6);
        assert_eq!(result.risk, SurgicalRisk::VeryHigh);
        assert_eq!(result.plan, CholecystitisPlan::UrgentPercutaneousDrainage);
        assert_eq!(result.organ_dysfunction, vec!["hematological"]);
        assert!(result.recommendation().contains("percutaneous"));
    }

    #[test]
    fn default_management_is_early_surgery() {
        let result =
            compute_cholecystitis_management(&CholecystitisManagementInput::default()).unwrap();
        assert_eq!(result.plan, CholecystitisPlan::EarlyLaparoscopicCholecystectomy);
        assert_eq!(result.rank(), 0);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn grade_accepts_roman_and_band_id() {
        let input: CholecystitisRiskInput =
            serde_json::from_value(serde_json::json!({ "grade": "II" })).unwrap();
        assert_eq!(input.grade, Tg18Grade::II);
        let input: CholecystitisRiskInput =
            serde_json::from_value(serde_json::json!({ "grade": "grade_iii" })).unwrap();
        assert_eq!(input.grade, Tg18Grade::III);
    }
}
