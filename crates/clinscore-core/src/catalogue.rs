//! Static catalogue of the available calculators.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::model::ScoreKind;

/// Clinical area a calculator belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    GeneralSurgery,
    CriticalCare,
    Gastroenterology,
    Anesthesiology,
    Nutrition,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::GeneralSurgery => write!(f, "General Surgery"),
            Category::CriticalCare => write!(f, "Critical Care"),
            Category::Gastroenterology => write!(f, "Gastroenterology"),
            Category::Anesthesiology => write!(f, "Anesthesiology"),
            Category::Nutrition => write!(f, "Nutrition"),
        }
    }
}

impl FromStr for Category {
    type Err = String;

    /// Accepts the display name or its kebab-case form, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '_'], "-").as_str() {
            "general-surgery" | "surgery" => Ok(Category::GeneralSurgery),
            "critical-care" | "icu" => Ok(Category::CriticalCare),
            "gastroenterology" => Ok(Category::Gastroenterology),
            "anesthesiology" | "anaesthesiology" => Ok(Category::Anesthesiology),
            "nutrition" => Ok(Category::Nutrition),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

/// One catalogue entry.
#[derive(Debug, Clone, Serialize)]
pub struct CalculatorInfo {
    pub kind: ScoreKind,
    pub name: &'static str,
    pub description: &'static str,
    pub category: Category,
}

/// Catalogue entry for one calculator.
pub fn info(kind: ScoreKind) -> CalculatorInfo {
    let (name, description, category) = match kind {
        ScoreKind::Alvarado => (
            "Alvarado Score",
            "Probability of acute appendicitis from eight clinical and laboratory findings",
            Category::GeneralSurgery,
        ),
        ScoreKind::Air => (
            "AIR Score",
            "Appendicitis Inflammatory Response score with graded inflammatory markers",
            Category::GeneralSurgery,
        ),
        ScoreKind::Aas => (
            "Adult Appendicitis Score",
            "Appendicitis risk stratification in adults, with CRP gated by symptom duration",
            Category::GeneralSurgery,
        ),
        ScoreKind::Pas => (
            "Pediatric Appendicitis Score",
            "Appendicitis risk stratification in children",
            Category::GeneralSurgery,
        ),
        ScoreKind::AppendicitisPathway => (
            "WSES Appendicitis Imaging Pathway",
            "Combines appendicitis scores and special conditions into an imaging decision",
            Category::GeneralSurgery,
        ),
        ScoreKind::AppendicitisManagement => (
            "WSES Appendicitis Management Review",
            "Checks drainage, antibiotic, interval appendectomy and colonoscopy decisions",
            Category::GeneralSurgery,
        ),
        ScoreKind::Tokyo => (
            "Tokyo Guidelines Criteria",
            "Diagnostic criteria for acute cholecystitis",
            Category::Gastroenterology,
        ),
        ScoreKind::Tg18Severity => (
            "TG18 Cholecystitis Severity",
            "Tokyo Guidelines 2018 severity grade from organ dysfunction and local inflammation",
            Category::Gastroenterology,
        ),
        ScoreKind::CholecystitisRisk => (
            "Cholecystitis Surgical Risk",
            "Surgical risk from the Charlson index, ASA class, age, jaundice and TG18 grade",
            Category::Gastroenterology,
        ),
        ScoreKind::CholecystitisManagement => (
            "Cholecystitis Management",
            "Treatment plan from TG18 severity and surgical risk",
            Category::Gastroenterology,
        ),
        ScoreKind::Ranson => (
            "Ranson Criteria",
            "Severity and mortality prediction in acute pancreatitis",
            Category::Gastroenterology,
        ),
        ScoreKind::ApacheII => (
            "APACHE II",
            "ICU severity of illness with predicted hospital mortality",
            Category::CriticalCare,
        ),
        ScoreKind::Asa => (
            "ASA Physical Status",
            "Preoperative physical status classification",
            Category::Anesthesiology,
        ),
        ScoreKind::Charlson => (
            "Charlson Comorbidity Index",
            "Age-adjusted comorbidity burden with estimated 10-year survival",
            Category::Anesthesiology,
        ),
        ScoreKind::Anthropometry => (
            "BMI and Body Surface Area",
            "Body-mass index, Du Bois body surface area and ideal body weight",
            Category::Nutrition,
        ),
    };
    CalculatorInfo {
        kind,
        name,
        description,
        category,
    }
}

/// Every calculator, in catalogue order.
pub fn catalogue() -> Vec<CalculatorInfo> {
    ScoreKind::ALL.into_iter().map(info).collect()
}

/// Calculators in one category.
pub fn by_category(category: Category) -> Vec<CalculatorInfo> {
    catalogue()
        .into_iter()
        .filter(|c| c.category == category)
        .collect()
}

/// Run `$body` with `$calc` bound to the calculator for `$kind`.
macro_rules! with_calculator {
    ($kind:expr, $calc:ident => $body:expr) => {{
        use $crate::calculators::*;
        use $crate::model::ScoreKind;
        match $kind {
            ScoreKind::Alvarado => {
                let $calc = &Alvarado;
                $body
            }
            ScoreKind::Air => {
                let $calc = &Air;
                $body
            }
            ScoreKind::Aas => {
                let $calc = &Aas;
                $body
            }
            ScoreKind::Pas => {
                let $calc = &Pas;
                $body
            }
            ScoreKind::Asa => {
                let $calc = &Asa;
                $body
            }
            ScoreKind::Anthropometry => {
                let $calc = &Anthropometry;
                $body
            }
            ScoreKind::Ranson => {
                let $calc = &Ranson;
                $body
            }
            ScoreKind::ApacheII => {
                let $calc = &ApacheII;
                $body
            }
            ScoreKind::Tokyo => {
                let $calc = &Tokyo;
                $body
            }
            ScoreKind::AppendicitisPathway => {
                let $calc = &AppendicitisPathway;
                $body
            }
            ScoreKind::AppendicitisManagement => {
                let $calc = &AppendicitisManagement;
                $body
            }
            ScoreKind::Tg18Severity => {
                let $calc = &Tg18Severity;
                $body
            }
            ScoreKind::CholecystitisRisk => {
                let $calc = &CholecystitisRisk;
                $body
            }
            ScoreKind::CholecystitisManagement => {
                let $calc = &CholecystitisManagement;
                $body
            }
            ScoreKind::Charlson => {
                let $calc = &Charlson;
                $body
            }
        }
    }};
}

pub(crate) use with_calculator;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_covers_every_kind() {
        let entries = catalogue();
        assert_eq!(entries.len(), ScoreKind::ALL.len());
        for kind in ScoreKind::ALL {
            assert!(entries.iter().any(|e| e.kind == kind));
        }
    }

    #[test]
    fn categories() {
        assert_eq!(info(ScoreKind::ApacheII).category, Category::CriticalCare);
        assert_eq!(info(ScoreKind::Asa).category, Category::Anesthesiology);
        let surgery = by_category(Category::GeneralSurgery);
        assert_eq!(surgery.len(), 6);
        assert_eq!(by_category(Category::Gastroenterology).len(), 5);
        assert_eq!(info(ScoreKind::Charlson).category, Category::Anesthesiology);
        assert!(by_category(Category::Nutrition)
            .iter()
            .all(|c| c.kind == ScoreKind::Anthropometry));
    }

    #[test]
    fn category_parse() {
        assert_eq!(
            "General Surgery".parse::<Category>().unwrap(),
            Category::GeneralSurgery
        );
        assert_eq!(
            "critical_care".parse::<Category>().unwrap(),
            Category::CriticalCare
        );
        assert!("dermatology".parse::<Category>().is_err());
    }

    #[test]
    fn macro_binds_matching_calculator() {
        use crate::traits::ScoreCalculator;
        for kind in ScoreKind::ALL {
            let bound = with_calculator!(kind, calc => calc.kind());
            assert_eq!(bound, kind);
        }
    }
}
