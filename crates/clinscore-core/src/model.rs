//! Core data model types for clinscore.
//!
//! These are the shapes every calculator shares: the calculator identifier,
//! the appendicitis risk band, generic scored results, range warnings, and the
//! calculator-independent [`ScoreOutcome`] used by the engine and reports.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifies one of the available calculators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ScoreKind {
    #[serde(rename = "alvarado")]
    Alvarado,
    #[serde(rename = "air")]
    Air,
    #[serde(rename = "aas")]
    Aas,
    #[serde(rename = "pas")]
    Pas,
    #[serde(rename = "asa")]
    Asa,
    #[serde(rename = "anthropometry", alias = "bmi")]
    Anthropometry,
    #[serde(rename = "ranson")]
    Ranson,
    #[serde(rename = "apache-ii", alias = "apache2")]
    ApacheII,
    #[serde(rename = "tokyo", alias = "tokyo-criteria")]
    Tokyo,
    #[serde(rename = "appendicitis-pathway")]
    AppendicitisPathway,
    #[serde(rename = "appendicitis-management", alias = "wses-management")]
    AppendicitisManagement,
    #[serde(rename = "tg18-severity", alias = "tg18")]
    Tg18Severity,
    #[serde(rename = "cholecystitis-risk")]
    CholecystitisRisk,
    #[serde(rename = "cholecystitis-management")]
    CholecystitisManagement,
    #[serde(rename = "charlson", alias = "cci")]
    Charlson,
}

impl ScoreKind {
    /// Every calculator, in catalogue order.
    pub const ALL: [ScoreKind; 15] = [
        ScoreKind::Alvarado,
        ScoreKind::Air,
        ScoreKind::Aas,
        ScoreKind::Pas,
        ScoreKind::AppendicitisPathway,
        ScoreKind::AppendicitisManagement,
        ScoreKind::Tokyo,
        ScoreKind::Tg18Severity,
        ScoreKind::CholecystitisRisk,
        ScoreKind::CholecystitisManagement,
        ScoreKind::Ranson,
        ScoreKind::ApacheII,
        ScoreKind::Asa,
        ScoreKind::Charlson,
        ScoreKind::Anthropometry,
    ];

    /// Stable identifier used in case files and reports.
    pub fn id(self) -> &'static str {
        match self {
            ScoreKind::Alvarado => "alvarado",
            ScoreKind::Air => "air",
            ScoreKind::Aas => "aas",
            ScoreKind::Pas => "pas",
            ScoreKind::Asa => "asa",
            ScoreKind::Anthropometry => "anthropometry",
            ScoreKind::Ranson => "ranson",
            ScoreKind::ApacheII => "apache-ii",
            ScoreKind::Tokyo => "tokyo",
            ScoreKind::AppendicitisPathway => "appendicitis-pathway",
            ScoreKind::AppendicitisManagement => "appendicitis-management",
            ScoreKind::Tg18Severity => "tg18-severity",
            ScoreKind::CholecystitisRisk => "cholecystitis-risk",
            ScoreKind::CholecystitisManagement => "cholecystitis-management",
            ScoreKind::Charlson => "charlson",
        }
    }
}

impl fmt::Display for ScoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ScoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "alvarado" => Ok(ScoreKind::Alvarado),
            "air" => Ok(ScoreKind::Air),
            "aas" => Ok(ScoreKind::Aas),
            "pas" => Ok(ScoreKind::Pas),
            "asa" => Ok(ScoreKind::Asa),
            "anthropometry" | "bmi" | "bsa" => Ok(ScoreKind::Anthropometry),
            "ranson" => Ok(ScoreKind::Ranson),
            "apache-ii" | "apache2" | "apacheii" => Ok(ScoreKind::ApacheII),
            "tokyo" | "tokyo-criteria" => Ok(ScoreKind::Tokyo),
            "appendicitis-pathway" | "wses" => Ok(ScoreKind::AppendicitisPathway),
            "appendicitis-management" | "wses-management" => {
                Ok(ScoreKind::AppendicitisManagement)
            }
            "tg18-severity" | "tg18" => Ok(ScoreKind::Tg18Severity),
            "cholecystitis-risk" => Ok(ScoreKind::CholecystitisRisk),
            "cholecystitis-management" => Ok(ScoreKind::CholecystitisManagement),
            "charlson" | "cci" => Ok(ScoreKind::Charlson),
            other => Err(format!("unknown calculator: {other}")),
        }
    }
}

/// A categorical result band with an ordinal rank (0 = lowest risk).
pub trait Band: Copy + fmt::Display {
    /// Machine-readable band name, e.g. `"intermediate"`.
    fn id(self) -> &'static str;

    /// Ordinal position of the band within its calculator.
    fn rank(self) -> u8;
}

/// Three-tier probability band shared by the appendicitis scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskBand {
    Low,
    Intermediate,
    High,
}

impl Band for RiskBand {
    fn id(self) -> &'static str {
        match self {
            RiskBand::Low => "low",
            RiskBand::Intermediate => "intermediate",
            RiskBand::High => "high",
        }
    }

    fn rank(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for RiskBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskBand::Low => write!(f, "Low probability"),
            RiskBand::Intermediate => write!(f, "Intermediate probability"),
            RiskBand::High => write!(f, "High probability"),
        }
    }
}

/// Biological sex, as used by AAS and the Robinson ideal-weight formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::Male => write!(f, "male"),
            Sex::Female => write!(f, "female"),
        }
    }
}

impl FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Sex::Male),
            "female" | "f" => Ok(Sex::Female),
            other => Err(format!("unknown sex: {other}")),
        }
    }
}

/// A value that was accepted but lies outside its physiological range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeWarning {
    /// Input field name.
    pub field: String,
    /// The value supplied.
    pub value: f64,
    /// Human-readable expected range, e.g. `"25-45 °C"`.
    pub expected: String,
}

impl fmt::Display for RangeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} = {} is outside the expected range {}",
            self.field, self.value, self.expected
        )
    }
}

/// A points-based result mapped to a band with a fixed interpretation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResult<B> {
    /// Sum of the criteria points.
    pub total_points: u32,
    /// Band derived from `total_points`.
    pub band: B,
    /// What the band means clinically.
    pub description: String,
    /// Suggested next step.
    pub recommendation: String,
    /// Accepted values outside their physiological range.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<RangeWarning>,
}

impl<B: Band> ScoreResult<B> {
    pub fn new(total_points: u32, band: B, description: &str, recommendation: &str) -> Self {
        Self {
            total_points,
            band,
            description: description.to_string(),
            recommendation: recommendation.to_string(),
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<RangeWarning>) -> Self {
        self.warnings = warnings;
        self
    }
}

/// Calculator-independent rendering of any result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreOutcome {
    /// Which calculator produced this outcome.
    pub calculator: ScoreKind,
    /// Headline number (points, BMI, or ASA class number).
    pub points: f64,
    /// Machine-readable band name.
    pub band: String,
    /// Human-readable band label.
    pub label: String,
    /// Ordinal rank of the band (0 = lowest risk).
    pub rank: u8,
    /// What the band means clinically.
    pub description: String,
    /// Suggested next step.
    pub recommendation: String,
    /// Calculator-specific breakdown.
    #[serde(default)]
    pub details: serde_json::Value,
    /// Range warnings and policy notices.
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// How missing numeric inputs are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputPolicy {
    /// Reject a record that omits a required field.
    #[default]
    Strict,
    /// Fill the neutral baseline and record a warning per defaulted field.
    Lenient,
}

impl fmt::Display for InputPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputPolicy::Strict => write!(f, "strict"),
            InputPolicy::Lenient => write!(f, "lenient"),
        }
    }
}

impl FromStr for InputPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(InputPolicy::Strict),
            "lenient" => Ok(InputPolicy::Lenient),
            other => Err(format!("unknown input policy: {other}")),
        }
    }
}

/// A named patient case evaluated by one calculator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreCase {
    /// Unique identifier within its case set.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Calculator to run.
    pub calculator: ScoreKind,
    /// Input record for the calculator, as a JSON object.
    #[serde(default)]
    pub input: serde_json::Value,
    /// Tags for filtering cases.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A collection of cases loaded from one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseSet {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub cases: Vec<ScoreCase>,
}

impl CaseSet {
    /// Keep only the cases carrying at least one of `tags`. An empty filter
    /// keeps everything.
    pub fn filter_by_tags(&mut self, tags: &[String]) {
        if tags.is_empty() {
            return;
        }
        self.cases
            .retain(|case| case.tags.iter().any(|t| tags.contains(t)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_kind_display_and_parse() {
        assert_eq!(ScoreKind::ApacheII.to_string(), "apache-ii");
        assert_eq!("apache2".parse::<ScoreKind>().unwrap(), ScoreKind::ApacheII);
        assert_eq!("BMI".parse::<ScoreKind>().unwrap(), ScoreKind::Anthropometry);
        assert_eq!(
            "tokyo_criteria".parse::<ScoreKind>().unwrap(),
            ScoreKind::Tokyo
        );
        assert_eq!("TG18".parse::<ScoreKind>().unwrap(), ScoreKind::Tg18Severity);
        assert_eq!("cci".parse::<ScoreKind>().unwrap(), ScoreKind::Charlson);
        assert_eq!(
            "wses_management".parse::<ScoreKind>().unwrap(),
            ScoreKind::AppendicitisManagement
        );
        assert!("sofa".parse::<ScoreKind>().is_err());
    }

    #[test]
    fn score_kind_ids_round_trip_through_from_str() {
        for kind in ScoreKind::ALL {
            assert_eq!(kind.id().parse::<ScoreKind>().unwrap(), kind);
        }
    }

    #[test]
    fn score_kind_serde_uses_ids() {
        let json = serde_json::to_string(&ScoreKind::ApacheII).unwrap();
        assert_eq!(json, "\"apache-ii\"");
        let parsed: ScoreKind = serde_json::from_str("\"bmi\"").unwrap();
        assert_eq!(parsed, ScoreKind::Anthropometry);
    }

    #[test]
    fn risk_band_rank_is_ordered() {
        assert!(RiskBand::Low.rank() < RiskBand::Intermediate.rank());
        assert!(RiskBand::Intermediate.rank() < RiskBand::High.rank());
        assert_eq!(RiskBand::High.id(), "high");
    }

    #[test]
    fn sex_parse() {
        assert_eq!("M".parse::<Sex>().unwrap(), Sex::Male);
        assert_eq!("female".parse::<Sex>().unwrap(), Sex::Female);
        assert!("x".parse::<Sex>().is_err());
    }

    #[test]
    fn input_policy_parse_and_default() {
        assert_eq!(InputPolicy::default(), InputPolicy::Strict);
        assert_eq!("Lenient".parse::<InputPolicy>().unwrap(), InputPolicy::Lenient);
        assert!("loose".parse::<InputPolicy>().is_err());
    }

    #[test]
    fn filter_cases_by_tag() {
        let case = |id: &str, tags: &[&str]| ScoreCase {
            id: id.into(),
            name: id.into(),
            description: String::new(),
            calculator: ScoreKind::Alvarado,
            input: serde_json::json!({}),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        };
        let mut set = CaseSet {
            id: "s".into(),
            name: "S".into(),
            description: String::new(),
            cases: vec![case("a", &["adult"]), case("b", &["pediatric"]), case("c", &[])],
        };
        set.filter_by_tags(&[]);
        assert_eq!(set.cases.len(), 3);
        set.filter_by_tags(&["pediatric".to_string()]);
        assert_eq!(set.cases.len(), 1);
        assert_eq!(set.cases[0].id, "b");
    }

    #[test]
    fn range_warning_display() {
        let w = RangeWarning {
            field: "temperature_c".into(),
            value: 45.5,
            expected: "25-45 °C".into(),
        };
        assert_eq!(
            w.to_string(),
            "temperature_c = 45.5 is outside the expected range 25-45 °C"
        );
    }
}
