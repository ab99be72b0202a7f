//! WSES appendicitis imaging pathway.
//!
//! Combines whichever appendicitis scores are available with a set of
//! special clinical conditions to decide whether imaging is recommended.

use serde::{Deserialize, Serialize};

use crate::calculators::aas::{aas_band, compute_aas, Aas, AasInput};
use crate::calculators::air::{air_band, compute_air, Air, AirInput};
use crate::calculators::alvarado::{alvarado_band, compute_alvarado, AlvaradoInput};
use crate::calculators::pas::{compute_pas, pas_band, PasInput};
use crate::error::ScoreError;
use crate::model::{Band, RiskBand, ScoreKind};
use crate::traits::{field_paths, nested_required, Assessment, ScoreCalculator};

/// Appendicitis score totals; `None` when a score was not taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppendicitisScores {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alvarado: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub air: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aas: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pas: Option<u32>,
}

impl AppendicitisScores {
    fn bands(&self) -> Vec<RiskBand> {
        [
            self.alvarado.map(alvarado_band),
            self.air.map(air_band),
            self.aas.map(aas_band),
            self.pas.map(pas_band),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    fn is_empty(&self) -> bool {
        self.bands().is_empty()
    }
}

/// Conditions that favour imaging even when the scores are high.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecialConditions {
    pub atypical_presentation: bool,
    pub diagnostic_uncertainty: bool,
    pub suspected_complication: bool,
    pub elderly: bool,
    pub pregnant: bool,
    pub child: bool,
}

impl SpecialConditions {
    pub fn any(&self) -> bool {
        self.atypical_presentation
            || self.diagnostic_uncertainty
            || self.suspected_complication
            || self.elderly
            || self.pregnant
            || self.child
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImagingRecommendation {
    pub risk: RiskBand,
    pub imaging_recommended: bool,
    pub rationale: String,
}

/// Decide on imaging.
///
/// An intermediate score anywhere takes precedence over a high one. With a
/// high score, pediatric patients (a non-zero PAS, or `child`) are always
/// imaged; adults only when a special condition holds.
pub fn recommend_imaging(
    scores: &AppendicitisScores,
    conditions: &SpecialConditions,
) -> ImagingRecommendation {
    let bands = scores.bands();

    if bands.contains(&RiskBand::Intermediate) {
        return ImagingRecommendation {
            risk: RiskBand::Intermediate,
            imaging_recommended: true,
            rationale: "Intermediate probability: imaging is required before deciding on surgery."
                .into(),
        };
    }

    if bands.contains(&RiskBand::High) {
        let pediatric = scores.pas.is_some_and(|pas| pas > 0) || conditions.child;
        let (imaging_recommended, rationale) = if pediatric {
            (
                true,
                "High probability in a pediatric patient: imaging is still recommended.",
            )
        } else if conditions.any() {
            (
                true,
                "High probability with special conditions: imaging is recommended.",
            )
        } else {
            (
                false,
                "High probability: imaging may be omitted before surgical assessment.",
            )
        };
        return ImagingRecommendation {
            risk: RiskBand::High,
            imaging_recommended,
            rationale: rationale.into(),
        };
    }

    let rationale = if scores.is_empty() {
        "No appendicitis score supplied: imaging may be omitted."
    } else {
        "Low probability: imaging may be omitted."
    };
    ImagingRecommendation {
        risk: RiskBand::Low,
        imaging_recommended: false,
        rationale: rationale.into(),
    }
}

/// Findings for every score the clinician chose to take.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathwayInput {
    pub alvarado: Option<AlvaradoInput>,
    pub air: Option<AirInput>,
    pub aas: Option<AasInput>,
    pub pas: Option<PasInput>,
    pub conditions: SpecialConditions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathwayResult {
    pub scores: AppendicitisScores,
    #[serde(flatten)]
    pub imaging: ImagingRecommendation,
}

/// Compute the supplied scores, then apply [`recommend_imaging`].
pub fn compute_appendicitis_pathway(input: &PathwayInput) -> Result<PathwayResult, ScoreError> {
    let scores = AppendicitisScores {
        alvarado: input.alvarado.as_ref().map(|i| compute_alvarado(i).total_points),
        air: input
            .air
            .as_ref()
            .map(|i| compute_air(i).map(|r| r.total_points))
            .transpose()?,
        aas: input
            .aas
            .as_ref()
            .map(|i| compute_aas(i).map(|r| r.total_points))
            .transpose()?,
        pas: input.pas.as_ref().map(|i| compute_pas(i).total_points),
    };
    let imaging = recommend_imaging(&scores, &input.conditions);
    Ok(PathwayResult { scores, imaging })
}

impl Assessment for PathwayResult {
    /// Rank of the combined risk.
    fn points(&self) -> f64 {
        f64::from(self.imaging.risk.rank())
    }

    fn band_id(&self) -> &str {
        self.imaging.risk.id()
    }

    fn label(&self) -> String {
        self.imaging.risk.to_string()
    }

    fn rank(&self) -> u8 {
        self.imaging.risk.rank()
    }

    fn description(&self) -> &str {
        &self.imaging.rationale
    }

    fn recommendation(&self) -> &str {
        if self.imaging.imaging_recommended {
            "Request imaging: ultrasound first, CT or MRI if inconclusive."
        } else {
            "Imaging may be omitted."
        }
    }

    fn details(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// [`ScoreCalculator`] wrapper for [`compute_appendicitis_pathway`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AppendicitisPathway;

impl ScoreCalculator for AppendicitisPathway {
    type Input = PathwayInput;
    type Output = PathwayResult;

    fn kind(&self) -> ScoreKind {
        ScoreKind::AppendicitisPathway
    }

    fn compute(&self, input: &PathwayInput) -> Result<PathwayResult, ScoreError> {
        compute_appendicitis_pathway(input)
    }

    fn required_paths(&self, raw: &serde_json::Value) -> Vec<String> {
        nested_required(
            raw,
            &[("air", Air.required_fields()), ("aas", Aas.required_fields())],
        )
    }

    fn known_fields(&self) -> Vec<String> {
        let mut fields = field_paths(&AlvaradoInput::default(), "alvarado");
        fields.extend(field_paths(&AirInput::default(), "air"));
        fields.extend(field_paths(&AasInput::default(), "aas"));
        fields.extend(field_paths(&PasInput::default(), "pas"));
        fields.extend(field_paths(&SpecialConditions::default(), "conditions"));
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(alvarado: Option<u32>, air: Option<u32>, pas: Option<u32>) -> AppendicitisScores {
        AppendicitisScores {
            alvarado,
            air,
            aas: None,
            pas,
        }
    }

    #[test]
    fn intermediate_always_images() {
        let rec = recommend_imaging(&scores(Some(6), None, None), &SpecialConditions::default());
        assert_eq!(rec.risk, RiskBand::Intermediate);
        assert!(rec.imaging_recommended);
    }

    #[test]
    fn intermediate_wins_over_high() {
        let rec = recommend_imaging(
            &scores(Some(9), Some(6), None),
            &SpecialConditions::default(),
        );
        assert_eq!(rec.risk, RiskBand::Intermediate);
        assert!(rec.imaging_recommended);
    }

    #[test]
    fn high_adult_without_conditions_omits_imaging() {
        let rec = recommend_imaging(&scores(Some(8), None, None), &SpecialConditions::default());
        assert_eq!(rec.risk, RiskBand::High);
        assert!(!rec.imaging_recommended);
    }

    #[test]
    fn high_adult_with_condition_images() {
        let conditions = SpecialConditions {
            pregnant: true,
            ..Default::default()
        };
        let rec = recommend_imaging(&scores(None, Some(10), None), &conditions);
        assert_eq!(rec.risk, RiskBand::High);
        assert!(rec.imaging_recommended);
    }

    #[test]
    fn high_pediatric_always_images() {
        let rec = recommend_imaging(&scores(None, None, Some(8)), &SpecialConditions::default());
        assert_eq!(rec.risk, RiskBand::High);
        assert!(rec.imaging_recommended);
    }

    #[test]
    fn low_and_empty_omit_imaging() {
        let rec = recommend_imaging(&scores(Some(2), Some(3), None), &SpecialConditions::default());
        assert_eq!(rec.risk, RiskBand::Low);
        assert!(!rec.imaging_recommended);

        let rec = recommend_imaging(&AppendicitisScores::default(), &SpecialConditions::default());
        assert_eq!(rec.risk, RiskBand::Low);
        assert!(rec.rationale.starts_with("No appendicitis score"));
    }

    #[test]
    fn pathway_computes_supplied_scores() {
        let input = PathwayInput {
            alvarado: Some(AlvaradoInput {
                migratory_pain: true,
                rlq_tenderness: true,
                leukocytosis: true,
                ..Default::default()
            }),
            ..Default::default()
        };
        let result = compute_appendicitis_pathway(&input).unwrap();
        assert_eq!(result.scores.alvarado, Some(5));
        assert_eq!(result.scores.air, None);
        assert_eq!(result.imaging.risk, RiskBand::Intermediate);
        assert_eq!(result.rank(), 1);
    }

    #[test]
    fn pathway_propagates_score_errors() {
        let input = PathwayInput {
            air: Some(AirInput {
                neutrophils_pct: 140.0,
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(compute_appendicitis_pathway(&input).is_err());
    }

    #[test]
    fn known_fields_reach_into_sub_records() {
        let fields = AppendicitisPathway.known_fields();
        assert!(fields.contains(&"alvarado.rlq_tenderness".to_string()));
        assert!(fields.contains(&"aas.sex".to_string()));
        assert!(fields.contains(&"pas.cough_percussion_hop_pain".to_string()));
        assert!(fields.contains(&"conditions.child".to_string()));
        assert!(!fields.contains(&"alvarado".to_string()));
    }

    #[test]
    fn required_paths_follow_supplied_sub_records() {
        let raw = serde_json::json!({ "air": { "vomiting": true }, "alvarado": {} });
        let paths = AppendicitisPathway.required_paths(&raw);
        assert!(paths.contains(&"air.temperature_c".to_string()));
        assert!(!paths.iter().any(|p| p.starts_with("aas.")));
    }
}
