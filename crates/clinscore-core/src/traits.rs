//! Core trait definitions for calculators and their results.
//!
//! Every calculator module exposes a free function (the pure computation) and
//! a zero-sized type implementing [`ScoreCalculator`], so the engine can drive
//! any of them from a generic input record.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ScoreError;
use crate::model::{Band, ScoreKind, ScoreOutcome, ScoreResult};

// ---------------------------------------------------------------------------
// Calculator trait
// ---------------------------------------------------------------------------

/// Uniform interface over the independent scoring functions.
pub trait ScoreCalculator: Send + Sync {
    /// Input record. `Default` yields the clinically neutral baseline.
    type Input: DeserializeOwned + Serialize + Default;
    /// Result type.
    type Output: Assessment;

    /// Which calculator this is.
    fn kind(&self) -> ScoreKind;

    /// Compute the result for one input record.
    fn compute(&self, input: &Self::Input) -> Result<Self::Output, ScoreError>;

    /// Numeric fields the strict input policy requires explicitly.
    ///
    /// Nested fields use dotted paths (`"admission.age"`).
    fn required_fields(&self) -> &'static [&'static str] {
        &[]
    }

    /// Required fields for one raw input record.
    ///
    /// Calculators whose input embeds optional sub-records override this to
    /// require the nested fields of the sub-records actually supplied.
    fn required_paths(&self, _raw: &serde_json::Value) -> Vec<String> {
        self.required_fields().iter().map(|f| f.to_string()).collect()
    }

    /// Every field the input record understands, as dotted paths.
    ///
    /// Optional sub-records serialize as `null` in the baseline, so inputs
    /// that embed them override this to list the nested fields.
    fn known_fields(&self) -> Vec<String> {
        field_paths(&Self::Input::default(), "")
    }
}

/// Dotted paths of every field in `value`'s serialized form, under `prefix`.
pub(crate) fn field_paths<T: Serialize>(value: &T, prefix: &str) -> Vec<String> {
    let value = serde_json::to_value(value).unwrap_or_default();
    let mut fields = Vec::new();
    collect_field_paths(&value, prefix, &mut fields);
    fields
}

/// Required paths of the optional sub-records present in `raw`.
pub(crate) fn nested_required(
    raw: &serde_json::Value,
    nested: &[(&str, &[&str])],
) -> Vec<String> {
    nested
        .iter()
        .filter(|(key, _)| raw.get(key).is_some_and(|v| !v.is_null()))
        .flat_map(|(key, fields)| fields.iter().map(move |f| format!("{key}.{f}")))
        .collect()
}

fn collect_field_paths(value: &serde_json::Value, prefix: &str, out: &mut Vec<String>) {
    if let serde_json::Value::Object(map) = value {
        for (key, child) in map {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };
            if child.is_object() {
                collect_field_paths(child, &path, out);
            } else {
                out.push(path);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Assessment trait
// ---------------------------------------------------------------------------

/// Read access to any calculator result, used to build a [`ScoreOutcome`].
pub trait Assessment {
    /// Headline number.
    fn points(&self) -> f64;
    /// Machine-readable band name.
    fn band_id(&self) -> &str;
    /// Human-readable band label.
    fn label(&self) -> String;
    /// Ordinal rank of the band (0 = lowest risk).
    fn rank(&self) -> u8;
    fn description(&self) -> &str;
    fn recommendation(&self) -> &str;

    /// Range warnings and fixed notices.
    fn warnings(&self) -> Vec<String> {
        Vec::new()
    }

    /// Calculator-specific breakdown.
    fn details(&self) -> serde_json::Value;

    fn to_outcome(&self, calculator: ScoreKind) -> ScoreOutcome {
        ScoreOutcome {
            calculator,
            points: self.points(),
            band: self.band_id().to_string(),
            label: self.label(),
            rank: self.rank(),
            description: self.description().to_string(),
            recommendation: self.recommendation().to_string(),
            details: self.details(),
            warnings: self.warnings(),
        }
    }
}

impl<B: Band + Serialize> Assessment for ScoreResult<B> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RiskBand;

    #[test]
    fn score_result_to_outcome() {
        let result = ScoreResult::new(5, RiskBand::Intermediate, "desc", "rec");
        let outcome = result.to_outcome(ScoreKind::Alvarado);
        assert_eq!(outcome.points, 5.0);
        assert_eq!(outcome.band, "intermediate");
        assert_eq!(outcome.label, "Intermediate probability");
        assert_eq!(outcome.rank, 1);
        assert_eq!(outcome.details["total_points"], 5);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn nested_field_paths() {
        let value = serde_json::json!({ "a": 1, "b": { "c": true, "d": null } });
        let mut paths = Vec::new();
        collect_field_paths(&value, "", &mut paths);
        paths.sort();
        assert_eq!(paths, vec!["a", "b.c", "b.d"]);
    }

    #[test]
    fn nested_required_only_for_present_sub_records() {
        let raw = serde_json::json!({ "x": { "a": 1 }, "y": null });
        let paths = nested_required(&raw, &[("x", &["a", "b"]), ("y", &["c"]), ("z", &["d"])]);
        assert_eq!(paths, vec!["x.a", "x.b"]);
    }
}
