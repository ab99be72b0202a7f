//! Input validation utilities.
//!
//! Calculators split out-of-domain values in two: values that cannot describe
//! a living patient are rejected with [`ScoreError::InvalidInput`], while
//! values that are possible but outside the usual physiological range are
//! accepted and reported as a [`RangeWarning`].

use crate::error::ScoreError;
use crate::model::RangeWarning;

/// Rejects NaN and infinite values.
pub fn require_finite(field: &str, value: f64) -> Result<f64, ScoreError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ScoreError::invalid(field, "must be a finite number"))
    }
}

/// Rejects values that are not finite or not strictly positive.
pub fn require_positive(field: &str, value: f64) -> Result<f64, ScoreError> {
    require_finite(field, value)?;
    if value <= 0.0 {
        return Err(ScoreError::invalid(
            field,
            format!("must be greater than zero (got {value})"),
        ));
    }
    Ok(value)
}

/// Rejects values that are not finite or negative.
pub fn require_non_negative(field: &str, value: f64) -> Result<f64, ScoreError> {
    require_finite(field, value)?;
    if value < 0.0 {
        return Err(ScoreError::invalid(
            field,
            format!("must not be negative (got {value})"),
        ));
    }
    Ok(value)
}

/// Rejects values outside `[0, 100]`.
pub fn require_percentage(field: &str, value: f64) -> Result<f64, ScoreError> {
    require_non_negative(field, value)?;
    if value > 100.0 {
        return Err(ScoreError::invalid(
            field,
            format!("must be a percentage between 0 and 100 (got {value})"),
        ));
    }
    Ok(value)
}

/// Records a warning when `value` falls outside `[low, high]`.
pub fn check_range(
    field: &str,
    value: f64,
    low: f64,
    high: f64,
    unit: &str,
    warnings: &mut Vec<RangeWarning>,
) {
    if value < low || value > high {
        let expected = if unit.is_empty() {
            format!("{low}-{high}")
        } else {
            format!("{low}-{high} {unit}")
        };
        warnings.push(RangeWarning {
            field: field.to_string(),
            value,
            expected,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finite_checks() {
        assert!(require_finite("x", 1.0).is_ok());
        assert!(require_finite("x", f64::NAN).is_err());
        assert!(require_finite("x", f64::INFINITY).is_err());
    }

    #[test]
    fn positive_rejects_zero_and_negative() {
        assert!(require_positive("weight_kg", 0.0).is_err());
        assert!(require_positive("weight_kg", -3.0).is_err());
        assert_eq!(require_positive("weight_kg", 70.0).unwrap(), 70.0);
    }

    #[test]
    fn non_negative_accepts_zero() {
        assert!(require_non_negative("age", 0.0).is_ok());
        let err = require_non_negative("age", -1.0).unwrap_err();
        assert_eq!(err.field(), Some("age"));
    }

    #[test]
    fn percentage_bounds() {
        assert!(require_percentage("neutrophils_pct", 100.0).is_ok());
        assert!(require_percentage("neutrophils_pct", 100.5).is_err());
        assert!(require_percentage("neutrophils_pct", -0.1).is_err());
    }

    #[test]
    fn range_warning_only_outside_bounds() {
        let mut warnings = Vec::new();
        check_range("ph", 7.4, 6.5, 8.0, "", &mut warnings);
        assert!(warnings.is_empty());
        check_range("ph", 8.3, 6.5, 8.0, "", &mut warnings);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].expected, "6.5-8");
    }
}
