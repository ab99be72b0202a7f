//! Score error types.
//!
//! Every calculator reports failures through [`ScoreError`] so callers can
//! tell a rejected input apart from an ambiguous one without string matching.

use thiserror::Error;

use crate::model::ScoreKind;

/// Errors that can occur while evaluating a clinical score.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoreError {
    /// A value is outside the domain the calculator accepts (negative weight,
    /// NaN, impossible GCS).
    #[error("invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    /// A required field was not supplied and the strict input policy is active.
    #[error("missing required input: {0}")]
    MissingInput(String),

    /// Mutually exclusive selections were both set, or neither was set where
    /// one is needed.
    #[error("ambiguous criteria: {0}")]
    AmbiguousCriteria(String),

    /// The input record could not be deserialized for the calculator.
    #[error("malformed input for {calculator}: {message}")]
    MalformedInput {
        calculator: ScoreKind,
        message: String,
    },

    /// The input record names a field the calculator does not read.
    #[error("unknown input field for {calculator}: {field}")]
    UnknownInput {
        calculator: ScoreKind,
        field: String,
    },

    /// The requested calculator does not exist.
    #[error("unknown calculator: {0}")]
    UnknownCalculator(String),
}

impl ScoreError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ScoreError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Returns the offending field name, if the error is tied to one.
    pub fn field(&self) -> Option<&str> {
        match self {
            ScoreError::InvalidInput { field, .. } => Some(field),
            ScoreError::MissingInput(field) => Some(field),
            ScoreError::UnknownInput { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Returns `true` if resubmitting the same record can never succeed.
    ///
    /// Missing fields can be supplied later; everything else is a property of
    /// the record itself.
    pub fn is_permanent(&self) -> bool {
        !matches!(self, ScoreError::MissingInput(_))
    }
}
