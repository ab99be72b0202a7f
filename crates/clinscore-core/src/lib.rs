//! clinscore-core: Clinical risk-score calculators, case sets and reports.
//!
//! This crate holds the pure scoring functions, the [`traits::ScoreCalculator`]
//! trait that unifies them, and the batch engine, parser and report types the
//! rest of clinscore builds on.

pub mod calculators;
pub mod catalogue;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod parser;
pub mod report;
pub mod statistics;
pub mod traits;
pub mod validation;

pub use engine::{evaluate, ScoreEngine};
pub use error::ScoreError;
pub use model::{InputPolicy, ScoreKind, ScoreOutcome};
