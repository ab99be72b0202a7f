//! clinscore-report: Report rendering for clinscore.
//!
//! JSON persistence lives on [`clinscore_core::report::ScoreReport`]; this
//! crate renders the same report as a self-contained HTML page.

pub mod html;
