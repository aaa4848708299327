//! Per-patient scoring stages.
//!
//! - **`risk`**: clinical urgency from a `ClinicalProfile` only
//! - **`fairness`**: group risk profile and the bounded fairness boost
//! - **`priority`**: priority score, urgency category, ranking order
//!
//! Emitted scores are rounded to [`SCORE_DECIMALS`] decimals. Rounding is
//! monotone, so orderings and monotonicity properties are preserved.

pub mod fairness;
pub mod priority;
pub mod risk;

pub use fairness::{fairness_boost, GroupRiskProfile};
pub use priority::{categorize, compose, rank, ranking_order};
pub use risk::{assess, risk_score, wait_impact, ClinicalAssessment};

/// Decimal places kept in emitted scores.
pub const SCORE_DECIMALS: i32 = 4;

/// Rounds a score to [`SCORE_DECIMALS`] decimals.
pub fn round_score(value: f64) -> f64 {
    let scale = 10f64.powi(SCORE_DECIMALS);
    (value * scale).round() / scale
}
