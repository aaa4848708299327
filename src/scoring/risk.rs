//! Risk scorer.
//!
//! Weighted combination of normalized clinical signals:
//!
//! | Signal | Normalization |
//! |--------|---------------|
//! | waiting_days | `min(days / saturation, 1)` |
//! | stage | `stage / 4` |
//! | ecog | `ecog / 4` |
//! | tumor_growth_rate | as is |
//! | age | `clamp((age - threshold) / span, 0, 1)` |
//!
//! The score is clamped to [0, 1]. With weights summing to 1.0 a patient
//! at maximum severity on every signal scores exactly 1.0.

use crate::config::RiskConfig;
use crate::models::ClinicalProfile;

use super::round_score;

const MAX_STAGE: f64 = 4.0;
const MAX_ECOG: f64 = 4.0;

/// Result of the per-patient clinical stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClinicalAssessment {
    /// Rounded risk score in [0, 1].
    pub risk_score: f64,
    /// Rounded forward-difference wait impact (>= 0).
    pub estimated_wait_impact: f64,
}

fn unrounded_risk(clinical: &ClinicalProfile, config: &RiskConfig) -> f64 {
    let w = &config.weights;
    let waiting =
        (f64::from(clinical.waiting_days) / f64::from(config.waiting_saturation_days)).min(1.0);
    let frailty = ((f64::from(clinical.age) - f64::from(config.age_threshold))
        / f64::from(config.age_span))
    .clamp(0.0, 1.0);

    let score = w.waiting_days * waiting
        + w.stage * (f64::from(clinical.stage) / MAX_STAGE)
        + w.ecog * (f64::from(clinical.ecog) / MAX_ECOG)
        + w.tumor_growth_rate * clinical.tumor_growth_rate
        + w.age * frailty;
    score.clamp(0.0, 1.0)
}

/// Clinical risk score in [0, 1], rounded.
///
/// Pure and deterministic; monotonically non-decreasing in every field.
pub fn risk_score(clinical: &ClinicalProfile, config: &RiskConfig) -> f64 {
    round_score(unrounded_risk(clinical, config))
}

/// Marginal risk increase if the wait grows by `extra_days`.
///
/// Forward difference `risk(wait + extra) - risk(wait)`; zero once the
/// waiting contribution has saturated.
pub fn wait_impact(clinical: &ClinicalProfile, config: &RiskConfig, extra_days: u32) -> f64 {
    let now = unrounded_risk(clinical, config);
    let later = unrounded_risk(&clinical.with_extra_wait(extra_days), config);
    round_score((later - now).max(0.0))
}

/// Runs the whole clinical stage for one patient.
pub fn assess(
    clinical: &ClinicalProfile,
    config: &RiskConfig,
    extra_days: u32,
) -> ClinicalAssessment {
    ClinicalAssessment {
        risk_score: risk_score(clinical, config),
        estimated_wait_impact: wait_impact(clinical, config, extra_days),
    }
}
