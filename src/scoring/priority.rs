//! Priority composer and ranking order.
//!
//! `priority_score = risk_score + fairness_boost`, categorized against
//! fixed thresholds. The final list is sorted by:
//!
//! 1. `priority_score` descending
//! 2. `risk_score` descending
//! 3. `waiting_days` descending
//! 4. `patient_id` ascending
//!
//! which is a total order because patient IDs are unique in a batch.

use std::cmp::Ordering;

use crate::config::PriorityThresholds;
use crate::models::{PatientRecord, PriorityCategory, ScoredPatient};

use super::{round_score, ClinicalAssessment};

/// Maps a priority score to its category.
///
/// A monotone step function: a higher score never gets a lower category.
pub fn categorize(priority_score: f64, thresholds: &PriorityThresholds) -> PriorityCategory {
    if priority_score >= thresholds.high {
        PriorityCategory::High
    } else if priority_score >= thresholds.medium {
        PriorityCategory::Medium
    } else {
        PriorityCategory::Low
    }
}

/// Builds the scored patient from its clinical assessment and boost.
///
/// The priority never exceeds `risk_score + boost_cap`, even when rounding
/// the sum would step over it.
pub fn compose(
    record: &PatientRecord,
    assessment: ClinicalAssessment,
    fairness_boost: f64,
    boost_cap: f64,
    thresholds: &PriorityThresholds,
) -> ScoredPatient {
    let priority_score = round_score(assessment.risk_score + fairness_boost)
        .min(assessment.risk_score + boost_cap);
    ScoredPatient {
        patient_id: record.patient_id.clone(),
        group: record.equity.group.clone(),
        waiting_days: record.clinical.waiting_days,
        risk_score: assessment.risk_score,
        fairness_boost,
        priority_score,
        suggested_priority: categorize(priority_score, thresholds),
        estimated_wait_impact: assessment.estimated_wait_impact,
    }
}

/// Ranking comparator: `Less` means `a` is served before `b`.
pub fn ranking_order(a: &ScoredPatient, b: &ScoredPatient) -> Ordering {
    b.priority_score
        .total_cmp(&a.priority_score)
        .then_with(|| b.risk_score.total_cmp(&a.risk_score))
        .then_with(|| b.waiting_days.cmp(&a.waiting_days))
        .then_with(|| a.patient_id.cmp(&b.patient_id))
}

/// Sorts scored patients into their final ranking.
pub fn rank(mut scored: Vec<ScoredPatient>) -> Vec<ScoredPatient> {
    scored.sort_by(ranking_order);
    scored
}
