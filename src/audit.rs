//! Equity audit over a fully scored batch.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | High-risk count | Patients categorized `HIGH` |
//! | Avg priority by group | Mean `priority_score` per group |
//! | Equity gap | max − min of the group averages |
//! | Group summary | Count and mean risk, boost, priority per group |
//!
//! Group statistics are only defined on complete data, so the audit runs
//! after every patient in the batch has a priority score.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::EngineError;
use crate::models::ScoredPatient;
use crate::scoring::round_score;

/// Per-group aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    /// Patients in the group.
    pub count: usize,
    /// Mean risk score.
    pub mean_risk: f64,
    /// Mean fairness boost.
    pub mean_fairness_boost: f64,
    /// Mean priority score.
    pub mean_priority: f64,
}

/// Batch-wide equity metrics.
///
/// Maps are ordered by group label so serialization is deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityMetrics {
    /// Patients categorized `HIGH`.
    pub high_risk_count: usize,
    /// Max minus min of the group priority averages (>= 0).
    pub equity_gap: f64,
    /// Mean priority score per group.
    pub avg_priority_by_group: BTreeMap<String, f64>,
    /// Patients in the batch.
    pub patient_count: usize,
    /// Detailed per-group aggregates.
    pub groups: BTreeMap<String, GroupSummary>,
}

#[derive(Default)]
struct GroupAccumulator {
    count: usize,
    risk: f64,
    boost: f64,
    priority: f64,
}

impl EquityMetrics {
    /// Computes metrics from the scored batch.
    ///
    /// # Errors
    /// `InsufficientData` when `scored` is empty.
    pub fn calculate(scored: &[ScoredPatient]) -> Result<Self, EngineError> {
        if scored.is_empty() {
            return Err(EngineError::InsufficientData);
        }

        let mut accumulators: BTreeMap<&str, GroupAccumulator> = BTreeMap::new();
        let mut high_risk_count = 0;

        for patient in scored {
            let acc = accumulators.entry(patient.group.as_str()).or_default();
            acc.count += 1;
            acc.risk += patient.risk_score;
            acc.boost += patient.fairness_boost;
            acc.priority += patient.priority_score;

            if patient.is_high_priority() {
                high_risk_count += 1;
            }
        }

        let groups: BTreeMap<String, GroupSummary> = accumulators
            .into_iter()
            .map(|(group, acc)| {
                let n = acc.count as f64;
                let summary = GroupSummary {
                    count: acc.count,
                    mean_risk: round_score(acc.risk / n),
                    mean_fairness_boost: round_score(acc.boost / n),
                    mean_priority: round_score(acc.priority / n),
                };
                (group.to_string(), summary)
            })
            .collect();

        let avg_priority_by_group: BTreeMap<String, f64> = groups
            .iter()
            .map(|(group, summary)| (group.clone(), summary.mean_priority))
            .collect();

        let (min, max) = avg_priority_by_group
            .values()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let equity_gap = round_score((max - min).max(0.0));

        Ok(Self {
            high_risk_count,
            equity_gap,
            avg_priority_by_group,
            patient_count: scored.len(),
            groups,
        })
    }
}

/// Mean `estimated_wait_impact` over `HIGH` patients, 0 when there are none.
///
/// Reproduces the figure the browser UI derives from the returned list.
pub fn mean_high_priority_wait_impact(prioritized: &[ScoredPatient]) -> f64 {
    let (sum, count) = prioritized
        .iter()
        .filter(|p| p.is_high_priority())
        .fold((0.0, 0usize), |(sum, count), p| {
            (sum + p.estimated_wait_impact, count + 1)
        });
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
