//! Fairness adjuster.
//!
//! Groups whose mean clinical risk sits below the batch mean are treated as
//! under-prioritized. The boost grows with the patient's socioeconomic
//! disadvantage and is amplified by the group's relative deficit:
//!
//! ```text
//! d(g)  = clamp((batch_mean - group_mean) / batch_mean, 0, 1)
//! boost = min(cap, socioeconomic_weight * sei * (1 + group_gap_weight * d(g)))
//! ```
//!
//! The cap bounds how far fairness alone can move a patient up the ranking.

use std::collections::BTreeMap;

use crate::config::FairnessConfig;
use crate::models::EquityProfile;

use super::round_score;

/// Mean risk per group and across the batch.
///
/// Built once all provisional risk scores exist; this is the join point
/// between the per-patient clinical stage and the fairness stage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupRiskProfile {
    batch_mean: f64,
    group_means: BTreeMap<String, f64>,
}

impl GroupRiskProfile {
    /// Aggregates `(group, risk_score)` pairs.
    ///
    /// Sums are accumulated in iteration order; callers pass a canonical
    /// order to get bit-identical means for permuted batches.
    pub fn from_scores<'a>(scores: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        let mut sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();
        let mut total = 0.0;
        let mut count = 0usize;

        for (group, risk) in scores {
            let entry = sums.entry(group.to_string()).or_insert((0.0, 0));
            entry.0 += risk;
            entry.1 += 1;
            total += risk;
            count += 1;
        }

        let batch_mean = if count == 0 { 0.0 } else { total / count as f64 };
        let group_means = sums
            .into_iter()
            .map(|(group, (sum, n))| (group, sum / n as f64))
            .collect();

        Self {
            batch_mean,
            group_means,
        }
    }

    /// Mean risk over the whole batch.
    pub fn batch_mean(&self) -> f64 {
        self.batch_mean
    }

    /// Mean risk of one group.
    pub fn group_mean(&self, group: &str) -> Option<f64> {
        self.group_means.get(group).copied()
    }

    /// Relative risk deficit of a group against the batch, in [0, 1].
    ///
    /// Zero for groups at or above the batch mean, unknown groups, or a
    /// zero-risk batch.
    pub fn disadvantage(&self, group: &str) -> f64 {
        if self.batch_mean <= 0.0 {
            return 0.0;
        }
        match self.group_mean(group) {
            Some(mean) => ((self.batch_mean - mean) / self.batch_mean).clamp(0.0, 1.0),
            None => 0.0,
        }
    }
}

/// Bounded fairness boost in [0, cap].
///
/// Rounded before clamping, so a cap with more than four decimals is still
/// an upper bound. Non-decreasing in `socioeconomic_index` for a fixed
/// group profile.
pub fn fairness_boost(
    equity: &EquityProfile,
    profile: &GroupRiskProfile,
    config: &FairnessConfig,
) -> f64 {
    let amplification = 1.0 + config.group_gap_weight * profile.disadvantage(&equity.group);
    let raw = config.socioeconomic_weight * equity.socioeconomic_index * amplification;
    round_score(raw).clamp(0.0, config.cap)
}
