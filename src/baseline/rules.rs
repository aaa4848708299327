//! Built-in baseline rules.
//!
//! All rules return lower scores for patients served earlier.

use super::{BaselineRule, RuleScore};
use crate::models::ClinicalProfile;

/// Longest wait first (first referred, first served).
#[derive(Debug, Clone, Copy)]
pub struct LongestWait;

impl BaselineRule for LongestWait {
    fn name(&self) -> &'static str {
        "LONGEST_WAIT"
    }

    fn evaluate(&self, clinical: &ClinicalProfile) -> RuleScore {
        -f64::from(clinical.waiting_days)
    }

    fn description(&self) -> &'static str {
        "Longest waiting time first"
    }
}

/// Highest disease stage first.
#[derive(Debug, Clone, Copy)]
pub struct HighestStage;

impl BaselineRule for HighestStage {
    fn name(&self) -> &'static str {
        "HIGHEST_STAGE"
    }

    fn evaluate(&self, clinical: &ClinicalProfile) -> RuleScore {
        -f64::from(clinical.stage)
    }

    fn description(&self) -> &'static str {
        "Highest disease stage first"
    }
}
