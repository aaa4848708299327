//! Scored patient model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete urgency category derived from the priority score.
///
/// Declared in ascending urgency so the derived `Ord` follows urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PriorityCategory {
    /// Below the medium threshold.
    Low,
    /// At or above the medium threshold.
    Medium,
    /// At or above the high threshold.
    High,
}

impl PriorityCategory {
    /// Wire label (`HIGH`, `MEDIUM`, `LOW`).
    pub fn as_str(&self) -> &'static str {
        match self {
            PriorityCategory::High => "HIGH",
            PriorityCategory::Medium => "MEDIUM",
            PriorityCategory::Low => "LOW",
        }
    }
}

impl fmt::Display for PriorityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-patient scoring result.
///
/// All scores are rounded to four decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPatient {
    /// Identifier copied from the input record.
    pub patient_id: String,
    /// Cohort label copied from the input record.
    pub group: String,
    /// Days since referral (second tie-break key).
    pub waiting_days: u32,
    /// Clinical urgency in [0, 1].
    pub risk_score: f64,
    /// Additive fairness correction in [0, cap].
    pub fairness_boost: f64,
    /// `risk_score + fairness_boost`, the ranking key.
    pub priority_score: f64,
    /// Category from fixed thresholds on `priority_score`.
    pub suggested_priority: PriorityCategory,
    /// Marginal risk increase for one further unit of delay.
    pub estimated_wait_impact: f64,
}

impl ScoredPatient {
    /// Whether the patient was categorized `HIGH`.
    pub fn is_high_priority(&self) -> bool {
        self.suggested_priority == PriorityCategory::High
    }
}
