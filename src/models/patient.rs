//! Patient record model.
//!
//! A patient record is immutable once accepted by the validator.

use serde::{Deserialize, Serialize};

/// Clinical and temporal fields of a patient.
///
/// This is the only input the risk scorer sees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClinicalProfile {
    /// Age in years.
    pub age: u32,
    /// Days since referral.
    pub waiting_days: u32,
    /// Disease stage, 1..=4.
    pub stage: u8,
    /// ECOG performance status, 0..=4 (higher = worse function).
    pub ecog: u8,
    /// Normalized growth velocity, 0.0..=1.0.
    pub tumor_growth_rate: f64,
}

impl ClinicalProfile {
    /// Returns a copy with `waiting_days` extended by `days` (saturating).
    pub fn with_extra_wait(self, days: u32) -> Self {
        Self {
            waiting_days: self.waiting_days.saturating_add(days),
            ..self
        }
    }
}

/// Fields used only for fairness accounting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityProfile {
    /// 0.0..=1.0, higher = more disadvantaged/underserved.
    pub socioeconomic_index: f64,
    /// Cohort label (e.g. insurance or regional category).
    pub group: String,
}

/// A validated patient record.
///
/// Serializes to the flat wire shape (`patient_id`, `age`, ..., `group`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    /// Opaque, batch-unique identifier.
    pub patient_id: String,
    /// Clinical view.
    #[serde(flatten)]
    pub clinical: ClinicalProfile,
    /// Fairness view.
    #[serde(flatten)]
    pub equity: EquityProfile,
}

impl PatientRecord {
    /// Creates a record from its two views.
    pub fn new(
        patient_id: impl Into<String>,
        clinical: ClinicalProfile,
        equity: EquityProfile,
    ) -> Self {
        Self {
            patient_id: patient_id.into(),
            clinical,
            equity,
        }
    }

    /// Cohort label.
    pub fn group(&self) -> &str {
        &self.equity.group
    }
}
