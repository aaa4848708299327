//! Wait-list domain models.
//!
//! Provides the typed patient record accepted by the engine and the
//! derived, per-patient scoring result it emits.
//!
//! # Record Views
//!
//! | View | Fields | Consumed by |
//! |------|--------|-------------|
//! | `ClinicalProfile` | age, waiting_days, stage, ecog, tumor_growth_rate | Risk scorer, baseline rules |
//! | `EquityProfile` | socioeconomic_index, group | Fairness adjuster, equity audit |
//!
//! The split is structural: the risk scorer only ever receives a
//! `ClinicalProfile`, so cohort labels cannot leak into clinical urgency.

mod patient;
mod scored;

pub use patient::{ClinicalProfile, EquityProfile, PatientRecord};
pub use scored::{PriorityCategory, ScoredPatient};
