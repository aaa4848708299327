//! Manual baseline comparator.
//!
//! Produces the reference ranking a clinician would get without risk or
//! fairness weighting, and measures how far the prioritized ranking moves
//! away from it. Baselines are built from composable rules, so a different
//! reference (FIFO, stage-only, ...) is a configuration change only.
//!
//! # Usage
//!
//! ```
//! use waitlist_fair::baseline::{rules, BaselineEngine};
//!
//! let engine = BaselineEngine::new("stage-only", "Highest stage first")
//!     .with_rule(rules::HighestStage);
//! assert_eq!(engine.name(), "stage-only");
//! ```

mod engine;
pub mod rules;

pub use engine::{BaselineComparison, BaselineEngine};

use crate::models::ClinicalProfile;
use std::fmt::Debug;

/// Score returned by a baseline rule.
///
/// Lower scores = served earlier.
pub type RuleScore = f64;

/// A rule contributing to a baseline ordering.
///
/// # Score Convention
/// **Lower score = earlier in the baseline.** Rules only see the clinical
/// view of a patient, never fairness fields.
pub trait BaselineRule: Send + Sync + Debug {
    /// Rule name (e.g., "LONGEST_WAIT").
    fn name(&self) -> &'static str;

    /// Evaluates a patient; lower = earlier.
    fn evaluate(&self, clinical: &ClinicalProfile) -> RuleScore;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}
