//! Baseline engine.
//!
//! Applies rules in sequence, consulting the next rule only on ties, and
//! finally orders by patient ID so the baseline is a total order that does
//! not depend on input order.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;

use super::{rules, BaselineRule};
use crate::config::BaselineKind;
use crate::models::{PatientRecord, ScoredPatient};

/// Reference ranking and its distance from the prioritized ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineComparison {
    /// Strategy name (e.g. `longest-wait-first`).
    pub strategy: String,
    /// Human-readable strategy description.
    pub description: String,
    /// Descriptions of the chained rules, in evaluation order.
    pub rules: Vec<String>,
    /// Patient IDs in baseline order.
    pub order: Vec<String>,
    /// First patient in the baseline, if any.
    pub top_patient_id: Option<String>,
    /// Positions where the baseline and prioritized orders differ.
    pub displaced_count: usize,
}

impl BaselineComparison {
    /// One-line text summary, used as the `manual_baseline` field.
    pub fn summary(&self) -> String {
        match &self.top_patient_id {
            Some(top) => format!(
                "{}: {} first; {} of {} positions differ from the prioritized order",
                self.description,
                top,
                self.displaced_count,
                self.order.len()
            ),
            None => format!("{}: no patients", self.description),
        }
    }
}

/// A composable baseline ordering.
///
/// # Example
/// ```
/// use waitlist_fair::baseline::{rules, BaselineEngine};
///
/// let engine = BaselineEngine::new("fifo", "Longest wait first")
///     .with_rule(rules::LongestWait)
///     .with_rule(rules::HighestStage);
/// assert_eq!(engine.rule_names(), vec!["LONGEST_WAIT", "HIGHEST_STAGE"]);
/// ```
#[derive(Clone)]
pub struct BaselineEngine {
    name: String,
    description: String,
    rules: Vec<Arc<dyn BaselineRule>>,
    epsilon: f64,
}

impl BaselineEngine {
    /// Creates an engine with no rules (pure patient-ID order).
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            rules: Vec::new(),
            epsilon: 1e-9,
        }
    }

    /// Builds one of the named strategies.
    pub fn for_kind(kind: BaselineKind) -> Self {
        match kind {
            BaselineKind::LongestWaitFirst => Self::new(
                "longest-wait-first",
                "Manual order by longest wait, then highest stage (no risk or fairness scoring)",
            )
            .with_rule(rules::LongestWait)
            .with_rule(rules::HighestStage),
            BaselineKind::StageFirst => Self::new(
                "stage-first",
                "Manual order by highest stage, then longest wait (no risk or fairness scoring)",
            )
            .with_rule(rules::HighestStage)
            .with_rule(rules::LongestWait),
        }
    }

    /// Appends a rule, consulted when all earlier rules tie.
    pub fn with_rule<R: BaselineRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Strategy name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Names of the chained rules, in evaluation order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Descriptions of the chained rules, in evaluation order.
    pub fn rule_descriptions(&self) -> Vec<String> {
        self.rules.iter().map(|r| r.description().to_string()).collect()
    }

    /// Returns indices into `batch` in baseline order.
    pub fn sort_indices(&self, batch: &[PatientRecord]) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..batch.len()).collect();
        indices.sort_by(|&a, &b| self.compare_records(&batch[a], &batch[b]));
        indices
    }

    /// Computes the baseline order and compares it with `prioritized`.
    pub fn compare(
        &self,
        batch: &[PatientRecord],
        prioritized: &[ScoredPatient],
    ) -> BaselineComparison {
        let order: Vec<String> = self
            .sort_indices(batch)
            .into_iter()
            .map(|i| batch[i].patient_id.clone())
            .collect();

        let displaced_count = order
            .iter()
            .zip(prioritized)
            .filter(|(baseline_id, scored)| **baseline_id != scored.patient_id)
            .count();

        BaselineComparison {
            strategy: self.name.clone(),
            description: self.description.clone(),
            rules: self.rule_descriptions(),
            top_patient_id: order.first().cloned(),
            order,
            displaced_count,
        }
    }

    fn compare_records(&self, a: &PatientRecord, b: &PatientRecord) -> Ordering {
        for rule in &self.rules {
            let score_a = rule.evaluate(&a.clinical);
            let score_b = rule.evaluate(&b.clinical);

            if (score_a - score_b).abs() > self.epsilon {
                return score_a.total_cmp(&score_b);
            }
        }

        a.patient_id.cmp(&b.patient_id)
    }
}

impl std::fmt::Debug for BaselineEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BaselineEngine")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("rules", &self.rule_names())
            .finish()
    }
}
