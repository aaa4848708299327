//! Prioritization pipeline.
//!
//! # Algorithm
//!
//! 1. Validate the raw batch (fail-fast) and sort it by patient ID.
//! 2. Fan out: clinical assessment per patient (risk, wait impact).
//! 3. Join: group risk profile over the complete batch.
//! 4. Fan out: fairness boost and priority composition per patient.
//! 5. Rank, audit equity, and compare against the manual baseline.
//!
//! The fan-out stages run on rayon when `EngineConfig::parallel` is set.
//! Sorting by ID before any aggregation makes every floating-point sum run
//! in the same order for any permutation of the input.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

use crate::audit::EquityMetrics;
use crate::baseline::{BaselineComparison, BaselineEngine};
use crate::config::EngineConfig;
use crate::error::{ConfigError, EngineError};
use crate::models::{PatientRecord, ScoredPatient};
use crate::scoring::{self, ClinicalAssessment, GroupRiskProfile};
use crate::validation::validate_batch;

/// The `POST /prioritize` response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrioritizationResponse {
    /// Text summary of the manual baseline.
    pub manual_baseline: String,
    /// Batch equity metrics.
    pub metrics: EquityMetrics,
    /// Scored patients in final ranking order.
    pub prioritized: Vec<ScoredPatient>,
    /// Structured manual baseline.
    pub baseline: BaselineComparison,
}

/// Runs the full prioritization for one batch.
///
/// Holds no per-request state; one instance can serve concurrent requests.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use waitlist_fair::config::EngineConfig;
/// use waitlist_fair::pipeline::Prioritizer;
///
/// let prioritizer = Prioritizer::new(EngineConfig::default()).unwrap();
/// let response = prioritizer
///     .prioritize(&[json!({
///         "patient_id": "P-001", "age": 57, "waiting_days": 35, "stage": 3,
///         "ecog": 1, "tumor_growth_rate": 0.6, "socioeconomic_index": 0.7,
///         "group": "BPJS-Regional"
///     })])
///     .unwrap();
/// assert_eq!(response.prioritized.len(), 1);
/// assert_eq!(response.metrics.equity_gap, 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct Prioritizer {
    config: EngineConfig,
    baseline: BaselineEngine,
}

impl Prioritizer {
    /// Creates a prioritizer after validating `config`.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let baseline = BaselineEngine::for_kind(config.baseline);
        Ok(Self { config, baseline })
    }

    /// Replaces the baseline strategy.
    pub fn with_baseline(mut self, baseline: BaselineEngine) -> Self {
        self.baseline = baseline;
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validates, scores, ranks, and audits a raw batch.
    ///
    /// Either the complete response is returned or an error; there is no
    /// partial result.
    pub fn prioritize(&self, raw: &[Value]) -> Result<PrioritizationResponse, EngineError> {
        let started = Instant::now();

        let mut batch = validate_batch(raw, &self.config.limits)?;
        batch.sort_by(|a, b| a.patient_id.cmp(&b.patient_id));

        let scored = self.score(&batch);
        let metrics = EquityMetrics::calculate(&scored)?;
        let prioritized = scoring::rank(scored);
        let baseline = self.baseline.compare(&batch, &prioritized);

        log::debug!(
            "prioritized {} patients in {} groups ({} HIGH, gap {:.4}) in {:?}",
            metrics.patient_count,
            metrics.groups.len(),
            metrics.high_risk_count,
            metrics.equity_gap,
            started.elapsed()
        );

        Ok(PrioritizationResponse {
            manual_baseline: baseline.summary(),
            metrics,
            prioritized,
            baseline,
        })
    }

    /// Scores a validated batch, preserving its order.
    pub fn score(&self, batch: &[PatientRecord]) -> Vec<ScoredPatient> {
        let config = &self.config;

        let assessments: Vec<ClinicalAssessment> = self.fan_out(batch, |record| {
            scoring::assess(&record.clinical, &config.risk, config.wait_impact_days)
        });

        let profile = GroupRiskProfile::from_scores(
            batch
                .iter()
                .zip(&assessments)
                .map(|(record, a)| (record.group(), a.risk_score)),
        );

        let pending: Vec<(&PatientRecord, ClinicalAssessment)> =
            batch.iter().zip(assessments).collect();

        self.fan_out(&pending, |&(record, assessment)| {
            let boost = scoring::fairness_boost(&record.equity, &profile, &config.fairness);
            scoring::compose(
                record,
                assessment,
                boost,
                config.fairness.cap,
                &config.thresholds,
            )
        })
    }

    fn fan_out<T, R, F>(&self, items: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        if self.config.parallel {
            items.par_iter().map(f).collect()
        } else {
            items.iter().map(f).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baseline::rules;
    use crate::models::PriorityCategory;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;
    use serde_json::json;

    fn sample_patients() -> Vec<Value> {
        vec![
            json!({
                "patient_id": "P-001", "age": 57, "waiting_days": 35, "stage": 3, "ecog": 1,
                "tumor_growth_rate": 0.6, "socioeconomic_index": 0.7, "group": "BPJS-Regional"
            }),
            json!({
                "patient_id": "P-002", "age": 45, "waiting_days": 21, "stage": 2, "ecog": 0,
                "tumor_growth_rate": 0.35, "socioeconomic_index": 0.2, "group": "Asuransi-Perkotaan"
            }),
            json!({
                "patient_id": "P-003", "age": 64, "waiting_days": 49, "stage": 4, "ecog": 2,
                "tumor_growth_rate": 0.75, "socioeconomic_index": 0.9, "group": "BPJS-Regional"
            }),
        ]
    }

    fn prioritizer() -> Prioritizer {
        Prioritizer::new(EngineConfig::default()).unwrap()
    }

    fn find<'a>(response: &'a PrioritizationResponse, id: &str) -> &'a ScoredPatient {
        response
            .prioritized
            .iter()
            .find(|p| p.patient_id == id)
            .unwrap()
    }

    #[test]
    fn test_sample_scenario() {
        let response = prioritizer().prioritize(&sample_patients()).unwrap();
        let p1 = find(&response, "P-001");
        let p2 = find(&response, "P-002");
        let p3 = find(&response, "P-003");

        assert!(p3.risk_score > p1.risk_score && p3.risk_score > p2.risk_score);
        assert!(p1.fairness_boost > p2.fairness_boost);
        assert!(p3.fairness_boost > p2.fairness_boost);
        assert_eq!(response.prioritized[0].patient_id, "P-003");

        let avg = &response.metrics.avg_priority_by_group;
        assert!(avg["BPJS-Regional"] > avg["Asuransi-Perkotaan"]);
        assert!(response.metrics.equity_gap > 0.0 && response.metrics.equity_gap.is_finite());
    }

    #[test]
    fn test_sample_exact_scores() {
        let response = prioritizer().prioritize(&sample_patients()).unwrap();
        let ids: Vec<&str> = response
            .prioritized
            .iter()
            .map(|p| p.patient_id.as_str())
            .collect();
        assert_eq!(ids, ["P-003", "P-001", "P-002"]);

        let p3 = find(&response, "P-003");
        assert_eq!(p3.risk_score, 0.7223);
        assert_eq!(p3.fairness_boost, 0.135);
        assert_eq!(p3.priority_score, 0.8573);
        assert_eq!(p3.suggested_priority, PriorityCategory::High);

        let p1 = find(&response, "P-001");
        assert_eq!(p1.priority_score, 0.6306);
        assert_eq!(p1.suggested_priority, PriorityCategory::Medium);

        let p2 = find(&response, "P-002");
        assert_eq!(p2.fairness_boost, 0.043);
        assert_eq!(p2.suggested_priority, PriorityCategory::Low);

        assert_eq!(response.metrics.high_risk_count, 1);
        assert_eq!(response.baseline.top_patient_id.as_deref(), Some("P-003"));
        assert_eq!(response.baseline.displaced_count, 0);
        assert!(response.manual_baseline.contains("P-003 first"));
    }

    #[test]
    fn test_empty_batch_rejected() {
        assert_eq!(
            prioritizer().prioritize(&[]).unwrap_err(),
            EngineError::EmptyBatch
        );
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut raw = sample_patients();
        raw[2]["patient_id"] = json!("P-001");
        assert!(matches!(
            prioritizer().prioritize(&raw).unwrap_err(),
            EngineError::DuplicateId { .. }
        ));
    }

    #[test]
    fn test_batch_too_large() {
        let p = Prioritizer::new(EngineConfig::default().with_max_batch_size(2)).unwrap();
        assert_eq!(
            p.prioritize(&sample_patients()).unwrap_err(),
            EngineError::BatchTooLarge { size: 3, max: 2 }
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(Prioritizer::new(EngineConfig::default().with_fairness_cap(2.0)).is_err());
    }

    #[test]
    fn test_fine_grained_cap_bounds_scores() {
        let raw = vec![
            json!({
                "patient_id": "A", "age": 90, "waiting_days": 120, "stage": 4, "ecog": 4,
                "tumor_growth_rate": 1.0, "socioeconomic_index": 1.0, "group": "G1"
            }),
            json!({
                "patient_id": "B", "age": 30, "waiting_days": 5, "stage": 1, "ecog": 0,
                "tumor_growth_rate": 0.1, "socioeconomic_index": 1.0, "group": "G2"
            }),
        ];
        let cap = 0.12345;
        let response = Prioritizer::new(EngineConfig::default().with_fairness_cap(cap))
            .unwrap()
            .prioritize(&raw)
            .unwrap();
        for s in &response.prioritized {
            assert_eq!(s.fairness_boost, cap);
            assert!(s.priority_score <= s.risk_score + cap);
        }
        assert_eq!(find(&response, "A").risk_score, 1.0);
        assert!(find(&response, "A").priority_score <= 1.0 + cap);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let raw = sample_patients();
        let parallel = prioritizer().prioritize(&raw).unwrap();
        let sequential = Prioritizer::new(EngineConfig::default().with_parallel(false))
            .unwrap()
            .prioritize(&raw)
            .unwrap();
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_custom_baseline() {
        let p = prioritizer().with_baseline(
            BaselineEngine::new("stage-only", "Highest stage first").with_rule(rules::HighestStage),
        );
        let response = p.prioritize(&sample_patients()).unwrap();
        assert_eq!(response.baseline.strategy, "stage-only");
        assert_eq!(response.baseline.order, ["P-003", "P-001", "P-002"]);
    }

    #[test]
    fn test_byte_identical_responses() {
        let raw = sample_patients();
        let a = serde_json::to_string(&prioritizer().prioritize(&raw).unwrap()).unwrap();
        let b = serde_json::to_string(&prioritizer().prioritize(&raw).unwrap()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_shuffled_input_same_response() {
        let raw = sample_patients();
        let expected = serde_json::to_string(&prioritizer().prioritize(&raw).unwrap()).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..10 {
            let mut shuffled = raw.clone();
            shuffled.shuffle(&mut rng);
            let got = serde_json::to_string(&prioritizer().prioritize(&shuffled).unwrap()).unwrap();
            assert_eq!(got, expected);
        }
    }

    const GROUPS: [&str; 3] = ["BPJS-Regional", "Asuransi-Perkotaan", "Mandiri"];

    fn arb_patient() -> impl Strategy<Value = (u32, u32, u8, u8, f64, f64, usize)> {
        (
            0u32..=120,
            0u32..=200,
            1u8..=4,
            0u8..=4,
            0.0f64..=1.0,
            0.0f64..=1.0,
            0usize..GROUPS.len(),
        )
    }

    fn to_json(rows: &[(u32, u32, u8, u8, f64, f64, usize)]) -> Vec<Value> {
        rows.iter()
            .enumerate()
            .map(|(i, &(age, waiting, stage, ecog, growth, sei, group))| {
                json!({
                    "patient_id": format!("P-{i:03}"),
                    "age": age,
                    "waiting_days": waiting,
                    "stage": stage,
                    "ecog": ecog,
                    "tumor_growth_rate": growth,
                    "socioeconomic_index": sei,
                    "group": GROUPS[group],
                })
            })
            .collect()
    }

    proptest! {
        #[test]
        fn prop_bounded_scores(rows in proptest::collection::vec(arb_patient(), 1..40)) {
            let p = prioritizer();
            let cap = p.config().fairness.cap;
            let response = p.prioritize(&to_json(&rows)).unwrap();
            prop_assert!(response.metrics.equity_gap >= 0.0);
            for s in &response.prioritized {
                prop_assert!((0.0..=1.0).contains(&s.risk_score));
                prop_assert!(s.fairness_boost >= 0.0 && s.fairness_boost <= cap);
                prop_assert!(s.priority_score >= 0.0 && s.priority_score <= 1.0 + cap);
            }
        }

        #[test]
        fn prop_bounded_scores_any_cap(
            rows in proptest::collection::vec(arb_patient(), 1..40),
            cap in 0.0f64..=1.0,
        ) {
            let p = Prioritizer::new(EngineConfig::default().with_fairness_cap(cap)).unwrap();
            let response = p.prioritize(&to_json(&rows)).unwrap();
            for s in &response.prioritized {
                prop_assert!(s.fairness_boost >= 0.0 && s.fairness_boost <= cap);
                prop_assert!(s.priority_score <= s.risk_score + cap);
                prop_assert!(s.priority_score <= 1.0 + cap);
            }
        }

        #[test]
        fn prop_order_independent(
            rows in proptest::collection::vec(arb_patient(), 1..40),
            seed in any::<u64>(),
        ) {
            let raw = to_json(&rows);
            let mut shuffled = raw.clone();
            shuffled.shuffle(&mut StdRng::seed_from_u64(seed));
            prop_assert_eq!(
                prioritizer().prioritize(&raw).unwrap(),
                prioritizer().prioritize(&shuffled).unwrap()
            );
        }

        #[test]
        fn prop_ranked_by_priority_and_category_consistent(
            rows in proptest::collection::vec(arb_patient(), 1..40)
        ) {
            let response = prioritizer().prioritize(&to_json(&rows)).unwrap();
            for pair in response.prioritized.windows(2) {
                prop_assert!(pair[0].priority_score >= pair[1].priority_score);
                prop_assert!(pair[0].suggested_priority >= pair[1].suggested_priority);
            }
        }

        #[test]
        fn prop_single_group_zero_gap(rows in proptest::collection::vec(arb_patient(), 1..20)) {
            let single: Vec<_> = rows.into_iter().map(|r| (r.0, r.1, r.2, r.3, r.4, r.5, 0)).collect();
            let response = prioritizer().prioritize(&to_json(&single)).unwrap();
            prop_assert_eq!(response.metrics.equity_gap, 0.0);
        }

        #[test]
        fn prop_index_raise_never_lowers_boost(
            rows in proptest::collection::vec(arb_patient(), 1..20),
            pick in any::<prop::sample::Index>(),
            bump in 0.0f64..=1.0,
        ) {
            let raw = to_json(&rows);
            let i = pick.index(raw.len());
            let before = raw[i]["socioeconomic_index"].as_f64().unwrap();
            let mut raised = raw.clone();
            raised[i]["socioeconomic_index"] = json!((before + bump).min(1.0));
            let id = format!("P-{i:03}");

            let a = prioritizer().prioritize(&raw).unwrap();
            let b = prioritizer().prioritize(&raised).unwrap();
            prop_assert!(find(&b, &id).fairness_boost >= find(&a, &id).fairness_boost);
        }
    }
}
