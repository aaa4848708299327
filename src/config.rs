//! Engine configuration.
//!
//! [`EngineConfig`] holds every constant the engine uses: risk weights,
//! fairness parameters, category thresholds, and batch limits. Nothing is
//! learned; all values are fixed, documented, and overridable from TOML.
//!
//! # TOML Layout
//!
//! ```toml
//! wait_impact_days = 7
//! parallel = true
//! baseline = "longest-wait-first"
//!
//! [risk]
//! waiting_saturation_days = 90
//!
//! [risk.weights]
//! stage = 0.28
//!
//! [fairness]
//! cap = 0.3
//!
//! [thresholds]
//! high = 0.65
//! medium = 0.45
//!
//! [limits]
//! max_batch_size = 5000
//! ```
//!
//! Omitted keys fall back to the defaults below.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Weights of the normalized clinical signals in the risk score.
///
/// Must be non-negative and sum to 1.0 so a patient at maximum severity
/// on every signal scores exactly 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskWeights {
    /// Weight of `min(waiting_days / saturation, 1)`.
    pub waiting_days: f64,
    /// Weight of `stage / 4`.
    pub stage: f64,
    /// Weight of `ecog / 4`.
    pub ecog: f64,
    /// Weight of `tumor_growth_rate`.
    pub tumor_growth_rate: f64,
    /// Weight of the frailty term `clamp((age - threshold) / span, 0, 1)`.
    pub age: f64,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            waiting_days: 0.22,
            stage: 0.28,
            ecog: 0.15,
            tumor_growth_rate: 0.25,
            age: 0.10,
        }
    }
}

impl RiskWeights {
    /// Sum of all weights.
    pub fn total(&self) -> f64 {
        self.waiting_days + self.stage + self.ecog + self.tumor_growth_rate + self.age
    }

    fn all(&self) -> [(&'static str, f64); 5] {
        [
            ("waiting_days", self.waiting_days),
            ("stage", self.stage),
            ("ecog", self.ecog),
            ("tumor_growth_rate", self.tumor_growth_rate),
            ("age", self.age),
        ]
    }
}

/// Risk scorer parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Signal weights.
    pub weights: RiskWeights,
    /// Wait (days) at which the waiting contribution saturates.
    pub waiting_saturation_days: u32,
    /// Age (years) above which frailty starts adding risk.
    pub age_threshold: u32,
    /// Years over which the frailty term ramps from 0 to 1.
    pub age_span: u32,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            weights: RiskWeights::default(),
            waiting_saturation_days: 90,
            age_threshold: 40,
            age_span: 40,
        }
    }
}

/// Fairness adjuster parameters.
///
/// `boost = min(cap, socioeconomic_weight * sei * (1 + group_gap_weight * d))`
/// where `d` in [0, 1] is the group's relative risk deficit against the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FairnessConfig {
    /// Boost per unit of socioeconomic disadvantage.
    pub socioeconomic_weight: f64,
    /// Amplification for under-prioritized groups.
    pub group_gap_weight: f64,
    /// Upper bound of the boost.
    pub cap: f64,
}

impl Default for FairnessConfig {
    fn default() -> Self {
        Self {
            socioeconomic_weight: 0.15,
            group_gap_weight: 1.0,
            cap: 0.3,
        }
    }
}

/// Category thresholds on the priority score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityThresholds {
    /// `priority_score >= high` → `HIGH`.
    pub high: f64,
    /// `priority_score >= medium` → `MEDIUM`.
    pub medium: f64,
}

impl Default for PriorityThresholds {
    fn default() -> Self {
        Self {
            high: 0.65,
            medium: 0.45,
        }
    }
}

/// Input limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Largest accepted batch.
    pub max_batch_size: usize,
    /// Largest accepted `age`.
    pub max_age: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_batch_size: 5000,
            max_age: 120,
        }
    }
}

/// Which reference ranking the baseline comparator uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BaselineKind {
    /// Longest wait first, then highest stage.
    #[default]
    LongestWaitFirst,
    /// Highest stage first, then longest wait.
    StageFirst,
}

/// Configuration for the prioritization engine.
///
/// # Defaults
///
/// ```
/// use waitlist_fair::config::EngineConfig;
///
/// let config = EngineConfig::default();
/// assert_eq!(config.limits.max_batch_size, 5000);
/// assert!(config.validate().is_ok());
/// ```
///
/// # Builder Pattern
///
/// ```
/// use waitlist_fair::config::{BaselineKind, EngineConfig};
///
/// let config = EngineConfig::default()
///     .with_max_batch_size(100)
///     .with_fairness_cap(0.2)
///     .with_baseline(BaselineKind::StageFirst);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Risk scorer parameters.
    pub risk: RiskConfig,
    /// Fairness adjuster parameters.
    pub fairness: FairnessConfig,
    /// Category thresholds.
    pub thresholds: PriorityThresholds,
    /// Input limits.
    pub limits: LimitsConfig,
    /// Extra delay (days) used for `estimated_wait_impact`.
    pub wait_impact_days: u32,
    /// Whether per-patient scoring fans out on rayon.
    pub parallel: bool,
    /// Reference ranking strategy.
    pub baseline: BaselineKind,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            risk: RiskConfig::default(),
            fairness: FairnessConfig::default(),
            thresholds: PriorityThresholds::default(),
            limits: LimitsConfig::default(),
            wait_impact_days: 7,
            parallel: true,
            baseline: BaselineKind::default(),
        }
    }
}

impl EngineConfig {
    /// Loads and validates configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the risk weights.
    pub fn with_risk_weights(mut self, weights: RiskWeights) -> Self {
        self.risk.weights = weights;
        self
    }

    /// Sets the fairness boost cap.
    pub fn with_fairness_cap(mut self, cap: f64) -> Self {
        self.fairness.cap = cap;
        self
    }

    /// Sets the category thresholds.
    pub fn with_thresholds(mut self, high: f64, medium: f64) -> Self {
        self.thresholds = PriorityThresholds { high, medium };
        self
    }

    /// Sets the maximum batch size.
    pub fn with_max_batch_size(mut self, n: usize) -> Self {
        self.limits.max_batch_size = n;
        self
    }

    /// Sets the wait-impact delay unit (days).
    pub fn with_wait_impact_days(mut self, days: u32) -> Self {
        self.wait_impact_days = days;
        self
    }

    /// Enables or disables rayon fan-out.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the baseline strategy.
    pub fn with_baseline(mut self, baseline: BaselineKind) -> Self {
        self.baseline = baseline;
        self
    }

    /// Validates parameter consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, w) in self.risk.weights.all() {
            if !w.is_finite() || w < 0.0 {
                return Err(ConfigError::invalid(format!(
                    "risk weight '{name}' must be a non-negative number, got {w}"
                )));
            }
        }
        let total = self.risk.weights.total();
        if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::invalid(format!(
                "risk weights must sum to 1.0, got {total}"
            )));
        }
        if self.risk.waiting_saturation_days == 0 {
            return Err(ConfigError::invalid("waiting_saturation_days must be at least 1"));
        }
        if self.risk.age_span == 0 {
            return Err(ConfigError::invalid("age_span must be at least 1"));
        }

        let f = &self.fairness;
        for (name, v) in [
            ("socioeconomic_weight", f.socioeconomic_weight),
            ("group_gap_weight", f.group_gap_weight),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(ConfigError::invalid(format!(
                    "fairness '{name}' must be a non-negative number, got {v}"
                )));
            }
        }
        if !(0.0..=1.0).contains(&f.cap) {
            return Err(ConfigError::invalid(format!(
                "fairness cap must be within [0, 1], got {}",
                f.cap
            )));
        }

        let t = &self.thresholds;
        if !t.medium.is_finite() || !t.high.is_finite() || t.medium < 0.0 || t.medium > t.high {
            return Err(ConfigError::invalid(format!(
                "thresholds must satisfy 0 <= medium <= high, got medium={} high={}",
                t.medium, t.high
            )));
        }

        if self.limits.max_batch_size == 0 {
            return Err(ConfigError::invalid("max_batch_size must be at least 1"));
        }
        if self.limits.max_age == 0 {
            return Err(ConfigError::invalid("max_age must be at least 1"));
        }
        if self.wait_impact_days == 0 {
            return Err(ConfigError::invalid("wait_impact_days must be at least 1"));
        }
        Ok(())
    }
}
