//! Fair, risk-aware prioritization for radiotherapy wait lists.
//!
//! Ranks a batch of waiting patients by clinical urgency plus a bounded
//! fairness correction, and reports equity metrics alongside a manual
//! baseline ranking for contrast. Deterministic and stateless per request.
//!
//! # Modules
//!
//! - **`models`**: `PatientRecord` (clinical and equity views), `ScoredPatient`
//! - **`validation`**: Fail-fast batch checks (ranges, missing fields, duplicate IDs)
//! - **`scoring`**: Risk scorer, fairness adjuster, priority composer
//! - **`audit`**: Group averages, equity gap, high-risk count
//! - **`baseline`**: Rule-based manual reference ranking
//! - **`pipeline`**: Fork-join orchestration and response assembly
//! - **`server`**: `POST /prioritize` and `GET /health`
//!
//! # Pipeline
//!
//! ```text
//! validate → [risk → (join: group profile) → fairness → compose] → rank
//!          → audit + baseline → response
//! ```

pub mod audit;
pub mod baseline;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod scoring;
pub mod server;
pub mod validation;

pub use config::EngineConfig;
pub use error::{ConfigError, EngineError};
pub use pipeline::{PrioritizationResponse, Prioritizer};
