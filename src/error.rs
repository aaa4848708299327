//! Error types for the prioritization engine.
//!
//! Every engine error is a request-level failure: the whole batch is
//! rejected and no partial ranking is produced.

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors raised while prioritizing a batch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// A record is missing a field or has an out-of-range value.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Two records share a `patient_id`.
    #[error("patient[{index}]: duplicate patient_id '{patient_id}' (first seen at patient[{first_index}])")]
    DuplicateId {
        index: usize,
        first_index: usize,
        patient_id: String,
    },

    /// The batch has zero records.
    #[error("batch contains no patients")]
    EmptyBatch,

    /// The batch exceeds the configured maximum size.
    #[error("batch of {size} patients exceeds the configured maximum of {max}")]
    BatchTooLarge { size: usize, max: usize },

    /// Group statistics were requested over zero scored patients.
    #[error("equity metrics require at least one scored patient")]
    InsufficientData,
}

impl EngineError {
    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::Validation(_) => "validation_error",
            EngineError::DuplicateId { .. } => "duplicate_id",
            EngineError::EmptyBatch => "empty_batch",
            EngineError::BatchTooLarge { .. } => "batch_too_large",
            EngineError::InsufficientData => "insufficient_data",
        }
    }
}

/// Errors raised while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for `EngineConfig`.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A parameter is outside its allowed range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        ConfigError::Invalid(message.into())
    }
}
