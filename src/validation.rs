//! Input validation for patient batches.
//!
//! Re-validates every record server-side, starting from untyped JSON so
//! no client-side shape assumption is trusted. Detects:
//! - Empty or oversized batches
//! - Non-object records
//! - Missing (or `null`) fields
//! - Wrongly typed or out-of-range values
//! - Empty or duplicate patient IDs
//!
//! Validation is fail-fast: the first offending record rejects the whole
//! batch, since equity metrics over a partial cohort would be wrong.

use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;

use crate::config::LimitsConfig;
use crate::error::EngineError;
use crate::models::{ClinicalProfile, EquityProfile, PatientRecord};

/// Fields every record must carry.
pub const REQUIRED_FIELDS: [&str; 8] = [
    "patient_id",
    "age",
    "waiting_days",
    "stage",
    "ecog",
    "tumor_growth_rate",
    "socioeconomic_index",
    "group",
];

/// A per-record validation failure.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("patient[{index}].{field}: {message}")]
pub struct ValidationError {
    /// Position of the record in the submitted batch.
    pub index: usize,
    /// Offending field (`<record>` when the record itself is malformed).
    pub field: String,
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// The record is not a JSON object.
    NotAnObject,
    /// A required field is absent or `null`.
    Missing,
    /// A field has the wrong JSON type.
    WrongType,
    /// A numeric field is outside its allowed range.
    OutOfRange,
    /// A string field is blank.
    Empty,
}

impl ValidationError {
    fn new(
        index: usize,
        field: impl Into<String>,
        kind: ValidationErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            index,
            field: field.into(),
            kind,
            message: message.into(),
        }
    }
}

/// Validates a raw batch and returns typed records in input order.
///
/// Checks, in order:
/// 1. Batch is non-empty
/// 2. Batch does not exceed `limits.max_batch_size`
/// 3. Every record is complete and in range (fail-fast)
/// 4. `patient_id` is unique within the batch
pub fn validate_batch(
    raw: &[Value],
    limits: &LimitsConfig,
) -> Result<Vec<PatientRecord>, EngineError> {
    if raw.is_empty() {
        return Err(EngineError::EmptyBatch);
    }
    if raw.len() > limits.max_batch_size {
        return Err(EngineError::BatchTooLarge {
            size: raw.len(),
            max: limits.max_batch_size,
        });
    }

    let mut first_seen: HashMap<String, usize> = HashMap::with_capacity(raw.len());
    let mut records = Vec::with_capacity(raw.len());

    for (index, value) in raw.iter().enumerate() {
        let record = validate_record(index, value, limits)?;
        if let Some(&first_index) = first_seen.get(&record.patient_id) {
            return Err(EngineError::DuplicateId {
                index,
                first_index,
                patient_id: record.patient_id,
            });
        }
        first_seen.insert(record.patient_id.clone(), index);
        records.push(record);
    }

    Ok(records)
}

/// Validates a single record.
pub fn validate_record(
    index: usize,
    value: &Value,
    limits: &LimitsConfig,
) -> Result<PatientRecord, ValidationError> {
    let fields = value.as_object().ok_or_else(|| {
        ValidationError::new(
            index,
            "<record>",
            ValidationErrorKind::NotAnObject,
            "expected a JSON object",
        )
    })?;
    let reader = RecordReader { index, fields };

    for field in REQUIRED_FIELDS {
        reader.get(field)?;
    }

    let patient_id = reader.string("patient_id")?;
    let clinical = ClinicalProfile {
        age: reader.integer("age", 0, i64::from(limits.max_age))? as u32,
        waiting_days: reader.integer("waiting_days", 0, i64::from(u32::MAX))? as u32,
        stage: reader.integer("stage", 1, 4)? as u8,
        ecog: reader.integer("ecog", 0, 4)? as u8,
        tumor_growth_rate: reader.unit_float("tumor_growth_rate")?,
    };
    let equity = EquityProfile {
        socioeconomic_index: reader.unit_float("socioeconomic_index")?,
        group: reader.string("group")?,
    };

    Ok(PatientRecord::new(patient_id, clinical, equity))
}

struct RecordReader<'a> {
    index: usize,
    fields: &'a Map<String, Value>,
}

impl RecordReader<'_> {
    fn error(&self, field: &str, kind: ValidationErrorKind, message: String) -> ValidationError {
        ValidationError::new(self.index, field, kind, message)
    }

    fn get(&self, field: &str) -> Result<&Value, ValidationError> {
        match self.fields.get(field) {
            Some(Value::Null) | None => Err(self.error(
                field,
                ValidationErrorKind::Missing,
                "required field is missing".into(),
            )),
            Some(v) => Ok(v),
        }
    }

    fn string(&self, field: &str) -> Result<String, ValidationError> {
        let s = self.get(field)?.as_str().ok_or_else(|| {
            self.error(field, ValidationErrorKind::WrongType, "expected a string".into())
        })?;
        if s.trim().is_empty() {
            return Err(self.error(field, ValidationErrorKind::Empty, "must not be blank".into()));
        }
        Ok(s.to_string())
    }

    fn number(&self, field: &str, expected: &str) -> Result<f64, ValidationError> {
        self.get(field)?
            .as_f64()
            .filter(|v| v.is_finite())
            .ok_or_else(|| {
                self.error(field, ValidationErrorKind::WrongType, format!("expected {expected}"))
            })
    }

    /// Integral JSON number within `[min, max]`. `3.0` is accepted as `3`.
    fn integer(&self, field: &str, min: i64, max: i64) -> Result<i64, ValidationError> {
        let v = self.number(field, "an integer")?;
        if v.fract() != 0.0 {
            return Err(self.error(
                field,
                ValidationErrorKind::WrongType,
                format!("expected an integer, got {v}"),
            ));
        }
        if v < min as f64 || v > max as f64 {
            return Err(self.error(
                field,
                ValidationErrorKind::OutOfRange,
                format!("{v} is outside [{min}, {max}]"),
            ));
        }
        Ok(v as i64)
    }

    fn unit_float(&self, field: &str) -> Result<f64, ValidationError> {
        let v = self.number(field, "a number")?;
        if !(0.0..=1.0).contains(&v) {
            return Err(self.error(
                field,
                ValidationErrorKind::OutOfRange,
                format!("{v} is outside [0, 1]"),
            ));
        }
        Ok(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn patient(id: &str) -> Value {
        json!({
            "patient_id": id,
            "age": 57,
            "waiting_days": 35,
            "stage": 3,
            "ecog": 1,
            "tumor_growth_rate": 0.6,
            "socioeconomic_index": 0.7,
            "group": "BPJS-Regional"
        })
    }

    fn with_field(id: &str, field: &str, value: Value) -> Value {
        let mut p = patient(id);
        p[field] = value;
        p
    }

    fn validation_error(raw: &[Value]) -> ValidationError {
        match validate_batch(raw, &LimitsConfig::default()).unwrap_err() {
            EngineError::Validation(e) => e,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_batch() {
        let raw = vec![patient("P-001"), patient("P-002")];
        let records = validate_batch(&raw, &LimitsConfig::default()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].patient_id, "P-001");
        assert_eq!(records[0].clinical.stage, 3);
        assert_eq!(records[0].clinical.waiting_days, 35);
        assert!((records[0].equity.socioeconomic_index - 0.7).abs() < 1e-12);
        assert_eq!(records[1].group(), "BPJS-Regional");
    }

    #[test]
    fn test_empty_batch() {
        assert_eq!(
            validate_batch(&[], &LimitsConfig::default()).unwrap_err(),
            EngineError::EmptyBatch
        );
    }

    #[test]
    fn test_batch_too_large() {
        let limits = LimitsConfig {
            max_batch_size: 2,
            ..LimitsConfig::default()
        };
        let raw = vec![patient("A"), patient("B"), patient("C")];
        assert_eq!(
            validate_batch(&raw, &limits).unwrap_err(),
            EngineError::BatchTooLarge { size: 3, max: 2 }
        );
    }

    #[test]
    fn test_missing_field_names_field_and_index() {
        let mut broken = patient("P-002");
        broken.as_object_mut().unwrap().remove("ecog");
        let err = validation_error(&[patient("P-001"), broken]);
        assert_eq!(err.index, 1);
        assert_eq!(err.field, "ecog");
        assert_eq!(err.kind, ValidationErrorKind::Missing);
        assert!(err.to_string().starts_with("patient[1].ecog"));
    }

    #[test]
    fn test_null_is_missing() {
        let err = validation_error(&[with_field("P-1", "group", Value::Null)]);
        assert_eq!(err.kind, ValidationErrorKind::Missing);
    }

    #[test]
    fn test_stage_out_of_range() {
        for stage in [0, 5] {
            let err = validation_error(&[with_field("P-1", "stage", json!(stage))]);
            assert_eq!(err.field, "stage");
            assert_eq!(err.kind, ValidationErrorKind::OutOfRange);
        }
    }

    #[test]
    fn test_ecog_out_of_range() {
        let err = validation_error(&[with_field("P-1", "ecog", json!(5))]);
        assert_eq!(err.kind, ValidationErrorKind::OutOfRange);
    }

    #[test]
    fn test_negative_counts_rejected() {
        let err = validation_error(&[with_field("P-1", "waiting_days", json!(-1))]);
        assert_eq!(err.field, "waiting_days");
        assert_eq!(err.kind, ValidationErrorKind::OutOfRange);

        let err = validation_error(&[with_field("P-1", "age", json!(-3))]);
        assert_eq!(err.field, "age");
    }

    #[test]
    fn test_age_upper_bound() {
        let err = validation_error(&[with_field("P-1", "age", json!(121))]);
        assert_eq!(err.kind, ValidationErrorKind::OutOfRange);
        let raw = vec![with_field("P-1", "age", json!(120))];
        assert!(validate_batch(&raw, &LimitsConfig::default()).is_ok());
    }

    #[test]
    fn test_unit_floats_bounded() {
        let err = validation_error(&[with_field("P-1", "tumor_growth_rate", json!(1.01))]);
        assert_eq!(err.field, "tumor_growth_rate");
        let err = validation_error(&[with_field("P-1", "socioeconomic_index", json!(-0.1))]);
        assert_eq!(err.field, "socioeconomic_index");
    }

    #[test]
    fn test_wrong_types() {
        let err = validation_error(&[with_field("P-1", "age", json!("57"))]);
        assert_eq!(err.kind, ValidationErrorKind::WrongType);
        let err = validation_error(&[with_field("P-1", "stage", json!(2.5))]);
        assert_eq!(err.kind, ValidationErrorKind::WrongType);
        let err = validation_error(&[with_field("P-1", "patient_id", json!(7))]);
        assert_eq!(err.kind, ValidationErrorKind::WrongType);
        let err = validation_error(&[with_field("P-1", "ecog", json!(true))]);
        assert_eq!(err.kind, ValidationErrorKind::WrongType);
    }

    #[test]
    fn test_integral_float_accepted() {
        let raw = vec![with_field("P-1", "stage", json!(4.0))];
        let records = validate_batch(&raw, &LimitsConfig::default()).unwrap();
        assert_eq!(records[0].clinical.stage, 4);
    }

    #[test]
    fn test_blank_id_rejected() {
        let err = validation_error(&[patient("  ")]);
        assert_eq!(err.field, "patient_id");
        assert_eq!(err.kind, ValidationErrorKind::Empty);
    }

    #[test]
    fn test_not_an_object() {
        let err = validation_error(&[patient("P-1"), json!([1, 2, 3])]);
        assert_eq!(err.index, 1);
        assert_eq!(err.kind, ValidationErrorKind::NotAnObject);
    }

    #[test]
    fn test_duplicate_id() {
        let raw = vec![patient("P-001"), patient("P-002"), patient("P-001")];
        assert_eq!(
            validate_batch(&raw, &LimitsConfig::default()).unwrap_err(),
            EngineError::DuplicateId {
                index: 2,
                first_index: 0,
                patient_id: "P-001".into(),
            }
        );
    }

    #[test]
    fn test_fail_fast_reports_first_offender() {
        let raw = vec![
            patient("P-1"),
            with_field("P-2", "stage", json!(9)),
            with_field("P-3", "ecog", json!(9)),
        ];
        let err = validation_error(&raw);
        assert_eq!(err.index, 1);
        assert_eq!(err.field, "stage");
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let raw = vec![with_field("P-1", "notes", json!("referred late"))];
        assert!(validate_batch(&raw, &LimitsConfig::default()).is_ok());
    }
}
