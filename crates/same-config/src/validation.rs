//! Validation for [`crate::PipelineConfig`].

use thiserror::Error;

use same_registry::{EventCodeTable, Organization};

/// Validation error types for pipeline configuration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// A numeric field is out of its required range.
    #[error("field '{field}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Name of the offending field.
        field: String,
        /// The value that was out of range.
        value: f32,
        /// Minimum allowed value.
        min: f32,
        /// Maximum allowed value.
        max: f32,
    },

    /// An allowlisted originator code is not a recognized organization.
    #[error("unknown originator code: {0}")]
    UnknownOriginator(String),

    /// An allowlisted event code is not in the event code table.
    #[error("unknown event code: {0}")]
    UnknownEventCode(String),

    /// Multiple validation errors collected together.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validate a [`crate::PipelineConfig`] against the range and vocabulary
/// constraints on each field. Collects every violation rather than stopping at the
/// first one, so a misconfigured deployment gets one complete report.
pub fn validate_config(config: &crate::PipelineConfig) -> ValidationResult<()> {
    let mut errors = Vec::new();

    check_range(
        "min_confidence_emit",
        config.min_confidence_emit,
        0.0,
        1.0,
        &mut errors,
    );
    check_range(
        "silence_floor_dbfs",
        config.silence_floor_dbfs,
        -120.0,
        0.0,
        &mut errors,
    );
    check_range(
        "silence_window_sec",
        config.silence_window_sec,
        0.0,
        120.0,
        &mut errors,
    );
    check_range(
        "recovery_window_sec",
        config.recovery_window_sec,
        0.0,
        120.0,
        &mut errors,
    );
    check_range(
        "ring_buffer_sec",
        config.ring_buffer_sec,
        0.5,
        60.0,
        &mut errors,
    );
    check_range(
        "dedup_window_sec",
        config.dedup_window_sec,
        0.0,
        86_400.0,
        &mut errors,
    );
    check_range(
        "attention_seconds",
        config.attention_seconds,
        0.0,
        30.0,
        &mut errors,
    );

    // inter_burst_silence_sec must be >= 1.0.
    if config.inter_burst_silence_sec < 1.0 {
        errors.push(ValidationError::OutOfRange {
            field: "inter_burst_silence_sec".into(),
            value: config.inter_burst_silence_sec,
            min: 1.0,
            max: f32::INFINITY,
        });
    }

    if config.sample_rate < 8000 || config.sample_rate > 192_000 {
        errors.push(ValidationError::OutOfRange {
            field: "sample_rate".into(),
            value: config.sample_rate as f32,
            min: 8000.0,
            max: 192_000.0,
        });
    }

    for originator in &config.allowed_originators {
        if Organization::from_code(originator).is_none() {
            errors.push(ValidationError::UnknownOriginator(originator.clone()));
        }
    }

    let events = EventCodeTable::new();
    for code in &config.allowed_event_codes {
        if !events.contains(code) {
            errors.push(ValidationError::UnknownEventCode(code.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else if errors.len() == 1 {
        Err(errors.pop().unwrap())
    } else {
        Err(ValidationError::Multiple(errors))
    }
}

fn check_range(field: &str, value: f32, min: f32, max: f32, errors: &mut Vec<ValidationError>) {
    if value < min || value > max {
        errors.push(ValidationError::OutOfRange {
            field: field.to_string(),
            value,
            min,
            max,
        });
    }
}
