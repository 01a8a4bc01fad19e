//! Bound checks shared by the parameter models

use crate::error::ValidationError;

pub(crate) fn positive(field: &str, value: f64) -> Result<(), ValidationError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::new(
            field,
            format!("must be greater than 0, got {}", value),
        ))
    }
}

pub(crate) fn non_negative(field: &str, value: f64) -> Result<(), ValidationError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::new(
            field,
            format!("must not be negative, got {}", value),
        ))
    }
}

pub(crate) fn in_range(field: &str, value: f64, min: f64, max: f64) -> Result<(), ValidationError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::new(
            field,
            format!("must be within [{}, {}], got {}", min, max, value),
        ))
    }
}

pub(crate) fn positive_opt(field: &str, value: Option<f64>) -> Result<(), ValidationError> {
    value.map_or(Ok(()), |v| positive(field, v))
}

pub(crate) fn finite(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::new(field, "must be a finite number"))
    }
}
