//! Engine-level error taxonomy.
//!
//! Every public engine operation returns either a complete result or a
//! [`PlanError`] naming the failing workload or field. Degenerate input
//! (no workloads, zero traffic) is never an error.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanError {
    /// A workload references a model absent from the rate tables.
    #[error("Unknown model '{model}' referenced by workload {workload_id}")]
    UnknownModel { workload_id: u32, model: String },
    /// A configuration or catalog field is non-finite or out of range.
    #[error("Invalid configuration: {field} {reason}")]
    InvalidConfiguration { field: String, reason: String },
    /// A workload field is non-finite or out of range.
    #[error("Invalid workload {workload_id}: {field} {reason}")]
    InvalidWorkload {
        workload_id: u32,
        field: String,
        reason: String,
    },
    /// A derived capacity quantity does not fit in a unit count.
    #[error("Capacity overflow: {field} is not representable")]
    CapacityOverflow { field: String },
}

impl PlanError {
    pub(crate) fn config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        PlanError::InvalidConfiguration {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn workload(
        workload_id: u32,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        PlanError::InvalidWorkload {
            workload_id,
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl PlanError {
    pub(crate) fn overflow(field: impl Into<String>) -> Self {
        PlanError::CapacityOverflow {
            field: field.into(),
        }
    }
}

/// Reject NaN/inf and values below `min`.
pub(crate) fn check_at_least(field: &str, value: f64, min: f64) -> Result<(), PlanError> {
    if !value.is_finite() {
        return Err(PlanError::config(field, "must be a finite number"));
    }
    if value < min {
        return Err(PlanError::config(field, format!("must be >= {}", min)));
    }
    Ok(())
}

/// Reject NaN/inf and values outside `[min, max]`.
pub(crate) fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<(), PlanError> {
    check_at_least(field, value, min)?;
    if value > max {
        return Err(PlanError::config(field, format!("must be <= {}", max)));
    }
    Ok(())
}
