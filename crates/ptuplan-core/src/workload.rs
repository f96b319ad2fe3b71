//! Workload descriptions: one application's traffic shape and model choice.

use crate::error::PlanError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A single application's traffic profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workload {
    /// Unique within a workload set.
    pub id: u32,
    pub name: String,
    /// Key into the rate catalog's conversion and on-demand tables.
    pub model: String,
    /// Average prompt tokens per request.
    pub avg_input_tokens: f64,
    /// Average completion tokens per request.
    pub avg_output_tokens: f64,
    /// Requests per minute at peak.
    pub peak_requests_per_minute: f64,
    /// Hours per day the workload is active (0-24).
    pub daily_active_hours: f64,
    /// Ordinal for display only; sizing ignores it.
    #[serde(default = "default_priority")]
    pub priority: u8,
}

fn default_priority() -> u8 {
    1
}

impl Workload {
    pub fn new(
        id: u32,
        name: impl Into<String>,
        model: impl Into<String>,
        avg_input_tokens: f64,
        avg_output_tokens: f64,
        peak_requests_per_minute: f64,
        daily_active_hours: f64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            model: model.into(),
            avg_input_tokens,
            avg_output_tokens,
            peak_requests_per_minute,
            daily_active_hours,
            priority: default_priority(),
        }
    }

    /// Input tokens per minute at peak.
    pub fn input_tpm(&self) -> f64 {
        self.peak_requests_per_minute * self.avg_input_tokens
    }

    /// Output tokens per minute at peak.
    pub fn output_tpm(&self) -> f64 {
        self.peak_requests_per_minute * self.avg_output_tokens
    }

    /// Check that every numeric field is finite and in range, and that the
    /// peak token rates derived from them are finite too.
    pub fn validate(&self) -> Result<(), PlanError> {
        let non_negative = [
            ("avg_input_tokens", self.avg_input_tokens),
            ("avg_output_tokens", self.avg_output_tokens),
            ("peak_requests_per_minute", self.peak_requests_per_minute),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() {
                return Err(PlanError::workload(self.id, field, "must be a finite number"));
            }
            if value < 0.0 {
                return Err(PlanError::workload(self.id, field, "must be >= 0"));
            }
        }
        if !self.daily_active_hours.is_finite()
            || !(0.0..=24.0).contains(&self.daily_active_hours)
        {
            return Err(PlanError::workload(
                self.id,
                "daily_active_hours",
                "must be between 0 and 24",
            ));
        }
        if !(self.input_tpm().is_finite() && self.output_tpm().is_finite()) {
            return Err(PlanError::workload(
                self.id,
                "peak_requests_per_minute",
                "traffic overflows",
            ));
        }
        Ok(())
    }
}

/// Validate each workload and reject duplicate ids.
pub fn validate_workloads(workloads: &[Workload]) -> Result<(), PlanError> {
    let mut seen = HashSet::new();
    for workload in workloads {
        workload.validate()?;
        if !seen.insert(workload.id) {
            return Err(PlanError::workload(workload.id, "id", "is not unique"));
        }
    }
    Ok(())
}
