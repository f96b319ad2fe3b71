//! Workload-to-capacity-unit conversion.
//!
//! Each workload's peak traffic is turned into tokens-per-minute and then
//! into whole capacity units using its model's [`ConversionMethod`].

use crate::error::PlanError;
use crate::rates::{ConversionMethod, ConversionRate, RateCatalog};
use crate::workload::Workload;
use serde::{Deserialize, Serialize};

/// Absolute slack absorbed by [`ceil_units`] so float noise never adds a
/// whole unit.
const CEIL_TOLERANCE: f64 = 1e-9;

/// Largest unit count any stage produces: every integer up to here is exact
/// as an `f64`.
pub const MAX_CAPACITY_UNITS: u64 = 1 << 53;

/// Ceiling of a derived headroom quantity, ignoring representation error.
///
/// `100.0 * (1.1 - 1.0)` evaluates to `10.000000000000009`; a plain `ceil`
/// would size that to 11. Saturates at `u64::MAX`; callers that can see large
/// values bound them first.
pub fn ceil_units(value: f64) -> u64 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    let nearest = value.round();
    if (value - nearest).abs() <= CEIL_TOLERANCE {
        return nearest as u64;
    }
    value.ceil() as u64
}

/// Exact ceiling of a raw unit requirement.
///
/// `None` when the value is NaN or above [`MAX_CAPACITY_UNITS`].
pub fn checked_ceil(value: f64) -> Option<u64> {
    if value.is_nan() {
        return None;
    }
    if value <= 0.0 {
        return Some(0);
    }
    let units = value.ceil();
    if units > MAX_CAPACITY_UNITS as f64 {
        return None;
    }
    Some(units as u64)
}

/// Per-workload traffic and capacity requirement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadBreakdown {
    pub workload_id: u32,
    pub name: String,
    pub model: String,
    /// Input tokens per minute at peak.
    pub input_tpm: f64,
    /// Output tokens per minute at peak.
    pub output_tpm: f64,
    pub total_tpm: f64,
    /// Whole capacity units, rounded up.
    pub required_units: u64,
}

/// A workload left out of a plan, and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedWorkload {
    pub workload_id: u32,
    pub name: String,
    pub reason: String,
}

/// Result of converting a whole workload set under the drop policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionOutcome {
    pub breakdown: Vec<WorkloadBreakdown>,
    /// Workloads whose model resolved in both rate tables, in input order.
    pub resolved: Vec<Workload>,
    pub skipped: Vec<SkippedWorkload>,
}

/// Capacity units needed to absorb the given peak token rates, or `None` when
/// the requirement is not representable.
pub fn required_units(rate: &ConversionRate, input_tpm: f64, output_tpm: f64) -> Option<u64> {
    let units = match rate.method {
        ConversionMethod::Ratio { output_ratio } => {
            let effective_tpm = input_tpm + output_tpm * output_ratio;
            effective_tpm / rate.input_tpm_per_unit
        }
        ConversionMethod::Separate | ConversionMethod::Legacy => {
            let input_units = input_tpm / rate.input_tpm_per_unit;
            let output_units = output_tpm / rate.output_tpm_per_unit;
            input_units.max(output_units)
        }
    };
    checked_ceil(units)
}

/// Convert one workload, failing with [`PlanError::UnknownModel`] when its
/// model has no conversion rate.
pub fn convert(workload: &Workload, catalog: &RateCatalog) -> Result<WorkloadBreakdown, PlanError> {
    let rate = catalog
        .conversion_rate(&workload.model)
        .ok_or_else(|| PlanError::UnknownModel {
            workload_id: workload.id,
            model: workload.model.clone(),
        })?;
    convert_with_rate(workload, rate)
}

fn convert_with_rate(
    workload: &Workload,
    rate: &ConversionRate,
) -> Result<WorkloadBreakdown, PlanError> {
    let input_tpm = workload.input_tpm();
    let output_tpm = workload.output_tpm();
    let total_tpm = input_tpm + output_tpm;
    if !total_tpm.is_finite() {
        return Err(PlanError::workload(
            workload.id,
            "peak_requests_per_minute",
            "traffic overflows",
        ));
    }
    let required_units = required_units(rate, input_tpm, output_tpm).ok_or_else(|| {
        PlanError::workload(
            workload.id,
            "peak_requests_per_minute",
            format!("needs more than {} capacity units", MAX_CAPACITY_UNITS),
        )
    })?;
    Ok(WorkloadBreakdown {
        workload_id: workload.id,
        name: workload.name.clone(),
        model: workload.model.clone(),
        input_tpm,
        output_tpm,
        total_tpm,
        required_units,
    })
}

/// Convert every workload, dropping (and logging) those whose model does not
/// resolve in both the conversion and the on-demand table.
///
/// Dropped workloads contribute nothing to sizing, pay-per-use pricing or
/// chargeback; they are reported in [`ConversionOutcome::skipped`]. Traffic
/// too large to size is an error, not a drop.
pub fn convert_all(
    workloads: &[Workload],
    catalog: &RateCatalog,
) -> Result<ConversionOutcome, PlanError> {
    let mut outcome = ConversionOutcome::default();
    for workload in workloads {
        match catalog.resolve(workload) {
            Ok(rates) => {
                outcome
                    .breakdown
                    .push(convert_with_rate(workload, rates.conversion)?);
                outcome.resolved.push(workload.clone());
            }
            Err(err) => {
                tracing::warn!(
                    workload_id = workload.id,
                    model = %workload.model,
                    "dropping workload: {}",
                    err
                );
                outcome.skipped.push(SkippedWorkload {
                    workload_id: workload.id,
                    name: workload.name.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }
    Ok(outcome)
}
