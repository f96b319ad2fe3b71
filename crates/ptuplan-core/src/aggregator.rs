//! Aggregate sizing: sum per-workload requirements, add buffer and peak
//! headroom, then round onto the deployment tier's grid.

use crate::config::Configuration;
use crate::converter::{ceil_units, WorkloadBreakdown, MAX_CAPACITY_UNITS};
use crate::error::PlanError;
use crate::rates::DeploymentTier;
use serde::{Deserialize, Serialize};

/// Totals and capacity sizing for a workload set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub total_input_tpm: f64,
    pub total_output_tpm: f64,
    pub total_tpm: f64,
    /// Sum of per-workload requirements, before headroom and rounding.
    pub base_units: u64,
    pub buffer_units: u64,
    pub peak_units: u64,
    pub subtotal_units: u64,
    /// Post-rounding, post-minimum. Zero whenever `base_units` is zero.
    pub final_units: u64,
    /// Increment of the tier used for rounding; zero for an empty set.
    pub increment: u32,
}

/// Smallest multiple of `increment` that is `>= value`, or `None` if that
/// multiple overflows `u64`.
pub fn round_up_to_multiple(value: u64, increment: u32) -> Option<u64> {
    let increment = u64::from(increment.max(1));
    value.div_ceil(increment).checked_mul(increment)
}

/// [`round_up_to_multiple`], clamped to the largest multiple that fits.
pub(crate) fn saturating_round_up(value: u64, increment: u32) -> u64 {
    round_up_to_multiple(value, increment).unwrap_or_else(|| {
        let increment = u64::from(increment.max(1));
        u64::MAX - u64::MAX % increment
    })
}

fn headroom_units(value: f64, field: &str) -> Result<u64, PlanError> {
    if value > MAX_CAPACITY_UNITS as f64 {
        return Err(PlanError::overflow(field));
    }
    Ok(ceil_units(value))
}

/// Size a converted workload set for the given tier and policy.
///
/// Invariants: `final_units` is a multiple of `tier.increment` and, when
/// positive, at least `tier.minimum_units`. A zero base never rises to the
/// tier minimum. Fails with [`PlanError::CapacityOverflow`] rather than
/// wrapping when a count does not fit.
pub fn aggregate(
    breakdown: &[WorkloadBreakdown],
    tier: &DeploymentTier,
    config: &Configuration,
) -> Result<AggregateResult, PlanError> {
    if breakdown.is_empty() {
        return Ok(AggregateResult::default());
    }

    let total_input_tpm: f64 = breakdown.iter().map(|w| w.input_tpm).sum();
    let total_output_tpm: f64 = breakdown.iter().map(|w| w.output_tpm).sum();
    let base_units = breakdown
        .iter()
        .try_fold(0u64, |acc, w| acc.checked_add(w.required_units))
        .ok_or_else(|| PlanError::overflow("base_units"))?;

    let base = base_units as f64;
    let buffer_units = headroom_units(
        base * config.buffer_percent.max(0.0) / 100.0,
        "buffer_units",
    )?;
    let peak_units = headroom_units(
        base * (config.effective_peak_multiplier() - 1.0),
        "peak_units",
    )?;
    let subtotal_units = base_units
        .checked_add(buffer_units)
        .and_then(|units| units.checked_add(peak_units))
        .ok_or_else(|| PlanError::overflow("subtotal_units"))?;

    let final_units = if base_units == 0 {
        0
    } else {
        round_up_to_multiple(subtotal_units, tier.increment)
            .ok_or_else(|| PlanError::overflow("final_units"))?
            .max(u64::from(tier.minimum_units))
    };

    tracing::debug!(
        base_units,
        buffer_units,
        peak_units,
        final_units,
        increment = tier.increment,
        "aggregated capacity"
    );

    Ok(AggregateResult {
        total_input_tpm,
        total_output_tpm,
        total_tpm: total_input_tpm + total_output_tpm,
        base_units,
        buffer_units,
        peak_units,
        subtotal_units,
        final_units,
        increment: tier.increment,
    })
}

/// Reserve fractions reported by [`utilization_projections`].
pub const PROJECTION_FRACTIONS: [(&str, f64); 3] = [
    ("Conservative (100%)", 1.00),
    ("Balanced (90%)", 0.90),
    ("Aggressive (80%)", 0.80),
];

/// Expected utilization if only a fraction of the base requirement is deployed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UtilizationProjection {
    pub name: String,
    pub reserve_fraction: f64,
    pub deployed_units: u64,
    /// `base / deployed × 100`; zero when nothing is deployed.
    pub expected_utilization_percent: f64,
    /// Share of traffic expected to spill to pay-per-use.
    pub spillover_percent: f64,
}

/// Informational projections; never fed back into sizing.
pub fn utilization_projections(
    base_units: u64,
    tier: &DeploymentTier,
) -> Vec<UtilizationProjection> {
    PROJECTION_FRACTIONS
        .iter()
        .map(|&(name, fraction)| {
            let raw = ceil_units(base_units as f64 * fraction);
            let deployed_units = saturating_round_up(raw, tier.increment);
            let expected_utilization_percent = if deployed_units > 0 {
                base_units as f64 / deployed_units as f64 * 100.0
            } else {
                0.0
            };
            UtilizationProjection {
                name: name.to_string(),
                reserve_fraction: fraction,
                deployed_units,
                expected_utilization_percent,
                spillover_percent: ((1.0 - fraction) * 100.0).round(),
            }
        })
        .collect()
}
