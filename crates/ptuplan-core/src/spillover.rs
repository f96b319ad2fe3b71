//! Hybrid reservation planning and chargeback.
//!
//! The planner scans "reserve X%, spill the rest to pay-per-use" allocations,
//! costs each one, and picks the cheapest. Chargeback then splits the
//! reserved cost across workloads by traffic share.

use crate::aggregator::saturating_round_up;
use crate::config::Configuration;
use crate::converter::{ceil_units, WorkloadBreakdown};
use crate::cost::{price_capacity, OnDemandCosts};
use crate::error::PlanError;
use crate::rates::DeploymentTier;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Reserved fractions evaluated by [`SpilloverPlanner::scan`], highest first.
pub const SCAN_FRACTIONS: [f64; 6] = [1.00, 0.95, 0.90, 0.85, 0.80, 0.75];

/// One reserve/spill allocation and its monthly cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    /// Share of the final capacity committed as a reservation, in [0, 1].
    pub reserved_fraction: f64,
    pub reserved_units: u64,
    /// 1-year reserved monthly cost of `reserved_units`.
    pub reserved_cost: f64,
    /// Approximate: the full pay-per-use bill prorated by
    /// `1 - reserved_fraction`. Traffic above the reserved capacity is not
    /// modelled separately.
    pub overflow_cost: f64,
    pub total_cost: f64,
    /// Change in `total_cost` relative to full reservation, in percent.
    /// Display ranking only.
    pub delta_vs_full_reserve_percent: f64,
}

impl Scenario {
    pub fn spillover_fraction(&self) -> f64 {
        1.0 - self.reserved_fraction
    }
}

fn scenario_name(fraction: f64) -> String {
    let reserved = (fraction * 100.0).round();
    let spill = 100.0 - reserved;
    if spill <= 0.0 {
        format!("{:.0}% reserved (no spillover)", reserved)
    } else {
        format!("{:.0}% reserved / {:.0}% spillover", reserved, spill)
    }
}

/// Costs reserve/spill allocations for one tier, configuration and
/// pay-per-use bill.
#[derive(Debug, Clone)]
pub struct SpilloverPlanner<'a> {
    tier: &'a DeploymentTier,
    config: &'a Configuration,
    full_on_demand_monthly: f64,
}

impl<'a> SpilloverPlanner<'a> {
    pub fn new(
        tier: &'a DeploymentTier,
        config: &'a Configuration,
        on_demand: &OnDemandCosts,
    ) -> Self {
        Self {
            tier,
            config,
            full_on_demand_monthly: on_demand.total_monthly,
        }
    }

    fn full_reserve_total(&self, final_units: u64) -> f64 {
        let (_, reserved_cost, overflow_cost) = self.cost(final_units, 1.0);
        reserved_cost + overflow_cost
    }

    /// `(reserved_units, reserved_cost, overflow_cost)` for one fraction.
    fn cost(&self, final_units: u64, fraction: f64) -> (u64, f64, f64) {
        let reserved_units =
            saturating_round_up(ceil_units(final_units as f64 * fraction), self.tier.increment);
        let reserved_cost = price_capacity(reserved_units, self.config).monthly_one_year;
        let overflow_cost = self.full_on_demand_monthly * (1.0 - fraction);
        (reserved_units, reserved_cost, overflow_cost)
    }

    fn build(&self, final_units: u64, fraction: f64, baseline: f64) -> Scenario {
        let (reserved_units, reserved_cost, overflow_cost) = self.cost(final_units, fraction);
        let total_cost = reserved_cost + overflow_cost;
        let delta_vs_full_reserve_percent = if baseline > 0.0 {
            (total_cost - baseline) / baseline * 100.0
        } else {
            0.0
        };
        Scenario {
            name: scenario_name(fraction),
            reserved_fraction: fraction,
            reserved_units,
            reserved_cost,
            overflow_cost,
            total_cost,
            delta_vs_full_reserve_percent,
        }
    }

    /// Evaluate every fraction in [`SCAN_FRACTIONS`], in order.
    pub fn scan(&self, final_units: u64) -> Vec<Scenario> {
        let baseline = self.full_reserve_total(final_units);
        SCAN_FRACTIONS
            .iter()
            .map(|&fraction| self.build(final_units, fraction, baseline))
            .collect()
    }

    /// Evaluate an arbitrary reserved fraction in [0, 1].
    pub fn custom_scenario(&self, final_units: u64, fraction: f64) -> Result<Scenario, PlanError> {
        if !fraction.is_finite() || !(0.0..=1.0).contains(&fraction) {
            return Err(PlanError::config(
                "reserved_fraction",
                "must be between 0 and 1",
            ));
        }
        let baseline = self.full_reserve_total(final_units);
        Ok(self.build(final_units, fraction, baseline))
    }
}

/// Cheapest scenario; exactly equal totals go to the higher reserved fraction.
pub fn select_optimal(scenarios: &[Scenario]) -> Option<&Scenario> {
    scenarios.iter().min_by(|a, b| {
        a.total_cost
            .partial_cmp(&b.total_cost)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                b.reserved_fraction
                    .partial_cmp(&a.reserved_fraction)
                    .unwrap_or(Ordering::Equal)
            })
    })
}

/// One workload's share of the reserved capacity and its cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargebackLine {
    pub workload_id: u32,
    pub name: String,
    /// Fraction of total tokens-per-minute, in [0, 1].
    pub traffic_share: f64,
    /// Units attributed by ordinary rounding; lines need not sum to the total.
    pub capacity_allocation: u64,
    pub monthly_cost: f64,
    pub annual_cost: f64,
}

impl ChargebackLine {
    pub fn share_percent(&self) -> f64 {
        self.traffic_share * 100.0
    }
}

/// Attribute `reserved_monthly_cost` and `final_units` to workloads in
/// proportion to their total tokens-per-minute.
pub fn chargeback(
    breakdown: &[WorkloadBreakdown],
    final_units: u64,
    reserved_monthly_cost: f64,
) -> Vec<ChargebackLine> {
    let total_tpm: f64 = breakdown.iter().map(|w| w.total_tpm).sum();
    breakdown
        .iter()
        .map(|w| {
            let traffic_share = if total_tpm > 0.0 {
                w.total_tpm / total_tpm
            } else {
                0.0
            };
            let monthly_cost = reserved_monthly_cost * traffic_share;
            ChargebackLine {
                workload_id: w.workload_id,
                name: w.name.clone(),
                traffic_share,
                capacity_allocation: (final_units as f64 * traffic_share).round() as u64,
                monthly_cost,
                annual_cost: monthly_cost * 12.0,
            }
        })
        .collect()
}
