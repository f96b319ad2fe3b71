//! Reserved-capacity and pay-per-use cost modeling.
//!
//! [`price_capacity`] prices a quantity of capacity units under hourly,
//! 1-year and 3-year terms; [`price_on_demand`] prices the same workloads
//! per token; [`compare`] contrasts the two using the 1-year term.

use crate::config::Configuration;
use crate::error::PlanError;
use crate::rates::{OnDemandRate, RateCatalog};
use crate::workload::Workload;
use serde::{Deserialize, Serialize};

const TOKENS_PER_MILLION: f64 = 1_000_000.0;
const MONTHS_PER_YEAR: f64 = 12.0;
const MINUTES_PER_HOUR: f64 = 60.0;

/// Cost of holding a fixed number of capacity units.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReservationCosts {
    pub capacity_units: u64,
    pub hourly_rate_per_unit: f64,
    /// Non-discounted monthly cost of holding the units.
    pub monthly_hourly: f64,
    pub annual_hourly: f64,
    pub monthly_one_year: f64,
    pub annual_one_year: f64,
    pub monthly_three_year: f64,
    pub annual_three_year: f64,
    /// Annual saving of the 1-year term over hourly.
    pub savings_one_year: f64,
    /// Annual saving of the 3-year term over hourly.
    pub savings_three_year: f64,
}

/// Price `units` capacity units under each commercial term.
pub fn price_capacity(units: u64, config: &Configuration) -> ReservationCosts {
    let monthly_hourly = units as f64 * config.hourly_rate_per_unit * config.hours_per_month;
    let annual_hourly = monthly_hourly * MONTHS_PER_YEAR;

    let monthly_one_year = monthly_hourly * (1.0 - config.discount_one_year_percent / 100.0);
    let monthly_three_year = monthly_hourly * (1.0 - config.discount_three_year_percent / 100.0);
    let annual_one_year = monthly_one_year * MONTHS_PER_YEAR;
    let annual_three_year = monthly_three_year * MONTHS_PER_YEAR;

    ReservationCosts {
        capacity_units: units,
        hourly_rate_per_unit: config.hourly_rate_per_unit,
        monthly_hourly,
        annual_hourly,
        monthly_one_year,
        annual_one_year,
        monthly_three_year,
        annual_three_year,
        savings_one_year: annual_hourly - annual_one_year,
        savings_three_year: annual_hourly - annual_three_year,
    }
}

/// Monthly token volume of one workload as `(input, output)`.
///
/// Daily volume is peak rate × active minutes, scaled by the days per month
/// implied by `hours_per_month`.
pub fn monthly_volume(workload: &Workload, config: &Configuration) -> (f64, f64) {
    let daily_minutes = workload.daily_active_hours * MINUTES_PER_HOUR;
    let days = config.days_per_month();
    let input = workload.peak_requests_per_minute * workload.avg_input_tokens * daily_minutes;
    let output = workload.peak_requests_per_minute * workload.avg_output_tokens * daily_minutes;
    (input * days, output * days)
}

/// Whole-token monthly totals across a workload set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyTokens {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
}

pub fn monthly_token_totals(workloads: &[Workload], config: &Configuration) -> MonthlyTokens {
    let (input, output) = workloads
        .iter()
        .map(|w| monthly_volume(w, config))
        .fold((0.0, 0.0), |(i, o), (wi, wo)| (i + wi, o + wo));
    MonthlyTokens {
        input_tokens: input.round() as u64,
        output_tokens: output.round() as u64,
        total_tokens: (input + output).round() as u64,
    }
}

/// Pay-per-use cost of one workload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadOnDemandCost {
    pub workload_id: u32,
    pub name: String,
    pub input_tokens: f64,
    pub output_tokens: f64,
    pub input_cost: f64,
    pub output_cost: f64,
    pub monthly_cost: f64,
}

/// Pay-per-use cost of a workload set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OnDemandCosts {
    /// Monthly input tokens, rounded to whole tokens.
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub input_cost: f64,
    pub output_cost: f64,
    pub total_monthly: f64,
    pub per_workload: Vec<WorkloadOnDemandCost>,
}

fn price_workload(workload: &Workload, rate: &OnDemandRate, config: &Configuration) -> WorkloadOnDemandCost {
    let (input_tokens, output_tokens) = monthly_volume(workload, config);
    let input_cost = input_tokens / TOKENS_PER_MILLION * rate.input_per_million;
    let output_cost = output_tokens / TOKENS_PER_MILLION * rate.output_per_million;
    WorkloadOnDemandCost {
        workload_id: workload.id,
        name: workload.name.clone(),
        input_tokens,
        output_tokens,
        input_cost,
        output_cost,
        monthly_cost: input_cost + output_cost,
    }
}

/// Price every workload per token. Fails on the first workload whose model
/// has no on-demand rate or whose monthly bill is not finite.
pub fn price_on_demand(
    workloads: &[Workload],
    catalog: &RateCatalog,
    config: &Configuration,
) -> Result<OnDemandCosts, PlanError> {
    let mut per_workload = Vec::with_capacity(workloads.len());
    for workload in workloads {
        let rate = catalog
            .on_demand_rate(&workload.model)
            .ok_or_else(|| PlanError::UnknownModel {
                workload_id: workload.id,
                model: workload.model.clone(),
            })?;
        let line = price_workload(workload, rate, config);
        if !line.monthly_cost.is_finite() {
            return Err(PlanError::workload(
                workload.id,
                "peak_requests_per_minute",
                "monthly volume overflows",
            ));
        }
        per_workload.push(line);
    }

    let input_tokens: f64 = per_workload.iter().map(|w| w.input_tokens).sum();
    let output_tokens: f64 = per_workload.iter().map(|w| w.output_tokens).sum();
    let input_cost: f64 = per_workload.iter().map(|w| w.input_cost).sum();
    let output_cost: f64 = per_workload.iter().map(|w| w.output_cost).sum();

    Ok(OnDemandCosts {
        input_tokens: input_tokens.round() as u64,
        output_tokens: output_tokens.round() as u64,
        input_cost,
        output_cost,
        total_monthly: input_cost + output_cost,
        per_workload,
    })
}

/// Outcome of comparing a 1-year reservation with pay-per-use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recommendation {
    /// Nothing to size; no numeric comparison is made.
    InsufficientData,
    /// Reserving is cheaper by `monthly_savings`.
    Reserve { monthly_savings: f64 },
    /// Pay-per-use is cheaper by `monthly_savings`.
    PayPerUse { monthly_savings: f64 },
    /// Both cost the same.
    CostNeutral,
}

impl Recommendation {
    /// One-line explanation for reports.
    pub fn summary(&self, savings_percent: f64) -> String {
        match self {
            Recommendation::InsufficientData => {
                "Add workloads to see cost comparison and recommendations.".to_string()
            }
            Recommendation::Reserve { monthly_savings } => format!(
                "A 1-year reservation saves ${:.0} per month ({:.1}% savings) compared to \
                 pay-per-use. Recommended for predictable, high-volume workloads.",
                monthly_savings, savings_percent
            ),
            Recommendation::PayPerUse { monthly_savings } => format!(
                "Pay-per-use is more cost-effective by ${:.0} per month. Consider it for \
                 variable or lower-volume workloads, or reserve less with a spillover strategy.",
                monthly_savings
            ),
            Recommendation::CostNeutral => {
                "Reserved and pay-per-use costs are equivalent. Choose based on latency \
                 requirements and traffic predictability."
                    .to_string()
            }
        }
    }
}

/// Reserved (1-year term) vs pay-per-use monthly cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub reserved_monthly: f64,
    pub on_demand_monthly: f64,
    /// `on_demand_monthly - reserved_monthly`; positive favours reserving.
    pub difference: f64,
    /// `difference` as a share of the on-demand cost; zero when that is zero.
    pub savings_percent: f64,
    pub recommendation: Recommendation,
}

impl Comparison {
    pub fn summary(&self) -> String {
        self.recommendation.summary(self.savings_percent)
    }
}

/// Compare a reservation with pay-per-use, using the 1-year term as the
/// reservation baseline.
pub fn compare(reservation: &ReservationCosts, on_demand: &OnDemandCosts) -> Comparison {
    let reserved_monthly = reservation.monthly_one_year;
    let on_demand_monthly = on_demand.total_monthly;
    let difference = on_demand_monthly - reserved_monthly;
    let savings_percent = if on_demand_monthly > 0.0 {
        difference / on_demand_monthly * 100.0
    } else {
        0.0
    };

    let recommendation = if reservation.capacity_units == 0 {
        Recommendation::InsufficientData
    } else if difference > 0.0 {
        Recommendation::Reserve {
            monthly_savings: difference,
        }
    } else if difference < 0.0 {
        Recommendation::PayPerUse {
            monthly_savings: -difference,
        }
    } else {
        Recommendation::CostNeutral
    };

    Comparison {
        reserved_monthly,
        on_demand_monthly,
        difference,
        savings_percent,
        recommendation,
    }
}

/// Monthly tokens one capacity unit must carry before its non-discounted cost
/// matches pay-per-use at the model's mean input/output price.
///
/// Returns zero for a free model.
pub fn break_even_monthly_tokens(rate: &OnDemandRate, config: &Configuration) -> u64 {
    let mean_price = (rate.input_per_million + rate.output_per_million) / 2.0;
    if mean_price <= 0.0 {
        return 0;
    }
    let monthly_unit_cost = config.hourly_rate_per_unit * config.hours_per_month;
    (monthly_unit_cost / mean_price * TOKENS_PER_MILLION).round() as u64
}
