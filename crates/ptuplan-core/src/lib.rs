//! ptuplan: capacity and cost planning for provisioned inference throughput.
//!
//! Given workload traffic profiles, a pricing configuration and rate tables,
//! the engine sizes the reserved capacity a deployment needs and compares
//! fixed reservation, pay-per-use and hybrid "spillover" strategies.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐     ┌─────────────┐     ┌──────────────┐
//! │ Workloads  │────▶│  Converter  │────▶│  Aggregator  │
//! │ + Catalog  │     │ (per model) │     │ (buffer/peak │
//! └────────────┘     └─────────────┘     │  /rounding)  │
//!                                        └──────┬───────┘
//!                                               │
//!                          ┌────────────────────┴──────┐
//!                          ▼                           ▼
//!                   ┌─────────────┐            ┌───────────────┐
//!                   │ Cost Modeler│───────────▶│   Spillover   │
//!                   │ (reserved / │  pricing   │   Planner +   │
//!                   │ pay-per-use)│            │   Chargeback  │
//!                   └─────────────┘            └───────────────┘
//! ```
//!
//! Every stage is a pure function of its inputs. Nothing is cached between
//! calls, so concurrent callers can share a catalog and configuration freely.

pub mod aggregator;
pub mod config;
pub mod converter;
pub mod cost;
pub mod error;
pub mod rates;
pub mod report;
pub mod spillover;
pub mod workload;

// Re-export key types for convenience.
pub use aggregator::{aggregate, utilization_projections, AggregateResult, UtilizationProjection};
pub use config::{ConfigError, Configuration, PlanConfig};
pub use converter::{convert, convert_all, ConversionOutcome, SkippedWorkload, WorkloadBreakdown};
pub use cost::{
    compare, price_capacity, price_on_demand, Comparison, OnDemandCosts, Recommendation,
    ReservationCosts,
};
pub use error::PlanError;
pub use rates::{ConversionMethod, ConversionRate, DeploymentTier, OnDemandRate, RateCatalog};
pub use report::PlanReport;
pub use spillover::{chargeback, select_optimal, ChargebackLine, Scenario, SpilloverPlanner};
pub use workload::Workload;

/// Run a complete calculation pass.
///
/// Workloads whose model is missing from either rate table are dropped and
/// listed in [`PlanReport::skipped`]; invalid configuration, catalog or
/// workload fields, and traffic too large to size, abort with a
/// [`PlanError`].
pub fn run_plan(
    config: &Configuration,
    workloads: &[Workload],
    catalog: &RateCatalog,
) -> Result<PlanReport, PlanError> {
    config.validate()?;
    catalog.validate()?;
    workload::validate_workloads(workloads)?;

    let tier = catalog.tier_or_default(&config.deployment_type);
    let outcome = convert_all(workloads, catalog)?;

    let aggregate = aggregate(&outcome.breakdown, &tier, config)?;
    let projections = utilization_projections(aggregate.base_units, &tier);
    let monthly_tokens = cost::monthly_token_totals(&outcome.resolved, config);

    let reservation = price_capacity(aggregate.final_units, config);
    let on_demand = price_on_demand(&outcome.resolved, catalog, config)?;
    let comparison = compare(&reservation, &on_demand);

    // No capacity means nothing to split between reservation and overflow.
    let scenarios = if aggregate.final_units == 0 {
        Vec::new()
    } else {
        SpilloverPlanner::new(&tier, config, &on_demand).scan(aggregate.final_units)
    };
    let optimal = select_optimal(&scenarios).cloned();
    let chargeback = chargeback(
        &outcome.breakdown,
        aggregate.final_units,
        reservation.monthly_one_year,
    );

    tracing::debug!(
        deployment_type = %config.deployment_type,
        workloads = outcome.breakdown.len(),
        skipped = outcome.skipped.len(),
        final_units = aggregate.final_units,
        reserved_monthly = reservation.monthly_one_year,
        on_demand_monthly = on_demand.total_monthly,
        "plan complete"
    );

    Ok(PlanReport {
        configuration: config.clone(),
        tier,
        breakdown: outcome.breakdown,
        skipped: outcome.skipped,
        aggregate,
        projections,
        monthly_tokens,
        reservation,
        on_demand,
        comparison,
        scenarios,
        optimal,
        chargeback,
    })
}

/// Run the same plan under every deployment tier in the catalog.
pub fn compare_deployment_types(
    config: &Configuration,
    workloads: &[Workload],
    catalog: &RateCatalog,
) -> Result<Vec<PlanReport>, PlanError> {
    catalog
        .tier_names()
        .into_iter()
        .map(|name| {
            let cfg = Configuration {
                deployment_type: name.to_string(),
                ..config.clone()
            };
            run_plan(&cfg, workloads, catalog)
        })
        .collect()
}
