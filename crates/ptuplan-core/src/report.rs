//! Plan reports and plain-text tables.
//!
//! [`PlanReport`] is the serializable product of one calculation pass;
//! exporters and the CLI read it without mutating it.

use crate::aggregator::{AggregateResult, UtilizationProjection};
use crate::config::Configuration;
use crate::converter::{SkippedWorkload, WorkloadBreakdown};
use crate::cost::{Comparison, MonthlyTokens, OnDemandCosts, ReservationCosts};
use crate::rates::{ConversionMethod, DeploymentTier, RateCatalog};
use crate::spillover::{ChargebackLine, Scenario};
use serde::{Deserialize, Serialize};

/// Everything one calculation pass derives from (workloads, configuration,
/// rate tables).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanReport {
    pub configuration: Configuration,
    /// Tier actually used for rounding (after any fallback).
    pub tier: DeploymentTier,
    pub breakdown: Vec<WorkloadBreakdown>,
    pub skipped: Vec<SkippedWorkload>,
    pub aggregate: AggregateResult,
    pub projections: Vec<UtilizationProjection>,
    pub monthly_tokens: MonthlyTokens,
    pub reservation: ReservationCosts,
    pub on_demand: OnDemandCosts,
    pub comparison: Comparison,
    pub scenarios: Vec<Scenario>,
    pub optimal: Option<Scenario>,
    pub chargeback: Vec<ChargebackLine>,
}

/// Format a full plan as a pretty-printed table string.
pub fn format_table(report: &PlanReport) -> String {
    let agg = &report.aggregate;
    let res = &report.reservation;
    let mut out = String::new();
    out.push_str(&format!(
        "\n{:=<78}\n",
        format!("  {} Capacity Plan  ", report.configuration.deployment_type)
    ));
    out.push_str(&format!(
        "  Workloads: {} ({} skipped) | Tier: minimum {} / increment {}\n",
        report.breakdown.len(),
        report.skipped.len(),
        report.tier.minimum_units,
        report.tier.increment,
    ));
    for skipped in &report.skipped {
        out.push_str(&format!("  ! skipped {}: {}\n", skipped.name, skipped.reason));
    }

    out.push_str(&format!("{:-<78}\n", "  Workloads  "));
    out.push_str(&format!(
        "  {:<30} {:<14} {:>12} {:>12} {:>6}\n",
        "Name", "Model", "Input TPM", "Output TPM", "Units"
    ));
    for w in &report.breakdown {
        out.push_str(&format!(
            "  {:<30} {:<14} {:>12.0} {:>12.0} {:>6}\n",
            truncate(&w.name, 30),
            truncate(&w.model, 14),
            w.input_tpm,
            w.output_tpm,
            w.required_units
        ));
    }

    out.push_str(&format!("{:-<78}\n", "  Capacity  "));
    out.push_str(&format!(
        "  Total TPM: {:.0} (input: {:.0}, output: {:.0})\n",
        agg.total_tpm, agg.total_input_tpm, agg.total_output_tpm
    ));
    out.push_str(&format!(
        "  Base: {}  Buffer: +{}  Peak: +{}  Subtotal: {}  Final: {}\n",
        agg.base_units, agg.buffer_units, agg.peak_units, agg.subtotal_units, agg.final_units
    ));
    for p in &report.projections {
        out.push_str(&format!(
            "  {:<22} {:>6} units  {:>6.1}% utilization  {:>3.0}% spillover\n",
            p.name, p.deployed_units, p.expected_utilization_percent, p.spillover_percent
        ));
    }

    out.push_str(&format!("{:-<78}\n", "  Cost (monthly)  "));
    out.push_str(&format!(
        "  Hourly: ${:.2}  1-year: ${:.2}  3-year: ${:.2}\n",
        res.monthly_hourly, res.monthly_one_year, res.monthly_three_year
    ));
    out.push_str(&format!(
        "  Annual savings: 1-year ${:.2}  3-year ${:.2}\n",
        res.savings_one_year, res.savings_three_year
    ));
    out.push_str(&format!(
        "  Pay-per-use: ${:.2} ({} input / {} output tokens)\n",
        report.on_demand.total_monthly,
        report.monthly_tokens.input_tokens,
        report.monthly_tokens.output_tokens
    ));
    out.push_str(&format!("  {}\n", report.comparison.summary()));
    out.push_str(&format!("{:=<78}\n", ""));
    out
}

/// Format spillover scenarios, marking the optimal one.
pub fn format_scenario_table(scenarios: &[Scenario], optimal: Option<&Scenario>) -> String {
    if scenarios.is_empty() {
        return String::from("No spillover scenarios.\n");
    }
    let mut out = String::new();
    out.push_str(&format!("\n{:=<90}\n", "  Spillover Scenarios  "));
    out.push_str(&format!(
        "  {:<32} {:>6} {:>12} {:>12} {:>12} {:>8}\n",
        "Scenario", "Units", "Reserved $", "Overflow $", "Total $", "vs 100%"
    ));
    out.push_str(&format!("{:-<90}\n", ""));
    for s in scenarios {
        let marker = match optimal {
            Some(o) if o.reserved_fraction == s.reserved_fraction => '*',
            _ => ' ',
        };
        out.push_str(&format!(
            "{} {:<32} {:>6} {:>12.2} {:>12.2} {:>12.2} {:>+7.1}%\n",
            marker,
            s.name,
            s.reserved_units,
            s.reserved_cost,
            s.overflow_cost,
            s.total_cost,
            s.delta_vs_full_reserve_percent
        ));
    }
    out.push_str(&format!("{:=<90}\n", ""));
    out
}

/// Format the per-workload chargeback allocation with totals.
pub fn format_chargeback_table(lines: &[ChargebackLine]) -> String {
    if lines.is_empty() {
        return String::from("No chargeback allocation.\n");
    }
    let mut out = String::new();
    out.push_str(&format!("\n{:=<78}\n", "  Chargeback  "));
    out.push_str(&format!(
        "  {:<30} {:>8} {:>8} {:>12} {:>12}\n",
        "Workload", "Share", "Units", "Monthly $", "Annual $"
    ));
    out.push_str(&format!("{:-<78}\n", ""));
    for l in lines {
        out.push_str(&format!(
            "  {:<30} {:>7.1}% {:>8} {:>12.2} {:>12.2}\n",
            truncate(&l.name, 30),
            l.share_percent(),
            l.capacity_allocation,
            l.monthly_cost,
            l.annual_cost
        ));
    }
    let units: u64 = lines.iter().map(|l| l.capacity_allocation).sum();
    let monthly: f64 = lines.iter().map(|l| l.monthly_cost).sum();
    let annual: f64 = lines.iter().map(|l| l.annual_cost).sum();
    out.push_str(&format!("{:-<78}\n", ""));
    out.push_str(&format!(
        "  {:<30} {:>8} {:>8} {:>12.2} {:>12.2}\n",
        "Total", "", units, monthly, annual
    ));
    out.push_str(&format!("{:=<78}\n", ""));
    out
}

/// Format one plan per deployment tier side by side.
pub fn format_tier_comparison(reports: &[PlanReport]) -> String {
    if reports.is_empty() {
        return String::from("No results to compare.\n");
    }
    let mut out = String::new();
    out.push_str(&format!("\n{:=<90}\n", "  Deployment Tier Comparison  "));
    out.push_str(&format!(
        "{:<24} {:>8} {:>12} {:>12} {:>12} {:>16}\n",
        "Deployment", "Units", "Hourly $", "1-year $", "3-year $", "Best scenario $"
    ));
    out.push_str(&format!("{:-<90}\n", ""));
    for r in reports {
        let best = r.optimal.as_ref().map(|s| s.total_cost).unwrap_or(0.0);
        out.push_str(&format!(
            "{:<24} {:>8} {:>12.2} {:>12.2} {:>12.2} {:>16.2}\n",
            truncate(&r.configuration.deployment_type, 24),
            r.aggregate.final_units,
            r.reservation.monthly_hourly,
            r.reservation.monthly_one_year,
            r.reservation.monthly_three_year,
            best,
        ));
    }
    out.push_str(&format!("{:=<90}\n", ""));
    out
}

/// Format the rate catalog's models and tiers.
pub fn format_catalog(catalog: &RateCatalog) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<16} {:>10} {:>10} {:>10} {:>9} {:>9}\n",
        "Model", "In TPM/u", "Out TPM/u", "Method", "$/1M in", "$/1M out"
    ));
    for (name, rate) in &catalog.conversion {
        let method = match rate.method {
            ConversionMethod::Ratio { output_ratio } => format!("ratio {}:1", output_ratio),
            ConversionMethod::Separate => "separate".to_string(),
            ConversionMethod::Legacy => "legacy".to_string(),
        };
        let (price_in, price_out) = catalog
            .on_demand_rate(name)
            .map(|r| (format!("{:.2}", r.input_per_million), format!("{:.2}", r.output_per_million)))
            .unwrap_or_else(|| ("-".to_string(), "-".to_string()));
        out.push_str(&format!(
            "{:<16} {:>10.0} {:>10.0} {:>10} {:>9} {:>9}\n",
            name, rate.input_tpm_per_unit, rate.output_tpm_per_unit, method, price_in, price_out
        ));
    }
    out.push('\n');
    for (name, tier) in &catalog.tiers {
        out.push_str(&format!(
            "{:<24} minimum {:>4}  increment {:>4}  {}\n",
            name, tier.minimum_units, tier.increment, tier.description
        ));
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", head)
    }
}
