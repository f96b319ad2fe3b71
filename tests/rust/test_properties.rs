/// Property tests for sizing, pricing and allocation invariants.
use proptest::prelude::*;
use ptuplan_core::aggregator::aggregate;
use ptuplan_core::config::Configuration;
use ptuplan_core::converter::convert_all;
use ptuplan_core::cost::price_capacity;
use ptuplan_core::rates::{DeploymentTier, RateCatalog};
use ptuplan_core::spillover::SCAN_FRACTIONS;
use ptuplan_core::{run_plan, Workload};

const MODELS: [&str; 6] = ["gpt-4.1", "gpt-4.1-mini", "GPT-4o", "o1-mini", "GPT-4", "o3"];

fn workload_strategy() -> impl Strategy<Value = (usize, f64, f64, f64, f64)> {
    (
        0..MODELS.len(),
        0.0f64..8000.0,
        0.0f64..4000.0,
        0.0f64..500.0,
        0.0f64..=24.0,
    )
}

fn build_workloads(raw: &[(usize, f64, f64, f64, f64)]) -> Vec<Workload> {
    raw.iter()
        .enumerate()
        .map(|(i, &(m, input, output, rpm, hours))| {
            Workload::new(i as u32 + 1, format!("w{}", i), MODELS[m], input, output, rpm, hours)
        })
        .collect()
}

fn tier_strategy() -> impl Strategy<Value = DeploymentTier> {
    // Minimums sit on the increment grid, as in every real tier.
    (1u32..10, 1u32..100).prop_map(|(steps, increment)| DeploymentTier {
        minimum_units: steps * increment,
        increment,
        description: String::new(),
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_final_units_respect_tier(
        raw in prop::collection::vec(workload_strategy(), 0..8),
        tier in tier_strategy(),
        buffer in 0.0f64..100.0,
        peak in 0.5f64..3.0,
    ) {
        let config = Configuration {
            buffer_percent: buffer,
            peak_multiplier: peak,
            ..Configuration::default()
        };
        let outcome = convert_all(&build_workloads(&raw), &RateCatalog::builtin()).unwrap();
        let agg = aggregate(&outcome.breakdown, &tier, &config).unwrap();

        prop_assert_eq!(agg.final_units % u64::from(tier.increment), 0);
        if agg.base_units == 0 {
            prop_assert_eq!(agg.final_units, 0);
        } else {
            prop_assert!(agg.final_units >= u64::from(tier.minimum_units));
            prop_assert!(agg.final_units >= agg.subtotal_units);
            prop_assert!(agg.subtotal_units >= agg.base_units);
        }
    }

    #[test]
    fn prop_more_traffic_never_needs_fewer_units(
        (m, input, output, rpm, hours) in workload_strategy(),
        extra in 0.0f64..500.0,
    ) {
        let catalog = RateCatalog::builtin();
        let low = build_workloads(&[(m, input, output, rpm, hours)]);
        let high = build_workloads(&[(m, input, output, rpm + extra, hours)]);
        let low_units = convert_all(&low, &catalog).unwrap().breakdown[0].required_units;
        let high_units = convert_all(&high, &catalog).unwrap().breakdown[0].required_units;
        prop_assert!(high_units >= low_units);
    }

    #[test]
    fn prop_longer_terms_cost_less(
        units in 0u64..5000,
        rate in 0.0f64..10.0,
        d1 in 0.0f64..=100.0,
        d3_extra in 0.0f64..=100.0,
    ) {
        let config = Configuration {
            hourly_rate_per_unit: rate,
            discount_one_year_percent: d1,
            discount_three_year_percent: (d1 + d3_extra).min(100.0),
            ..Configuration::default()
        };
        let costs = price_capacity(units, &config);
        prop_assert!(costs.monthly_three_year <= costs.monthly_one_year + 1e-9);
        prop_assert!(costs.monthly_one_year <= costs.monthly_hourly + 1e-9);
        prop_assert!(costs.savings_three_year >= costs.savings_one_year - 1e-9);
    }

    #[test]
    fn prop_plan_scenarios_and_chargeback(
        raw in prop::collection::vec(workload_strategy(), 1..8),
    ) {
        let report = run_plan(
            &Configuration::default(),
            &build_workloads(&raw),
            &RateCatalog::builtin(),
        ).unwrap();

        if report.aggregate.final_units == 0 {
            prop_assert!(report.scenarios.is_empty());
            prop_assert!(report.optimal.is_none());
        } else {
            prop_assert_eq!(report.scenarios.len(), SCAN_FRACTIONS.len());
            prop_assert_eq!(report.scenarios[0].reserved_units, report.aggregate.final_units);
            prop_assert_eq!(report.scenarios[0].overflow_cost, 0.0);

            let optimal = report.optimal.as_ref().unwrap();
            for s in &report.scenarios {
                prop_assert!(optimal.total_cost <= s.total_cost);
                prop_assert!(s.reserved_units <= report.aggregate.final_units);
            }
        }

        if report.aggregate.total_tpm > 0.0 {
            let share: f64 = report.chargeback.iter().map(|l| l.traffic_share).sum();
            prop_assert!((share - 1.0).abs() < 1e-9);
            let monthly: f64 = report.chargeback.iter().map(|l| l.monthly_cost).sum();
            let expected = report.reservation.monthly_one_year;
            prop_assert!((monthly - expected).abs() <= 1e-6 * expected.max(1.0));
        }
    }
}
