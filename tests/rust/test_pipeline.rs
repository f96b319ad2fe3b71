/// Integration tests for the full planning pipeline.
use ptuplan_core::config::Configuration;
use ptuplan_core::rates::RateCatalog;
use ptuplan_core::*;

fn demo_workloads() -> Vec<Workload> {
    vec![
        Workload::new(1, "Customer Support Chatbot", "GPT-4o", 800.0, 400.0, 120.0, 18.0),
        Workload::new(2, "Internal Copilot Assistant", "gpt-4.1-mini", 1200.0, 600.0, 80.0, 10.0),
        Workload::new(3, "Document Summarization", "gpt-4.1", 4000.0, 1000.0, 25.0, 8.0),
        Workload::new(4, "Code Review Assistant", "GPT-4o", 2500.0, 1500.0, 40.0, 12.0),
        Workload::new(5, "Data Analysis Agent", "o1-mini", 3000.0, 2000.0, 15.0, 6.0),
    ]
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6 * b.abs().max(1.0)
}

#[test]
fn test_demo_project_sizing() {
    let report = run_plan(
        &Configuration::default(),
        &demo_workloads(),
        &RateCatalog::builtin(),
    )
    .unwrap();

    let units: Vec<u64> = report.breakdown.iter().map(|w| w.required_units).collect();
    assert_eq!(units, vec![58, 20, 67, 73, 45]);

    let agg = &report.aggregate;
    assert_eq!(agg.base_units, 263);
    assert_eq!(agg.buffer_units, 40);
    assert_eq!(agg.peak_units, 53);
    assert_eq!(agg.subtotal_units, 356);
    assert_eq!(agg.final_units, 360);
    assert!(approx(agg.total_input_tpm, 437_000.0));
    assert!(approx(agg.total_output_tpm, 211_000.0));
}

#[test]
fn test_demo_project_costs() {
    let report = run_plan(
        &Configuration::default(),
        &demo_workloads(),
        &RateCatalog::builtin(),
    )
    .unwrap();

    let res = &report.reservation;
    assert!(approx(res.monthly_hourly, 360.0 * 0.0396 * 730.0));
    assert!(approx(res.monthly_one_year, 8325.504));
    assert!(approx(res.monthly_three_year, 6244.128));
    assert!(res.monthly_three_year < res.monthly_one_year);
    assert!(res.monthly_one_year < res.monthly_hourly);

    assert!(approx(report.on_demand.total_monthly, 55_629.65));
    assert_eq!(report.on_demand.per_workload.len(), 5);
    assert!(approx(report.on_demand.per_workload[2].monthly_cost, 5840.0));

    match report.comparison.recommendation {
        Recommendation::Reserve { monthly_savings } => {
            assert!(approx(monthly_savings, 55_629.65 - 8325.504));
        }
        ref other => panic!("expected Reserve, got {:?}", other),
    }
}

#[test]
fn test_demo_project_spillover_and_chargeback() {
    let report = run_plan(
        &Configuration::default(),
        &demo_workloads(),
        &RateCatalog::builtin(),
    )
    .unwrap();

    assert_eq!(report.scenarios.len(), 6);
    assert_eq!(report.scenarios[0].reserved_units, 360);
    for s in &report.scenarios {
        assert_eq!(s.reserved_units % 5, 0);
        assert!(approx(s.total_cost, s.reserved_cost + s.overflow_cost));
    }
    // Pay-per-use is far more expensive, so spilling never pays off
    let optimal = report.optimal.as_ref().unwrap();
    assert_eq!(optimal.reserved_fraction, 1.0);

    let share: f64 = report.chargeback.iter().map(|l| l.traffic_share).sum();
    assert!((share - 1.0).abs() < 1e-9);
    let monthly: f64 = report.chargeback.iter().map(|l| l.monthly_cost).sum();
    assert!(approx(monthly, report.reservation.monthly_one_year));
}

#[test]
fn test_empty_workload_set() {
    let report = run_plan(&Configuration::default(), &[], &RateCatalog::builtin()).unwrap();
    assert_eq!(report.aggregate.final_units, 0);
    assert_eq!(report.reservation.monthly_one_year, 0.0);
    assert_eq!(report.on_demand.total_monthly, 0.0);
    assert_eq!(
        report.comparison.recommendation,
        Recommendation::InsufficientData
    );
}

#[test]
fn test_unknown_model_is_skipped() {
    let mut workloads = demo_workloads();
    workloads.push(Workload::new(6, "Mystery", "not-a-model", 100.0, 100.0, 10.0, 1.0));

    let report = run_plan(&Configuration::default(), &workloads, &RateCatalog::builtin()).unwrap();
    assert_eq!(report.breakdown.len(), 5);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].workload_id, 6);
    assert_eq!(report.aggregate.base_units, 263);
    assert_eq!(report.chargeback.len(), 5);
    assert_eq!(report.on_demand.per_workload.len(), 5);
}

#[test]
fn test_zero_traffic_does_not_reserve_minimum() {
    let workloads = vec![Workload::new(1, "Idle", "gpt-4.1", 1000.0, 500.0, 0.0, 8.0)];
    let report = run_plan(&Configuration::default(), &workloads, &RateCatalog::builtin()).unwrap();
    assert_eq!(report.aggregate.base_units, 0);
    assert_eq!(report.aggregate.final_units, 0);
    assert!(report.scenarios.is_empty());
    assert_eq!(report.chargeback[0].traffic_share, 0.0);
}

#[test]
fn test_minimum_applies_per_tier() {
    let workloads = vec![Workload::new(1, "Small", "gpt-4.1", 100.0, 50.0, 10.0, 8.0)];
    let reports = compare_deployment_types(
        &Configuration::default(),
        &workloads,
        &RateCatalog::builtin(),
    )
    .unwrap();

    let finals: Vec<(String, u64)> = reports
        .iter()
        .map(|r| (r.configuration.deployment_type.clone(), r.aggregate.final_units))
        .collect();
    assert_eq!(
        finals,
        vec![
            ("Data Zone Provisioned".to_string(), 50),
            ("Global Provisioned".to_string(), 15),
            ("Regional Provisioned".to_string(), 100),
        ]
    );
}

#[test]
fn test_demo_tier_comparison() {
    let reports = compare_deployment_types(
        &Configuration::default(),
        &demo_workloads(),
        &RateCatalog::builtin(),
    )
    .unwrap();
    let finals: Vec<u64> = reports.iter().map(|r| r.aggregate.final_units).collect();
    assert_eq!(finals, vec![400, 360, 400]);
}

#[test]
fn test_invalid_workload_rejected() {
    let mut workloads = demo_workloads();
    workloads[0].daily_active_hours = 25.0;
    let err = run_plan(&Configuration::default(), &workloads, &RateCatalog::builtin()).unwrap_err();
    assert!(matches!(
        err,
        PlanError::InvalidWorkload { workload_id: 1, .. }
    ));
}

#[test]
fn test_duplicate_ids_rejected() {
    let mut workloads = demo_workloads();
    workloads[1].id = 1;
    assert!(run_plan(&Configuration::default(), &workloads, &RateCatalog::builtin()).is_err());
}

#[test]
fn test_custom_scenario_matches_scan() {
    let config = Configuration::default();
    let report = run_plan(&config, &demo_workloads(), &RateCatalog::builtin()).unwrap();
    let planner = SpilloverPlanner::new(&report.tier, &config, &report.on_demand);
    let custom = planner
        .custom_scenario(report.aggregate.final_units, 0.90)
        .unwrap();
    assert_eq!(custom, report.scenarios[2]);
}

#[test]
fn test_report_serializes_to_json() {
    let report = run_plan(
        &Configuration::default(),
        &demo_workloads(),
        &RateCatalog::builtin(),
    )
    .unwrap();
    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("\"final_units\":360"));
    assert!(json.contains("\"kind\":\"reserve\""));
}

#[test]
fn test_unsizable_traffic_is_an_error_not_a_panic() {
    let workloads = vec![
        Workload::new(1, "Firehose A", "GPT-4", 8e9, 0.0, 1e12, 1.0),
        Workload::new(2, "Firehose B", "GPT-4", 8e9, 0.0, 1e12, 1.0),
    ];
    let err = run_plan(&Configuration::default(), &workloads, &RateCatalog::builtin()).unwrap_err();
    assert!(matches!(
        err,
        PlanError::InvalidWorkload { workload_id: 1, .. }
    ));
}

#[test]
fn test_overflowing_traffic_is_rejected_not_zeroed() {
    let workloads = vec![Workload::new(1, "w", "gpt-4.1", 1e200, 0.0, 1e200, 24.0)];
    let err = run_plan(&Configuration::default(), &workloads, &RateCatalog::builtin()).unwrap_err();
    assert_eq!(
        err,
        PlanError::InvalidWorkload {
            workload_id: 1,
            field: "peak_requests_per_minute".to_string(),
            reason: "traffic overflows".to_string(),
        }
    );
}
