/// Integration tests for project files and rate catalogs on disk.
use ptuplan_core::config::{ConfigError, PlanConfig};
use ptuplan_core::rates::{ConversionMethod, RateCatalog};
use ptuplan_core::run_plan;
use std::path::PathBuf;

fn configs_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../configs")
}

#[test]
fn test_load_demo_project() {
    let project = PlanConfig::from_file(&configs_dir().join("demo.toml")).unwrap();
    assert_eq!(project.project.name, "Demo Project");
    assert_eq!(project.workloads.len(), 5);
    assert_eq!(project.workloads[4].model, "o1-mini");
    assert_eq!(project.workloads[4].priority, 3);

    let report = run_plan(
        &project.configuration(),
        &project.workloads,
        &RateCatalog::builtin(),
    )
    .unwrap();
    assert_eq!(report.aggregate.final_units, 360);
    assert!(report.skipped.is_empty());
}

#[test]
fn test_load_example_catalog() {
    let catalog = RateCatalog::from_file(&configs_dir().join("rates_example.toml")).unwrap();
    assert_eq!(catalog.model_names(), vec!["GPT-4o", "gpt-4.1"]);
    assert_eq!(
        catalog.conversion_rate("gpt-4.1").unwrap().method,
        ConversionMethod::Ratio { output_ratio: 4.0 }
    );
    assert_eq!(
        catalog.conversion_rate("GPT-4o").unwrap().method,
        ConversionMethod::Separate
    );
    assert_eq!(catalog.tier("Global Provisioned").unwrap().minimum_units, 15);
}

#[test]
fn test_demo_project_with_reduced_catalog_skips_models() {
    let project = PlanConfig::from_file(&configs_dir().join("demo.toml")).unwrap();
    let catalog = RateCatalog::from_file(&configs_dir().join("rates_example.toml")).unwrap();
    let report = run_plan(&project.configuration(), &project.workloads, &catalog).unwrap();

    let skipped: Vec<u32> = report.skipped.iter().map(|s| s.workload_id).collect();
    assert_eq!(skipped, vec![2, 5]);
    // 58 + 67 + 73
    assert_eq!(report.aggregate.base_units, 198);
}

#[test]
fn test_missing_file_is_io_error() {
    let result = PlanConfig::from_file(&configs_dir().join("does-not-exist.toml"));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn test_malformed_toml_is_parse_error() {
    let result = PlanConfig::from_str("[pricing\nhourly_rate_per_unit = ");
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn test_catalog_rejects_zero_increment() {
    let toml = r#"
[tiers."Broken"]
minimum_units = 10
increment = 0
"#;
    assert!(matches!(
        RateCatalog::from_str(toml),
        Err(ConfigError::Plan(_))
    ));
}

#[test]
fn test_catalog_rejects_non_positive_throughput() {
    let toml = r#"
[conversion."bad"]
input_tpm_per_unit = 0
output_tpm_per_unit = 100
method = "separate"
"#;
    assert!(RateCatalog::from_str(toml).is_err());
}
