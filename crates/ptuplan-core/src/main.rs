//! ptuplan CLI: size provisioned throughput and compare pricing strategies.

use clap::{Parser, Subcommand};
use ptuplan_core::config::PlanConfig;
use ptuplan_core::cost::break_even_monthly_tokens;
use ptuplan_core::rates::RateCatalog;
use ptuplan_core::report;
use ptuplan_core::spillover::SpilloverPlanner;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(
    name = "ptuplan",
    about = "Plan provisioned throughput capacity and cost",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Size a project and compare reservation, pay-per-use and spillover.
    Plan {
        /// Path to TOML project file.
        #[arg(short, long)]
        config: PathBuf,
        /// Path to TOML rate catalog (defaults to the built-in tables).
        #[arg(short, long)]
        rates: Option<PathBuf>,
        /// Output report to JSON file.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Cost a single reserve/spill split.
    Scenario {
        /// Path to TOML project file.
        #[arg(short, long)]
        config: PathBuf,
        /// Path to TOML rate catalog.
        #[arg(short, long)]
        rates: Option<PathBuf>,
        /// Reserved share of the final capacity, between 0 and 1.
        #[arg(short, long)]
        fraction: f64,
    },
    /// Run the same project under every deployment tier.
    CompareTiers {
        /// Path to TOML project file.
        #[arg(short, long)]
        config: PathBuf,
        /// Path to TOML rate catalog.
        #[arg(short, long)]
        rates: Option<PathBuf>,
        /// Output reports to JSON file.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Monthly tokens per unit at which a reservation matches pay-per-use.
    BreakEven {
        /// Model name; every catalog model when omitted.
        #[arg(short, long)]
        model: Option<String>,
        /// Path to TOML project file for pricing (defaults otherwise).
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Path to TOML rate catalog.
        #[arg(short, long)]
        rates: Option<PathBuf>,
    },
    /// List catalog models and deployment tiers.
    ListModels {
        /// Path to TOML rate catalog.
        #[arg(short, long)]
        rates: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "ptuplan=info,ptuplan_core=info".into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Plan {
            config,
            rates,
            output,
        } => {
            let project = load_project(&config);
            let catalog = load_catalog(rates.as_deref());
            tracing::info!(project = %project.project.name, workloads = project.workloads.len(), "planning");

            let result = ptuplan_core::run_plan(&project.configuration(), &project.workloads, &catalog)
                .unwrap_or_else(|e| {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                });
            println!("{}", report::format_table(&result));
            println!(
                "{}",
                report::format_scenario_table(&result.scenarios, result.optimal.as_ref())
            );
            println!("{}", report::format_chargeback_table(&result.chargeback));

            if let Some(output_path) = output {
                write_json(&output_path, &result);
            }
        }
        Commands::Scenario {
            config,
            rates,
            fraction,
        } => {
            let project = load_project(&config);
            let catalog = load_catalog(rates.as_deref());
            let result = ptuplan_core::run_plan(&project.configuration(), &project.workloads, &catalog)
                .unwrap_or_else(|e| {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                });

            let planner = SpilloverPlanner::new(&result.tier, &result.configuration, &result.on_demand);
            let scenario = planner
                .custom_scenario(result.aggregate.final_units, fraction)
                .unwrap_or_else(|e| {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                });
            println!("{}", report::format_scenario_table(&[scenario], None));
        }
        Commands::CompareTiers {
            config,
            rates,
            output,
        } => {
            let project = load_project(&config);
            let catalog = load_catalog(rates.as_deref());
            let results = ptuplan_core::compare_deployment_types(
                &project.configuration(),
                &project.workloads,
                &catalog,
            )
            .unwrap_or_else(|e| {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            });
            println!("{}", report::format_tier_comparison(&results));

            if let Some(output_path) = output {
                write_json(&output_path, &results);
            }
        }
        Commands::BreakEven {
            model,
            config,
            rates,
        } => {
            let catalog = load_catalog(rates.as_deref());
            let configuration = config
                .as_deref()
                .map(|path| load_project(path).configuration())
                .unwrap_or_default();

            let models: Vec<String> = match model {
                Some(m) => vec![m],
                None => catalog.model_names().into_iter().map(String::from).collect(),
            };
            println!("{:<16} {:>20}", "Model", "Break-even tokens/mo");
            for name in &models {
                let rate = catalog.on_demand_rate(name).unwrap_or_else(|| {
                    eprintln!(
                        "Unknown model: {}. Available: {:?}",
                        name,
                        catalog.model_names()
                    );
                    std::process::exit(1);
                });
                println!(
                    "{:<16} {:>20}",
                    name,
                    break_even_monthly_tokens(rate, &configuration)
                );
            }
        }
        Commands::ListModels { rates } => {
            let catalog = load_catalog(rates.as_deref());
            print!("{}", report::format_catalog(&catalog));
        }
    }
}

fn load_project(path: &Path) -> PlanConfig {
    PlanConfig::from_file(path).unwrap_or_else(|e| {
        eprintln!("Error loading config: {}", e);
        std::process::exit(1);
    })
}

fn load_catalog(path: Option<&Path>) -> RateCatalog {
    match path {
        Some(p) => {
            tracing::info!(path = %p.display(), "loading rate catalog");
            RateCatalog::from_file(p).unwrap_or_else(|e| {
                eprintln!("Error loading rates: {}", e);
                std::process::exit(1);
            })
        }
        None => RateCatalog::builtin(),
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) {
    let json = serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        eprintln!("Error serializing output: {}", e);
        std::process::exit(1);
    });
    std::fs::write(path, json).unwrap_or_else(|e| {
        eprintln!("Error writing output: {}", e);
        std::process::exit(1);
    });
    println!("Results written to {}", path.display());
}
