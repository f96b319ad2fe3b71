//! Read-only lookup tables: per-model conversion rates, per-model on-demand
//! prices and deployment-tier granularity.
//!
//! The engine never fetches or reconciles pricing; it trusts whatever
//! [`RateCatalog`] it is handed. [`RateCatalog::builtin`] ships a reference
//! table, and [`RateCatalog::from_file`] loads a replacement from TOML:
//!
//! ```toml
//! [conversion."gpt-4.1"]
//! input_tpm_per_unit = 3000
//! output_tpm_per_unit = 750
//! method = "ratio"
//! output_ratio = 4
//!
//! [on_demand."gpt-4.1"]
//! input_per_million = 2.0
//! output_per_million = 8.0
//!
//! [tiers."Global Provisioned"]
//! minimum_units = 15
//! increment = 5
//! ```

use crate::config::ConfigError;
use crate::error::{check_at_least, PlanError};
use crate::workload::Workload;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Deployment type used when a configuration names none.
pub const DEFAULT_DEPLOYMENT_TYPE: &str = "Global Provisioned";

/// How a model's token throughput maps onto capacity units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum ConversionMethod {
    /// Output tokens are weighted by `output_ratio` and added to input tokens;
    /// the sum is measured against the input capacity figure.
    Ratio { output_ratio: f64 },
    /// Input and output are sized independently; the larger requirement wins.
    Separate,
    /// Older models. Sized exactly like [`ConversionMethod::Separate`].
    Legacy,
}

/// Tokens-per-minute one capacity unit absorbs for a given model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionRate {
    pub input_tpm_per_unit: f64,
    pub output_tpm_per_unit: f64,
    #[serde(flatten)]
    pub method: ConversionMethod,
}

/// Pay-per-use prices, per million tokens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OnDemandRate {
    pub input_per_million: f64,
    pub output_per_million: f64,
}

/// Commitment class: smallest reservable quantity and allowed step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentTier {
    pub minimum_units: u32,
    pub increment: u32,
    #[serde(default)]
    pub description: String,
}

impl Default for DeploymentTier {
    fn default() -> Self {
        Self {
            minimum_units: 15,
            increment: 5,
            description: "Lowest minimum for cost-effective testing".to_string(),
        }
    }
}

/// Both rates a workload's model must resolve to before it can be planned.
#[derive(Debug, Clone, Copy)]
pub struct ModelRates<'a> {
    pub conversion: &'a ConversionRate,
    pub on_demand: &'a OnDemandRate,
}

/// Keyed lookup tables consumed by every engine stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RateCatalog {
    #[serde(default)]
    pub conversion: BTreeMap<String, ConversionRate>,
    #[serde(default)]
    pub on_demand: BTreeMap<String, OnDemandRate>,
    #[serde(default)]
    pub tiers: BTreeMap<String, DeploymentTier>,
}

// (model, input tpm/unit, output tpm/unit, output ratio, method, $/1M in, $/1M out)
type BuiltinModel = (&'static str, f64, f64, Option<f64>, &'static str, f64, f64);

const BUILTIN_MODELS: &[BuiltinModel] = &[
    ("gpt-5.2", 3400.0, 425.0, Some(8.0), "ratio", 6.00, 18.00),
    ("gpt-5", 4750.0, 594.0, Some(8.0), "ratio", 5.00, 15.00),
    ("gpt-5-mini", 23750.0, 2969.0, Some(8.0), "ratio", 0.30, 1.20),
    ("gpt-4.1", 3000.0, 750.0, Some(4.0), "ratio", 2.00, 8.00),
    ("gpt-4.1-mini", 14900.0, 3725.0, Some(4.0), "ratio", 0.40, 1.60),
    ("gpt-4.1-nano", 59400.0, 14850.0, Some(4.0), "ratio", 0.10, 0.40),
    ("GPT-4o", 2500.0, 833.0, None, "separate", 2.50, 10.00),
    ("GPT-4o-mini", 37000.0, 12333.0, None, "separate", 0.15, 0.60),
    ("GPT-4 Turbo", 1200.0, 400.0, None, "legacy", 10.00, 30.00),
    ("GPT-4", 800.0, 267.0, None, "legacy", 30.00, 60.00),
    ("GPT-3.5 Turbo", 10000.0, 3333.0, None, "legacy", 0.50, 1.50),
    ("o1", 500.0, 167.0, None, "separate", 15.00, 60.00),
    ("o1-mini", 2000.0, 667.0, None, "separate", 3.00, 12.00),
    ("o3", 400.0, 50.0, Some(8.0), "ratio", 20.00, 80.00),
    ("o3-mini", 1600.0, 200.0, Some(8.0), "ratio", 1.10, 4.40),
    ("o4-mini", 1800.0, 225.0, Some(8.0), "ratio", 1.10, 4.40),
    ("DeepSeek-R1", 4000.0, 1000.0, Some(4.0), "ratio", 0.55, 2.19),
];

const BUILTIN_TIERS: &[(&str, u32, u32, &str)] = &[
    (
        "Global Provisioned",
        15,
        5,
        "Lowest minimum for cost-effective testing",
    ),
    (
        "Data Zone Provisioned",
        50,
        50,
        "Higher minimum, regional data residency",
    ),
    (
        "Regional Provisioned",
        100,
        100,
        "Highest minimum, strict data sovereignty",
    ),
];

impl RateCatalog {
    /// Reference catalog of models and deployment tiers.
    pub fn builtin() -> Self {
        let mut catalog = RateCatalog::default();
        for &(name, input, output, ratio, method, price_in, price_out) in BUILTIN_MODELS {
            let method = match (method, ratio) {
                ("ratio", Some(output_ratio)) => ConversionMethod::Ratio { output_ratio },
                ("legacy", _) => ConversionMethod::Legacy,
                _ => ConversionMethod::Separate,
            };
            catalog.conversion.insert(
                name.to_string(),
                ConversionRate {
                    input_tpm_per_unit: input,
                    output_tpm_per_unit: output,
                    method,
                },
            );
            catalog.on_demand.insert(
                name.to_string(),
                OnDemandRate {
                    input_per_million: price_in,
                    output_per_million: price_out,
                },
            );
        }
        for &(name, minimum_units, increment, description) in BUILTIN_TIERS {
            catalog.tiers.insert(
                name.to_string(),
                DeploymentTier {
                    minimum_units,
                    increment,
                    description: description.to_string(),
                },
            );
        }
        catalog
    }

    /// Load a catalog from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse a catalog from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, ConfigError> {
        let catalog: RateCatalog = toml::from_str(s)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Check every table entry is usable for division and pricing.
    pub fn validate(&self) -> Result<(), PlanError> {
        for (model, rate) in &self.conversion {
            if !(rate.input_tpm_per_unit.is_finite() && rate.input_tpm_per_unit > 0.0) {
                return Err(PlanError::config(
                    format!("conversion.{}.input_tpm_per_unit", model),
                    "must be > 0",
                ));
            }
            if !(rate.output_tpm_per_unit.is_finite() && rate.output_tpm_per_unit > 0.0) {
                return Err(PlanError::config(
                    format!("conversion.{}.output_tpm_per_unit", model),
                    "must be > 0",
                ));
            }
            if let ConversionMethod::Ratio { output_ratio } = rate.method {
                if !(output_ratio.is_finite() && output_ratio > 0.0) {
                    return Err(PlanError::config(
                        format!("conversion.{}.output_ratio", model),
                        "must be > 0",
                    ));
                }
            }
        }
        for (model, rate) in &self.on_demand {
            check_at_least(
                &format!("on_demand.{}.input_per_million", model),
                rate.input_per_million,
                0.0,
            )?;
            check_at_least(
                &format!("on_demand.{}.output_per_million", model),
                rate.output_per_million,
                0.0,
            )?;
        }
        for (name, tier) in &self.tiers {
            if tier.minimum_units == 0 {
                return Err(PlanError::config(
                    format!("tiers.{}.minimum_units", name),
                    "must be > 0",
                ));
            }
            if tier.increment == 0 {
                return Err(PlanError::config(
                    format!("tiers.{}.increment", name),
                    "must be > 0",
                ));
            }
        }
        Ok(())
    }

    pub fn conversion_rate(&self, model: &str) -> Option<&ConversionRate> {
        self.conversion.get(model)
    }

    pub fn on_demand_rate(&self, model: &str) -> Option<&OnDemandRate> {
        self.on_demand.get(model)
    }

    /// Resolve both rate tables for a workload's model.
    pub fn resolve(&self, workload: &Workload) -> Result<ModelRates<'_>, PlanError> {
        let unknown = || PlanError::UnknownModel {
            workload_id: workload.id,
            model: workload.model.clone(),
        };
        let conversion = self.conversion_rate(&workload.model).ok_or_else(unknown)?;
        let on_demand = self.on_demand_rate(&workload.model).ok_or_else(unknown)?;
        Ok(ModelRates {
            conversion,
            on_demand,
        })
    }

    pub fn tier(&self, deployment_type: &str) -> Option<&DeploymentTier> {
        self.tiers.get(deployment_type)
    }

    /// Look up a tier, falling back to [`DeploymentTier::default`] (minimum 15,
    /// increment 5) for unrecognized deployment types.
    pub fn tier_or_default(&self, deployment_type: &str) -> DeploymentTier {
        match self.tier(deployment_type) {
            Some(tier) => tier.clone(),
            None => {
                tracing::warn!(
                    deployment_type,
                    "unknown deployment type, using default tier (minimum 15, increment 5)"
                );
                DeploymentTier::default()
            }
        }
    }

    /// Model names known to the conversion table, in sorted order.
    pub fn model_names(&self) -> Vec<&str> {
        self.conversion.keys().map(|k| k.as_str()).collect()
    }

    /// Deployment type names, in sorted order.
    pub fn tier_names(&self) -> Vec<&str> {
        self.tiers.keys().map(|k| k.as_str()).collect()
    }
}
