//! TOML project files and the engine's flat [`Configuration`].
//!
//! A project file carries pricing, sizing policy and the workload list. The
//! sections are converted into a [`Configuration`] snapshot that every engine
//! call takes by reference; nothing is read from global state.

use crate::error::{check_at_least, check_range, PlanError};
use crate::rates::DEFAULT_DEPLOYMENT_TYPE;
use crate::workload::{validate_workloads, Workload};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Reference hours in a month (365 × 24 / 12).
pub const DEFAULT_HOURS_PER_MONTH: f64 = 730.0;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Validation(String),
    #[error(transparent)]
    Plan(#[from] PlanError),
}

/// Pricing and sizing policy for one calculation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Key into the catalog's deployment tiers.
    pub deployment_type: String,
    /// Non-discounted price of one capacity unit for one hour.
    pub hourly_rate_per_unit: f64,
    pub discount_one_year_percent: f64,
    pub discount_three_year_percent: f64,
    /// Informational target; sizing does not consume it.
    pub target_utilization_percent: f64,
    pub buffer_percent: f64,
    /// Values below 1 are treated as 1.
    pub peak_multiplier: f64,
    pub hours_per_month: f64,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            deployment_type: DEFAULT_DEPLOYMENT_TYPE.to_string(),
            hourly_rate_per_unit: default_hourly_rate(),
            discount_one_year_percent: default_discount_one_year(),
            discount_three_year_percent: default_discount_three_year(),
            target_utilization_percent: default_target_utilization(),
            buffer_percent: default_buffer_percent(),
            peak_multiplier: default_peak_multiplier(),
            hours_per_month: DEFAULT_HOURS_PER_MONTH,
        }
    }
}

impl Configuration {
    /// Reject non-finite or out-of-range fields before any computation.
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.deployment_type.trim().is_empty() {
            return Err(PlanError::config("deployment_type", "must not be empty"));
        }
        check_at_least("hourly_rate_per_unit", self.hourly_rate_per_unit, 0.0)?;
        check_range(
            "discount_one_year_percent",
            self.discount_one_year_percent,
            0.0,
            100.0,
        )?;
        check_range(
            "discount_three_year_percent",
            self.discount_three_year_percent,
            0.0,
            100.0,
        )?;
        check_range(
            "target_utilization_percent",
            self.target_utilization_percent,
            0.0,
            100.0,
        )?;
        if self.target_utilization_percent == 0.0 {
            return Err(PlanError::config("target_utilization_percent", "must be > 0"));
        }
        check_at_least("buffer_percent", self.buffer_percent, 0.0)?;
        if !self.peak_multiplier.is_finite() {
            return Err(PlanError::config("peak_multiplier", "must be a finite number"));
        }
        if !(self.hours_per_month.is_finite() && self.hours_per_month > 0.0) {
            return Err(PlanError::config("hours_per_month", "must be > 0"));
        }
        Ok(())
    }

    /// Peak multiplier clamped to at least 1, so peak headroom is never negative.
    pub fn effective_peak_multiplier(&self) -> f64 {
        self.peak_multiplier.max(1.0)
    }

    /// Average days per month implied by `hours_per_month`.
    pub fn days_per_month(&self) -> f64 {
        self.hours_per_month / 24.0
    }
}

/// Top-level project file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanConfig {
    #[serde(default)]
    pub project: ProjectSection,
    #[serde(default)]
    pub deployment: DeploymentSection,
    #[serde(default)]
    pub pricing: PricingSection,
    #[serde(default)]
    pub sizing: SizingSection,
    #[serde(default)]
    pub workloads: Vec<Workload>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSection {
    #[serde(default = "default_project_name")]
    pub name: String,
}

fn default_project_name() -> String {
    "project".to_string()
}

impl Default for ProjectSection {
    fn default() -> Self {
        Self {
            name: default_project_name(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentSection {
    #[serde(rename = "type", default = "default_deployment_type")]
    pub deployment_type: String,
}

fn default_deployment_type() -> String {
    DEFAULT_DEPLOYMENT_TYPE.to_string()
}

impl Default for DeploymentSection {
    fn default() -> Self {
        Self {
            deployment_type: default_deployment_type(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingSection {
    #[serde(default = "default_hourly_rate")]
    pub hourly_rate_per_unit: f64,
    #[serde(default = "default_discount_one_year")]
    pub discount_one_year_percent: f64,
    #[serde(default = "default_discount_three_year")]
    pub discount_three_year_percent: f64,
    #[serde(default = "default_hours_per_month")]
    pub hours_per_month: f64,
}

fn default_hourly_rate() -> f64 {
    0.0396
}
fn default_discount_one_year() -> f64 {
    20.0
}
fn default_discount_three_year() -> f64 {
    40.0
}
fn default_hours_per_month() -> f64 {
    DEFAULT_HOURS_PER_MONTH
}

impl Default for PricingSection {
    fn default() -> Self {
        Self {
            hourly_rate_per_unit: default_hourly_rate(),
            discount_one_year_percent: default_discount_one_year(),
            discount_three_year_percent: default_discount_three_year(),
            hours_per_month: default_hours_per_month(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizingSection {
    #[serde(default = "default_target_utilization")]
    pub target_utilization_percent: f64,
    #[serde(default = "default_buffer_percent")]
    pub buffer_percent: f64,
    #[serde(default = "default_peak_multiplier")]
    pub peak_multiplier: f64,
}

fn default_target_utilization() -> f64 {
    85.0
}
fn default_buffer_percent() -> f64 {
    15.0
}
fn default_peak_multiplier() -> f64 {
    1.2
}

impl Default for SizingSection {
    fn default() -> Self {
        Self {
            target_utilization_percent: default_target_utilization(),
            buffer_percent: default_buffer_percent(),
            peak_multiplier: default_peak_multiplier(),
        }
    }
}

impl PlanConfig {
    /// Load a project from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse a project from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, ConfigError> {
        let config: PlanConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.project.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "project.name must not be empty".to_string(),
            ));
        }
        self.configuration().validate()?;
        validate_workloads(&self.workloads)?;
        Ok(())
    }

    /// Flatten the file sections into the engine's configuration snapshot.
    pub fn configuration(&self) -> Configuration {
        Configuration {
            deployment_type: self.deployment.deployment_type.clone(),
            hourly_rate_per_unit: self.pricing.hourly_rate_per_unit,
            discount_one_year_percent: self.pricing.discount_one_year_percent,
            discount_three_year_percent: self.pricing.discount_three_year_percent,
            target_utilization_percent: self.sizing.target_utilization_percent,
            buffer_percent: self.sizing.buffer_percent,
            peak_multiplier: self.sizing.peak_multiplier,
            hours_per_month: self.pricing.hours_per_month,
        }
    }
}
