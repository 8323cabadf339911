use std::env;

use tracing::warn;

use crate::insights::InsightThresholds;
use crate::optimizer::{FillOrder, LoadingConfig};

/// Complete application configuration, loaded from environment variables or default values.
#[derive(Clone, Debug, Default)]
pub struct AppConfig {
    pub optimizer: OptimizerConfig,
    pub insights: InsightConfig,
}

impl AppConfig {
    /// Creates a configuration from the currently available environment variables.
    pub fn from_env() -> Self {
        Self {
            optimizer: OptimizerConfig::from_env(),
            insights: InsightConfig::from_env(),
        }
    }
}

/// Configuration for the loading heuristic.
#[derive(Clone, Debug, Default)]
pub struct OptimizerConfig {
    loading: LoadingConfig,
}

impl OptimizerConfig {
    const MAX_TRUCKS_VAR: &'static str = "LOAD_IT_NOW_MAX_TRUCKS_PER_TYPE";
    const FILL_ORDER_VAR: &'static str = "LOAD_IT_NOW_FILL_ORDER";
    const FIT_EPSILON_VAR: &'static str = "LOAD_IT_NOW_FIT_EPSILON";

    fn from_env() -> Self {
        let unbounded_truck_cap = match env_string(Self::MAX_TRUCKS_VAR) {
            Some(raw) => parse_truck_cap(&raw, Self::MAX_TRUCKS_VAR)
                .unwrap_or(LoadingConfig::DEFAULT_UNBOUNDED_TRUCK_CAP),
            None => LoadingConfig::DEFAULT_UNBOUNDED_TRUCK_CAP,
        };

        let fill_order = env_string(Self::FILL_ORDER_VAR)
            .and_then(|raw| parse_fill_order(&raw, Self::FILL_ORDER_VAR))
            .unwrap_or(LoadingConfig::DEFAULT_FILL_ORDER);

        let fit_epsilon = load_f64_with_warning(
            Self::FIT_EPSILON_VAR,
            LoadingConfig::DEFAULT_FIT_EPSILON,
            |value| (0.0..1.0).contains(&value),
            "must be at least 0 and below 1",
        );

        let loading = LoadingConfig::builder()
            .unbounded_truck_cap(unbounded_truck_cap)
            .fill_order(fill_order)
            .fit_epsilon(fit_epsilon)
            .build();

        Self { loading }
    }

    /// Returns the configured LoadingConfig.
    pub fn loading_config(&self) -> LoadingConfig {
        self.loading
    }
}

/// Configuration for metrics and insights.
#[derive(Clone, Debug)]
pub struct InsightConfig {
    thresholds: InsightThresholds,
    enabled: bool,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            thresholds: InsightThresholds::default(),
            enabled: true,
        }
    }
}

impl InsightConfig {
    const EXCELLENT_COST_VAR: &'static str = "LOAD_IT_NOW_INSIGHT_EXCELLENT_COST";
    const POOR_COST_VAR: &'static str = "LOAD_IT_NOW_INSIGHT_POOR_COST";
    const EXCELLENT_UTILIZATION_VAR: &'static str = "LOAD_IT_NOW_INSIGHT_EXCELLENT_UTILIZATION";
    const LOW_UTILIZATION_VAR: &'static str = "LOAD_IT_NOW_INSIGHT_LOW_UTILIZATION";
    const ENABLED_VAR: &'static str = "LOAD_IT_NOW_INCLUDE_INSIGHTS";

    fn from_env() -> Self {
        let positive = |value: f64| value > 0.0;
        let percentage = |value: f64| (0.0..=100.0).contains(&value);

        let thresholds = InsightThresholds {
            excellent_cost_efficiency: load_f64_with_warning(
                Self::EXCELLENT_COST_VAR,
                InsightThresholds::DEFAULT_EXCELLENT_COST_EFFICIENCY,
                positive,
                "must be greater than 0",
            ),
            poor_cost_efficiency: load_f64_with_warning(
                Self::POOR_COST_VAR,
                InsightThresholds::DEFAULT_POOR_COST_EFFICIENCY,
                positive,
                "must be greater than 0",
            ),
            excellent_utilization: load_f64_with_warning(
                Self::EXCELLENT_UTILIZATION_VAR,
                InsightThresholds::DEFAULT_EXCELLENT_UTILIZATION,
                percentage,
                "must be between 0 and 100",
            ),
            low_utilization: load_f64_with_warning(
                Self::LOW_UTILIZATION_VAR,
                InsightThresholds::DEFAULT_LOW_UTILIZATION,
                percentage,
                "must be between 0 and 100",
            ),
        };

        let thresholds = if thresholds.excellent_cost_efficiency > thresholds.poor_cost_efficiency
            || thresholds.low_utilization > thresholds.excellent_utilization
        {
            warn!("Insight thresholds overlap, falling back to defaults");
            InsightThresholds::default()
        } else {
            thresholds
        };

        let enabled = env_string(Self::ENABLED_VAR)
            .and_then(|raw| parse_bool(&raw, Self::ENABLED_VAR))
            .unwrap_or(true);

        Self {
            thresholds,
            enabled,
        }
    }

    pub fn thresholds(&self) -> InsightThresholds {
        self.thresholds
    }

    /// Whether responses should carry metrics by default.
    pub fn enabled(&self) -> bool {
        self.enabled
    }
}

fn env_string(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_owned())
            }
        }
        Err(env::VarError::NotPresent) => None,
        Err(err) => {
            warn!("Access to {} failed: {}. Using default value.", name, err);
            None
        }
    }
}

fn parse_bool(raw: &str, var_name: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        other => {
            warn!(
                "Could not interpret {} ('{}') as boolean value. Using default value.",
                var_name, other
            );
            None
        }
    }
}

fn parse_fill_order(raw: &str, var_name: &str) -> Option<FillOrder> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "reverse" => Some(FillOrder::Reverse),
        "declaration" | "forward" => Some(FillOrder::Declaration),
        other => {
            warn!(
                "Could not interpret {} ('{}') as fill order (reverse, declaration). Using default value.",
                var_name, other
            );
            None
        }
    }
}

fn parse_truck_cap(raw: &str, var_name: &str) -> Option<u32> {
    match raw.trim().parse::<u32>() {
        Ok(0) => {
            warn!("{} must not be 0. Using default value.", var_name);
            None
        }
        Ok(value) => Some(value),
        Err(err) => {
            warn!(
                "Could not parse {} ('{}'): {}. Using default value.",
                var_name, raw, err
            );
            None
        }
    }
}

fn parse_f64_with_warning(
    var_name: &str,
    raw: &str,
    default: f64,
    validator: impl Fn(f64) -> bool,
    invalid_hint: &str,
) -> f64 {
    match raw.parse::<f64>() {
        Ok(value) if validator(value) => value,
        Ok(_) => {
            warn!(
                "{} contains invalid value '{}': {}. Using {}.",
                var_name, raw, invalid_hint, default
            );
            default
        }
        Err(err) => {
            warn!(
                "Could not parse {} ('{}') as number: {}. Using {}.",
                var_name, raw, err, default
            );
            default
        }
    }
}

fn load_f64_with_warning(
    var_name: &str,
    default: f64,
    validator: impl Fn(f64) -> bool,
    invalid_hint: &str,
) -> f64 {
    match env_string(var_name) {
        Some(raw) => parse_f64_with_warning(var_name, &raw, default, validator, invalid_hint),
        None => default,
    }
}
