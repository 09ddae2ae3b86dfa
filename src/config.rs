//! Aggregate planner configuration.
//!
//! Every section has defaults. `PlannerConfig` deserialises from any serde
//! format with missing fields filled in, or can be read from
//! `ROUTE_PLANNER_*` environment variables.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::matrix::MatrixConfig;
use crate::osrm::OsrmConfig;
use crate::pricing::PricingConfig;
use crate::solver::OptimizeOptions;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub osrm: OsrmConfig,
    pub matrix: MatrixConfig,
    pub pricing: PricingConfig,
    pub return_to_start: bool,
    pub max_iterations: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        let options = OptimizeOptions::default();
        Self {
            osrm: OsrmConfig::default(),
            matrix: MatrixConfig::default(),
            pricing: PricingConfig::default(),
            return_to_start: options.return_to_start,
            max_iterations: options.max_iterations,
        }
    }
}

impl PlannerConfig {
    /// Read overrides from the environment; unset or unparsable values keep defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup("ROUTE_PLANNER_OSRM_URL") {
            config.osrm.base_url = url;
        }
        if let Some(profile) = lookup("ROUTE_PLANNER_OSRM_PROFILE") {
            config.osrm.profile = profile;
        }
        set_parsed(&lookup, "ROUTE_PLANNER_OSRM_TIMEOUT_SECS", &mut config.osrm.timeout_secs);
        set_parsed(&lookup, "ROUTE_PLANNER_BATCH_SIZE", &mut config.matrix.batch_size);

        let mut delay_ms = config.matrix.min_delay.as_millis() as u64;
        set_parsed(&lookup, "ROUTE_PLANNER_MIN_DELAY_MS", &mut delay_ms);
        config.matrix.min_delay = Duration::from_millis(delay_ms);

        set_parsed(&lookup, "ROUTE_PLANNER_MAX_ITERATIONS", &mut config.max_iterations);
        set_parsed(&lookup, "ROUTE_PLANNER_RETURN_TO_START", &mut config.return_to_start);
        set_parsed(&lookup, "ROUTE_PLANNER_BASE_FEE", &mut config.pricing.base_fee);
        set_parsed(&lookup, "ROUTE_PLANNER_PRICE_PER_KM", &mut config.pricing.price_per_km);
        set_parsed(&lookup, "ROUTE_PLANNER_MIN_DISTANCE_KM", &mut config.pricing.min_distance);
        set_parsed(&lookup, "ROUTE_PLANNER_RUSH_HOUR_FEE", &mut config.pricing.rush_hour_fee);

        config
    }

    pub fn optimize_options(&self) -> OptimizeOptions {
        OptimizeOptions {
            return_to_start: self.return_to_start,
            max_iterations: self.max_iterations,
            ..OptimizeOptions::default()
        }
    }
}

fn set_parsed<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    target: &mut T,
) {
    let Some(raw) = lookup(key) else { return };
    match raw.trim().parse() {
        Ok(value) => *target = value,
        Err(_) => tracing::warn!(key, value = %raw, "ignoring unparsable configuration value"),
    }
}
