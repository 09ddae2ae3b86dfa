//! Delivery price calculation.
//!
//! Price = base fee + chargeable km × price per km, plus a percentage
//! surcharge on weekday rush hours (11:30–14:00 and 18:30–21:00, inclusive).
//! Rush hour is judged at evaluation time, not at trip start.

use chrono::{Datelike, Local, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PricingConfig {
    pub base_fee: f64,
    pub price_per_km: f64,
    /// Distances below this many km are charged as this many km.
    pub min_distance: f64,
    /// Rush-hour surcharge in percent.
    pub rush_hour_fee: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            base_fee: 5.00,
            price_per_km: 2.00,
            min_distance: 1.5,
            rush_hour_fee: 20.0,
        }
    }
}

/// Monetary fields are rounded to cents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub distance_km: f64,
    /// Trip duration, rounded up to whole minutes.
    pub duration_min: u64,
    pub base_cost: f64,
    pub distance_cost: f64,
    pub rush_hour_cost: f64,
    pub total_cost: f64,
}

/// Price a delivery at the current local time; default config when `None`.
pub fn calculate_delivery_price(
    distance_meters: f64,
    duration_seconds: f64,
    config: Option<&PricingConfig>,
) -> PriceBreakdown {
    let default_config = PricingConfig::default();
    price_at(
        distance_meters,
        duration_seconds,
        config.unwrap_or(&default_config),
        Local::now().naive_local(),
    )
}

/// Price a delivery as if evaluated at `at`.
pub fn price_at(
    distance_meters: f64,
    duration_seconds: f64,
    config: &PricingConfig,
    at: NaiveDateTime,
) -> PriceBreakdown {
    let distance_km = distance_meters / 1000.0;
    let duration_min = (duration_seconds.max(0.0) / 60.0).ceil() as u64;

    let chargeable_km = distance_km.max(config.min_distance);
    let base_cost = config.base_fee;
    let distance_cost = chargeable_km * config.price_per_km;
    let rush_hour_cost = if is_rush_hour(at) {
        (base_cost + distance_cost) * config.rush_hour_fee / 100.0
    } else {
        0.0
    };
    let total_cost = base_cost + distance_cost + rush_hour_cost;

    PriceBreakdown {
        distance_km: round_cents(distance_km),
        duration_min,
        base_cost: round_cents(base_cost),
        distance_cost: round_cents(distance_cost),
        rush_hour_cost: round_cents(rush_hour_cost),
        total_cost: round_cents(total_cost),
    }
}

pub fn is_rush_hour(at: NaiveDateTime) -> bool {
    if matches!(at.weekday(), Weekday::Sat | Weekday::Sun) {
        return false;
    }
    let minute_of_day = at.hour() * 60 + at.minute();
    RUSH_BANDS
        .iter()
        .any(|&(start, end)| (start..=end).contains(&minute_of_day))
}

/// Minutes after midnight.
const RUSH_BANDS: [(u32, u32); 2] = [(11 * 60 + 30, 14 * 60), (18 * 60 + 30, 21 * 60)];

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
