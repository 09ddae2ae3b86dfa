//! Haversine cost-matrix provider (fallback when no routing backend is available).
//!
//! Uses great-circle distance scaled by a road factor and an assumed speed.
//! Less accurate than a road network (ignores streets) but always available.

use crate::error::ProviderError;
use crate::traits::{CostMatrixProvider, LatLng, MatrixCell};

/// Average driving speed assumption for time estimation.
const DEFAULT_SPEED_KMH: f64 = 40.0;

/// Straight-line to road distance multiplier.
const DEFAULT_ROAD_FACTOR: f64 = 1.3;

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two (lat, lng) points in kilometers.
pub fn haversine_km(from: LatLng, to: LatLng) -> f64 {
    let (lat1, lng1) = from;
    let (lat2, lng2) = to;

    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lng = (lng2 - lng1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Haversine-based provider.
///
/// Every pair is reachable. Distances are metres along the great circle times
/// `road_factor`; durations assume a constant `speed_kmh`.
#[derive(Debug, Clone)]
pub struct HaversineMatrix {
    /// Assumed average driving speed in km/h.
    pub speed_kmh: f64,
    /// Multiplier applied to straight-line distance.
    pub road_factor: f64,
}

impl Default for HaversineMatrix {
    fn default() -> Self {
        Self {
            speed_kmh: DEFAULT_SPEED_KMH,
            road_factor: DEFAULT_ROAD_FACTOR,
        }
    }
}

impl HaversineMatrix {
    pub fn new(speed_kmh: f64, road_factor: f64) -> Self {
        Self {
            speed_kmh,
            road_factor,
        }
    }

    fn estimate(&self, from: LatLng, to: LatLng) -> MatrixCell {
        let km = haversine_km(from, to) * self.road_factor;
        MatrixCell::Ok {
            distance_m: (km * 1000.0).round(),
            duration_s: self.km_to_seconds(km),
        }
    }

    /// Convert distance in km to travel time in seconds.
    fn km_to_seconds(&self, km: f64) -> f64 {
        (km / self.speed_kmh * 3600.0).round()
    }
}

impl CostMatrixProvider for HaversineMatrix {
    fn table(
        &self,
        origins: &[LatLng],
        destinations: &[LatLng],
    ) -> Result<Vec<Vec<MatrixCell>>, ProviderError> {
        Ok(origins
            .iter()
            .map(|from| destinations.iter().map(|to| self.estimate(*from, *to)).collect())
            .collect())
    }

    fn max_batch(&self) -> usize {
        usize::MAX
    }

    fn name(&self) -> &str {
        "haversine"
    }
}
