//! Haversine distance matrix provider (fallback when no routing oracle
//! is available).
//!
//! Uses great-circle distance to estimate travel distance and time.
//! Less accurate than a road oracle but always available and fully
//! deterministic.

use rayon::prelude::*;

use crate::error::PlanError;
use crate::traits::{MatrixProvider, RawMatrices};

/// Average driving speed assumption for time estimation.
const DEFAULT_SPEED_KMH: f64 = 40.0;

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two (lat, lon) points in kilometers.
pub fn haversine_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lon1) = from;
    let (lat2, lon2) = to;

    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Haversine-based matrix provider.
///
/// Estimates travel time from straight-line distance and an assumed
/// speed. Useful as a fallback oracle and as the deterministic oracle in
/// tests.
#[derive(Debug, Clone)]
pub struct HaversineMatrix {
    /// Assumed average driving speed in km/h.
    pub speed_kmh: f64,
}

impl Default for HaversineMatrix {
    fn default() -> Self {
        Self {
            speed_kmh: DEFAULT_SPEED_KMH,
        }
    }
}

impl HaversineMatrix {
    pub fn new(speed_kmh: f64) -> Self {
        Self { speed_kmh }
    }
}

impl MatrixProvider for HaversineMatrix {
    fn matrices_for(&self, locations: &[(f64, f64)]) -> Result<RawMatrices, PlanError> {
        let distances_km: Vec<Vec<f64>> = locations
            .par_iter()
            .map(|from| {
                locations
                    .iter()
                    .map(|to| haversine_km(*from, *to))
                    .collect()
            })
            .collect();

        let durations_hours = distances_km
            .iter()
            .map(|row| row.iter().map(|km| km / self.speed_kmh).collect())
            .collect();

        Ok(RawMatrices {
            distances_km,
            durations_hours,
        })
    }
}
