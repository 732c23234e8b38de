//! OpenRouteService HTTP adapter for distance/time matrices.
//!
//! Transport failures surface as `PlanError::Oracle`; unreachable pairs
//! come back as `null` cells and are mapped to NaN for the distance
//! fabric to repair.

use serde::{Deserialize, Serialize};

use crate::error::PlanError;
use crate::traits::{MatrixProvider, RawMatrices};

#[derive(Debug, Clone)]
pub struct OrsConfig {
    pub base_url: String,
    pub api_key: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for OrsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openrouteservice.org".to_string(),
            api_key: String::new(),
            profile: "driving-car".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrsClient {
    config: OrsConfig,
    client: reqwest::blocking::Client,
}

impl OrsClient {
    pub fn new(config: OrsConfig) -> Result<Self, PlanError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }
}

impl MatrixProvider for OrsClient {
    fn matrices_for(&self, locations: &[(f64, f64)]) -> Result<RawMatrices, PlanError> {
        if locations.is_empty() {
            return Ok(RawMatrices {
                distances_km: Vec::new(),
                durations_hours: Vec::new(),
            });
        }

        // ORS wants [lon, lat] pairs, rounded to 6 decimals.
        let coordinates: Vec<[f64; 2]> = locations
            .iter()
            .map(|&(lat, lon)| [round6(lon), round6(lat)])
            .collect();

        let url = format!(
            "{}/v2/matrix/{}",
            self.config.base_url, self.config.profile
        );
        let request = MatrixRequest {
            locations: &coordinates,
            metrics: ["distance", "duration"],
            units: "km",
        };

        let response: MatrixResponse = self
            .client
            .post(url)
            .header("Authorization", &self.config.api_key)
            .json(&request)
            .send()?
            .error_for_status()?
            .json()?;

        let distances = response
            .distances
            .ok_or_else(|| PlanError::Oracle("response missing distances".to_string()))?;
        let durations = response
            .durations
            .ok_or_else(|| PlanError::Oracle("response missing durations".to_string()))?;

        Ok(RawMatrices {
            distances_km: to_cells(distances, 1.0),
            durations_hours: to_cells(durations, 1.0 / 3600.0),
        })
    }
}

fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

fn to_cells(rows: Vec<Vec<Option<f64>>>, scale: f64) -> Vec<Vec<f64>> {
    rows.into_iter()
        .map(|row| {
            row.into_iter()
                .map(|cell| cell.map_or(f64::NAN, |value| value * scale))
                .collect()
        })
        .collect()
}

#[derive(Serialize)]
struct MatrixRequest<'a> {
    locations: &'a [[f64; 2]],
    metrics: [&'a str; 2],
    units: &'a str,
}

#[derive(Deserialize)]
struct MatrixResponse {
    distances: Option<Vec<Vec<Option<f64>>>>,
    durations: Option<Vec<Vec<Option<f64>>>>,
}
