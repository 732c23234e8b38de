//! Planner error taxonomy.
//!
//! Fatal conditions only: malformed trip parameters, oracle contract
//! violations, and destinations with no usable location data. Everything
//! else (unreachable pairs, asymmetric matrices, undersized days) is
//! absorbed by the pipeline and shows up as a smaller itinerary.

use std::fmt;

#[derive(Debug)]
pub enum PlanError {
    /// Trip parameters failed validation (day range, party size, budget).
    InvalidTrip(String),
    /// A coordinate outside valid lat/lon ranges reached the matrix layer.
    InvalidLocation { latitude: f64, longitude: f64 },
    /// The oracle returned a matrix that is not square or not aligned
    /// with the requested location list.
    MatrixShape { expected: usize, got: usize },
    /// A negative cell survived matrix repair; the oracle is broken.
    NegativeMatrixValue { matrix: &'static str },
    /// Every location was excluded by the missing-data row filter.
    NoUsableLocations,
    /// The distance/time oracle call itself failed. Never substituted
    /// with invented data.
    Oracle(String),
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanError::InvalidTrip(reason) => write!(f, "invalid trip parameters: {reason}"),
            PlanError::InvalidLocation {
                latitude,
                longitude,
            } => write!(f, "invalid location: lat={latitude}, lon={longitude}"),
            PlanError::MatrixShape { expected, got } => {
                write!(f, "oracle matrix shape mismatch: expected {expected}x{expected}, got {got} rows")
            }
            PlanError::NegativeMatrixValue { matrix } => {
                write!(f, "{matrix} matrix contains negative values")
            }
            PlanError::NoUsableLocations => {
                write!(f, "no usable locations after missing-data filtering")
            }
            PlanError::Oracle(reason) => write!(f, "matrix oracle failure: {reason}"),
        }
    }
}

impl std::error::Error for PlanError {}

impl From<reqwest::Error> for PlanError {
    fn from(err: reqwest::Error) -> Self {
        PlanError::Oracle(err.to_string())
    }
}
