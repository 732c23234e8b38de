//! Provider seams for the planning engine.
//!
//! These are intentionally minimal and domain-agnostic on the data side:
//! the engine treats activity search, distance oracles, and lodging
//! lookups as already-resolved collaborators. Concrete apps implement
//! them over their own storage or HTTP clients.

use crate::error::PlanError;
use crate::types::{CandidateActivity, Venue};

/// Raw pairwise matrices from a distance/time oracle.
///
/// Square, index-aligned with the requested location list. Cells may be
/// non-finite for unreachable pairs; the distance fabric repairs those.
#[derive(Debug, Clone)]
pub struct RawMatrices {
    /// Pairwise distances in kilometers.
    pub distances_km: Vec<Vec<f64>>,
    /// Pairwise travel times in hours.
    pub durations_hours: Vec<Vec<f64>>,
}

/// Supplies candidate activities for a destination.
pub trait ActivityProvider {
    /// Preference-ranked candidate set for the trip.
    fn ranked_candidates(
        &self,
        destination: &str,
        preferences: &[String],
        budget: f64,
        party_size: u32,
        days: u32,
    ) -> Vec<CandidateActivity>;

    /// Budget-ranked (ascending cost) fallback set.
    fn low_cost_candidates(
        &self,
        destination: &str,
        budget: f64,
        party_size: u32,
        limit: usize,
    ) -> Vec<CandidateActivity>;
}

/// Provides distance and travel-time matrices for a set of locations.
///
/// Locations are (lat, lon) pairs; the returned matrices are indexed by
/// the provided location order. A transport or decode failure must be
/// surfaced, never papered over with invented distances.
pub trait MatrixProvider {
    fn matrices_for(&self, locations: &[(f64, f64)]) -> Result<RawMatrices, PlanError>;
}

/// Supplies stay and lunch venues for a destination.
pub trait VenueProvider {
    fn venues(&self, destination: &str) -> Vec<Venue>;
}
