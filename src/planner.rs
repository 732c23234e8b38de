//! Itinerary orchestration: validate the trip, gather candidates,
//! build matrices, cluster, score, pack days, and attach venues.
//!
//! One call is one synchronous computation; nothing is shared between
//! requests, and the day loop is deliberately sequential because each
//! day consumes the uniqueness bookkeeping of the days before it.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use chrono::NaiveTime;
use tracing::info;

use crate::allocator::{fill_day, AllocationContext, DayLimits, FallbackCandidate, ScoredCandidate};
use crate::cluster::{cluster_locations, ClusterOptions};
use crate::error::PlanError;
use crate::matrix::build_matrices;
use crate::score::score_activity;
use crate::timeline::compile_day;
use crate::traits::{ActivityProvider, MatrixProvider, VenueProvider};
use crate::types::{CandidateActivity, DayPlan, Itinerary, TripParams};
use crate::venues::attach_suggestions;

/// Planner tunables. Defaults mirror production values.
#[derive(Debug, Clone)]
pub struct PlanOptions {
    /// Trips below this total budget are rejected outright.
    pub minimum_budget: f64,
    /// Ceiling on summed activity hours per day; travel time is exempt.
    pub max_hours_per_day: f64,
    /// Taxi fare per kilometer per person.
    pub taxi_rate_per_km: f64,
    /// Primary-activity cap per day; travel legs don't count.
    pub max_activities_per_day: usize,
    pub day_start: NaiveTime,
    /// Inclusive window a slot's start must fall in to anchor lunch.
    pub lunch_window: (NaiveTime, NaiveTime),
    pub cluster: ClusterOptions,
    pub fallback_pool_floor: usize,
    pub fallback_pool_ceiling: usize,
    pub fallback_per_day: usize,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            minimum_budget: 100.0,
            max_hours_per_day: 10.0,
            taxi_rate_per_km: 16.0,
            max_activities_per_day: 3,
            day_start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            lunch_window: (
                NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            ),
            cluster: ClusterOptions::default(),
            fallback_pool_floor: 20,
            fallback_pool_ceiling: 50,
            fallback_per_day: 7,
        }
    }
}

impl PlanOptions {
    /// Fallback pool size: `min(ceiling, max(floor, per_day * days))`.
    pub fn fallback_pool_size(&self, days: u32) -> usize {
        (self.fallback_per_day * days as usize)
            .clamp(self.fallback_pool_floor, self.fallback_pool_ceiling)
    }
}

/// Compute a full multi-day itinerary for one trip.
///
/// A destination with no usable candidates yields an empty itinerary,
/// not an error; malformed trip parameters and oracle contract
/// violations are the only fatal outcomes.
pub fn plan<A, M, V>(
    params: &TripParams,
    activities: &A,
    matrix_provider: &M,
    venue_provider: &V,
    options: &PlanOptions,
) -> Result<Itinerary, PlanError>
where
    A: ActivityProvider,
    M: MatrixProvider,
    V: VenueProvider,
{
    validate(params, options)?;
    let days = params.days() as u32;

    let ranked = activities.ranked_candidates(
        &params.destination,
        &params.preferences,
        params.budget,
        params.party_size,
        days,
    );
    let fallback_pool = activities.low_cost_candidates(
        &params.destination,
        params.budget,
        params.party_size,
        options.fallback_pool_size(days),
    );

    let deduped = dedupe_by_coordinate(ranked);
    if deduped.is_empty() {
        info!(destination = %params.destination, "no usable candidates, empty itinerary");
        return Ok(Itinerary {
            itinerary: Vec::new(),
        });
    }

    let locations: Vec<(f64, f64)> = deduped
        .iter()
        .map(|activity| (activity.latitude, activity.longitude))
        .collect();
    let matrices = build_matrices(matrix_provider, &locations)?;

    let survivors: Vec<CandidateActivity> = matrices
        .kept_indices
        .iter()
        .map(|&i| deduped[i].clone())
        .collect();

    let labels = cluster_locations(&matrices, &options.cluster);
    let per_person_daily_budget = params.per_person_daily_budget();
    let scored: Vec<ScoredCandidate> = survivors
        .into_iter()
        .enumerate()
        .map(|(i, activity)| ScoredCandidate {
            score: score_activity(&activity, per_person_daily_budget),
            matrix_index: i,
            cluster: labels[i],
            activity,
        })
        .collect();

    // Fallback candidates sharing a location with a ranked candidate
    // inherit its matrix handle; the rest go without travel legs.
    let handle_by_coord: HashMap<(i64, i64), usize> = scored
        .iter()
        .map(|c| (c.activity.coordinate_key(), c.matrix_index))
        .collect();
    let fallback: Vec<FallbackCandidate> = fallback_pool
        .into_iter()
        .map(|activity| FallbackCandidate {
            matrix_index: handle_by_coord.get(&activity.coordinate_key()).copied(),
            activity,
        })
        .collect();

    let limits = DayLimits {
        daily_budget: params.daily_budget(),
        max_hours: options.max_hours_per_day,
        max_activities: options.max_activities_per_day,
        party_size: params.party_size,
    };

    let mut context = AllocationContext::new();
    let mut day_plans = Vec::with_capacity(days as usize);
    for day in 1..=days {
        let picks = fill_day(&scored, &fallback, &mut context, &limits);
        let date = params.date_for_day(day);
        let entries = compile_day(
            &picks,
            &matrices,
            day,
            date,
            params.party_size,
            options.taxi_rate_per_km,
            options.day_start,
        );
        day_plans.push(DayPlan {
            day,
            date,
            activities: entries,
            lunch: Vec::new(),
            stay: Vec::new(),
        });
    }

    let venues = venue_provider.venues(&params.destination);
    attach_suggestions(&mut day_plans, &venues, options.lunch_window);

    info!(days, "itinerary generated");
    Ok(Itinerary {
        itinerary: day_plans,
    })
}

fn validate(params: &TripParams, options: &PlanOptions) -> Result<(), PlanError> {
    if params.days() < 1 {
        return Err(PlanError::InvalidTrip(
            "end date precedes start date".to_string(),
        ));
    }
    if params.party_size < 1 {
        return Err(PlanError::InvalidTrip(
            "party size must be at least 1".to_string(),
        ));
    }
    if params.budget < options.minimum_budget {
        return Err(PlanError::InvalidTrip(format!(
            "budget {} is below the minimum {}",
            params.budget, options.minimum_budget
        )));
    }
    Ok(())
}

/// Collapse candidates sharing a rounded coordinate to one
/// representative, keeping the highest-similarity record and the
/// first-seen ordering. Candidates with invalid coordinates are
/// dropped.
fn dedupe_by_coordinate(candidates: Vec<CandidateActivity>) -> Vec<CandidateActivity> {
    let mut order: Vec<(i64, i64)> = Vec::new();
    let mut best: HashMap<(i64, i64), CandidateActivity> = HashMap::new();

    for candidate in candidates {
        if !candidate.has_valid_coordinates() {
            continue;
        }
        let key = candidate.coordinate_key();
        match best.entry(key) {
            Entry::Vacant(slot) => {
                order.push(key);
                slot.insert(candidate);
            }
            Entry::Occupied(mut slot) => {
                if candidate.similarity > slot.get().similarity {
                    slot.insert(candidate);
                }
            }
        }
    }

    order
        .into_iter()
        .filter_map(|key| best.remove(&key))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_pool_size_bounds() {
        let options = PlanOptions::default();
        assert_eq!(options.fallback_pool_size(1), 20);
        assert_eq!(options.fallback_pool_size(4), 28);
        assert_eq!(options.fallback_pool_size(10), 50);
    }

    #[test]
    fn test_dedupe_keeps_highest_similarity() {
        let a = CandidateActivity {
            name: "First".to_string(),
            category: "Park".to_string(),
            location: "Jaipur".to_string(),
            cost: 5.0,
            rating: 4.0,
            latitude: 26.9,
            longitude: 75.8,
            tags: Vec::new(),
            duration_hours: 1.0,
            similarity: 0.2,
        };
        let mut b = a.clone();
        b.name = "Second".to_string();
        b.similarity = 0.8;

        let deduped = dedupe_by_coordinate(vec![a, b]);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].name, "Second");
    }

    #[test]
    fn test_dedupe_drops_invalid_coordinates() {
        let broken = CandidateActivity {
            name: "Broken".to_string(),
            category: "Park".to_string(),
            location: "?".to_string(),
            cost: 5.0,
            rating: 4.0,
            latitude: 0.0,
            longitude: 0.0,
            tags: Vec::new(),
            duration_hours: 1.0,
            similarity: 0.0,
        };
        assert!(dedupe_by_coordinate(vec![broken]).is_empty());
    }
}
