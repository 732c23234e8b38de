//! Composite candidate score: preference similarity, rating, and
//! cost affordability folded into one comparable number.

use crate::types::CandidateActivity;

const SIMILARITY_WEIGHT: f64 = 0.5;
const RATING_WEIGHT: f64 = 0.3;
const COST_WEIGHT: f64 = 0.2;

/// Score an activity against the per-person daily budget.
///
/// The cost term clamps the cost/budget ratio at 1 before subtraction,
/// so an activity consuming the entire budget earns zero affordability
/// credit rather than a penalty.
pub fn score_activity(activity: &CandidateActivity, per_person_daily_budget: f64) -> f64 {
    let cost_score = 1.0 - (activity.cost / per_person_daily_budget).min(1.0);
    SIMILARITY_WEIGHT * activity.similarity
        + RATING_WEIGHT * activity.rating / 5.0
        + COST_WEIGHT * cost_score
}
