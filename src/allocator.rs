//! Daily allocation: greedy day packing under budget and time ceilings.
//!
//! Each day picks the best-scoring cluster still holding unused
//! candidates, fills up to the activity cap from it in score order, then
//! tops up from the low-cost fallback pool under the same constraints.
//! The `AllocationContext` spans the whole trip, so an activity is never
//! scheduled twice; later days depend on the bookkeeping of earlier ones
//! and day order must stay sequential.

use std::collections::HashSet;

use tracing::debug;

use crate::cluster::NOISE;
use crate::types::CandidateActivity;

/// A ranked candidate enriched with its cluster label and score. The
/// matrix index doubles as the candidate's stable handle.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub activity: CandidateActivity,
    pub matrix_index: usize,
    pub cluster: i32,
    pub score: f64,
}

/// A budget-ranked fallback candidate. Carries a matrix handle only
/// when it shares a location with a ranked candidate; without one, the
/// timeline compiler emits no travel leg around it.
#[derive(Debug, Clone)]
pub struct FallbackCandidate {
    pub activity: CandidateActivity,
    pub matrix_index: Option<usize>,
}

/// An activity admitted to a day, before timeline compilation.
#[derive(Debug, Clone)]
pub struct DayPick {
    pub activity: CandidateActivity,
    pub matrix_index: Option<usize>,
    /// Whole-party cost.
    pub total_cost: f64,
}

/// Trip-wide uniqueness bookkeeping. Names are the true dedup key since
/// two candidate records can alias one physical place; handles guard
/// the ranked pool cheaply.
#[derive(Debug, Default)]
pub struct AllocationContext {
    used_handles: HashSet<usize>,
    used_names: HashSet<String>,
}

impl AllocationContext {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_unused(&self, candidate: &ScoredCandidate) -> bool {
        !self.used_handles.contains(&candidate.matrix_index)
            && !self.used_names.contains(&candidate.activity.name)
    }

    fn mark(&mut self, name: &str, handle: Option<usize>) {
        self.used_names.insert(name.to_string());
        if let Some(handle) = handle {
            self.used_handles.insert(handle);
        }
    }
}

/// Per-day admission ceilings.
#[derive(Debug, Clone, Copy)]
pub struct DayLimits {
    pub daily_budget: f64,
    pub max_hours: f64,
    pub max_activities: usize,
    pub party_size: u32,
}

/// Fill one day. Constraints are hard: a violating candidate is
/// skipped, never truncated, and a day may end short of the cap.
pub fn fill_day(
    candidates: &[ScoredCandidate],
    fallback: &[FallbackCandidate],
    context: &mut AllocationContext,
    limits: &DayLimits,
) -> Vec<DayPick> {
    let mut picks: Vec<DayPick> = Vec::new();
    let mut spent = 0.0;
    let mut hours = 0.0;

    let mut pool = select_pool(candidates, context);
    pool.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.activity.name.cmp(&b.activity.name))
    });

    for candidate in pool.into_iter().take(limits.max_activities) {
        // The pool can hold name aliases; earlier admissions in this
        // same loop invalidate them, so re-check before admitting.
        if !context.is_unused(candidate) {
            continue;
        }
        let cost = candidate.activity.cost * f64::from(limits.party_size);
        let duration = candidate.activity.duration_hours;
        if spent + cost <= limits.daily_budget && hours + duration <= limits.max_hours {
            context.mark(&candidate.activity.name, Some(candidate.matrix_index));
            spent += cost;
            hours += duration;
            picks.push(DayPick {
                activity: candidate.activity.clone(),
                matrix_index: Some(candidate.matrix_index),
                total_cost: cost,
            });
        } else {
            debug!(name = %candidate.activity.name, "skipped: would exceed day ceiling");
        }
    }

    if picks.len() < limits.max_activities {
        top_up_from_fallback(fallback, context, limits, &mut picks, &mut spent, &mut hours);
    }

    picks
}

/// Among non-noise clusters with at least one unused member, pick the
/// one with the highest mean score over unused members (smallest label
/// wins ties). With no such cluster, fall back to the full unused pool.
fn select_pool<'a>(
    candidates: &'a [ScoredCandidate],
    context: &AllocationContext,
) -> Vec<&'a ScoredCandidate> {
    let mut labels: Vec<i32> = candidates
        .iter()
        .filter(|c| c.cluster != NOISE && context.is_unused(c))
        .map(|c| c.cluster)
        .collect();
    labels.sort_unstable();
    labels.dedup();

    let mut best: Option<(i32, f64)> = None;
    for label in labels {
        let members: Vec<f64> = candidates
            .iter()
            .filter(|c| c.cluster == label && context.is_unused(c))
            .map(|c| c.score)
            .collect();
        let mean = members.iter().sum::<f64>() / members.len() as f64;
        if best.is_none_or(|(_, best_mean)| mean > best_mean) {
            best = Some((label, mean));
        }
    }

    match best {
        Some((label, mean)) => {
            debug!(cluster = label, mean_score = mean, "selected cluster");
            candidates
                .iter()
                .filter(|c| c.cluster == label && context.is_unused(c))
                .collect()
        }
        None => candidates.iter().filter(|c| context.is_unused(c)).collect(),
    }
}

fn top_up_from_fallback(
    fallback: &[FallbackCandidate],
    context: &mut AllocationContext,
    limits: &DayLimits,
    picks: &mut Vec<DayPick>,
    spent: &mut f64,
    hours: &mut f64,
) {
    let mut pool: Vec<&FallbackCandidate> = fallback
        .iter()
        .filter(|c| !context.used_names.contains(&c.activity.name))
        .filter(|c| c.matrix_index.is_none_or(|h| !context.used_handles.contains(&h)))
        .collect();
    pool.sort_by(|a, b| {
        a.activity
            .cost
            .total_cmp(&b.activity.cost)
            .then_with(|| a.activity.name.cmp(&b.activity.name))
    });

    for candidate in pool {
        if picks.len() >= limits.max_activities {
            break;
        }
        let cost = candidate.activity.cost * f64::from(limits.party_size);
        let duration = candidate.activity.duration_hours;
        if *spent + cost <= limits.daily_budget && *hours + duration <= limits.max_hours {
            context.mark(&candidate.activity.name, candidate.matrix_index);
            *spent += cost;
            *hours += duration;
            picks.push(DayPick {
                activity: candidate.activity.clone(),
                matrix_index: candidate.matrix_index,
                total_cost: cost,
            });
        }
    }
}
