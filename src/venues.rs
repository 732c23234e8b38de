//! Lodging matcher: nearest stay and lunch venues per day.
//!
//! Runs after all days are compiled. Stays rank by great-circle
//! distance to the day's last activity, lunches to the first activity
//! whose slot starts inside the lunch window. Both de-duplication sets
//! span the whole trip, independently, so no venue repeats across days.

use chrono::NaiveTime;
use std::collections::HashSet;
use tracing::debug;

use crate::haversine::haversine_km;
use crate::types::{ActivityEntry, DayPlan, ScheduleEntry, Venue, VenueRole, VenueSuggestion};

/// Nearest candidates examined per day for a stay suggestion.
const STAY_SCAN: usize = 4;
/// Unique stays kept per day.
const STAY_KEEP: usize = 2;
/// Nearest candidates examined per day for a lunch suggestion.
const LUNCH_SCAN: usize = 3;
/// Unique lunch spots kept per day.
const LUNCH_KEEP: usize = 1;

/// Attach stay and lunch suggestions to each compiled day plan.
pub fn attach_suggestions(
    days: &mut [DayPlan],
    venues: &[Venue],
    lunch_window: (NaiveTime, NaiveTime),
) {
    let stays: Vec<&Venue> = venues
        .iter()
        .filter(|v| v.role == VenueRole::Stay && has_valid_coordinates(v))
        .collect();
    let lunches: Vec<&Venue> = venues
        .iter()
        .filter(|v| v.role == VenueRole::Lunch && has_valid_coordinates(v))
        .collect();

    let mut used_stays: HashSet<String> = HashSet::new();
    let mut used_lunches: HashSet<String> = HashSet::new();

    for day in days.iter_mut() {
        let activities: Vec<&ActivityEntry> = day
            .activities
            .iter()
            .filter_map(|entry| match entry {
                ScheduleEntry::Activity(activity) => Some(activity),
                ScheduleEntry::Travel(_) => None,
            })
            .collect();
        let Some(last) = activities.last() else {
            continue;
        };

        day.stay = pick_nearest(
            &stays,
            (last.latitude, last.longitude),
            STAY_SCAN,
            STAY_KEEP,
            &mut used_stays,
        );

        let lunch_anchor = activities
            .iter()
            .find(|a| slot_starts_within(&a.time_slot, lunch_window));
        if let Some(anchor) = lunch_anchor {
            day.lunch = pick_nearest(
                &lunches,
                (anchor.latitude, anchor.longitude),
                LUNCH_SCAN,
                LUNCH_KEEP,
                &mut used_lunches,
            );
        }
        debug!(day = day.day, stays = day.stay.len(), lunches = day.lunch.len(), "venues attached");
    }
}

fn has_valid_coordinates(venue: &Venue) -> bool {
    venue.latitude != 0.0 && venue.longitude != 0.0
}

/// Walk the `scan` nearest venues to `anchor` in distance order,
/// skipping names already used on earlier days, until `keep` are
/// collected.
fn pick_nearest(
    venues: &[&Venue],
    anchor: (f64, f64),
    scan: usize,
    keep: usize,
    used: &mut HashSet<String>,
) -> Vec<VenueSuggestion> {
    let mut ranked: Vec<&&Venue> = venues.iter().collect();
    ranked.sort_by(|a, b| {
        let da = haversine_km((a.latitude, a.longitude), anchor);
        let db = haversine_km((b.latitude, b.longitude), anchor);
        da.total_cmp(&db).then_with(|| a.name.cmp(&b.name))
    });

    let mut picked = Vec::new();
    for venue in ranked.into_iter().take(scan) {
        if used.contains(&venue.name) {
            continue;
        }
        used.insert(venue.name.clone());
        picked.push(VenueSuggestion::from(*venue));
        if picked.len() >= keep {
            break;
        }
    }
    picked
}

/// A slot qualifies for lunch only when its start time lies inside the
/// inclusive window; the end time is irrelevant.
fn slot_starts_within(time_slot: &str, (open, close): (NaiveTime, NaiveTime)) -> bool {
    let Some(start) = time_slot.split('-').next() else {
        return false;
    };
    match NaiveTime::parse_from_str(start.trim(), "%H:%M") {
        Ok(start) => start >= open && start <= close,
        Err(_) => false,
    }
}
