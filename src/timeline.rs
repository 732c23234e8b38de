//! Timeline compilation: wall-clock slots for a day's picks, with
//! travel legs interleaved between consecutive activities.
//!
//! Durations stay numeric through the pipeline; the human-readable
//! "H hr M min" strings are produced here, render-only.

use chrono::{Duration, NaiveDate, NaiveTime};

use crate::allocator::DayPick;
use crate::matrix::TravelMatrices;
use crate::types::{ActivityEntry, ScheduleEntry, TravelEntry};

/// Lay out one day's admitted activities from `day_start`, inserting a
/// travel leg between consecutive activities whenever both carry a
/// matrix handle. Picks without a handle (or sharing a coordinate) get
/// no leg, which is an accepted degradation rather than a failure.
pub fn compile_day(
    picks: &[DayPick],
    matrices: &TravelMatrices,
    day: u32,
    date: NaiveDate,
    party_size: u32,
    taxi_rate_per_km: f64,
    day_start: NaiveTime,
) -> Vec<ScheduleEntry> {
    let mut entries = Vec::with_capacity(picks.len() * 2);
    let mut clock = day_start;

    for (i, pick) in picks.iter().enumerate() {
        let (slot, end) = time_slot(clock, pick.activity.duration_hours);
        entries.push(ScheduleEntry::Activity(ActivityEntry {
            name: pick.activity.name.clone(),
            category: pick.activity.category.clone(),
            location: pick.activity.location.clone(),
            time_slot: slot,
            duration: format_duration(pick.activity.duration_hours),
            estimated_cost: pick.total_cost,
            rating: pick.activity.rating,
            latitude: pick.activity.latitude,
            longitude: pick.activity.longitude,
            day,
            date,
        }));
        clock = end;

        let Some(next) = picks.get(i + 1) else {
            continue;
        };
        let (Some(from), Some(to)) = (pick.matrix_index, next.matrix_index) else {
            continue;
        };
        if from == to {
            continue;
        }

        let distance_km = matrices.distance_km[from][to];
        let travel_hours = matrices.time_hours[from][to];
        let travel_cost = distance_km * f64::from(party_size) * taxi_rate_per_km;
        let (slot, end) = time_slot(clock, travel_hours);
        entries.push(ScheduleEntry::Travel(TravelEntry {
            name: format!("Travel to {}", next.activity.name),
            category: "Travel".to_string(),
            location: format!(
                "Travel from {} to {}",
                pick.activity.name, next.activity.name
            ),
            time_slot: slot,
            duration: format_duration(travel_hours),
            estimated_cost: round2(travel_cost),
            rating: 0.0,
            latitude: next.activity.latitude,
            longitude: next.activity.longitude,
            day,
            date,
            distance: round2(distance_km),
            distance_unit: "km",
        }));
        clock = end;
    }

    entries
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn time_slot(start: NaiveTime, hours: f64) -> (String, NaiveTime) {
    let seconds = (hours * 3600.0).round() as i64;
    let end = start.overflowing_add_signed(Duration::seconds(seconds)).0;
    (
        format!("{}-{}", start.format("%H:%M"), end.format("%H:%M")),
        end,
    )
}

/// Render fractional hours as "H hr M min", dropping the zero part.
pub fn format_duration(hours: f64) -> String {
    let total_minutes = (hours * 60.0).round() as i64;
    let h = total_minutes / 60;
    let m = total_minutes % 60;
    if h > 0 && m > 0 {
        format!("{h} hr {m} min")
    } else if h > 0 {
        format!("{h} hr")
    } else {
        format!("{m} min")
    }
}
