//! Domain records shared across the planning pipeline.
//!
//! Result-shape types serialize to the wire format consumed by the
//! rendering layer; field casing follows that format exactly.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An activity candidate produced by the activity repository.
///
/// `cost` is per person in currency units. `similarity` is 0.0 when the
/// trip has no stated preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateActivity {
    pub name: String,
    pub category: String,
    pub location: String,
    #[serde(rename = "estimatedCost")]
    pub cost: f64,
    pub rating: f64,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Nominal duration in hours.
    pub duration_hours: f64,
    #[serde(default)]
    pub similarity: f64,
}

impl CandidateActivity {
    /// Coordinates rounded to 6 decimal digits, the dedup key used
    /// before matrix construction.
    pub fn coordinate_key(&self) -> (i64, i64) {
        (round6(self.latitude), round6(self.longitude))
    }

    pub fn has_valid_coordinates(&self) -> bool {
        self.latitude != 0.0
            && self.longitude != 0.0
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

fn round6(value: f64) -> i64 {
    (value * 1_000_000.0).round() as i64
}

/// Caller-supplied trip constraints.
#[derive(Debug, Clone)]
pub struct TripParams {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub party_size: u32,
    pub budget: f64,
    pub destination: String,
    pub preferences: Vec<String>,
}

impl TripParams {
    /// Inclusive day count; non-positive when the dates are reversed.
    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    pub fn daily_budget(&self) -> f64 {
        self.budget / self.days() as f64
    }

    pub fn per_person_daily_budget(&self) -> f64 {
        self.daily_budget() / self.party_size as f64
    }

    pub fn date_for_day(&self, day: u32) -> NaiveDate {
        self.start_date + chrono::Days::new(u64::from(day - 1))
    }
}

/// One rendered itinerary entry: an activity slot or a travel leg
/// between two activities.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ScheduleEntry {
    Activity(ActivityEntry),
    Travel(TravelEntry),
}

impl ScheduleEntry {
    pub fn is_travel(&self) -> bool {
        matches!(self, ScheduleEntry::Travel(_))
    }

    pub fn name(&self) -> &str {
        match self {
            ScheduleEntry::Activity(entry) => &entry.name,
            ScheduleEntry::Travel(entry) => &entry.name,
        }
    }

    pub fn time_slot(&self) -> &str {
        match self {
            ScheduleEntry::Activity(entry) => &entry.time_slot,
            ScheduleEntry::Travel(entry) => &entry.time_slot,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivityEntry {
    pub name: String,
    pub category: String,
    pub location: String,
    pub time_slot: String,
    /// Human-readable duration, e.g. "2 hr 30 min".
    pub duration: String,
    /// Whole-party cost (per-person cost times party size).
    #[serde(rename = "estimatedCost")]
    pub estimated_cost: f64,
    pub rating: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub day: u32,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
pub struct TravelEntry {
    pub name: String,
    pub category: String,
    pub location: String,
    pub time_slot: String,
    pub duration: String,
    #[serde(rename = "estimatedCost")]
    pub estimated_cost: f64,
    pub rating: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub day: u32,
    pub date: NaiveDate,
    pub distance: f64,
    #[serde(rename = "distanceUnit")]
    pub distance_unit: &'static str,
}

/// A candidate stay or lunch venue from the lodging repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Venue {
    pub name: String,
    pub location: String,
    pub rating: f64,
    pub price: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub role: VenueRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VenueRole {
    Stay,
    Lunch,
}

/// A venue attached to a day plan. Stays carry their price under
/// `pricePerNight` on the wire, lunches under `price`; exactly one of
/// the two fields is set, per the venue's role.
#[derive(Debug, Clone, Serialize)]
pub struct VenueSuggestion {
    pub name: String,
    pub location: String,
    pub rating: f64,
    #[serde(rename = "pricePerNight", skip_serializing_if = "Option::is_none")]
    pub price_per_night: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    pub longitude: f64,
    pub latitude: f64,
}

impl From<&Venue> for VenueSuggestion {
    fn from(venue: &Venue) -> Self {
        let (price_per_night, price) = match venue.role {
            VenueRole::Stay => (Some(venue.price), None),
            VenueRole::Lunch => (None, Some(venue.price)),
        };
        Self {
            name: venue.name.clone(),
            location: venue.location.clone(),
            rating: venue.rating,
            price_per_night,
            price,
            longitude: venue.longitude,
            latitude: venue.latitude,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DayPlan {
    pub day: u32,
    pub date: NaiveDate,
    pub activities: Vec<ScheduleEntry>,
    pub lunch: Vec<VenueSuggestion>,
    pub stay: Vec<VenueSuggestion>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Itinerary {
    pub itinerary: Vec<DayPlan>,
}
