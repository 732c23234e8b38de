//! Test fixtures for itinerary-planner.
//!
//! Builders with sensible defaults plus deterministic stub providers,
//! so the whole pipeline can run without any network oracle.

use chrono::NaiveDate;

use itinerary_planner::traits::{ActivityProvider, VenueProvider};
use itinerary_planner::types::{CandidateActivity, TripParams, Venue, VenueRole};

/// Builder for candidate activities around Jaipur with sensible
/// defaults.
#[derive(Clone, Debug)]
pub struct TestActivity {
    activity: CandidateActivity,
}

impl TestActivity {
    pub fn new(name: &str) -> Self {
        Self {
            activity: CandidateActivity {
                name: name.to_string(),
                category: "Historical".to_string(),
                location: "Jaipur".to_string(),
                cost: 10.0,
                rating: 4.0,
                latitude: 26.9124,
                longitude: 75.7873,
                tags: Vec::new(),
                duration_hours: 2.0,
                similarity: 0.0,
            },
        }
    }

    pub fn at(mut self, latitude: f64, longitude: f64) -> Self {
        self.activity.latitude = latitude;
        self.activity.longitude = longitude;
        self
    }

    pub fn cost(mut self, cost: f64) -> Self {
        self.activity.cost = cost;
        self
    }

    pub fn rating(mut self, rating: f64) -> Self {
        self.activity.rating = rating;
        self
    }

    pub fn duration(mut self, hours: f64) -> Self {
        self.activity.duration_hours = hours;
        self
    }

    pub fn similarity(mut self, similarity: f64) -> Self {
        self.activity.similarity = similarity;
        self
    }

    pub fn category(mut self, category: &str) -> Self {
        self.activity.category = category.to_string();
        self
    }

    pub fn build(self) -> CandidateActivity {
        self.activity
    }
}

/// In-memory activity repository with fixed ranked and fallback pools.
#[derive(Clone, Debug, Default)]
pub struct StubActivities {
    pub ranked: Vec<CandidateActivity>,
    pub fallback: Vec<CandidateActivity>,
}

impl StubActivities {
    pub fn ranked(activities: Vec<CandidateActivity>) -> Self {
        Self {
            ranked: activities,
            fallback: Vec::new(),
        }
    }

    pub fn with_fallback(mut self, activities: Vec<CandidateActivity>) -> Self {
        self.fallback = activities;
        self
    }
}

impl ActivityProvider for StubActivities {
    fn ranked_candidates(
        &self,
        _destination: &str,
        _preferences: &[String],
        _budget: f64,
        _party_size: u32,
        _days: u32,
    ) -> Vec<CandidateActivity> {
        self.ranked.clone()
    }

    fn low_cost_candidates(
        &self,
        _destination: &str,
        _budget: f64,
        _party_size: u32,
        limit: usize,
    ) -> Vec<CandidateActivity> {
        self.fallback.iter().take(limit).cloned().collect()
    }
}

/// In-memory lodging repository.
#[derive(Clone, Debug, Default)]
pub struct StubVenues {
    pub venues: Vec<Venue>,
}

impl VenueProvider for StubVenues {
    fn venues(&self, _destination: &str) -> Vec<Venue> {
        self.venues.clone()
    }
}

pub fn venue(name: &str, role: VenueRole, latitude: f64, longitude: f64) -> Venue {
    Venue {
        name: name.to_string(),
        location: "Jaipur".to_string(),
        rating: 4.3,
        price: 75.0,
        latitude,
        longitude,
        role,
    }
}

pub fn trip(start: &str, end: &str, party_size: u32, budget: f64) -> TripParams {
    TripParams {
        start_date: date(start),
        end_date: date(end),
        party_size,
        budget,
        destination: "Jaipur".to_string(),
        preferences: Vec::new(),
    }
}

pub fn date(s: &str) -> NaiveDate {
    s.parse().expect("valid test date")
}
