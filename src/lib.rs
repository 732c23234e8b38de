//! itinerary-planner core
//!
//! Turns trip constraints into a concrete multi-day itinerary: scored
//! candidates grouped into spatial clusters, days packed greedily under
//! budget and time ceilings, timelines recomputed with travel legs, and
//! nearest stay/lunch venues attached per day.

pub mod allocator;
pub mod cluster;
pub mod error;
pub mod haversine;
pub mod matrix;
pub mod ors;
pub mod planner;
pub mod score;
pub mod timeline;
pub mod traits;
pub mod types;
pub mod venues;
