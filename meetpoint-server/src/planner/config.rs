//! Search parameters for the planning stages.

use chrono::Weekday;

/// Tunable parameters for station, venue and fallback-time search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSettings {
    /// Radius around the centroid to search for stations (meters).
    pub station_radius_m: f64,

    /// Maximum number of candidate stations to consider.
    pub max_stations: u32,

    /// Place types that count as a transit hub.
    pub station_types: Vec<String>,

    /// Language for station display names.
    pub place_language: String,

    /// Venue provider radius tier around the chosen station.
    pub venue_range_tier: u8,

    /// Maximum number of venues to return.
    pub max_venues: u32,

    /// Weekday of the fallback meeting time when nobody submitted availability.
    pub fallback_weekday: Weekday,

    /// Local hour of the fallback meeting time.
    pub fallback_hour: u32,
}

impl SearchSettings {
    /// Create settings with the given limits and the default place types.
    pub fn new(
        station_radius_m: f64,
        max_stations: u32,
        venue_range_tier: u8,
        max_venues: u32,
    ) -> Self {
        Self {
            station_radius_m,
            max_stations,
            venue_range_tier,
            max_venues,
            ..Self::default()
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            station_radius_m: 2000.0,
            max_stations: 5,
            station_types: vec![
                "train_station".to_string(),
                "subway_station".to_string(),
                "light_rail_station".to_string(),
            ],
            place_language: "ja".to_string(),
            venue_range_tier: 3, // 1000 m
            max_venues: 5,
            fallback_weekday: Weekday::Fri,
            fallback_hour: 19,
        }
    }
}
