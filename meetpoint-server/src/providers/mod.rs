//! External data providers.
//!
//! Three upstream services feed the pipeline:
//! - place search, for transit hubs near the centroid
//! - route matrix, for transit durations from participants to hubs
//! - venue search, for places to eat near the chosen hub
//!
//! Each is a trait so the pipeline can run against in-process fakes. The
//! live implementations talk to Google Places, Google Routes and HotPepper.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::domain::{CandidateStation, LatLng, Venue};

mod error;
#[cfg(test)]
pub(crate) mod fake;
mod hotpepper;
mod places;
mod routes;

pub use error::ProviderError;
pub use hotpepper::{HotPepperClient, HotPepperConfig};
pub use places::{GooglePlacesClient, PlacesConfig};
pub use routes::{GoogleRoutesClient, RoutesConfig};

/// Parameters for a nearby place search.
#[derive(Debug, Clone)]
pub struct NearbyQuery<'a> {
    pub center: LatLng,
    pub radius_m: f64,
    /// Place types to include, e.g. `train_station`
    pub types: &'a [String],
    pub max_results: u32,
    /// BCP-47 language for display names
    pub language: &'a str,
}

/// Searches for named points of interest around a point.
pub trait PlaceSearch: Send + Sync {
    /// Results in provider rank order, at most `max_results` long.
    fn nearby(
        &self,
        query: &NearbyQuery<'_>,
    ) -> impl Future<Output = Result<Vec<CandidateStation>, ProviderError>> + Send;
}

/// How participants travel to the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelMode {
    Transit,
}

impl TravelMode {
    pub fn as_api_str(&self) -> &'static str {
        match self {
            TravelMode::Transit => "TRANSIT",
        }
    }
}

/// Parameters for a route-matrix request.
#[derive(Debug, Clone)]
pub struct MatrixQuery<'a> {
    pub origins: &'a [LatLng],
    pub destinations: &'a [LatLng],
    /// Everyone should arrive by this instant
    pub arrival: DateTime<Utc>,
    pub mode: TravelMode,
}

/// One origin/destination pair of a route matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixElement {
    pub origin_index: usize,
    pub destination_index: usize,
    /// `None` when the provider found no route
    pub duration_secs: Option<u64>,
}

/// Computes travel durations for every origin/destination pair in one call.
pub trait RouteMatrix: Send + Sync {
    fn matrix(
        &self,
        query: &MatrixQuery<'_>,
    ) -> impl Future<Output = Result<Vec<MatrixElement>, ProviderError>> + Send;
}

/// Parameters for a venue search.
#[derive(Debug, Clone)]
pub struct VenueQuery {
    pub point: LatLng,
    /// Provider-defined radius tier (HotPepper: 1 = 300 m … 5 = 3000 m)
    pub range_tier: u8,
    pub max_results: u32,
}

/// Searches for dining venues around a point.
pub trait VenueSearch: Send + Sync {
    /// Results in the provider's relevance order.
    fn nearby(
        &self,
        query: &VenueQuery,
    ) -> impl Future<Output = Result<Vec<Venue>, ProviderError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transit_api_name() {
        assert_eq!(TravelMode::Transit.as_api_str(), "TRANSIT");
    }
}
