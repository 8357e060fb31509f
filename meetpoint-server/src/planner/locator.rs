//! Candidate station lookup around the centroid.

use tracing::{debug, warn};

use crate::domain::{Candidates, LatLng, Outcome};
use crate::providers::{NearbyQuery, PlaceSearch, ProviderError};

use super::config::SearchSettings;

/// Find transit hubs near `centroid`.
///
/// Never yields an empty list: when the provider has nothing, or fails,
/// the single synthetic "Middle Point" candidate at the centroid stands in.
pub async fn locate_stations<P: PlaceSearch>(
    places: &P,
    centroid: LatLng,
    settings: &SearchSettings,
) -> Outcome<Candidates, ProviderError> {
    let query = NearbyQuery {
        center: centroid,
        radius_m: settings.station_radius_m,
        types: &settings.station_types,
        max_results: settings.max_stations,
        language: &settings.place_language,
    };

    match places.nearby(&query).await {
        Ok(stations) => match Candidates::new(stations) {
            Some(found) => {
                debug!(count = found.len(), "station candidates found");
                Outcome::Found(found)
            }
            None => {
                warn!(
                    lat = centroid.lat,
                    lng = centroid.lng,
                    "no stations near centroid, using middle point"
                );
                Outcome::Fallback(Candidates::fallback(centroid))
            }
        },
        Err(error) => {
            warn!(error = %error, "place search failed, using middle point");
            Outcome::Error {
                fallback: Candidates::fallback(centroid),
                error,
            }
        }
    }
}
