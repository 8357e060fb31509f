//! Dining venues near the chosen station.

use tracing::{debug, warn};

use crate::domain::{LatLng, Outcome, Venue};
use crate::providers::{ProviderError, VenueQuery, VenueSearch};

use super::config::SearchSettings;

/// Look up venues around `point`, in provider order.
///
/// Never yields an empty list: an empty result or a failed call produces a
/// single placeholder venue.
pub async fn find_venues<V: VenueSearch>(
    venues: &V,
    point: LatLng,
    settings: &SearchSettings,
) -> Outcome<Vec<Venue>, ProviderError> {
    let query = VenueQuery {
        point,
        range_tier: settings.venue_range_tier,
        max_results: settings.max_venues,
    };

    match venues.nearby(&query).await {
        Ok(mut found) if !found.is_empty() => {
            found.truncate(settings.max_venues as usize);
            debug!(count = found.len(), "venues found");
            Outcome::Found(found)
        }
        Ok(_) => {
            warn!(lat = point.lat, lng = point.lng, "no venues near station");
            Outcome::Fallback(vec![Venue::placeholder()])
        }
        Err(error) => {
            warn!(error = %error, "venue search failed, using placeholder");
            Outcome::Error {
                fallback: vec![Venue::placeholder()],
                error,
            }
        }
    }
}
