//! Travel-time matrix from participants to candidate stations.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::domain::{Candidates, LatLng, Outcome, TravelTimeMatrix};
use crate::providers::{MatrixQuery, ProviderError, RouteMatrix, TravelMode};

/// Ask the route provider for every origin/station pair, arriving by `arrival`.
///
/// One provider call per invocation. Unroutable pairs are left out of the
/// matrix. Entries with indices outside the request are discarded. A failed
/// call yields an empty matrix rather than an error.
pub async fn travel_times<R: RouteMatrix>(
    routes: &R,
    origins: &[LatLng],
    stations: &Candidates,
    arrival: DateTime<Utc>,
) -> Outcome<TravelTimeMatrix, ProviderError> {
    let destinations = stations.locations();
    let query = MatrixQuery {
        origins,
        destinations: &destinations,
        arrival,
        mode: TravelMode::Transit,
    };

    match routes.matrix(&query).await {
        Ok(elements) => {
            let matrix: TravelTimeMatrix = elements
                .into_iter()
                .filter(|e| e.origin_index < origins.len() && e.destination_index < destinations.len())
                .filter_map(|e| {
                    e.duration_secs
                        .map(|secs| (e.origin_index, e.destination_index, secs))
                })
                .collect();

            if matrix.is_empty() {
                warn!(
                    origins = origins.len(),
                    destinations = destinations.len(),
                    "route matrix has no routable pairs"
                );
                Outcome::Fallback(matrix)
            } else {
                debug!(entries = matrix.len(), "route matrix computed");
                Outcome::Found(matrix)
            }
        }
        Err(error) => {
            warn!(error = %error, "route matrix request failed, continuing without durations");
            Outcome::Error {
                fallback: TravelTimeMatrix::new(),
                error,
            }
        }
    }
}
