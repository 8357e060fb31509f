//! Google Routes `computeRouteMatrix` client.

use chrono::SecondsFormat;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::domain::LatLng;
use crate::http::{HttpSettings, send_with_retry};

use super::error::ProviderError;
use super::{MatrixElement, MatrixQuery, RouteMatrix};

/// Default base URL for the Routes distance-matrix API.
const DEFAULT_BASE_URL: &str = "https://routes.googleapis.com/distanceMatrix/v2";

const FIELD_MASK: &str = "originIndex,destinationIndex,duration,distanceMeters,status,condition";

/// Configuration for the Routes client.
#[derive(Debug, Clone)]
pub struct RoutesConfig {
    /// API key sent as `X-Goog-Api-Key`
    pub api_key: String,
    /// Base URL for the API
    pub base_url: String,
    /// Timeout and retry budget
    pub http: HttpSettings,
}

impl RoutesConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            http: HttpSettings::default(),
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the timeout and retry budget.
    pub fn with_http(mut self, http: HttpSettings) -> Self {
        self.http = http;
        self
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RouteMatrixRequest {
    origins: Vec<Waypoint>,
    destinations: Vec<Waypoint>,
    travel_mode: &'static str,
    arrival_time: String,
}

#[derive(Debug, Serialize)]
struct Waypoint {
    waypoint: WaypointLocation,
}

#[derive(Debug, Serialize)]
struct WaypointLocation {
    location: Location,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Location {
    lat_lng: ApiLatLng,
}

#[derive(Debug, Serialize)]
struct ApiLatLng {
    latitude: f64,
    longitude: f64,
}

impl From<&LatLng> for Waypoint {
    fn from(p: &LatLng) -> Self {
        Waypoint {
            waypoint: WaypointLocation {
                location: Location {
                    lat_lng: ApiLatLng {
                        latitude: p.lat,
                        longitude: p.lng,
                    },
                },
            },
        }
    }
}

/// One element of the matrix response.
///
/// Proto3 JSON omits zero values, so a missing index means 0.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RouteMatrixElementDto {
    #[serde(default)]
    origin_index: usize,
    #[serde(default)]
    destination_index: usize,
    duration: Option<String>,
    status: Option<RpcStatus>,
    condition: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RpcStatus {
    #[serde(default)]
    code: i32,
}

impl RouteMatrixElementDto {
    fn into_element(self) -> MatrixElement {
        let failed = self.status.as_ref().is_some_and(|s| s.code != 0)
            || self.condition.as_deref() == Some("ROUTE_NOT_FOUND");
        let duration_secs = if failed {
            None
        } else {
            self.duration.as_deref().and_then(parse_duration_secs)
        };
        MatrixElement {
            origin_index: self.origin_index,
            destination_index: self.destination_index,
            duration_secs,
        }
    }
}

/// Parse a protobuf JSON duration such as `"3600s"` or `"12.5s"` to whole seconds.
fn parse_duration_secs(s: &str) -> Option<u64> {
    let digits = s.strip_suffix('s')?;
    if let Ok(secs) = digits.parse::<u64>() {
        return Some(secs);
    }
    let secs = digits.parse::<f64>().ok()?;
    (secs.is_finite() && secs >= 0.0).then(|| secs.round() as u64)
}

/// Client for the Routes distance-matrix endpoint.
#[derive(Debug, Clone)]
pub struct GoogleRoutesClient {
    http: reqwest::Client,
    base_url: String,
    settings: HttpSettings,
}

impl GoogleRoutesClient {
    /// Create a new Routes client.
    pub fn new(config: RoutesConfig) -> Result<Self, ProviderError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&config.api_key).map_err(|_| ProviderError::InvalidKey)?;
        headers.insert(HeaderName::from_static("x-goog-api-key"), key);
        headers.insert(
            HeaderName::from_static("x-goog-fieldmask"),
            HeaderValue::from_static(FIELD_MASK),
        );

        let http = config.http.build_client(headers)?;

        Ok(Self {
            http,
            base_url: config.base_url,
            settings: config.http,
        })
    }
}

impl RouteMatrix for GoogleRoutesClient {
    async fn matrix(&self, query: &MatrixQuery<'_>) -> Result<Vec<MatrixElement>, ProviderError> {
        let url = format!("{}:computeRouteMatrix", self.base_url);
        let body = RouteMatrixRequest {
            origins: query.origins.iter().map(Waypoint::from).collect(),
            destinations: query.destinations.iter().map(Waypoint::from).collect(),
            travel_mode: query.mode.as_api_str(),
            arrival_time: query.arrival.to_rfc3339_opts(SecondsFormat::Secs, true),
        };

        let response =
            send_with_retry(&self.settings, "routes", || self.http.post(&url).json(&body)).await?;
        let body = ProviderError::check(response).await?.text().await?;
        let elements: Vec<RouteMatrixElementDto> = ProviderError::parse(&body)?;

        Ok(elements
            .into_iter()
            .map(RouteMatrixElementDto::into_element)
            .collect())
    }
}
