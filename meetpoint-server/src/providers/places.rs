//! Google Places (New) nearby-search client.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::domain::{CandidateStation, LatLng};
use crate::http::{HttpSettings, send_with_retry};

use super::error::ProviderError;
use super::{NearbyQuery, PlaceSearch};

/// Default base URL for the Places API.
const DEFAULT_BASE_URL: &str = "https://places.googleapis.com/v1";

/// Only the fields we read; Places bills by field mask.
const FIELD_MASK: &str = "places.displayName,places.location";

/// Configuration for the Places client.
#[derive(Debug, Clone)]
pub struct PlacesConfig {
    /// API key sent as `X-Goog-Api-Key`
    pub api_key: String,
    /// Base URL for the API
    pub base_url: String,
    /// Timeout and retry budget
    pub http: HttpSettings,
}

impl PlacesConfig {
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
struct SearchNearbyRequest<'a> {
    included_types: &'a [String],
    max_result_count: u32,
    rank_preference: &'static str,
    language_code: &'a str,
    location_restriction: LocationRestriction,
}

#[derive(Debug, Serialize)]
struct LocationRestriction {
    circle: Circle,
}

#[derive(Debug, Serialize)]
struct Circle {
    center: ApiLatLng,
    radius: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct ApiLatLng {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct SearchNearbyResponse {
    #[serde(default)]
    places: Vec<PlaceDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaceDto {
    display_name: Option<LocalizedText>,
    location: Option<ApiLatLng>,
}

#[derive(Debug, Deserialize)]
struct LocalizedText {
    text: String,
}

impl PlaceDto {
    fn into_candidate(self) -> Option<CandidateStation> {
        let name = self.display_name?.text;
        let loc = self.location?;
        Some(CandidateStation::new(
            name,
            LatLng::new(loc.latitude, loc.longitude),
        ))
    }
}

/// Client for the Places `searchNearby` endpoint.
#[derive(Debug, Clone)]
pub struct GooglePlacesClient {
    http: reqwest::Client,
    base_url: String,
    settings: HttpSettings,
}

impl GooglePlacesClient {
    /// Create a new Places client.
    pub fn new(config: PlacesConfig) -> Result<Self, ProviderError> {
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

impl PlaceSearch for GooglePlacesClient {
    async fn nearby(&self, query: &NearbyQuery<'_>) -> Result<Vec<CandidateStation>, ProviderError> {
        let url = format!("{}/places:searchNearby", self.base_url);
        let body = SearchNearbyRequest {
            included_types: query.types,
            max_result_count: query.max_results,
            rank_preference: "POPULARITY",
            language_code: query.language,
            location_restriction: LocationRestriction {
                circle: Circle {
                    center: ApiLatLng {
                        latitude: query.center.lat,
                        longitude: query.center.lng,
                    },
                    radius: query.radius_m,
                },
            },
        };

        let response =
            send_with_retry(&self.settings, "places", || self.http.post(&url).json(&body)).await?;
        let body = ProviderError::check(response).await?.text().await?;
        let parsed: SearchNearbyResponse = ProviderError::parse(&body)?;

        Ok(parsed
            .places
            .into_iter()
            .filter_map(PlaceDto::into_candidate)
            .take(query.max_results as usize)
            .collect())
    }
}
