//! HotPepper Gourmet search client.
//!
//! HotPepper reports most failures in-band: the HTTP status is 200 and the
//! body carries `results.error`. Those are mapped to `ProviderError::Api`.

use serde::Deserialize;

use crate::domain::{Budget, Venue};
use crate::http::{HttpSettings, send_with_retry};

use super::error::ProviderError;
use super::{VenueQuery, VenueSearch};

/// Default base URL for the Recruit web service.
const DEFAULT_BASE_URL: &str = "https://webservice.recruit.co.jp";

/// Configuration for the HotPepper client.
#[derive(Debug, Clone)]
pub struct HotPepperConfig {
    /// API key sent as the `key` query parameter
    pub api_key: String,
    /// Base URL for the API
    pub base_url: String,
    /// Timeout and retry budget
    pub http: HttpSettings,
}

impl HotPepperConfig {
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

#[derive(Debug, Deserialize)]
struct GourmetResponse {
    results: GourmetResults,
}

#[derive(Debug, Deserialize)]
struct GourmetResults {
    #[serde(default)]
    shop: Vec<ShopDto>,
    #[serde(default)]
    error: Vec<ApiErrorDto>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDto {
    #[serde(default)]
    code: u16,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ShopDto {
    name: String,
    #[serde(default)]
    address: String,
    genre: Option<NamedDto>,
    urls: Option<UrlsDto>,
    photo: Option<PhotoDto>,
    budget: Option<BudgetDto>,
    #[serde(rename = "catch")]
    catch_copy: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NamedDto {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UrlsDto {
    pc: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PhotoDto {
    pc: Option<PhotoSizesDto>,
}

#[derive(Debug, Deserialize)]
struct PhotoSizesDto {
    l: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BudgetDto {
    name: Option<String>,
    average: Option<String>,
}

/// Empty strings in the feed mean "not provided".
fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|v| !v.trim().is_empty())
}

impl From<ShopDto> for Venue {
    fn from(shop: ShopDto) -> Self {
        let budget = shop.budget.and_then(|b| {
            let label = non_empty(b.name);
            let average = non_empty(b.average);
            (label.is_some() || average.is_some()).then_some(Budget { label, average })
        });

        Venue {
            name: shop.name,
            address: shop.address,
            genre: non_empty(shop.genre.and_then(|g| g.name)),
            link: non_empty(shop.urls.and_then(|u| u.pc)),
            photo: non_empty(shop.photo.and_then(|p| p.pc).and_then(|pc| pc.l)),
            budget,
            tagline: non_empty(shop.catch_copy),
        }
    }
}

/// Client for the HotPepper gourmet search.
#[derive(Debug, Clone)]
pub struct HotPepperClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    settings: HttpSettings,
}

impl HotPepperClient {
    /// Create a new HotPepper client.
    pub fn new(config: HotPepperConfig) -> Result<Self, ProviderError> {
        let http = config.http.build_client(Default::default())?;

        Ok(Self {
            http,
            base_url: config.base_url,
            api_key: config.api_key,
            settings: config.http,
        })
    }
}

impl VenueSearch for HotPepperClient {
    async fn nearby(&self, query: &VenueQuery) -> Result<Vec<Venue>, ProviderError> {
        let url = format!("{}/hotpepper/gourmet/v1/", self.base_url);
        let params = [
            ("key", self.api_key.clone()),
            ("lat", query.point.lat.to_string()),
            ("lng", query.point.lng.to_string()),
            ("range", query.range_tier.to_string()),
            ("count", query.max_results.to_string()),
            ("format", "json".to_string()),
        ];

        let response = send_with_retry(&self.settings, "hotpepper", || {
            self.http.get(&url).query(&params)
        })
        .await?;
        let body = ProviderError::check(response).await?.text().await?;
        let parsed: GourmetResponse = ProviderError::parse(&body)?;

        if let Some(err) = parsed.results.error.into_iter().next() {
            return Err(ProviderError::Api {
                status: err.code,
                message: err.message,
            });
        }

        Ok(parsed
            .results
            .shop
            .into_iter()
            .take(query.max_results as usize)
            .map(Venue::from)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LatLng;
    use httpmock::prelude::*;

    fn client(server: &MockServer) -> HotPepperClient {
        let config = HotPepperConfig::new("hp-key")
            .with_base_url(server.base_url())
            .with_http(HttpSettings {
                timeout_secs: 5,
                retries: 0,
                retry_delay_ms: 1,
            });
        HotPepperClient::new(config).unwrap()
    }

    fn query() -> VenueQuery {
        VenueQuery {
            point: LatLng::new(35.6, 139.7),
            range_tier: 3,
            max_results: 5,
        }
    }

    #[tokio::test]
    async fn maps_shops_to_venues() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/hotpepper/gourmet/v1/")
                .query_param("key", "hp-key")
                .query_param("range", "3")
                .query_param("count", "5")
                .query_param("format", "json");
            then.status(200).json_body(serde_json::json!({
                "results": {
                    "shop": [{
                        "name": "Delicious BBQ",
                        "address": "Tokyo",
                        "genre": {"name": "焼肉"},
                        "urls": {"pc": "https://www.hotpepper.jp/strJ000000001/"},
                        "photo": {"pc": {"l": "http://img.com/l.jpg"}},
                        "budget": {"name": "3000 yen", "average": "3500"},
                        "catch": "Best Meat!"
                    }, {
                        "name": "Bare Shop",
                        "address": "Shinagawa",
                        "budget": {"name": "", "average": ""},
                        "catch": ""
                    }]
                }
            }));
        });

        let venues = client(&server).nearby(&query()).await.unwrap();
        mock.assert();

        assert_eq!(venues.len(), 2);
        let v = &venues[0];
        assert_eq!(v.name, "Delicious BBQ");
        assert_eq!(v.address, "Tokyo");
        assert_eq!(v.genre.as_deref(), Some("焼肉"));
        assert_eq!(v.photo.as_deref(), Some("http://img.com/l.jpg"));
        assert_eq!(
            v.budget,
            Some(Budget {
                label: Some("3000 yen".into()),
                average: Some("3500".into())
            })
        );
        assert_eq!(v.tagline.as_deref(), Some("Best Meat!"));

        let bare = &venues[1];
        assert_eq!(bare.budget, None);
        assert_eq!(bare.tagline, None);
        assert_eq!(bare.link, None);
    }

    #[tokio::test]
    async fn in_band_error_is_api_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/hotpepper/gourmet/v1/");
            then.status(200).json_body(serde_json::json!({
                "results": {"error": [{"code": 2000, "message": "invalid key"}]}
            }));
        });

        let err = client(&server).nearby(&query()).await.unwrap_err();
        match err {
            ProviderError::Api { status, message } => {
                assert_eq!(status, 2000);
                assert_eq!(message, "invalid key");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn no_shops_is_empty() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/hotpepper/gourmet/v1/");
            then.status(200)
                .json_body(serde_json::json!({"results": {"results_available": 0}}));
        });

        let venues = client(&server).nearby(&query()).await.unwrap();
        assert!(venues.is_empty());
    }
}
