//! Supabase (PostgREST) event store.
//!
//! Tables: `events`, `users` (participants, scoped by `event_id`) and
//! `schedules` (scoped by `user_id`). Status transitions are conditional
//! `PATCH` requests filtered on the expected status with
//! `Prefer: return=representation`: an empty representation means another
//! writer moved the row first.

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::{EventId, FinalizationResult, ParticipantId, Venue, normalize_instant};
use crate::http::{HttpSettings, send_with_retry};

use super::error::StoreError;
use super::{Claim, EventRecord, EventStatus, EventStore, ParticipantRecord, ScheduleRecord};

/// Configuration for the PostgREST store.
#[derive(Debug, Clone)]
pub struct PostgrestConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`
    pub url: String,
    /// Service-role key, sent as `apikey` and bearer token
    pub service_key: String,
    /// Timeout and retry budget
    pub http: HttpSettings,
}

impl PostgrestConfig {
    pub fn new(url: impl Into<String>, service_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            service_key: service_key.into(),
            http: HttpSettings::default(),
        }
    }

    /// Set the timeout and retry budget.
    pub fn with_http(mut self, http: HttpSettings) -> Self {
        self.http = http;
        self
    }
}

#[derive(Debug, Deserialize)]
struct EventRow {
    amount: Option<u32>,
    status: Option<String>,
    confirmed_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserRow {
    id: Value,
    lat: Option<f64>,
    lng: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ScheduleRow {
    user_id: Value,
    date: Option<String>,
}

#[derive(Debug, Serialize)]
struct StatusPatch {
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct ResultPatch<'a> {
    confirmed_date: String,
    target_station: &'a str,
    target_lat: f64,
    target_lng: f64,
    restaurant_info: Vec<ShopRecord<'a>>,
    status: &'static str,
}

/// Venue in the HotPepper shop shape the result page renders.
#[derive(Debug, Serialize)]
struct ShopRecord<'a> {
    name: &'a str,
    address: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    genre: Option<NamedRecord<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    urls: Option<UrlsRecord<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    photo: Option<PhotoRecord<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    budget: Option<BudgetRecord<'a>>,
    #[serde(rename = "catch", skip_serializing_if = "Option::is_none")]
    catch_copy: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct NamedRecord<'a> {
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct UrlsRecord<'a> {
    pc: &'a str,
}

#[derive(Debug, Serialize)]
struct PhotoRecord<'a> {
    pc: PhotoSizesRecord<'a>,
}

#[derive(Debug, Serialize)]
struct PhotoSizesRecord<'a> {
    l: &'a str,
}

#[derive(Debug, Serialize)]
struct BudgetRecord<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    average: Option<&'a str>,
}

impl<'a> From<&'a Venue> for ShopRecord<'a> {
    fn from(v: &'a Venue) -> Self {
        ShopRecord {
            name: &v.name,
            address: &v.address,
            genre: v.genre.as_deref().map(|name| NamedRecord { name }),
            urls: v.link.as_deref().map(|pc| UrlsRecord { pc }),
            photo: v.photo.as_deref().map(|l| PhotoRecord {
                pc: PhotoSizesRecord { l },
            }),
            budget: v.budget.as_ref().map(|b| BudgetRecord {
                name: b.label.as_deref(),
                average: b.average.as_deref(),
            }),
            catch_copy: v.tagline.as_deref(),
        }
    }
}

/// Ids may be uuid strings or integers depending on the schema.
fn id_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// PostgREST `in` filter with quoted members.
fn in_filter(ids: &[ParticipantId]) -> String {
    let quoted: Vec<String> = ids
        .iter()
        .map(|id| format!("\"{}\"", id.as_str().replace('"', "\\\"")))
        .collect();
    format!("in.({})", quoted.join(","))
}

/// Query filter matching an event in `status`.
fn status_filter(status: EventStatus) -> (&'static str, String) {
    match status {
        // Rows written before the status column existed hold NULL
        EventStatus::Open => ("or", "(status.is.null,status.eq.open)".to_string()),
        other => ("status", format!("eq.{}", other.as_str())),
    }
}

/// Event store backed by a Supabase project's REST API.
#[derive(Debug, Clone)]
pub struct PostgrestStore {
    http: reqwest::Client,
    base_url: String,
    settings: HttpSettings,
}

impl PostgrestStore {
    pub fn new(config: PostgrestConfig) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&config.service_key).map_err(|_| StoreError::InvalidKey)?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.service_key))
            .map_err(|_| StoreError::InvalidKey)?;
        headers.insert(HeaderName::from_static("apikey"), key);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = config.http.build_client(headers)?;

        Ok(Self {
            http,
            base_url: format!("{}/rest/v1", config.url.trim_end_matches('/')),
            settings: config.http,
        })
    }

    async fn get_rows<T: serde::de::DeserializeOwned>(
        &self,
        table: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<T>, StoreError> {
        let url = format!("{}/{table}", self.base_url);
        let response =
            send_with_retry(&self.settings, "postgrest", || self.http.get(&url).query(params))
                .await?;
        let body = StoreError::check(response).await?.text().await?;
        StoreError::parse(&body)
    }

    /// Conditional update; returns how many rows matched.
    async fn patch_event<B: Serialize>(
        &self,
        id: &EventId,
        expected: EventStatus,
        body: &B,
    ) -> Result<usize, StoreError> {
        let url = format!("{}/events", self.base_url);
        let params = [("id", format!("eq.{id}")), status_filter(expected)];

        // Conditional writes are sent once, outside the retry helper.
        let response = self
            .http
            .patch(&url)
            .query(&params)
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;
        let text = StoreError::check(response).await?.text().await?;
        let rows: Vec<Value> = StoreError::parse(&text)?;
        Ok(rows.len())
    }
}

impl EventStore for PostgrestStore {
    async fn event(&self, id: &EventId) -> Result<EventRecord, StoreError> {
        let rows: Vec<EventRow> = self
            .get_rows(
                "events",
                &[
                    ("select", "id,amount,status,confirmed_date".to_string()),
                    ("id", format!("eq.{id}")),
                ],
            )
            .await?;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        Ok(EventRecord {
            id: id.clone(),
            expected: row.amount,
            status: EventStatus::from_column(row.status.as_deref()),
            confirmed_at: row
                .confirmed_date
                .and_then(|raw| normalize_instant(&raw, chrono_tz::Tz::UTC).ok()),
        })
    }

    async fn participants(&self, id: &EventId) -> Result<Vec<ParticipantRecord>, StoreError> {
        let rows: Vec<UserRow> = self
            .get_rows(
                "users",
                &[
                    ("select", "id,lat,lng".to_string()),
                    ("event_id", format!("eq.{id}")),
                ],
            )
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| ParticipantRecord {
                id: ParticipantId::new(id_text(row.id)),
                lat: row.lat,
                lng: row.lng,
            })
            .collect())
    }

    async fn schedules(
        &self,
        participants: &[ParticipantId],
    ) -> Result<Vec<ScheduleRecord>, StoreError> {
        if participants.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<ScheduleRow> = self
            .get_rows(
                "schedules",
                &[
                    ("select", "user_id,date".to_string()),
                    ("user_id", in_filter(participants)),
                ],
            )
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let date = row.date?;
                Some(ScheduleRecord {
                    participant: ParticipantId::new(id_text(row.user_id)),
                    date,
                })
            })
            .collect())
    }

    async fn claim(&self, id: &EventId) -> Result<Claim, StoreError> {
        let current = self.event(id).await?;
        if current.status == EventStatus::Finalizing {
            return Err(StoreError::Conflict(id.to_string()));
        }

        let matched = self
            .patch_event(id, current.status, &StatusPatch {
                status: EventStatus::Finalizing.as_str(),
            })
            .await?;
        if matched == 0 {
            warn!(event_id = %id, "lost claim race");
            return Err(StoreError::Conflict(id.to_string()));
        }

        debug!(event_id = %id, previous = current.status.as_str(), "event claimed");
        Ok(Claim {
            event: id.clone(),
            previous: current.status,
        })
    }

    async fn commit(&self, claim: &Claim, result: &FinalizationResult) -> Result<(), StoreError> {
        let patch = ResultPatch {
            confirmed_date: result
                .confirmed_at
                .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            target_station: &result.station.name,
            target_lat: result.station.location.lat,
            target_lng: result.station.location.lng,
            restaurant_info: result.venues.iter().map(ShopRecord::from).collect(),
            status: EventStatus::Finalized.as_str(),
        };

        let matched = self
            .patch_event(&claim.event, EventStatus::Finalizing, &patch)
            .await?;
        if matched == 0 {
            return Err(StoreError::Conflict(claim.event.to_string()));
        }
        Ok(())
    }

    async fn release(&self, claim: &Claim) -> Result<(), StoreError> {
        self.patch_event(&claim.event, EventStatus::Finalizing, &StatusPatch {
            status: claim.previous.as_str(),
        })
        .await?;
        Ok(())
    }
}
