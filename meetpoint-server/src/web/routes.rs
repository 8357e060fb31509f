//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderName, Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::domain::InputError;
use crate::finalize::{FinalizeError, Readiness};

use super::dto::*;
use super::state::{AppState, EventFinalizer};

/// Create the application router.
pub fn create_router<F: EventFinalizer>(state: AppState<F>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/finalize", post(finalize::<F>))
        .route("/events/:event_id/readiness", get(readiness::<F>))
        .layer(cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Browser clients call from another origin with the Supabase client headers.
fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            header::CONTENT_TYPE,
        ])
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Finalize an event.
///
/// A body that is missing or not JSON is treated as a request with no
/// event id.
async fn finalize<F: EventFinalizer>(
    State(state): State<AppState<F>>,
    body: Option<Json<FinalizeRequest>>,
) -> Result<Json<FinalizeResponse>, AppError> {
    let event_id = body
        .and_then(|Json(req)| req.event_id)
        .ok_or(FinalizeError::Input(InputError::MissingEventId))?;

    let report = state.finalizer.finalize(&event_id).await?;
    Ok(Json(FinalizeResponse::from(&report)))
}

/// Response progress of an event.
async fn readiness<F: EventFinalizer>(
    State(state): State<AppState<F>>,
    Path(event_id): Path<String>,
) -> Result<Json<Readiness>, AppError> {
    Ok(Json(state.finalizer.readiness(&event_id).await?))
}

/// Application error type.
#[derive(Debug)]
pub struct AppError(FinalizeError);

impl From<FinalizeError> for AppError {
    fn from(e: FinalizeError) -> Self {
        AppError(e)
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            FinalizeError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            FinalizeError::Input(InputError::UnknownEvent(_)) => StatusCode::NOT_FOUND,
            FinalizeError::Input(_) => StatusCode::BAD_REQUEST,
            FinalizeError::Conflict(_) => StatusCode::CONFLICT,
            FinalizeError::RecordStore(_) => StatusCode::BAD_GATEWAY,
            FinalizeError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), kind = self.0.kind(), error = %self.0, "request failed");
        } else {
            warn!(status = status.as_u16(), kind = self.0.kind(), error = %self.0, "request rejected");
        }

        let body = Json(ErrorResponse::from(&self.0));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Credentials;
    use crate::domain::{CandidateStation, EventId, LatLng};
    use crate::finalize::{Finalizer, FinalizerConfig};
    use crate::providers::fake::{FakePlaces, FakeRoutes, FakeVenues, venue};
    use crate::store::{EventStatus, MemoryStore, ParticipantRecord, ScheduleRecord};
    use crate::store::StoreError;
    use serde_json::{Value, json};

    type TestFinalizer = Finalizer<MemoryStore, FakePlaces, FakeRoutes, FakeVenues>;

    async fn store() -> MemoryStore {
        let store = MemoryStore::new();
        let id = EventId::parse("ev-1").unwrap();
        store.insert_event(&id, Some(3)).await;
        store
            .add_participant(&id, ParticipantRecord::new("u1", Some(35.0), Some(139.0)))
            .await;
        store
            .add_participant(&id, ParticipantRecord::new("u2", Some(35.2), Some(139.2)))
            .await;
        store
            .add_schedule(ScheduleRecord::new("u1", "2024-01-10T19:00:00+09:00"))
            .await;
        store
    }

    fn finalizer(store: MemoryStore, credentials: Credentials) -> TestFinalizer {
        Finalizer::new(
            store,
            FakePlaces::returning(vec![
                CandidateStation::new("S1", LatLng::new(35.1, 139.1)),
                CandidateStation::new("S2", LatLng::new(35.12, 139.12)),
            ]),
            FakeRoutes::returning(&[(0, 0, 600), (1, 0, 200), (0, 1, 300), (1, 1, 250)]),
            FakeVenues::returning(vec![venue("Torikizoku")]),
            FinalizerConfig::new(credentials, chrono_tz::Asia::Tokyo),
        )
    }

    /// Serve the router on an ephemeral port and return its base URL.
    async fn serve(f: TestFinalizer) -> String {
        let app = create_router(AppState::new(f));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn post_finalize(base: &str, body: Value) -> (u16, Value) {
        let response = reqwest::Client::new()
            .post(format!("{base}/finalize"))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap())
    }

    fn creds() -> Credentials {
        Credentials::new("g-key", "hp-key")
    }

    #[tokio::test]
    async fn health_check() {
        let base = serve(finalizer(MemoryStore::new(), creds())).await;
        let body = reqwest::get(format!("{base}/health"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn finalize_success() {
        let base = serve(finalizer(store().await, creds())).await;

        let (status, body) = post_finalize(&base, json!({"event_id": "ev-1"})).await;

        assert_eq!(status, 200);
        assert_eq!(body["success"], true);
        assert_eq!(body["station"]["name"], "S2");
        assert_eq!(body["venues"][0]["name"], "Torikizoku");
        assert_eq!(body["confirmed_at"], "2024-01-10T10:00:00Z");
        assert_eq!(body["degraded"], json!([]));
    }

    #[tokio::test]
    async fn missing_event_id_is_bad_request() {
        let base = serve(finalizer(store().await, creds())).await;

        let (status, body) = post_finalize(&base, json!({})).await;

        assert_eq!(status, 400);
        assert_eq!(body, json!({"error": "Event ID is required", "kind": "input"}));
    }

    #[tokio::test]
    async fn non_json_body_is_bad_request() {
        let base = serve(finalizer(store().await, creds())).await;

        let response = reqwest::Client::new()
            .post(format!("{base}/finalize"))
            .body("event_id=ev-1")
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 400);
    }

    #[tokio::test]
    async fn unknown_event_is_not_found() {
        let base = serve(finalizer(store().await, creds())).await;

        let (status, body) = post_finalize(&base, json!({"event_id": "nope"})).await;

        assert_eq!(status, 404);
        assert_eq!(body["kind"], "input");
    }

    #[tokio::test]
    async fn empty_store_knows_no_events() {
        let base = serve(finalizer(MemoryStore::new(), creds())).await;

        let (status, body) = post_finalize(&base, json!({"event_id": "ev-1"})).await;

        assert_eq!(status, 404);
        assert_eq!(body["error"], "event ev-1 not found");
    }

    #[tokio::test]
    async fn missing_credentials_is_server_error() {
        let base = serve(finalizer(store().await, Credentials::default())).await;

        let (status, body) = post_finalize(&base, json!({"event_id": "ev-1"})).await;

        assert_eq!(status, 500);
        assert_eq!(body["kind"], "configuration");
        assert_eq!(
            body["error"],
            "Missing API Config: GOOGLE_MAPS_API_KEY, HOTPEPPER_KEY"
        );
    }

    #[tokio::test]
    async fn in_progress_is_conflict() {
        let store = store().await;
        store
            .set_status(&EventId::parse("ev-1").unwrap(), EventStatus::Finalizing)
            .await;
        let base = serve(finalizer(store, creds())).await;

        let (status, body) = post_finalize(&base, json!({"event_id": "ev-1"})).await;

        assert_eq!(status, 409);
        assert_eq!(body["kind"], "conflict");
    }

    #[tokio::test]
    async fn failed_commit_is_server_error() {
        let store = store().await;
        store.fail_commits(true);
        let base = serve(finalizer(store, creds())).await;

        let (status, body) = post_finalize(&base, json!({"event_id": "ev-1"})).await;

        assert_eq!(status, 500);
        assert_eq!(body["kind"], "persistence");
    }

    #[tokio::test]
    async fn readiness_endpoint() {
        let base = serve(finalizer(store().await, creds())).await;

        let body: Value = reqwest::get(format!("{base}/events/ev-1/readiness"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(
            body,
            json!({"responded": 2, "expected": 3, "finalized": false, "ready": false})
        );
    }

    #[tokio::test]
    async fn cors_preflight_allows_supabase_headers() {
        let base = serve(finalizer(MemoryStore::new(), creds())).await;

        let response = reqwest::Client::new()
            .request(reqwest::Method::OPTIONS, format!("{base}/finalize"))
            .header("Origin", "https://app.example.com")
            .header("Access-Control-Request-Method", "POST")
            .header("Access-Control-Request-Headers", "apikey,x-client-info")
            .send()
            .await
            .unwrap();

        assert!(response.status().is_success());
        let headers = response.headers();
        assert_eq!(headers["access-control-allow-origin"], "*");
        let allowed = headers["access-control-allow-headers"].to_str().unwrap();
        assert!(allowed.contains("x-client-info"));
        assert!(allowed.contains("apikey"));
    }

    #[test]
    fn status_mapping() {
        let status = |e: FinalizeError| AppError::from(e).status().as_u16();
        assert_eq!(status(FinalizeError::Input(InputError::NoValidLocations)), 400);
        assert_eq!(status(FinalizeError::Conflict("ev".into())), 409);
        assert_eq!(
            status(FinalizeError::RecordStore(StoreError::Unavailable("read"))),
            502
        );
        assert_eq!(
            status(FinalizeError::Persistence(StoreError::Unavailable("commit"))),
            500
        );
    }
}
