//! Data Transfer Objects for the HTTP API.

use serde::{Deserialize, Serialize};

use crate::domain::{CandidateStation, LatLng, Venue};
use crate::finalize::{FinalizeError, FinalizeReport, Stage};

/// Request body for `POST /finalize`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FinalizeRequest {
    #[serde(default)]
    pub event_id: Option<String>,
}

/// The chosen station.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationResult {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

impl From<&CandidateStation> for StationResult {
    fn from(station: &CandidateStation) -> Self {
        Self {
            name: station.name.clone(),
            lat: station.location.lat,
            lng: station.location.lng,
        }
    }
}

/// Response body for a successful finalization.
#[derive(Debug, Clone, Serialize)]
pub struct FinalizeResponse {
    pub success: bool,
    pub station: StationResult,
    pub venues: Vec<Venue>,
    pub center: LatLng,
    /// RFC 3339, UTC
    pub confirmed_at: String,
    /// Stages that used a fallback
    pub degraded: Vec<Stage>,
}

impl From<&FinalizeReport> for FinalizeResponse {
    fn from(report: &FinalizeReport) -> Self {
        Self {
            success: true,
            station: StationResult::from(&report.result.station),
            venues: report.result.venues.clone(),
            center: report.center,
            confirmed_at: report
                .result
                .confirmed_at
                .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            degraded: report.degraded.clone(),
        }
    }
}

/// Error response body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error category, see [`FinalizeError::kind`]
    pub kind: &'static str,
}

impl From<&FinalizeError> for ErrorResponse {
    fn from(err: &FinalizeError) -> Self {
        Self {
            error: err.to_string(),
            kind: err.kind(),
        }
    }
}
