//! The durable product of a finalization run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::station::CandidateStation;
use super::venue::Venue;

/// Confirmed meeting plan for an event.
///
/// Persisted as a unit: the confirmed instant, the station name, the
/// station coordinates and the venue list are always written together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalizationResult {
    pub confirmed_at: DateTime<Utc>,
    pub station: CandidateStation,
    /// Never empty; holds the placeholder when no venue was found
    pub venues: Vec<Venue>,
}
