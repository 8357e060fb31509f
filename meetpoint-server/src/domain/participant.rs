//! Participants and their contributions to an event.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::geo::LatLng;

/// Opaque identifier of a participant record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque identifier of an event record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Parse an event identifier, rejecting blank input.
    pub fn parse(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A participant as seen by the finalization pipeline.
///
/// A participant without a usable location is excluded from the geographic
/// stages but still contributes availability.
#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    pub id: ParticipantId,
    pub location: Option<LatLng>,
    pub availability: Vec<DateTime<Utc>>,
}

impl Participant {
    pub fn new(id: ParticipantId, location: Option<LatLng>) -> Self {
        Self {
            id,
            location,
            availability: Vec::new(),
        }
    }
}

/// Locations of the participants that have one, in input order.
pub fn valid_locations(participants: &[Participant]) -> Vec<LatLng> {
    participants.iter().filter_map(|p| p.location).collect()
}
