//! Event record store.
//!
//! The store holds events, their participants and their submitted
//! schedules, and receives the finalization result. Writing the result is
//! guarded by an explicit status machine on the event:
//!
//! ```text
//! open ──claim──▶ finalizing ──commit──▶ finalized
//!                     │                      │
//!                  release                 claim (re-finalize)
//!                     ▼                      ▼
//!              previous status          finalizing
//! ```
//!
//! `claim` is a compare-and-swap: of two concurrent finalize calls for the
//! same event, exactly one gets the claim and the other sees `Conflict`.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{EventId, FinalizationResult, LatLng, ParticipantId};

mod error;
mod memory;
mod postgrest;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use postgrest::{PostgrestConfig, PostgrestStore};

/// Finalization status of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Open,
    Finalizing,
    Finalized,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Open => "open",
            EventStatus::Finalizing => "finalizing",
            EventStatus::Finalized => "finalized",
        }
    }

    /// Parse a stored status column; rows that predate the column read as open.
    pub fn from_column(value: Option<&str>) -> Self {
        match value {
            Some("finalizing") => EventStatus::Finalizing,
            Some("finalized") => EventStatus::Finalized,
            _ => EventStatus::Open,
        }
    }
}

/// An event row.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub id: EventId,
    /// Expected head count, organizer included
    pub expected: Option<u32>,
    pub status: EventStatus,
    pub confirmed_at: Option<DateTime<Utc>>,
}

impl EventRecord {
    pub fn new(id: EventId) -> Self {
        Self {
            id,
            expected: None,
            status: EventStatus::Open,
            confirmed_at: None,
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.status == EventStatus::Finalized || self.confirmed_at.is_some()
    }
}

/// A participant row as stored, coordinates unvalidated.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantRecord {
    pub id: ParticipantId,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl ParticipantRecord {
    pub fn new(id: impl Into<String>, lat: Option<f64>, lng: Option<f64>) -> Self {
        Self {
            id: ParticipantId::new(id),
            lat,
            lng,
        }
    }

    /// The usable location, if the stored coordinates are valid.
    pub fn location(&self) -> Option<LatLng> {
        LatLng::from_nullable(self.lat, self.lng)
    }
}

/// One submitted availability slot, timestamp as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleRecord {
    pub participant: ParticipantId,
    pub date: String,
}

impl ScheduleRecord {
    pub fn new(participant: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            participant: ParticipantId::new(participant),
            date: date.into(),
        }
    }
}

/// Proof of a successful claim, needed to commit or release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    pub event: EventId,
    /// Status to restore on release
    pub previous: EventStatus,
}

/// Storage for events, participants and schedules.
pub trait EventStore: Send + Sync {
    /// Fetch an event; `StoreError::NotFound` if there is none.
    fn event(
        &self,
        id: &EventId,
    ) -> impl Future<Output = Result<EventRecord, StoreError>> + Send;

    /// All participants of an event, organizer included.
    fn participants(
        &self,
        id: &EventId,
    ) -> impl Future<Output = Result<Vec<ParticipantRecord>, StoreError>> + Send;

    /// All schedule rows submitted by the given participants.
    fn schedules(
        &self,
        participants: &[ParticipantId],
    ) -> impl Future<Output = Result<Vec<ScheduleRecord>, StoreError>> + Send;

    /// Move the event to `finalizing`, failing with `Conflict` if it already is.
    fn claim(&self, id: &EventId) -> impl Future<Output = Result<Claim, StoreError>> + Send;

    /// Write the result and move the event to `finalized`, all in one update.
    fn commit(
        &self,
        claim: &Claim,
        result: &FinalizationResult,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Give up a claim, restoring the previous status.
    fn release(&self, claim: &Claim) -> impl Future<Output = Result<(), StoreError>> + Send;
}
