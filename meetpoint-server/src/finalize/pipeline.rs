//! The finalization pipeline.
//!
//! `FetchParticipants → ValidateLocations → ComputeCentroid → Claim →
//! (LocateStations ∥ FetchSchedules) → ConsensusTime → TravelMatrix →
//! SelectStation → FindVenues → Commit`
//!
//! Everything before the claim is read-only, so input errors leave the
//! event untouched. Everything between the claim and the commit degrades
//! instead of failing. A failed commit releases the claim, and so does
//! dropping the finalize future before it commits.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::{AppConfig, Credentials};
use crate::domain::{
    EventId, FinalizationResult, InputError, LatLng, Participant, ParticipantId, centroid,
    normalize_instant, valid_locations,
};
use crate::planner::{
    ConsensusTime, SearchSettings, Selection, find_venues, locate_stations, resolve_time,
    select_station, travel_times,
};
use crate::providers::{PlaceSearch, RouteMatrix, VenueSearch};
use crate::store::{EventRecord, EventStore, ScheduleRecord, StoreError};

use super::error::FinalizeError;
use super::guard::ClaimGuard;
use super::readiness::Readiness;

/// A stage that fell back instead of using provider data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    PlaceSearch,
    Schedules,
    MeetingTime,
    RouteMatrix,
    VenueSearch,
}

/// Outcome of a successful finalization.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalizeReport {
    pub event_id: EventId,
    /// What was persisted
    pub result: FinalizationResult,
    pub center: LatLng,
    pub meeting: ConsensusTime,
    pub selection: Selection,
    /// Stages that used a fallback, in pipeline order
    pub degraded: Vec<Stage>,
}

/// Settings the pipeline needs beyond its collaborators.
#[derive(Debug, Clone)]
pub struct FinalizerConfig {
    pub credentials: Credentials,
    pub timezone: Tz,
    pub search: SearchSettings,
}

impl FinalizerConfig {
    pub fn new(credentials: Credentials, timezone: Tz) -> Self {
        Self {
            credentials,
            timezone,
            search: SearchSettings::default(),
        }
    }
}

impl From<&AppConfig> for FinalizerConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            credentials: config.credentials.clone(),
            timezone: config.timezone,
            search: config.search.clone(),
        }
    }
}

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Runs finalization against a record store and three providers.
pub struct Finalizer<S, P, R, V> {
    store: Arc<S>,
    places: P,
    routes: R,
    venues: V,
    config: FinalizerConfig,
    clock: Clock,
}

impl<S, P, R, V> Finalizer<S, P, R, V>
where
    S: EventStore + 'static,
    P: PlaceSearch,
    R: RouteMatrix,
    V: VenueSearch,
{
    pub fn new(store: S, places: P, routes: R, venues: V, config: FinalizerConfig) -> Self {
        Self {
            store: Arc::new(store),
            places,
            routes,
            venues,
            config,
            clock: Arc::new(Utc::now),
        }
    }

    /// Replace the wall clock used for the fallback meeting time.
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        let clock: Clock = Arc::new(clock);
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn places(&self) -> &P {
        &self.places
    }

    pub fn routes(&self) -> &R {
        &self.routes
    }

    pub fn venues(&self) -> &V {
        &self.venues
    }

    /// Finalize an event: choose time, station and venues, then persist them.
    pub async fn finalize(&self, event_id: &str) -> Result<FinalizeReport, FinalizeError> {
        if let Err(e) = self.config.credentials.require() {
            error!(error = %e, "finalization refused");
            return Err(e.into());
        }

        let event_id = EventId::parse(event_id).ok_or(InputError::MissingEventId)?;
        self.load_event(&event_id).await?;

        let records = self
            .store
            .participants(&event_id)
            .await
            .map_err(FinalizeError::RecordStore)?;
        if records.is_empty() {
            return Err(InputError::NoParticipants.into());
        }

        let mut participants: Vec<Participant> = records
            .iter()
            .map(|r| Participant::new(r.id.clone(), r.location()))
            .collect();
        let origins = valid_locations(&participants);
        let center = centroid(&origins)?;
        debug!(
            event_id = %event_id,
            participants = participants.len(),
            located = origins.len(),
            lat = center.lat,
            lng = center.lng,
            "centroid computed"
        );

        let claim = self
            .store
            .claim(&event_id)
            .await
            .map_err(FinalizeError::from_write)?;
        let claim = ClaimGuard::new(Arc::clone(&self.store), claim);

        let mut degraded = Vec::new();
        let search = &self.config.search;

        let ids: Vec<ParticipantId> = participants.iter().map(|p| p.id.clone()).collect();
        let (stations, schedules) = tokio::join!(
            locate_stations(&self.places, center, search),
            self.store.schedules(&ids),
        );
        if stations.is_degraded() {
            degraded.push(Stage::PlaceSearch);
        }
        let schedules = match schedules {
            Ok(rows) => rows,
            Err(e) => {
                warn!(event_id = %event_id, error = %e, "schedule read failed, treating as none");
                degraded.push(Stage::Schedules);
                Vec::new()
            }
        };
        attach_availability(&mut participants, schedules, self.config.timezone);

        let instants: Vec<DateTime<Utc>> = participants
            .iter()
            .flat_map(|p| p.availability.iter().copied())
            .collect();
        let meeting = resolve_time(&instants, (self.clock)(), self.config.timezone, search);
        if meeting.is_fallback() {
            degraded.push(Stage::MeetingTime);
        }

        let matrix = travel_times(&self.routes, &origins, stations.value(), meeting.instant()).await;
        if matrix.is_degraded() {
            degraded.push(Stage::RouteMatrix);
        }

        let selection = select_station(stations.value(), matrix.value());

        let venues = find_venues(&self.venues, selection.station.location, search).await;
        if venues.is_degraded() {
            degraded.push(Stage::VenueSearch);
        }

        let result = FinalizationResult {
            confirmed_at: meeting.instant(),
            station: selection.station.clone(),
            venues: venues.into_value(),
        };

        if let Err(e) = self.store.commit(claim.claim(), &result).await {
            error!(event_id = %event_id, error = %e, "failed to persist result");
            claim.release().await;
            return Err(FinalizeError::from_write(e));
        }
        claim.disarm();

        info!(
            event_id = %event_id,
            station = %result.station.name,
            confirmed_at = %result.confirmed_at,
            venues = result.venues.len(),
            degraded = ?degraded,
            "event finalized"
        );

        Ok(FinalizeReport {
            event_id,
            result,
            center,
            meeting,
            selection,
            degraded,
        })
    }

    /// Report how many participants have responded.
    pub async fn readiness(&self, event_id: &str) -> Result<Readiness, FinalizeError> {
        let event_id = EventId::parse(event_id).ok_or(InputError::MissingEventId)?;
        let event = self.load_event(&event_id).await?;
        let participants = self
            .store
            .participants(&event_id)
            .await
            .map_err(FinalizeError::RecordStore)?;

        Ok(Readiness::new(
            participants.len(),
            event.expected,
            event.is_finalized(),
        ))
    }

    async fn load_event(&self, event_id: &EventId) -> Result<EventRecord, FinalizeError> {
        match self.store.event(event_id).await {
            Ok(event) => Ok(event),
            Err(StoreError::NotFound(_)) => {
                Err(InputError::UnknownEvent(event_id.to_string()).into())
            }
            Err(e) => Err(FinalizeError::RecordStore(e)),
        }
    }
}

/// Normalize schedule rows and attach them to their participants.
///
/// Rows with unparseable timestamps, or for someone not in `participants`,
/// are dropped.
fn attach_availability(participants: &mut [Participant], schedules: Vec<ScheduleRecord>, zone: Tz) {
    for row in schedules {
        let at = match normalize_instant(&row.date, zone) {
            Ok(at) => at,
            Err(e) => {
                warn!(participant = %row.participant, error = %e, "dropping schedule entry");
                continue;
            }
        };
        match participants.iter_mut().find(|p| p.id == row.participant) {
            Some(p) => p.availability.push(at),
            None => debug!(participant = %row.participant, "schedule for unknown participant"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn availability_is_normalized_and_attached() {
        let mut participants = vec![
            Participant::new(ParticipantId::new("a"), None),
            Participant::new(ParticipantId::new("b"), None),
        ];
        let rows = vec![
            ScheduleRecord::new("a", "2024-01-05T19:00:00+09:00"),
            ScheduleRecord::new("b", "2024-01-05 19:00"),
            ScheduleRecord::new("b", "next friday"),
            ScheduleRecord::new("z", "2024-01-05T10:00:00Z"),
        ];

        attach_availability(&mut participants, rows, chrono_tz::Asia::Tokyo);

        let expected: DateTime<Utc> = "2024-01-05T10:00:00Z".parse().unwrap();
        assert_eq!(participants[0].availability, vec![expected]);
        assert_eq!(participants[1].availability, vec![expected]);
    }

    #[test]
    fn stage_names() {
        assert_eq!(
            serde_json::to_string(&Stage::RouteMatrix).unwrap(),
            "\"route_matrix\""
        );
    }
}
