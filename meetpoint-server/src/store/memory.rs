//! In-memory event store.
//!
//! Used when no database is configured and throughout the tests. Every
//! status transition happens under one write lock, so claims are atomic.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;

use crate::domain::{EventId, FinalizationResult, ParticipantId};

use super::{
    Claim, EventRecord, EventStatus, EventStore, ParticipantRecord, ScheduleRecord, StoreError,
};

#[derive(Debug, Default)]
struct Tables {
    events: HashMap<EventId, EventRecord>,
    results: HashMap<EventId, FinalizationResult>,
    participants: Vec<(EventId, ParticipantRecord)>,
    schedules: Vec<ScheduleRecord>,
}

/// Event store backed by process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    fail_commits: AtomicBool,
    fail_participants: AtomicBool,
    fail_schedules: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace an open event.
    pub async fn insert_event(&self, id: &EventId, expected: Option<u32>) {
        let mut record = EventRecord::new(id.clone());
        record.expected = expected;
        let mut tables = self.tables.write().await;
        tables.events.insert(id.clone(), record);
        tables.results.remove(id);
    }

    pub async fn add_participant(&self, event: &EventId, participant: ParticipantRecord) {
        self.tables
            .write()
            .await
            .participants
            .push((event.clone(), participant));
    }

    pub async fn add_schedule(&self, schedule: ScheduleRecord) {
        self.tables.write().await.schedules.push(schedule);
    }

    /// The last committed result for an event.
    pub async fn result(&self, id: &EventId) -> Option<FinalizationResult> {
        self.tables.read().await.results.get(id).cloned()
    }

    pub async fn status(&self, id: &EventId) -> Option<EventStatus> {
        self.tables.read().await.events.get(id).map(|e| e.status)
    }

    /// Overwrite an event's status directly.
    pub async fn set_status(&self, id: &EventId, status: EventStatus) {
        if let Some(event) = self.tables.write().await.events.get_mut(id) {
            event.status = status;
        }
    }

    /// Make every subsequent commit fail.
    pub fn fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent participant read fail.
    pub fn fail_participants(&self, fail: bool) {
        self.fail_participants.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent schedule read fail.
    pub fn fail_schedules(&self, fail: bool) {
        self.fail_schedules.store(fail, Ordering::SeqCst);
    }
}

impl EventStore for MemoryStore {
    async fn event(&self, id: &EventId) -> Result<EventRecord, StoreError> {
        self.tables
            .read()
            .await
            .events
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn participants(&self, id: &EventId) -> Result<Vec<ParticipantRecord>, StoreError> {
        if self.fail_participants.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("participant read"));
        }
        Ok(self
            .tables
            .read()
            .await
            .participants
            .iter()
            .filter(|(event, _)| event == id)
            .map(|(_, p)| p.clone())
            .collect())
    }

    async fn schedules(
        &self,
        participants: &[ParticipantId],
    ) -> Result<Vec<ScheduleRecord>, StoreError> {
        if self.fail_schedules.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("schedule read"));
        }
        Ok(self
            .tables
            .read()
            .await
            .schedules
            .iter()
            .filter(|s| participants.contains(&s.participant))
            .cloned()
            .collect())
    }

    async fn claim(&self, id: &EventId) -> Result<Claim, StoreError> {
        let mut tables = self.tables.write().await;
        let event = tables
            .events
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        if event.status == EventStatus::Finalizing {
            return Err(StoreError::Conflict(id.to_string()));
        }

        let previous = event.status;
        event.status = EventStatus::Finalizing;
        Ok(Claim {
            event: id.clone(),
            previous,
        })
    }

    async fn commit(&self, claim: &Claim, result: &FinalizationResult) -> Result<(), StoreError> {
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("commit"));
        }

        let mut tables = self.tables.write().await;
        let event = tables
            .events
            .get_mut(&claim.event)
            .ok_or_else(|| StoreError::NotFound(claim.event.to_string()))?;

        if event.status != EventStatus::Finalizing {
            return Err(StoreError::Conflict(claim.event.to_string()));
        }

        event.status = EventStatus::Finalized;
        event.confirmed_at = Some(result.confirmed_at);
        tables.results.insert(claim.event.clone(), result.clone());
        Ok(())
    }

    async fn release(&self, claim: &Claim) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if let Some(event) = tables.events.get_mut(&claim.event) {
            if event.status == EventStatus::Finalizing {
                event.status = claim.previous;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CandidateStation, LatLng, Venue};
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn ev(id: &str) -> EventId {
        EventId::parse(id).unwrap()
    }

    fn result() -> FinalizationResult {
        FinalizationResult {
            confirmed_at: Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap(),
            station: CandidateStation::new("Shibuya", LatLng::new(35.658, 139.701)),
            venues: vec![Venue::placeholder()],
        }
    }

    #[tokio::test]
    async fn claim_commit_cycle() {
        let store = MemoryStore::new();
        let id = ev("ev-1");
        store.insert_event(&id, Some(3)).await;

        let claim = store.claim(&id).await.unwrap();
        assert_eq!(claim.previous, EventStatus::Open);
        assert_eq!(store.status(&id).await, Some(EventStatus::Finalizing));

        store.commit(&claim, &result()).await.unwrap();
        assert_eq!(store.status(&id).await, Some(EventStatus::Finalized));
        assert_eq!(store.result(&id).await, Some(result()));
        assert!(store.event(&id).await.unwrap().is_finalized());
    }

    #[tokio::test]
    async fn second_claim_conflicts() {
        let store = MemoryStore::new();
        let id = ev("ev-1");
        store.insert_event(&id, None).await;

        let _claim = store.claim(&id).await.unwrap();
        assert!(matches!(
            store.claim(&id).await,
            Err(StoreError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn concurrent_claims_have_one_winner() {
        let store = Arc::new(MemoryStore::new());
        let id = ev("ev-1");
        store.insert_event(&id, None).await;

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                let id = id.clone();
                tokio::spawn(async move { store.claim(&id).await.is_ok() })
            })
            .collect();

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn release_restores_previous_status() {
        let store = MemoryStore::new();
        let id = ev("ev-1");
        store.insert_event(&id, None).await;
        store.set_status(&id, EventStatus::Finalized).await;

        let claim = store.claim(&id).await.unwrap();
        assert_eq!(claim.previous, EventStatus::Finalized);
        store.release(&claim).await.unwrap();
        assert_eq!(store.status(&id).await, Some(EventStatus::Finalized));
    }

    #[tokio::test]
    async fn failed_commit_writes_nothing() {
        let store = MemoryStore::new();
        let id = ev("ev-1");
        store.insert_event(&id, None).await;
        store.fail_commits(true);

        let claim = store.claim(&id).await.unwrap();
        assert!(store.commit(&claim, &result()).await.is_err());
        assert_eq!(store.result(&id).await, None);
        assert_eq!(store.event(&id).await.unwrap().confirmed_at, None);
    }

    #[tokio::test]
    async fn commit_without_claim_conflicts() {
        let store = MemoryStore::new();
        let id = ev("ev-1");
        store.insert_event(&id, None).await;

        let forged = Claim {
            event: id.clone(),
            previous: EventStatus::Open,
        };
        assert!(matches!(
            store.commit(&forged, &result()).await,
            Err(StoreError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn reads_are_scoped() {
        let store = MemoryStore::new();
        let (a, b) = (ev("a"), ev("b"));
        store.insert_event(&a, None).await;
        store.insert_event(&b, None).await;
        store
            .add_participant(&a, ParticipantRecord::new("u1", Some(35.0), Some(139.0)))
            .await;
        store
            .add_participant(&b, ParticipantRecord::new("u2", Some(35.0), Some(139.0)))
            .await;
        store.add_schedule(ScheduleRecord::new("u1", "2024-01-01T10:00:00Z")).await;
        store.add_schedule(ScheduleRecord::new("u2", "2024-01-02T10:00:00Z")).await;

        let people = store.participants(&a).await.unwrap();
        assert_eq!(people.len(), 1);
        let ids: Vec<_> = people.into_iter().map(|p| p.id).collect();
        let schedules = store.schedules(&ids).await.unwrap();
        assert_eq!(schedules, vec![ScheduleRecord::new("u1", "2024-01-01T10:00:00Z")]);

        assert!(matches!(
            store.event(&ev("missing")).await,
            Err(StoreError::NotFound(_))
        ));
    }
}
