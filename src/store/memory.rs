use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::RwLock;

use super::{EventStore, StoreError, StoreResult};
use crate::models::{Event, EventChanges, EventParticipant, EventSummary, EventType, NewEvent};

/// Types inserted by the initial migration; used to seed database-less runs.
pub const DEFAULT_TYPES: &[(i32, &str)] = &[
    (1, "Meetup"),
    (2, "Workshop"),
    (3, "Sports"),
    (4, "Social"),
];

#[derive(Default)]
struct Tables {
    types: BTreeMap<i32, EventType>,
    events: BTreeMap<i32, Event>,
    participants: BTreeSet<(i32, String)>,
    last_event_id: i32,
}

/// Process-local [`EventStore`] with the same key and reference rules as the schema.
#[derive(Default)]
pub struct InMemoryEventStore {
    tables: RwLock<Tables>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_types() -> Self {
        let mut tables = Tables::default();
        for (id, name) in DEFAULT_TYPES {
            tables.types.insert(*id, EventType { id: *id, name: name.to_string() });
        }
        Self { tables: RwLock::new(tables) }
    }

    pub async fn seed_type(&self, id: i32, name: &str) {
        let mut tables = self.tables.write().await;
        tables.types.insert(id, EventType { id, name: name.to_string() });
    }

    /// Inserts an event with a caller-chosen id. Later inserts continue after the highest id.
    pub async fn seed_event(&self, event: Event) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.types.contains_key(&event.type_id) {
            return Err(StoreError::MissingReference("type_id"));
        }
        tables.last_event_id = tables.last_event_id.max(event.id);
        tables.events.insert(event.id, event);
        Ok(())
    }

    pub async fn participants_of(&self, event_id: i32) -> Vec<String> {
        let tables = self.tables.read().await;
        tables
            .participants
            .iter()
            .filter(|(id, _)| *id == event_id)
            .map(|(_, user)| user.clone())
            .collect()
    }

    pub async fn count_events(&self) -> i64 {
        self.tables.read().await.events.len() as i64
    }

    pub async fn find_participant(&self, event_id: i32, user_id: &str) -> Option<EventParticipant> {
        let tables = self.tables.read().await;
        let found = tables.participants.contains(&(event_id, user_id.to_string()));
        found.then(|| EventParticipant { event_id, user_id: user_id.to_string() })
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn list_types(&self) -> StoreResult<Vec<EventType>> {
        let tables = self.tables.read().await;
        Ok(tables.types.values().cloned().collect())
    }

    async fn type_exists(&self, type_id: i32) -> StoreResult<bool> {
        Ok(self.tables.read().await.types.contains_key(&type_id))
    }

    async fn list_events(&self) -> StoreResult<Vec<EventSummary>> {
        let tables = self.tables.read().await;
        let mut events: Vec<EventSummary> = tables
            .events
            .values()
            .map(|e| EventSummary {
                id: e.id,
                name: e.name.clone(),
                description: e.description.clone(),
                starts_at: e.starts_at,
                ends_at: e.ends_at,
                organiser_id: e.organiser_id.clone(),
                type_name: tables
                    .types
                    .get(&e.type_id)
                    .map(|t| t.name.clone())
                    .unwrap_or_default(),
                participant_count: tables
                    .participants
                    .iter()
                    .filter(|(event_id, _)| *event_id == e.id)
                    .count() as i64,
            })
            .collect();
        events.sort_by(|a, b| a.starts_at.cmp(&b.starts_at).then(a.id.cmp(&b.id)));
        Ok(events)
    }

    async fn find_event(&self, id: i32) -> StoreResult<Option<Event>> {
        Ok(self.tables.read().await.events.get(&id).cloned())
    }

    async fn insert_event(&self, event: NewEvent) -> StoreResult<Event> {
        let mut tables = self.tables.write().await;
        if !tables.types.contains_key(&event.type_id) {
            return Err(StoreError::MissingReference("type_id"));
        }
        tables.last_event_id += 1;
        let stored = Event {
            id: tables.last_event_id,
            name: event.name,
            description: event.description,
            created_at: Utc::now(),
            starts_at: event.starts_at,
            ends_at: event.ends_at,
            organiser_id: event.organiser_id,
            type_id: event.type_id,
        };
        tables.events.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update_event(&self, id: i32, changes: &EventChanges) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if !tables.types.contains_key(&changes.type_id) {
            return Err(StoreError::MissingReference("type_id"));
        }
        let Some(event) = tables.events.get_mut(&id) else {
            return Ok(false);
        };
        event.name = changes.name.clone();
        event.description = changes.description.clone();
        event.starts_at = changes.starts_at;
        event.ends_at = changes.ends_at;
        event.type_id = changes.type_id;
        Ok(true)
    }

    async fn add_participant(&self, event_id: i32, user_id: &str) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if !tables.events.contains_key(&event_id) {
            return Err(StoreError::MissingReference("event_id"));
        }
        Ok(tables.participants.insert((event_id, user_id.to_string())))
    }

    async fn remove_participant(&self, event_id: i32, user_id: &str) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(tables.participants.remove(&(event_id, user_id.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn new_event(type_id: i32) -> NewEvent {
        let start = Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap();
        NewEvent {
            name: "Hack day".to_string(),
            description: String::new(),
            starts_at: start,
            ends_at: start + Duration::hours(8),
            organiser_id: "alice".to_string(),
            type_id,
        }
    }

    #[tokio::test]
    async fn insert_assigns_increasing_ids() {
        let store = InMemoryEventStore::with_default_types();
        let a = store.insert_event(new_event(1)).await.unwrap();
        let b = store.insert_event(new_event(2)).await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(store.count_events().await, 2);
    }

    #[tokio::test]
    async fn insert_rejects_unknown_type() {
        let store = InMemoryEventStore::with_default_types();
        let err = store.insert_event(new_event(42)).await.unwrap_err();
        assert!(matches!(err, StoreError::MissingReference("type_id")));
        assert_eq!(store.count_events().await, 0);
    }

    #[tokio::test]
    async fn roster_holds_one_row_per_pair() {
        let store = InMemoryEventStore::with_default_types();
        let event = store.insert_event(new_event(1)).await.unwrap();

        assert!(store.add_participant(event.id, "bob").await.unwrap());
        assert!(!store.add_participant(event.id, "bob").await.unwrap());
        assert_eq!(store.participants_of(event.id).await, vec!["bob".to_string()]);

        assert!(store.remove_participant(event.id, "bob").await.unwrap());
        assert!(!store.remove_participant(event.id, "bob").await.unwrap());
        assert!(store.find_participant(event.id, "bob").await.is_none());
    }

    #[tokio::test]
    async fn joining_missing_event_is_a_reference_error() {
        let store = InMemoryEventStore::with_default_types();
        let err = store.add_participant(7, "bob").await.unwrap_err();
        assert!(matches!(err, StoreError::MissingReference("event_id")));
    }

    #[tokio::test]
    async fn seeded_ids_are_not_reused() {
        let store = InMemoryEventStore::with_default_types();
        let mut seeded = store.insert_event(new_event(1)).await.unwrap();
        seeded.id = 10;
        store.seed_event(seeded).await.unwrap();

        let next = store.insert_event(new_event(1)).await.unwrap();
        assert_eq!(next.id, 11);
    }

    #[tokio::test]
    async fn summaries_carry_type_name_and_participant_count() {
        let store = InMemoryEventStore::with_default_types();
        let event = store.insert_event(new_event(2)).await.unwrap();
        store.add_participant(event.id, "bob").await.unwrap();
        store.add_participant(event.id, "carol").await.unwrap();

        let summaries = store.list_events().await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].type_name, "Workshop");
        assert_eq!(summaries[0].participant_count, 2);
    }
}
