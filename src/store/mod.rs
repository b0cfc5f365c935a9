//! Persistence seam for events, event types and the participant roster.
//!
//! [`PgEventStore`] is the production backend. [`InMemoryEventStore`] keeps the
//! same invariants in process memory for tests and database-less local runs.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Event, EventChanges, EventSummary, EventType, NewEvent};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryEventStore;
pub use postgres::PgEventStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0} does not reference an existing row")]
    MissingReference(&'static str),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait EventStore: Send + Sync {
    // types
    async fn list_types(&self) -> StoreResult<Vec<EventType>>;
    async fn type_exists(&self, type_id: i32) -> StoreResult<bool>;

    // events
    async fn list_events(&self) -> StoreResult<Vec<EventSummary>>;
    async fn find_event(&self, id: i32) -> StoreResult<Option<Event>>;
    async fn insert_event(&self, event: NewEvent) -> StoreResult<Event>;
    /// Returns `false` when no event has this id.
    async fn update_event(&self, id: i32, changes: &EventChanges) -> StoreResult<bool>;

    // roster
    /// Returns `false` when the caller was already on the roster.
    async fn add_participant(&self, event_id: i32, user_id: &str) -> StoreResult<bool>;
    /// Returns `false` when there was no row to remove.
    async fn remove_participant(&self, event_id: i32, user_id: &str) -> StoreResult<bool>;
}
