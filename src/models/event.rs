use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Event {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub organiser_id: String,
    pub type_id: i32,
}

// Строка для списка событий: событие + название типа + число участников
#[derive(Debug, Clone, FromRow)]
pub struct EventSummary {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub organiser_id: String,
    pub type_name: String,
    pub participant_count: i64,
}

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub name: String,
    pub description: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub organiser_id: String,
    pub type_id: i32,
}

/// Fields an edit is allowed to overwrite.
#[derive(Debug, Clone, PartialEq)]
pub struct EventChanges {
    pub name: String,
    pub description: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub type_id: i32,
}

impl Event {
    pub fn is_organised_by(&self, user_id: &str) -> bool {
        self.organiser_id == user_id
    }
}
