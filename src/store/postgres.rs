use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use tracing::info;

use super::{EventStore, StoreError, StoreResult};
use crate::models::{Event, EventChanges, EventSummary, EventType, NewEvent};

const EVENT_COLUMNS: &str =
    "id, name, description, created_at, starts_at, ends_at, organiser_id, type_id";

#[derive(Clone)]
pub struct PgEventStore {
    pool: PgPool,
}

impl PgEventStore {
    pub async fn connect(database_url: &str, pool_size: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    /// Applies the embedded migrations, which also seed the event types.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Applying event schema migrations");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Event schema is up to date");
        Ok(())
    }
}

// Нарушение внешнего ключа -> MissingReference, остальное как есть
fn reference_error(column: &'static str, e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_foreign_key_violation() {
            return StoreError::MissingReference(column);
        }
    }
    StoreError::Database(e)
}

#[async_trait]
impl EventStore for PgEventStore {
    async fn list_types(&self) -> StoreResult<Vec<EventType>> {
        let types = sqlx::query_as::<_, EventType>("SELECT id, name FROM event_types ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(types)
    }

    async fn type_exists(&self, type_id: i32) -> StoreResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM event_types WHERE id = $1)",
        )
        .bind(type_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn list_events(&self) -> StoreResult<Vec<EventSummary>> {
        let events = sqlx::query_as::<_, EventSummary>(
            r#"
            SELECT e.id, e.name, e.description, e.starts_at, e.ends_at, e.organiser_id,
                   t.name AS type_name,
                   COUNT(p.user_id) AS participant_count
            FROM events e
            JOIN event_types t ON t.id = e.type_id
            LEFT JOIN event_participants p ON p.event_id = e.id
            GROUP BY e.id, t.name
            ORDER BY e.starts_at, e.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }

    async fn find_event(&self, id: i32) -> StoreResult<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(event)
    }

    async fn insert_event(&self, event: NewEvent) -> StoreResult<Event> {
        let inserted = sqlx::query_as::<_, Event>(&format!(
            "INSERT INTO events (name, description, starts_at, ends_at, organiser_id, type_id, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, NOW())
             RETURNING {EVENT_COLUMNS}"
        ))
        .bind(&event.name)
        .bind(&event.description)
        .bind(event.starts_at)
        .bind(event.ends_at)
        .bind(&event.organiser_id)
        .bind(event.type_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| reference_error("type_id", e))?;
        Ok(inserted)
    }

    async fn update_event(&self, id: i32, changes: &EventChanges) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE events
             SET name = $1, description = $2, starts_at = $3, ends_at = $4, type_id = $5
             WHERE id = $6",
        )
        .bind(&changes.name)
        .bind(&changes.description)
        .bind(changes.starts_at)
        .bind(changes.ends_at)
        .bind(changes.type_id)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| reference_error("type_id", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn add_participant(&self, event_id: i32, user_id: &str) -> StoreResult<bool> {
        let result = sqlx::query(
            "INSERT INTO event_participants (event_id, user_id)
             VALUES ($1, $2)
             ON CONFLICT (event_id, user_id) DO NOTHING",
        )
        .bind(event_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| reference_error("event_id", e))?;
        Ok(result.rows_affected() == 1)
    }

    async fn remove_participant(&self, event_id: i32, user_id: &str) -> StoreResult<bool> {
        let result =
            sqlx::query("DELETE FROM event_participants WHERE event_id = $1 AND user_id = $2")
                .bind(event_id)
                .bind(user_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
