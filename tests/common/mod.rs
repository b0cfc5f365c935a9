#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;

use community_events::config::{AppConfig, Config, DatabaseConfig, JwtConfig};
use community_events::controllers::EventController;
use community_events::middleware::CurrentUser;
use community_events::models::{Event, EventForm};
use community_events::store::InMemoryEventStore;

pub const ORGANISER: &str = "organiser-1";
pub const OTHER_USER: &str = "someone-else";

pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 11, 7, 18, 0, 0).unwrap()
}

pub fn organiser() -> CurrentUser {
    CurrentUser::new(ORGANISER)
}

pub fn other_user() -> CurrentUser {
    CurrentUser::new(OTHER_USER)
}

pub fn seeded_event(id: i32) -> Event {
    Event {
        id,
        name: format!("Event {id}"),
        description: format!("Description {id}"),
        created_at: start() - Duration::days(30),
        starts_at: start() + Duration::days(id as i64),
        ends_at: start() + Duration::days(id as i64) + Duration::hours(2),
        organiser_id: ORGANISER.to_string(),
        type_id: 1,
    }
}

/// Type{1, "Type 1"}, Event{1}, Event{2}.
pub async fn seeded_store() -> Arc<InMemoryEventStore> {
    let store = Arc::new(InMemoryEventStore::new());
    store.seed_type(1, "Type 1").await;
    store.seed_event(seeded_event(1)).await.unwrap();
    store.seed_event(seeded_event(2)).await.unwrap();
    store
}

pub async fn seeded_controller() -> (EventController, Arc<InMemoryEventStore>) {
    let store = seeded_store().await;
    (EventController::new(store.clone()), store)
}

pub fn form(name: &str, type_id: i32) -> EventForm {
    EventForm {
        name: name.to_string(),
        description: "New Description".to_string(),
        start: start(),
        end: start() + Duration::hours(3),
        type_id,
    }
}

pub fn test_config() -> Config {
    Config {
        app: AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
            rust_log: "community_events=debug".to_string(),
        },
        database: DatabaseConfig { url: None, pool_size: 1 },
        jwt: JwtConfig { secret: "test-secret".to_string(), expires_in_hours: 1 },
    }
}
