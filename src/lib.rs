pub mod config;
pub mod controllers;
pub mod error;
pub mod middleware;
pub mod models;
pub mod store;

use axum::{routing::get, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use controllers::EventController;
use store::{EventStore, InMemoryEventStore, PgEventStore};

// Shared state для всего приложения
pub struct AppState {
    pub config: config::Config,
    pub events: EventController,
}

impl AppState {
    pub async fn new(config: config::Config) -> anyhow::Result<Arc<Self>> {
        let store: Arc<dyn EventStore> = match config.database.url.as_deref() {
            Some(url) => {
                let store = PgEventStore::connect(url, config.database.pool_size).await?;
                info!("Database connected");
                store.migrate().await?;
                Arc::new(store)
            }
            None => {
                warn!("DATABASE_URL is not set, events are kept in memory only");
                Arc::new(InMemoryEventStore::with_default_types())
            }
        };

        Ok(Self::with_store(config, store))
    }

    pub fn with_store(config: config::Config, store: Arc<dyn EventStore>) -> Arc<Self> {
        Arc::new(Self {
            config,
            events: EventController::new(store),
        })
    }
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Community Events API v1.0" }))
        .route("/health", get(|| async { "OK" }))
        .nest("/api", controllers::routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Binds the configured host, which may be a name such as `localhost`.
pub async fn listen(app: &config::AppConfig) -> std::io::Result<TcpListener> {
    TcpListener::bind((app.host.as_str(), app.port)).await
}
