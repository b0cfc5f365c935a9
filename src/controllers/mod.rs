pub mod events;
pub mod identity;

use axum::Router;
use std::sync::Arc;

pub use events::{ActionResult, EventController, ALL_EVENTS_PATH};

pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(events::routes())
        .merge(identity::routes())
}
