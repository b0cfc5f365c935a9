use axum::{routing::get, Json, Router};
use std::sync::Arc;

use crate::middleware::CurrentUser;

pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new()
        .route("/me", get(whoami))
}

// Проверка токена: возвращает идентификатор вызывающего
async fn whoami(user: CurrentUser) -> Json<CurrentUser> {
    Json(user)
}
