use axum::{
    extract::{
        rejection::{FormRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::models::forms::FormErrors;
use crate::models::{Event, EventForm, EventFormView, EventListView, EventShortView};
use crate::store::{EventStore, StoreError};
use crate::AppState;

/// Where successful mutations send the client.
pub const ALL_EVENTS_PATH: &str = "/api/events";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/events", get(all_events))
        .route("/events/add", get(add_form).post(add_event))
        .route("/events/{id}/join", post(join_event))
        .route("/events/{id}/leave", post(leave_event))
        .route("/events/{id}/edit", get(edit_form).post(edit_event))
}

/// Outcome of a form post or roster change.
#[derive(Debug)]
pub enum ActionResult {
    /// The submitted form was rejected and is shown again with its errors.
    Redisplay(EventFormView),
    RedirectToAll,
}

impl ActionResult {
    pub fn is_redirect(&self) -> bool {
        matches!(self, ActionResult::RedirectToAll)
    }
}

impl IntoResponse for ActionResult {
    fn into_response(self) -> Response {
        match self {
            ActionResult::Redisplay(view) => {
                (StatusCode::UNPROCESSABLE_ENTITY, Json(view)).into_response()
            }
            ActionResult::RedirectToAll => Redirect::to(ALL_EVENTS_PATH).into_response(),
        }
    }
}

/* ---------- controller ---------- */

#[derive(Clone)]
pub struct EventController {
    store: Arc<dyn EventStore>,
}

impl EventController {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    /// Shared by add and edit: the form's type id must name an existing type.
    pub async fn type_exists(&self, type_id: i32) -> Result<bool, AppError> {
        Ok(self.store.type_exists(type_id).await?)
    }

    async fn validate(&self, form: &EventForm) -> Result<FormErrors, AppError> {
        let mut errors = form.check();
        if !self.type_exists(form.type_id).await? {
            errors.add("type_id", "Selected event type does not exist");
        }
        Ok(errors)
    }

    async fn redisplay(
        &self,
        form: EventForm,
        errors: FormErrors,
    ) -> Result<ActionResult, AppError> {
        let types = self.store.list_types().await?;
        Ok(ActionResult::Redisplay(EventFormView { form: Some(form), types, errors }))
    }

    async fn owned_event(&self, user: &CurrentUser, event_id: i32) -> Result<Event, AppError> {
        let event = self
            .store
            .find_event(event_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("event {event_id} does not exist")))?;

        if !event.is_organised_by(&user.user_id) {
            return Err(AppError::Forbidden(format!(
                "only the organiser may edit event {event_id}"
            )));
        }
        Ok(event)
    }

    pub async fn add_form(&self) -> Result<EventFormView, AppError> {
        let types = self.store.list_types().await?;
        Ok(EventFormView::empty(types))
    }

    pub async fn add(&self, user: &CurrentUser, form: EventForm) -> Result<ActionResult, AppError> {
        let errors = self.validate(&form).await?;
        if !errors.is_empty() {
            warn!(user = %user.user_id, type_id = form.type_id, "Add event form rejected");
            return self.redisplay(form, errors).await;
        }

        match self.store.insert_event(form.clone().into_new_event(&user.user_id)).await {
            Ok(event) => {
                info!(event_id = event.id, organiser = %user.user_id, "Event created");
                Ok(ActionResult::RedirectToAll)
            }
            Err(StoreError::MissingReference(field)) => {
                let mut errors = FormErrors::default();
                errors.add(field, "Selected event type does not exist");
                self.redisplay(form, errors).await
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn all(&self) -> Result<EventListView, AppError> {
        let events = self
            .store
            .list_events()
            .await?
            .into_iter()
            .map(EventShortView::from)
            .collect();
        Ok(EventListView { events })
    }

    pub async fn join(&self, user: &CurrentUser, event_id: i32) -> Result<ActionResult, AppError> {
        let missing = || AppError::BadRequest(format!("event {event_id} does not exist"));

        if self.store.find_event(event_id).await?.is_none() {
            return Err(missing());
        }

        match self.store.add_participant(event_id, &user.user_id).await {
            Ok(true) => info!(event_id, user = %user.user_id, "Joined event"),
            Ok(false) => debug!(event_id, user = %user.user_id, "Already on the roster"),
            Err(StoreError::MissingReference(_)) => return Err(missing()),
            Err(e) => return Err(e.into()),
        }
        Ok(ActionResult::RedirectToAll)
    }

    pub async fn leave(&self, user: &CurrentUser, event_id: i32) -> Result<ActionResult, AppError> {
        if self.store.find_event(event_id).await?.is_none() {
            return Err(AppError::NotFound(format!("event {event_id} does not exist")));
        }

        if self.store.remove_participant(event_id, &user.user_id).await? {
            info!(event_id, user = %user.user_id, "Left event");
        }
        Ok(ActionResult::RedirectToAll)
    }

    pub async fn edit_form(&self, user: &CurrentUser, event_id: i32) -> Result<EventFormView, AppError> {
        let event = self.owned_event(user, event_id).await?;
        let types = self.store.list_types().await?;
        Ok(EventFormView {
            form: Some(EventForm::from(&event)),
            types,
            errors: FormErrors::default(),
        })
    }

    pub async fn edit(
        &self,
        user: &CurrentUser,
        event_id: i32,
        form: EventForm,
    ) -> Result<ActionResult, AppError> {
        self.owned_event(user, event_id).await?;

        let errors = self.validate(&form).await?;
        if !errors.is_empty() {
            warn!(event_id, type_id = form.type_id, "Edit event form rejected");
            return self.redisplay(form, errors).await;
        }

        match self.store.update_event(event_id, &form.clone().into_changes()).await {
            Ok(true) => {
                info!(event_id, "Event updated");
                Ok(ActionResult::RedirectToAll)
            }
            Ok(false) => Err(AppError::NotFound(format!("event {event_id} does not exist"))),
            Err(StoreError::MissingReference(field)) => {
                let mut errors = FormErrors::default();
                errors.add(field, "Selected event type does not exist");
                self.redisplay(form, errors).await
            }
            Err(e) => Err(e.into()),
        }
    }
}

/* ---------- handlers ---------- */

// GET /api/events
async fn all_events(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
) -> Result<Json<EventListView>, AppError> {
    Ok(Json(state.events.all().await?))
}

// GET /api/events/add
async fn add_form(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
) -> Result<Json<EventFormView>, AppError> {
    Ok(Json(state.events.add_form().await?))
}

// POST /api/events/add
async fn add_event(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    form: Result<Form<EventForm>, FormRejection>,
) -> Result<ActionResult, AppError> {
    let Form(form) = form?;
    state.events.add(&user, form).await
}

// POST /api/events/{id}/join
async fn join_event(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    event_id: Result<Path<i32>, PathRejection>,
) -> Result<ActionResult, AppError> {
    let Path(event_id) = event_id?;
    state.events.join(&user, event_id).await
}

// POST /api/events/{id}/leave
async fn leave_event(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    event_id: Result<Path<i32>, PathRejection>,
) -> Result<ActionResult, AppError> {
    let Path(event_id) = event_id?;
    state.events.leave(&user, event_id).await
}

// GET /api/events/{id}/edit
async fn edit_form(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    event_id: Result<Path<i32>, PathRejection>,
) -> Result<Json<EventFormView>, AppError> {
    let Path(event_id) = event_id?;
    Ok(Json(state.events.edit_form(&user, event_id).await?))
}

// POST /api/events/{id}/edit
async fn edit_event(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    event_id: Result<Path<i32>, PathRejection>,
    form: Result<Form<EventForm>, FormRejection>,
) -> Result<ActionResult, AppError> {
    let Path(event_id) = event_id?;
    let Form(form) = form?;
    state.events.edit(&user, event_id, form).await
}
