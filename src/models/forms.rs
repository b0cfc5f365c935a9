use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::{Validate, ValidationError, ValidationErrors};

use super::{Event, EventChanges, EventSummary, EventType, NewEvent};

/// Submitted fields of the add/edit event form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct EventForm {
    #[validate(
        custom(function = "not_blank"),
        length(max = 100, message = "Name must be at most 100 characters")
    )]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub type_id: i32,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required").with_message("Name is required".into()));
    }
    Ok(())
}

impl EventForm {
    /// Field-level checks. The type reference is checked against the store separately.
    pub fn check(&self) -> FormErrors {
        let mut errors = match self.validate() {
            Ok(()) => FormErrors::default(),
            Err(e) => FormErrors::from(e),
        };
        if self.end < self.start {
            errors.add("end", "End must not be earlier than start");
        }
        errors
    }

    pub fn into_new_event(self, organiser_id: &str) -> NewEvent {
        NewEvent {
            name: self.name,
            description: self.description,
            starts_at: self.start,
            ends_at: self.end,
            organiser_id: organiser_id.to_string(),
            type_id: self.type_id,
        }
    }

    pub fn into_changes(self) -> EventChanges {
        EventChanges {
            name: self.name,
            description: self.description,
            starts_at: self.start,
            ends_at: self.end,
            type_id: self.type_id,
        }
    }
}

impl From<&Event> for EventForm {
    fn from(event: &Event) -> Self {
        EventForm {
            name: event.name.clone(),
            description: event.description.clone(),
            start: event.starts_at,
            end: event.ends_at,
            type_id: event.type_id,
        }
    }
}

/// Field name -> messages, as shown next to the redisplayed form.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = FormErrors::default();
        for (field, errs) in errors.field_errors() {
            for err in errs.iter() {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                out.add(&field, message);
            }
        }
        out
    }
}

/// The add/edit form as the client should (re)display it.
#[derive(Debug, Clone, Serialize)]
pub struct EventFormView {
    pub form: Option<EventForm>,
    pub types: Vec<EventType>,
    pub errors: FormErrors,
}

impl EventFormView {
    pub fn empty(types: Vec<EventType>) -> Self {
        Self { form: None, types, errors: FormErrors::default() }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EventShortView {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(rename = "type")]
    pub type_name: String,
    pub organiser_id: String,
    pub participant_count: i64,
}

impl From<EventSummary> for EventShortView {
    fn from(s: EventSummary) -> Self {
        EventShortView {
            id: s.id,
            name: s.name,
            description: s.description,
            start: s.starts_at,
            end: s.ends_at,
            type_name: s.type_name,
            organiser_id: s.organiser_id,
            participant_count: s.participant_count,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EventListView {
    pub events: Vec<EventShortView>,
}
