pub mod event;
pub mod event_type;
pub mod forms;
pub mod participant;

pub use event::{Event, EventChanges, EventSummary, NewEvent};
pub use event_type::EventType;
pub use forms::{EventForm, EventFormView, EventListView, EventShortView};
pub use participant::EventParticipant;
