//! Event lifecycle: `nonexistent -> active -> (updated)* -> deleted`.
//!
//! Organizers only ever see their own events; lookups filter by both the
//! requested id and the organizer, so a foreign event is reported exactly
//! like a missing one.

use std::sync::Arc;
use tracing::info;

use crate::auth::Actor;
use crate::models::{Event, EventFields, EventId};
use crate::policy::{self, Action, Scope};
use crate::store::EventStore;
use crate::utils::error::{AppError, AppResult};

#[derive(Clone)]
pub struct EventService {
    events: Arc<dyn EventStore>,
}

impl EventService {
    pub fn new(events: Arc<dyn EventStore>) -> Self {
        Self { events }
    }

    /// The organizer is always the caller, whatever the request carried.
    pub async fn create(&self, actor: &Actor, fields: &EventFields) -> AppResult<Event> {
        let organizer = match policy::require(Action::CreateEvent, actor)? {
            Scope::OwnedBy(id) => id,
            Scope::All => actor.id,
        };
        fields.validate()?;

        let event = self.events.insert_event(organizer, fields).await?;
        info!(event_id = event.id, organizer, "Event created");
        Ok(event)
    }

    pub async fn list(&self, actor: &Actor) -> AppResult<Vec<Event>> {
        let scope = policy::require(Action::ViewEvents, actor)?;
        self.events.list_events(scope).await
    }

    pub async fn update(
        &self,
        actor: &Actor,
        event_id: EventId,
        fields: &EventFields,
    ) -> AppResult<Event> {
        let scope = policy::require(Action::UpdateEvent, actor)?;
        fields.validate()?;

        let event = self
            .events
            .update_event(event_id, scope, fields)
            .await?
            .ok_or_else(event_not_found)?;
        info!(event_id, actor = actor.id, "Event updated");
        Ok(event)
    }

    pub async fn delete(&self, actor: &Actor, event_id: EventId) -> AppResult<()> {
        let scope = policy::require(Action::DeleteEvent, actor)?;
        if !self.events.delete_event(event_id, scope).await? {
            return Err(event_not_found());
        }
        info!(event_id, actor = actor.id, "Event deleted");
        Ok(())
    }
}

fn event_not_found() -> AppError {
    AppError::NotFound("Event not found".to_string())
}
