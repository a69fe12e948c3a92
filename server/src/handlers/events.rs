use axum::{
    extract::{Query, State},
    response::Response,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;

use crate::auth::Actor;
use crate::models::{EventFields, EventId};
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::response::{created, empty_success, success};

#[derive(Debug, Deserialize)]
pub struct UpdateEventRequest {
    pub event_id: EventId,
    #[serde(flatten)]
    pub fields: EventFields,
}

#[derive(Debug, Deserialize)]
pub struct EventIdQuery {
    pub event_id: EventId,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/event/create", post(create_event))
        .route("/event/view_event", get(view_events))
        .route("/event/update_event", put(update_event))
        .route("/event/delete_event", delete(delete_event))
}

pub async fn create_event(
    State(state): State<AppState>,
    actor: Actor,
    Json(fields): Json<EventFields>,
) -> AppResult<Response> {
    let event = state.events.create(&actor, &fields).await?;
    Ok(created(event, "event created successfully"))
}

pub async fn view_events(State(state): State<AppState>, actor: Actor) -> AppResult<Response> {
    let events = state.events.list(&actor).await?;
    Ok(success(events, "Events"))
}

pub async fn update_event(
    State(state): State<AppState>,
    actor: Actor,
    Json(request): Json<UpdateEventRequest>,
) -> AppResult<Response> {
    let event = state
        .events
        .update(&actor, request.event_id, &request.fields)
        .await?;
    Ok(success(event, "event updated successfully"))
}

pub async fn delete_event(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<EventIdQuery>,
) -> AppResult<Response> {
    state.events.delete(&actor, query.event_id).await?;
    Ok(empty_success("event deleted successfully"))
}
