use axum::{extract::State, response::Response, routing::post, Json, Router};

use crate::auth::Actor;
use crate::models::NewTicket;
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::response::created;

pub fn routes() -> Router<AppState> {
    Router::new().route("/ticket/create_ticket", post(create_ticket))
}

pub async fn create_ticket(
    State(state): State<AppState>,
    actor: Actor,
    Json(request): Json<NewTicket>,
) -> AppResult<Response> {
    let ticket = state.tickets.create(&actor, &request).await?;
    Ok(created(ticket, "Ticket created successfully"))
}
