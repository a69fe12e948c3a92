use axum::{
    extract::State,
    response::Response,
    routing::{delete, get, put},
    Json, Router,
};

use crate::auth::Actor;
use crate::models::ContactInfo;
use crate::services::PasswordChange;
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::response::{empty_success, success};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(current_user))
        .route("/users/", get(current_user))
        .route("/users/change_password", put(change_password))
        .route("/users/change_info", put(change_info))
        .route("/users/delete", delete(delete_account))
}

pub async fn current_user(State(state): State<AppState>, actor: Actor) -> AppResult<Response> {
    let user = state.accounts.get_self(&actor).await?;
    Ok(success(user, "Current user"))
}

pub async fn change_password(
    State(state): State<AppState>,
    actor: Actor,
    Json(change): Json<PasswordChange>,
) -> AppResult<Response> {
    state.accounts.change_password(&actor, &change).await?;
    Ok(empty_success("Password changed successfully"))
}

pub async fn change_info(
    State(state): State<AppState>,
    actor: Actor,
    Json(info): Json<ContactInfo>,
) -> AppResult<Response> {
    let result = state.accounts.update_info(&actor, &info).await?;
    Ok(success(result, "User information updated successfully!"))
}

pub async fn delete_account(State(state): State<AppState>, actor: Actor) -> AppResult<Response> {
    state.accounts.delete_self(&actor).await?;
    Ok(empty_success("User deleted successfully"))
}
