use axum::{
    extract::{Query, State},
    response::Response,
    routing::{delete, get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::auth::Actor;
use crate::models::UserId;
use crate::services::RoleChange;
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::response::success;

#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: UserId,
}

#[derive(Debug, Serialize)]
struct DeletedUser {
    user_id: UserId,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/all_users", get(all_users))
        .route("/admin/change_role", put(change_role))
        .route("/admin/delete_user", delete(delete_user))
}

pub async fn all_users(State(state): State<AppState>, actor: Actor) -> AppResult<Response> {
    let users = state.admin.list_all_users(&actor).await?;
    Ok(success(users, "All users"))
}

pub async fn change_role(
    State(state): State<AppState>,
    actor: Actor,
    Json(request): Json<RoleChange>,
) -> AppResult<Response> {
    let change = state
        .admin
        .change_role(&actor, request.user_id, request.new_role)
        .await?;
    Ok(success(change, "User role updated successfully"))
}

pub async fn delete_user(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<UserIdQuery>,
) -> AppResult<Response> {
    let user_id = state.admin.delete_user(&actor, query.user_id).await?;
    Ok(success(DeletedUser { user_id }, "User deleted successfully"))
}
