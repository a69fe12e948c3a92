use axum::{extract::State, response::Response, routing::post, Form, Json, Router};
use serde::{Deserialize, Serialize};

use crate::services::SignupRequest;
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::response::created;

/// OAuth2 password-grant form; `username` carries the email.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/token", post(login))
        .route("/auth/login", post(login))
}

pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> AppResult<Response> {
    let user = state.accounts.signup(request).await?;
    Ok(created(user, "User created successfully"))
}

pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> AppResult<Json<TokenResponse>> {
    let access_token = state.accounts.login(&form.username, &form.password).await?;
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
    }))
}
