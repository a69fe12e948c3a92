use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use std::sync::Arc;

use super::{Actor, CredentialService};
use crate::state::AppState;
use crate::utils::error::AppError;

/// Resolves the `Authorization: Bearer` header into an [`Actor`].
#[async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(AppError::unauthorized)?;

        let token = bearer_token(auth_header).ok_or_else(AppError::unauthorized)?;

        let credentials: Arc<CredentialService> = AppState::from_ref(state).credentials;
        credentials.resolve_token(token)
    }
}

fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
