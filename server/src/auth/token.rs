//! Signed session tokens.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::TokenConfig;
use crate::models::{Role, UserId};
use crate::utils::error::{AppError, AppResult};

use super::Actor;

/// Payload embedded in every session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject; the user's email.
    pub sub: String,
    pub id: UserId,
    pub role: Option<Role>,
    pub exp: i64,
}

#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    header: Header,
    validation: Validation,
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(config: &TokenConfig) -> Self {
        let secret = config.secret_key.as_bytes();

        let mut validation = Validation::new(config.algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            header: Header::new(config.algorithm),
            validation,
            ttl: config.ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(
        &self,
        subject: &str,
        user_id: UserId,
        role: Option<Role>,
        ttl: Duration,
    ) -> AppResult<String> {
        let claims = Claims {
            sub: subject.to_string(),
            id: user_id,
            role,
            exp: (Utc::now() + ttl).timestamp(),
        };

        encode(&self.header, &claims, &self.encoding)
            .map_err(|e| AppError::InternalServerError(format!("token signing failed: {e}")))
    }

    /// Verify signature and expiry. Every failure collapses into the same
    /// `Unauthorized` error.
    pub fn resolve(&self, token: &str) -> AppResult<Actor> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "Rejected session token");
            AppError::unauthorized()
        })?;

        let claims = data.claims;
        if claims.sub.is_empty() {
            return Err(AppError::unauthorized());
        }

        Ok(Actor {
            email: claims.sub,
            id: claims.id,
            role: claims.role,
        })
    }
}
