//! Credential service: password digests and session tokens.
//!
//! This is the only place that turns a bearer token into an [`Actor`];
//! every other component consumes the resolved identity.

use chrono::Duration;
use serde::Serialize;

use crate::config::TokenConfig;
use crate::models::{Role, UserId};
use crate::utils::error::AppResult;

mod extractor;
pub mod password;
pub mod token;

pub use token::{Claims, TokenSigner};

/// Identity resolved from a valid session token for the current request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Actor {
    pub email: String,
    pub id: UserId,
    pub role: Option<Role>,
}

#[derive(Clone)]
pub struct CredentialService {
    signer: TokenSigner,
}

impl CredentialService {
    pub fn new(config: &TokenConfig) -> Self {
        Self {
            signer: TokenSigner::new(config),
        }
    }

    pub fn hash_password(&self, plaintext: &str) -> AppResult<String> {
        password::hash_password(plaintext)
    }

    pub fn verify_password(&self, plaintext: &str, digest: &str) -> bool {
        password::verify_password(plaintext, digest)
    }

    pub fn issue_token(
        &self,
        subject: &str,
        user_id: UserId,
        role: Option<Role>,
        ttl: Duration,
    ) -> AppResult<String> {
        self.signer.issue(subject, user_id, role, ttl)
    }

    /// Issue a token with the configured lifetime.
    pub fn issue_session(&self, subject: &str, user_id: UserId, role: Option<Role>) -> AppResult<String> {
        self.issue_token(subject, user_id, role, self.signer.default_ttl())
    }

    pub fn resolve_token(&self, token: &str) -> AppResult<Actor> {
        self.signer.resolve(token)
    }
}
