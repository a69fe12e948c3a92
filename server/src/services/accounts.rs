//! Registration, login and self-service account operations.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::{Actor, CredentialService};
use crate::models::{ContactInfo, NewUser, Role, User, UserId, UserSnapshot};
use crate::policy::{self, Action, Scope};
use crate::store::UserStore;
use crate::utils::error::{AppError, AppResult};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
    pub phone_number: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PasswordChange {
    pub password: String,
    pub new_password: String,
}

/// Before and after views of a contact update.
#[derive(Debug, Clone, Serialize)]
pub struct UpdatedInfo {
    pub previous_data: UserSnapshot,
    pub updated_data: UserSnapshot,
}

#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserStore>,
    credentials: Arc<CredentialService>,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserStore>, credentials: Arc<CredentialService>) -> Self {
        Self { users, credentials }
    }

    pub async fn signup(&self, request: SignupRequest) -> AppResult<User> {
        if self
            .users
            .contact_in_use(&request.email, &request.phone_number)
            .await?
        {
            return Err(AppError::Conflict("User already exists".to_string()));
        }

        let digest = self.credentials.hash_password(&request.password)?;
        // A concurrent signup can still win the race; the store reports it as Conflict.
        let user = self
            .users
            .insert_user(&NewUser {
                name: request.name,
                email: request.email,
                password: digest,
                role: request.role,
                phone_number: request.phone_number,
            })
            .await?;

        info!(user_id = user.id, role = ?user.role, "User registered");
        Ok(user)
    }

    /// Exchange email and password for a session token.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<String> {
        let user = self.users.find_user_by_email(email).await?;
        let user = match user {
            Some(user) if self.credentials.verify_password(password, &user.password) => user,
            _ => {
                warn!("Rejected login attempt");
                return Err(AppError::Unauthorized("Invalid credentials".to_string()));
            }
        };

        self.credentials
            .issue_session(&user.email, user.id, user.role)
    }

    pub async fn get_self(&self, actor: &Actor) -> AppResult<User> {
        let id = own_record(Action::ReadSelf, actor)?;
        self.load(id).await
    }

    pub async fn change_password(&self, actor: &Actor, change: &PasswordChange) -> AppResult<()> {
        let id = own_record(Action::UpdateSelf, actor)?;
        if change.new_password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::ValidationError(format!(
                "new_password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let user = self.load(id).await?;
        if !self.credentials.verify_password(&change.password, &user.password) {
            return Err(AppError::Unauthorized("Error on password change".to_string()));
        }

        let digest = self.credentials.hash_password(&change.new_password)?;
        if !self.users.set_password(id, &digest).await? {
            return Err(user_not_found());
        }

        info!(user_id = id, "Password changed");
        Ok(())
    }

    pub async fn update_info(&self, actor: &Actor, info: &ContactInfo) -> AppResult<UpdatedInfo> {
        let id = own_record(Action::UpdateSelf, actor)?;
        let previous = self.load(id).await?;
        let updated = self
            .users
            .set_contact(id, info)
            .await?
            .ok_or_else(user_not_found)?;

        info!(user_id = id, "Contact information updated");
        Ok(UpdatedInfo {
            previous_data: UserSnapshot::full(&previous),
            updated_data: UserSnapshot::contact(&updated),
        })
    }

    pub async fn delete_self(&self, actor: &Actor) -> AppResult<()> {
        let id = own_record(Action::DeleteSelf, actor)?;
        if !self.users.delete_user(id).await? {
            return Err(user_not_found());
        }
        info!(user_id = id, "User deleted own account");
        Ok(())
    }

    async fn load(&self, id: UserId) -> AppResult<User> {
        self.users.find_user(id).await?.ok_or_else(user_not_found)
    }
}

fn own_record(action: Action, actor: &Actor) -> AppResult<UserId> {
    match policy::require(action, actor)? {
        Scope::OwnedBy(id) => Ok(id),
        Scope::All => Ok(actor.id),
    }
}

fn user_not_found() -> AppError {
    AppError::NotFound("User not found".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenConfig;
    use crate::store::MemoryStore;
    use chrono::Duration;
    use jsonwebtoken::Algorithm;

    fn service() -> (AccountService, Arc<CredentialService>) {
        let credentials = Arc::new(CredentialService::new(&TokenConfig {
            secret_key: "test-secret".to_string(),
            algorithm: Algorithm::HS256,
            ttl: Duration::minutes(20),
        }));
        let store = Arc::new(MemoryStore::new());
        (AccountService::new(store, credentials.clone()), credentials)
    }

    fn signup(email: &str, phone: &str, role: Option<Role>) -> SignupRequest {
        SignupRequest {
            name: "Ada".to_string(),
            email: email.to_string(),
            password: "pw-123456".to_string(),
            role,
            phone_number: phone.to_string(),
        }
    }

    #[tokio::test]
    async fn test_signup_then_login_resolves_to_created_user() {
        let (accounts, credentials) = service();
        let user = accounts
            .signup(signup("a@x.com", "555", Some(Role::Organizer)))
            .await
            .unwrap();
        assert_ne!(user.password, "pw-123456");

        let token = accounts.login("a@x.com", "pw-123456").await.unwrap();
        let actor = credentials.resolve_token(&token).unwrap();
        assert_eq!(actor.id, user.id);
        assert_eq!(actor.role, Some(Role::Organizer));
        assert_eq!(actor.email, "a@x.com");
    }

    #[tokio::test]
    async fn test_duplicate_email_or_phone_conflicts() {
        let (accounts, _) = service();
        accounts.signup(signup("a@x.com", "555", None)).await.unwrap();

        let same_email = accounts.signup(signup("a@x.com", "777", Some(Role::Admin))).await;
        assert!(matches!(same_email, Err(AppError::Conflict(_))));

        let same_phone = accounts.signup(signup("b@x.com", "555", None)).await;
        assert!(matches!(same_phone, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_login_rejects_bad_credentials() {
        let (accounts, _) = service();
        accounts.signup(signup("a@x.com", "555", None)).await.unwrap();

        assert!(matches!(
            accounts.login("a@x.com", "nope").await,
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            accounts.login("ghost@x.com", "pw-123456").await,
            Err(AppError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_change_password_requires_current_password() {
        let (accounts, _) = service();
        let user = accounts.signup(signup("a@x.com", "555", None)).await.unwrap();
        let actor = crate::services::testing::actor_for(&user);

        let wrong = PasswordChange {
            password: "wrong".into(),
            new_password: "brand-new".into(),
        };
        assert!(matches!(
            accounts.change_password(&actor, &wrong).await,
            Err(AppError::Unauthorized(_))
        ));

        let short = PasswordChange {
            password: "pw-123456".into(),
            new_password: "abc".into(),
        };
        assert!(matches!(
            accounts.change_password(&actor, &short).await,
            Err(AppError::ValidationError(_))
        ));

        let good = PasswordChange {
            password: "pw-123456".into(),
            new_password: "brand-new".into(),
        };
        accounts.change_password(&actor, &good).await.unwrap();
        assert!(accounts.login("a@x.com", "brand-new").await.is_ok());
        assert!(accounts.login("a@x.com", "pw-123456").await.is_err());
    }

    #[tokio::test]
    async fn test_update_info_returns_both_snapshots() {
        let (accounts, _) = service();
        let user = accounts.signup(signup("a@x.com", "555", None)).await.unwrap();
        let actor = crate::services::testing::actor_for(&user);

        let result = accounts
            .update_info(
                &actor,
                &ContactInfo {
                    name: "Ada L".into(),
                    email: "ada@x.com".into(),
                    phone_number: "556".into(),
                },
            )
            .await
            .unwrap();

        assert_eq!(result.previous_data.email, "a@x.com");
        assert!(result.previous_data.created_at.is_some());
        assert_eq!(result.updated_data.email, "ada@x.com");
        assert_eq!(result.updated_data.phone_number, "556");
        assert_eq!(accounts.get_self(&actor).await.unwrap().name, "Ada L");
    }

    #[tokio::test]
    async fn test_delete_self_removes_record() {
        let (accounts, _) = service();
        let user = accounts.signup(signup("a@x.com", "555", None)).await.unwrap();
        let actor = crate::services::testing::actor_for(&user);

        accounts.delete_self(&actor).await.unwrap();
        assert!(matches!(
            accounts.get_self(&actor).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            accounts.delete_self(&actor).await,
            Err(AppError::NotFound(_))
        ));
    }
}
