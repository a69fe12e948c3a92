//! Admin-only user management.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::auth::Actor;
use crate::models::{Role, User, UserId};
use crate::policy::{self, Action};
use crate::store::UserStore;
use crate::utils::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleChange {
    pub user_id: UserId,
    #[serde(alias = "role")]
    pub new_role: Role,
}

#[derive(Clone)]
pub struct AdminService {
    users: Arc<dyn UserStore>,
}

impl AdminService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    pub async fn list_all_users(&self, actor: &Actor) -> AppResult<Vec<User>> {
        policy::require(Action::ListUsers, actor)?;
        self.users.list_users().await
    }

    pub async fn change_role(
        &self,
        actor: &Actor,
        user_id: UserId,
        role: Role,
    ) -> AppResult<RoleChange> {
        policy::require(Action::ChangeRole, actor)?;
        let user = self
            .users
            .set_role(user_id, role)
            .await?
            .ok_or_else(user_not_found)?;

        info!(admin = actor.id, user_id = user.id, role = role.as_str(), "Role changed");
        Ok(RoleChange {
            user_id: user.id,
            new_role: role,
        })
    }

    pub async fn delete_user(&self, actor: &Actor, user_id: UserId) -> AppResult<UserId> {
        policy::require(Action::DeleteUser, actor)?;
        if !self.users.delete_user(user_id).await? {
            return Err(user_not_found());
        }

        info!(admin = actor.id, user_id, "User deleted by admin");
        Ok(user_id)
    }
}

fn user_not_found() -> AppError {
    AppError::NotFound("User not found".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{actor_for, seed_user};
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_non_admins_are_unauthorized() {
        let store = Arc::new(MemoryStore::new());
        let admin = AdminService::new(store.clone());

        for role in [None, Some(Role::User), Some(Role::Organizer)] {
            let tag = format!("{role:?}").to_lowercase().replace(['(', ')'], "");
            let caller = actor_for(&seed_user(&store, &tag, role).await);

            assert!(matches!(
                admin.list_all_users(&caller).await,
                Err(AppError::Unauthorized(_))
            ));
            assert!(matches!(
                admin.change_role(&caller, caller.id, Role::Admin).await,
                Err(AppError::Unauthorized(_))
            ));
            assert!(matches!(
                admin.delete_user(&caller, caller.id).await,
                Err(AppError::Unauthorized(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_admin_manages_users() {
        let store = Arc::new(MemoryStore::new());
        let admin = AdminService::new(store.clone());
        let root = actor_for(&seed_user(&store, "root", Some(Role::Admin)).await);
        let target = seed_user(&store, "target", None).await;

        assert_eq!(admin.list_all_users(&root).await.unwrap().len(), 2);

        let change = admin
            .change_role(&root, target.id, Role::Organizer)
            .await
            .unwrap();
        assert_eq!(change.new_role, Role::Organizer);
        assert_eq!(
            store.find_user(target.id).await.unwrap().unwrap().role,
            Some(Role::Organizer)
        );

        assert_eq!(admin.delete_user(&root, target.id).await.unwrap(), target.id);
        assert_eq!(admin.list_all_users(&root).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_target_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let admin = AdminService::new(store.clone());
        let root = actor_for(&seed_user(&store, "root", Some(Role::Admin)).await);

        assert!(matches!(
            admin.change_role(&root, 404, Role::User).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            admin.delete_user(&root, 404).await,
            Err(AppError::NotFound(_))
        ));
    }
}
