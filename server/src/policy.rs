//! Authorization policy.
//!
//! A pure mapping from (action, actor) to a decision. The
//! lifecycle managers ask for the [`Scope`] an actor may operate in and
//! apply it as a store filter, so a resource outside the scope is simply
//! not found. Role-level denials become `Unauthorized`.

use crate::auth::Actor;
use crate::models::{Role, UserId};
use crate::utils::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ReadSelf,
    UpdateSelf,
    DeleteSelf,
    ListUsers,
    ChangeRole,
    DeleteUser,
    CreateEvent,
    ViewEvents,
    UpdateEvent,
    DeleteEvent,
    CreateTicket,
}

/// Which resources an allowed action may touch, by owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    All,
    OwnedBy(UserId),
}

impl Scope {
    pub fn covers(&self, owner: UserId) -> bool {
        match self {
            Scope::All => true,
            Scope::OwnedBy(id) => *id == owner,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow(Scope),
    Deny,
}

pub fn evaluate(action: Action, actor: &Actor) -> Decision {
    use Action::*;

    match action {
        ReadSelf | UpdateSelf | DeleteSelf => Decision::Allow(Scope::OwnedBy(actor.id)),

        ListUsers | ChangeRole | DeleteUser => match actor.role {
            Some(Role::Admin) => Decision::Allow(Scope::All),
            _ => Decision::Deny,
        },

        // New events always belong to their creator, admins included.
        CreateEvent => match actor.role {
            Some(Role::Admin) | Some(Role::Organizer) => Decision::Allow(Scope::OwnedBy(actor.id)),
            _ => Decision::Deny,
        },

        ViewEvents | UpdateEvent | DeleteEvent | CreateTicket => match actor.role {
            Some(Role::Admin) => Decision::Allow(Scope::All),
            Some(Role::Organizer) => Decision::Allow(Scope::OwnedBy(actor.id)),
            _ => Decision::Deny,
        },
    }
}

/// The scope for `action`, or `Unauthorized` when the role lacks it.
pub fn require(action: Action, actor: &Actor) -> AppResult<Scope> {
    match evaluate(action, actor) {
        Decision::Allow(scope) => Ok(scope),
        Decision::Deny => {
            tracing::debug!(?action, actor = actor.id, "Policy denied action");
            Err(AppError::unauthorized())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allows(action: Action, actor: &Actor, owner: UserId) -> bool {
        match evaluate(action, actor) {
            Decision::Allow(scope) => scope.covers(owner),
            Decision::Deny => false,
        }
    }

    fn actor(id: UserId, role: Option<Role>) -> Actor {
        Actor {
            email: format!("u{id}@x.com"),
            id,
            role,
        }
    }

    #[test]
    fn test_self_service_is_limited_to_own_record() {
        for role in [None, Some(Role::User), Some(Role::Organizer), Some(Role::Admin)] {
            let a = actor(3, role);
            for action in [Action::ReadSelf, Action::UpdateSelf, Action::DeleteSelf] {
                assert!(allows(action, &a, 3));
                assert!(!allows(action, &a, 4));
            }
        }
    }

    #[test]
    fn test_admin_operations_are_admin_only() {
        let admin = actor(1, Some(Role::Admin));
        for action in [Action::ListUsers, Action::ChangeRole, Action::DeleteUser] {
            assert_eq!(evaluate(action, &admin), Decision::Allow(Scope::All));
            for role in [None, Some(Role::User), Some(Role::Organizer)] {
                assert_eq!(evaluate(action, &actor(2, role)), Decision::Deny);
            }
        }
    }

    #[test]
    fn test_event_creation_is_owned_by_creator() {
        assert_eq!(
            evaluate(Action::CreateEvent, &actor(1, Some(Role::Admin))),
            Decision::Allow(Scope::OwnedBy(1))
        );
        assert_eq!(
            evaluate(Action::CreateEvent, &actor(2, Some(Role::Organizer))),
            Decision::Allow(Scope::OwnedBy(2))
        );
        assert!(require(Action::CreateEvent, &actor(3, Some(Role::User))).is_err());
        assert!(require(Action::CreateEvent, &actor(4, None)).is_err());
    }

    #[test]
    fn test_event_and_ticket_management_scopes() {
        let admin = actor(1, Some(Role::Admin));
        let organizer = actor(2, Some(Role::Organizer));
        let user = actor(3, Some(Role::User));

        for action in [
            Action::ViewEvents,
            Action::UpdateEvent,
            Action::DeleteEvent,
            Action::CreateTicket,
        ] {
            assert!(allows(action, &admin, 99));
            assert!(allows(action, &organizer, 2));
            assert!(!allows(action, &organizer, 99));
            assert!(!allows(action, &user, 3));
            assert!(matches!(require(action, &user), Err(AppError::Unauthorized(_))));
        }
    }
}
