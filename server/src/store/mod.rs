//! Persistence seams.
//!
//! Uniqueness (email, phone number) and references (event organizer, ticket
//! event) are enforced by the store itself. Scoped event lookups apply the
//! policy [`Scope`] as a filter, so out-of-scope rows read as missing.

use async_trait::async_trait;

use crate::models::{
    ContactInfo, Event, EventFields, EventId, NewTicket, NewUser, Role, Ticket, User, UserId,
};
use crate::policy::Scope;
use crate::utils::error::AppResult;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Conflict` when the email or phone number is taken.
    async fn insert_user(&self, user: &NewUser) -> AppResult<User>;

    async fn find_user(&self, id: UserId) -> AppResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// True when any user already has this email or this phone number.
    async fn contact_in_use(&self, email: &str, phone_number: &str) -> AppResult<bool>;

    async fn list_users(&self) -> AppResult<Vec<User>>;

    /// Returns false when the user does not exist.
    async fn set_password(&self, id: UserId, digest: &str) -> AppResult<bool>;

    async fn set_contact(&self, id: UserId, info: &ContactInfo) -> AppResult<Option<User>>;

    async fn set_role(&self, id: UserId, role: Role) -> AppResult<Option<User>>;

    /// Fails with `Conflict` while the user still organizes events.
    async fn delete_user(&self, id: UserId) -> AppResult<bool>;
}

#[async_trait]
pub trait EventStore: Send + Sync {
    /// Fails with `Unauthorized` when the organizer no longer exists.
    async fn insert_event(&self, organizer: UserId, fields: &EventFields) -> AppResult<Event>;

    async fn list_events(&self, scope: Scope) -> AppResult<Vec<Event>>;

    async fn find_event(&self, id: EventId, scope: Scope) -> AppResult<Option<Event>>;

    async fn update_event(
        &self,
        id: EventId,
        scope: Scope,
        fields: &EventFields,
    ) -> AppResult<Option<Event>>;

    /// Fails with `Conflict` while tickets still reference the event.
    async fn delete_event(&self, id: EventId, scope: Scope) -> AppResult<bool>;
}

#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Fails with `NotFound` when the event no longer exists.
    async fn insert_ticket(&self, ticket: &NewTicket) -> AppResult<Ticket>;
}

/// A backend implementing every store seam.
pub trait Store: UserStore + EventStore + TicketStore {}

impl<T> Store for T where T: UserStore + EventStore + TicketStore {}
