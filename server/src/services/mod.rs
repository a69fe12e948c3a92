//! Lifecycle managers. Each operation resolves the actor's scope through
//! the policy before touching the store.

pub mod accounts;
pub mod admin;
pub mod events;
pub mod tickets;

pub use accounts::{AccountService, PasswordChange, SignupRequest, UpdatedInfo};
pub use admin::{AdminService, RoleChange};
pub use events::EventService;
pub use tickets::TicketService;
