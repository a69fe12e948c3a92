pub mod event;
pub mod ticket;
pub mod user;

pub use event::{Event, EventFields, EventId};
pub use ticket::{NewTicket, Ticket, TicketId, TicketType};
pub use user::{ContactInfo, NewUser, Role, User, UserId, UserSnapshot};
