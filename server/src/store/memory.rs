//! In-memory store with the same uniqueness and reference rules as the
//! Postgres schema. Used when no database is configured and by the tests.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{EventStore, TicketStore, UserStore};
use crate::models::{
    ContactInfo, Event, EventFields, EventId, NewTicket, NewUser, Role, Ticket, TicketId, User,
    UserId,
};
use crate::policy::Scope;
use crate::utils::error::{AppError, AppResult, EVENT_UNAVAILABLE};

#[derive(Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    events: BTreeMap<EventId, Event>,
    tickets: BTreeMap<TicketId, Ticket>,
    last_user_id: UserId,
    last_event_id: EventId,
    last_ticket_id: TicketId,
}

impl Tables {
    /// Whether another user than `except` holds the email or phone number.
    fn contact_taken(&self, email: &str, phone_number: &str, except: Option<UserId>) -> bool {
        self.users.values().any(|u| {
            Some(u.id) != except && (u.email == email || u.phone_number == phone_number)
        })
    }

    fn scoped_event_mut(&mut self, id: EventId, scope: Scope) -> Option<&mut Event> {
        self.events
            .get_mut(&id)
            .filter(|event| scope.covers(event.organizer))
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: &NewUser) -> AppResult<User> {
        let mut tables = self.tables.write().await;
        if tables.contact_taken(&user.email, &user.phone_number, None) {
            return Err(AppError::Conflict("User already exists".to_string()));
        }

        tables.last_user_id += 1;
        let record = User {
            id: tables.last_user_id,
            name: user.name.clone(),
            email: user.email.clone(),
            password: user.password.clone(),
            role: user.role,
            phone_number: user.phone_number.clone(),
            created_at: Utc::now(),
        };
        tables.users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_user(&self, id: UserId) -> AppResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn contact_in_use(&self, email: &str, phone_number: &str) -> AppResult<bool> {
        Ok(self
            .tables
            .read()
            .await
            .contact_taken(email, phone_number, None))
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        Ok(self.tables.read().await.users.values().cloned().collect())
    }

    async fn set_password(&self, id: UserId, digest: &str) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(match tables.users.get_mut(&id) {
            Some(user) => {
                user.password = digest.to_string();
                true
            }
            None => false,
        })
    }

    async fn set_contact(&self, id: UserId, info: &ContactInfo) -> AppResult<Option<User>> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&id) {
            return Ok(None);
        }
        if tables.contact_taken(&info.email, &info.phone_number, Some(id)) {
            return Err(AppError::Conflict(
                "Email or phone number already in use".to_string(),
            ));
        }

        Ok(tables.users.get_mut(&id).map(|user| {
            user.name = info.name.clone();
            user.email = info.email.clone();
            user.phone_number = info.phone_number.clone();
            user.clone()
        }))
    }

    async fn set_role(&self, id: UserId, role: Role) -> AppResult<Option<User>> {
        let mut tables = self.tables.write().await;
        Ok(tables.users.get_mut(&id).map(|user| {
            user.role = Some(role);
            user.clone()
        }))
    }

    async fn delete_user(&self, id: UserId) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.events.values().any(|e| e.organizer == id) {
            return Err(AppError::Conflict("User still organizes events".to_string()));
        }
        Ok(tables.users.remove(&id).is_some())
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn insert_event(&self, organizer: UserId, fields: &EventFields) -> AppResult<Event> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&organizer) {
            return Err(AppError::unauthorized());
        }

        tables.last_event_id += 1;
        let event = Event {
            id: tables.last_event_id,
            title: fields.title.clone(),
            description: fields.description.clone(),
            category: fields.category.clone(),
            venue: fields.venue.clone(),
            start_date: fields.start_date,
            end_date: fields.end_date,
            max_capacity: fields.max_capacity,
            organizer,
            is_private: fields.is_private,
        };
        tables.events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn list_events(&self, scope: Scope) -> AppResult<Vec<Event>> {
        let tables = self.tables.read().await;
        Ok(tables
            .events
            .values()
            .filter(|event| scope.covers(event.organizer))
            .cloned()
            .collect())
    }

    async fn find_event(&self, id: EventId, scope: Scope) -> AppResult<Option<Event>> {
        let tables = self.tables.read().await;
        Ok(tables
            .events
            .get(&id)
            .filter(|event| scope.covers(event.organizer))
            .cloned())
    }

    async fn update_event(
        &self,
        id: EventId,
        scope: Scope,
        fields: &EventFields,
    ) -> AppResult<Option<Event>> {
        let mut tables = self.tables.write().await;
        Ok(tables.scoped_event_mut(id, scope).map(|event| {
            event.title = fields.title.clone();
            event.description = fields.description.clone();
            event.category = fields.category.clone();
            event.venue = fields.venue.clone();
            event.start_date = fields.start_date;
            event.end_date = fields.end_date;
            event.max_capacity = fields.max_capacity;
            event.is_private = fields.is_private;
            event.clone()
        }))
    }

    async fn delete_event(&self, id: EventId, scope: Scope) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.scoped_event_mut(id, scope).is_none() {
            return Ok(false);
        }
        if tables.tickets.values().any(|t| t.event_id == id) {
            return Err(AppError::Conflict("Event still has tickets".to_string()));
        }
        Ok(tables.events.remove(&id).is_some())
    }
}

#[async_trait]
impl TicketStore for MemoryStore {
    async fn insert_ticket(&self, ticket: &NewTicket) -> AppResult<Ticket> {
        let mut tables = self.tables.write().await;
        if !tables.events.contains_key(&ticket.event_id) {
            return Err(AppError::NotFound(EVENT_UNAVAILABLE.to_string()));
        }

        tables.last_ticket_id += 1;
        let record = Ticket {
            id: tables.last_ticket_id,
            event_id: ticket.event_id,
            ticket_type: ticket.ticket_type,
            price: ticket.price,
            quantity: ticket.quantity,
            available_quantity: ticket.available_quantity,
        };
        tables.tickets.insert(record.id, record.clone());
        Ok(record)
    }
}
