//! Ticket creation for upcoming events.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;

use crate::auth::Actor;
use crate::models::{NewTicket, Ticket};
use crate::policy::{self, Action};
use crate::store::{EventStore, TicketStore};
use crate::utils::error::{AppError, AppResult, EVENT_UNAVAILABLE};

#[derive(Clone)]
pub struct TicketService {
    events: Arc<dyn EventStore>,
    tickets: Arc<dyn TicketStore>,
}

impl TicketService {
    pub fn new(events: Arc<dyn EventStore>, tickets: Arc<dyn TicketStore>) -> Self {
        Self { events, tickets }
    }

    pub async fn create(&self, actor: &Actor, request: &NewTicket) -> AppResult<Ticket> {
        self.create_at(actor, request, Utc::now()).await
    }

    /// A missing event, a foreign event and an event that has already
    /// started all produce the same `NotFound`.
    pub async fn create_at(
        &self,
        actor: &Actor,
        request: &NewTicket,
        now: DateTime<Utc>,
    ) -> AppResult<Ticket> {
        let scope = policy::require(Action::CreateTicket, actor)?;
        request.validate()?;

        self.events
            .find_event(request.event_id, scope)
            .await?
            .filter(|event| event.start_date > now)
            .ok_or_else(|| AppError::NotFound(EVENT_UNAVAILABLE.to_string()))?;

        let ticket = self.tickets.insert_ticket(request).await?;
        info!(
            ticket_id = ticket.id,
            event_id = ticket.event_id,
            actor = actor.id,
            "Tickets created"
        );
        Ok(ticket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Role, TicketType};
    use crate::services::testing::{actor_for, event_fields_starting, seed_user, upcoming_event_fields};
    use crate::store::MemoryStore;
    use chrono::Duration;
    use rust_decimal::Decimal;

    fn request(event_id: i64) -> NewTicket {
        NewTicket {
            event_id,
            ticket_type: TicketType::Paid,
            price: Decimal::new(2500, 2),
            quantity: 100,
            available_quantity: 100,
        }
    }

    async fn setup() -> (Arc<MemoryStore>, TicketService, Actor, Actor, Actor) {
        let store = Arc::new(MemoryStore::new());
        let service = TicketService::new(store.clone(), store.clone());
        let admin = actor_for(&seed_user(&store, "admin", Some(Role::Admin)).await);
        let alice = actor_for(&seed_user(&store, "alice", Some(Role::Organizer)).await);
        let bob = actor_for(&seed_user(&store, "bob", Some(Role::Organizer)).await);
        (store, service, admin, alice, bob)
    }

    #[tokio::test]
    async fn test_owner_and_admin_create_for_upcoming_event() {
        let (store, tickets, admin, alice, _) = setup().await;
        let event = store.insert_event(alice.id, &upcoming_event_fields()).await.unwrap();

        let ticket = tickets.create(&alice, &request(event.id)).await.unwrap();
        assert_eq!(ticket.event_id, event.id);
        assert_eq!(ticket.ticket_type, TicketType::Paid);

        assert!(tickets.create(&admin, &request(event.id)).await.is_ok());
    }

    #[tokio::test]
    async fn test_unavailable_events_are_indistinguishable() {
        let (store, tickets, admin, alice, bob) = setup().await;
        let past = store
            .insert_event(alice.id, &event_fields_starting(Utc::now() - Duration::hours(1)))
            .await
            .unwrap();
        let bobs = store.insert_event(bob.id, &upcoming_event_fields()).await.unwrap();

        let started = tickets.create(&admin, &request(past.id)).await.unwrap_err();
        let missing = tickets.create(&admin, &request(9_999)).await.unwrap_err();
        let foreign = tickets.create(&alice, &request(bobs.id)).await.unwrap_err();

        for err in [&started, &missing, &foreign] {
            assert!(matches!(err, AppError::NotFound(msg) if msg == EVENT_UNAVAILABLE));
        }
    }

    #[tokio::test]
    async fn test_start_must_be_strictly_in_the_future() {
        let (store, tickets, _, alice, _) = setup().await;
        let start = Utc::now() + Duration::days(1);
        let event = store
            .insert_event(alice.id, &event_fields_starting(start))
            .await
            .unwrap();

        assert!(tickets.create_at(&alice, &request(event.id), start).await.is_err());
        assert!(tickets
            .create_at(&alice, &request(event.id), start - Duration::seconds(1))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_plain_users_are_unauthorized() {
        let (store, tickets, _, alice, _) = setup().await;
        let event = store.insert_event(alice.id, &upcoming_event_fields()).await.unwrap();
        let plain = actor_for(&seed_user(&store, "plain", Some(Role::User)).await);

        assert!(matches!(
            tickets.create(&plain, &request(event.id)).await,
            Err(AppError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_available_quantity_is_stored_as_given() {
        let (store, tickets, _, alice, _) = setup().await;
        let event = store.insert_event(alice.id, &upcoming_event_fields()).await.unwrap();

        let mut oversold = request(event.id);
        oversold.quantity = 5;
        oversold.available_quantity = 8;
        let ticket = tickets.create(&alice, &oversold).await.unwrap();
        assert_eq!((ticket.quantity, ticket.available_quantity), (5, 8));
    }
}
