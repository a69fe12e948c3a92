//! PostgreSQL store.
//!
//! Every call checks a connection out of the pool for the duration of the
//! query; the pool guard returns it on every exit path.

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use super::{EventStore, TicketStore, UserStore};
use crate::models::{
    ContactInfo, Event, EventFields, EventId, NewTicket, NewUser, Role, Ticket, User, UserId,
};
use crate::policy::Scope;
use crate::utils::error::{AppError, AppResult, EVENT_UNAVAILABLE};

const USER_COLUMNS: &str = "id, name, email, password, role, phone_number, created_at";
const EVENT_COLUMNS: &str = "id, title, description, category, venue, start_date, end_date, \
                             max_capacity, organizer, is_private";
const TICKET_COLUMNS: &str = "id, event_id, type, price, quantity, available_quantity";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Apply the embedded schema migrations.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!().run(&self.pool).await
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn is_foreign_key_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}

/// `None` matches every organizer in the scoped queries below.
fn owner_filter(scope: Scope) -> Option<UserId> {
    match scope {
        Scope::All => None,
        Scope::OwnedBy(id) => Some(id),
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, user: &NewUser) -> AppResult<User> {
        let query = format!(
            "INSERT INTO users (name, email, password, role, phone_number) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password)
            .bind(user.role)
            .bind(&user.phone_number)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::Conflict("User already exists".to_string())
                } else {
                    e.into()
                }
            })
    }

    async fn find_user(&self, id: UserId) -> AppResult<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        Ok(sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        Ok(sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn contact_in_use(&self, email: &str, phone_number: &str) -> AppResult<bool> {
        Ok(sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM users WHERE email = $1 OR phone_number = $2)",
        )
        .bind(email)
        .bind(phone_number)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users ORDER BY id");
        Ok(sqlx::query_as::<_, User>(&query)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn set_password(&self, id: UserId, digest: &str) -> AppResult<bool> {
        let result = sqlx::query("UPDATE users SET password = $2 WHERE id = $1")
            .bind(id)
            .bind(digest)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_contact(&self, id: UserId, info: &ContactInfo) -> AppResult<Option<User>> {
        let query = format!(
            "UPDATE users SET name = $2, email = $3, phone_number = $4 \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&info.name)
            .bind(&info.email)
            .bind(&info.phone_number)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::Conflict("Email or phone number already in use".to_string())
                } else {
                    e.into()
                }
            })
    }

    async fn set_role(&self, id: UserId, role: Role) -> AppResult<Option<User>> {
        let query = format!("UPDATE users SET role = $2 WHERE id = $1 RETURNING {USER_COLUMNS}");
        Ok(sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(role)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_user(&self, id: UserId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    AppError::Conflict("User still organizes events".to_string())
                } else {
                    e.into()
                }
            })?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl EventStore for PgStore {
    async fn insert_event(&self, organizer: UserId, fields: &EventFields) -> AppResult<Event> {
        let query = format!(
            "INSERT INTO events (title, description, category, venue, start_date, end_date, \
             max_capacity, organizer, is_private) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {EVENT_COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(&fields.title)
            .bind(&fields.description)
            .bind(&fields.category)
            .bind(&fields.venue)
            .bind(fields.start_date)
            .bind(fields.end_date)
            .bind(fields.max_capacity)
            .bind(organizer)
            .bind(fields.is_private)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                // The token outlived its account.
                if is_foreign_key_violation(&e) {
                    AppError::unauthorized()
                } else {
                    e.into()
                }
            })
    }

    async fn list_events(&self, scope: Scope) -> AppResult<Vec<Event>> {
        let query = format!(
            "SELECT {EVENT_COLUMNS} FROM events \
             WHERE ($1::BIGINT IS NULL OR organizer = $1) ORDER BY id"
        );
        Ok(sqlx::query_as::<_, Event>(&query)
            .bind(owner_filter(scope))
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_event(&self, id: EventId, scope: Scope) -> AppResult<Option<Event>> {
        let query = format!(
            "SELECT {EVENT_COLUMNS} FROM events \
             WHERE id = $1 AND ($2::BIGINT IS NULL OR organizer = $2)"
        );
        Ok(sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .bind(owner_filter(scope))
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update_event(
        &self,
        id: EventId,
        scope: Scope,
        fields: &EventFields,
    ) -> AppResult<Option<Event>> {
        let query = format!(
            "UPDATE events SET title = $3, description = $4, category = $5, venue = $6, \
             start_date = $7, end_date = $8, max_capacity = $9, is_private = $10 \
             WHERE id = $1 AND ($2::BIGINT IS NULL OR organizer = $2) \
             RETURNING {EVENT_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .bind(owner_filter(scope))
            .bind(&fields.title)
            .bind(&fields.description)
            .bind(&fields.category)
            .bind(&fields.venue)
            .bind(fields.start_date)
            .bind(fields.end_date)
            .bind(fields.max_capacity)
            .bind(fields.is_private)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_event(&self, id: EventId, scope: Scope) -> AppResult<bool> {
        let result = sqlx::query(
            "DELETE FROM events WHERE id = $1 AND ($2::BIGINT IS NULL OR organizer = $2)",
        )
        .bind(id)
        .bind(owner_filter(scope))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                AppError::Conflict("Event still has tickets".to_string())
            } else {
                e.into()
            }
        })?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl TicketStore for PgStore {
    async fn insert_ticket(&self, ticket: &NewTicket) -> AppResult<Ticket> {
        let query = format!(
            "INSERT INTO tickets (event_id, type, price, quantity, available_quantity) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {TICKET_COLUMNS}"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(ticket.event_id)
            .bind(ticket.ticket_type)
            .bind(ticket.price)
            .bind(ticket.quantity)
            .bind(ticket.available_quantity)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    AppError::NotFound(EVENT_UNAVAILABLE.to_string())
                } else {
                    e.into()
                }
            })
    }
}
