use std::sync::Arc;

use crate::auth::CredentialService;
use crate::config::TokenConfig;
use crate::services::{AccountService, AdminService, EventService, TicketService};
use crate::store::Store;

/// Shared by every handler; cloning only bumps reference counts.
#[derive(Clone)]
pub struct AppState {
    pub credentials: Arc<CredentialService>,
    pub accounts: AccountService,
    pub admin: AdminService,
    pub events: EventService,
    pub tickets: TicketService,
}

impl AppState {
    pub fn new<S>(store: Arc<S>, token: &TokenConfig) -> Self
    where
        S: Store + 'static,
    {
        let credentials = Arc::new(CredentialService::new(token));

        Self {
            accounts: AccountService::new(store.clone(), credentials.clone()),
            admin: AdminService::new(store.clone()),
            events: EventService::new(store.clone()),
            tickets: TicketService::new(store.clone(), store),
            credentials,
        }
    }
}
