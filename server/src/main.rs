use std::sync::Arc;

use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use evently_server::config::Config;
use evently_server::routes::create_routes;
use evently_server::state::AppState;
use evently_server::store::{MemoryStore, PgStore};

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env().expect("Invalid configuration");

    let state = match &config.database_url {
        Some(database_url) => {
            let store = PgStore::connect(database_url, config.max_connections)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Successfully connected to database");

            store.migrate().await.expect("Failed to run migrations");
            tracing::info!("Migrations run successfully");

            AppState::new(Arc::new(store), &config.token)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-memory store; data is lost on exit");
            AppState::new(Arc::new(MemoryStore::new()), &config.token)
        }
    };

    let app = create_routes(state, &config);

    let listener = TcpListener::bind(config.bind_address)
        .await
        .expect("Failed to bind address");
    tracing::info!("Server running at http://{}", config.bind_address);

    axum::serve(listener, app).await.expect("Server failed");
}
