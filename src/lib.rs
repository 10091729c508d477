pub mod api;
pub mod config;
pub mod error;
pub mod logic;
pub mod model;
pub mod seed;
pub mod store;

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

// Export API types
pub use api::handlers;
pub use api::routes;

pub use error::{CatalogError, CatalogResult};

// Export all model types
pub use model::*;

pub use seed::load_seed_data;

// Export store types
pub use store::{MemoryStore, PostgresStore, Store};

use crate::config::{AppConfig, Backend};

/// The catalog router with its store attached
pub fn app<S: Store + 'static>(store: Arc<S>) -> Router {
    routes::create_router().with_state(store)
}

async fn serve_store<S: Store + 'static>(store: S, listener: TcpListener) -> anyhow::Result<()> {
    // Load seed data for demonstration (optional)
    if std::env::var("LOAD_SEED_DATA").unwrap_or_default() == "true" {
        log::info!("Loading seed data...");
        load_seed_data(&store).await?;
    }

    log::info!("Catalog server running on http://{}", listener.local_addr()?);
    axum::serve(listener, app(Arc::new(store))).await?;

    Ok(())
}

/// Binds the configured address and serves the catalog from the configured
/// backend until the process stops.
pub async fn run_server(config: &AppConfig) -> anyhow::Result<()> {
    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;

    match config.database.backend {
        Backend::Memory => {
            log::info!("Using in-memory store");
            serve_store(MemoryStore::new(), listener).await
        }
        Backend::Postgres => {
            log::info!("Connecting to PostgreSQL...");
            let postgres_store =
                PostgresStore::new(&config.database_url(), config.max_connections()).await?;
            postgres_store.migrate().await?;
            log::info!("Database ready");
            serve_store(postgres_store, listener).await
        }
    }
}
