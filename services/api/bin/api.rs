//! Main Entrypoint for the Vocabot API Service
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Opening the configured store, running migrations and seeding common words.
//! 3. Constructing the Axum router and applying middleware.
//! 4. Starting the web server and handling graceful shutdown.

use anyhow::Context;
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use vocabot_api::{
    config::{Config, StoreBackend},
    db::Db,
    router::create_router,
    state::AppState,
};
use vocabot_core::{InMemoryStore, VocabularyStore, seed::COMMON_WORDS};

/// Listens for the `Ctrl+C` signal to gracefully shut down the server.
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal. Shutting down gracefully...");
}

async fn open_store(config: &Config) -> anyhow::Result<Arc<dyn VocabularyStore>> {
    match config.store_backend {
        StoreBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the postgres backend")?;
            let db = Db::connect(url, config.db_max_connections).await?;
            db.run_migrations().await?;
            info!("Database connection established and migrations are up-to-date.");
            Ok(Arc::new(db))
        }
        StoreBackend::Memory => {
            warn!("Using the in-memory store; all data is lost on restart.");
            Ok(Arc::new(InMemoryStore::new()))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    info!("Configuration loaded. Initializing application state...");

    // --- 3. Initialize Store ---
    let store = open_store(&config).await?;
    let seeded = store
        .seed_common_words(COMMON_WORDS)
        .await
        .context("Failed to seed common words")?;
    if seeded > 0 {
        info!(count = seeded, "Seeded common words.");
    }

    let bind_address = config.bind_address;
    let backend = config.store_backend.clone();
    let app_state = Arc::new(AppState::new(store, config));

    // --- 4. Create Router and Apply Middleware ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(app_state).layer(cors);

    // --- 5. Start Server ---
    info!(
        backend = ?backend,
        bind_address = %bind_address,
        "Service configured. Starting server..."
    );
    let listener = tokio::net::TcpListener::bind(bind_address).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server has shut down.");
    Ok(())
}
