use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use contacts_api::auth::AuthServiceClient;
use contacts_api::config;
use contacts_api::database::{schema, DatabaseManager, PgContactStore};
use contacts_api::{is_production, router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, AUTH_SERVICE_URL, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("contacts_api=info,tower_http=info")),
        )
        .init();

    let config = config::config();
    tracing::info!("Starting Contacts API in {:?} mode", config.environment);

    if config.auth.service_url.is_none() {
        if is_production!() {
            tracing::error!("AUTH_SERVICE_URL is not set; every protected request will fail");
        } else {
            tracing::warn!("AUTH_SERVICE_URL is not set; protected routes will answer 500");
        }
    }

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    schema::initialize(&pool)
        .await
        .context("failed to initialize database schema")?;

    let validator = AuthServiceClient::new(&config.auth).context("failed to build auth service client")?;
    let state = AppState::new(Arc::new(PgContactStore::new(pool)), Arc::new(validator), config.clone());
    let app = router(state);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Contacts API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
